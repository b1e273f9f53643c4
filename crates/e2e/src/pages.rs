//! Sidebar navigation of the sample application

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::driver::ActionOptions;
use crate::error::E2eResult;
use crate::extract::Extract;
use crate::session::Session;

/// Page sections reachable from the sidebar menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Page {
    FormLayouts,
    Datepicker,
    Toastr,
    SmartTable,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::FormLayouts, Page::Datepicker, Page::Toastr, Page::SmartTable];

    /// Route of the page, relative to the base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Page::FormLayouts => "/pages/forms/layouts",
            Page::Datepicker => "/pages/forms/datepicker",
            Page::Toastr => "/pages/modal-overlays/toastr",
            Page::SmartTable => "/pages/tables/smart-table",
        }
    }

    /// Title of the menu group holding the page. Matched as a substring.
    pub fn menu_group(&self) -> &'static str {
        match self {
            Page::FormLayouts | Page::Datepicker => "Form",
            Page::Toastr => "Modal & Overlays",
            Page::SmartTable => "Tables & Data",
        }
    }

    /// Title of the menu item itself.
    pub fn menu_item(&self) -> &'static str {
        match self {
            Page::FormLayouts => "Form Layouts",
            Page::Datepicker => "Datepicker",
            Page::Toastr => "Toastr",
            Page::SmartTable => "Smart Table",
        }
    }
}

pub const HOME_PATH: &str = "/";

/// Icon name the menu uses for a collapsed group.
const COLLAPSED_ICON: &str = "left";

/// Page object for the sidebar menu.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationPage;

impl NavigationPage {
    pub async fn open_home_page(&self, session: &mut Session) -> E2eResult<()> {
        info!("Opening home page");
        session.visit(HOME_PATH).await
    }

    pub async fn form_layouts_page(&self, session: &mut Session) -> E2eResult<()> {
        self.navigate(session, Page::FormLayouts).await
    }

    pub async fn date_picker_page(&self, session: &mut Session) -> E2eResult<()> {
        self.navigate(session, Page::Datepicker).await
    }

    pub async fn toastr_page(&self, session: &mut Session) -> E2eResult<()> {
        self.navigate(session, Page::Toastr).await
    }

    pub async fn smart_table_page(&self, session: &mut Session) -> E2eResult<()> {
        self.navigate(session, Page::SmartTable).await
    }

    /// Route the browser to `page` through the sidebar and wait until the
    /// location reflects it.
    pub async fn navigate(&self, session: &mut Session, page: Page) -> E2eResult<()> {
        info!("Navigating to {}", page.menu_item());
        self.expand_group(session, page.menu_group()).await?;
        let item = session.contains("a", page.menu_item()).await?;
        session.click(&item, ActionOptions::default()).await?;
        session.expect_path(page.path()).await
    }

    /// Expand a menu group unless it already is.
    async fn expand_group(&self, session: &mut Session, group: &str) -> E2eResult<()> {
        let menu = session.contains("a", group).await?;
        let icon = session.find(&menu, ".expand-state [data-name]").await?;
        let state = session.invoke(&icon, Extract::attr("data-name")).await?;
        if state.contains(COLLAPSED_ICON) {
            session.click(&menu, ActionOptions::default()).await?;
        } else {
            debug!("menu group {:?} already expanded", group);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forms_share_a_group() {
        assert_eq!(Page::FormLayouts.menu_group(), Page::Datepicker.menu_group());
        assert_ne!(Page::Toastr.menu_group(), Page::SmartTable.menu_group());
    }

    #[test]
    fn test_paths_are_distinct() {
        let mut paths: Vec<&str> = Page::ALL.iter().map(|p| p.path()).collect();
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), Page::ALL.len());
    }
}
