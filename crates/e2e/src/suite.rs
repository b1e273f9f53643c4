//! The web elements suite: forms, checkboxes, datepicker, dropdowns, table
//! filtering and confirm dialogs.

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::datepicker::DatepickerPage;
use crate::dialog::ConfirmationPolicy;
use crate::driver::ActionOptions;
use crate::error::E2eResult;
use crate::extract::{Expectation, Extract, Match};
use crate::iterate::ReopenBelow;
use crate::pages::{NavigationPage, Page};
use crate::session::Session;
use crate::table::TableFilter;
use crate::toggle::ToggleMode;

pub type ScenarioFn = for<'s> fn(&'s mut Session) -> BoxFuture<'s, E2eResult<()>>;

/// One test case and the hooks that run before it.
#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    /// Grouping the case belongs to, if any
    pub context: Option<&'static str>,
    /// Page opened after the home page, before the body runs
    pub page: Option<Page>,
    pub run: ScenarioFn,
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("context", &self.context)
            .field("page", &self.page)
            .finish()
    }
}

impl Scenario {
    /// Full display name, e.g. `Form Layouts page > Radio buttons`.
    pub fn title(&self) -> String {
        match self.context {
            Some(ctx) => format!("{} > {}", ctx, self.name),
            None => self.name.to_string(),
        }
    }
}

pub const SUITE_NAME: &str = "Interaction with Web Elements";

pub const FORM_LAYOUTS: &str = "Form Layouts page";
pub const TOASTR: &str = "Toastr page";

pub const DELETE_CONFIRM: &str = "Are you sure you want to delete?";

pub fn web_elements_suite() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "Saving and working with subject",
            context: Some(FORM_LAYOUTS),
            page: Some(Page::FormLayouts),
            run: |s| saving_and_working_with_subject(s).boxed(),
        },
        Scenario {
            name: "Extracting text values",
            context: Some(FORM_LAYOUTS),
            page: Some(Page::FormLayouts),
            run: |s| extracting_text_values(s).boxed(),
        },
        Scenario {
            name: "Radio buttons",
            context: Some(FORM_LAYOUTS),
            page: Some(Page::FormLayouts),
            run: |s| radio_buttons(s).boxed(),
        },
        Scenario {
            name: "Check boxes",
            context: Some(TOASTR),
            page: Some(Page::Toastr),
            run: |s| check_boxes(s).boxed(),
        },
        Scenario {
            name: "Datepicker page",
            context: None,
            page: None,
            run: |s| datepicker(s).boxed(),
        },
        Scenario {
            name: "Lists and Dropdowns",
            context: None,
            page: None,
            run: |s| lists_and_dropdowns(s).boxed(),
        },
        Scenario {
            name: "Table filtering",
            context: None,
            page: None,
            run: |s| table_filtering(s).boxed(),
        },
        Scenario {
            name: "Dialog Box",
            context: None,
            page: None,
            run: |s| dialog_box(s).boxed(),
        },
    ]
}

async fn saving_and_working_with_subject(s: &mut Session) -> E2eResult<()> {
    // Alias: reusable for the rest of the test case
    let grid = s.contains("nb-card", "Using the Grid").await?;
    s.alias("usingGrid", grid);
    let grid = s.aliased("@usingGrid")?;
    let email = s.find(&grid, r#"[for="inputEmail1"]"#).await?;
    s.should(&email, Expectation::Contain("Email".into())).await?;
    let grid = s.aliased("@usingGrid")?;
    let password = s.find(&grid, r#"[for="inputPassword2"]"#).await?;
    s.should(&password, Expectation::Contain("Password".into())).await?;

    // Scoped: only reachable inside the callback
    let grid = s.contains("nb-card", "Using the Grid").await?;
    s.within(grid, |s, grid| {
        async move {
            let email = s.find(&grid, r#"[for="inputEmail1"]"#).await?;
            s.should(&email, Expectation::Contain("Email".into())).await?;
            let password = s.find(&grid, r#"[for="inputPassword2"]"#).await?;
            s.should(&password, Expectation::Contain("Password".into())).await
        }
        .boxed()
    })
    .await
}

async fn extracting_text_values(s: &mut Session) -> E2eResult<()> {
    let label = s.get(r#"[for="exampleInputEmail1"]"#).await?;
    s.should(&label, Expectation::Contain("Email address".into())).await?;

    s.expect_value(&label, Extract::Text, Match::exact("Email address")).await?;
    s.expect_value(&label, Extract::Text, Match::contains("Email address")).await?;
    s.expect_value(&label, Extract::attr("class"), Match::exact("label")).await?;

    let input = s.get("#exampleInputEmail1").await?;
    s.type_text(&input, "text.com").await?;
    s.expect_value(&input, Extract::prop("value"), Match::contains("text.com")).await?;
    Ok(())
}

async fn radio_buttons(s: &mut Session) -> E2eResult<()> {
    let grid = s.contains("nb-card", "Using the Grid").await?;
    let radios = s.find(&grid, r#"[type="radio"]"#).await?;

    let first = radios.eq(0)?;
    s.set_checked(&first, ToggleMode::Force).await?;
    s.should(&first, Expectation::BeChecked).await?;

    let second = radios.eq(1)?;
    s.set_checked(&second, ToggleMode::Force).await?;
    s.should(&second, Expectation::BeChecked).await?;

    s.should(&first, Expectation::NotBeChecked).await?;
    s.should(&radios.eq(2)?, Expectation::BeDisabled).await
}

async fn check_boxes(s: &mut Session) -> E2eResult<()> {
    // Every checkbox found gets checked
    let boxes = s.get(r#"[type="checkbox"]"#).await?;
    s.set_checked(&boxes, ToggleMode::Idempotent { force: true }).await?;
    for checkbox in boxes.split() {
        s.should(&checkbox, Expectation::BeChecked).await?;
    }

    // Click flips the state; check keeps a checked box checked
    let first = boxes.eq(0)?;
    s.toggle(&first).await?;
    s.should(&first, Expectation::NotBeChecked).await?;

    let second = boxes.eq(1)?;
    s.set_checked(&second, ToggleMode::Idempotent { force: true }).await?;
    s.should(&second, Expectation::BeChecked).await
}

async fn datepicker(s: &mut Session) -> E2eResult<()> {
    NavigationPage.date_picker_page(s).await?;
    DatepickerPage
        .select_common_datepicker_date_from_today(s, 200)
        .await?;
    Ok(())
}

async fn lists_and_dropdowns(s: &mut Session) -> E2eResult<()> {
    // A single option
    let dropdown = s.get("nav nb-select").await?;
    s.click(&dropdown, ActionOptions::default()).await?;
    let dark = s.contains("nb-option", "Dark").await?;
    s.click(&dark, ActionOptions::default()).await?;
    s.should(&dropdown, Expectation::Contain("Dark".into())).await?;

    // Every option in turn
    let dropdown = s.get("nav nb-select").await?;
    s.select_each(&dropdown, "ul.options-list nb-option", ReopenBelow(3))
        .await?;
    Ok(())
}

async fn table_filtering(s: &mut Session) -> E2eResult<()> {
    NavigationPage.smart_table_page(s).await?;

    let filter = TableFilter::age(s.config().filter_settle);
    s.filter_table(&filter, &[20, 30, 40, 200]).await?;
    Ok(())
}

async fn dialog_box(s: &mut Session) -> E2eResult<()> {
    NavigationPage.smart_table_page(s).await?;

    let row = s.get("tbody tr").await?.first();
    let trash = s.find(&row, ".nb-trash").await?;
    s.trigger_confirmation(&trash, ConfirmationPolicy::AssertImmediate(DELETE_CONFIRM.into()))
        .await?;

    let row = s.get("tbody tr").await?.first();
    let trash = s.find(&row, ".nb-trash").await?;
    s.trigger_confirmation(
        &trash,
        ConfirmationPolicy::RecordAndAssertAfter(DELETE_CONFIRM.into()),
    )
    .await?;

    let row = s.get("tbody tr").await?.first();
    let trash = s.find(&row, ".nb-trash").await?;
    s.trigger_confirmation(&trash, ConfirmationPolicy::AutoRespond(false))
        .await?;
    Ok(())
}
