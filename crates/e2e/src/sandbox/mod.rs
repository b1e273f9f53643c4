//! In-process stand-in for the sample application.
//!
//! [`SandboxDriver`] implements [`BrowserDriver`] against a small DOM model
//! of the admin dashboard: the header theme switcher, the sidebar menu, and
//! the form layouts, datepicker, toastr and smart table pages. It needs no
//! browser, Node.js or running application, so the whole suite can run in
//! CI or under `cargo test`.
//!
//! Only a small CSS subset is understood. Hidden inputs, disabled
//! controls, the filter debounce of the smart table and `window.confirm` are
//! modelled closely enough for the suite's assertions to mean something.

mod app;
mod dom;
mod selector;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::debug;

use crate::driver::{ActionOptions, BrowserDriver, DialogEvent, DriverLauncher, ElementHandle};
use crate::error::{E2eError, E2eResult};

use self::app::SandboxApp;

/// Knobs for a sandbox session
#[derive(Debug, Clone, Copy)]
pub struct SandboxOptions {
    /// Date the calendar opens on; None = the local date
    pub today: Option<NaiveDate>,
    /// Delay between editing a table filter and the table refreshing
    pub filter_debounce: Duration,
}

impl Default for SandboxOptions {
    fn default() -> Self {
        Self {
            today: None,
            filter_debounce: Duration::from_millis(300),
        }
    }
}

pub struct SandboxDriver {
    app: Mutex<SandboxApp>,
}

impl SandboxDriver {
    pub fn new() -> Self {
        Self::with_options(SandboxOptions::default())
    }

    pub fn with_options(options: SandboxOptions) -> Self {
        let today = options
            .today
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        Self {
            app: Mutex::new(SandboxApp::new(today, options.filter_debounce)),
        }
    }

    fn with_app<T>(&self, op: impl FnOnce(&mut SandboxApp) -> E2eResult<T>) -> E2eResult<T> {
        let mut app = self
            .app
            .lock()
            .map_err(|_| E2eError::Driver("sandbox state poisoned".into()))?;
        app.tick();
        op(&mut app)
    }
}

impl Default for SandboxDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn handles(ids: Vec<u64>) -> Vec<ElementHandle> {
    ids.into_iter().map(ElementHandle).collect()
}

#[async_trait]
impl BrowserDriver for SandboxDriver {
    async fn goto(&self, path: &str) -> E2eResult<()> {
        self.with_app(|app| app.goto(path))
    }

    async fn current_path(&self) -> E2eResult<String> {
        self.with_app(|app| Ok(app.route().to_string()))
    }

    async fn query(
        &self,
        selector: &str,
        within: Option<ElementHandle>,
    ) -> E2eResult<Vec<ElementHandle>> {
        self.with_app(|app| app.query(selector, within.map(|h| h.0)).map(handles))
    }

    async fn contains(
        &self,
        selector: Option<&str>,
        text: &str,
        within: Option<ElementHandle>,
    ) -> E2eResult<Option<ElementHandle>> {
        self.with_app(|app| {
            app.contains(selector, text, within.map(|h| h.0))
                .map(|found| found.map(ElementHandle))
        })
    }

    async fn click(&self, el: ElementHandle, options: ActionOptions) -> E2eResult<()> {
        self.with_app(|app| app.click(el.0, options.force))
    }

    async fn check(&self, el: ElementHandle, options: ActionOptions) -> E2eResult<()> {
        self.with_app(|app| app.check(el.0, options.force))
    }

    async fn type_text(&self, el: ElementHandle, text: &str) -> E2eResult<()> {
        self.with_app(|app| app.type_text(el.0, text))
    }

    async fn clear(&self, el: ElementHandle) -> E2eResult<()> {
        self.with_app(|app| app.clear(el.0))
    }

    async fn text(&self, el: ElementHandle) -> E2eResult<String> {
        self.with_app(|app| app.text(el.0))
    }

    async fn attribute(&self, el: ElementHandle, name: &str) -> E2eResult<Option<String>> {
        self.with_app(|app| app.attribute(el.0, name))
    }

    async fn property(
        &self,
        el: ElementHandle,
        name: &str,
    ) -> E2eResult<Option<serde_json::Value>> {
        self.with_app(|app| app.property(el.0, name))
    }

    async fn is_checked(&self, el: ElementHandle) -> E2eResult<bool> {
        self.with_app(|app| app.is_checked(el.0))
    }

    async fn is_disabled(&self, el: ElementHandle) -> E2eResult<bool> {
        self.with_app(|app| app.is_disabled(el.0))
    }

    async fn is_visible(&self, el: ElementHandle) -> E2eResult<bool> {
        self.with_app(|app| app.is_visible(el.0))
    }

    async fn set_confirm_response(&self, accept: bool) -> E2eResult<()> {
        self.with_app(|app| app.set_confirm_response(accept))
    }

    async fn take_dialogs(&self) -> E2eResult<Vec<DialogEvent>> {
        self.with_app(|app| app.take_dialogs())
    }

    async fn close(&self) -> E2eResult<()> {
        debug!("Closing sandbox session");
        self.with_app(|app| {
            app.close();
            Ok(())
        })
    }
}

/// Hands out a fresh sandbox per test case
#[derive(Debug, Clone, Default)]
pub struct SandboxLauncher {
    options: SandboxOptions,
}

impl SandboxLauncher {
    pub fn new(options: SandboxOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl DriverLauncher for SandboxLauncher {
    async fn launch(&self) -> E2eResult<Arc<dyn BrowserDriver>> {
        Ok(Arc::new(SandboxDriver::with_options(self.options)))
    }

    fn name(&self) -> &'static str {
        "sandbox"
    }
}
