//! Browser automation surface consumed by the suite.
//!
//! [`BrowserDriver`] is the seam between the interaction primitives and a
//! concrete backend. Two backends ship with the crate:
//!
//! - [`crate::playwright::PlaywrightDriver`] drives a real browser
//! - [`crate::sandbox::SandboxDriver`] models the sample application in memory
//!
//! Every method is a single round-trip; retrying and assertion logic lives in
//! [`crate::session::Session`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;

/// Opaque reference to one DOM node, valid for one browser session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(pub u64);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Options shared by click and check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionOptions {
    /// Skip visibility and actionability checks
    pub force: bool,
}

impl ActionOptions {
    pub const FORCE: ActionOptions = ActionOptions { force: true };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DialogKind {
    Alert,
    Confirm,
    Prompt,
    Beforeunload,
}

/// A native dialog that opened since the last [`BrowserDriver::take_dialogs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogEvent {
    pub kind: DialogKind,
    pub message: String,
    pub accepted: bool,
}

#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Navigate to a path relative to the base URL.
    async fn goto(&self, path: &str) -> E2eResult<()>;

    /// Current location, as a path relative to the base URL.
    async fn current_path(&self) -> E2eResult<String>;

    /// All nodes matching a CSS selector, in document order.
    async fn query(
        &self,
        selector: &str,
        within: Option<ElementHandle>,
    ) -> E2eResult<Vec<ElementHandle>>;

    /// First node matching `selector` whose text contains `text`. With no
    /// selector, the deepest node whose text contains `text`.
    async fn contains(
        &self,
        selector: Option<&str>,
        text: &str,
        within: Option<ElementHandle>,
    ) -> E2eResult<Option<ElementHandle>>;

    async fn click(&self, el: ElementHandle, options: ActionOptions) -> E2eResult<()>;

    /// Make a checkbox or radio checked. No-op if it already is.
    async fn check(&self, el: ElementHandle, options: ActionOptions) -> E2eResult<()>;

    async fn type_text(&self, el: ElementHandle, text: &str) -> E2eResult<()>;

    async fn clear(&self, el: ElementHandle) -> E2eResult<()>;

    async fn text(&self, el: ElementHandle) -> E2eResult<String>;

    async fn attribute(&self, el: ElementHandle, name: &str) -> E2eResult<Option<String>>;

    async fn property(
        &self,
        el: ElementHandle,
        name: &str,
    ) -> E2eResult<Option<serde_json::Value>>;

    async fn is_checked(&self, el: ElementHandle) -> E2eResult<bool>;

    async fn is_disabled(&self, el: ElementHandle) -> E2eResult<bool>;

    async fn is_visible(&self, el: ElementHandle) -> E2eResult<bool>;

    /// Answer given to the next `window.confirm` calls.
    async fn set_confirm_response(&self, accept: bool) -> E2eResult<()>;

    /// Drain the dialogs recorded so far.
    async fn take_dialogs(&self) -> E2eResult<Vec<DialogEvent>>;

    async fn close(&self) -> E2eResult<()>;
}

/// Starts a fresh browser session for each test case.
#[async_trait]
pub trait DriverLauncher: Send + Sync {
    async fn launch(&self) -> E2eResult<Arc<dyn BrowserDriver>>;

    fn name(&self) -> &'static str;
}

/// Render a JSON property value the way `String(value)` would in a page.
pub fn property_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}
