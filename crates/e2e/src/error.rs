//! Error types for the E2E suite

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Assertion failed on {subject}: expected {expected}, got {actual}")]
    AssertionFailed {
        subject: String,
        expected: String,
        actual: String,
    },

    #[error("Element {selector} is not interactable: {reason}")]
    NotInteractable { selector: String, reason: String },

    #[error("Element handle {0} is detached from the DOM")]
    StaleElement(u64),

    #[error("Expected confirm dialog \"{0}\" but none was opened")]
    DialogNotFired(String),

    #[error("Unknown alias: @{0}")]
    UnknownAlias(String),

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Playwright not found. Install with: npm i -D playwright && npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Application failed to start: {0}")]
    ServerStartup(String),

    #[error("Application health check failed after {0} attempts")]
    ServerHealthCheck(usize),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    pub fn not_found(selector: impl Into<String>) -> Self {
        E2eError::ElementNotFound {
            selector: selector.into(),
        }
    }

    pub fn mismatch(
        subject: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        E2eError::AssertionFailed {
            subject: subject.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Whether a retrying command may succeed if polled again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            E2eError::ElementNotFound { .. } | E2eError::AssertionFailed { .. }
        )
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
