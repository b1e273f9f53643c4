//! Suite configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{E2eError, E2eResult};
use crate::server::AppServerConfig;

/// Top-level configuration, loadable from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Base URL of the application under test
    pub base_url: String,

    /// Browser engine used by the Playwright bridge
    pub browser: BrowserKind,

    /// Run the browser without a window
    pub headless: bool,

    /// Viewport size for the browser
    pub viewport: Viewport,

    /// How long queries and assertions retry before failing
    pub command_timeout_ms: u64,

    /// Delay between retries
    pub poll_interval_ms: u64,

    /// Fixed wait after changing a table filter
    pub filter_settle_ms: u64,

    /// Output directory for results
    pub output_dir: PathBuf,

    /// How to start the application under test (None = already running)
    pub app: Option<AppServerConfig>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4200".to_string(),
            browser: BrowserKind::Chromium,
            headless: true,
            viewport: Viewport::default(),
            command_timeout_ms: 4000,
            poll_interval_ms: 50,
            filter_settle_ms: 1000,
            output_dir: PathBuf::from("test-results"),
            app: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 1920,
            height: 1080,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for BrowserKind {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "webkit" => Ok(BrowserKind::Webkit),
            other => Err(E2eError::Config(format!("unknown browser: {}", other))),
        }
    }
}

/// Timing knobs handed to each [`crate::session::Session`].
#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub command_timeout: Duration,
    pub poll_interval: Duration,
    pub filter_settle: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SuiteConfig::default().session()
    }
}

impl SuiteConfig {
    /// Parse a config from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::Config(format!(
                "base_url must be an http(s) URL, got {}",
                self.base_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(E2eError::Config("poll_interval_ms must be positive".into()));
        }
        if self.poll_interval_ms > self.command_timeout_ms {
            return Err(E2eError::Config(
                "poll_interval_ms must not exceed command_timeout_ms".into(),
            ));
        }
        Ok(())
    }

    pub fn session(&self) -> SessionConfig {
        SessionConfig {
            command_timeout: Duration::from_millis(self.command_timeout_ms),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            filter_settle: Duration::from_millis(self.filter_settle_ms),
        }
    }
}
