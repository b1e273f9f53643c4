//! WebElements E2E Suite
//!
//! Browser end-to-end tests for the form, overlay and table widgets of the
//! ngx-admin sample application. The crate:
//! - Optionally spawns the application's dev server and waits for it
//! - Drives a browser through a Playwright bridge, or an in-memory sandbox
//! - Exposes command-style primitives (query, act, assert) on a [`Session`]
//! - Runs the web elements suite and writes a JSON report
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── launcher.launch() -> Arc<dyn BrowserDriver>          │
//! │    ├── NavigationPage::open_home_page / navigate            │
//! │    ├── (scenario.run)(&mut Session)                         │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Session (one per test case)                                │
//! │    ├── get / find / contains       -> Subject               │
//! │    ├── alias / aliased / within                             │
//! │    ├── click / check / type_text / clear                    │
//! │    ├── invoke / expect_value / should                       │
//! │    ├── set_checked / toggle        (ToggleMode)             │
//! │    ├── select_each                 (ReopenPolicy)           │
//! │    ├── filter_table                (TableFilter)            │
//! │    └── trigger_confirmation        (ConfirmationPolicy)     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  BrowserDriver                                              │
//! │    ├── PlaywrightDriver  (node bridge, JSON lines)          │
//! │    └── SandboxDriver     (in-memory application model)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod datepicker;
pub mod dialog;
pub mod driver;
pub mod error;
pub mod extract;
pub mod iterate;
pub mod pages;
pub mod playwright;
pub mod runner;
pub mod sandbox;
pub mod server;
pub mod session;
pub mod subject;
pub mod suite;
pub mod table;
pub mod toggle;

pub use config::SuiteConfig;
pub use driver::{ActionOptions, BrowserDriver, DriverLauncher, ElementHandle};
pub use error::{E2eError, E2eResult};
pub use runner::{RunnerConfig, TestRunner, TestSuiteResult};
pub use session::Session;
pub use subject::Subject;
