//! Main test runner that launches a browser per case and executes scenarios

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::{SessionConfig, SuiteConfig};
use crate::driver::DriverLauncher;
use crate::error::E2eResult;
use crate::pages::NavigationPage;
use crate::session::{Session, StepResult};
use crate::suite::Scenario;

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
}

/// Result of running all tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub suite: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

/// Which scenarios to run
#[derive(Debug, Clone, Default)]
pub struct ScenarioFilter {
    /// Case-insensitive substring of the scenario name
    pub name: Option<String>,
    /// Exact context name
    pub context: Option<String>,
}

impl ScenarioFilter {
    pub fn accepts(&self, scenario: &Scenario) -> bool {
        let name_ok = self.name.as_ref().map_or(true, |n| {
            scenario.name.to_lowercase().contains(&n.to_lowercase())
        });
        let context_ok = self
            .context
            .as_ref()
            .map_or(true, |c| scenario.context == Some(c.as_str()));
        name_ok && context_ok
    }
}

/// Configuration for the test runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub session: SessionConfig,
    pub filter: ScenarioFilter,
    pub output_dir: PathBuf,
    /// Date used by date-relative steps; None = the local date
    pub today: Option<NaiveDate>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self::from_suite(&SuiteConfig::default())
    }
}

impl RunnerConfig {
    pub fn from_suite(config: &SuiteConfig) -> Self {
        Self {
            session: config.session(),
            filter: ScenarioFilter::default(),
            output_dir: config.output_dir.clone(),
            today: None,
        }
    }
}

/// Main E2E test runner
pub struct TestRunner {
    launcher: Arc<dyn DriverLauncher>,
    config: RunnerConfig,
}

impl TestRunner {
    pub fn new(launcher: Arc<dyn DriverLauncher>, config: RunnerConfig) -> Self {
        Self { launcher, config }
    }

    /// Run every scenario accepted by the filter
    pub async fn run_suite(&self, suite_name: &str, scenarios: &[Scenario]) -> TestSuiteResult {
        let start = Instant::now();
        let mut results = Vec::new();
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        info!(
            "Running {} ({} scenario(s), driver: {})",
            suite_name,
            scenarios.len(),
            self.launcher.name()
        );

        for scenario in scenarios {
            if !self.config.filter.accepts(scenario) {
                debug!("Skipping {}", scenario.title());
                skipped += 1;
                continue;
            }

            let result = self.run_scenario(scenario).await;
            if result.success {
                passed += 1;
                info!("✓ {} ({} ms)", result.name, result.duration_ms);
            } else {
                failed += 1;
                error!(
                    "✗ {} - {}",
                    result.name,
                    result.error.as_deref().unwrap_or("unknown error")
                );
            }
            results.push(result);
        }

        let duration_ms = start.elapsed().as_millis() as u64;

        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        TestSuiteResult {
            suite: suite_name.to_string(),
            total: scenarios.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        }
    }

    /// Run one scenario in a fresh browser session
    pub async fn run_scenario(&self, scenario: &Scenario) -> TestResult {
        let start = Instant::now();
        let name = scenario.title();
        debug!("Running test: {}", name);

        let driver = match self.launcher.launch().await {
            Ok(driver) => driver,
            Err(e) => {
                return TestResult {
                    name,
                    success: false,
                    duration_ms: start.elapsed().as_millis() as u64,
                    steps: vec![],
                    error: Some(format!("browser launch failed: {}", e)),
                }
            }
        };

        let mut session = Session::new(Arc::clone(&driver), self.config.session);
        if let Some(today) = self.config.today {
            session = session.with_today(today);
        }

        let outcome = Self::execute(&mut session, scenario).await;

        if let Err(e) = driver.close().await {
            warn!("Failed to close browser session: {}", e);
        }

        TestResult {
            name,
            success: outcome.is_ok(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps: session.take_steps(),
            error: outcome.err().map(|e| e.to_string()),
        }
    }

    async fn execute(session: &mut Session, scenario: &Scenario) -> E2eResult<()> {
        let nav = NavigationPage;
        nav.open_home_page(session).await?;
        if let Some(page) = scenario.page {
            nav.navigate(session, page).await?;
        }
        (scenario.run)(session).await
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
