//! Per-test-case browser context.
//!
//! A [`Session`] owns everything a test case touches: the driver for the
//! browser session, the aliases captured so far, timing configuration and
//! the command log. It is passed explicitly to every step; nothing in the
//! suite reaches for ambient browser state.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SessionConfig;
use crate::driver::{ActionOptions, BrowserDriver, ElementHandle};
use crate::error::{E2eError, E2eResult};
use crate::subject::Subject;

/// Result of executing one session command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub success: bool,
    pub step_name: String,
    pub duration_ms: u64,
    pub error: Option<String>,
}

pub struct Session {
    driver: Arc<dyn BrowserDriver>,
    config: SessionConfig,
    aliases: HashMap<String, Subject>,
    steps: Vec<StepResult>,
    today: Option<NaiveDate>,
}

impl Session {
    pub fn new(driver: Arc<dyn BrowserDriver>, config: SessionConfig) -> Self {
        Self {
            driver,
            config,
            aliases: HashMap::new(),
            steps: Vec::new(),
            today: None,
        }
    }

    /// Pin the date used by date-relative steps.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn driver(&self) -> Arc<dyn BrowserDriver> {
        Arc::clone(&self.driver)
    }

    pub fn steps(&self) -> &[StepResult] {
        &self.steps
    }

    pub fn take_steps(&mut self) -> Vec<StepResult> {
        std::mem::take(&mut self.steps)
    }

    /// Run one command and append it to the command log.
    pub(crate) async fn record<T, Fut>(&mut self, name: impl Into<String>, command: Fut) -> E2eResult<T>
    where
        Fut: Future<Output = E2eResult<T>>,
    {
        let step_name = name.into();
        let start = Instant::now();
        debug!("Executing step: {}", step_name);

        let result = command.await;

        self.steps.push(StepResult {
            success: result.is_ok(),
            step_name,
            duration_ms: start.elapsed().as_millis() as u64,
            error: result.as_ref().err().map(|e| e.to_string()),
        });
        result
    }

    // Navigation

    pub async fn visit(&mut self, path: &str) -> E2eResult<()> {
        let driver = self.driver();
        let target = path.to_string();
        self.record(format!("visit:{}", path), async move { driver.goto(&target).await })
            .await
    }

    /// Poll until the browser location ends with `path`.
    pub async fn expect_path(&mut self, path: &str) -> E2eResult<()> {
        let driver = self.driver();
        let config = self.config;
        let expected = path.to_string();
        self.record(format!("location:{}", path), async move {
            retry(config, || location_matches(Arc::clone(&driver), expected.clone())).await
        })
        .await
    }

    pub async fn wait(&mut self, duration: Duration) -> E2eResult<()> {
        self.record(format!("wait:{}ms", duration.as_millis()), async move {
            tokio::time::sleep(duration).await;
            Ok(())
        })
        .await
    }

    // Queries

    /// All nodes matching `selector`, polled until at least one exists.
    pub async fn get(&mut self, selector: &str) -> E2eResult<Subject> {
        self.query(selector, None).await
    }

    /// Sub-query scoped to the nodes of a captured subject.
    pub async fn find(&mut self, subject: &Subject, selector: &str) -> E2eResult<Subject> {
        self.query(selector, Some(subject.clone())).await
    }

    async fn query(&mut self, selector: &str, scope: Option<Subject>) -> E2eResult<Subject> {
        let driver = self.driver();
        let config = self.config;
        let selector = selector.to_string();
        let name = match &scope {
            Some(s) => format!("find:{} {}", s, selector),
            None => format!("get:{}", selector),
        };
        self.record(name, async move {
            retry(config, || {
                query_all(Arc::clone(&driver), selector.clone(), scope.clone())
            })
            .await
        })
        .await
    }

    /// First node matching `selector` whose text contains `text`.
    pub async fn contains(&mut self, selector: &str, text: &str) -> E2eResult<Subject> {
        self.contains_in(Some(selector), text, Vec::new()).await
    }

    /// Deepest node whose text contains `text`.
    pub async fn contains_text(&mut self, text: &str) -> E2eResult<Subject> {
        self.contains_in(None, text, Vec::new()).await
    }

    /// Like [`Session::contains`], searching inside each node of `subject`
    /// in order.
    pub async fn contains_within(
        &mut self,
        subject: &Subject,
        selector: &str,
        text: &str,
    ) -> E2eResult<Subject> {
        self.contains_in(Some(selector), text, subject.handles().to_vec())
            .await
    }

    async fn contains_in(
        &mut self,
        selector: Option<&str>,
        text: &str,
        within: Vec<ElementHandle>,
    ) -> E2eResult<Subject> {
        let driver = self.driver();
        let config = self.config;
        let selector = selector.map(str::to_string);
        let text = text.to_string();
        let name = match &selector {
            Some(s) => format!("contains:{} \"{}\"", s, text),
            None => format!("contains:\"{}\"", text),
        };
        self.record(name, async move {
            retry(config, || {
                find_containing(Arc::clone(&driver), selector.clone(), text.clone(), within.clone())
            })
            .await
        })
        .await
    }

    // Subject capture

    /// Save a subject under a name reusable for the rest of the test case.
    pub fn alias(&mut self, name: &str, subject: Subject) {
        debug!("alias @{} -> {}", name, subject);
        self.aliases.insert(name.trim_start_matches('@').to_string(), subject);
    }

    pub fn aliased(&self, name: &str) -> E2eResult<Subject> {
        let key = name.trim_start_matches('@');
        self.aliases
            .get(key)
            .cloned()
            .ok_or_else(|| E2eError::UnknownAlias(key.to_string()))
    }

    /// Hand a captured subject to a callback; the subject is only reachable
    /// from inside it.
    pub async fn within<T, F>(&mut self, subject: Subject, body: F) -> E2eResult<T>
    where
        F: for<'s> FnOnce(&'s mut Session, Subject) -> BoxFuture<'s, E2eResult<T>>,
    {
        debug!("within {}", subject);
        body(self, subject).await
    }

    // Actions

    /// Click a single node.
    pub async fn click(&mut self, subject: &Subject, options: ActionOptions) -> E2eResult<()> {
        if subject.len() != 1 {
            return Err(E2eError::NotInteractable {
                selector: subject.selector().to_string(),
                reason: format!("click needs a single element, subject has {}", subject.len()),
            });
        }
        let driver = self.driver();
        let el = subject.head();
        self.record(format!("click:{}", subject), async move {
            driver.click(el, options).await
        })
        .await
    }

    /// Check every node of the subject.
    pub async fn check(&mut self, subject: &Subject, options: ActionOptions) -> E2eResult<()> {
        let driver = self.driver();
        let handles = subject.handles().to_vec();
        self.record(format!("check:{}", subject), async move {
            for el in handles {
                driver.check(el, options).await?;
            }
            Ok(())
        })
        .await
    }

    pub async fn type_text(&mut self, subject: &Subject, text: &str) -> E2eResult<()> {
        let driver = self.driver();
        let el = subject.head();
        let text = text.to_string();
        self.record(format!("type:{} \"{}\"", subject, text), async move {
            driver.type_text(el, &text).await
        })
        .await
    }

    pub async fn clear(&mut self, subject: &Subject) -> E2eResult<()> {
        let driver = self.driver();
        let el = subject.head();
        self.record(format!("clear:{}", subject), async move { driver.clear(el).await })
            .await
    }
}

/// Re-run `attempt` until it succeeds, fails with a non-retryable error, or
/// the command timeout elapses.
pub(crate) async fn retry<T, F, Fut>(config: SessionConfig, mut attempt: F) -> E2eResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<T>>,
{
    let deadline = tokio::time::Instant::now() + config.command_timeout;
    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && tokio::time::Instant::now() < deadline => {
                tokio::time::sleep(config.poll_interval).await;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn query_all(
    driver: Arc<dyn BrowserDriver>,
    selector: String,
    scope: Option<Subject>,
) -> E2eResult<Subject> {
    match scope {
        None => {
            let handles = driver.query(&selector, None).await?;
            Subject::new(selector, handles)
        }
        Some(scope) => {
            let mut handles = Vec::new();
            for root in scope.handles() {
                for h in driver.query(&selector, Some(*root)).await? {
                    if !handles.contains(&h) {
                        handles.push(h);
                    }
                }
            }
            Subject::new(format!("{} {}", scope.selector(), selector), handles)
        }
    }
}

async fn find_containing(
    driver: Arc<dyn BrowserDriver>,
    selector: Option<String>,
    text: String,
    within: Vec<ElementHandle>,
) -> E2eResult<Subject> {
    let label = match &selector {
        Some(s) => format!("{}:contains(\"{}\")", s, text),
        None => format!(":contains(\"{}\")", text),
    };
    // An empty scope searches the whole document
    let roots: Vec<Option<ElementHandle>> = if within.is_empty() {
        vec![None]
    } else {
        within.into_iter().map(Some).collect()
    };
    for root in roots {
        if let Some(h) = driver.contains(selector.as_deref(), &text, root).await? {
            return Subject::new(label, vec![h]);
        }
    }
    Err(E2eError::not_found(label))
}

async fn location_matches(driver: Arc<dyn BrowserDriver>, expected: String) -> E2eResult<()> {
    let path = driver.current_path().await?;
    if path.trim_end_matches('/').ends_with(expected.trim_end_matches('/')) {
        Ok(())
    } else {
        Err(E2eError::mismatch("location", expected, path))
    }
}
