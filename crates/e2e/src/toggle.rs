//! Checkbox and radio interactions

use tracing::debug;

use crate::driver::ActionOptions;
use crate::error::E2eResult;
use crate::session::Session;
use crate::subject::Subject;

/// How a "make this checked" request is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleMode {
    /// Always dispatch the check, skipping visibility and actionability
    /// checks.
    Force,
    /// Dispatch the check only when the element is not already checked.
    Idempotent { force: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// A check action was dispatched
    Applied,
    /// The element was already checked and left alone
    Unchanged,
}

impl Session {
    /// Bring every node of the subject to the checked state.
    pub async fn set_checked(
        &mut self,
        subject: &Subject,
        mode: ToggleMode,
    ) -> E2eResult<Vec<ToggleOutcome>> {
        let mut outcomes = Vec::with_capacity(subject.len());
        for node in subject.split() {
            let outcome = match mode {
                ToggleMode::Force => {
                    self.check(&node, ActionOptions::FORCE).await?;
                    ToggleOutcome::Applied
                }
                ToggleMode::Idempotent { force } => {
                    if self.is_checked(&node).await? {
                        debug!("{} already checked", node);
                        ToggleOutcome::Unchanged
                    } else {
                        self.check(&node, ActionOptions { force }).await?;
                        ToggleOutcome::Applied
                    }
                }
            };
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }

    /// Click a checkbox regardless of its state, flipping it.
    pub async fn toggle(&mut self, subject: &Subject) -> E2eResult<bool> {
        self.click(subject, ActionOptions::FORCE).await?;
        self.is_checked(subject).await
    }

    pub async fn is_checked(&mut self, subject: &Subject) -> E2eResult<bool> {
        let driver = self.driver();
        let el = subject.head();
        self.record(format!("checked?:{}", subject), async move {
            driver.is_checked(el).await
        })
        .await
    }
}
