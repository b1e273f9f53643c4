//! Native `window.confirm` interception

use std::fmt;

use tracing::{debug, warn};

use crate::driver::{ActionOptions, DialogKind};
use crate::error::{E2eError, E2eResult};
use crate::session::Session;
use crate::subject::Subject;

/// How a confirm dialog opened by one triggering action is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationPolicy {
    /// Check each message as the dialog opens and accept it. If no dialog
    /// opens, nothing is checked and the step passes.
    AssertImmediate(String),
    /// Record every call, accept, then require call 0 to carry the message
    /// once the triggering action has settled.
    RecordAndAssertAfter(String),
    /// Answer with a fixed value (false = cancel) and check nothing.
    AutoRespond(bool),
}

impl ConfirmationPolicy {
    /// Value returned from `window.confirm` while the policy is installed.
    pub fn response(&self) -> bool {
        match self {
            ConfirmationPolicy::AssertImmediate(_) | ConfirmationPolicy::RecordAndAssertAfter(_) => {
                true
            }
            ConfirmationPolicy::AutoRespond(answer) => *answer,
        }
    }

    /// Judge the confirm messages recorded while the policy was installed.
    pub fn evaluate(&self, stub: &ConfirmStub) -> E2eResult<()> {
        match self {
            ConfirmationPolicy::AssertImmediate(expected) => {
                if stub.calls().is_empty() {
                    warn!("no confirm dialog opened; message {:?} was never checked", expected);
                }
                for message in stub.calls() {
                    if message != expected {
                        return Err(E2eError::mismatch(
                            "window:confirm",
                            format!("{:?}", expected),
                            format!("{:?}", message),
                        ));
                    }
                }
                Ok(())
            }
            ConfirmationPolicy::RecordAndAssertAfter(expected) => {
                stub.assert_called_with(0, expected)
            }
            ConfirmationPolicy::AutoRespond(_) => Ok(()),
        }
    }
}

impl fmt::Display for ConfirmationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmationPolicy::AssertImmediate(text) => write!(f, "assert-immediate {:?}", text),
            ConfirmationPolicy::RecordAndAssertAfter(text) => write!(f, "record {:?}", text),
            ConfirmationPolicy::AutoRespond(answer) => write!(f, "respond {}", answer),
        }
    }
}

/// Recording stand-in for a confirm handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmStub {
    calls: Vec<String>,
}

impl ConfirmStub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, message: impl Into<String>) {
        self.calls.push(message.into());
    }

    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    pub fn call(&self, index: usize) -> Option<&str> {
        self.calls.get(index).map(String::as_str)
    }

    pub fn assert_called_with(&self, index: usize, expected: &str) -> E2eResult<()> {
        match self.call(index) {
            None => Err(E2eError::DialogNotFired(expected.to_string())),
            Some(message) if message == expected => Ok(()),
            Some(message) => Err(E2eError::mismatch(
                format!("confirm call {}", index),
                format!("{:?}", expected),
                format!("{:?}", message),
            )),
        }
    }
}

/// What happened while a policy was installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationOutcome {
    pub stub: ConfirmStub,
    /// Whether the last confirm was accepted; None if none opened
    pub accepted: Option<bool>,
}

impl Session {
    /// Click `target` with exactly one confirmation policy installed.
    pub async fn trigger_confirmation(
        &mut self,
        target: &Subject,
        policy: ConfirmationPolicy,
    ) -> E2eResult<ConfirmationOutcome> {
        let driver = self.driver();

        let stale = driver.take_dialogs().await?;
        if !stale.is_empty() {
            debug!("discarding {} dialog(s) from earlier steps", stale.len());
        }
        driver.set_confirm_response(policy.response()).await?;

        let clicked = self.click(target, ActionOptions::default()).await;
        let events = driver.take_dialogs().await;
        driver.set_confirm_response(true).await?;
        clicked?;

        let mut stub = ConfirmStub::new();
        let mut accepted = None;
        for event in events?.into_iter().filter(|e| e.kind == DialogKind::Confirm) {
            accepted = Some(event.accepted);
            stub.record(event.message);
        }

        let label = format!("confirm:{} {}", target, policy);
        let verdict = policy.evaluate(&stub);
        self.record(label, async move { verdict }).await?;

        Ok(ConfirmationOutcome { stub, accepted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELETE: &str = "Are you sure you want to delete?";

    fn fired(messages: &[&str]) -> ConfirmStub {
        let mut stub = ConfirmStub::new();
        for m in messages {
            stub.record(*m);
        }
        stub
    }

    #[test]
    fn test_responses() {
        assert!(ConfirmationPolicy::AssertImmediate(DELETE.into()).response());
        assert!(ConfirmationPolicy::RecordAndAssertAfter(DELETE.into()).response());
        assert!(!ConfirmationPolicy::AutoRespond(false).response());
    }

    #[test]
    fn test_assert_immediate_passes_when_nothing_fired() {
        let policy = ConfirmationPolicy::AssertImmediate(DELETE.into());
        assert!(policy.evaluate(&fired(&[])).is_ok());
        assert!(policy.evaluate(&fired(&[DELETE])).is_ok());
        assert!(policy.evaluate(&fired(&["Delete all?"])).is_err());
    }

    #[test]
    fn test_record_requires_the_call() {
        let policy = ConfirmationPolicy::RecordAndAssertAfter(DELETE.into());
        assert!(policy.evaluate(&fired(&[DELETE])).is_ok());
        assert!(matches!(
            policy.evaluate(&fired(&[])),
            Err(E2eError::DialogNotFired(_))
        ));
        assert!(matches!(
            policy.evaluate(&fired(&["Discard changes?"])),
            Err(E2eError::AssertionFailed { .. })
        ));
    }

    #[test]
    fn test_auto_respond_checks_nothing() {
        let policy = ConfirmationPolicy::AutoRespond(false);
        assert!(policy.evaluate(&fired(&["anything"])).is_ok());
    }

    #[test]
    fn test_stub_call_lookup() {
        let stub = fired(&[DELETE, "again"]);
        assert_eq!(stub.call(1), Some("again"));
        assert_eq!(stub.call(2), None);
    }
}
