//! Reading values off captured elements and asserting on them

use std::fmt;
use std::sync::Arc;

use crate::driver::{property_to_string, BrowserDriver};
use crate::error::{E2eError, E2eResult};
use crate::session::{retry, Session};
use crate::subject::Subject;

/// What to read from an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extract {
    /// Text content
    Text,
    /// A named HTML attribute
    Attribute(String),
    /// A named DOM property, e.g. `value`
    Property(String),
}

impl Extract {
    pub fn attr(name: &str) -> Self {
        Extract::Attribute(name.to_string())
    }

    pub fn prop(name: &str) -> Self {
        Extract::Property(name.to_string())
    }
}

impl fmt::Display for Extract {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extract::Text => f.write_str("text"),
            Extract::Attribute(name) => write!(f, "attr:{}", name),
            Extract::Property(name) => write!(f, "prop:{}", name),
        }
    }
}

/// How an extracted value is compared against the expected literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Match {
    Exact(String),
    Contains(String),
}

impl Match {
    pub fn exact(s: impl Into<String>) -> Self {
        Match::Exact(s.into())
    }

    pub fn contains(s: impl Into<String>) -> Self {
        Match::Contains(s.into())
    }

    pub fn matches(&self, actual: &str) -> bool {
        match self {
            Match::Exact(expected) => actual == expected,
            Match::Contains(expected) => actual.contains(expected.as_str()),
        }
    }
}

impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Match::Exact(s) => write!(f, "{:?}", s),
            Match::Contains(s) => write!(f, "to contain {:?}", s),
        }
    }
}

/// Retrying assertions on a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expectation {
    /// Text content contains the string
    Contain(String),
    /// Text content equals the string
    HaveText(String),
    /// Text content, trimmed, equals the string
    HaveTrimmedText(String),
    /// The `value` property equals the string
    HaveValue(String),
    BeChecked,
    NotBeChecked,
    BeDisabled,
    BeEnabled,
    HaveLength(usize),
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Contain(s) => write!(f, "contain {:?}", s),
            Expectation::HaveText(s) => write!(f, "have text {:?}", s),
            Expectation::HaveTrimmedText(s) => write!(f, "have trimmed text {:?}", s),
            Expectation::HaveValue(s) => write!(f, "have value {:?}", s),
            Expectation::BeChecked => f.write_str("be checked"),
            Expectation::NotBeChecked => f.write_str("not be checked"),
            Expectation::BeDisabled => f.write_str("be disabled"),
            Expectation::BeEnabled => f.write_str("be enabled"),
            Expectation::HaveLength(n) => write!(f, "have length {}", n),
        }
    }
}

impl Session {
    /// Read a value from the first node of the subject.
    pub async fn invoke(&mut self, subject: &Subject, what: Extract) -> E2eResult<String> {
        let driver = self.driver();
        let subject_owned = subject.clone();
        self.record(format!("invoke:{} {}", subject, what), async move {
            read_value(driver, &subject_owned, &what).await
        })
        .await
    }

    /// Read a value once and compare it, without retrying.
    pub async fn expect_value(
        &mut self,
        subject: &Subject,
        what: Extract,
        expected: Match,
    ) -> E2eResult<String> {
        let actual = self.invoke(subject, what.clone()).await?;
        if expected.matches(&actual) {
            Ok(actual)
        } else {
            Err(E2eError::mismatch(
                format!("{} {}", subject, what),
                expected.to_string(),
                format!("{:?}", actual),
            ))
        }
    }

    /// Assert on a subject, retrying until the command timeout.
    pub async fn should(&mut self, subject: &Subject, expectation: Expectation) -> E2eResult<()> {
        let driver = self.driver();
        let config = self.config();
        let subject_owned = subject.clone();
        self.record(format!("should:{} {}", subject, expectation), async move {
            retry(config, || {
                evaluate(Arc::clone(&driver), subject_owned.clone(), expectation.clone())
            })
            .await
        })
        .await
    }
}

async fn read_value(
    driver: Arc<dyn BrowserDriver>,
    subject: &Subject,
    what: &Extract,
) -> E2eResult<String> {
    let el = subject.head();
    match what {
        Extract::Text => driver.text(el).await,
        Extract::Attribute(name) => driver
            .attribute(el, name)
            .await?
            .ok_or_else(|| E2eError::not_found(format!("{}@{}", subject, name))),
        Extract::Property(name) => driver
            .property(el, name)
            .await?
            .map(|v| property_to_string(&v))
            .ok_or_else(|| E2eError::not_found(format!("{}.{}", subject, name))),
    }
}

async fn evaluate(
    driver: Arc<dyn BrowserDriver>,
    subject: Subject,
    expectation: Expectation,
) -> E2eResult<()> {
    let label = subject.to_string();
    let el = subject.head();
    let (ok, actual) = match &expectation {
        Expectation::Contain(s) => {
            let text = driver.text(el).await?;
            (text.contains(s.as_str()), format!("{:?}", text))
        }
        Expectation::HaveText(s) => {
            let text = driver.text(el).await?;
            (&text == s, format!("{:?}", text))
        }
        Expectation::HaveTrimmedText(s) => {
            let text = driver.text(el).await?;
            (text.trim() == s.as_str(), format!("{:?}", text))
        }
        Expectation::HaveValue(s) => {
            let value = driver
                .property(el, "value")
                .await?
                .map(|v| property_to_string(&v))
                .unwrap_or_default();
            (&value == s, format!("value {:?}", value))
        }
        Expectation::BeChecked | Expectation::NotBeChecked => {
            let checked = driver.is_checked(el).await?;
            let want = expectation == Expectation::BeChecked;
            (checked == want, if checked { "checked" } else { "unchecked" }.to_string())
        }
        Expectation::BeDisabled | Expectation::BeEnabled => {
            let disabled = driver.is_disabled(el).await?;
            let want = expectation == Expectation::BeDisabled;
            (disabled == want, if disabled { "disabled" } else { "enabled" }.to_string())
        }
        Expectation::HaveLength(n) => (subject.len() == *n, format!("length {}", subject.len())),
    };

    if ok {
        Ok(())
    } else {
        Err(E2eError::mismatch(label, expectation.to_string(), actual))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_substring_matching() {
        assert!(Match::exact("Email address").matches("Email address"));
        assert!(!Match::exact("Email address").matches(" Email address "));
        assert!(Match::contains("Email").matches("Email address"));
        assert!(!Match::contains("Password").matches("Email address"));
    }

    #[test]
    fn test_extract_labels() {
        assert_eq!(Extract::attr("class").to_string(), "attr:class");
        assert_eq!(Extract::prop("value").to_string(), "prop:value");
        assert_eq!(Extract::Text.to_string(), "text");
    }

    #[test]
    fn test_expectation_labels() {
        assert_eq!(Expectation::NotBeChecked.to_string(), "not be checked");
        assert_eq!(
            Expectation::Contain("Dark".into()).to_string(),
            "contain \"Dark\""
        );
        assert_eq!(
            Expectation::HaveTrimmedText("Dark".into()).to_string(),
            "have trimmed text \"Dark\""
        );
    }
}
