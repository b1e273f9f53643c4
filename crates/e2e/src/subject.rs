//! Captured element references

use std::fmt;

use crate::driver::ElementHandle;
use crate::error::{E2eError, E2eResult};

/// One or more DOM nodes captured by a query, reused for later sub-queries
/// and assertions within a test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subject {
    selector: String,
    handles: Vec<ElementHandle>,
}

impl Subject {
    /// Capture a non-empty set of handles.
    pub fn new(selector: impl Into<String>, handles: Vec<ElementHandle>) -> E2eResult<Self> {
        let selector = selector.into();
        if handles.is_empty() {
            return Err(E2eError::not_found(selector));
        }
        Ok(Subject { selector, handles })
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn handles(&self) -> &[ElementHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// The first node; subjects are never empty.
    pub fn head(&self) -> ElementHandle {
        self.handles[0]
    }

    /// Narrow to the node at `index`.
    pub fn eq(&self, index: usize) -> E2eResult<Subject> {
        let selector = format!("{}:eq({})", self.selector, index);
        match self.handles.get(index) {
            Some(handle) => Ok(Subject {
                selector,
                handles: vec![*handle],
            }),
            None => Err(E2eError::not_found(selector)),
        }
    }

    pub fn first(&self) -> Subject {
        Subject {
            selector: format!("{}:first", self.selector),
            handles: vec![self.head()],
        }
    }

    /// Each node as its own subject, in document order.
    pub fn split(&self) -> Vec<Subject> {
        self.handles
            .iter()
            .enumerate()
            .map(|(i, h)| Subject {
                selector: format!("{}:eq({})", self.selector, i),
                handles: vec![*h],
            })
            .collect()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.selector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radios() -> Subject {
        Subject::new(
            "[type=\"radio\"]",
            vec![ElementHandle(4), ElementHandle(5), ElementHandle(6)],
        )
        .unwrap()
    }

    #[test]
    fn test_empty_capture_is_not_found() {
        let err = Subject::new("nb-card", vec![]).unwrap_err();
        assert!(matches!(err, E2eError::ElementNotFound { selector } if selector == "nb-card"));
    }

    #[test]
    fn test_eq_narrows_and_names_index() {
        let second = radios().eq(1).unwrap();
        assert_eq!(second.handles(), &[ElementHandle(5)]);
        assert_eq!(second.selector(), "[type=\"radio\"]:eq(1)");
    }

    #[test]
    fn test_eq_out_of_range() {
        let err = radios().eq(3).unwrap_err();
        assert_eq!(err.to_string(), "Element not found: [type=\"radio\"]:eq(3)");
    }

    #[test]
    fn test_split_keeps_order() {
        let parts = radios().split();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].head(), ElementHandle(6));
    }
}
