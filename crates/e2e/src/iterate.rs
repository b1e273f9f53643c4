//! Walking a dynamic option list and cross-checking a display element

use tracing::debug;

use crate::driver::{ActionOptions, ElementHandle};
use crate::error::E2eResult;
use crate::extract::{Expectation, Extract};
use crate::session::Session;
use crate::subject::Subject;

/// Decides whether the collection is reopened after the item at `index`
/// has been selected.
pub trait ReopenPolicy {
    fn should_reopen(&self, index: usize) -> bool;
}

/// Reopen after every index strictly below the bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReopenBelow(pub usize);

impl ReopenPolicy for ReopenBelow {
    fn should_reopen(&self, index: usize) -> bool {
        index < self.0
    }
}

/// Reopen after every item but the last of a collection of `len` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReopenUntilLast(pub usize);

impl ReopenPolicy for ReopenUntilLast {
    fn should_reopen(&self, index: usize) -> bool {
        index + 1 < self.0
    }
}

impl<F: Fn(usize) -> bool> ReopenPolicy for F {
    fn should_reopen(&self, index: usize) -> bool {
        self(index)
    }
}

/// Stateful iterator over a snapshot of a collection, in document order.
///
/// The snapshot is taken once; re-rendering the collection does not change
/// what the cursor yields.
#[derive(Debug, Clone)]
pub struct OptionCursor {
    selector: String,
    items: Vec<ElementHandle>,
    position: usize,
}

impl OptionCursor {
    pub fn new(snapshot: &Subject) -> Self {
        Self {
            selector: snapshot.selector().to_string(),
            items: snapshot.handles().to_vec(),
            position: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl Iterator for OptionCursor {
    type Item = (usize, Subject);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.position;
        let handle = *self.items.get(index)?;
        self.position += 1;
        let subject = Subject::new(format!("{}:eq({})", self.selector, index), vec![handle]).ok()?;
        Some((index, subject))
    }
}

impl Session {
    /// Open `display`, select each option matching `options` in turn and
    /// assert `display` shows the option's trimmed text. Returns the texts
    /// in selection order.
    pub async fn select_each<P: ReopenPolicy>(
        &mut self,
        display: &Subject,
        options: &str,
        policy: P,
    ) -> E2eResult<Vec<String>> {
        self.click(display, ActionOptions::default()).await?;
        let snapshot = self.get(options).await?;
        let cursor = OptionCursor::new(&snapshot);
        debug!("iterating {} option(s) of {}", cursor.len(), options);

        let mut selected = Vec::with_capacity(cursor.len());
        for (index, option) in cursor {
            let text = self.invoke(&option, Extract::Text).await?.trim().to_string();
            self.click(&option, ActionOptions::default()).await?;
            self.should(display, Expectation::HaveTrimmedText(text.clone())).await?;
            if policy.should_reopen(index) {
                self.click(display, ActionOptions::default()).await?;
            }
            selected.push(text);
        }
        Ok(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reopen_below_gates_by_index() {
        let policy = ReopenBelow(3);
        let reopened: Vec<bool> = (0..4).map(|i| policy.should_reopen(i)).collect();
        assert_eq!(reopened, vec![true, true, true, false]);
    }

    #[test]
    fn test_reopen_until_last() {
        let policy = ReopenUntilLast(2);
        assert!(policy.should_reopen(0));
        assert!(!policy.should_reopen(1));
    }

    #[test]
    fn test_closure_policy() {
        let even = |i: usize| i % 2 == 0;
        assert!(even.should_reopen(2));
        assert!(!even.should_reopen(3));
    }

    #[test]
    fn test_cursor_yields_snapshot_in_order() {
        let snapshot = Subject::new(
            "ul.options-list nb-option",
            vec![ElementHandle(10), ElementHandle(11), ElementHandle(12)],
        )
        .unwrap();
        let mut cursor = OptionCursor::new(&snapshot);
        assert_eq!(cursor.len(), 3);

        let (i, first) = cursor.next().unwrap();
        assert_eq!(i, 0);
        assert_eq!(first.head(), ElementHandle(10));
        assert_eq!(cursor.position(), 1);

        let rest: Vec<usize> = cursor.map(|(i, _)| i).collect();
        assert_eq!(rest, vec![1, 2]);
    }
}
