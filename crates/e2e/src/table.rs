//! Filter-then-verify scenario over a data table

use std::time::Duration;

use tracing::{debug, info};

use crate::error::{E2eError, E2eResult};
use crate::extract::Expectation;
use crate::session::Session;

/// One column filter of a smart table and the checks run after applying it.
#[derive(Debug, Clone)]
pub struct TableFilter {
    /// Filter input in the table header
    pub input: String,
    /// Rows of the table body
    pub rows: String,
    /// Zero-based `td` index compared against the filter value
    pub column: usize,
    /// Fixed wait for the table to refresh after typing
    pub settle: Duration,
    /// Filter value known to match nothing
    pub no_match_sentinel: Option<String>,
    /// Text of the placeholder row shown for an empty result
    pub no_data_text: String,
}

impl TableFilter {
    /// The Age column of the smart table.
    pub fn age(settle: Duration) -> Self {
        Self {
            input: r#"thead input[placeholder="Age"]"#.to_string(),
            rows: "tbody tr".to_string(),
            column: 6,
            settle,
            no_match_sentinel: Some("200".to_string()),
            no_data_text: "No data found".to_string(),
        }
    }

    pub fn is_sentinel(&self, value: &str) -> bool {
        self.no_match_sentinel.as_deref() == Some(value)
    }
}

/// What was observed for one filter value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterReport {
    pub value: String,
    pub rows: usize,
    pub no_data: bool,
}

impl Session {
    /// Apply each value in order and verify the resulting rows.
    pub async fn filter_table<V: ToString>(
        &mut self,
        filter: &TableFilter,
        values: &[V],
    ) -> E2eResult<Vec<FilterReport>> {
        let mut reports = Vec::with_capacity(values.len());
        for value in values {
            let value = value.to_string();
            reports.push(self.apply_filter(filter, &value).await?);
        }
        Ok(reports)
    }

    async fn apply_filter(&mut self, filter: &TableFilter, value: &str) -> E2eResult<FilterReport> {
        let input = self.get(&filter.input).await?;
        self.clear(&input).await?;
        self.type_text(&input, value).await?;
        self.wait(filter.settle).await?;

        let rows = self.get(&filter.rows).await?;
        debug!("filter {:?} left {} row(s)", value, rows.len());

        if filter.is_sentinel(value) {
            if rows.len() != 1 {
                return Err(E2eError::mismatch(
                    rows.to_string(),
                    format!("a single \"{}\" row", filter.no_data_text),
                    format!("{} rows", rows.len()),
                ));
            }
            self.should(&rows.first(), Expectation::Contain(filter.no_data_text.clone()))
                .await?;
            info!("filter {:?}: no data", value);
            return Ok(FilterReport {
                value: value.to_string(),
                rows: 0,
                no_data: true,
            });
        }

        for row in rows.split() {
            let cells = self.find(&row, "td").await?;
            let cell = cells.eq(filter.column)?;
            self.should(&cell, Expectation::Contain(value.to_string()))
                .await?;
        }
        info!("filter {:?}: {} matching row(s)", value, rows.len());
        Ok(FilterReport {
            value: value.to_string(),
            rows: rows.len(),
            no_data: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_filter_defaults() {
        let filter = TableFilter::age(Duration::from_millis(1000));
        assert_eq!(filter.column, 6);
        assert!(filter.is_sentinel("200"));
        assert!(!filter.is_sentinel("20"));
    }
}
