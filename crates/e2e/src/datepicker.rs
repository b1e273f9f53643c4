//! Datepicker page object

use std::cmp::Ordering;

use chrono::{Datelike, Duration as ChronoDuration, NaiveDate};
use tracing::{debug, info};

use crate::driver::ActionOptions;
use crate::error::{E2eError, E2eResult};
use crate::extract::{Expectation, Extract, Match};
use crate::session::Session;

/// Attribute of `nb-calendar-navigation` holding the month in view.
const VIEW_DATE_ATTR: &str = "ng-reflect-date";

/// Month pager of the open calendar; the sidebar uses the same chevron icons.
const PAGER: &str = "nb-calendar-pageable-navigation";

/// Upper bound on calendar paging for a single selection.
const MAX_MONTH_STEPS: usize = 36;

/// Input value format of the common datepicker, e.g. `May 7, 2027`.
pub fn format_picker_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// Extract (year, month) from the navigation attribute, e.g.
/// `Mon May 03 2027 00:00:00 GMT+0000` or `May 2027`.
pub fn parse_view_month(value: &str) -> Option<(i32, u32)> {
    const MONTHS: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    let mut month = None;
    let mut year = None;
    for token in value.split_whitespace() {
        if month.is_none() {
            if let Some(i) = MONTHS.iter().position(|m| token.starts_with(m)) {
                month = Some(i as u32 + 1);
                continue;
            }
        }
        if month.is_some() && year.is_none() && token.len() == 4 {
            year = token.parse::<i32>().ok();
        }
    }
    Some((year?, month?))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DatepickerPage;

impl DatepickerPage {
    /// Pick the date `offset_days` from today in the "Common Datepicker"
    /// card and assert the input shows it. Returns the asserted value.
    pub async fn select_common_datepicker_date_from_today(
        &self,
        session: &mut Session,
        offset_days: i64,
    ) -> E2eResult<String> {
        let target = session.today() + ChronoDuration::days(offset_days);
        let expected = format_picker_date(target);
        info!("Selecting {} ({} day(s) from today)", expected, offset_days);

        let card = session.contains("nb-card", "Common Datepicker").await?;
        let input = session.find(&card, "input").await?;
        session.click(&input, ActionOptions::default()).await?;

        self.page_to_month(session, target).await?;
        self.click_day(session, target).await?;

        session
            .expect_value(&input, Extract::prop("value"), Match::contains(expected.clone()))
            .await?;
        session
            .should(&input, Expectation::HaveValue(expected.clone()))
            .await?;
        Ok(expected)
    }

    async fn page_to_month(&self, session: &mut Session, target: NaiveDate) -> E2eResult<()> {
        let wanted = (target.year(), target.month());
        for _ in 0..MAX_MONTH_STEPS {
            let nav = session.get("nb-calendar-navigation").await?;
            let raw = session.invoke(&nav, Extract::attr(VIEW_DATE_ATTR)).await?;
            let shown = parse_view_month(&raw).ok_or_else(|| {
                E2eError::mismatch("nb-calendar-navigation", "a month and year", format!("{:?}", raw))
            })?;
            let chevron = match shown.cmp(&wanted) {
                Ordering::Equal => return Ok(()),
                Ordering::Less => "chevron-right",
                Ordering::Greater => "chevron-left",
            };
            debug!("calendar shows {:?}, want {:?}", shown, wanted);
            let button = session
                .get(&format!("{} [data-name=\"{}\"]", PAGER, chevron))
                .await?;
            session.click(&button, ActionOptions::default()).await?;
        }
        Err(E2eError::Timeout(format!(
            "calendar to reach {} within {} months",
            target.format("%b %Y"),
            MAX_MONTH_STEPS
        )))
    }

    async fn click_day(&self, session: &mut Session, target: NaiveDate) -> E2eResult<()> {
        let day = target.day().to_string();
        let cells = session.get(".day-cell").await?;
        let driver = session.driver();
        for cell in cells.split() {
            let class = driver.attribute(cell.head(), "class").await?.unwrap_or_default();
            if class.split_whitespace().any(|c| c == "bounding-month") {
                continue;
            }
            let text = session.invoke(&cell, Extract::Text).await?;
            if text.trim() == day {
                return session.click(&cell, ActionOptions::default()).await;
            }
        }
        Err(E2eError::not_found(format!(".day-cell:not(.bounding-month):contains(\"{}\")", day)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_picker_date() {
        let date = NaiveDate::from_ymd_opt(2027, 5, 7).unwrap();
        assert_eq!(format_picker_date(date), "May 7, 2027");
    }

    #[test]
    fn test_parse_view_month_long_form() {
        assert_eq!(
            parse_view_month("Mon May 03 2027 00:00:00 GMT+0000 (Coordinated Universal Time)"),
            Some((2027, 5))
        );
    }

    #[test]
    fn test_parse_view_month_short_form() {
        assert_eq!(parse_view_month("Oct 2026"), Some((2026, 10)));
        assert_eq!(parse_view_month("no date here"), None);
    }

    #[test]
    fn test_offset_crosses_year() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let target = today + ChronoDuration::days(200);
        assert_eq!(format_picker_date(target), "May 7, 2027");
    }
}
