//! Interaction primitives exercised against the in-memory application

use std::sync::Arc;

use chrono::NaiveDate;
use futures::FutureExt;
use test_case::test_case;

use webelements_e2e::config::SessionConfig;
use webelements_e2e::datepicker::DatepickerPage;
use webelements_e2e::dialog::ConfirmationPolicy;
use webelements_e2e::extract::{Expectation, Extract, Match};
use webelements_e2e::iterate::{ReopenBelow, ReopenUntilLast};
use webelements_e2e::pages::{NavigationPage, Page};
use webelements_e2e::sandbox::{SandboxDriver, SandboxOptions};
use webelements_e2e::table::TableFilter;
use webelements_e2e::toggle::{ToggleMode, ToggleOutcome};
use webelements_e2e::{ActionOptions, BrowserDriver, E2eError, Session};

const DELETE: &str = "Are you sure you want to delete?";
const THEMES: [&str; 4] = ["Light", "Dark", "Cosmic", "Corporate"];

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

async fn open(page: Option<Page>) -> Session {
    let driver: Arc<dyn BrowserDriver> = Arc::new(SandboxDriver::with_options(SandboxOptions {
        today: Some(today()),
        ..Default::default()
    }));
    let mut session = Session::new(driver, SessionConfig::default()).with_today(today());
    NavigationPage.open_home_page(&mut session).await.unwrap();
    if let Some(page) = page {
        NavigationPage.navigate(&mut session, page).await.unwrap();
    }
    session
}

// Subject capture

#[tokio::test(start_paused = true)]
async fn test_alias_and_scoped_capture_agree() {
    let mut s = open(Some(Page::FormLayouts)).await;

    let grid = s.contains("nb-card", "Using the Grid").await.unwrap();
    s.alias("usingGrid", grid);
    let grid = s.aliased("@usingGrid").unwrap();
    let via_alias = s.find(&grid, r#"[for="inputEmail1"]"#).await.unwrap();

    let grid = s.contains("nb-card", "Using the Grid").await.unwrap();
    let via_scope = s
        .within(grid, |s, grid| {
            async move { s.find(&grid, r#"[for="inputEmail1"]"#).await }.boxed()
        })
        .await
        .unwrap();

    assert_eq!(via_alias.handles(), via_scope.handles());
    s.should(&via_scope, Expectation::Contain("Email".into()))
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_alias_survives_later_queries() {
    let mut s = open(Some(Page::FormLayouts)).await;
    let grid = s.contains("nb-card", "Using the Grid").await.unwrap();
    s.alias("@usingGrid", grid.clone());
    s.get("nb-card").await.unwrap();
    assert_eq!(s.aliased("usingGrid").unwrap(), grid);
    assert!(matches!(s.aliased("@basicForm"), Err(E2eError::UnknownAlias(name)) if name == "basicForm"));
}

#[tokio::test(start_paused = true)]
async fn test_find_outside_subject_is_not_found() {
    let mut s = open(Some(Page::FormLayouts)).await;
    let grid = s.contains("nb-card", "Using the Grid").await.unwrap();
    let err = s
        .find(&grid, r#"[for="exampleInputEmail1"]"#)
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::ElementNotFound { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_contains_within_searches_every_captured_node() {
    let mut s = open(Some(Page::FormLayouts)).await;
    let cards = s.get("nb-card").await.unwrap();
    assert_eq!(cards.len(), 4);

    let label = s
        .contains_within(&cards, "label", "Email address")
        .await
        .unwrap();
    s.expect_value(&label, Extract::attr("for"), Match::exact("exampleInputEmail1"))
        .await
        .unwrap();

    let via_find = s.find(&cards, r#"[for="exampleInputEmail1"]"#).await.unwrap();
    assert_eq!(label.handles(), via_find.handles());

    let err = s
        .contains_within(&cards.first(), "label", "Email address")
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::ElementNotFound { .. }));
}

// Value extraction

#[tokio::test(start_paused = true)]
async fn test_label_text_and_attribute() {
    let mut s = open(Some(Page::FormLayouts)).await;
    let label = s.get(r#"[for="exampleInputEmail1"]"#).await.unwrap();
    let text = s
        .expect_value(&label, Extract::Text, Match::exact("Email address"))
        .await
        .unwrap();
    assert_eq!(text, "Email address");
    s.expect_value(&label, Extract::attr("class"), Match::exact("label"))
        .await
        .unwrap();

    let err = s
        .expect_value(&label, Extract::Text, Match::exact("Email"))
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::AssertionFailed { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_typed_value_is_a_property_not_text() {
    let mut s = open(Some(Page::FormLayouts)).await;
    let input = s.get("#exampleInputEmail1").await.unwrap();
    s.type_text(&input, "text.com").await.unwrap();
    s.expect_value(&input, Extract::prop("value"), Match::contains("text.com"))
        .await
        .unwrap();
    assert_eq!(s.invoke(&input, Extract::Text).await.unwrap(), "");
}

// Toggles

#[tokio::test(start_paused = true)]
async fn test_radio_group_is_exclusive() {
    let mut s = open(Some(Page::FormLayouts)).await;
    let grid = s.contains("nb-card", "Using the Grid").await.unwrap();
    let radios = s.find(&grid, r#"[type="radio"]"#).await.unwrap();
    assert_eq!(radios.len(), 3);

    s.set_checked(&radios.eq(0).unwrap(), ToggleMode::Force).await.unwrap();
    s.set_checked(&radios.eq(1).unwrap(), ToggleMode::Force).await.unwrap();

    assert!(!s.is_checked(&radios.eq(0).unwrap()).await.unwrap());
    assert!(s.is_checked(&radios.eq(1).unwrap()).await.unwrap());
    s.should(&radios.eq(2).unwrap(), Expectation::BeDisabled).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_disabled_radio_is_never_checked() {
    let mut s = open(Some(Page::FormLayouts)).await;
    let grid = s.contains("nb-card", "Using the Grid").await.unwrap();
    let disabled = s.find(&grid, r#"[type="radio"]"#).await.unwrap().eq(2).unwrap();

    let err = s.set_checked(&disabled, ToggleMode::Force).await.unwrap_err();
    assert!(matches!(err, E2eError::NotInteractable { .. }));
    s.click(&disabled, ActionOptions::FORCE).await.unwrap();
    s.should(&disabled, Expectation::NotBeChecked).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_hidden_input_needs_force() {
    let mut s = open(Some(Page::Toastr)).await;
    let second = s.get(r#"[type="checkbox"]"#).await.unwrap().eq(1).unwrap();
    let err = s
        .set_checked(&second, ToggleMode::Idempotent { force: false })
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::NotInteractable { .. }));
    s.set_checked(&second, ToggleMode::Idempotent { force: true })
        .await
        .unwrap();
    s.should(&second, Expectation::BeChecked).await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_idempotent_check_leaves_checked_boxes_alone() {
    let mut s = open(Some(Page::Toastr)).await;
    let boxes = s.get(r#"[type="checkbox"]"#).await.unwrap();
    assert_eq!(boxes.len(), 3);

    let outcomes = s
        .set_checked(&boxes, ToggleMode::Idempotent { force: true })
        .await
        .unwrap();
    assert_eq!(
        outcomes,
        vec![ToggleOutcome::Unchanged, ToggleOutcome::Applied, ToggleOutcome::Unchanged]
    );

    let again = s
        .set_checked(&boxes, ToggleMode::Idempotent { force: true })
        .await
        .unwrap();
    assert!(again.iter().all(|o| *o == ToggleOutcome::Unchanged));
}

#[tokio::test(start_paused = true)]
async fn test_click_flips_where_check_does_not() {
    let mut s = open(Some(Page::Toastr)).await;
    let first = s.get(r#"[type="checkbox"]"#).await.unwrap().eq(0).unwrap();

    assert!(!s.toggle(&first).await.unwrap());
    assert!(s.toggle(&first).await.unwrap());

    s.set_checked(&first, ToggleMode::Force).await.unwrap();
    s.set_checked(&first, ToggleMode::Force).await.unwrap();
    s.should(&first, Expectation::BeChecked).await.unwrap();
}

// Dropdown iteration

#[tokio::test(start_paused = true)]
async fn test_select_each_walks_every_theme() {
    let mut s = open(None).await;
    let dropdown = s.get("nav nb-select").await.unwrap();

    let selected = s
        .select_each(&dropdown, "ul.options-list nb-option", ReopenBelow(3))
        .await
        .unwrap();
    assert_eq!(selected, THEMES);
    s.should(&dropdown, Expectation::Contain("Corporate".into()))
        .await
        .unwrap();

    // No reopen after the last option
    let options = s.get("ul.options-list nb-option").await.unwrap();
    let driver = s.driver();
    assert!(!driver.is_visible(options.head()).await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn test_select_each_with_until_last_policy() {
    let mut s = open(None).await;
    let dropdown = s.get("nav nb-select").await.unwrap();
    let selected = s
        .select_each(&dropdown, "ul.options-list nb-option", ReopenUntilLast(THEMES.len()))
        .await
        .unwrap();
    assert_eq!(selected.last().map(String::as_str), Some("Corporate"));
}

#[tokio::test(start_paused = true)]
async fn test_display_must_equal_the_whole_option_text() {
    let mut s = open(None).await;
    let dropdown = s.get("nav nb-select").await.unwrap();
    s.click(&dropdown, ActionOptions::default()).await.unwrap();
    let cosmic = s.contains("nb-option", "Cosmic").await.unwrap();
    s.click(&cosmic, ActionOptions::default()).await.unwrap();

    // " Cosmic " contains "Cosm" but is not the option "Cosm"
    s.should(&dropdown, Expectation::Contain("Cosm".into()))
        .await
        .unwrap();
    let err = s
        .should(&dropdown, Expectation::HaveTrimmedText("Cosm".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::AssertionFailed { .. }));
    s.should(&dropdown, Expectation::HaveTrimmedText("Cosmic".into()))
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_select_each_fails_when_display_does_not_follow() {
    let mut s = open(Some(Page::Datepicker)).await;
    // The input opens the calendar, but a picked day lands in its value,
    // never in its text
    let input = s.get("input").await.unwrap().first();
    let err = s
        .select_each(&input, ".day-cell", ReopenBelow(3))
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::AssertionFailed { .. }), "{:?}", err);
}

#[tokio::test(start_paused = true)]
async fn test_closed_dropdown_option_is_not_clickable() {
    let mut s = open(None).await;
    let dark = s.contains("nb-option", "Dark").await.unwrap();
    let err = s.click(&dark, ActionOptions::default()).await.unwrap_err();
    assert!(matches!(err, E2eError::NotInteractable { .. }));
}

// Table filtering

#[test_case("20", 1 ; "twenty")]
#[test_case("30", 1 ; "thirty")]
#[test_case("40", 1 ; "forty")]
#[test_case("3", 8 ; "single digit")]
#[tokio::test(start_paused = true)]
async fn test_age_filter_keeps_matching_rows(age: &str, expected_rows: usize) {
    let mut s = open(Some(Page::SmartTable)).await;
    let filter = TableFilter::age(s.config().filter_settle);
    let reports = s.filter_table(&filter, &[age]).await.unwrap();
    assert_eq!(reports[0].rows, expected_rows);
    assert!(!reports[0].no_data);
}

#[tokio::test(start_paused = true)]
async fn test_age_filter_sequence_ends_with_no_data() {
    let mut s = open(Some(Page::SmartTable)).await;
    let filter = TableFilter::age(s.config().filter_settle);
    let reports = s.filter_table(&filter, &[20, 30, 40, 200]).await.unwrap();

    let values: Vec<&str> = reports.iter().map(|r| r.value.as_str()).collect();
    assert_eq!(values, vec!["20", "30", "40", "200"]);
    assert!(reports[3].no_data);

    let rows = s.get("tbody tr").await.unwrap();
    assert_eq!(rows.len(), 1);
    s.should(&rows, Expectation::Contain("No data found".into()))
        .await
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_sentinel_with_matching_rows_fails() {
    let mut s = open(Some(Page::SmartTable)).await;
    let filter = TableFilter {
        no_match_sentinel: Some("2".into()),
        ..TableFilter::age(s.config().filter_settle)
    };
    let err = s.filter_table(&filter, &["2"]).await.unwrap_err();
    assert!(matches!(err, E2eError::AssertionFailed { .. }), "{:?}", err);
}

#[tokio::test(start_paused = true)]
async fn test_value_missing_from_checked_column_fails() {
    let mut s = open(Some(Page::SmartTable)).await;
    // Age 20 belongs to the row with ID 4
    let filter = TableFilter {
        column: 1,
        ..TableFilter::age(s.config().filter_settle)
    };
    let err = s.filter_table(&filter, &["20"]).await.unwrap_err();
    assert!(matches!(err, E2eError::AssertionFailed { .. }), "{:?}", err);
}

#[tokio::test(start_paused = true)]
async fn test_no_data_row_for_an_ordinary_value_fails() {
    let mut s = open(Some(Page::SmartTable)).await;
    let filter = TableFilter {
        no_match_sentinel: None,
        ..TableFilter::age(s.config().filter_settle)
    };
    let err = s.filter_table(&filter, &["200"]).await.unwrap_err();
    assert!(matches!(err, E2eError::ElementNotFound { .. }), "{:?}", err);
}

#[tokio::test(start_paused = true)]
async fn test_filter_applies_after_debounce() {
    let mut s = open(Some(Page::SmartTable)).await;
    let input = s.get(r#"thead input[placeholder="Age"]"#).await.unwrap();
    s.type_text(&input, "20").await.unwrap();
    assert_eq!(s.get("tbody tr").await.unwrap().len(), 10);

    s.wait(std::time::Duration::from_millis(500)).await.unwrap();
    assert_eq!(s.get("tbody tr").await.unwrap().len(), 1);

    s.clear(&input).await.unwrap();
    s.wait(std::time::Duration::from_millis(500)).await.unwrap();
    assert_eq!(s.get("tbody tr").await.unwrap().len(), 10);
}

// Confirm dialogs

async fn first_trash(s: &mut Session) -> webelements_e2e::Subject {
    let row = s.get("tbody tr").await.unwrap().first();
    s.find(&row, ".nb-trash").await.unwrap()
}

async fn first_row_text(s: &mut Session) -> String {
    let row = s.get("tbody tr").await.unwrap().first();
    s.invoke(&row, Extract::Text).await.unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_assert_immediate_accepts_and_checks_message() {
    let mut s = open(Some(Page::SmartTable)).await;
    let trash = first_trash(&mut s).await;
    let outcome = s
        .trigger_confirmation(&trash, ConfirmationPolicy::AssertImmediate(DELETE.into()))
        .await
        .unwrap();
    assert_eq!(outcome.stub.calls(), &[DELETE.to_string()]);
    assert_eq!(outcome.accepted, Some(true));
    assert!(first_row_text(&mut s).await.contains("Jacob"));
}

#[tokio::test(start_paused = true)]
async fn test_assert_immediate_rejects_wrong_message() {
    let mut s = open(Some(Page::SmartTable)).await;
    let trash = first_trash(&mut s).await;
    let err = s
        .trigger_confirmation(&trash, ConfirmationPolicy::AssertImmediate("Delete row?".into()))
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::AssertionFailed { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_record_and_assert_after_sees_the_call() {
    let mut s = open(Some(Page::SmartTable)).await;
    let trash = first_trash(&mut s).await;
    let outcome = s
        .trigger_confirmation(&trash, ConfirmationPolicy::RecordAndAssertAfter(DELETE.into()))
        .await
        .unwrap();
    assert_eq!(outcome.stub.call(0), Some(DELETE));
}

#[tokio::test(start_paused = true)]
async fn test_auto_respond_false_keeps_the_row() {
    let mut s = open(Some(Page::SmartTable)).await;
    let before = s.get("tbody tr").await.unwrap().len();
    let first = first_row_text(&mut s).await;

    let trash = first_trash(&mut s).await;
    let outcome = s
        .trigger_confirmation(&trash, ConfirmationPolicy::AutoRespond(false))
        .await
        .unwrap();
    assert_eq!(outcome.accepted, Some(false));
    assert_eq!(s.get("tbody tr").await.unwrap().len(), before);
    assert_eq!(first_row_text(&mut s).await, first);

    // The default answer is restored for the next action
    let trash = first_trash(&mut s).await;
    let outcome = s
        .trigger_confirmation(&trash, ConfirmationPolicy::AssertImmediate(DELETE.into()))
        .await
        .unwrap();
    assert_eq!(outcome.accepted, Some(true));
}

#[tokio::test(start_paused = true)]
async fn test_dialog_that_never_opens() {
    let mut s = open(Some(Page::SmartTable)).await;
    let row = s.get("tbody tr").await.unwrap().first();
    let edit = s.find(&row, ".nb-edit").await.unwrap();

    let outcome = s
        .trigger_confirmation(&edit, ConfirmationPolicy::AssertImmediate(DELETE.into()))
        .await
        .unwrap();
    assert!(outcome.stub.calls().is_empty());
    assert_eq!(outcome.accepted, None);

    let err = s
        .trigger_confirmation(&edit, ConfirmationPolicy::RecordAndAssertAfter(DELETE.into()))
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::DialogNotFired(message) if message == DELETE));
}

// Navigation and datepicker

#[test_case(Page::FormLayouts ; "form layouts")]
#[test_case(Page::Datepicker ; "datepicker")]
#[test_case(Page::Toastr ; "toastr")]
#[test_case(Page::SmartTable ; "smart table")]
#[tokio::test(start_paused = true)]
async fn test_navigation_reaches_page(page: Page) {
    let s = open(Some(page)).await;
    let path = s.driver().current_path().await.unwrap();
    assert_eq!(path, page.path());
}

#[tokio::test(start_paused = true)]
async fn test_navigation_keeps_expanded_group_open() {
    let mut s = open(Some(Page::FormLayouts)).await;
    NavigationPage.date_picker_page(&mut s).await.unwrap();
    NavigationPage.form_layouts_page(&mut s).await.unwrap();

    let group = s.contains("a", "Forms").await.unwrap();
    let icon = s.find(&group, ".expand-state [data-name]").await.unwrap();
    s.expect_value(&icon, Extract::attr("data-name"), Match::contains("down"))
        .await
        .unwrap();
}

#[test_case(200, "May 7, 2027" ; "forward across the year")]
#[test_case(0, "Oct 19, 2026" ; "today")]
#[test_case(-30, "Sep 19, 2026" ; "backward")]
#[tokio::test(start_paused = true)]
async fn test_datepicker_selects_relative_date(offset: i64, expected: &str) {
    let mut s = open(Some(Page::Datepicker)).await;
    s.take_steps();
    let value = DatepickerPage
        .select_common_datepicker_date_from_today(&mut s, offset)
        .await
        .unwrap();
    assert_eq!(value, expected);

    // Skipping the neighbouring month's cells leaves no step behind
    let steps = s.take_steps();
    assert!(steps.iter().all(|step| step.success), "{:?}", steps);
    assert!(!steps.iter().any(|step| step.step_name.contains("attr:class")));

    let card = s.contains("nb-card", "Common Datepicker").await.unwrap();
    let input = s.find(&card, "input").await.unwrap();
    s.should(&input, Expectation::HaveValue(expected.to_string()))
        .await
        .unwrap();
}
