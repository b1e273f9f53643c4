//! In-memory model of the sample admin application: header theme switcher,
//! sidebar menu, and the pages the suite visits.

use std::time::Duration;

use chrono::{Datelike, Duration as ChronoDuration, Months, NaiveDate};
use serde_json::Value;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::dom::{el, Dom, El, Node, NodeId};
use super::selector;
use crate::datepicker::format_picker_date;
use crate::driver::{DialogEvent, DialogKind, ElementHandle};
use crate::error::{E2eError, E2eResult};

pub(crate) const DASHBOARD_PATH: &str = "/pages/dashboard";

const DELETE_MESSAGE: &str = "Are you sure you want to delete?";
const PAGE_SIZE: usize = 10;
const THEMES: [&str; 4] = ["Light", "Dark", "Cosmic", "Corporate"];
const FILTER_COLUMNS: [&str; 6] = ["ID", "First Name", "Last Name", "Username", "E-mail", "Age"];

/// What a click on an element (or one of its descendants) does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) enum Behavior {
    #[default]
    Inert,
    MenuGroup,
    Navigate(&'static str),
    ThemeSelect,
    ThemeOption(&'static str),
    DatepickerInput,
    CalendarPage(i32),
    DayCell(NaiveDate),
    FilterInput(usize),
    DeleteRow(u32),
}

enum MenuEntry {
    Link(&'static str, &'static str),
    Group(&'static str, &'static [(&'static str, &'static str)]),
}

const MENU: &[MenuEntry] = &[
    MenuEntry::Link("E-commerce", DASHBOARD_PATH),
    MenuEntry::Link("IoT Dashboard", "/pages/iot-dashboard"),
    MenuEntry::Group(
        "Layout",
        &[
            ("Stepper", "/pages/layout/stepper"),
            ("List", "/pages/layout/list"),
            ("Infinite List", "/pages/layout/infinite-list"),
            ("Accordion", "/pages/layout/accordion"),
            ("Tabs", "/pages/layout/tabs"),
        ],
    ),
    MenuEntry::Group(
        "Forms",
        &[
            ("Form Inputs", "/pages/forms/inputs"),
            ("Form Layouts", "/pages/forms/layouts"),
            ("Buttons", "/pages/forms/buttons"),
            ("Datepicker", "/pages/forms/datepicker"),
        ],
    ),
    MenuEntry::Group(
        "Modal & Overlays",
        &[
            ("Dialog", "/pages/modal-overlays/dialog"),
            ("Window", "/pages/modal-overlays/window"),
            ("Popover", "/pages/modal-overlays/popover"),
            ("Toastr", "/pages/modal-overlays/toastr"),
            ("Tooltip", "/pages/modal-overlays/tooltip"),
        ],
    ),
    MenuEntry::Group(
        "Tables & Data",
        &[
            ("Smart Table", "/pages/tables/smart-table"),
            ("Tree Grid", "/pages/tables/tree-grid"),
        ],
    ),
];

fn menu_title(path: &str) -> Option<&'static str> {
    MENU.iter().find_map(|entry| match entry {
        MenuEntry::Link(title, p) if *p == path => Some(*title),
        MenuEntry::Link(..) => None,
        MenuEntry::Group(_, items) => items.iter().find(|(_, p)| *p == path).map(|(t, _)| *t),
    })
}

#[derive(Debug, Clone)]
struct Person {
    id: u32,
    first: &'static str,
    last: &'static str,
    username: &'static str,
    email: &'static str,
    age: u32,
}

impl Person {
    fn column(&self, index: usize) -> String {
        match index {
            0 => self.id.to_string(),
            1 => self.first.to_string(),
            2 => self.last.to_string(),
            3 => self.username.to_string(),
            4 => self.email.to_string(),
            _ => self.age.to_string(),
        }
    }
}

fn people() -> Vec<Person> {
    const ROWS: &[(u32, &str, &str, &str, &str, u32)] = &[
        (1, "Mark", "Otto", "@mdo", "mdo@gmail.com", 28),
        (2, "Jacob", "Thornton", "@fat", "fat@yandex.ru", 45),
        (3, "Larry", "Bird", "@twitter", "twitter@outlook.com", 18),
        (4, "John", "Snow", "@snow", "snow@gmail.com", 20),
        (5, "Jack", "Sparrow", "@jack", "jack@yandex.ru", 30),
        (6, "Ann", "Smith", "@ann", "ann@gmail.com", 21),
        (7, "Barbara", "Black", "@barbara", "barbara@yandex.ru", 43),
        (8, "Sevan", "Bagrat", "@taylor", "taylor@gmail.com", 13),
        (9, "Ruben", "Vardan", "@rubenvardan", "ruben@gmail.com", 22),
        (10, "Karen", "Sevan", "@karen", "karen@yandex.ru", 33),
        (11, "Mark", "Otto", "@mark", "mark@gmail.com", 38),
        (12, "Jacob", "Thornton", "@jacob", "jacob@yandex.ru", 48),
        (13, "Haik", "Hakob", "@haik", "haik@outlook.com", 48),
        (14, "Garegin", "Jirair", "@garegin", "garegin@gmail.com", 40),
        (15, "Krikor", "Bedros", "@krikor", "krikor@yandex.ru", 32),
        (16, "Francisca", "Brady", "@Gibson", "franciscagibson@comtours.com", 11),
        (17, "Tillman", "Figueroa", "@Snow", "tillmansnow@comtours.com", 34),
        (18, "Jimenez", "Morris", "@Bryant", "jimenezbryant@comtours.com", 45),
        (19, "Sandoval", "Jacobson", "@Mcbride", "sandovalmcbride@comtours.com", 32),
        (20, "Griffin", "Torres", "@Charles", "griffincharles@comtours.com", 19),
    ];
    ROWS.iter()
        .map(|&(id, first, last, username, email, age)| Person {
            id,
            first,
            last,
            username,
            email,
            age,
        })
        .collect()
}

struct Calendar {
    input: NodeId,
    /// First day of the month in view
    view: NaiveDate,
}

pub(crate) struct SandboxApp {
    dom: Dom,
    route: String,
    today: NaiveDate,
    filter_debounce: Duration,
    theme: &'static str,
    people: Vec<Person>,
    filters: [String; 6],
    refresh_due: Option<Instant>,
    confirm_response: bool,
    dialogs: Vec<DialogEvent>,
    main: NodeId,
    overlay: NodeId,
    calendar_pane: NodeId,
    options_list: NodeId,
    theme_label: NodeId,
    table_body: Option<NodeId>,
    calendar: Option<Calendar>,
    closed: bool,
}

impl SandboxApp {
    pub fn new(today: NaiveDate, filter_debounce: Duration) -> Self {
        let mut app = SandboxApp {
            dom: Dom::new(),
            route: String::new(),
            today,
            filter_debounce,
            theme: THEMES[0],
            people: people(),
            filters: Default::default(),
            refresh_due: None,
            confirm_response: true,
            dialogs: Vec::new(),
            main: 0,
            overlay: 0,
            calendar_pane: 0,
            options_list: 0,
            theme_label: 0,
            table_body: None,
            calendar: None,
            closed: false,
        };
        app.load(DASHBOARD_PATH);
        app
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    #[cfg(test)]
    pub fn theme(&self) -> &str {
        self.theme
    }

    /// Full page load: state not kept by the server is reset.
    pub fn goto(&mut self, path: &str) -> E2eResult<()> {
        self.ensure_open()?;
        let route = match path.trim().trim_end_matches('/') {
            "" => DASHBOARD_PATH.to_string(),
            other if other.starts_with('/') => other.to_string(),
            other => format!("/{}", other),
        };
        debug!("sandbox load {}", route);
        self.load(&route);
        Ok(())
    }

    fn load(&mut self, route: &str) {
        self.dom = Dom::new();
        self.route = route.to_string();
        self.theme = THEMES[0];
        self.people = people();
        self.filters = Default::default();
        self.refresh_due = None;
        self.table_body = None;
        self.calendar = None;

        let root = self.dom.root();
        let layout = self.dom.insert(root, el("nb-layout").class("nb-theme-default"));

        let header = self.dom.insert(layout, el("nb-layout-header").class("fixed"));
        let nav = self.dom.insert(header, el("nav").class("fixed"));
        let container = self.dom.insert(
            nav,
            el("div").class("header-container").child(
                el("div")
                    .class("logo-container")
                    .child(el("span").class("logo").text("ngx-admin")),
            ),
        );
        let select = self.dom.insert(
            container,
            el("nb-select")
                .class("appearance-outline status-primary")
                .on(Behavior::ThemeSelect),
        );
        self.theme_label = self.dom.insert(
            select,
            el("button")
                .class("select-button")
                .attr("type", "button")
                .text(format!(" {} ", self.theme)),
        );

        let columns = self.dom.insert(layout, el("div").class("layout-container"));
        self.dom.insert(
            columns,
            el("nb-sidebar")
                .class("menu-sidebar")
                .child(el("nb-menu").child(menu_tree(route))),
        );
        self.main = self.dom.insert(columns, el("nb-layout-column"));

        self.overlay = self.dom.insert(layout, el("div").class("cdk-overlay-container"));
        self.options_list = self.dom.insert(
            self.overlay,
            el("nb-option-list").hidden(true).child(
                el("ul").class("options-list").children(THEMES.iter().map(|theme| {
                    el("nb-option")
                        .class("ng-star-inserted")
                        .text(format!(" {} ", theme))
                        .on(Behavior::ThemeOption(*theme))
                })),
            ),
        );
        self.calendar_pane = self.dom.insert(self.overlay, el("div").class("cdk-overlay-pane"));

        self.render_page();
    }

    fn render_page(&mut self) {
        self.dom.clear_children(self.main);
        self.table_body = None;
        self.filters = Default::default();
        self.refresh_due = None;
        match self.route.as_str() {
            DASHBOARD_PATH => {
                self.dom.insert(self.main, dashboard_page());
            }
            "/pages/forms/layouts" => {
                self.dom.insert(self.main, form_layouts_page());
            }
            "/pages/forms/datepicker" => {
                self.dom.insert(self.main, datepicker_page());
            }
            "/pages/modal-overlays/toastr" => {
                self.dom.insert(self.main, toastr_page());
            }
            "/pages/tables/smart-table" => self.render_smart_table(),
            other => {
                let title = menu_title(other).unwrap_or("Page Not Found");
                self.dom.insert(self.main, card(title, vec![el("p").text(title)]));
            }
        }
    }

    fn render_smart_table(&mut self) {
        let titles = el("tr").class("ng2-smart-titles").child(el("th").text("Actions")).children(
            FILTER_COLUMNS.iter().map(|title| el("th").text(*title)),
        );
        let filters = el("tr")
            .class("ng2-smart-filters")
            .child(
                el("th").class("ng2-smart-actions-title-add").child(
                    el("a")
                        .class("ng2-smart-action-add-add")
                        .child(el("i").class("nb-plus")),
                ),
            )
            .children(FILTER_COLUMNS.iter().enumerate().map(|(i, title)| {
                el("th").child(
                    el("input")
                        .attr("type", "text")
                        .attr("placeholder", *title)
                        .class("form-control")
                        .on(Behavior::FilterInput(i)),
                )
            }));
        let card = self.dom.insert(
            self.main,
            el("nb-card").child(el("nb-card-header").text("Smart Table")),
        );
        let body = self.dom.insert(card, el("nb-card-body"));
        let wrapper = self.dom.insert(body, el("ng2-smart-table"));
        let table = self.dom.insert(wrapper, el("table").child(el("thead").child(titles).child(filters)));
        self.table_body = Some(self.dom.insert(table, el("tbody")));
        self.render_rows();
    }

    fn render_rows(&mut self) {
        let Some(tbody) = self.table_body else {
            return;
        };
        self.dom.clear_children(tbody);
        let visible: Vec<&Person> = self
            .people
            .iter()
            .filter(|person| {
                self.filters.iter().enumerate().all(|(col, filter)| {
                    filter.is_empty()
                        || person
                            .column(col)
                            .to_lowercase()
                            .contains(&filter.to_lowercase())
                })
            })
            .take(PAGE_SIZE)
            .collect();
        trace!("table shows {} row(s)", visible.len());

        let rows: Vec<El> = if visible.is_empty() {
            vec![el("tr").child(
                el("td")
                    .attr("colspan", (FILTER_COLUMNS.len() + 1).to_string())
                    .text("No data found"),
            )]
        } else {
            visible
                .iter()
                .map(|person| {
                    let actions = el("td")
                        .class("ng2-smart-actions")
                        .child(
                            el("a")
                                .class("ng2-smart-action-edit-edit")
                                .child(el("i").class("nb-edit")),
                        )
                        .child(
                            el("a")
                                .class("ng2-smart-action-delete-delete")
                                .on(Behavior::DeleteRow(person.id))
                                .child(el("i").class("nb-trash")),
                        );
                    el("tr")
                        .class("ng2-smart-row")
                        .child(actions)
                        .children((0..FILTER_COLUMNS.len()).map(|col| el("td").text(person.column(col))))
                })
                .collect()
        };
        for row in rows {
            self.dom.insert(tbody, row);
        }
    }

    fn render_calendar(&mut self) {
        self.dom.clear_children(self.calendar_pane);
        let Some(calendar) = &self.calendar else {
            return;
        };
        let (view, today) = (calendar.view, self.today);
        let start = view - ChronoDuration::days(view.weekday().num_days_from_sunday() as i64);
        let weeks = (0..6).map(|week| {
            el("nb-calendar-picker-row").children((0..7).map(|day| {
                let date = start + ChronoDuration::days(week * 7 + day);
                let mut class = String::from("day-cell");
                if date.month() != view.month() {
                    class.push_str(" bounding-month");
                }
                if date == today {
                    class.push_str(" today");
                }
                el("nb-calendar-day-cell")
                    .class(&class)
                    .on(Behavior::DayCell(date))
                    .child(el("div").class("cell-content").text(format!(" {} ", date.day())))
            }))
        });
        let chevron = |class: &str, icon: &str, delta: i32| {
            el("button").class(class).on(Behavior::CalendarPage(delta)).child(
                el("nb-icon").child(el("svg").child(el("g").attr("data-name", icon))),
            )
        };
        let calendar = el("nb-datepicker-container").child(
            el("nb-calendar").child(
                el("nb-base-calendar").child(
                    el("nb-card")
                        .child(
                            el("nb-card-header")
                                .child(
                                    el("nb-calendar-navigation")
                                        .attr(
                                            "ng-reflect-date",
                                            view.format("%a %b %d %Y 00:00:00 GMT+0000").to_string(),
                                        )
                                        .child(el("button").text(view.format("%b %Y").to_string())),
                                )
                                .child(
                                    el("nb-calendar-pageable-navigation")
                                        .child(chevron("prev-month", "chevron-left", -1))
                                        .child(chevron("next-month", "chevron-right", 1)),
                                ),
                        )
                        .child(el("nb-card-body").child(
                            el("nb-calendar-day-picker").child(el("nb-calendar-picker").children(weeks)),
                        )),
                ),
            ),
        );
        self.dom.insert(self.calendar_pane, calendar);
    }

    // Behaviors

    fn dispatch(&mut self, owner: NodeId, behavior: Behavior) {
        trace!("dispatch {:?} on {}", behavior, owner);
        match behavior {
            Behavior::Inert | Behavior::FilterInput(_) => {}
            Behavior::MenuGroup => self.toggle_group(owner),
            Behavior::Navigate(path) => {
                self.close_overlays();
                self.route = path.to_string();
                self.render_page();
            }
            Behavior::ThemeSelect => {
                if let Some(list) = self.dom.get_mut(self.options_list) {
                    list.hidden = !list.hidden;
                }
            }
            Behavior::ThemeOption(theme) => {
                self.theme = theme;
                if let Some(label) = self.dom.get_mut(self.theme_label) {
                    label.text = format!(" {} ", theme);
                }
                self.close_overlays();
            }
            Behavior::DatepickerInput => {
                let view = first_of_month(self.today);
                self.calendar = Some(Calendar { input: owner, view });
                self.render_calendar();
            }
            Behavior::CalendarPage(delta) => {
                if let Some(calendar) = &mut self.calendar {
                    let months = Months::new(delta.unsigned_abs());
                    let shifted = if delta >= 0 {
                        calendar.view.checked_add_months(months)
                    } else {
                        calendar.view.checked_sub_months(months)
                    };
                    if let Some(view) = shifted {
                        calendar.view = view;
                    }
                }
                self.render_calendar();
            }
            Behavior::DayCell(date) => {
                if let Some(calendar) = self.calendar.take() {
                    if let Some(input) = self.dom.get_mut(calendar.input) {
                        input.value = format_picker_date(date);
                    }
                    self.render_calendar();
                }
            }
            Behavior::DeleteRow(id) => {
                let accepted = self.confirm_response;
                self.dialogs.push(DialogEvent {
                    kind: DialogKind::Confirm,
                    message: DELETE_MESSAGE.to_string(),
                    accepted,
                });
                if accepted {
                    self.people.retain(|p| p.id != id);
                    self.render_rows();
                }
            }
        }
    }

    fn toggle_group(&mut self, link: NodeId) {
        let submenu = self
            .dom
            .get(link)
            .and_then(|n| n.parent)
            .and_then(|li| self.dom.get(li))
            .and_then(|li| {
                li.children
                    .iter()
                    .copied()
                    .find(|c| self.dom.get(*c).map_or(false, |n| n.tag == "ul"))
            });
        let Some(submenu) = submenu else {
            return;
        };
        let expanded = match self.dom.get_mut(submenu) {
            Some(ul) => {
                ul.hidden = !ul.hidden;
                !ul.hidden
            }
            None => return,
        };
        let icons: Vec<NodeId> = self
            .dom
            .descendants(link)
            .into_iter()
            .filter(|id| self.dom.get(*id).map_or(false, |n| n.attrs.contains_key("data-name")))
            .collect();
        for icon in icons {
            if let Some(node) = self.dom.get_mut(icon) {
                node.attrs
                    .insert("data-name".to_string(), group_icon(expanded).to_string());
            }
        }
    }

    fn close_overlays(&mut self) {
        if let Some(list) = self.dom.get_mut(self.options_list) {
            list.hidden = true;
        }
        if self.calendar.take().is_some() {
            self.render_calendar();
        }
    }

    /// Apply a pending table refresh once its debounce has elapsed.
    pub fn tick(&mut self) {
        if let Some(due) = self.refresh_due {
            if Instant::now() >= due {
                self.refresh_due = None;
                self.render_rows();
            }
        }
    }

    // Driver operations

    fn ensure_open(&self) -> E2eResult<()> {
        if self.closed {
            Err(E2eError::Driver("sandbox session is closed".into()))
        } else {
            Ok(())
        }
    }

    fn node(&self, id: NodeId) -> E2eResult<&Node> {
        self.dom.get(id).ok_or(E2eError::StaleElement(id))
    }

    fn scope(&self, within: Option<NodeId>) -> E2eResult<NodeId> {
        self.ensure_open()?;
        match within {
            Some(id) => self.node(id).map(|_| id),
            None => Ok(self.dom.root()),
        }
    }

    fn not_interactable(id: NodeId, reason: &str) -> E2eError {
        E2eError::NotInteractable {
            selector: ElementHandle(id).to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn query(&self, selector: &str, within: Option<NodeId>) -> E2eResult<Vec<NodeId>> {
        let scope = self.scope(within)?;
        let parsed = selector::parse(selector)?;
        Ok(self.dom.select(scope, &parsed))
    }

    pub fn contains(
        &self,
        selector: Option<&str>,
        text: &str,
        within: Option<NodeId>,
    ) -> E2eResult<Option<NodeId>> {
        let scope = self.scope(within)?;
        let has_text = |id: &NodeId| self.dom.text_content(*id).contains(text);
        match selector {
            Some(selector) => {
                let parsed = selector::parse(selector)?;
                Ok(self.dom.select(scope, &parsed).into_iter().find(has_text))
            }
            None => {
                let candidates: Vec<NodeId> =
                    self.dom.descendants(scope).into_iter().filter(has_text).collect();
                Ok(candidates.iter().copied().find(|id| {
                    self.dom
                        .get(*id)
                        .map_or(false, |n| !n.children.iter().any(|c| candidates.contains(c)))
                }))
            }
        }
    }

    pub fn click(&mut self, id: NodeId, force: bool) -> E2eResult<()> {
        self.ensure_open()?;
        let node = self.node(id)?;
        let disabled = node.disabled;
        let input_type = node.input_type().map(str::to_string);
        if !force {
            if !self.dom.is_visible(id) {
                return Err(Self::not_interactable(id, "element is not visible"));
            }
            if disabled {
                return Err(Self::not_interactable(id, "element is disabled"));
            }
        }
        if disabled {
            debug!("forced click on disabled {} has no effect", id);
            return Ok(());
        }

        match input_type.as_deref() {
            Some("checkbox") => {
                if let Some(node) = self.dom.get_mut(id) {
                    node.checked = !node.checked;
                }
            }
            Some("radio") => self.select_radio(id),
            _ => {}
        }

        let ancestors = self.dom.ancestors_inclusive(id);
        let target = ancestors.iter().find_map(|a| {
            self.dom
                .get(*a)
                .filter(|n| n.behavior != Behavior::Inert)
                .map(|n| (*a, n.behavior.clone()))
        });

        // Clicks outside the overlay dismiss open popups
        if !ancestors.contains(&self.overlay) {
            let opener = matches!(
                target,
                Some((_, Behavior::ThemeSelect)) | Some((_, Behavior::DatepickerInput))
            );
            if !opener {
                self.close_overlays();
            }
        }

        if let Some((owner, behavior)) = target {
            self.dispatch(owner, behavior);
        }
        Ok(())
    }

    pub fn check(&mut self, id: NodeId, force: bool) -> E2eResult<()> {
        self.ensure_open()?;
        let node = self.node(id)?;
        let input_type = node.input_type().map(str::to_string);
        let (disabled, checked) = (node.disabled, node.checked);
        match input_type.as_deref() {
            Some("checkbox") | Some("radio") => {}
            _ => return Err(Self::not_interactable(id, "not a checkbox or radio")),
        }
        if disabled {
            return Err(Self::not_interactable(id, "element is disabled"));
        }
        if !force && !self.dom.is_visible(id) {
            return Err(Self::not_interactable(id, "element is not visible"));
        }
        if checked {
            return Ok(());
        }
        if input_type.as_deref() == Some("radio") {
            self.select_radio(id);
        } else if let Some(node) = self.dom.get_mut(id) {
            node.checked = true;
        }
        Ok(())
    }

    fn select_radio(&mut self, id: NodeId) {
        let name = self.dom.get(id).and_then(|n| n.attrs.get("name").cloned());
        if let Some(name) = name {
            let group: Vec<NodeId> = self
                .dom
                .descendants(self.dom.root())
                .into_iter()
                .filter(|other| {
                    self.dom.get(*other).map_or(false, |n| {
                        n.input_type() == Some("radio") && n.attrs.get("name") == Some(&name)
                    })
                })
                .collect();
            for other in group {
                if let Some(node) = self.dom.get_mut(other) {
                    node.checked = false;
                }
            }
        }
        if let Some(node) = self.dom.get_mut(id) {
            node.checked = true;
        }
    }

    fn editable(&self, id: NodeId) -> E2eResult<Behavior> {
        self.ensure_open()?;
        let node = self.node(id)?;
        let text_field = match node.tag.as_str() {
            "textarea" => true,
            "input" => !matches!(node.input_type(), Some("checkbox") | Some("radio")),
            _ => false,
        };
        if !text_field {
            return Err(Self::not_interactable(id, &format!("cannot type into <{}>", node.tag)));
        }
        if node.disabled {
            return Err(Self::not_interactable(id, "element is disabled"));
        }
        if !self.dom.is_visible(id) {
            return Err(Self::not_interactable(id, "element is not visible"));
        }
        Ok(node.behavior.clone())
    }

    fn edit(&mut self, id: NodeId, change: impl FnOnce(&mut String)) -> E2eResult<()> {
        let behavior = self.editable(id)?;
        let value = match self.dom.get_mut(id) {
            Some(node) => {
                change(&mut node.value);
                node.value.clone()
            }
            None => return Err(E2eError::StaleElement(id)),
        };
        if let Behavior::FilterInput(col) = behavior {
            self.filters[col] = value;
            self.refresh_due = Some(Instant::now() + self.filter_debounce);
        }
        Ok(())
    }

    pub fn type_text(&mut self, id: NodeId, text: &str) -> E2eResult<()> {
        self.edit(id, |value| value.push_str(text))
    }

    pub fn clear(&mut self, id: NodeId) -> E2eResult<()> {
        self.edit(id, String::clear)
    }

    pub fn text(&self, id: NodeId) -> E2eResult<String> {
        self.ensure_open()?;
        self.node(id)?;
        Ok(self.dom.text_content(id))
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> E2eResult<Option<String>> {
        self.ensure_open()?;
        Ok(self.node(id)?.attrs.get(name).cloned())
    }

    pub fn property(&self, id: NodeId, name: &str) -> E2eResult<Option<Value>> {
        self.ensure_open()?;
        let node = self.node(id)?;
        let attr = |key: &str| Value::String(node.attrs.get(key).cloned().unwrap_or_default());
        let value = match name {
            "value" if matches!(node.tag.as_str(), "input" | "textarea" | "select") => {
                Some(Value::String(node.value.clone()))
            }
            "checked" => Some(Value::Bool(node.checked)),
            "disabled" => Some(Value::Bool(node.disabled)),
            "textContent" => Some(Value::String(self.dom.text_content(id))),
            "id" => Some(attr("id")),
            "className" => Some(attr("class")),
            "tagName" => Some(Value::String(node.tag.to_ascii_uppercase())),
            _ => None,
        };
        Ok(value)
    }

    pub fn is_checked(&self, id: NodeId) -> E2eResult<bool> {
        self.ensure_open()?;
        Ok(self.node(id)?.checked)
    }

    pub fn is_disabled(&self, id: NodeId) -> E2eResult<bool> {
        self.ensure_open()?;
        Ok(self.node(id)?.disabled)
    }

    pub fn is_visible(&self, id: NodeId) -> E2eResult<bool> {
        self.ensure_open()?;
        self.node(id)?;
        Ok(self.dom.is_visible(id))
    }

    pub fn set_confirm_response(&mut self, accept: bool) -> E2eResult<()> {
        self.ensure_open()?;
        self.confirm_response = accept;
        Ok(())
    }

    pub fn take_dialogs(&mut self) -> E2eResult<Vec<DialogEvent>> {
        self.ensure_open()?;
        Ok(std::mem::take(&mut self.dialogs))
    }

    pub fn close(&mut self) {
        self.closed = true;
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn group_icon(expanded: bool) -> &'static str {
    if expanded {
        "chevron-down"
    } else {
        "chevron-left"
    }
}

fn menu_tree(route: &str) -> El {
    let link = |title: &str, path: &'static str| {
        el("li").class("menu-item").child(
            el("a")
                .attr("href", path)
                .attr("title", title)
                .on(Behavior::Navigate(path))
                .child(el("span").class("menu-title").text(title)),
        )
    };
    el("ul").class("menu-items").children(MENU.iter().map(|entry| match entry {
        MenuEntry::Link(title, path) => link(title, *path),
        MenuEntry::Group(title, items) => {
            let expanded = items.iter().any(|(_, p)| *p == route);
            el("li")
                .class("menu-item")
                .child(
                    el("a")
                        .attr("href", "#")
                        .attr("title", *title)
                        .on(Behavior::MenuGroup)
                        .child(el("span").class("menu-title").text(*title))
                        .child(
                            el("nb-icon")
                                .class("expand-state")
                                .child(el("svg").child(el("g").attr("data-name", group_icon(expanded)))),
                        ),
                )
                .child(
                    el("ul")
                        .class("menu-items")
                        .hidden(!expanded)
                        .children(items.iter().map(|(t, p)| link(t, *p))),
                )
        }
    }))
}

fn card(title: &str, body: Vec<El>) -> El {
    el("nb-card")
        .child(el("nb-card-header").text(title))
        .child(el("nb-card-body").children(body))
}

fn text_input(kind: &str, placeholder: &str) -> El {
    el("input")
        .attr("type", kind)
        .attr("placeholder", placeholder)
        .attr("nbinput", "")
}

fn checkbox(label: &str, checked: bool) -> El {
    el("nb-checkbox").child(
        el("label")
            .class("label")
            .child(
                el("input")
                    .attr("type", "checkbox")
                    .class("native-input visually-hidden")
                    .hidden(true)
                    .checked(checked),
            )
            .child(el("span").class("custom-checkbox"))
            .child(el("span").class("text").text(label)),
    )
}

fn radio(name: &str, value: &str, label: &str, disabled: bool) -> El {
    el("nb-radio").child(
        el("label")
            .child(
                el("input")
                    .attr("type", "radio")
                    .attr("name", name)
                    .attr("value", value)
                    .class("native-input visually-hidden")
                    .hidden(true)
                    .disabled(disabled),
            )
            .child(el("span").class("outer-circle"))
            .child(el("span").class("inner-circle"))
            .child(el("span").class("text").text(label)),
    )
}

fn labelled(label_for: &str, label: &str, input: El) -> El {
    el("div")
        .class("form-group")
        .child(el("label").attr("for", label_for).class("label").text(label))
        .child(input)
}

fn dashboard_page() -> El {
    el("ngx-dashboard")
        .child(card("Electricity Consumption", vec![el("p").text("816 kWh")]))
        .child(card("Traffic Consumption", vec![el("p").text("572,900")]))
}

fn form_layouts_page() -> El {
    el("ngx-form-layouts")
        .child(card(
            "Inline form",
            vec![el("form")
                .class("form-inline")
                .child(text_input("text", "Jane Doe"))
                .child(text_input("text", "Email"))
                .child(checkbox("Remember me", false))
                .child(el("button").attr("type", "submit").text("Submit"))],
        ))
        .child(card(
            "Using the Grid",
            vec![el("form")
                .child(
                    el("div")
                        .class("form-group row")
                        .child(
                            el("label")
                                .attr("for", "inputEmail1")
                                .class("label col-sm-3 col-form-label")
                                .text("Email"),
                        )
                        .child(el("div").class("col-sm-9").child(text_input("email", "Email").id("inputEmail1"))),
                )
                .child(
                    el("div")
                        .class("form-group row")
                        .child(
                            el("label")
                                .attr("for", "inputPassword2")
                                .class("label col-sm-3 col-form-label")
                                .text("Password"),
                        )
                        .child(
                            el("div")
                                .class("col-sm-9")
                                .child(text_input("password", "Password").id("inputPassword2")),
                        ),
                )
                .child(
                    el("fieldset").class("form-group").child(
                        el("div")
                            .class("row")
                            .child(el("label").class("label col-sm-3 form-control-label").text("Radios"))
                            .child(
                                el("div").class("col-sm-9").child(
                                    el("nb-radio-group")
                                        .child(radio("radioGroup", "option1", "Option 1", false))
                                        .child(radio("radioGroup", "option2", "Option 2", false))
                                        .child(radio("radioGroup", "option3", "Disabled Option", true)),
                                ),
                            ),
                    ),
                )
                .child(el("button").attr("type", "submit").text("Sign in"))],
        ))
        .child(card(
            "Form without labels",
            vec![el("form")
                .child(text_input("text", "Recipients"))
                .child(text_input("text", "Subject"))
                .child(el("textarea").attr("placeholder", "Message"))
                .child(el("button").attr("type", "submit").text("Send"))],
        ))
        .child(card(
            "Basic form",
            vec![el("form")
                .child(labelled(
                    "exampleInputEmail1",
                    "Email address",
                    text_input("email", "Email").id("exampleInputEmail1"),
                ))
                .child(labelled(
                    "exampleInputPassword1",
                    "Password",
                    text_input("password", "Password").id("exampleInputPassword1"),
                ))
                .child(checkbox("Check me out", false))
                .child(el("button").attr("type", "submit").text("Submit"))],
        ))
}

fn datepicker_page() -> El {
    let picker = |placeholder: &str| text_input("text", placeholder).on(Behavior::DatepickerInput);
    el("ngx-datepicker")
        .child(card("Common Datepicker", vec![picker("Form Picker")]))
        .child(card("Datepicker With Range", vec![picker("Range Picker")]))
        .child(card("Datepicker With Disabled Min Max Values", vec![picker("Min Max Picker")]))
}

fn toastr_page() -> El {
    el("ngx-toastr").child(card(
        "Toastr",
        vec![
            labelled("title", "Title:", text_input("text", "Title").attr("name", "title")),
            labelled("content", "Content:", text_input("text", "Content").attr("name", "content")),
            labelled("timeout", "Time to hide toast, ms. 0 to persistent toast:", text_input("number", "")),
            checkbox("Hide on click", true),
            checkbox("Prevent arising of duplicate toast", false),
            checkbox("Show toast with icon", true),
            el("button").text("Show toast"),
            el("button").text("Random toast"),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> SandboxApp {
        SandboxApp::new(NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(), Duration::ZERO)
    }

    fn one(app: &SandboxApp, selector: &str) -> NodeId {
        let found = app.query(selector, None).unwrap();
        assert_eq!(found.len(), 1, "{} matched {:?}", selector, found);
        found[0]
    }

    #[test]
    fn test_root_redirects_to_dashboard() {
        let mut app = app();
        app.goto("/").unwrap();
        assert_eq!(app.route(), DASHBOARD_PATH);
        app.goto("pages/forms/layouts").unwrap();
        assert_eq!(app.route(), "/pages/forms/layouts");
    }

    #[test]
    fn test_menu_group_toggles_icon_and_items() {
        let mut app = app();
        let group = app.contains(Some("a"), "Forms", None).unwrap().unwrap();
        let icon = app.query(".expand-state [data-name]", Some(group)).unwrap()[0];
        let item = app.contains(Some("a"), "Form Layouts", None).unwrap().unwrap();
        assert_eq!(app.attribute(icon, "data-name").unwrap().as_deref(), Some("chevron-left"));
        assert!(app.click(item, false).is_err());

        app.click(group, false).unwrap();
        assert_eq!(app.attribute(icon, "data-name").unwrap().as_deref(), Some("chevron-down"));
        app.click(item, false).unwrap();
        assert_eq!(app.route(), "/pages/forms/layouts");
    }

    #[test]
    fn test_loading_a_page_expands_its_group() {
        let mut app = app();
        app.goto("/pages/tables/smart-table").unwrap();
        let group = app.contains(Some("a"), "Tables & Data", None).unwrap().unwrap();
        let icon = app.query("[data-name]", Some(group)).unwrap()[0];
        assert_eq!(app.attribute(icon, "data-name").unwrap().as_deref(), Some("chevron-down"));
    }

    #[test]
    fn test_calendar_grid_marks_bounding_days() {
        let mut app = app();
        app.goto("/pages/forms/datepicker").unwrap();
        let input = app.query("input", None).unwrap()[0];
        app.click(input, false).unwrap();

        let nav = one(&app, "nb-calendar-navigation");
        assert_eq!(
            app.attribute(nav, "ng-reflect-date").unwrap().as_deref(),
            Some("Thu Oct 01 2026 00:00:00 GMT+0000")
        );
        let cells = app.query(".day-cell", None).unwrap();
        assert_eq!(cells.len(), 42);
        // October 2026 starts on a Thursday
        let leading = app.query(".bounding-month", None).unwrap();
        assert_eq!(app.text(leading[0]).unwrap().trim(), "27");
        assert_eq!(app.text(cells[4]).unwrap().trim(), "1");
    }

    #[test]
    fn test_day_cell_fills_input_and_closes() {
        let mut app = app();
        app.goto("/pages/forms/datepicker").unwrap();
        let input = app.query("input", None).unwrap()[0];
        app.click(input, false).unwrap();
        let next = one(&app, r#"nb-calendar-pageable-navigation [data-name="chevron-right"]"#);
        app.click(next, false).unwrap();
        let day = app
            .query(".day-cell", None)
            .unwrap()
            .into_iter()
            .find(|c| app.text(*c).unwrap().trim() == "7")
            .unwrap();
        app.click(day, false).unwrap();
        assert_eq!(app.property(input, "value").unwrap(), Some(Value::String("Nov 7, 2026".into())));
        assert!(app.query(".day-cell", None).unwrap().is_empty());
    }

    #[test]
    fn test_theme_option_updates_label() {
        let mut app = app();
        let select = one(&app, "nav nb-select");
        let dark = app.contains(Some("nb-option"), "Dark", None).unwrap().unwrap();
        assert!(app.click(dark, false).is_err());
        app.click(select, false).unwrap();
        app.click(dark, false).unwrap();
        assert_eq!(app.theme(), "Dark");
        assert_eq!(app.text(select).unwrap(), " Dark ");
        assert!(!app.is_visible(dark).unwrap());
    }

    #[test]
    fn test_smart_table_pages_and_deletes() {
        let mut app = app();
        app.goto("/pages/tables/smart-table").unwrap();
        assert_eq!(app.query("tbody tr", None).unwrap().len(), PAGE_SIZE);

        let trash = app.query("tbody tr .nb-trash", None).unwrap()[0];
        app.set_confirm_response(false).unwrap();
        app.click(trash, false).unwrap();
        let first = app.query("tbody tr", None).unwrap()[0];
        assert!(app.text(first).unwrap().contains("Mark"));

        app.set_confirm_response(true).unwrap();
        app.click(trash, false).unwrap();
        assert!(matches!(app.text(first), Err(E2eError::StaleElement(_))));
        let first = app.query("tbody tr", None).unwrap()[0];
        assert!(app.text(first).unwrap().contains("Jacob"));

        let dialogs = app.take_dialogs().unwrap();
        assert_eq!(dialogs.len(), 2);
        assert_eq!(dialogs[0].message, DELETE_MESSAGE);
        assert!(!dialogs[0].accepted);
        assert!(dialogs[1].accepted);
    }

    #[test]
    fn test_closed_session_rejects_operations() {
        let mut app = app();
        app.close();
        assert!(matches!(app.query("nav", None), Err(E2eError::Driver(_))));
    }
}
