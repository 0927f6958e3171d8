use super::format;
use crate::report::types::{ItemStatus, PlanItem, ReportPayload};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status filter applied to the case list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Success,
    Failed,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [StatusFilter::All, StatusFilter::Success, StatusFilter::Failed];

    pub fn matches(self, status: &ItemStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Success => *status == ItemStatus::Success,
            StatusFilter::Failed => *status == ItemStatus::Failed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Success => "success",
            StatusFilter::Failed => "failed",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Success => "Passed",
            StatusFilter::Failed => "Failed",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "success" | "passed" => Ok(StatusFilter::Success),
            "failed" => Ok(StatusFilter::Failed),
            other => Err(format!("Unknown filter: {} (expected all, success, failed)", other)),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detail tab shown for the selected case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailTab {
    Steps,
    #[default]
    Body,
    Header,
    Cookie,
    Console,
    Request,
}

impl DetailTab {
    /// Tab order in the detail pane.
    pub const ALL: [DetailTab; 6] = [
        DetailTab::Steps,
        DetailTab::Body,
        DetailTab::Cookie,
        DetailTab::Header,
        DetailTab::Console,
        DetailTab::Request,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DetailTab::Steps => "steps",
            DetailTab::Body => "body",
            DetailTab::Header => "header",
            DetailTab::Cookie => "cookie",
            DetailTab::Console => "console",
            DetailTab::Request => "request",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DetailTab::Steps => "Steps",
            DetailTab::Body => "Response Body",
            DetailTab::Header => "Headers",
            DetailTab::Cookie => "Cookies",
            DetailTab::Console => "Console",
            DetailTab::Request => "Request",
        }
    }
}

impl FromStr for DetailTab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DetailTab::ALL
            .into_iter()
            .find(|tab| tab.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Unknown tab: {} (expected steps, body, header, cookie, console, request)",
                    s
                )
            })
    }
}

impl fmt::Display for DetailTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-memory state of the report viewer, bound to one payload.
///
/// The payload is borrowed read-only; filtering and search only ever produce
/// derived views. The selection is an index into `plan_items`, so it always
/// points at an existing item or at nothing.
#[derive(Debug, Clone)]
pub struct ViewState<'a> {
    payload: &'a ReportPayload,
    pub current_filter: StatusFilter,
    pub search_query: String,
    pub current_tab: DetailTab,
    pub format_json: bool,
    selected_item: Option<usize>,
}

impl<'a> ViewState<'a> {
    pub fn new(payload: &'a ReportPayload) -> Self {
        Self {
            payload,
            current_filter: StatusFilter::All,
            search_query: String::new(),
            current_tab: DetailTab::Body,
            format_json: true,
            selected_item: None,
        }
    }

    pub fn payload(&self) -> &'a ReportPayload {
        self.payload
    }

    pub fn success_rate(&self) -> f64 {
        match &self.payload.plan_summary {
            Some(summary) => format::success_rate(summary.success, summary.total),
            None => 0.0,
        }
    }

    pub fn avg_duration(&self) -> u64 {
        self.payload
            .plan_summary
            .as_ref()
            .and_then(|s| s.avg_duration_ms)
            .unwrap_or(0)
    }

    /// Indices of the items passing the status filter and the search query,
    /// in source order.
    pub fn filtered_indices(&self) -> Vec<usize> {
        let query = self.search_query.to_lowercase();
        self.payload
            .plan_items
            .iter()
            .enumerate()
            .filter(|(_, item)| self.current_filter.matches(&item.status))
            .filter(|(_, item)| query.is_empty() || matches_query(item, &query))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn filtered_items(&self) -> Vec<&'a PlanItem> {
        let items = &self.payload.plan_items;
        self.filtered_indices()
            .into_iter()
            .map(|idx| &items[idx])
            .collect()
    }

    /// Badge count for a filter button; ignores the search query.
    pub fn filter_count(&self, filter: StatusFilter) -> usize {
        self.payload
            .plan_items
            .iter()
            .filter(|item| filter.matches(&item.status))
            .count()
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.current_filter = filter;
    }

    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Select the item at `index` in `plan_items` and jump to the steps tab.
    ///
    /// Returns `false` and leaves the state untouched if there is no such item.
    pub fn select_item(&mut self, index: usize) -> bool {
        if index >= self.payload.plan_items.len() {
            return false;
        }
        self.selected_item = Some(index);
        self.current_tab = DetailTab::Steps;
        true
    }

    pub fn clear_selection(&mut self) {
        self.selected_item = None;
    }

    pub fn set_tab(&mut self, tab: DetailTab) {
        self.current_tab = tab;
    }

    pub fn toggle_format_json(&mut self) {
        self.format_json = !self.format_json;
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected_item
    }

    pub fn selected(&self) -> Option<&'a PlanItem> {
        self.selected_item
            .and_then(|idx| self.payload.plan_items.get(idx))
    }
}

fn matches_query(item: &PlanItem, query: &str) -> bool {
    let contains = |field: &Option<String>| {
        field
            .as_deref()
            .is_some_and(|text| text.to_lowercase().contains(query))
    };
    contains(&item.case_name) || contains(&item.url)
}
