//! Search, filter, sort and pagination state shared by the list pages

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Status filter value meaning "no filter"
pub const ALL: &str = "all";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Lowercase wire form (`asc`/`desc`)
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Uppercase wire form (`ASC`/`DESC`) used by the drivers endpoint
    pub fn as_upper(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Page-scoped list state
///
/// Changing the search text, the status filter or the page size always
/// moves back to page 1, so a shrinking result set never leaves the page
/// pointing past its end. Deserializing checks the same bounds as the
/// setters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "StoredFilters")]
pub struct FilterState {
    search_query: String,
    status_filter: String,
    sort_by: String,
    sort_order: SortOrder,
    current_page: u32,
    items_per_page: u32,
}

impl FilterState {
    /// Fresh state sorted by `sort_by`, showing `items_per_page` rows
    pub fn new(sort_by: &str, sort_order: SortOrder, items_per_page: u32) -> Self {
        Self {
            search_query: String::new(),
            status_filter: ALL.to_string(),
            sort_by: sort_by.to_string(),
            sort_order,
            current_page: 1,
            items_per_page: items_per_page.max(1),
        }
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn status_filter(&self) -> &str {
        &self.status_filter
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.current_page = 1;
    }

    pub fn set_status_filter(&mut self, status: impl Into<String>) {
        self.status_filter = status.into();
        self.current_page = 1;
    }

    pub fn set_sort_by(&mut self, field: impl Into<String>) {
        self.sort_by = field.into();
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.sort_order = order;
    }

    /// Jump to `page`; pages are 1-based
    pub fn set_current_page(&mut self, page: u32) -> Result<()> {
        if page == 0 {
            return Err(Error::validation("page must be >= 1"));
        }
        self.current_page = page;
        Ok(())
    }

    pub fn set_items_per_page(&mut self, count: u32) -> Result<()> {
        if count == 0 {
            return Err(Error::validation("items per page must be > 0"));
        }
        self.items_per_page = count;
        self.current_page = 1;
        Ok(())
    }

    /// Return to page 1, for filters kept outside this struct
    pub fn first_page(&mut self) {
        self.current_page = 1;
    }

    /// Clear search and status, restore the given sort, return to page 1
    pub fn reset(&mut self, sort_by: &str, sort_order: SortOrder) {
        self.search_query.clear();
        self.status_filter = ALL.to_string();
        self.sort_by = sort_by.to_string();
        self.sort_order = sort_order;
        self.current_page = 1;
    }

    /// Search text to send, `None` when blank
    pub fn search_param(&self) -> Option<String> {
        non_blank(&self.search_query)
    }

    /// Status to send, `None` for "all"
    pub fn status_param(&self) -> Option<String> {
        filter_param(&self.status_filter)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredFilters {
    search_query: String,
    status_filter: String,
    sort_by: String,
    sort_order: SortOrder,
    current_page: u32,
    items_per_page: u32,
}

impl TryFrom<StoredFilters> for FilterState {
    type Error = Error;

    fn try_from(stored: StoredFilters) -> Result<Self> {
        let mut state = FilterState::new(&stored.sort_by, stored.sort_order, 1);
        state.set_items_per_page(stored.items_per_page)?;
        state.set_current_page(stored.current_page)?;
        state.search_query = stored.search_query;
        state.status_filter = stored.status_filter;
        Ok(state)
    }
}

pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn filter_param(value: &str) -> Option<String> {
    non_blank(value).filter(|v| !v.eq_ignore_ascii_case(ALL))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_page_four() -> FilterState {
        let mut state = FilterState::new("name", SortOrder::Asc, 10);
        state.set_current_page(4).unwrap();
        state
    }

    #[test]
    fn test_filter_changes_reset_page() {
        let mut state = on_page_four();
        state.set_search_query("ann");
        assert_eq!(state.current_page(), 1);

        let mut state = on_page_four();
        state.set_status_filter("Suspended");
        assert_eq!(state.current_page(), 1);

        let mut state = on_page_four();
        state.set_items_per_page(25).unwrap();
        assert_eq!(state.current_page(), 1);
        assert_eq!(state.items_per_page(), 25);
    }

    #[test]
    fn test_sort_changes_keep_page() {
        let mut state = on_page_four();
        state.set_sort_by("joinDate");
        state.set_sort_order(SortOrder::Desc);
        assert_eq!(state.current_page(), 4);
    }

    #[test]
    fn test_rejects_zero() {
        let mut state = on_page_four();
        assert!(state.set_current_page(0).is_err());
        assert!(state.set_items_per_page(0).is_err());
        assert_eq!(state.current_page(), 4);
        assert_eq!(state.items_per_page(), 10);
    }

    #[test]
    fn test_params() {
        let mut state = FilterState::new("name", SortOrder::Asc, 10);
        assert_eq!(state.status_param(), None);
        assert_eq!(state.search_param(), None);

        state.set_search_query("  ann ");
        state.set_status_filter("Active");
        assert_eq!(state.search_param().as_deref(), Some("ann"));
        assert_eq!(state.status_param().as_deref(), Some("Active"));

        state.reset("name", SortOrder::Asc);
        assert_eq!(state, FilterState::new("name", SortOrder::Asc, 10));
    }

    #[test]
    fn test_deserialize_checks_bounds() {
        let mut stored = serde_json::to_value(on_page_four()).unwrap();
        assert_eq!(stored["currentPage"], 4);
        let restored: FilterState = serde_json::from_value(stored.clone()).unwrap();
        assert_eq!(restored, on_page_four());

        stored["currentPage"] = 0.into();
        assert!(serde_json::from_value::<FilterState>(stored.clone()).is_err());

        stored["currentPage"] = 2.into();
        stored["itemsPerPage"] = 0.into();
        let err = serde_json::from_value::<FilterState>(stored).unwrap_err();
        assert!(err.to_string().contains("items per page"));
    }

    #[test]
    fn test_sort_order_wire_forms() {
        assert_eq!(SortOrder::Desc.as_str(), "desc");
        assert_eq!(SortOrder::Desc.as_upper(), "DESC");
        assert_eq!(SortOrder::Asc.toggled(), SortOrder::Desc);
        assert_eq!(serde_json::to_string(&SortOrder::Asc).unwrap(), "\"asc\"");
    }
}
