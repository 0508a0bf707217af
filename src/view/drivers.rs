//! Drivers page state
//!
//! The drivers table always shows 50 rows, newest first.

use super::filters::{filter_param, FilterState, SortOrder, ALL};
use super::modal::{EntityModalKind, ModalState};
use crate::drivers::{AccountStatus, AdminDriver, BackgroundCheckStatus, GetDriversParams};

pub const DRIVERS_PAGE_SIZE: u32 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct DriversPageState {
    pub filters: FilterState,
    bg_status_filter: String,
    modal: ModalState<EntityModalKind, AdminDriver>,
}

impl Default for DriversPageState {
    fn default() -> Self {
        Self {
            filters: FilterState::new("createdAt", SortOrder::Desc, DRIVERS_PAGE_SIZE),
            bg_status_filter: ALL.to_string(),
            modal: ModalState::Closed,
        }
    }
}

impl DriversPageState {
    pub fn set_search_query(&mut self, query: &str) {
        self.filters.set_search_query(query);
    }

    /// Account status filter, `"all"` for none
    pub fn set_status_filter(&mut self, status: &str) {
        self.filters.set_status_filter(status);
    }

    /// Background check filter, `"all"` for none; resets to page 1
    pub fn set_bg_status_filter(&mut self, status: &str) {
        self.bg_status_filter = status.to_string();
        self.filters.first_page();
    }

    pub fn bg_status_filter(&self) -> &str {
        &self.bg_status_filter
    }

    pub fn open_modal(&mut self, kind: EntityModalKind, driver: Option<AdminDriver>) {
        self.modal.open(kind, driver);
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
    }

    pub fn modal(&self) -> &ModalState<EntityModalKind, AdminDriver> {
        &self.modal
    }

    /// Unknown status values are dropped rather than sent
    pub fn to_params(&self) -> GetDriversParams {
        GetDriversParams {
            page: Some(self.filters.current_page()),
            limit: Some(self.filters.items_per_page()),
            search: self.filters.search_param(),
            status: self
                .filters
                .status_param()
                .and_then(|s| AccountStatus::parse(&s)),
            bg_status: filter_param(&self.bg_status_filter)
                .and_then(|s| BackgroundCheckStatus::parse(&s)),
            sort_by: Some(self.filters.sort_by().to_string()),
            sort_order: Some(self.filters.sort_order()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params() {
        let mut state = DriversPageState::default();
        state.filters.set_current_page(2).unwrap();
        state.set_bg_status_filter("flagged");
        assert_eq!(state.filters.current_page(), 1);

        state.set_status_filter("awaiting_verification");
        let params = state.to_params();
        assert_eq!(params.limit, Some(DRIVERS_PAGE_SIZE));
        assert_eq!(params.status, Some(AccountStatus::AwaitingVerification));
        assert_eq!(params.bg_status, Some(BackgroundCheckStatus::Flagged));
        assert_eq!(params.sort_by.as_deref(), Some("createdAt"));
        assert_eq!(params.sort_order, Some(SortOrder::Desc));

        state.set_status_filter("bogus");
        assert_eq!(state.to_params().status, None);
    }
}
