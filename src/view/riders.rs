//! Riders page state

use serde::{Deserialize, Serialize};

use super::filters::{FilterState, SortOrder};
use super::modal::{EntityModalKind, ModalState};
use crate::error::Result;
use crate::riders::{GetRidersParams, Rider};

const DEFAULT_SORT: &str = "name";
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Filters and modal for the riders table
///
/// Only the filters survive a reload; the modal always starts closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RidersPageState {
    pub filters: FilterState,
    #[serde(skip)]
    modal: ModalState<EntityModalKind, Rider>,
}

impl Default for RidersPageState {
    fn default() -> Self {
        Self {
            filters: FilterState::new(DEFAULT_SORT, SortOrder::Asc, DEFAULT_PAGE_SIZE),
            modal: ModalState::Closed,
        }
    }
}

impl RidersPageState {
    pub fn set_search_query(&mut self, query: &str) {
        self.filters.set_search_query(query);
    }

    pub fn set_status_filter(&mut self, status: &str) {
        self.filters.set_status_filter(status);
    }

    pub fn set_sort_by(&mut self, field: &str) {
        self.filters.set_sort_by(field);
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.filters.set_sort_order(order);
    }

    pub fn set_current_page(&mut self, page: u32) -> Result<()> {
        self.filters.set_current_page(page)
    }

    pub fn set_items_per_page(&mut self, count: u32) -> Result<()> {
        self.filters.set_items_per_page(count)
    }

    /// Back to the default search, status and sort; page size is kept
    pub fn reset_filters(&mut self) {
        self.filters.reset(DEFAULT_SORT, SortOrder::Asc);
    }

    pub fn open_modal(&mut self, kind: EntityModalKind, rider: Option<Rider>) {
        self.modal.open(kind, rider);
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
    }

    pub fn modal(&self) -> &ModalState<EntityModalKind, Rider> {
        &self.modal
    }

    pub fn selected_rider(&self) -> Option<&Rider> {
        self.modal.entity()
    }

    /// Change the rider shown in the open modal
    pub fn set_selected_rider(&mut self, rider: Option<Rider>) {
        self.modal.select(rider);
    }

    /// Request parameters for the current view
    pub fn to_params(&self) -> GetRidersParams {
        GetRidersParams {
            page: Some(self.filters.current_page()),
            limit: Some(self.filters.items_per_page()),
            search: self.filters.search_param(),
            status: self.filters.status_param(),
            sort_by: Some(self.filters.sort_by().to_string()),
            sort_order: Some(self.filters.sort_order()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_params() {
        let state = RidersPageState::default();
        let params = state.to_params();
        assert_eq!(params.page, Some(1));
        assert_eq!(params.limit, Some(10));
        assert_eq!(params.status, None);
        assert_eq!(params.sort_by.as_deref(), Some("name"));
        assert_eq!(params.sort_order, Some(SortOrder::Asc));
    }

    #[test]
    fn test_reset_filters_keeps_page_size() {
        let mut state = RidersPageState::default();
        state.set_items_per_page(25).unwrap();
        state.set_search_query("ann");
        state.set_sort_by("joinDate");
        state.set_current_page(3).unwrap();

        state.reset_filters();
        assert_eq!(state.filters.search_query(), "");
        assert_eq!(state.filters.sort_by(), "name");
        assert_eq!(state.filters.current_page(), 1);
        assert_eq!(state.filters.items_per_page(), 25);
    }

    #[test]
    fn test_modal_is_not_persisted() {
        let mut state = RidersPageState::default();
        state.set_status_filter("Suspended");
        state.open_modal(EntityModalKind::Create, None);

        let json = serde_json::to_value(&state).unwrap();
        let restored: RidersPageState = serde_json::from_value(json).unwrap();
        assert_eq!(restored.filters.status_filter(), "Suspended");
        assert!(!restored.modal().is_open());
    }
}
