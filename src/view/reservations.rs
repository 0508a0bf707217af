//! Reservations page state, including the driver reassignment dialog

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::filters::{FilterState, SortOrder};
use super::modal::{ModalState, ReservationModalKind};
use crate::error::Result;
use crate::reservations::{Driver, GetReservationsParams, Reservation};

const DEFAULT_SORT: &str = "scheduledDate";
const DEFAULT_PAGE_SIZE: u32 = 10;

/// Scheduled-date window applied to the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateFilter {
    #[default]
    All,
    Today,
    /// Monday through Sunday of the current week
    Week,
    Month,
}

impl DateFilter {
    /// Inclusive `(dateFrom, dateTo)` relative to `today`
    pub fn range(&self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        match self {
            DateFilter::All => None,
            DateFilter::Today => Some((today, today)),
            DateFilter::Week => {
                let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
                Some((monday, monday + Duration::days(6)))
            }
            DateFilter::Month => {
                let first = today.with_day(1)?;
                let next = if first.month() == 12 {
                    NaiveDate::from_ymd_opt(first.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(first.year(), first.month() + 1, 1)?
                };
                Some((first, next.pred_opt()?))
            }
        }
    }
}

/// Dialog for moving a reservation to another driver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReassignModal {
    pub is_open: bool,
    pub reservation: Option<Reservation>,
    pub selected_driver: String,
    pub nearby_drivers: Vec<Driver>,
    pub is_searching_nearby: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsPageState {
    pub filters: FilterState,
    date_filter: DateFilter,
    #[serde(skip)]
    modal: ModalState<ReservationModalKind, Reservation>,
    #[serde(skip)]
    reassign: ReassignModal,
}

impl Default for ReservationsPageState {
    fn default() -> Self {
        Self {
            filters: FilterState::new(DEFAULT_SORT, SortOrder::Desc, DEFAULT_PAGE_SIZE),
            date_filter: DateFilter::All,
            modal: ModalState::Closed,
            reassign: ReassignModal::default(),
        }
    }
}

impl ReservationsPageState {
    pub fn set_search_query(&mut self, query: &str) {
        self.filters.set_search_query(query);
    }

    pub fn set_status_filter(&mut self, status: &str) {
        self.filters.set_status_filter(status);
    }

    pub fn set_date_filter(&mut self, filter: DateFilter) {
        self.date_filter = filter;
        self.filters.first_page();
    }

    pub fn date_filter(&self) -> DateFilter {
        self.date_filter
    }

    pub fn set_current_page(&mut self, page: u32) -> Result<()> {
        self.filters.set_current_page(page)
    }

    pub fn set_items_per_page(&mut self, count: u32) -> Result<()> {
        self.filters.set_items_per_page(count)
    }

    pub fn set_sort_by(&mut self, field: &str) {
        self.filters.set_sort_by(field);
    }

    pub fn set_sort_order(&mut self, order: SortOrder) {
        self.filters.set_sort_order(order);
    }

    pub fn open_modal(&mut self, kind: ReservationModalKind, reservation: Option<Reservation>) {
        self.modal.open(kind, reservation);
    }

    pub fn close_modal(&mut self) {
        self.modal.close();
    }

    pub fn modal(&self) -> &ModalState<ReservationModalKind, Reservation> {
        &self.modal
    }

    /// Open the reassignment dialog with no driver picked yet
    pub fn open_reassign_modal(&mut self, reservation: Reservation) {
        self.reassign.is_open = true;
        self.reassign.reservation = Some(reservation);
        self.reassign.selected_driver.clear();
        self.reassign.nearby_drivers.clear();
    }

    pub fn close_reassign_modal(&mut self) {
        self.reassign = ReassignModal::default();
    }

    pub fn set_selected_driver(&mut self, driver_id: &str) {
        self.reassign.selected_driver = driver_id.to_string();
    }

    pub fn set_nearby_drivers(&mut self, drivers: Vec<Driver>) {
        self.reassign.nearby_drivers = drivers;
    }

    pub fn set_is_searching_nearby(&mut self, searching: bool) {
        self.reassign.is_searching_nearby = searching;
    }

    pub fn reassign(&self) -> &ReassignModal {
        &self.reassign
    }

    /// Request parameters, resolving the date window against `today`
    pub fn to_params(&self, today: NaiveDate) -> GetReservationsParams {
        let range = self.date_filter.range(today);
        GetReservationsParams {
            page: Some(self.filters.current_page()),
            limit: Some(self.filters.items_per_page()),
            search: self.filters.search_param(),
            status: self.filters.status_param(),
            sort_by: Some(self.filters.sort_by().to_string()),
            sort_order: Some(self.filters.sort_order()),
            date_from: range.map(|(from, _)| from),
            date_to: range.map(|(_, to)| to),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_ranges() {
        // a Wednesday
        let today = day(2025, 12, 17);
        assert_eq!(DateFilter::All.range(today), None);
        assert_eq!(DateFilter::Today.range(today), Some((today, today)));
        assert_eq!(
            DateFilter::Week.range(today),
            Some((day(2025, 12, 15), day(2025, 12, 21)))
        );
        assert_eq!(
            DateFilter::Month.range(today),
            Some((day(2025, 12, 1), day(2025, 12, 31)))
        );
        assert_eq!(
            DateFilter::Month.range(day(2024, 2, 10)),
            Some((day(2024, 2, 1), day(2024, 2, 29)))
        );
    }

    #[test]
    fn test_date_filter_resets_page_and_feeds_params() {
        let mut state = ReservationsPageState::default();
        state.set_current_page(5).unwrap();
        state.set_date_filter(DateFilter::Today);
        assert_eq!(state.filters.current_page(), 1);

        let today = day(2025, 6, 1);
        let params = state.to_params(today);
        assert_eq!(params.date_from, Some(today));
        assert_eq!(params.date_to, Some(today));
        assert_eq!(params.sort_by.as_deref(), Some("scheduledDate"));
        assert_eq!(params.sort_order, Some(SortOrder::Desc));
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_reassign_modal_lifecycle() {
        let mut state = ReservationsPageState::default();
        state.set_is_searching_nearby(true);
        state.set_selected_driver("9");
        state.close_reassign_modal();
        assert_eq!(state.reassign(), &ReassignModal::default());

        state.set_nearby_drivers(vec![Driver {
            id: 4,
            name: "Dana".to_string(),
            rating: 4.9,
            status: "available".to_string(),
            vehicle: "Prius".to_string(),
            distance: "1 mi".to_string(),
            eta: "3 min".to_string(),
        }]);
        state.set_selected_driver("4");
        assert_eq!(state.reassign().nearby_drivers.len(), 1);

        state.close_reassign_modal();
        assert!(!state.reassign().is_open);
        assert!(state.reassign().nearby_drivers.is_empty());
        assert!(state.reassign().selected_driver.is_empty());
    }

    #[test]
    fn test_assign_modal_kind() {
        let mut state = ReservationsPageState::default();
        state.open_modal(ReservationModalKind::Assign, None);
        assert_eq!(state.modal().kind(), Some(ReservationModalKind::Assign));
        state.close_modal();
        assert!(!state.modal().is_open());
    }
}
