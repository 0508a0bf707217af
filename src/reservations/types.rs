//! Types for the reservations domain

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::cache::Listing;
use crate::error::{Error, Result};
use crate::fetch::{check_paging, QueryPairs};
use crate::view::SortOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    Confirmed,
    Pending,
    Cancelled,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRider {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDriver {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub city: String,
    pub is_online: bool,
}

/// Scheduled ride
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: String,
    pub rider: ReservationRider,
    pub rider_phone: String,
    pub pickup: String,
    pub destination: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub estimated_fare: String,
    pub status: ReservationStatus,
    #[serde(default)]
    pub driver: Option<ReservationDriver>,
    pub vehicle_type: String,
    pub passengers: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsStats {
    pub total_reservations: u64,
    pub active_reservations: u64,
    pub pending_approval: u64,
    pub completed_today: u64,
    pub cancelled: u64,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsPagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub limit: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetReservationsResponse {
    pub success: bool,
    pub reservations: Vec<Reservation>,
    pub pagination: ReservationsPagination,
}

impl GetReservationsResponse {
    pub fn reservation(&self, id: &str) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }
}

impl Listing for GetReservationsResponse {
    fn item_count(&self) -> usize {
        self.reservations.len()
    }
}

/// Reservations list parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetReservationsParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    /// Inclusive lower bound on the scheduled date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on the scheduled date
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDate>,
}

impl GetReservationsParams {
    pub fn validate(&self) -> Result<()> {
        check_paging(self.page, self.limit)?;
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(Error::validation(format!(
                    "dateFrom {} is after dateTo {}",
                    from, to
                )));
            }
        }
        Ok(())
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        QueryPairs::new()
            .push("page", self.page)
            .push("limit", self.limit)
            .push("search", self.search.as_deref())
            .push("status", self.status.as_deref())
            .push("sortBy", self.sort_by.as_deref())
            .push("sortOrder", self.sort_order.map(|order| order.as_str()))
            .push("dateFrom", self.date_from.map(|d| d.format("%Y-%m-%d")))
            .push("dateTo", self.date_to.map(|d| d.format("%Y-%m-%d")))
            .into_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    pub rider: String,
    pub rider_phone: String,
    pub pickup: String,
    pub destination: String,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub vehicle_type: String,
    pub passengers: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl CreateReservationRequest {
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("rider", &self.rider),
            ("pickup", &self.pickup),
            ("destination", &self.destination),
            ("scheduledDate", &self.scheduled_date),
            ("scheduledTime", &self.scheduled_time),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(Error::validation(format!("{} is required", field)));
        }
        if self.passengers == 0 {
            return Err(Error::validation("passengers must be >= 1"));
        }
        Ok(())
    }
}

/// Partial reservation update
///
/// `driver: Some(None)` sends an explicit `null` to unassign the driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rider_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ReservationStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passengers: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDriverRequest {
    pub driver_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearbyDriversRequest {
    pub pickup_location: String,
    pub reservation_id: String,
}

/// Driver offered for assignment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: i64,
    pub name: String,
    pub rating: f64,
    pub status: String,
    pub vehicle: String,
    pub distance: String,
    pub eta: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteReservationResponse {
    pub success: bool,
    pub id: String,
}
