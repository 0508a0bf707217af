//! Types for the riders domain

use serde::{Deserialize, Serialize};

use crate::cache::Listing;
use crate::error::Result;
use crate::fetch::{check_paging, QueryPairs};
use crate::view::SortOrder;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiderStatus {
    Active,
    Inactive,
    Suspended,
}

/// Rider record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rider {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub total_rides: u32,
    pub status: RiderStatus,
    pub join_date: String,
    pub rating: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RidersStats {
    pub total_riders: u64,
    pub active_riders: u64,
    pub new_this_month: u64,
    pub average_rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RidersPagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub items_per_page: u32,
}

/// One page of riders plus the aggregate counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetRidersResponse {
    pub riders: Vec<Rider>,
    pub stats: RidersStats,
    pub pagination: RidersPagination,
}

impl GetRidersResponse {
    pub fn rider(&self, id: i64) -> Option<&Rider> {
        self.riders.iter().find(|rider| rider.id == id)
    }
}

impl Listing for GetRidersResponse {
    fn item_count(&self) -> usize {
        self.riders.len()
    }
}

/// Riders list parameters; unset fields are left to the server default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRidersParams {
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
}

impl GetRidersParams {
    pub fn validate(&self) -> Result<()> {
        check_paging(self.page, self.limit)
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        QueryPairs::new()
            .push("page", self.page)
            .push("limit", self.limit)
            .push("search", self.search.as_deref())
            .push("status", self.status.as_deref())
            .push("sortBy", self.sort_by.as_deref())
            .push("sortOrder", self.sort_order.map(|order| order.as_str()))
            .into_vec()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateRiderRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Partial rider update; only set fields are sent
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateRiderRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RiderStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteRiderResponse {
    pub success: bool,
    pub id: i64,
}
