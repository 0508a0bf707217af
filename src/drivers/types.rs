//! Types for the drivers domain

use serde::{Deserialize, Serialize};

use crate::cache::Listing;
use crate::error::Result;
use crate::fetch::{check_paging, QueryPairs};
use crate::view::SortOrder;

/// Onboarding state of a driver account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    Draft,
    AwaitingVerification,
    Active,
    Rejected,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Draft => "draft",
            AccountStatus::AwaitingVerification => "awaiting_verification",
            AccountStatus::Active => "active",
            AccountStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(AccountStatus::Draft),
            "awaiting_verification" => Some(AccountStatus::AwaitingVerification),
            "active" => Some(AccountStatus::Active),
            "rejected" => Some(AccountStatus::Rejected),
            _ => None,
        }
    }
}

/// Background check progress, independent of [`AccountStatus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackgroundCheckStatus {
    NotStarted,
    InProgress,
    Clear,
    Flagged,
    Failed,
}

impl BackgroundCheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundCheckStatus::NotStarted => "not_started",
            BackgroundCheckStatus::InProgress => "in_progress",
            BackgroundCheckStatus::Clear => "clear",
            BackgroundCheckStatus::Flagged => "flagged",
            BackgroundCheckStatus::Failed => "failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not_started" => Some(BackgroundCheckStatus::NotStarted),
            "in_progress" => Some(BackgroundCheckStatus::InProgress),
            "clear" => Some(BackgroundCheckStatus::Clear),
            "flagged" => Some(BackgroundCheckStatus::Flagged),
            "failed" => Some(BackgroundCheckStatus::Failed),
            _ => None,
        }
    }
}

/// Driver as seen by the admin onboarding screens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDriver {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub vehicle_make: Option<String>,
    #[serde(default)]
    pub vehicle_model: Option<String>,
    #[serde(default)]
    pub vehicle_year: Option<String>,
    #[serde(default)]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub payout_method: Option<String>,
    pub account_status: AccountStatus,
    pub background_check_status: BackgroundCheckStatus,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub approved_at: Option<String>,
    #[serde(default)]
    pub rejected_at: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriversPagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetDriversResponse {
    pub success: bool,
    pub data: Vec<AdminDriver>,
    pub pagination: DriversPagination,
}

impl GetDriversResponse {
    pub fn contains(&self, id: i64) -> bool {
        self.data.iter().any(|driver| driver.id == id)
    }
}

impl Listing for GetDriversResponse {
    fn item_count(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverStats {
    pub total_drivers: u64,
    pub active_drivers: u64,
    pub pending_approval: u64,
    pub avg_rating: f64,
}

/// Drivers list parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDriversParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Filters on account status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
    /// Filters on background check status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_status: Option<BackgroundCheckStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl GetDriversParams {
    pub fn validate(&self) -> Result<()> {
        check_paging(self.page, self.limit)
    }

    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        QueryPairs::new()
            .push("page", self.page)
            .push("limit", self.limit)
            .push("search", self.search.as_deref())
            .push("status", self.status.map(|s| s.as_str()))
            .push("bgStatus", self.bg_status.map(|s| s.as_str()))
            .push("sortBy", self.sort_by.as_deref())
            .push("sortOrder", self.sort_order.map(|order| order.as_upper()))
            .into_vec()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RejectDriverRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Acknowledgement returned by approve and reject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverActionResponse {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundCheckResponse {
    pub success: bool,
    pub reference: String,
    pub status: String,
}
