//! Drivers admin client: onboarding review and background checks

mod types;

pub use types::*;

use serde_json::Value;

use crate::cache::{MutationEndpoint, Query, QueryCache, QueryEndpoint};
use crate::error::Result;
use crate::fetch::BaseQuery;

/// Client for `/api/admin/drivers`
#[derive(Debug, Clone)]
pub struct DriversClient {
    base: BaseQuery,
    cache: QueryCache,
}

impl DriversClient {
    pub(crate) fn new(base: BaseQuery, cache: QueryCache) -> Self {
        Self { base, cache }
    }

    pub fn get_drivers(&self, params: &GetDriversParams) -> Result<Query<GetDriversResponse>> {
        params.validate()?;
        let base = self.base.clone();
        let pairs = params.to_query_pairs();
        self.cache.query(QueryEndpoint::GetDrivers, params, move || {
            base.get("/drivers").query(pairs.clone()).execute_value()
        })
    }

    pub fn get_driver_stats(&self) -> Result<Query<DriverStats>> {
        let base = self.base.clone();
        self.cache.query(QueryEndpoint::GetDriverStats, &Value::Null, move || {
            base.get("/driver_stats").execute_value()
        })
    }

    /// Kick off the external background check for a driver
    pub async fn start_background_check(&self, id: i64) -> Result<BackgroundCheckResponse> {
        let request = self
            .base
            .post(&format!("/drivers/{}/background-check/start", id))
            .execute::<BackgroundCheckResponse>();
        self.cache
            .mutate(MutationEndpoint::StartBackgroundCheck(id), request)
            .await
    }

    pub async fn approve_driver(&self, id: i64) -> Result<DriverActionResponse> {
        let request = self
            .base
            .patch(&format!("/drivers/{}/approve", id))
            .execute::<DriverActionResponse>();
        self.cache.mutate(MutationEndpoint::ApproveDriver(id), request).await
    }

    /// Reject a driver, optionally telling them why
    pub async fn reject_driver(&self, id: i64, reason: Option<&str>) -> Result<DriverActionResponse> {
        let body = RejectDriverRequest {
            reason: reason.map(str::to_string),
        };
        let request = self
            .base
            .patch(&format!("/drivers/{}/reject", id))
            .json(&body)?
            .execute::<DriverActionResponse>();
        self.cache.mutate(MutationEndpoint::RejectDriver(id), request).await
    }
}
