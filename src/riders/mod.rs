//! Riders admin client

mod types;

pub use types::*;

use serde_json::Value;

use crate::cache::{MutationEndpoint, Query, QueryCache, QueryEndpoint};
use crate::error::{Error, Result};
use crate::fetch::BaseQuery;

/// Client for `/api/admin/riders`
#[derive(Debug, Clone)]
pub struct RidersClient {
    base: BaseQuery,
    cache: QueryCache,
}

impl RidersClient {
    pub(crate) fn new(base: BaseQuery, cache: QueryCache) -> Self {
        Self { base, cache }
    }

    /// List riders with pagination, search, status filter and sorting
    pub fn get_riders(&self, params: &GetRidersParams) -> Result<Query<GetRidersResponse>> {
        params.validate()?;
        let base = self.base.clone();
        let pairs = params.to_query_pairs();
        self.cache.query(QueryEndpoint::GetRiders, params, move || {
            base.get("/riders").query(pairs.clone()).execute_value()
        })
    }

    pub fn get_rider_by_id(&self, id: i64) -> Result<Query<Rider>> {
        let base = self.base.clone();
        self.cache.query(QueryEndpoint::GetRiderById(id), &id, move || {
            base.get(&format!("/riders/{}", id)).execute_value()
        })
    }

    pub fn get_riders_stats(&self) -> Result<Query<RidersStats>> {
        let base = self.base.clone();
        self.cache.query(QueryEndpoint::GetRidersStats, &Value::Null, move || {
            base.get("/riders/stats").execute_value()
        })
    }

    pub async fn create_rider(&self, rider: &CreateRiderRequest) -> Result<Rider> {
        if rider.name.trim().is_empty() || rider.email.trim().is_empty() {
            return Err(Error::validation("rider name and email are required"));
        }
        let request = self.base.post("/riders").json(rider)?.execute::<Rider>();
        self.cache.mutate(MutationEndpoint::CreateRider, request).await
    }

    pub async fn update_rider(&self, id: i64, patch: &UpdateRiderRequest) -> Result<Rider> {
        let request = self
            .base
            .patch(&format!("/riders/{}", id))
            .json(patch)?
            .execute::<Rider>();
        self.cache.mutate(MutationEndpoint::UpdateRider(id), request).await
    }

    pub async fn delete_rider(&self, id: i64) -> Result<DeleteRiderResponse> {
        let request = self
            .base
            .delete(&format!("/riders/{}", id))
            .execute::<DeleteRiderResponse>();
        self.cache.mutate(MutationEndpoint::DeleteRider(id), request).await
    }

    /// Ask the server to suspend a rider; the new status comes back through refetch
    pub async fn suspend_rider(&self, id: i64) -> Result<Rider> {
        let request = self
            .base
            .patch(&format!("/riders/{}/suspend", id))
            .execute::<Rider>();
        self.cache.mutate(MutationEndpoint::SuspendRider(id), request).await
    }

    pub async fn activate_rider(&self, id: i64) -> Result<Rider> {
        let request = self
            .base
            .patch(&format!("/riders/{}/activate", id))
            .execute::<Rider>();
        self.cache.mutate(MutationEndpoint::ActivateRider(id), request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::SortOrder;
    use reqwest::Client;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn rider_json(id: i64, status: &str) -> Value {
        json!({
            "id": id,
            "name": format!("Rider {}", id),
            "email": format!("rider{}@karnue.test", id),
            "phone": "555-0100",
            "totalRides": 12,
            "status": status,
            "joinDate": "2024-03-01",
            "rating": 4.8
        })
    }

    fn client(server: &MockServer) -> RidersClient {
        let base = BaseQuery::new(Client::new(), &server.uri(), "/api/admin")
            .with_token_accessor(Arc::new(|| Some("admin-token".to_string())));
        RidersClient::new(base, QueryCache::new())
    }

    #[tokio::test]
    async fn test_get_riders_sends_filters() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/admin/riders"))
            .and(header("authorization", "Bearer admin-token"))
            .and(query_param("page", "2"))
            .and(query_param("limit", "10"))
            .and(query_param("status", "Active"))
            .and(query_param("sortOrder", "desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "riders": [rider_json(11, "Active")],
                "stats": {
                    "totalRiders": 25,
                    "activeRiders": 20,
                    "newThisMonth": 3,
                    "averageRating": 4.6
                },
                "pagination": {
                    "currentPage": 2,
                    "totalPages": 3,
                    "totalItems": 25,
                    "itemsPerPage": 10
                }
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let riders = client(&mock_server);
        let params = GetRidersParams {
            page: Some(2),
            limit: Some(10),
            status: Some("Active".to_string()),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };
        let query = riders.get_riders(&params).unwrap();
        let page = query.result().await.unwrap();

        assert_eq!(page.riders.len(), 1);
        assert_eq!(page.rider(11).map(|r| r.status), Some(RiderStatus::Active));
        assert_eq!(page.stats.total_riders, 25);
        assert_eq!(page.pagination.total_pages, 3);
    }

    #[tokio::test]
    async fn test_zero_page_is_rejected_before_network() {
        let mock_server = MockServer::start().await;
        let riders = client(&mock_server);

        let params = GetRidersParams {
            page: Some(0),
            ..Default::default()
        };
        assert!(matches!(riders.get_riders(&params), Err(Error::Validation(_))));
        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_sends_only_set_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/api/admin/riders/7"))
            .and(body_json(json!({ "phone": "555-0199" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(rider_json(7, "Active")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let riders = client(&mock_server);
        let patch = UpdateRiderRequest {
            phone: Some("555-0199".to_string()),
            ..Default::default()
        };
        let rider = riders.update_rider(7, &patch).await.unwrap();
        assert_eq!(rider.id, 7);
    }

    #[tokio::test]
    async fn test_failed_suspend_surfaces_server_reason() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/api/admin/riders/7/suspend"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "Rider already suspended"
            })))
            .mount(&mock_server)
            .await;

        let riders = client(&mock_server);
        let err = riders.suspend_rider(7).await.unwrap_err();
        assert_eq!(err.status(), Some(reqwest::StatusCode::CONFLICT));
        assert_eq!(err.reason(), "Rider already suspended");
    }

    #[tokio::test]
    async fn test_create_requires_name_and_email() {
        let mock_server = MockServer::start().await;
        let riders = client(&mock_server);

        let blank = CreateRiderRequest {
            name: " ".to_string(),
            email: "a@b.com".to_string(),
            phone: String::new(),
        };
        assert!(matches!(riders.create_rider(&blank).await, Err(Error::Validation(_))));
    }
}
