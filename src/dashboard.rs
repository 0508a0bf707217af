//! Dashboard counters

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::cache::{Query, QueryCache, QueryEndpoint};
use crate::error::Result;
use crate::fetch::BaseQuery;

/// Aggregate counters shown on the dashboard
///
/// The server decides which counters exist, so they are kept by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DashboardStats(pub Map<String, Value>);

impl DashboardStats {
    /// Numeric counter by its camelCase name
    pub fn counter(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone)]
pub struct DashboardClient {
    base: BaseQuery,
    cache: QueryCache,
}

impl DashboardClient {
    pub(crate) fn new(base: BaseQuery, cache: QueryCache) -> Self {
        Self { base, cache }
    }

    pub fn get_dashboard_stats(&self) -> Result<Query<DashboardStats>> {
        let base = self.base.clone();
        self.cache.query(QueryEndpoint::GetDashboardStats, &Value::Null, move || {
            base.get("/dashboard/stats").execute_value()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use serde_json::json;
    use std::sync::Arc;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_stats_are_cached_per_client() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/admin/dashboard/stats"))
            .and(header("authorization", "Bearer t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalRiders": 25,
                "activeDrivers": 31,
                "revenue": "n/a"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let base = BaseQuery::new(Client::new(), &mock_server.uri(), "/api/admin")
            .with_token_accessor(Arc::new(|| Some("t".to_string())));
        let dashboard = DashboardClient::new(base, QueryCache::new());

        let first = dashboard.get_dashboard_stats().unwrap();
        let stats = first.result().await.unwrap();
        assert_eq!(stats.counter("totalRiders"), Some(25.0));
        assert_eq!(stats.counter("revenue"), None);

        // a second consumer reads the cached value
        let second = dashboard.get_dashboard_stats().unwrap();
        assert_eq!(second.result().await.unwrap(), stats);
        assert!(second.state().is_success());
    }

    #[test]
    fn test_stats_failure_is_reported() {
        tokio_test::block_on(async {
            let mock_server = MockServer::start().await;

            Mock::given(method("GET"))
                .and(path("/api/admin/dashboard/stats"))
                .respond_with(
                    ResponseTemplate::new(500).set_body_json(json!({ "message": "stats unavailable" })),
                )
                .mount(&mock_server)
                .await;

            let base = BaseQuery::new(Client::new(), &mock_server.uri(), "/api/admin");
            let dashboard = DashboardClient::new(base, QueryCache::new());

            let stats = dashboard.get_dashboard_stats().unwrap();
            let err = stats.result().await.unwrap_err();
            assert_eq!(err.reason(), "stats unavailable");

            let state = stats.state();
            assert!(state.data.is_none());
            assert!(!state.is_loading);
            assert!(state.error.is_some());
        });
    }
}
