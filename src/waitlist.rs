//! Pre-launch waitlist client
//!
//! Lives under `/api/waitlist/admin` and, like feedback, is sent without a
//! bearer token.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cache::{MutationEndpoint, Query, QueryCache, QueryEndpoint};
use crate::error::{Error, Result};
use crate::fetch::BaseQuery;

/// Rows per page in the waitlist table
pub const WAITLIST_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistRecord {
    pub id: i64,
    pub user_type: String,
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wait_position: Option<u32>,
    pub created_at: String,
}

impl WaitlistRecord {
    fn matches(&self, term: &str) -> bool {
        self.full_name.to_lowercase().contains(term)
            || self.email.to_lowercase().contains(term)
            || self.user_type.to_lowercase().contains(term)
    }
}

/// One page of a locally filtered waitlist
#[derive(Debug, Clone, PartialEq)]
pub struct WaitlistPage<'a> {
    pub records: Vec<&'a WaitlistRecord>,
    pub total_pages: usize,
    pub matching: usize,
}

/// Filter by name, email or user type, then cut page `page` (1-based)
pub fn paginate<'a>(records: &'a [WaitlistRecord], term: &str, page: usize) -> WaitlistPage<'a> {
    let term = term.trim().to_lowercase();
    let filtered: Vec<&WaitlistRecord> = records
        .iter()
        .filter(|r| term.is_empty() || r.matches(&term))
        .collect();

    let matching = filtered.len();
    let total_pages = matching.div_ceil(WAITLIST_PAGE_SIZE);
    let start = (page.max(1) - 1).saturating_mul(WAITLIST_PAGE_SIZE);
    let records = filtered
        .into_iter()
        .skip(start)
        .take(WAITLIST_PAGE_SIZE)
        .collect();

    WaitlistPage {
        records,
        total_pages,
        matching,
    }
}

#[derive(Debug, Clone)]
pub struct WaitlistClient {
    base: BaseQuery,
    cache: QueryCache,
}

impl WaitlistClient {
    pub(crate) fn new(base: BaseQuery, cache: QueryCache) -> Self {
        Self { base, cache }
    }

    pub fn get_waitlist(&self) -> Result<Query<Vec<WaitlistRecord>>> {
        let base = self.base.clone();
        self.cache.query(QueryEndpoint::GetWaitlist, &Value::Null, move || {
            base.get("/all").execute_value()
        })
    }

    /// Replace a record with `record`
    pub async fn update_record(&self, record: &WaitlistRecord) -> Result<Value> {
        if record.full_name.trim().is_empty() || record.email.trim().is_empty() {
            return Err(Error::validation("full name and email are required"));
        }
        let request = self
            .base
            .put(&format!("/update/{}", record.id))
            .json(record)?
            .execute_value();
        self.cache
            .mutate(MutationEndpoint::UpdateWaitlistRecord(record.id), request)
            .await
    }

    pub async fn delete_record(&self, id: i64) -> Result<Value> {
        let request = self.base.delete(&format!("/delete/{}", id)).execute_value();
        self.cache
            .mutate(MutationEndpoint::DeleteWaitlistRecord(id), request)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Client;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(id: i64, name: &str, user_type: &str) -> WaitlistRecord {
        WaitlistRecord {
            id,
            user_type: user_type.to_string(),
            full_name: name.to_string(),
            email: format!("{}@karnue.test", id),
            phone: None,
            city: None,
            zip_code: None,
            wait_position: Some(id as u32),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_paginate() {
        let records: Vec<WaitlistRecord> = (1..=23)
            .map(|i| record(i, &format!("Person {}", i), if i % 2 == 0 { "driver" } else { "rider" }))
            .collect();

        let third = paginate(&records, "", 3);
        assert_eq!(third.total_pages, 3);
        assert_eq!(third.records.len(), 3);
        assert_eq!(third.records[0].id, 21);

        let drivers = paginate(&records, "DRIVER", 1);
        assert_eq!(drivers.matching, 11);
        assert_eq!(drivers.total_pages, 2);

        let none = paginate(&records, "nobody", 1);
        assert_eq!(none.total_pages, 0);
        assert!(none.records.is_empty());
    }

    #[test]
    fn test_paginate_far_past_the_end() {
        let records: Vec<WaitlistRecord> = (1..=3).map(|i| record(i, "Person", "rider")).collect();

        let page = paginate(&records, "", usize::MAX);
        assert!(page.records.is_empty());
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.matching, 3);

        assert!(paginate(&[], "", usize::MAX).records.is_empty());
        // page 0 is read as page 1
        assert_eq!(paginate(&records, "", 0).records.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_refetches_mounted_list() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/waitlist/admin/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                record(1, "Ann", "rider"),
                record(2, "Bob", "driver")
            ])))
            .up_to_n_times(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/waitlist/admin/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([record(1, "Ann", "rider")])))
            .mount(&mock_server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/api/waitlist/admin/delete/2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let base = BaseQuery::new(Client::new(), &mock_server.uri(), "/api/waitlist/admin");
        let waitlist = WaitlistClient::new(base, QueryCache::new());

        let list = waitlist.get_waitlist().unwrap();
        assert_eq!(list.result().await.unwrap().len(), 2);

        waitlist.delete_record(2).await.unwrap();
        let after = list.result().await.unwrap();
        assert_eq!(after, vec![record(1, "Ann", "rider")]);
    }
}
