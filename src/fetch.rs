//! HTTP transport shared by every domain client
//!
//! [`BaseQuery`] binds a reqwest client to one backend root and runs the
//! header-preparation step (bearer injection) before each request.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Read-only view of the current bearer token
pub type TokenAccessor = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Check that `id` can be used as a single path segment
pub fn path_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() || id.contains('/') || id.contains('?') || id.contains('#') {
        return Err(Error::validation(format!("invalid id {:?}", id)));
    }
    Ok(id)
}

/// Reject zero pages and page sizes before they reach the server
pub fn check_paging(page: Option<u32>, limit: Option<u32>) -> Result<()> {
    if page == Some(0) {
        return Err(Error::validation("page must be >= 1"));
    }
    if limit == Some(0) {
        return Err(Error::validation("limit must be >= 1"));
    }
    Ok(())
}

/// Ordered query string builder that skips absent values
#[derive(Debug, Default)]
pub struct QueryPairs(Vec<(String, String)>);

impl QueryPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.0.push((key.to_string(), value.to_string()));
        }
        self
    }

    pub fn into_vec(self) -> Vec<(String, String)> {
        self.0
    }
}

/// Helper for building and executing HTTP requests
pub struct FetchBuilder {
    client: Client,
    url: String,
    method: Method,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
    body: Option<Vec<u8>>,
    timeout: Option<Duration>,
}

impl FetchBuilder {
    /// Create a new FetchBuilder
    pub fn new(client: Client, url: &str, method: Method) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        Self {
            client,
            url: url.to_string(),
            method,
            headers,
            query_params: Vec::new(),
            body: None,
            timeout: None,
        }
    }

    /// Add a header to the request
    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        if let Ok(value) = HeaderValue::from_str(value) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Add bearer token authentication to the request
    pub fn bearer_auth(self, token: &str) -> Self {
        self.header("Authorization", &format!("Bearer {}", token))
    }

    /// Append query parameters, in order
    pub fn query(mut self, params: Vec<(String, String)>) -> Self {
        self.query_params.extend(params);
        self
    }

    /// Add a JSON body to the request
    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }

    /// Override the transport timeout
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    fn build(&self) -> Result<RequestBuilder> {
        let mut url = Url::parse(&self.url)?;

        if !self.query_params.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query_params {
                query_pairs.append_pair(key, value);
            }
        }

        let mut req = self
            .client
            .request(self.method.clone(), url.as_str())
            .headers(self.headers.clone());

        if let Some(body) = &self.body {
            req = req.body(body.clone());
        }
        if let Some(timeout) = self.timeout {
            req = req.timeout(timeout);
        }

        Ok(req)
    }

    /// Execute the request and parse the response as JSON
    pub async fn execute<T: DeserializeOwned>(self) -> Result<T> {
        let value = self.execute_value().await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Execute the request and return the body as untyped JSON
    ///
    /// An empty success body becomes `Value::Null`. A failure body that is
    /// not JSON is kept as a JSON string.
    pub async fn execute_value(self) -> Result<Value> {
        let response = self.execute_raw().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            debug!("request failed with status {}", status);
            let data = serde_json::from_str(&text).unwrap_or(Value::String(text));
            return Err(Error::Api { status, data });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Execute the request and return the raw response
    pub async fn execute_raw(self) -> Result<reqwest::Response> {
        debug!("{} {}", self.method, self.url);
        let req = self.build()?;
        Ok(req.send().await?)
    }
}

/// Request transport bound to a named backend root
#[derive(Clone)]
pub struct BaseQuery {
    client: Client,
    base_url: String,
    token: Option<TokenAccessor>,
    timeout: Option<Duration>,
}

impl fmt::Debug for BaseQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseQuery")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.token.is_some())
            .finish()
    }
}

impl BaseQuery {
    /// Bind `client` to `{api_root}{root}`
    pub fn new(client: Client, api_root: &str, root: &str) -> Self {
        Self {
            client,
            base_url: format!("{}{}", api_root.trim_end_matches('/'), root),
            token: None,
            timeout: None,
        }
    }

    /// Inject `Authorization: Bearer` from `accessor` on every request
    pub fn with_token_accessor(mut self, accessor: TokenAccessor) -> Self {
        self.token = Some(accessor);
        self
    }

    /// Apply a timeout to every request
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL for a path under this root
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Start a request with headers prepared
    pub fn request(&self, method: Method, path: &str) -> FetchBuilder {
        let builder =
            FetchBuilder::new(self.client.clone(), &self.url(path), method).timeout(self.timeout);
        self.prepare_headers(builder)
    }

    // Missing tokens are sent unauthenticated; the server decides.
    fn prepare_headers(&self, builder: FetchBuilder) -> FetchBuilder {
        match self.token.as_ref().and_then(|accessor| accessor()) {
            Some(token) => builder.bearer_auth(&token),
            None => builder,
        }
    }

    /// Create a GET request
    pub fn get(&self, path: &str) -> FetchBuilder {
        self.request(Method::GET, path)
    }

    /// Create a POST request
    pub fn post(&self, path: &str) -> FetchBuilder {
        self.request(Method::POST, path)
    }

    /// Create a PUT request
    pub fn put(&self, path: &str) -> FetchBuilder {
        self.request(Method::PUT, path)
    }

    /// Create a PATCH request
    pub fn patch(&self, path: &str) -> FetchBuilder {
        self.request(Method::PATCH, path)
    }

    /// Create a DELETE request
    pub fn delete(&self, path: &str) -> FetchBuilder {
        self.request(Method::DELETE, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fixed_token(token: &'static str) -> TokenAccessor {
        Arc::new(move || Some(token.to_string()))
    }

    #[tokio::test]
    async fn test_injects_bearer_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/admin/riders"))
            .and(header("authorization", "Bearer secret-token"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let base = BaseQuery::new(Client::new(), &mock_server.uri(), "/api/admin")
            .with_token_accessor(fixed_token("secret-token"));

        let value = base
            .get("/riders")
            .query(vec![("page".to_string(), "2".to_string())])
            .execute_value()
            .await
            .unwrap();
        assert_eq!(value, json!({ "ok": true }));
    }

    #[tokio::test]
    async fn test_sends_unauthenticated_when_token_absent() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/admin/dashboard/stats"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "No token provided"
            })))
            .mount(&mock_server)
            .await;

        let base = BaseQuery::new(Client::new(), &mock_server.uri(), "/api/admin")
            .with_token_accessor(Arc::new(|| None));

        let err = base.get("/dashboard/stats").execute_value().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.reason(), "No token provided");

        let requests = mock_server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_plain_text_error_and_empty_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/admin/logout"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/admin/boom"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let base = BaseQuery::new(Client::new(), &mock_server.uri(), "/api/admin");

        let empty = base.post("/logout").execute_value().await.unwrap();
        assert_eq!(empty, Value::Null);

        match base.get("/boom").execute_value().await {
            Err(Error::Api { status, data }) => {
                assert_eq!(status, reqwest::StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(data, Value::String("Internal Server Error".to_string()));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_network_failure_is_typed() {
        let base = BaseQuery::new(Client::new(), "http://127.0.0.1:1", "/api/admin");
        let err = base.get("/riders").execute_value().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
    }

    #[test]
    fn test_path_id() {
        assert_eq!(path_id(" res_1 ").unwrap(), "res_1");
        assert!(path_id("").is_err());
        assert!(path_id("   ").is_err());
        assert!(path_id("a/b").is_err());
    }

    #[test]
    fn test_url_joins_root() {
        let base = BaseQuery::new(Client::new(), "https://api.karnue.test/", "/api/feedback");
        assert_eq!(
            base.url("/get_feedbacks"),
            "https://api.karnue.test/api/feedback/get_feedbacks"
        );
    }
}
