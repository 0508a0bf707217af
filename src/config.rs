//! Configuration options for the Karnue admin client

use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::cache::DEFAULT_KEEP_UNUSED;
use crate::error::{Error, Result};

/// Environment variable holding the API root
pub const API_URL_ENV: &str = "KARNUE_API_URL";

/// Configuration options for the Karnue admin client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The API root every domain path is resolved against
    pub api_url: Url,

    /// The request timeout, `None` leaves it to the transport
    pub request_timeout: Option<Duration>,

    /// How long search input must stay quiet before it is committed
    pub search_debounce: Duration,

    /// How long cached responses outlive their last consumer
    pub keep_unused_data: Duration,

    /// Namespace of the persisted state blob
    pub persist_key: String,

    /// File the persisted blob lives in, `None` keeps it in memory
    pub state_path: Option<PathBuf>,
}

impl ClientOptions {
    /// Create options for the given API root
    pub fn new(api_url: &str) -> Result<Self> {
        let api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(Error::config(format!("{} cannot be used as an API root", api_url)));
        }

        Ok(Self {
            api_url,
            request_timeout: None,
            search_debounce: Duration::from_millis(300),
            keep_unused_data: DEFAULT_KEEP_UNUSED,
            persist_key: "karnue_admin".to_string(),
            state_path: None,
        })
    }

    /// Read the API root from `KARNUE_API_URL`, loading `.env` first
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let api_url = std::env::var(API_URL_ENV).map_err(|_| {
            Error::config(format!("{} environment variable not found", API_URL_ENV))
        })?;
        Self::new(&api_url)
    }

    /// API root without a trailing slash
    pub fn api_root(&self) -> &str {
        self.api_url.as_str().trim_end_matches('/')
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the search debounce window
    pub fn with_search_debounce(mut self, value: Duration) -> Self {
        self.search_debounce = value;
        self
    }

    /// Set how long unused cache entries are kept
    pub fn with_keep_unused_data(mut self, value: Duration) -> Self {
        self.keep_unused_data = value;
        self
    }

    /// Set the persisted blob namespace
    pub fn with_persist_key(mut self, value: &str) -> Self {
        self.persist_key = value.to_string();
        self
    }

    /// Persist state to the given file
    pub fn with_state_path(mut self, value: impl Into<PathBuf>) -> Self {
        self.state_path = Some(value.into());
        self
    }
}
