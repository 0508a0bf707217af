//! Karnue Admin Client Library
//!
//! Typed data layer for the Karnue admin dashboard: REST clients for each
//! admin domain, a query cache kept consistent through tag invalidation,
//! and a persisted session whose token authenticates every request.

pub mod auth;
pub mod cache;
pub mod config;
pub mod dashboard;
pub mod drivers;
pub mod error;
pub mod feedback;
pub mod fetch;
pub mod persist;
pub mod reservations;
pub mod riders;
pub mod view;
pub mod waitlist;

use log::{debug, warn};
use reqwest::Client;
use std::sync::Arc;

use crate::auth::{AuthClient, AuthStore, Session};
use crate::cache::QueryCache;
use crate::config::ClientOptions;
use crate::dashboard::DashboardClient;
use crate::drivers::DriversClient;
use crate::error::Result;
use crate::feedback::FeedbackClient;
use crate::fetch::BaseQuery;
use crate::persist::{FileStorage, MemoryStorage, PersistedState, Persistor, StateStorage};
use crate::reservations::ReservationsClient;
use crate::riders::RidersClient;
use crate::view::{ReservationsPageState, RidersPageState, SearchDebouncer};
use crate::waitlist::WaitlistClient;

const ADMIN_ROOT: &str = "/api/admin";
const FEEDBACK_ROOT: &str = "/api/feedback";
const WAITLIST_ROOT: &str = "/api/waitlist/admin";

/// The main entry point for the Karnue admin client
///
/// Owns the shared query cache, the session store and the persisted
/// state. Domain clients handed out by the accessors share all three.
#[derive(Debug, Clone)]
pub struct KarnueAdmin {
    /// Client options
    pub options: ClientOptions,
    /// HTTP client used for requests
    pub http_client: Client,
    cache: QueryCache,
    auth_store: AuthStore,
    persistor: Persistor,
    restored: PersistedState,
}

impl KarnueAdmin {
    /// Create a client for the API at `api_url`
    ///
    /// # Example
    ///
    /// ```
    /// use karnue_admin::KarnueAdmin;
    ///
    /// let admin = KarnueAdmin::new("https://api.karnue.example").unwrap();
    /// assert!(!admin.session().is_authenticated());
    /// ```
    pub fn new(api_url: &str) -> Result<Self> {
        Ok(Self::new_with_options(ClientOptions::new(api_url)?))
    }

    /// Create a client from `KARNUE_API_URL`
    pub fn from_env() -> Result<Self> {
        Ok(Self::new_with_options(ClientOptions::from_env()?))
    }

    /// Create a client with custom options
    ///
    /// Startup rehydrates the session and page filters from durable
    /// storage. The query cache always starts empty.
    pub fn new_with_options(options: ClientOptions) -> Self {
        let storage: Arc<dyn StateStorage> = match &options.state_path {
            Some(path) => Arc::new(FileStorage::new(path)),
            None => Arc::new(MemoryStorage::new()),
        };
        let persistor = Persistor::new(storage, &options.persist_key);
        let restored = persistor.rehydrate();
        debug!(
            "startup: session restored = {}",
            restored.auth.is_authenticated()
        );

        let auth_store = AuthStore::new(restored.auth.clone(), Some(persistor.clone()));
        let cache = QueryCache::new().with_keep_unused(options.keep_unused_data);

        Self {
            options,
            http_client: Client::new(),
            cache,
            auth_store,
            persistor,
            restored,
        }
    }

    fn base(&self, root: &str, authenticated: bool) -> BaseQuery {
        let base = BaseQuery::new(self.http_client.clone(), self.options.api_root(), root)
            .with_timeout(self.options.request_timeout);
        if authenticated {
            base.with_token_accessor(self.auth_store.token_accessor())
        } else {
            base
        }
    }

    /// Auth client for login, logout, refresh and profile
    pub fn auth(&self) -> AuthClient {
        AuthClient::new(
            self.base(ADMIN_ROOT, true),
            self.cache.clone(),
            self.auth_store.clone(),
        )
    }

    pub fn riders(&self) -> RidersClient {
        RidersClient::new(self.base(ADMIN_ROOT, true), self.cache.clone())
    }

    pub fn drivers(&self) -> DriversClient {
        DriversClient::new(self.base(ADMIN_ROOT, true), self.cache.clone())
    }

    pub fn reservations(&self) -> ReservationsClient {
        ReservationsClient::new(self.base(ADMIN_ROOT, true), self.cache.clone())
    }

    pub fn dashboard(&self) -> DashboardClient {
        DashboardClient::new(self.base(ADMIN_ROOT, true), self.cache.clone())
    }

    /// Feedback client; these endpoints take no credentials
    pub fn feedback(&self) -> FeedbackClient {
        FeedbackClient::new(self.base(FEEDBACK_ROOT, false), self.cache.clone())
    }

    /// Waitlist client; these endpoints take no credentials
    pub fn waitlist(&self) -> WaitlistClient {
        WaitlistClient::new(self.base(WAITLIST_ROOT, false), self.cache.clone())
    }

    /// The shared query cache
    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn auth_store(&self) -> &AuthStore {
        &self.auth_store
    }

    /// Copy of the current session
    pub fn session(&self) -> Session {
        self.auth_store.snapshot()
    }

    /// Riders filters as they were at startup
    pub fn restored_riders_page(&self) -> RidersPageState {
        self.restored.riders.clone()
    }

    /// Reservations filters as they were at startup
    pub fn restored_reservations_page(&self) -> ReservationsPageState {
        self.restored.reservations.clone()
    }

    pub fn save_riders_page(&self, state: &RidersPageState) {
        if let Err(err) = self.persistor.save_riders(state) {
            warn!("failed to persist riders filters: {}", err);
        }
    }

    pub fn save_reservations_page(&self, state: &ReservationsPageState) {
        if let Err(err) = self.persistor.save_reservations(state) {
            warn!("failed to persist reservations filters: {}", err);
        }
    }

    /// Debouncer for a page's search box, using the configured delay
    pub fn search_debouncer(&self, initial: &str) -> SearchDebouncer {
        SearchDebouncer::new(self.options.search_debounce, initial)
    }

    /// Drop all persisted state and end the local session
    pub fn purge(&self) -> Result<()> {
        self.auth_store.logout();
        self.persistor.purge()
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::KarnueAdmin;
    pub use crate::cache::{ListStatus, Query, QueryState};
    pub use crate::config::ClientOptions;
    pub use crate::error::{Error, Result};
    pub use crate::view::{FilterState, SortOrder};
}
