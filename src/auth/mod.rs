//! Admin authentication
//!
//! [`AuthStore`] holds the session; [`AuthClient`] talks to
//! `/api/admin` and drives the store's transitions.

mod session;
mod store;
mod types;

use log::{info, warn};
use serde_json::Value;

use crate::cache::{MutationEndpoint, Query, QueryCache, QueryEndpoint};
use crate::error::{Error, Result};
use crate::fetch::BaseQuery;

pub use session::*;
pub use store::AuthStore;
pub use types::*;

/// Client for the admin auth endpoints
#[derive(Debug, Clone)]
pub struct AuthClient {
    base: BaseQuery,
    cache: QueryCache,
    store: AuthStore,
}

impl AuthClient {
    pub(crate) fn new(base: BaseQuery, cache: QueryCache, store: AuthStore) -> Self {
        Self { base, cache, store }
    }

    pub fn store(&self) -> &AuthStore {
        &self.store
    }

    /// Sign in and store the returned credentials
    ///
    /// Invalid input is rejected before any request and leaves the session
    /// untouched. A rejected login records the server's reason on the
    /// session.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginResponse> {
        credentials.validate()?;
        self.store.login_pending();

        let request = self
            .base
            .post("/login")
            .json(credentials)?
            .execute::<LoginResponse>();
        match self.cache.mutate(MutationEndpoint::Login, request).await {
            Ok(response) => {
                info!("signed in as {}", response.user.email);
                self.store.login_fulfilled(response.clone());
                Ok(response)
            }
            Err(err) => {
                self.store.login_rejected(&err.reason());
                Err(err)
            }
        }
    }

    /// Server logout; the local session is only cleared once the server
    /// acknowledges
    pub async fn logout(&self) -> Result<()> {
        let request = self.base.post("/logout").execute_value();
        self.cache.mutate(MutationEndpoint::Logout, request).await?;
        self.store.logout();
        Ok(())
    }

    /// Exchange the stored refresh token for a new access token
    ///
    /// Without a refresh token the session is ended. A failed exchange also
    /// ends it.
    pub async fn refresh_token(&self) -> Result<Option<String>> {
        let refresh_token = match self.store.refresh_token() {
            Some(token) => token,
            None => {
                warn!("refresh requested without a refresh token, logging out");
                self.store.logout();
                return Err(Error::validation("no refresh token available"));
            }
        };

        let body = RefreshTokenRequest { refresh_token };
        let request = self
            .base
            .post("/refresh")
            .json(&body)?
            .execute::<RefreshTokenResponse>();
        match self.cache.mutate(MutationEndpoint::RefreshToken, request).await {
            Ok(response) => {
                self.store.refresh_fulfilled(response.token.clone());
                Ok(response.token)
            }
            Err(err) => {
                self.store.refresh_rejected();
                Err(err)
            }
        }
    }

    pub fn get_profile(&self) -> Result<Query<SessionUser>> {
        let base = self.base.clone();
        self.cache.query(QueryEndpoint::GetProfile, &Value::Null, move || {
            base.get("/profile").execute_value()
        })
    }

    pub async fn update_profile(&self, patch: &UpdateProfileRequest) -> Result<SessionUser> {
        let request = self
            .base
            .patch("/profile")
            .json(patch)?
            .execute::<SessionUser>();
        self.cache.mutate(MutationEndpoint::UpdateProfile, request).await
    }
}
