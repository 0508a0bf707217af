//! Session state and its transitions

use serde::{Deserialize, Serialize};

use super::types::{LoginResponse, SessionUser};

/// Error recorded when a login fails without a usable reason
pub const LOGIN_FAILED: &str = "Login failed";

/// Process-wide admin session
///
/// Whether the session is authenticated is derived from `token` and
/// `user`, never stored. `is_loading` and `error` describe the last login
/// attempt and are not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: Option<SessionUser>,
    pub token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(skip)]
    pub is_loading: bool,
    #[serde(skip)]
    pub error: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some() && self.user.is_some()
    }

    pub fn set_credentials(&mut self, user: SessionUser, token: String, refresh_token: Option<String>) {
        self.user = Some(user);
        self.token = Some(token);
        self.refresh_token = refresh_token;
        self.error = None;
    }

    /// Replace the access token only
    pub fn update_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Clear credentials and any error
    pub fn logout(&mut self) {
        self.user = None;
        self.token = None;
        self.refresh_token = None;
        self.is_loading = false;
        self.error = None;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn login_pending(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Store the login result; a response without a token stays unauthenticated
    pub fn login_fulfilled(&mut self, response: LoginResponse) {
        self.is_loading = false;
        self.user = Some(response.user);
        self.token = response.token;
        self.refresh_token = response.refresh_token;
        self.error = None;
    }

    pub fn login_rejected(&mut self, reason: &str) {
        self.is_loading = false;
        let reason = reason.trim();
        self.error = Some(if reason.is_empty() {
            LOGIN_FAILED.to_string()
        } else {
            reason.to_string()
        });
    }

    /// A refresh that returns no token leaves the session unauthenticated
    pub fn refresh_fulfilled(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// A failed refresh ends the session
    pub fn refresh_rejected(&mut self) {
        self.user = None;
        self.token = None;
        self.refresh_token = None;
    }
}
