//! Shared session handle

use log::{debug, warn};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::session::Session;
use super::types::{LoginResponse, SessionUser};
use crate::fetch::TokenAccessor;
use crate::persist::Persistor;

/// Owner of the process-wide [`Session`]
///
/// Every transition is written through to the attached [`Persistor`].
/// Clones share the same session.
#[derive(Debug, Clone, Default)]
pub struct AuthStore {
    session: Arc<RwLock<Session>>,
    persistor: Option<Persistor>,
}

impl AuthStore {
    pub fn new(session: Session, persistor: Option<Persistor>) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
            persistor,
        }
    }

    /// Copy of the current session
    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.read().refresh_token.clone()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.read().user.clone()
    }

    /// Token reader handed to every authenticated client
    pub fn token_accessor(&self) -> TokenAccessor {
        let session = self.session.clone();
        Arc::new(move || {
            session
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .token
                .clone()
        })
    }

    pub fn set_credentials(&self, user: SessionUser, token: String, refresh_token: Option<String>) {
        self.transition(|s| s.set_credentials(user, token, refresh_token));
    }

    pub fn update_token(&self, token: String) {
        self.transition(|s| s.update_token(token));
    }

    /// Local logout; no server call
    pub fn logout(&self) {
        debug!("clearing local session");
        self.transition(Session::logout);
    }

    pub fn clear_error(&self) {
        self.transition(Session::clear_error);
    }

    pub(crate) fn login_pending(&self) {
        self.transition(Session::login_pending);
    }

    pub(crate) fn login_fulfilled(&self, response: LoginResponse) {
        self.transition(|s| s.login_fulfilled(response));
    }

    pub(crate) fn login_rejected(&self, reason: &str) {
        self.transition(|s| s.login_rejected(reason));
    }

    pub(crate) fn refresh_fulfilled(&self, token: Option<String>) {
        self.transition(|s| s.refresh_fulfilled(token));
    }

    pub(crate) fn refresh_rejected(&self) {
        self.transition(Session::refresh_rejected);
    }

    fn transition(&self, apply: impl FnOnce(&mut Session)) {
        let snapshot = {
            let mut session = self.write();
            apply(&mut session);
            session.clone()
        };
        if let Some(persistor) = &self.persistor {
            if let Err(err) = persistor.save_session(&snapshot) {
                warn!("failed to persist session: {}", err);
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.session.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.session.write().unwrap_or_else(PoisonError::into_inner)
    }
}
