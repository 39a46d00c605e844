//! Port for the visitor's session: where the backend token and cached user
//! record live between requests.
//!
//! Implementations read their backing store fresh on every call. The gate,
//! the login/logout flow and the page services all go through this trait, so
//! tests can swap the cookie-backed adapter for [`InMemorySessionStore`].

use std::sync::{Mutex, PoisonError};

use crate::domain::{CachedUser, SessionToken};

use super::define_port_error;

define_port_error! {
    /// Failures persisting session state.
    pub enum SessionStoreError {
        /// Writing to the underlying store failed.
        Write { message: String } => "failed to persist session: {message}",
    }
}

/// Session capability consumed by domain flows.
#[cfg_attr(test, mockall::automock)]
pub trait SessionStore {
    /// The backend token, when a session exists.
    fn token(&self) -> Option<SessionToken>;

    /// The cached user record, when one was stored.
    fn cached_user(&self) -> Option<CachedUser>;

    /// Whether the visitor is authenticated.
    fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Replace any existing session with `token` and `user`.
    ///
    /// # Errors
    /// Returns [`SessionStoreError`] when the store cannot be written.
    fn establish(
        &self,
        token: &SessionToken,
        user: Option<CachedUser>,
    ) -> Result<(), SessionStoreError>;

    /// Refresh the cached user record without touching the token.
    ///
    /// # Errors
    /// Returns [`SessionStoreError`] when the store cannot be written.
    fn remember_user(&self, user: &CachedUser) -> Result<(), SessionStoreError>;

    /// Forget everything about the visitor.
    fn clear(&self);
}

#[derive(Debug, Default, Clone)]
struct StoredSession {
    token: Option<SessionToken>,
    user: Option<CachedUser>,
}

/// Process-local session store for tests and tooling.
///
/// # Examples
/// ```
/// use portal::domain::ports::{InMemorySessionStore, SessionStore};
/// use portal::domain::SessionToken;
///
/// let store = InMemorySessionStore::default();
/// let token = SessionToken::new("abc123").expect("valid token");
/// store.establish(&token, None).expect("in-memory writes succeed");
/// assert!(store.is_authenticated());
/// store.clear();
/// assert!(!store.is_authenticated());
/// ```
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: Mutex<StoredSession>,
}

impl InMemorySessionStore {
    /// Store pre-populated with `token` and optional `user`.
    #[must_use]
    pub fn signed_in(token: SessionToken, user: Option<CachedUser>) -> Self {
        Self {
            inner: Mutex::new(StoredSession {
                token: Some(token),
                user,
            }),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut StoredSession) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl SessionStore for InMemorySessionStore {
    fn token(&self) -> Option<SessionToken> {
        self.with(|session| session.token.clone())
    }

    fn cached_user(&self) -> Option<CachedUser> {
        self.with(|session| session.user.clone())
    }

    fn establish(
        &self,
        token: &SessionToken,
        user: Option<CachedUser>,
    ) -> Result<(), SessionStoreError> {
        self.with(|session| {
            session.token = Some(token.clone());
            session.user = user;
        });
        Ok(())
    }

    fn remember_user(&self, user: &CachedUser) -> Result<(), SessionStoreError> {
        self.with(|session| session.user = Some(user.clone()));
        Ok(())
    }

    fn clear(&self) {
        self.with(|session| *session = StoredSession::default());
    }
}
