//! Cookie-backed [`SessionStore`] adapter.
//!
//! Wraps the actix session so handlers and domain flows only see the
//! backend token and cached user. Values that fail to decode are treated as
//! absent and logged.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{CachedUser, SessionToken};

pub(crate) const TOKEN_KEY: &str = "token";
pub(crate) const USER_KEY: &str = "user";

/// Read the backend token from an actix session.
pub(crate) fn session_token(session: &Session) -> Option<SessionToken> {
    match session.get::<String>(TOKEN_KEY) {
        Ok(Some(raw)) => match SessionToken::new(raw) {
            Ok(token) => Some(token),
            Err(error) => {
                warn!(%error, "invalid token in session cookie");
                None
            }
        },
        Ok(None) => None,
        Err(error) => {
            warn!(%error, "failed to read token from session");
            None
        }
    }
}

/// The visitor's session as seen by handlers.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Wrap an actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }
}

impl SessionStore for SessionContext {
    fn token(&self) -> Option<SessionToken> {
        session_token(&self.0)
    }

    fn cached_user(&self) -> Option<CachedUser> {
        match self.0.get::<CachedUser>(USER_KEY) {
            Ok(user) => user,
            Err(error) => {
                warn!(%error, "invalid cached user in session cookie");
                None
            }
        }
    }

    fn establish(
        &self,
        token: &SessionToken,
        user: Option<CachedUser>,
    ) -> Result<(), SessionStoreError> {
        self.0.renew();
        self.0.remove(USER_KEY);
        self.0
            .insert(TOKEN_KEY, token.expose())
            .map_err(|error| SessionStoreError::write(error.to_string()))?;
        if let Some(user) = user {
            self.remember_user(&user)?;
        }
        Ok(())
    }

    fn remember_user(&self, user: &CachedUser) -> Result<(), SessionStoreError> {
        self.0
            .insert(USER_KEY, user)
            .map_err(|error| SessionStoreError::write(error.to_string()))
    }

    fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
