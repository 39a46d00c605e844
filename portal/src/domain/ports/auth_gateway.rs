//! Port for the backend's login and logout endpoints.
//!
//! Login is the one call that is not JSON and whose credential arrives in a
//! `Set-Cookie` header, so it sits apart from [`super::BackendApi`].

use async_trait::async_trait;

use crate::domain::{CachedUser, LoginCredentials, SessionToken};

use super::ApiError;

/// What a successful login hands back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginGrant {
    /// Value of the backend's `token` cookie.
    pub token: SessionToken,
    /// `user` from the response body, when present.
    pub user: Option<CachedUser>,
}

/// Driven port for backend authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Exchange credentials for a backend session.
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginGrant, ApiError>;

    /// End the backend session identified by `token`.
    async fn logout(&self, token: &SessionToken) -> Result<(), ApiError>;
}
