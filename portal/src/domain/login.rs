//! Login and logout flows.
//!
//! These sit between the login form handler and the [`AuthGateway`]: they
//! translate backend failures into the message the form shows and keep the
//! session store consistent with the outcome.

use std::sync::Arc;

use tracing::{error, info, warn};

use super::ports::{ApiError, AuthGateway, SessionStore};
use super::{LoginCredentials, LoginValidationError, RoutePolicy};

/// Shown when the backend rejects credentials without saying why.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password.";

/// Shown for any other login failure.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed.";

/// Where the browser goes after a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Signed in; redirect to `location`.
    Redirect {
        /// Local path to redirect to.
        location: String,
    },
    /// Stay on the form and show `message`.
    Rejected {
        /// Message for the form.
        message: String,
    },
}

fn rejection_message(error: &ApiError) -> &str {
    match error {
        ApiError::Status {
            detail: Some(detail),
            ..
        } => detail,
        ApiError::Status { detail: None, .. } => INVALID_CREDENTIALS_MESSAGE,
        ApiError::Transport { .. } | ApiError::Decode { .. } => LOGIN_FAILED_MESSAGE,
    }
}

fn validation_message(error: LoginValidationError) -> &'static str {
    match error {
        LoginValidationError::MissingIdentifier => "Email is required.",
        LoginValidationError::MissingPassword => "Password is required.",
    }
}

/// Signs visitors in and out against the backend.
#[derive(Clone)]
pub struct LoginService {
    gateway: Arc<dyn AuthGateway>,
    policy: RoutePolicy,
}

impl LoginService {
    /// Create the service.
    pub fn new(gateway: Arc<dyn AuthGateway>, policy: RoutePolicy) -> Self {
        Self { gateway, policy }
    }

    /// Validate the form, log in, and persist the session.
    ///
    /// On success the session holds the backend token and cached user, and
    /// the outcome redirects to `next` when it is a safe protected path, or
    /// to the landing page otherwise.
    pub async fn login(
        &self,
        store: &dyn SessionStore,
        identifier: &str,
        password: &str,
        next: Option<&str>,
    ) -> LoginOutcome {
        let credentials = match LoginCredentials::try_from_parts(identifier, password) {
            Ok(credentials) => credentials,
            Err(err) => {
                return LoginOutcome::Rejected {
                    message: validation_message(err).to_owned(),
                };
            }
        };

        let grant = match self.gateway.login(&credentials).await {
            Ok(grant) => grant,
            Err(err) => {
                warn!(error = %err, "login rejected by backend");
                return LoginOutcome::Rejected {
                    message: rejection_message(&err).to_owned(),
                };
            }
        };

        if let Err(err) = store.establish(&grant.token, grant.user) {
            error!(error = %err, "failed to persist session after login");
            return LoginOutcome::Rejected {
                message: LOGIN_FAILED_MESSAGE.to_owned(),
            };
        }

        info!(identifier = credentials.identifier(), "user logged in");
        LoginOutcome::Redirect {
            location: self.policy.return_target(next),
        }
    }

    /// End the backend session, best effort, then clear the local one.
    ///
    /// Returns the login path to redirect to.
    pub async fn logout(&self, store: &dyn SessionStore) -> String {
        if let Some(token) = store.token() {
            if let Err(err) = self.gateway.logout(&token).await {
                warn!(error = %err, "backend logout failed; clearing local session anyway");
            }
        }
        store.clear();
        self.policy.login_path().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        InMemorySessionStore, LoginGrant, MockAuthGateway, MockSessionStore, SessionStoreError,
    };
    use crate::domain::{CachedUser, SessionToken};
    use rstest::{fixture, rstest};

    fn token() -> SessionToken {
        SessionToken::new("tok-123").expect("valid token")
    }

    fn granted() -> LoginGrant {
        LoginGrant {
            token: token(),
            user: Some(CachedUser {
                email: Some("ada@example.com".into()),
                ..CachedUser::default()
            }),
        }
    }

    fn service(gateway: MockAuthGateway) -> LoginService {
        LoginService::new(Arc::new(gateway), RoutePolicy::default())
    }

    #[fixture]
    fn store() -> InMemorySessionStore {
        InMemorySessionStore::default()
    }

    #[rstest]
    #[case(Some("/clients/42"), "/clients/42")]
    #[case(Some("https://evil.example"), "/dashboard")]
    #[case(None, "/dashboard")]
    #[tokio::test]
    async fn successful_login_persists_session_and_redirects(
        store: InMemorySessionStore,
        #[case] next: Option<&str>,
        #[case] expected: &str,
    ) {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_login()
            .withf(|creds| creds.identifier() == "ada@example.com" && creds.password() == "pw")
            .times(1)
            .returning(|_| Ok(granted()));

        let outcome = service(gateway)
            .login(&store, " ada@example.com ", "pw", next)
            .await;

        assert_eq!(
            outcome,
            LoginOutcome::Redirect {
                location: expected.to_owned()
            }
        );
        assert_eq!(store.token(), Some(token()));
        assert_eq!(
            store.cached_user().and_then(|u| u.email),
            Some("ada@example.com".to_owned())
        );
    }

    #[rstest]
    #[case(ApiError::status(401, Some("Incorrect email or password".into()), "Unauthorized"), "Incorrect email or password")]
    #[case(ApiError::status(401, None, "Unauthorized"), INVALID_CREDENTIALS_MESSAGE)]
    #[case(ApiError::transport("connection refused"), LOGIN_FAILED_MESSAGE)]
    #[tokio::test]
    async fn failures_map_to_form_messages(
        store: InMemorySessionStore,
        #[case] failure: ApiError,
        #[case] expected: &str,
    ) {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_login()
            .returning(move |_| Err(failure.clone()));

        let outcome = service(gateway).login(&store, "ada", "pw", None).await;

        assert_eq!(
            outcome,
            LoginOutcome::Rejected {
                message: expected.to_owned()
            }
        );
        assert!(!store.is_authenticated());
    }

    #[rstest]
    #[case("", "pw", "Email is required.")]
    #[case("ada", "", "Password is required.")]
    #[tokio::test]
    async fn blank_fields_never_reach_the_backend(
        store: InMemorySessionStore,
        #[case] identifier: &str,
        #[case] password: &str,
        #[case] expected: &str,
    ) {
        let mut gateway = MockAuthGateway::new();
        gateway.expect_login().times(0);

        let outcome = service(gateway)
            .login(&store, identifier, password, None)
            .await;

        assert_eq!(
            outcome,
            LoginOutcome::Rejected {
                message: expected.to_owned()
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn store_failures_reject_the_login() {
        let mut gateway = MockAuthGateway::new();
        gateway.expect_login().returning(|_| Ok(granted()));
        let mut store = MockSessionStore::new();
        store
            .expect_establish()
            .returning(|_, _| Err(SessionStoreError::write("cookie too large")));

        let outcome = service(gateway).login(&store, "ada", "pw", None).await;

        assert_eq!(
            outcome,
            LoginOutcome::Rejected {
                message: LOGIN_FAILED_MESSAGE.to_owned()
            }
        );
    }

    #[rstest]
    #[tokio::test]
    async fn logout_clears_even_when_backend_fails() {
        let mut gateway = MockAuthGateway::new();
        gateway
            .expect_logout()
            .times(1)
            .returning(|_| Err(ApiError::transport("connection reset")));
        let store = InMemorySessionStore::signed_in(token(), None);

        let location = service(gateway).logout(&store).await;

        assert_eq!(location, "/login");
        assert!(!store.is_authenticated());
    }

    #[rstest]
    #[tokio::test]
    async fn logout_without_session_skips_backend(store: InMemorySessionStore) {
        let mut gateway = MockAuthGateway::new();
        gateway.expect_logout().times(0);

        assert_eq!(service(gateway).logout(&store).await, "/login");
    }
}
