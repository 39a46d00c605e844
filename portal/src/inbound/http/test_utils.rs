//! Test helpers for inbound HTTP components.

use std::sync::{Arc, Mutex, PoisonError};

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::App;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::test::TestRequest;
use actix_web::web;
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::domain::ports::{
    ApiError, ApiMethod, ApiRequest, AuthGateway, BackendApi, LoginGrant,
};
use crate::domain::{CachedUser, LoginCredentials, RoutePolicy, SessionToken};

use super::state::HttpState;
use crate::middleware::SessionGate;

pub const TEST_TOKEN: &str = "tok-test";
pub const TEST_PASSWORD: &str = "correct horse";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// The `session` cookie set by `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
}

type Reply = Result<Option<Value>, ApiError>;

/// Backend fake answering from a fixed script and recording every call.
///
/// Unscripted calls answer `404 {"detail": "Not Found"}`.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<Vec<(ApiMethod, String, Reply)>>,
    calls: Mutex<Vec<(String, ApiRequest)>>,
}

impl ScriptedBackend {
    pub fn reply(self, method: ApiMethod, path: &str, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((method, path.to_owned(), reply));
        self
    }

    pub fn get(self, path: &str, body: Value) -> Self {
        self.reply(ApiMethod::Get, path, Ok(Some(body)))
    }

    pub fn post(self, path: &str, body: Value) -> Self {
        self.reply(ApiMethod::Post, path, Ok(Some(body)))
    }

    pub fn fail(self, method: ApiMethod, path: &str, status: u16, detail: &str) -> Self {
        self.reply(
            method,
            path,
            Err(ApiError::status(status, Some(detail.to_owned()), "")),
        )
    }

    pub fn calls(&self) -> Vec<(String, ApiRequest)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls().into_iter().map(|(path, _)| path).collect()
    }
}

#[async_trait]
impl BackendApi for ScriptedBackend {
    async fn request(&self, path: &str, request: ApiRequest) -> Reply {
        let method = request.method;
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((path.to_owned(), request));
        self.replies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|(m, p, _)| *m == method && p == path)
            .map_or_else(
                || Err(ApiError::status(404, Some("Not Found".to_owned()), "")),
                |(_, _, reply)| reply.clone(),
            )
    }
}

/// Gateway fake accepting [`TEST_PASSWORD`] for any identifier.
#[derive(Default)]
pub struct FakeGateway {
    pub logout_fails: bool,
    pub logouts: Mutex<Vec<String>>,
}

#[async_trait]
impl AuthGateway for FakeGateway {
    async fn login(&self, credentials: &LoginCredentials) -> Result<LoginGrant, ApiError> {
        if credentials.password() != TEST_PASSWORD {
            return Err(ApiError::status(
                401,
                Some("Invalid credentials".to_owned()),
                "Unauthorized",
            ));
        }
        let token = SessionToken::new(TEST_TOKEN)
            .map_err(|err| ApiError::decode(err.to_string()))?;
        Ok(LoginGrant {
            token,
            user: Some(CachedUser {
                email: Some(credentials.identifier().to_owned()),
                full_name: Some("Ada Lovelace".to_owned()),
                ..CachedUser::default()
            }),
        })
    }

    async fn logout(&self, token: &SessionToken) -> Result<(), ApiError> {
        self.logouts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(token.expose().to_owned());
        if self.logout_fails {
            return Err(ApiError::transport("connection refused"));
        }
        Ok(())
    }
}

/// Handler state over the given fakes.
pub fn http_state(
    backend: Arc<ScriptedBackend>,
    gateway: Arc<FakeGateway>,
) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(backend, gateway, RoutePolicy::default()))
}

/// Portal routes behind the session gate, over `state`.
pub fn test_app(
    state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .wrap(SessionGate::default())
        .wrap(test_session_middleware())
        .configure(super::configure)
}

/// Minimal `/users/me` payload.
pub fn me() -> Value {
    json!({"id": 1, "email": "ada@example.com", "full_name": "Ada Lovelace"})
}

/// `POST /login` with credentials [`FakeGateway`] accepts.
pub fn sign_in_request() -> TestRequest {
    TestRequest::post().uri("/login").set_form([
        ("email", "ada@example.com"),
        ("password", TEST_PASSWORD),
    ])
}
