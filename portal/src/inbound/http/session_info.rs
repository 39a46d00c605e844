//! Session introspection for scripts and the browser.
//!
//! ```text
//! GET /session
//! ```

use actix_web::{get, web};
use tracing::warn;

use crate::domain::ports::SessionStore;
use crate::domain::{CachedUser, Error};

use super::ApiResult;
use super::schemas::{CachedUserSchema, ErrorSchema};
use super::session::SessionContext;
use super::state::HttpState;

/// Return the signed-in user.
///
/// Answers from the session cache when it holds a user, otherwise refreshes
/// it from `GET /users/me`. A token the backend no longer accepts clears the
/// session.
#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Signed-in user", body = CachedUserSchema),
        (status = 401, description = "No portal session", body = ErrorSchema),
        (status = 503, description = "Backend unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["session"],
    operation_id = "currentSession"
)]
#[get("/session")]
pub async fn session_info(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CachedUser>> {
    if !session.is_authenticated() {
        return Err(Error::unauthorized("Login required"));
    }
    if let Some(user) = session.cached_user() {
        return Ok(web::Json(user));
    }
    match state.portal.current_user(&session).await {
        Ok(user) => Ok(web::Json(user)),
        Err(err) => {
            if err.is_unauthorized() {
                warn!("backend rejected session token; signing out");
                session.clear();
            }
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::ApiMethod;
    use crate::inbound::http::session::TOKEN_KEY;
    use crate::inbound::http::test_utils::{
        FakeGateway, ScriptedBackend, TEST_TOKEN, http_state, me, session_cookie,
        sign_in_request, test_app,
    };
    use actix_session::Session;
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Arc;

    async fn read_json<B: actix_web::body::MessageBody>(
        res: actix_web::dev::ServiceResponse<B>,
    ) -> (StatusCode, Value) {
        let status = res.status();
        let body = actix_test::read_body(res).await;
        (status, serde_json::from_slice(&body).expect("JSON body"))
    }

    #[rstest]
    #[actix_web::test]
    async fn anonymous_visitors_get_unauthorized() {
        let app = actix_test::init_service(test_app(http_state(
            Arc::new(ScriptedBackend::default()),
            Arc::new(FakeGateway::default()),
        )))
        .await;

        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/session").to_request()).await;
        let (status, body) = read_json(res).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");
    }

    #[rstest]
    #[actix_web::test]
    async fn signed_in_visitors_see_the_cached_user() {
        let backend = Arc::new(ScriptedBackend::default());
        let app = actix_test::init_service(test_app(http_state(
            backend.clone(),
            Arc::new(FakeGateway::default()),
        )))
        .await;
        let signed_in = actix_test::call_service(&app, sign_in_request().to_request()).await;
        let cookie = session_cookie(&signed_in).expect("session cookie");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/session").cookie(cookie).to_request(),
        )
        .await;
        let (status, body) = read_json(res).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["full_name"], "Ada Lovelace");
        assert_eq!(body["email"], "ada@example.com");
        assert!(backend.calls().is_empty(), "cache hit needs no backend call");
    }

    async fn token_only_app(
        backend: Arc<ScriptedBackend>,
    ) -> impl actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    > {
        actix_test::init_service(
            App::new()
                .app_data(http_state(backend, Arc::new(FakeGateway::default())))
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route(
                    "/__token",
                    web::get().to(|session: Session| async move {
                        match session.insert(TOKEN_KEY, TEST_TOKEN) {
                            Ok(()) => HttpResponse::Ok().finish(),
                            Err(_) => HttpResponse::InternalServerError().finish(),
                        }
                    }),
                )
                .service(session_info),
        )
        .await
    }

    #[rstest]
    #[actix_web::test]
    async fn missing_cache_is_refreshed_from_the_backend() {
        let backend = Arc::new(ScriptedBackend::default().get("/users/me", me()));
        let app = token_only_app(backend.clone()).await;
        let primed =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/__token").to_request()).await;
        let cookie = session_cookie(&primed).expect("session cookie");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/session").cookie(cookie).to_request(),
        )
        .await;
        let (status, body) = read_json(res).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], 1);
        assert_eq!(backend.paths(), vec!["/users/me"]);
    }

    #[rstest]
    #[actix_web::test]
    async fn rejected_tokens_clear_the_session() {
        let backend = Arc::new(ScriptedBackend::default().fail(
            ApiMethod::Get,
            "/users/me",
            401,
            "Not authenticated",
        ));
        let app = token_only_app(backend).await;
        let primed =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/__token").to_request()).await;
        let cookie = session_cookie(&primed).expect("session cookie");

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/session").cookie(cookie).to_request(),
        )
        .await;
        let removal = session_cookie(&res).expect("session cookie removed");
        let (status, body) = read_json(res).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Not authenticated");
        assert_eq!(removal.value(), "");
    }
}
