//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod state_builders;

pub use config::{PortalSettings, ServerConfig};

#[cfg(feature = "metrics")]
pub(crate) use metrics::make_metrics;
#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::body::MessageBody;
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

#[cfg(debug_assertions)]
use portal::doc::ApiDoc;
use portal::inbound::http::configure;
use portal::inbound::http::health::{HealthState, live, ready};
use portal::inbound::http::state::HttpState;
use portal::{SessionGate, Trace};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();
    let gate = SessionGate::new(http_state.policy.clone());

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .service(ready)
        .service(live)
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app.wrap(gate).wrap(session).wrap(Trace)
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Parameters
/// - `health_state`: shared readiness state updated once the server is bound.
/// - `config`: pre-built [`ServerConfig`] with session, binding, backend and
///   optional metrics settings.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when building the backend client, binding
/// the socket or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config)?;
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        backend_url,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    info!(%bind_addr, backend = %backend_url, "portal listening");
    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::{StatusCode, header};
    use actix_web::test as actix_test;
    use portal::domain::RoutePolicy;
    use portal::domain::ports::{
        ApiError, ApiRequest, AuthGateway, BackendApi, LoginGrant,
    };
    use portal::domain::{LoginCredentials, SessionToken};
    use rstest::rstest;
    use serde_json::Value;
    use std::sync::Arc;

    struct Offline;

    #[async_trait::async_trait]
    impl BackendApi for Offline {
        async fn request(&self, _: &str, _: ApiRequest) -> Result<Option<Value>, ApiError> {
            Err(ApiError::transport("offline"))
        }
    }

    #[async_trait::async_trait]
    impl AuthGateway for Offline {
        async fn login(&self, _: &LoginCredentials) -> Result<LoginGrant, ApiError> {
            Err(ApiError::transport("offline"))
        }

        async fn logout(&self, _: &SessionToken) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn deps() -> AppDependencies {
        let backend = Arc::new(Offline);
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state: web::Data::new(HttpState::new(
                backend.clone(),
                backend,
                RoutePolicy::default(),
            )),
            key: Key::generate(),
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn protected_pages_redirect_anonymous_visitors() {
        let app = actix_test::init_service(build_app(deps())).await;
        let res =
            actix_test::call_service(&app, actix_test::TestRequest::get().uri("/tasks").to_request()).await;

        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some("/login?next=%2Ftasks")
        );
        assert!(res.headers().contains_key("trace-id"));
    }

    #[rstest]
    #[case("/health/live", StatusCode::OK)]
    #[case("/health/ready", StatusCode::SERVICE_UNAVAILABLE)]
    #[case("/login", StatusCode::OK)]
    #[actix_web::test]
    async fn open_routes_answer_without_a_session(
        #[case] path: &str,
        #[case] expected: StatusCode,
    ) {
        let app = actix_test::init_service(build_app(deps())).await;
        let res = actix_test::call_service(&app, actix_test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(res.status(), expected);
    }

    #[rstest]
    #[actix_web::test]
    async fn unreachable_backends_issue_no_session() {
        let app = actix_test::init_service(build_app(deps())).await;
        let login = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/login")
                .set_form([("email", "ada@example.com"), ("password", "pw")])
                .to_request(),
        )
        .await;
        assert_eq!(login.status(), StatusCode::OK);
        assert!(
            login.response().cookies().all(|cookie| cookie.name() != "session"),
            "failed logins must not issue a session"
        );
    }
}
