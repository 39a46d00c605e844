//! The portal's routes over the real backend client, for integration tests.

use std::net::TcpListener;
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::Key;
use actix_web::dev::{ServerHandle, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use url::Url;

use portal::domain::RoutePolicy;
use portal::inbound::http::configure;
use portal::inbound::http::state::HttpState;
use portal::outbound::backend::ApiClient;
use portal::{SessionGate, Trace};

/// Portal app wired like production, with an insecure cookie for plain HTTP.
pub fn portal_app(
    backend_url: Url,
    key: Key,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let client = Arc::new(ApiClient::new(&backend_url).expect("reqwest client"));
    let state = web::Data::new(HttpState::new(
        client.clone(),
        client,
        RoutePolicy::default(),
    ));
    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    App::new()
        .app_data(state)
        .configure(configure)
        .wrap(SessionGate::default())
        .wrap(session)
        .wrap(Trace)
}

/// Serve the portal on an ephemeral port inside the current actix system.
///
/// Returns the portal's base URL and a handle for stopping it.
pub fn spawn_portal(backend_url: Url) -> (String, ServerHandle) {
    let key = Key::generate();
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");
    let server = HttpServer::new(move || portal_app(backend_url.clone(), key.clone()))
        .disable_signals()
        .workers(1)
        .listen(listener)
        .expect("listen on ephemeral port")
        .run();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    (format!("http://{addr}"), handle)
}
