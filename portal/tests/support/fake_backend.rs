//! In-process stand-in for the bookkeeping backend.
//!
//! Binds an actix server to an ephemeral port on 127.0.0.1 so the real
//! reqwest adapter can be exercised end to end. Every request is recorded
//! with its method, path and query, and `Cookie` header.

use std::net::TcpListener;
use std::sync::{Arc, Mutex, PoisonError};

use actix_web::dev::ServerHandle;
use actix_web::http::header;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use serde::Deserialize;
use serde_json::json;
use url::Url;

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "correct horse";
pub const TOKEN: &str = "tok-live";

/// One request as the backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seen {
    pub method: String,
    pub target: String,
    pub cookie: Option<String>,
}

type Log = Arc<Mutex<Vec<Seen>>>;

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

fn record(log: &Log, req: &HttpRequest) {
    let target = req
        .uri()
        .path_and_query()
        .map_or_else(|| req.path().to_owned(), |pq| pq.as_str().to_owned());
    let cookie = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    log.lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(Seen {
            method: req.method().to_string(),
            target,
            cookie,
        });
}

fn has_token(req: &HttpRequest) -> bool {
    req.cookie("token").is_some_and(|cookie| cookie.value() == TOKEN)
}

async fn login(req: HttpRequest, log: web::Data<Log>, form: web::Form<LoginForm>) -> HttpResponse {
    record(&log, &req);
    if form.username != EMAIL || form.password != PASSWORD {
        return HttpResponse::Unauthorized().json(json!({"detail": "Incorrect email or password"}));
    }
    HttpResponse::Ok()
        .insert_header((
            header::SET_COOKIE,
            format!("token={TOKEN}; HttpOnly; Max-Age=604800; Path=/; SameSite=lax"),
        ))
        .json(json!({
            "access_token": "ignored",
            "token_type": "bearer",
            "user": {"id": 1, "email": EMAIL, "full_name": "Ada Lovelace", "role": {"name": "Admin"}}
        }))
}

async fn logout(req: HttpRequest, log: web::Data<Log>) -> HttpResponse {
    record(&log, &req);
    HttpResponse::Ok().json(json!({"message": "Logged out"}))
}

async fn me(req: HttpRequest, log: web::Data<Log>) -> HttpResponse {
    record(&log, &req);
    if !has_token(&req) {
        return HttpResponse::Unauthorized().json(json!({"detail": "Not authenticated"}));
    }
    HttpResponse::Ok().json(json!({"id": 1, "email": EMAIL, "full_name": "Ada Lovelace"}))
}

async fn audit(req: HttpRequest, log: web::Data<Log>) -> HttpResponse {
    record(&log, &req);
    HttpResponse::Ok().json(json!([]))
}

async fn delete_task(req: HttpRequest, log: web::Data<Log>) -> HttpResponse {
    record(&log, &req);
    HttpResponse::NoContent().finish()
}

async fn missing_client(req: HttpRequest, log: web::Data<Log>) -> HttpResponse {
    record(&log, &req);
    HttpResponse::NotFound().json(json!({"detail": "Client not found"}))
}

async fn validation_error(req: HttpRequest, log: web::Data<Log>) -> HttpResponse {
    record(&log, &req);
    HttpResponse::UnprocessableEntity()
        .json(json!({"detail": [{"loc": ["body", "name"], "msg": "field required"}]}))
}

async fn html_error(req: HttpRequest, log: web::Data<Log>) -> HttpResponse {
    record(&log, &req);
    HttpResponse::BadGateway()
        .content_type("text/html")
        .body("<html>upstream down</html>")
}

/// A running fake backend.
pub struct FakeBackend {
    pub base_url: Url,
    log: Log,
    handle: ServerHandle,
}

impl FakeBackend {
    /// Start the fake on an ephemeral port inside the current actix system
    /// (or a tokio `LocalSet`).
    pub fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
        let port = listener.local_addr().expect("local addr").port();
        let log: Log = Arc::default();
        let app_log = web::Data::new(log.clone());
        let server = HttpServer::new(move || {
            App::new().app_data(app_log.clone()).service(
                web::scope("/api")
                    .route("/auth/login", web::post().to(login))
                    .route("/auth/logout", web::post().to(logout))
                    .route("/users/me", web::get().to(me))
                    .route("/audit", web::get().to(audit))
                    .route("/tasks/{id}", web::delete().to(delete_task))
                    .route("/clients/99", web::get().to(missing_client))
                    .route("/clients/groups", web::post().to(validation_error))
                    .route("/reports", web::get().to(html_error)),
            )
        })
        .disable_signals()
        .workers(1)
        .listen(listener)
        .expect("listen on ephemeral port")
        .run();
        let handle = server.handle();
        actix_web::rt::spawn(server);
        let base_url =
            Url::parse(&format!("http://127.0.0.1:{port}/api")).expect("valid base url");
        Self {
            base_url,
            log,
            handle,
        }
    }

    /// Requests received so far.
    pub fn seen(&self) -> Vec<Seen> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Stop accepting connections.
    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

/// A base URL nothing is listening on.
pub fn unreachable_base_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{port}/api")).expect("valid base url")
}
