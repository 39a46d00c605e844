//! JSON pass-through to the backend under `/api`.
//!
//! ```text
//! GET  /api/clients?search=acme  ->  GET  {backend}/clients?search=acme
//! POST /api/tasks {"title": ..}  ->  POST {backend}/tasks
//! ```
//!
//! The visitor's backend token rides along from the portal session. Backend
//! status errors keep their status and answer `{"detail": message}`.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, route, web};
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::Error;
use crate::domain::ports::{ApiError, ApiMethod, ApiRequest};

use super::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

fn backend_path(tail: &str, query: &str) -> String {
    let tail = tail.trim_start_matches('/');
    if query.is_empty() {
        format!("/{tail}")
    } else {
        format!("/{tail}?{query}")
    }
}

fn json_body(bytes: &[u8]) -> ApiResult<Option<Value>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|err| Error::invalid_request(format!("request body is not JSON: {err}")))
}

fn backend_failure(err: ApiError) -> ApiResult<HttpResponse> {
    match &err {
        ApiError::Status {
            status, message, ..
        } => {
            let status = StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY);
            Ok(HttpResponse::build(status).json(json!({ "detail": message })))
        }
        ApiError::Transport { .. } | ApiError::Decode { .. } => Err(err.into()),
    }
}

#[route(
    "/api/{tail:.*}",
    method = "GET",
    method = "POST",
    method = "PUT",
    method = "PATCH",
    method = "DELETE"
)]
pub async fn proxy(
    req: HttpRequest,
    state: web::Data<HttpState>,
    session: SessionContext,
    tail: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let method = ApiMethod::parse(req.method().as_str())
        .ok_or_else(|| Error::invalid_request("unsupported method"))?;
    let path = backend_path(&tail, req.query_string());
    let request = ApiRequest {
        method,
        body: json_body(&body)?,
        ..ApiRequest::default()
    };
    debug!(method = method.as_str(), path, "forwarding to backend");
    match state.portal.forward(&session, &path, request).await {
        Ok(Some(value)) => Ok(HttpResponse::Ok().json(value)),
        Ok(None) => Ok(HttpResponse::NoContent().finish()),
        Err(err) => backend_failure(err),
    }
}
