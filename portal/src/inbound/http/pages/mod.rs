//! Server-rendered portal pages.
//!
//! Handlers fetch through [`crate::domain::PortalService`], fold the results
//! into view state and render with maud. Backend failures become visible
//! messages on the page; a 401 signs the visitor out instead.

pub mod audit;
pub mod client_detail;
pub mod clients;
pub mod dashboard;
pub mod layout;
pub mod login;
pub mod tasks;

use actix_web::http::header::{self, ContentType};
use actix_web::{HttpRequest, HttpResponse};
use maud::Markup;
use tracing::warn;

use crate::domain::ports::{ApiError, SessionStore};

use super::session::SessionContext;
use super::state::HttpState;

pub(crate) fn html(markup: Markup) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(markup.into_string())
}

pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub(crate) fn rejects_session<T>(result: &Result<T, ApiError>) -> bool {
    matches!(result, Err(err) if err.is_unauthorized())
}

/// Path and query of `req`, for use as a post-login return target.
pub(crate) fn request_target(req: &HttpRequest) -> &str {
    req.uri()
        .path_and_query()
        .map_or_else(|| req.path(), |pq| pq.as_str())
}

/// Drop a session the backend no longer accepts and send the visitor back
/// through login, returning to `target` afterwards.
pub(crate) fn session_expired(
    state: &HttpState,
    session: &SessionContext,
    target: &str,
) -> HttpResponse {
    warn!(target, "backend rejected session token; signing out");
    session.clear();
    see_other(&state.policy.login_location(target))
}
