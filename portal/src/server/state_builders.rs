//! Builders for the HTTP handler state.

use std::sync::Arc;

use actix_web::web;

use portal::domain::RoutePolicy;
use portal::inbound::http::state::HttpState;
use portal::outbound::backend::ApiClient;

use super::ServerConfig;

/// Build handler state over one reqwest client serving both backend ports.
///
/// # Errors
/// Returns [`std::io::Error`] when the reqwest client cannot be built.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let client = ApiClient::new(&config.backend_url)
        .map_err(|e| std::io::Error::other(format!("backend client construction failed: {e}")))?;
    let client = Arc::new(client);
    Ok(web::Data::new(HttpState::new(
        client.clone(),
        client,
        RoutePolicy::default(),
    )))
}
