//! Portal entry-point: loads settings, wires the session cookie and starts
//! the HTTP server.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use portal::inbound::http::health::HealthState;
use portal::inbound::http::session_config::{BuildMode, session_settings_from_env};
use server::{PortalSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = PortalSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load portal settings: {e}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(|e| std::io::Error::other(format!("invalid session settings: {e}")))?;
    info!(
        fingerprint = %session.fingerprint(),
        cookie_secure = session.cookie_secure,
        same_site = ?session.same_site,
        "session key loaded"
    );

    let config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        settings.bind_addr()?,
        settings.backend_url()?,
    );

    #[cfg(feature = "metrics")]
    let config = config.with_metrics(if settings.metrics {
        Some(server::make_metrics()?)
    } else {
        None
    });
    #[cfg(not(feature = "metrics"))]
    if settings.metrics {
        warn!("PORTAL_METRICS set but the binary was built without the metrics feature");
    }

    let health_state = web::Data::new(HealthState::new());
    create_server(health_state, config)?.await
}
