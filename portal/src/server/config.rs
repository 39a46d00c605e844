//! Process settings and the HTTP server configuration built from them.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_BACKEND_URL: &str = "http://localhost:8000/api";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Portal settings layered from CLI arguments, `PORTAL_*` variables and
/// configuration files.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "PORTAL")]
pub struct PortalSettings {
    /// Base URL of the bookkeeping backend API.
    pub backend_url: Option<String>,
    /// Socket address the portal listens on.
    pub bind_addr: Option<String>,
    /// Serve Prometheus metrics on `/metrics` (needs the `metrics` feature).
    #[ortho_config(default = false)]
    pub metrics: bool,
}

impl PortalSettings {
    /// The backend base URL, falling back to the local development backend.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the configured value is not a URL.
    pub fn backend_url(&self) -> std::io::Result<Url> {
        let raw = self.backend_url.as_deref().unwrap_or(DEFAULT_BACKEND_URL);
        Url::parse(raw).map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid PORTAL_BACKEND_URL {raw:?}: {err}"),
            )
        })
    }

    /// The listen address, falling back to all interfaces on 8080.
    ///
    /// # Errors
    /// Returns [`std::io::Error`] when the configured value is not a socket
    /// address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid PORTAL_BIND_ADDR {raw:?}: {err}"),
            )
        })
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) backend_url: Url,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration from session settings and addresses.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        same_site: SameSite,
        bind_addr: SocketAddr,
        backend_url: Url,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            backend_url,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
