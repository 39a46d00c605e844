//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AuthGateway, BackendApi};
use crate::domain::{LoginService, PortalService, RoutePolicy};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub policy: RoutePolicy,
    pub portal: PortalService,
    pub login: LoginService,
}

impl HttpState {
    /// Build handler state over the backend adapters.
    pub fn new(
        api: Arc<dyn BackendApi>,
        gateway: Arc<dyn AuthGateway>,
        policy: RoutePolicy,
    ) -> Self {
        Self {
            portal: PortalService::new(api),
            login: LoginService::new(gateway, policy.clone()),
            policy,
        }
    }
}
