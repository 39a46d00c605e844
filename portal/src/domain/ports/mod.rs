//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_gateway;
mod backend_api;
mod session_store;

#[cfg(test)]
pub use auth_gateway::MockAuthGateway;
pub use auth_gateway::{AuthGateway, LoginGrant};
#[cfg(test)]
pub use backend_api::MockBackendApi;
pub use backend_api::{ApiError, ApiMethod, ApiRequest, BackendApi, UNKNOWN_ERROR_DETAIL};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{InMemorySessionStore, SessionStore, SessionStoreError};
