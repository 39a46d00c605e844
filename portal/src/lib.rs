//! Bookkeeping portal library: domain flows, the actix HTTP adapter and the
//! reqwest backend client.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::{SessionGate, Trace};
