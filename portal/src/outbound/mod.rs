//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **backend**: reqwest client for the bookkeeping backend's REST API,
//!   implementing both `BackendApi` and `AuthGateway`.
//!
//! Adapters are thin translators that convert between domain types and
//! transport representations. They contain no business logic.

pub mod backend;
