//! Inbound adapters that translate browser requests into domain calls while
//! keeping actix details at the edge.
//!
//! HTTP handlers and pages live under [`http`].

pub mod http;
