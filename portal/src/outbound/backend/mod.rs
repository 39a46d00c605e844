//! Bookkeeping backend outbound adapter.
//!
//! One reqwest client serves both the JSON API port and the login/logout
//! gateway.

mod dto;
mod http_client;

pub use http_client::ApiClient;
