//! OpenAPI document for the portal's JSON surface.
//!
//! Pages are HTML and stay out of the document; it covers the health probes
//! and `GET /session`. Domain types are described through the mirrors in
//! [`crate::inbound::http::schemas`] so the domain stays free of utoipa.
//!
//! Served by Swagger UI in debug builds and exported with
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::schemas::{CachedUserSchema, ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Adds the portal session cookie as a security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Encrypted portal session cookie issued by POST /login.",
            ))),
        );
    }
}

/// OpenAPI document for the portal.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bookkeeping portal",
        description = "JSON endpoints of the bookkeeping portal: session introspection and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::session_info::session_info,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(CachedUserSchema, ErrorSchema, ErrorCodeSchema)),
    tags(
        (name = "session", description = "The visitor's portal session"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
