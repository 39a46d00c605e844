//! OpenAPI schemas for domain types served as JSON.
//!
//! Domain types stay free of `ToSchema`; these mirrors are registered under
//! the domain names with `#[schema(as = ...)]`.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// No portal session, or the backend rejected it.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The backend refused the action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The backend could not be reached.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// Unexpected portal failure.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Error)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "unauthorized")]
    code: ErrorCodeSchema,
    /// Human-readable message.
    #[schema(example = "Not authenticated")]
    message: String,
    /// Correlation id echoed in the `trace-id` header.
    #[schema(rename = "traceId", example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary details.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::CachedUser`].
#[derive(ToSchema)]
#[schema(as = crate::domain::CachedUser)]
#[expect(dead_code, reason = "Used only for OpenAPI schema generation via utoipa")]
pub struct CachedUserSchema {
    /// Backend user id, integer or string.
    #[schema(value_type = Option<String>, example = "17")]
    id: Option<String>,
    /// Login email.
    #[schema(example = "ada@example.com")]
    email: Option<String>,
    /// Display name.
    #[schema(example = "Ada Lovelace")]
    full_name: Option<String>,
    /// Role, as `{"name": ...}` or a bare string.
    #[schema(value_type = Option<Object>)]
    role: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::PartialSchema;

    fn schema_json<T: PartialSchema>() -> String {
        serde_json::to_string(&T::schema()).expect("schema serialises to JSON")
    }

    #[rstest]
    fn error_code_schema_lists_service_unavailable() {
        assert_eq!(ErrorCodeSchema::name(), "crate.domain.ErrorCode");
        assert!(schema_json::<ErrorCodeSchema>().contains("service_unavailable"));
    }

    #[rstest]
    fn error_schema_uses_wire_field_names() {
        assert_eq!(ErrorSchema::name(), "crate.domain.Error");
        let json = schema_json::<ErrorSchema>();
        assert!(json.contains("traceId"), "schema should use camelCase traceId");
        assert!(!json.contains("trace_id"));
    }

    #[rstest]
    fn cached_user_schema_is_registered_under_the_domain_name() {
        assert_eq!(CachedUserSchema::name(), "crate.domain.CachedUser");
        assert!(schema_json::<CachedUserSchema>().contains("full_name"));
    }
}
