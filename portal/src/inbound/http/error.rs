//! HTTP mapping for portal errors.
//!
//! JSON endpoints (`/session`, the `/api` pass-through) answer with the
//! domain [`Error`] payload. Backend failures are folded into it here so the
//! domain layer never sees an HTTP status type.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::ports::ApiError;
use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    let redacted = Error::internal(REDACTED_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id),
        None => redacted,
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED_MESSAGE)
    }
}

impl From<ApiError> for Error {
    fn from(err: ApiError) -> Self {
        match &err {
            ApiError::Status { status, message, .. } => match *status {
                401 => Error::unauthorized(message.as_str()),
                403 => Error::forbidden(message.as_str()),
                404 => Error::not_found(message.as_str()),
                400..=499 => Error::invalid_request(message.as_str()),
                _ => Error::service_unavailable(message.as_str()),
            },
            ApiError::Transport { .. } => {
                error!(error = %err, "backend unreachable");
                Error::service_unavailable("Backend unavailable")
            }
            ApiError::Decode { .. } => {
                error!(error = %err, "backend payload rejected");
                Error::internal(err.to_string())
            }
        }
    }
}
