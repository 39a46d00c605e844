//! Port for the bookkeeping backend's JSON API.
//!
//! One method covers every call. Adapters attach the session credential and
//! default headers, and normalise any non-2xx response into
//! [`ApiError::Status`].

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::SessionToken;

/// Message used when a failing response body is not JSON.
pub const UNKNOWN_ERROR_DETAIL: &str = "Unknown error";

/// HTTP methods the portal issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl ApiMethod {
    /// Upper-case method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Parse an upper- or lower-case method name.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_ascii_uppercase().as_str() {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Options for one backend call.
///
/// Header names are matched case-insensitively; a caller-supplied
/// `Content-Type` replaces the JSON default.
///
/// # Examples
/// ```
/// use portal::domain::ports::{ApiMethod, ApiRequest};
/// use serde_json::json;
///
/// let request = ApiRequest::post(json!({"name": "Acme"}));
/// assert_eq!(request.method, ApiMethod::Post);
/// assert!(request.credential.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: ApiMethod,
    /// JSON body, if any.
    pub body: Option<Value>,
    /// Extra or overriding headers.
    pub headers: Vec<(String, String)>,
    /// Backend token forwarded as the `token` cookie.
    pub credential: Option<SessionToken>,
}

impl ApiRequest {
    /// Plain `GET`.
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// `POST` with a JSON body.
    #[must_use]
    pub fn post(body: Value) -> Self {
        Self {
            method: ApiMethod::Post,
            body: Some(body),
            ..Self::default()
        }
    }

    /// Attach the session credential, if there is one.
    #[must_use]
    pub fn with_credential(mut self, credential: Option<SessionToken>) -> Self {
        self.credential = credential;
        self
    }

    /// Add or override a header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Failures from a backend call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// The backend answered outside the 2xx range.
    #[error("{message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// `detail` from the error body, when it carried one.
        detail: Option<String>,
        /// `detail`, or `"{status} {reason}"` when there was none.
        message: String,
    },
    /// The backend could not be reached or the body could not be read.
    #[error("backend request failed: {message}")]
    Transport {
        /// Underlying cause.
        message: String,
    },
    /// A success response did not have the expected shape.
    #[error("unexpected backend response: {message}")]
    Decode {
        /// Underlying cause.
        message: String,
    },
}

impl ApiError {
    /// Build a status error, deriving the message from `detail` or the
    /// status line.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::ports::ApiError;
    ///
    /// let err = ApiError::status(404, None, "Not Found");
    /// assert_eq!(err.to_string(), "404 Not Found");
    /// let err = ApiError::status(400, Some("Client exists".into()), "Bad Request");
    /// assert_eq!(err.to_string(), "Client exists");
    /// ```
    pub fn status(status: u16, detail: Option<String>, reason: &str) -> Self {
        let message = detail
            .clone()
            .unwrap_or_else(|| format!("{status} {reason}").trim_end().to_owned());
        Self::Status {
            status,
            detail,
            message,
        }
    }

    /// Transport failure.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Unexpected success payload.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// HTTP status for [`ApiError::Status`].
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }

    /// Whether the backend rejected the session credential.
    pub fn is_unauthorized(&self) -> bool {
        self.status_code() == Some(401)
    }

    /// The error body's `detail`, for status errors that carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            Self::Transport { .. } | Self::Decode { .. } => None,
        }
    }
}

/// Driven port wrapping every backend REST call.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Issue a request to `path` (relative to the backend base URL, leading
    /// `/` included). Returns the parsed body, or `None` for `204`.
    async fn request(&self, path: &str, request: ApiRequest) -> Result<Option<Value>, ApiError>;
}
