//! Wire shapes for backend bodies the adapter inspects itself.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::CachedUser;

/// Error body. Only a string `detail` counts; FastAPI validation errors
/// send a list there, which falls back to the status line.
#[derive(Debug, Deserialize)]
pub(super) struct ErrorBodyDto {
    #[serde(default)]
    detail: Option<Value>,
}

impl ErrorBodyDto {
    pub(super) fn into_detail(self) -> Option<String> {
        match self.detail {
            Some(Value::String(detail)) => Some(detail),
            _ => None,
        }
    }
}

/// `POST /auth/login` success body. `access_token` is ignored; the
/// credential is the `token` cookie.
#[derive(Debug, Default, Deserialize)]
pub(super) struct LoginResponseDto {
    #[serde(default)]
    pub(super) user: Option<CachedUser>,
}
