//! What the portal remembers about an authenticated visitor.
//!
//! A session exists when the backend's `token` cookie value has been captured
//! at login. The cached user record only feeds the top bar and `/session`;
//! pages always re-fetch anything they display.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::RecordId;

/// Rejected session token values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionTokenError {
    /// Blank token.
    #[error("session token must not be empty")]
    Empty,
    /// The token cannot be carried in a `Cookie` header.
    #[error("session token contains characters not allowed in a cookie")]
    InvalidCharacters,
}

/// Opaque backend credential held server-side in the portal session.
///
/// ## Invariants
/// - Non-empty and free of whitespace, `;`, `,` and control characters, so
///   it can be replayed verbatim as `Cookie: token=<value>`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(Zeroizing<String>);

impl SessionToken {
    /// Validate a raw token value.
    ///
    /// # Errors
    /// Returns [`SessionTokenError`] for blank or cookie-unsafe values.
    pub fn new(raw: impl Into<String>) -> Result<Self, SessionTokenError> {
        let raw = Zeroizing::new(raw.into());
        if raw.is_empty() {
            return Err(SessionTokenError::Empty);
        }
        if raw
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == ';' || c == ',' || c == '"')
        {
            return Err(SessionTokenError::InvalidCharacters);
        }
        Ok(Self(raw))
    }

    /// The raw token value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Role reference as the backend nests it under a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserRole {
    /// `{"name": "..."}` form.
    Named {
        /// Role name.
        name: String,
    },
    /// Bare string form.
    Plain(String),
}

impl UserRole {
    /// Role name regardless of shape.
    pub fn name(&self) -> &str {
        match self {
            Self::Named { name } | Self::Plain(name) => name,
        }
    }
}

/// User record cached in the session at login or refreshed from `/users/me`.
///
/// Every field is optional; unknown backend fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedUser {
    /// Backend user id.
    #[serde(default)]
    pub id: Option<RecordId>,
    /// Login email.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub full_name: Option<String>,
    /// Assigned role.
    #[serde(default)]
    pub role: Option<UserRole>,
}

impl CachedUser {
    /// `full_name`, then `email`, when either is non-blank.
    pub fn display_name(&self) -> Option<&str> {
        non_blank(self.full_name.as_deref()).or_else(|| non_blank(self.email.as_deref()))
    }

    /// Upper-cased first letter of the display name, or `U`.
    ///
    /// # Examples
    /// ```
    /// use portal::domain::CachedUser;
    ///
    /// let user = CachedUser { email: Some("ada@example.com".into()), ..CachedUser::default() };
    /// assert_eq!(user.initial(), "A");
    /// assert_eq!(CachedUser::default().initial(), "U");
    /// ```
    pub fn initial(&self) -> String {
        self.display_name()
            .and_then(|name| name.chars().next())
            .map_or_else(|| "U".to_owned(), |c| c.to_uppercase().collect())
    }

    /// Role name, or `Member` when the backend sent none.
    pub fn role_label(&self) -> &str {
        self.role.as_ref().map_or("Member", UserRole::name)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
