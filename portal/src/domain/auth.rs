//! Login credentials collected by the portal's login form.
//!
//! Only presence is validated here. The backend decides whether the identifier
//! and password are correct.

use std::fmt;

use zeroize::Zeroizing;

/// Reasons a login form submission is rejected before reaching the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Identifier was missing or blank once trimmed.
    #[error("email is required")]
    MissingIdentifier,
    /// Password was empty.
    #[error("password is required")]
    MissingPassword,
}

/// Identifier/password pair sent to the backend's login endpoint.
///
/// ## Invariants
/// - `identifier` is trimmed and non-empty.
/// - `password` is non-empty; surrounding whitespace is kept as typed.
///
/// # Examples
/// ```
/// use portal::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.com ", "s3cret")
///     .expect("both fields present");
/// assert_eq!(creds.identifier(), "ada@example.com");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    identifier: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Validate raw form fields.
    ///
    /// # Errors
    /// Returns [`LoginValidationError`] when either field is missing.
    pub fn try_from_parts(identifier: &str, password: &str) -> Result<Self, LoginValidationError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(LoginValidationError::MissingIdentifier);
        }
        if password.is_empty() {
            return Err(LoginValidationError::MissingPassword);
        }
        Ok(Self {
            identifier: identifier.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email or username, as the backend expects in the `username` field.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Password exactly as entered.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}
