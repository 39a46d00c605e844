//! Portal session cookie settings read from the environment.
//!
//! | Variable                  | Debug default      | Release              |
//! |---------------------------|--------------------|----------------------|
//! | `SESSION_KEY_FILE`        | ephemeral key      | file must exist, >= 64 bytes |
//! | `SESSION_COOKIE_SECURE`   | `true`             | required             |
//! | `SESSION_SAMESITE`        | `Lax`              | required             |
//! | `SESSION_ALLOW_EPHEMERAL` | `false`            | required, must be `0`|
//!
//! Debug builds warn and fall back; release builds refuse to start.

pub mod fingerprint;

use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use tracing::warn;
use zeroize::Zeroizing;

pub use fingerprint::key_fingerprint;

const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const DEFAULT_KEY_PATH: &str = "/var/run/secrets/portal_session_key";
const MIN_KEY_BYTES: usize = 64;
// `Key::derive_from` panics below this.
const DERIVE_MIN_BYTES: usize = 32;
const BOOL_CHOICES: &str = "1|0|true|false|yes|no|on|off";
const SAMESITE_CHOICES: &str = "Strict|Lax|None";

/// Whether configuration problems are tolerated.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Warn and fall back.
    Debug,
    /// Fail fast.
    Release,
}

impl BuildMode {
    /// Mode matching `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use portal::inbound::http::session_config::BuildMode;
    ///
    /// let expected = if cfg!(debug_assertions) { BuildMode::Debug } else { BuildMode::Release };
    /// assert_eq!(BuildMode::from_debug_assertions(), expected);
    /// ```
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Validated cookie settings for the session middleware.
pub struct SessionSettings {
    /// Key used to encrypt and sign the session cookie.
    pub key: Key,
    /// Mark the cookie `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy.
    pub same_site: SameSite,
}

impl SessionSettings {
    /// Short, non-secret identifier of the active key.
    pub fn fingerprint(&self) -> String {
        key_fingerprint(&self.key)
    }
}

/// Reasons session settings are rejected.
#[derive(Debug, thiserror::Error)]
pub enum SessionConfigError {
    /// Variable required in release builds is unset.
    #[error("{name} must be set")]
    MissingEnv {
        /// Variable name.
        name: &'static str,
    },
    /// Variable holds an unrecognised value.
    #[error("{name}='{value}' is not one of {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Rejected value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
    /// Key file could not be read.
    #[error("cannot read session key {path}: {source}")]
    KeyRead {
        /// Key file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
    /// Key file is shorter than the minimum.
    #[error("session key {path} has {length} bytes; at least {min_len} required")]
    KeyTooShort {
        /// Key file path.
        path: PathBuf,
        /// Bytes found.
        length: usize,
        /// Bytes required.
        min_len: usize,
    },
    /// `SameSite=None` without `Secure`.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Ephemeral keys requested in a release build.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

struct Lookup<'a, E> {
    env: &'a E,
    mode: BuildMode,
}

impl<E: Env> Lookup<'_, E> {
    /// Read and parse `name`, falling back in debug builds.
    fn parsed<T>(
        &self,
        name: &'static str,
        expected: &'static str,
        fallback: T,
        parse: impl FnOnce(&str) -> Option<T>,
    ) -> Result<T, SessionConfigError> {
        let Some(raw) = self.env.string(name) else {
            return match self.mode {
                BuildMode::Debug => {
                    warn!(variable = name, "not set; using development default");
                    Ok(fallback)
                }
                BuildMode::Release => Err(SessionConfigError::MissingEnv { name }),
            };
        };
        match (parse(raw.trim()), self.mode) {
            (Some(value), _) => Ok(value),
            (None, BuildMode::Debug) => {
                warn!(variable = name, value = %raw, "unrecognised value; using development default");
                Ok(fallback)
            }
            (None, BuildMode::Release) => Err(SessionConfigError::InvalidEnv {
                name,
                value: raw,
                expected,
            }),
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_same_site(raw: &str) -> Option<SameSite> {
    match raw.to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

/// Resolve session settings from `env`.
///
/// # Errors
///
/// Returns [`SessionConfigError`] when a release build is missing a
/// variable, a value is invalid, or the key file is unusable.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use portal::inbound::http::session_config::{BuildMode, session_settings_from_env};
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|name| match name {
///     "SESSION_KEY_FILE" => Some("/nonexistent/portal-key".to_owned()),
///     "SESSION_SAMESITE" => Some("strict".to_owned()),
///     _ => None,
/// });
///
/// let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug tolerates gaps");
/// assert!(settings.cookie_secure);
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let lookup = Lookup { env, mode };
    let cookie_secure = lookup.parsed(COOKIE_SECURE_ENV, BOOL_CHOICES, true, parse_flag)?;
    let same_site = lookup.parsed(SAMESITE_ENV, SAMESITE_CHOICES, SameSite::Lax, parse_same_site)?;
    if same_site == SameSite::None && !cookie_secure {
        match mode {
            BuildMode::Debug => warn!("SameSite=None without Secure; browsers may drop the cookie"),
            BuildMode::Release => return Err(SessionConfigError::InsecureSameSiteNone),
        }
    }
    let allow_ephemeral = lookup.parsed(ALLOW_EPHEMERAL_ENV, BOOL_CHOICES, false, parse_flag)?;
    if allow_ephemeral && mode == BuildMode::Release {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }

    let path = env
        .string(KEY_FILE_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_KEY_PATH), PathBuf::from);
    let key = load_key(&path, mode, allow_ephemeral)?;

    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

fn load_key(path: &Path, mode: BuildMode, allow_ephemeral: bool) -> Result<Key, SessionConfigError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => Zeroizing::new(bytes),
        Err(source) if mode == BuildMode::Debug || allow_ephemeral => {
            warn!(path = %path.display(), error = %source, "generating ephemeral session key");
            return Ok(Key::generate());
        }
        Err(source) => {
            return Err(SessionConfigError::KeyRead {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    if bytes.len() < MIN_KEY_BYTES {
        if mode == BuildMode::Release {
            return Err(SessionConfigError::KeyTooShort {
                path: path.to_path_buf(),
                length: bytes.len(),
                min_len: MIN_KEY_BYTES,
            });
        }
        if bytes.len() < DERIVE_MIN_BYTES {
            warn!(path = %path.display(), "session key too short to derive from; generating ephemeral key");
            return Ok(Key::generate());
        }
    }
    Ok(Key::derive_from(&bytes))
}

#[cfg(test)]
mod tests;
