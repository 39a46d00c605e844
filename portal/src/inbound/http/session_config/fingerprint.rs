//! Non-secret identifier for the active session key.
//!
//! Logged at startup so operators can confirm which key a deployment uses
//! after a rotation.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

const FINGERPRINT_LEN: usize = 8;

/// Lowercase hex of the first eight bytes of SHA-256 over the signing half
/// of `key`.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use portal::inbound::http::session_config::key_fingerprint;
///
/// let key = Key::derive_from(&[7_u8; 64]);
/// assert_eq!(key_fingerprint(&key), key_fingerprint(&key));
/// assert_eq!(key_fingerprint(&key).len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_LEN])
}
