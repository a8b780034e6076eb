//! Session key fingerprinting.
//!
//! A truncated SHA-256 digest of the signing key is logged at startup so
//! operators can tell which key a running instance uses without exposing it.

use actix_web::cookie::Key;
use sha2::{Digest, Sha256};

const FINGERPRINT_BYTES: usize = 8;

/// First eight bytes of the SHA-256 digest of the key's signing half, as
/// lowercase hex.
///
/// # Examples
/// ```
/// use actix_web::cookie::Key;
/// use barter::inbound::http::session_config::fingerprint::key_fingerprint;
///
/// let fingerprint = key_fingerprint(&Key::generate());
/// assert_eq!(fingerprint.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(&digest[..FINGERPRINT_BYTES])
}
