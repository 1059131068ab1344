//! Token string generation and access-code hashing.
//!
//! Access codes are hashed with HMAC-SHA256 keyed by the pepper over the
//! normalized code and stored hex encoded. Verification goes through the MAC's
//! constant-time comparison.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use guestlink_domain::constants::{TOKEN_RANDOM_BYTES, TOKEN_SUFFIX_SEPARATOR};
use guestlink_domain::{normalize_code, GuestLinkError, Result};
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Server-held hashing secret. Never printed.
#[derive(Clone)]
pub struct Pepper(String);

impl Pepper {
    /// Blank values count as missing.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl std::fmt::Debug for Pepper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Pepper(<redacted>)")
    }
}

/// Random URL-safe token with a base36 millisecond suffix.
pub fn generate_token(now: DateTime<Utc>) -> String {
    let mut bytes = [0u8; TOKEN_RANDOM_BYTES];
    OsRng.fill_bytes(&mut bytes);

    let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
    format!("{}{}{}", URL_SAFE_NO_PAD.encode(bytes), TOKEN_SUFFIX_SEPARATOR, to_base36(millis))
}

/// Hex HMAC of the normalized (trimmed, uppercased) code.
pub fn hash_access_code(pepper: &Pepper, code: &str) -> Result<String> {
    let mut mac = keyed_mac(pepper)?;
    mac.update(normalize_code(code).as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Constant-time comparison of a candidate code against a stored hash.
pub fn verify_access_code(pepper: &Pepper, candidate: &str, stored_hash: &str) -> Result<bool> {
    let Ok(expected) = hex::decode(stored_hash) else {
        return Ok(false);
    };

    let mut mac = keyed_mac(pepper)?;
    mac.update(normalize_code(candidate).as_bytes());
    Ok(mac.verify_slice(&expected).is_ok())
}

fn keyed_mac(pepper: &Pepper) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(pepper.as_bytes())
        .map_err(|_| GuestLinkError::Config("token pepper cannot key the access-code hash".into()))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    if value == 0 {
        return "0".to_string();
    }

    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
