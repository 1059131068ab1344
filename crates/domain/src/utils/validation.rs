//! Input validation shared by the token services and the HTTP surface.

use crate::constants::{
    MAX_ACCESS_CODE_LENGTH, MAX_PROPERTY_ID_LENGTH, MAX_TOKEN_LENGTH, MIN_ACCESS_CODE_LENGTH,
    MIN_TOKEN_LENGTH,
};
use crate::errors::{GuestLinkError, Result};

/// Property ids are 1 to 64 characters of `[A-Za-z0-9_-]`.
pub fn validate_property_id(property_id: &str) -> Result<String> {
    let trimmed = property_id.trim();

    if trimmed.is_empty() {
        return Err(GuestLinkError::Validation("property id is required".into()));
    }
    if trimmed.len() > MAX_PROPERTY_ID_LENGTH {
        return Err(GuestLinkError::Validation(format!(
            "property id exceeds {MAX_PROPERTY_ID_LENGTH} characters"
        )));
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(GuestLinkError::Validation("property id has invalid characters".into()));
    }

    Ok(trimmed.to_string())
}

/// Cheap shape check run before any store lookup.
pub fn validate_token_format(token: &str) -> Result<()> {
    let len = token.len();
    let charset_ok =
        token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.');

    if !(MIN_TOKEN_LENGTH..=MAX_TOKEN_LENGTH).contains(&len) || !charset_ok {
        return Err(GuestLinkError::Validation("malformed token".into()));
    }

    Ok(())
}

/// Returns the normalized code (trimmed, uppercased) when it has a usable
/// shape. The caller maps a rejection to `InvalidCode`.
pub fn normalize_access_code(code: &str) -> Option<String> {
    let normalized = code.trim().to_ascii_uppercase();
    let len = normalized.len();

    let shape_ok = (MIN_ACCESS_CODE_LENGTH..=MAX_ACCESS_CODE_LENGTH).contains(&len)
        && normalized.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

    shape_ok.then_some(normalized)
}

/// Expiry in days must fall inside `1..=max`.
pub fn validate_expires_in_days(days: i64, max: i64) -> Result<i64> {
    if days < 1 || days > max {
        return Err(GuestLinkError::Validation(format!(
            "expiresInDays must be between 1 and {max}"
        )));
    }
    Ok(days)
}
