//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for messages persisted on a failed sync status.
pub const MAX_SYNC_ERROR_MESSAGE_LEN: usize = 300;

/// Main error type for GuestLink
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum GuestLinkError {
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Token lookup failed, or the token belongs to another property.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown property: {0}")]
    PropertyNotFound(String),

    #[error("Expired: {0}")]
    Expired(String),

    #[error("An access code is required for this link")]
    CodeRequired,

    #[error("The access code does not match")]
    InvalidCode,

    #[error("Authorization error: {0}")]
    Auth(String),

    /// Connection-level failure (DNS, refused, TLS, timeout). Eligible for the
    /// proxy fallback.
    #[error("Network error: {0}")]
    Network(String),

    #[error("Upstream fetch error: {0}")]
    UpstreamFetch(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GuestLinkError {
    /// Stable wire code for API consumers.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "TOKEN_NOT_FOUND",
            Self::PropertyNotFound(_) => "PROPERTY_NOT_FOUND",
            Self::Expired(_) => "EXPIRED",
            Self::CodeRequired => "CODE_REQUIRED",
            Self::InvalidCode => "INVALID_CODE",
            Self::Auth(_) => "AUTH_ERROR",
            Self::Network(_) | Self::UpstreamFetch(_) => "UPSTREAM_FETCH_ERROR",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::Config(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Short label suitable for logging and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) | Self::PropertyNotFound(_) => "not_found",
            Self::Expired(_) => "expired",
            Self::CodeRequired | Self::InvalidCode | Self::Auth(_) => "auth",
            Self::Network(_) | Self::UpstreamFetch(_) => "upstream_fetch",
            Self::Persistence(_) => "persistence",
            Self::Config(_) => "config",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the error is a connection-level fetch failure.
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Message persisted on a failed sync status.
    ///
    /// Persistence and internal details are replaced by the label so driver
    /// messages never reach the status table; everything is truncated to
    /// [`MAX_SYNC_ERROR_MESSAGE_LEN`] characters.
    pub fn sync_message(&self) -> String {
        let message = match self {
            Self::Persistence(_) => "persistence error while storing reservations".to_string(),
            Self::Internal(_) => "internal error during sync".to_string(),
            Self::Config(_) => "configuration error during sync".to_string(),
            other => other.to_string(),
        };

        truncate_chars(&message, MAX_SYNC_ERROR_MESSAGE_LEN)
    }
}

fn truncate_chars(input: &str, max: usize) -> String {
    match input.char_indices().nth(max) {
        Some((idx, _)) => input[..idx].to_string(),
        None => input.to_string(),
    }
}

/// Result type alias for GuestLink operations
pub type Result<T> = std::result::Result<T, GuestLinkError>;
