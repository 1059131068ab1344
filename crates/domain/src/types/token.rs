//! Guest verification token types
//!
//! Token strings are opaque to callers. The stored access code is always a
//! one-way hash; nothing in this module ever carries the plain code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Issuance path that produced a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenSource {
    /// Issued on demand; at most one active per property.
    Manual,
    /// Derived at the end of a sync pass; one per (property, code).
    Auto,
}

impl_domain_status_conversions!(TokenSource {
    Manual => "manual",
    Auto => "auto",
});

/// Persisted verification token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationToken {
    pub id: String,
    #[serde(skip_serializing)]
    pub token: String,
    pub property_id: String,
    pub booking_id: Option<String>,
    pub external_code: Option<String>,
    #[serde(skip_serializing)]
    pub access_code_hash: Option<String>,
    pub source: TokenSource,
    pub is_active: bool,
    pub expires_at: DateTime<Utc>,
    pub used_count: i64,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl VerificationToken {
    /// A token with a stored access code hash must be presented with the code.
    pub fn requires_code(&self) -> bool {
        self.access_code_hash.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

impl std::fmt::Debug for VerificationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerificationToken")
            .field("id", &self.id)
            .field("property_id", &self.property_id)
            .field("booking_id", &self.booking_id)
            .field("external_code", &self.external_code)
            .field("requires_code", &self.requires_code())
            .field("source", &self.source)
            .field("is_active", &self.is_active)
            .field("expires_at", &self.expires_at)
            .field("used_count", &self.used_count)
            .finish_non_exhaustive()
    }
}

/// Token row prepared by the issuer before insertion.
#[derive(Clone, PartialEq, Eq)]
pub struct NewVerificationToken {
    pub id: String,
    pub token: String,
    pub property_id: String,
    pub booking_id: Option<String>,
    pub external_code: Option<String>,
    pub access_code_hash: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Candidate row for the auto generator, upserted on (property, code).
#[derive(Clone, PartialEq, Eq)]
pub struct AutoTokenSpec {
    pub id: String,
    /// Used only when no row exists yet; a refresh keeps the original string.
    pub token: String,
    pub property_id: String,
    pub external_code: String,
    pub access_code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// What an auto-token upsert did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoTokenOutcome {
    Created,
    Refreshed,
}

/// Input of the manual issuer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueTokenRequest {
    pub property_id: String,
    #[serde(default)]
    pub booking_id: Option<String>,
    #[serde(default)]
    pub external_code: Option<String>,
    #[serde(default)]
    pub expires_in_days: Option<i64>,
}

/// Output of the manual issuer. Never carries the hash.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub requires_code: bool,
}

impl std::fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("requires_code", &self.requires_code)
            .finish()
    }
}

/// Input of the resolver.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveTokenRequest {
    pub token: String,
    #[serde(default)]
    pub property_id: Option<String>,
    #[serde(default)]
    pub external_code: Option<String>,
}

impl std::fmt::Debug for ResolveTokenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolveTokenRequest")
            .field("token", &"<redacted>")
            .field("property_id", &self.property_id)
            .field("external_code", &self.external_code.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Output of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedToken {
    pub property_id: String,
    pub booking_id: Option<String>,
    pub requires_code: bool,
}

/// Public view of an active token, for administration screens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    pub property_id: String,
    pub booking_id: Option<String>,
    pub external_code: Option<String>,
    pub requires_code: bool,
    pub expires_at: DateTime<Utc>,
    pub used_count: i64,
    pub last_used_at: Option<DateTime<Utc>>,
}

impl From<&VerificationToken> for TokenSummary {
    fn from(token: &VerificationToken) -> Self {
        Self {
            property_id: token.property_id.clone(),
            booking_id: token.booking_id.clone(),
            external_code: token.external_code.clone(),
            requires_code: token.requires_code(),
            expires_at: token.expires_at,
            used_count: token.used_count,
            last_used_at: token.last_used_at,
        }
    }
}
