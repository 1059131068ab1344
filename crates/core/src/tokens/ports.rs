//! Port interfaces for guest verification tokens

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guestlink_domain::{
    AutoTokenOutcome, AutoTokenSpec, NewVerificationToken, PolicyDecision, Result,
    VerificationToken,
};

use super::crypto::Pepper;

/// Token storage
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Deactivate the property's active manual tokens and insert the new one
    /// as a single atomic unit. Returns how many tokens were deactivated.
    async fn replace_active_manual(&self, token: &NewVerificationToken) -> Result<usize>;

    async fn find_by_token(&self, token: &str) -> Result<Option<VerificationToken>>;

    /// Bump the usage counter and last-used timestamp
    async fn record_usage(&self, token_id: &str, used_at: DateTime<Utc>) -> Result<()>;

    /// Insert or refresh the token for (property, external code). A refresh
    /// keeps the original token string.
    async fn upsert_auto_token(&self, spec: &AutoTokenSpec) -> Result<AutoTokenOutcome>;

    /// Deactivate (never delete) every active manual token of the property
    async fn deactivate_manual(&self, property_id: &str) -> Result<usize>;

    async fn find_active_manual(&self, property_id: &str) -> Result<Option<VerificationToken>>;
}

/// Property-level reservation-control policy
#[async_trait]
pub trait ReservationPolicy: Send + Sync {
    async fn check_allowed(&self, property_id: &str) -> Result<PolicyDecision>;
}

/// Supplies the server-held secret used to hash access codes
pub trait PepperProvider: Send + Sync {
    /// `None` when no usable pepper is configured
    fn pepper(&self) -> Option<Pepper>;
}
