//! Auto token generation after a sync pass.
//!
//! One token per (property, platform booking code), kept separate from the
//! manual issuer's one-active-per-property rule.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use guestlink_domain::{
    is_platform_booking_code, normalize_code, AutoTokenOutcome, AutoTokenSpec, GuestLinkError,
    ReservationUpsert, Result,
};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::crypto::{generate_token, hash_access_code};
use super::ports::{PepperProvider, TokenRepository};

pub struct AutoTokenGenerator {
    tokens: Arc<dyn TokenRepository>,
    pepper: Arc<dyn PepperProvider>,
    grace_days: i64,
}

impl AutoTokenGenerator {
    pub fn new(
        tokens: Arc<dyn TokenRepository>,
        pepper: Arc<dyn PepperProvider>,
        grace_days: i64,
    ) -> Self {
        Self { tokens, pepper, grace_days }
    }

    /// Create or refresh tokens for every platform-coded reservation.
    ///
    /// Returns how many tokens were newly created. Missing pepper aborts the
    /// whole run before anything is written; a failing upsert only skips that
    /// code.
    #[instrument(skip(self, reservations), fields(reservations = reservations.len()))]
    pub async fn generate(&self, property_id: &str, reservations: &[ReservationUpsert]) -> Result<usize> {
        let now = Utc::now();
        let candidates = self.candidates(reservations, now);
        if candidates.is_empty() {
            return Ok(0);
        }

        let pepper = self.pepper.pepper().ok_or_else(|| {
            GuestLinkError::Config("token pepper is not configured; auto tokens not generated".into())
        })?;

        let mut created = 0;
        for (code, expires_at) in candidates {
            let spec = AutoTokenSpec {
                id: Uuid::now_v7().to_string(),
                token: generate_token(now),
                property_id: property_id.to_string(),
                access_code_hash: hash_access_code(&pepper, &code)?,
                external_code: code,
                expires_at,
                created_at: now,
            };

            match self.tokens.upsert_auto_token(&spec).await {
                Ok(AutoTokenOutcome::Created) => created += 1,
                Ok(AutoTokenOutcome::Refreshed) => {}
                Err(err) => warn!(error_type = err.label(), error = %err, "auto token upsert failed"),
            }
        }

        debug!(created, "auto tokens generated");
        Ok(created)
    }

    /// Platform codes deduplicated by normalized value, each with its expiry.
    /// Reservations whose expiry already passed are left out.
    fn candidates(
        &self,
        reservations: &[ReservationUpsert],
        now: DateTime<Utc>,
    ) -> BTreeMap<String, DateTime<Utc>> {
        let mut candidates = BTreeMap::new();

        for reservation in reservations {
            let code = normalize_code(&reservation.external_code);
            if !is_platform_booking_code(&code) {
                continue;
            }

            let expires_at =
                (reservation.end_date + Duration::days(self.grace_days)).and_time(NaiveTime::MIN).and_utc();
            if expires_at <= now {
                continue;
            }

            candidates
                .entry(code)
                .and_modify(|existing: &mut DateTime<Utc>| *existing = (*existing).max(expires_at))
                .or_insert(expires_at);
        }

        candidates
    }
}
