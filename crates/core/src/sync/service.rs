//! Sync orchestration - fetch, parse, reconcile, then derive tokens

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use guestlink_domain::{
    parse_feed_with_report, validate_property_id, GuestLinkError, Property, Result, SyncOptions,
    SyncOutcome, SyncStatus,
};
use tracing::{debug, error, info, instrument, warn};

use super::fetcher::FallbackFetcher;
use super::ports::{PropertyRepository, ReservationRepository, ValidatedBookingRepository};
use super::reconciliation::plan_reconciliation;
use super::status::SyncStatusTracker;
use crate::tokens::auto::AutoTokenGenerator;

/// Calendar sync service
pub struct SyncService {
    properties: Arc<dyn PropertyRepository>,
    reservations: Arc<dyn ReservationRepository>,
    bookings: Arc<dyn ValidatedBookingRepository>,
    fetcher: FallbackFetcher,
    tracker: SyncStatusTracker,
    auto_tokens: Option<AutoTokenGenerator>,
}

impl SyncService {
    pub fn new(
        properties: Arc<dyn PropertyRepository>,
        reservations: Arc<dyn ReservationRepository>,
        bookings: Arc<dyn ValidatedBookingRepository>,
        fetcher: FallbackFetcher,
        tracker: SyncStatusTracker,
    ) -> Self {
        Self { properties, reservations, bookings, fetcher, tracker, auto_tokens: None }
    }

    /// Derive platform tokens at the end of every successful pass.
    pub fn with_auto_tokens(mut self, generator: AutoTokenGenerator) -> Self {
        self.auto_tokens = Some(generator);
        self
    }

    /// Run one sync pass for a property.
    ///
    /// Unforced runs inside the throttle window return a skipped outcome
    /// without touching the feed. A fetch or store failure marks the status
    /// as `error` and is returned to the caller.
    #[instrument(skip(self))]
    pub async fn sync(&self, property_id: &str, options: SyncOptions) -> Result<SyncOutcome> {
        let property_id = validate_property_id(property_id)?;
        let property = self
            .properties
            .find_property(&property_id)
            .await?
            .ok_or_else(|| GuestLinkError::PropertyNotFound(property_id.clone()))?;

        let feed_url = property
            .ical_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                GuestLinkError::Validation("property has no calendar feed configured".into())
            })?
            .to_string();

        if let Some(status) = self.tracker.throttled(&property_id, options.force, Utc::now()).await? {
            let count = usize::try_from(status.reservations_count).unwrap_or_default();
            info!(reservations = count, "sync skipped, last success is inside the throttle window");
            return Ok(SyncOutcome::skipped(count));
        }

        self.tracker.mark_syncing(&property_id).await?;
        let started = Instant::now();

        match self.run_pass(&property, &feed_url, options).await {
            Ok(outcome) => {
                self.tracker.mark_success(&property_id, outcome.reservations_count, Utc::now()).await?;
                info!(
                    reservations = outcome.reservations_count,
                    deleted = outcome.deleted_count,
                    tokens_created = outcome.tokens_created,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "sync completed"
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(error_type = err.label(), error = %err, "sync failed");
                if let Err(status_err) = self.tracker.mark_error(&property_id, &err, Utc::now()).await
                {
                    warn!(error = %status_err, "failed to record sync error status");
                }
                Err(err)
            }
        }
    }

    /// Persisted status of a property; `idle` when it never synced.
    pub async fn status(&self, property_id: &str) -> Result<SyncStatus> {
        let property_id = validate_property_id(property_id)?;
        self.tracker.current(&property_id).await
    }

    async fn run_pass(
        &self,
        property: &Property,
        feed_url: &str,
        options: SyncOptions,
    ) -> Result<SyncOutcome> {
        let body = self.fetcher.fetch(feed_url, options.force_proxy).await?;

        let report = parse_feed_with_report(&body);
        for skipped in &report.skipped {
            debug!(index = skipped.index, reason = %skipped.reason, "skipped malformed event");
        }

        let stored = self.reservations.list_for_property(&property.id).await?;
        let validated = self.bookings.list_for_property(&property.id).await?;
        let plan =
            plan_reconciliation(&property.id, &report.reservations, &stored, &validated, Utc::now());

        debug!(
            parsed = report.reservations.len(),
            malformed = report.skipped.len(),
            without_code = plan.without_code,
            upserts = plan.upserts.len(),
            deletions = plan.delete_codes.len(),
            "reconciliation planned"
        );

        let deleted_count = self
            .reservations
            .apply_reconciliation(&property.id, &plan.upserts, &plan.delete_codes)
            .await?;

        let tokens_created = match &self.auto_tokens {
            Some(generator) => match generator.generate(&property.id, &plan.upserts).await {
                Ok(created) => created,
                Err(err) => {
                    warn!(error_type = err.label(), error = %err, "auto token generation failed");
                    0
                }
            },
            None => 0,
        };

        Ok(SyncOutcome {
            reservations_count: plan.upserts.len(),
            tokens_created,
            deleted_count,
            skipped: false,
        })
    }
}
