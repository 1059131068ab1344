//! Per-property sync state machine with throttling.
//!
//! idle -> syncing -> {success, error} -> syncing. Only a recent success
//! throttles; an error never blocks the next run.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use guestlink_domain::{GuestLinkError, Result, SyncState, SyncStatus};
use tracing::debug;

use super::ports::SyncStatusRepository;

pub struct SyncStatusTracker {
    repository: Arc<dyn SyncStatusRepository>,
    throttle: Duration,
}

impl SyncStatusTracker {
    pub fn new(repository: Arc<dyn SyncStatusRepository>, throttle_seconds: u64) -> Self {
        let throttle = Duration::seconds(i64::try_from(throttle_seconds).unwrap_or(i64::MAX));
        Self { repository, throttle }
    }

    pub async fn current(&self, property_id: &str) -> Result<SyncStatus> {
        Ok(self
            .repository
            .get_status(property_id)
            .await?
            .unwrap_or_else(|| SyncStatus::idle(property_id)))
    }

    /// Returns the current status when an unforced run should be skipped.
    pub async fn throttled(
        &self,
        property_id: &str,
        force: bool,
        now: DateTime<Utc>,
    ) -> Result<Option<SyncStatus>> {
        if force {
            return Ok(None);
        }

        let status = self.current(property_id).await?;
        let recent_success = status.state == SyncState::Success
            && status.last_sync_at.is_some_and(|at| now - at < self.throttle);

        if recent_success {
            debug!(property_id, last_sync_at = ?status.last_sync_at, "sync throttled");
            return Ok(Some(status));
        }

        Ok(None)
    }

    pub async fn mark_syncing(&self, property_id: &str) -> Result<()> {
        let mut status = self.current(property_id).await?;
        status.state = SyncState::Syncing;
        self.repository.save_status(&status).await
    }

    pub async fn mark_success(
        &self,
        property_id: &str,
        reservations_count: usize,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let status = SyncStatus {
            property_id: property_id.to_string(),
            state: SyncState::Success,
            last_sync_at: Some(now),
            last_error: None,
            reservations_count: i64::try_from(reservations_count).unwrap_or(i64::MAX),
        };
        self.repository.save_status(&status).await
    }

    /// Records the failure with a bounded, secret-free message. The previous
    /// reservation count is kept.
    pub async fn mark_error(
        &self,
        property_id: &str,
        error: &GuestLinkError,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let mut status = self.current(property_id).await?;
        status.state = SyncState::Error;
        status.last_sync_at = Some(now);
        status.last_error = Some(error.sync_message());
        self.repository.save_status(&status).await
    }
}
