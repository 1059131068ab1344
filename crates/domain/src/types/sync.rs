//! Calendar sync status types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Per-property sync state machine: idle → syncing → {success, error} → syncing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Idle,
    Syncing,
    Success,
    Error,
}

impl_domain_status_conversions!(SyncState {
    Idle => "idle",
    Syncing => "syncing",
    Success => "success",
    Error => "error",
});

/// Persisted sync status for one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub property_id: String,
    pub state: SyncState,
    pub last_sync_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub reservations_count: i64,
}

impl SyncStatus {
    /// Fresh status for a property that never synced.
    pub fn idle(property_id: impl Into<String>) -> Self {
        Self {
            property_id: property_id.into(),
            state: SyncState::Idle,
            last_sync_at: None,
            last_error: None,
            reservations_count: 0,
        }
    }
}

/// Caller options for one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncOptions {
    /// Ignore the throttle window.
    pub force: bool,
    /// Skip the direct fetch and go through the proxy.
    pub force_proxy: bool,
}

/// Result of a sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    pub reservations_count: usize,
    pub tokens_created: usize,
    pub deleted_count: usize,
    pub skipped: bool,
}

impl SyncOutcome {
    pub fn skipped(reservations_count: usize) -> Self {
        Self { reservations_count, skipped: true, ..Self::default() }
    }
}
