//! Reservation types
//!
//! [`ExternalReservation`] is transient: produced by the feed parser and
//! discarded after reconciliation. [`StoredReservation`] is the persisted row,
//! unique per (property, external code).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Reservation candidate parsed from one calendar event block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalReservation {
    /// Event UID when present, otherwise derived from the date range.
    pub id: String,
    pub summary: String,
    pub start_date: NaiveDate,
    /// Exclusive end date (checkout day).
    pub end_date: NaiveDate,
    pub guest_name: Option<String>,
    pub guest_count: Option<u32>,
    /// Unfolded, unescaped DESCRIPTION value.
    pub description: String,
    pub external_code: Option<String>,
    /// Raw event block as it appeared in the feed.
    pub raw_event: String,
}

impl ExternalReservation {
    /// Number of nights covered (DTEND is exclusive).
    pub fn nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }

    /// Whether the event carries a stable identity usable for persistence.
    pub fn has_stable_code(&self) -> bool {
        self.external_code.as_deref().is_some_and(|code| !code.trim().is_empty())
    }
}

/// Provenance recorded alongside a persisted reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationMetadata {
    pub raw_event: String,
    pub source: String,
    pub synced_at: DateTime<Utc>,
}

/// Reservation row persisted for a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredReservation {
    pub id: String,
    pub property_id: String,
    pub external_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guest_name: Option<String>,
    pub guest_count: Option<u32>,
    pub summary: String,
    pub metadata: ReservationMetadata,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Row written by the batched upsert, keyed on (property, external code).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationUpsert {
    pub property_id: String,
    pub external_code: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guest_name: Option<String>,
    pub guest_count: Option<u32>,
    pub summary: String,
    pub metadata: ReservationMetadata,
}
