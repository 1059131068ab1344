//! Reconciliation of parsed feed events against stored reservations.
//!
//! The plan is computed without I/O so it can be tested in isolation. Guest
//! names follow a fixed precedence per code:
//!
//! 1. validated booking name, when well formed
//! 2. stored reservation name, when well formed
//! 3. freshly parsed name
//!
//! Dates always come from the feed.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use guestlink_domain::constants::FEED_SOURCE_LABEL;
use guestlink_domain::{
    is_well_formed_guest_name, normalize_code, ExternalReservation, ReservationMetadata,
    ReservationUpsert, StoredReservation, ValidatedBooking,
};

/// Writes needed to bring the store in line with the latest feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationPlan {
    /// One row per distinct code, in first-seen feed order.
    pub upserts: Vec<ReservationUpsert>,
    /// Stored codes absent from the feed.
    pub delete_codes: Vec<String>,
    /// Parsed events dropped for lack of a booking code.
    pub without_code: usize,
}

/// Build the reconciliation plan for one property.
pub fn plan_reconciliation(
    property_id: &str,
    parsed: &[ExternalReservation],
    stored: &[StoredReservation],
    validated: &[ValidatedBooking],
    synced_at: DateTime<Utc>,
) -> ReconciliationPlan {
    let stored_by_code: HashMap<String, &StoredReservation> =
        stored.iter().map(|row| (normalize_code(&row.external_code), row)).collect();
    let validated_by_code: HashMap<String, &ValidatedBooking> =
        validated.iter().map(|booking| (normalize_code(&booking.booking_code), booking)).collect();

    let mut plan = ReconciliationPlan::default();
    let mut position: HashMap<String, usize> = HashMap::new();

    for event in parsed {
        let Some(code) = event.external_code.as_deref().map(normalize_code).filter(|c| !c.is_empty())
        else {
            plan.without_code += 1;
            continue;
        };

        let guest_name = resolve_guest_name(
            validated_by_code.get(&code).and_then(|b| b.guest_name.as_deref()),
            stored_by_code.get(&code).and_then(|r| r.guest_name.as_deref()),
            event.guest_name.as_deref(),
        );
        let guest_count =
            event.guest_count.or_else(|| stored_by_code.get(&code).and_then(|r| r.guest_count));

        let row = ReservationUpsert {
            property_id: property_id.to_string(),
            external_code: code.clone(),
            start_date: event.start_date,
            end_date: event.end_date,
            guest_name,
            guest_count,
            summary: event.summary.clone(),
            metadata: ReservationMetadata {
                raw_event: event.raw_event.clone(),
                source: FEED_SOURCE_LABEL.to_string(),
                synced_at,
            },
        };

        // Duplicate codes: the later event wins, keeping the first position.
        match position.get(&code) {
            Some(&idx) => plan.upserts[idx] = row,
            None => {
                position.insert(code, plan.upserts.len());
                plan.upserts.push(row);
            }
        }
    }

    let kept: HashSet<&str> = plan.upserts.iter().map(|row| row.external_code.as_str()).collect();
    plan.delete_codes = stored
        .iter()
        .map(|row| row.external_code.clone())
        .filter(|code| !kept.contains(normalize_code(code).as_str()))
        .collect();

    plan
}

fn resolve_guest_name(
    validated: Option<&str>,
    stored: Option<&str>,
    parsed: Option<&str>,
) -> Option<String> {
    validated
        .filter(|name| is_well_formed_guest_name(name))
        .or_else(|| stored.filter(|name| is_well_formed_guest_name(name)))
        .or(parsed)
        .map(|name| name.trim().to_string())
}
