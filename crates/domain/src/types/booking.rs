//! Validated booking records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Booking confirmed by a guest through the verification flow.
///
/// Its guest name outranks anything derived from the calendar feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedBooking {
    pub id: String,
    pub property_id: String,
    pub booking_code: String,
    pub guest_name: Option<String>,
    pub validated_at: DateTime<Utc>,
}
