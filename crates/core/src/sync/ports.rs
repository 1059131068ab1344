//! Port interfaces for calendar sync

use async_trait::async_trait;
use guestlink_domain::{
    Property, ReservationUpsert, Result, StoredReservation, SyncStatus, ValidatedBooking,
};

/// Property registry
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    async fn find_property(&self, property_id: &str) -> Result<Option<Property>>;

    async fn upsert_property(&self, property: &Property) -> Result<()>;
}

/// Stored reservations, keyed on (property, external code)
#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// All stored reservations for a property
    async fn list_for_property(&self, property_id: &str) -> Result<Vec<StoredReservation>>;

    /// Upsert every row and delete the given codes as one atomic unit.
    ///
    /// Returns the number of rows deleted.
    async fn apply_reconciliation(
        &self,
        property_id: &str,
        upserts: &[ReservationUpsert],
        delete_codes: &[String],
    ) -> Result<usize>;
}

/// Bookings confirmed by the guest verification flow
#[async_trait]
pub trait ValidatedBookingRepository: Send + Sync {
    async fn list_for_property(&self, property_id: &str) -> Result<Vec<ValidatedBooking>>;

    /// Upsert keyed on (property, booking code)
    async fn record_validated_booking(&self, booking: &ValidatedBooking) -> Result<()>;
}

/// Per-property sync state
#[async_trait]
pub trait SyncStatusRepository: Send + Sync {
    async fn get_status(&self, property_id: &str) -> Result<Option<SyncStatus>>;

    async fn save_status(&self, status: &SyncStatus) -> Result<()>;
}

/// Retrieves raw feed text.
///
/// Connection-level failures must surface as `GuestLinkError::Network`; a
/// completed request with a non-success status as `UpstreamFetch`.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn fetch(&self, url: &str) -> Result<String>;
}
