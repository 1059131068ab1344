//! Domain types and models
//!
//! Reservations flow from the calendar feed into persisted rows; tokens and
//! sync status are persisted per property.

pub mod booking;
pub mod property;
pub mod reservation;
pub mod sync;
pub mod token;

pub use booking::ValidatedBooking;
pub use property::{PolicyDecision, Property};
pub use reservation::{
    ExternalReservation, ReservationMetadata, ReservationUpsert, StoredReservation,
};
pub use sync::{SyncOptions, SyncOutcome, SyncState, SyncStatus};
pub use token::{
    AutoTokenOutcome, AutoTokenSpec, IssueTokenRequest, IssuedToken, NewVerificationToken,
    ResolveTokenRequest, ResolvedToken, TokenSource, TokenSummary, VerificationToken,
};
