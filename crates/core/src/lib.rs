//! # GuestLink Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for storage, feed sources, policy and secrets
//! - Calendar sync: fetch fallback chain, reconciliation, status tracking
//! - Guest verification tokens: issuer, resolver and auto generator
//!
//! ## Architecture Principles
//! - Only depends on `guestlink-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod sync;
pub mod tokens;

pub use sync::fetcher::FallbackFetcher;
pub use sync::ports::{
    FeedSource, PropertyRepository, ReservationRepository, SyncStatusRepository,
    ValidatedBookingRepository,
};
pub use sync::reconciliation::{plan_reconciliation, ReconciliationPlan};
pub use sync::status::SyncStatusTracker;
pub use sync::SyncService;
pub use tokens::auto::AutoTokenGenerator;
pub use tokens::crypto::Pepper;
pub use tokens::ports::{PepperProvider, ReservationPolicy, TokenRepository};
pub use tokens::{PolicyFailureMode, TokenService, TokenSettings};
