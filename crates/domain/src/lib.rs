//! # GuestLink Domain
//!
//! Business domain types and models for GuestLink.
//!
//! This crate contains:
//! - Reservation, booking, token and sync status types
//! - Domain error types and Result definitions
//! - Configuration structures
//! - The calendar feed parser and identifier extraction heuristics
//!
//! ## Architecture
//! - No dependencies on other GuestLink crates
//! - Only external dependencies allowed
//! - Pure domain models and text processing, no I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
// Re-export calendar parser utilities
pub use utils::booking_code::{extract_booking_code, is_platform_booking_code, normalize_code};
pub use utils::guest::{extract_guest_count, extract_guest_name, is_well_formed_guest_name};
pub use utils::ical::{
    parse_feed, parse_feed_with_report, parse_ical_date, unescape_text, unfold_lines,
    FeedParseReport, SkippedEvent,
};
pub use utils::validation::{
    normalize_access_code, validate_expires_in_days, validate_property_id, validate_token_format,
};
