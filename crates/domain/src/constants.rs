//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Sync configuration
pub const DEFAULT_SYNC_THROTTLE_SECS: u64 = 300;
pub const DEFAULT_AUTO_TOKEN_GRACE_DAYS: i64 = 7;
pub const FEED_SOURCE_LABEL: &str = "ical";

// Token configuration
pub const DEFAULT_TOKEN_EXPIRES_IN_DAYS: i64 = 7;
pub const MAX_TOKEN_EXPIRES_IN_DAYS: i64 = 365;
/// Upper bound for any configured day count; keeps date arithmetic in range.
pub const MAX_CONFIGURED_DAYS: i64 = 3650;
pub const TOKEN_RANDOM_BYTES: usize = 32;
pub const TOKEN_SUFFIX_SEPARATOR: char = '.';
pub const MIN_TOKEN_LENGTH: usize = 32;
pub const MAX_TOKEN_LENGTH: usize = 128;

// Identifier formats
pub const MAX_PROPERTY_ID_LENGTH: usize = 64;
pub const MIN_ACCESS_CODE_LENGTH: usize = 4;
pub const MAX_ACCESS_CODE_LENGTH: usize = 32;

// Platform booking code: fixed prefix followed by a fixed-length suffix
pub const PLATFORM_CODE_PREFIX: &str = "HM";
pub const PLATFORM_CODE_SUFFIX_LEN: usize = 8;

// Bare token heuristic bounds
pub const MIN_BOOKING_CODE_LEN: usize = 8;
pub const MAX_BOOKING_CODE_LEN: usize = 12;
