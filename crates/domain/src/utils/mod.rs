//! Text processing utilities for calendar feeds
//!
//! Pure functions only: the parser, the booking-code strategies, guest
//! heuristics and input validation.

pub mod booking_code;
pub mod guest;
pub mod ical;
pub mod validation;
