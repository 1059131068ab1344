//! # GuestLink Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - SQLite repositories for properties, reservations, bookings, tokens and
//!   sync status
//! - Calendar feed sources (direct HTTP and passthrough proxy)
//! - Configuration loading and tracing setup
//! - The composition root wiring everything into services
//!
//! ## Architecture
//! - Implements traits defined in `guestlink-core`
//! - Contains all "impure" code (I/O, environment, clocks)

pub mod config;
pub mod context;
pub mod database;
pub mod errors;
pub mod http;
pub mod integrations;
pub mod observability;
pub mod pepper;

pub use context::GuestLinkContext;
pub use database::*;
pub use http::HttpClient;
pub use integrations::feed::{HttpFeedSource, ProxyFeedSource};
pub use pepper::ConfigPepperProvider;
