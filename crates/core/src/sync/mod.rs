//! Calendar feed synchronization

pub mod fetcher;
pub mod ports;
pub mod reconciliation;
pub mod service;
pub mod status;

pub use service::SyncService;
