//! Guest verification tokens

pub mod auto;
pub mod crypto;
pub mod ports;
pub mod service;

pub use service::{PolicyFailureMode, TokenService, TokenSettings};
