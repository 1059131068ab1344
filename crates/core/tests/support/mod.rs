//! Shared test helpers for `guestlink-core` integration tests.
//!
//! In-memory implementations of every core port plus feed fixtures, so the
//! service tests can focus on behaviour instead of storage.

#![allow(dead_code)]

pub mod fixtures;
pub mod mocks;
