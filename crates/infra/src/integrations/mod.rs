//! External service integrations

pub mod feed;
