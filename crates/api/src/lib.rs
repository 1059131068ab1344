//! # GuestLink API
//!
//! Thin axum surface over the sync and token services.
//!
//! Handlers only translate HTTP to service calls; every rule lives in
//! `guestlink-core`. Errors leave through [`routes::ApiError`], which maps
//! each domain error to a status code and a stable error code.

pub mod routes;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use routes::{ApiError, ErrorResponse};
pub use state::AppState;

/// Full application router with request tracing attached.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::properties::router())
        .merge(routes::tokens::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
