//! Shared handler state

use std::sync::Arc;

use guestlink_infra::GuestLinkContext;

/// Cloned into every handler; the context itself is shared.
#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<GuestLinkContext>,
}

impl AppState {
    pub fn new(ctx: GuestLinkContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }
}
