//! Tracing setup
//!
//! `RUST_LOG` wins over the configured level when set.

use guestlink_domain::{GuestLinkError, LoggingConfig, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Filter from `RUST_LOG`, else from the configured level.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            GuestLinkError::Config(format!("invalid logging.level '{}': {e}", config.level))
        }),
    }
}

/// Install the global subscriber: pretty output, or one JSON object per line.
///
/// # Errors
/// Returns `GuestLinkError::Config` when the level is not a valid filter or a
/// global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = env_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    result.map_err(|e| GuestLinkError::Config(format!("failed to install tracing subscriber: {e}")))
}
