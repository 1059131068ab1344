use std::time::Duration;

use guestlink_domain::Result;
use tracing::{info, warn};

/// Log the outcome of a service call made by a handler.
///
/// `operation` must be a stable identifier; never pass tokens, codes or
/// feed URLs through it.
#[inline]
pub fn log_operation<T>(operation: &str, elapsed: Duration, result: &Result<T>) {
    let duration_ms = elapsed.as_millis() as u64;

    match result {
        Ok(_) => info!(operation, duration_ms, "operation_success"),
        Err(err) => warn!(operation, duration_ms, error_type = err.label(), "operation_failure"),
    }
}
