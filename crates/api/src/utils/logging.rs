use std::time::Duration;

use tracing::{info, warn};

/// Log the outcome of a request handler with structured fields.
///
/// `command` is a stable handler identifier (e.g. `"closing::close"`);
/// `error_type` is the domain error label when the handler failed.
#[inline]
pub fn log_command_execution(
    command: &str,
    elapsed: Duration,
    success: bool,
    error_type: Option<&str>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, error_type, "command_execution_failure");
    }
}
