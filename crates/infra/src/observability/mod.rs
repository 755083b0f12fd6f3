//! Structured logging setup
//!
//! A single global `tracing` subscriber: an [`EnvFilter`] (taken from
//! `RUST_LOG`, else the configured level) in front of either the compact
//! human formatter or JSON lines.

use costclose_domain::{CostCloseError, LoggingConfig, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber.
///
/// # Errors
/// `CostCloseError::Config` if the level is not a valid filter directive or
/// a subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_current_span(false)).try_init()
    } else {
        registry.with(fmt::layer().compact().with_target(true)).try_init()
    };

    installed.map_err(|e| CostCloseError::Config(format!("Failed to install tracing: {e}")))
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| CostCloseError::Config(format!("Invalid log level '{}': {e}", config.level))),
    }
}
