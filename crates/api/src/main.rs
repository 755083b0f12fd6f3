//! CostClose - month closing and cost distribution server
//!
//! Main entry point for the HTTP service.

use std::sync::Arc;

use costclose_api::{router, AppContext};
use costclose_domain::{CostCloseError, Result};
use costclose_infra::{config, init_tracing};
use tokio::net::TcpListener;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before the config loader reads COSTCLOSE_* overrides
    let dotenv = dotenvy::dotenv();

    let config = config::load()?;
    init_tracing(&config.logging)?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(e) => warn!(error = %e, "no .env file loaded"),
    }

    let addr = config.bind_address();
    let ctx = Arc::new(AppContext::new_with_config(config)?);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| CostCloseError::Config(format!("cannot bind {addr}: {e}")))?;
    info!(%addr, "CostClose listening");

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| CostCloseError::Internal(format!("server error: {e}")))?;

    info!("CostClose stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
    }
}
