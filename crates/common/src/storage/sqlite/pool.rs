//! SQLite connection pool
//!
//! r2d2-based pooling with pragmas applied to every new connection.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::{debug, info, instrument, warn};

use super::config::SqlitePoolConfig;
use super::connection::SqliteConnection;
use super::pragmas::apply_connection_pragmas;
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::metrics::StorageMetrics;

/// SQLite connection pool
///
/// - Connection pooling with a bounded size
/// - WAL mode and foreign keys on every connection
/// - Acquisition timeout classification
/// - Counters for the health endpoint
#[derive(Debug)]
pub struct SqlitePool {
    pool: Pool<SqliteConnectionManager>,
    config: SqlitePoolConfig,
    metrics: Arc<StorageMetrics>,
}

impl SqlitePool {
    /// Open (or create) the database file and build the pool.
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid, the file cannot be
    /// opened or the first connection fails its pragmas.
    #[instrument(fields(db_path = ?path, pool_size = config.max_size))]
    pub fn new(path: &Path, config: SqlitePoolConfig) -> StorageResult<Self> {
        config.validate()?;
        info!("Creating SQLite connection pool");

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let pragma_config = config.clone();
        let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
            apply_connection_pragmas(conn, &pragma_config)
                .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
        });

        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .map_err(|e| {
                warn!(error = %e, "Failed to create connection pool");
                StorageError::Connection(format!("Failed to create pool: {}", e))
            })?;

        info!(max_size = config.max_size, "SQLite pool created");

        Ok(Self { pool, config, metrics: Arc::new(StorageMetrics::new()) })
    }

    /// Get a connection from the pool
    #[instrument(skip(self), fields(pool_size = self.config.max_size))]
    pub fn get_connection(&self) -> StorageResult<SqliteConnection> {
        let start = Instant::now();

        match self.pool.get() {
            Ok(conn) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                self.metrics.record_connection_acquired(duration_ms);
                debug!(duration_ms, "Connection acquired");
                Ok(SqliteConnection::new(conn))
            }
            Err(e) => {
                let err_str = e.to_string().to_lowercase();
                if err_str.contains("timed out") || err_str.contains("timeout") {
                    self.metrics.record_connection_timeout();
                    warn!(timeout = ?self.config.connection_timeout, "Connection timeout");
                    Err(StorageError::Timeout(self.config.connection_timeout.as_secs()))
                } else {
                    self.metrics.record_connection_error();
                    warn!(error = %e, "Connection error");
                    Err(StorageError::Connection(format!("Failed to get connection: {}", e)))
                }
            }
        }
    }

    /// Probe the pool with a trivial query.
    pub fn health_check(&self) -> HealthStatus {
        let state = self.pool.state();
        let probe = self
            .get_connection()
            .and_then(|conn| conn.query_row("SELECT 1", &[], |row| row.get::<_, i64>(0)));

        match probe {
            Ok(_) => HealthStatus {
                healthy: true,
                active_connections: state.connections,
                idle_connections: state.idle_connections,
                max_connections: self.config.max_size,
                message: None,
            },
            Err(e) => HealthStatus {
                healthy: false,
                active_connections: state.connections,
                idle_connections: state.idle_connections,
                max_connections: self.config.max_size,
                message: Some(format!("Pool unhealthy: {}", e)),
            },
        }
    }

    pub fn metrics(&self) -> &Arc<StorageMetrics> {
        &self.metrics
    }

    pub fn config(&self) -> &SqlitePoolConfig {
        &self.config
    }
}

/// Health snapshot of the pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthStatus {
    pub healthy: bool,
    pub active_connections: u32,
    pub idle_connections: u32,
    pub max_connections: u32,
    /// Set when unhealthy
    pub message: Option<String>,
}
