//! SQLite connection pool configuration

use std::time::Duration;

use crate::storage::error::{StorageError, StorageResult};

/// Upper bound on pool size; SQLite serialises writers anyway.
const MAX_POOL_SIZE: u32 = 64;

/// r2d2 pool and per-connection pragma settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlitePoolConfig {
    /// Maximum number of connections in the pool
    pub max_size: u32,

    /// How long to wait for a free connection
    pub connection_timeout: Duration,

    /// Busy timeout for SQLite lock contention
    pub busy_timeout: Duration,

    /// Enable WAL journal mode
    pub enable_wal: bool,

    /// Enable foreign key constraints
    pub enable_foreign_keys: bool,
}

impl Default for SqlitePoolConfig {
    fn default() -> Self {
        Self {
            max_size: 8,
            connection_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_millis(5000),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

impl SqlitePoolConfig {
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Reject sizes and timeouts r2d2 or SQLite would choke on.
    pub fn validate(&self) -> StorageResult<()> {
        if self.max_size == 0 {
            return Err(StorageError::InvalidConfig("max_size must be greater than 0".into()));
        }
        if self.max_size > MAX_POOL_SIZE {
            return Err(StorageError::InvalidConfig(format!(
                "max_size too large (max: {MAX_POOL_SIZE})"
            )));
        }
        if self.connection_timeout.is_zero() {
            return Err(StorageError::InvalidConfig(
                "connection_timeout must be greater than 0".into(),
            ));
        }
        if self.busy_timeout.is_zero() {
            return Err(StorageError::InvalidConfig("busy_timeout must be greater than 0".into()));
        }
        Ok(())
    }
}
