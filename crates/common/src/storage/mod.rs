//! Storage primitives for SQLite databases
//!
//! This module provides the pooled SQLite backend used by the infra crate:
//! connection pool, per-connection pragmas, connection wrapper and storage
//! errors.

pub mod error;
pub mod metrics;
pub mod sqlite;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use metrics::StorageMetrics;
pub use sqlite::{
    apply_connection_pragmas, HealthStatus, SqliteConnection, SqlitePool, SqlitePoolConfig,
};
