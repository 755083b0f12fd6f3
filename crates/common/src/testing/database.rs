//! SQLite test database helpers.
//!
//! Ties the database file to a temporary directory so clean-up happens
//! automatically when the test completes.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::storage::{SqliteConnection, SqlitePool, SqlitePoolConfig, StorageResult};

/// Temporary on-disk SQLite database for tests.
#[derive(Debug)]
pub struct SqliteTestDatabase {
    // Held for RAII clean-up
    _temp_dir: TempDir,
    db_path: PathBuf,
    pool: SqlitePool,
}

impl SqliteTestDatabase {
    /// Create a fresh database using the default pool config.
    pub fn new() -> StorageResult<Self> {
        Self::with_pool_config(SqlitePoolConfig::default())
    }

    pub fn with_pool_config(config: SqlitePoolConfig) -> StorageResult<Self> {
        let temp_dir = tempfile::Builder::new().prefix("costclose-test").tempdir()?;
        let db_path = temp_dir.path().join("costclose.db");
        let pool = SqlitePool::new(&db_path, config)?;
        Ok(Self { _temp_dir: temp_dir, db_path, pool })
    }

    pub fn connection(&self) -> StorageResult<SqliteConnection> {
        self.pool.get_connection()
    }

    /// Execute a SQL script (potentially multiple statements).
    pub fn run_script(&self, sql: &str) -> StorageResult<()> {
        self.connection()?.execute_batch(sql)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
