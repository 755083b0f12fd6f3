//! # CostClose Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - SQLite repositories for every port in `costclose-core`
//! - Configuration loading (file plus environment overrides)
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `costclose-core`
//! - Depends on `costclose-common` for the connection pool
//! - Contains all "impure" code (I/O, SQL, process-wide logging)

pub mod config;
pub mod database;
pub mod errors;
pub mod observability;

// Re-export commonly used items
pub use database::{
    DbManager, SqliteClosingRepository, SqliteCostInputsRepository, SqliteOverheadRepository,
    SqliteSalaryRepository,
};
pub use errors::InfraError;
pub use observability::init_tracing;
