//! Common utilities shared across CostClose crates.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `storage`: pooled SQLite connections, pragmas and storage errors
//! - `test-utils`: throwaway on-disk databases for integration tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

#[cfg(feature = "storage")]
pub mod storage;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(feature = "test-utils")]
pub mod testing;

#[cfg(feature = "storage")]
pub use storage::{StorageError, StorageResult};
