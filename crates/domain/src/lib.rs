//! # CostClose Domain
//!
//! Business domain types for the month-closing and cost-distribution engine.
//!
//! This crate contains:
//! - Organization inputs (users, projects, categories, time entries)
//! - Cost records (revenues, salary extras, overhead) and closing snapshots
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//! - Decimal helpers for money and percentages
//!
//! ## Architecture
//! - No dependencies on other CostClose crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod money;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
