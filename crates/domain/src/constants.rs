//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! application.

/// Exact (case-sensitive) name of the category whose projects are treated as
/// non-productive.
pub const NON_PRODUCTIVE_CATEGORY: &str = "No productivos";

/// Decimal places kept for every money amount and percentage.
pub const MONEY_SCALE: u32 = 2;

/// Accepted calendar years for a closing period.
pub const MIN_PERIOD_YEAR: i32 = 2000;
pub const MAX_PERIOD_YEAR: i32 = 2100;

// Implicit reopen
pub const SALARY_CHANGED_REOPEN_REASON: &str =
    "Automatic reopen: salary data was modified after the month was closed";
pub const OVERHEAD_CHANGED_REOPEN_REASON: &str =
    "Automatic reopen: overhead costs were modified after the month was closed";
/// Returned next to the result of an edit that reopened a closed month.
pub const REOPENED_WARNING: &str =
    "This month was closed. It has been reopened and must be closed again to recalculate the cost distribution.";

// Configuration defaults
pub const DEFAULT_DB_PATH: &str = "costclose.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 8;
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_LOG_LEVEL: &str = "info";
