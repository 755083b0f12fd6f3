//! # CostClose Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - The month-closing and cost-distribution engine
//! - Port/adapter interfaces (traits)
//! - Services for closing, salary extras, overhead and internal costs
//!
//! ## Architecture Principles
//! - Only depends on `costclose-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits
//! - Pure, testable business logic

pub mod costs;

// Re-export specific items to avoid ambiguity
pub use costs::ports::{
    ClosingRepository, CostInputsRepository, OverheadRepository, SalaryRepository,
};
pub use costs::{
    ClosingService, InternalCostService, MonthlySalaryService, OverheadService, PeriodGuard,
    PeriodLocks, ReopenCause,
};
