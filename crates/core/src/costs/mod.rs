//! Month closing and cost distribution.
//!
//! The pure calculators (`cost_hour`, `non_productive`, `project_costs`,
//! `distribution`, `validation`) are combined by `month::compute_month`; the
//! services load inputs through the ports and persist through them.

pub mod closing;
pub mod cost_hour;
pub mod distribution;
pub mod internal_costs;
pub mod locks;
pub mod month;
pub mod non_productive;
pub mod overhead;
pub mod ports;
pub mod project_costs;
pub mod salaries;
pub mod validation;

pub use closing::{ClosingService, ReopenCause};
pub use internal_costs::InternalCostService;
pub use locks::{PeriodGuard, PeriodLocks};
pub use month::{compute_month, MonthComputation, MonthInputs};
pub use overhead::OverheadService;
pub use salaries::MonthlySalaryService;
