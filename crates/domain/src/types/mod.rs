//! Domain types and models

pub mod closing;
pub mod costs;
pub mod organization;
pub mod period;
pub mod time_entry;

pub use closing::{
    CloseCommit, ClosingEvent, ClosingPreview, ClosingStatus, ClosingTotals, ClosingView,
    DistributionLine, InputsStamp, MonthlyClosing, NonProductiveBreakdown,
    ProjectMonthlyDistribution, ReopenRecord, RevenueStamp, SalarySnapshot, SalaryStamp,
    UserCostLine, ValidationError, ValidationErrorCode,
};
pub use costs::{
    MonthlyOverheadCost, MonthlyUserSalary, NewOverheadCost, OverheadCostPatch,
    ProjectInternalCost, ProjectMonthlyRevenue, SalaryLine, WithWarning,
};
pub use organization::{
    Actor, CategoryId, CompanyId, Project, ProjectCategory, ProjectId, ProjectScope, User,
    UserId, UserRelation,
};
pub use period::{MonthRange, Period};
pub use time_entry::{TimeEntry, TimeEntryKind};
