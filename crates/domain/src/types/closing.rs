//! Month closing: lifecycle status, persisted snapshot, validation outcome
//! and the views returned to callers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::organization::{CompanyId, ProjectId, UserId};
use super::period::Period;
use crate::impl_stored_enum_conversions;
use crate::{CostCloseError, Result};

/// Lifecycle of a month. An absent closing row reads as `Open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClosingStatus {
    #[default]
    Open,
    Closed,
    Reopened,
}

impl_stored_enum_conversions!(ClosingStatus {
    Open => "OPEN",
    Closed => "CLOSED",
    Reopened => "REOPENED",
});

/// Something that moves a month through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClosingEvent {
    /// Explicit close after validation passed.
    Close,
    /// Explicit reopen by a user.
    Reopen,
    /// Salary or overhead data for the month was edited.
    InputsChanged,
}

impl ClosingStatus {
    /// The transition table. Every state change goes through here.
    ///
    /// | from     | Close  | Reopen   | InputsChanged |
    /// |----------|--------|----------|---------------|
    /// | OPEN     | CLOSED | error    | OPEN          |
    /// | CLOSED   | error  | REOPENED | REOPENED      |
    /// | REOPENED | CLOSED | REOPENED | REOPENED      |
    pub fn apply(self, event: ClosingEvent) -> Result<Self> {
        match (self, event) {
            (Self::Open | Self::Reopened, ClosingEvent::Close) => Ok(Self::Closed),
            (Self::Closed, ClosingEvent::Close) => {
                Err(CostCloseError::InvalidInput("month is already closed".to_string()))
            }
            (Self::Open, ClosingEvent::Reopen) => {
                Err(CostCloseError::InvalidInput("month has not been closed".to_string()))
            }
            (Self::Closed | Self::Reopened, ClosingEvent::Reopen) => Ok(Self::Reopened),
            (Self::Closed, ClosingEvent::InputsChanged) => Ok(Self::Reopened),
            (status, ClosingEvent::InputsChanged) => Ok(status),
        }
    }

    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }
}

/// Persisted closing of one company month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyClosing {
    pub id: Uuid,
    pub company_id: CompanyId,
    #[serde(flatten)]
    pub period: Period,
    pub status: ClosingStatus,
    pub total_salaries: Option<Decimal>,
    pub total_overhead: Option<Decimal>,
    pub total_non_productive: Option<Decimal>,
    pub total_revenue: Option<Decimal>,
    pub closed_by: Option<UserId>,
    pub closed_at: Option<DateTime<Utc>>,
    pub reopened_by: Option<UserId>,
    pub reopened_at: Option<DateTime<Utc>>,
    pub reopen_reason: Option<String>,
    /// Bumped on every write; used for compare-and-swap.
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

/// Persisted allocation of the month's pools to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMonthlyDistribution {
    pub id: Uuid,
    pub closing_id: Uuid,
    pub project_id: ProjectId,
    pub project_name: String,
    pub project_revenue: Decimal,
    pub revenue_share_percent: Decimal,
    pub distributed_salaries: Decimal,
    pub distributed_overhead: Decimal,
    pub distributed_non_productive: Decimal,
    pub total_distributed: Decimal,
}

/// Why a month cannot be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationErrorCode {
    MissingSalary,
    MissingRevenue,
    NoActiveProjects,
    ZeroRevenue,
}

/// A condition that blocks closing, with the entity it concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    pub code: ValidationErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
}

impl ValidationError {
    /// Active member without a base salary.
    pub fn missing_salary(user_id: UserId, user_name: &str) -> Self {
        Self {
            code: ValidationErrorCode::MissingSalary,
            message: format!("User {user_name} has no salary configured"),
            user_id: Some(user_id),
            user_name: Some(user_name.to_string()),
            project_id: None,
            project_name: None,
        }
    }

    /// Productive project without actual revenue for the month.
    pub fn missing_revenue(project_id: ProjectId, project_name: &str) -> Self {
        Self {
            code: ValidationErrorCode::MissingRevenue,
            message: format!("Project {project_name} has no actual revenue for this month"),
            user_id: None,
            user_name: None,
            project_id: Some(project_id),
            project_name: Some(project_name.to_string()),
        }
    }

    pub fn no_active_projects() -> Self {
        Self::bare(ValidationErrorCode::NoActiveProjects, "There are no active productive projects")
    }

    pub fn zero_revenue() -> Self {
        Self::bare(
            ValidationErrorCode::ZeroRevenue,
            "Total revenue of productive projects is zero",
        )
    }

    fn bare(code: ValidationErrorCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            user_id: None,
            user_name: None,
            project_id: None,
            project_name: None,
        }
    }
}

/// The four pools of a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingTotals {
    pub total_salaries: Decimal,
    pub total_overhead: Decimal,
    pub total_non_productive: Decimal,
    pub total_revenue: Decimal,
}

/// Per-user line of the cost-hour computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCostLine {
    pub user_id: UserId,
    pub user_name: String,
    pub total_salary: Decimal,
    pub total_hours: Decimal,
    pub cost_hour: Decimal,
    pub has_hours: bool,
}

/// Would-be (or committed) allocation to one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionLine {
    pub project_id: ProjectId,
    pub project_name: String,
    pub project_revenue: Decimal,
    pub revenue_share_percent: Decimal,
    pub distributed_salaries: Decimal,
    pub distributed_overhead: Decimal,
    pub distributed_non_productive: Decimal,
    pub total_distributed: Decimal,
    /// Labor cost of hours logged on the project, at monthly cost-hour.
    pub internal_cost: Decimal,
}

/// Split of the non-productive pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonProductiveBreakdown {
    pub hours_cost: Decimal,
    pub idle_salaries: Decimal,
    pub total: Decimal,
}

/// Dry run of a close. Nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingPreview {
    #[serde(flatten)]
    pub period: Period,
    pub status: ClosingStatus,
    pub can_close: bool,
    pub errors: Vec<ValidationError>,
    pub totals: ClosingTotals,
    pub non_productive: NonProductiveBreakdown,
    pub users: Vec<UserCostLine>,
    pub distributions: Vec<DistributionLine>,
}

/// Current state of a month with its persisted distribution rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingView {
    #[serde(flatten)]
    pub period: Period,
    pub status: ClosingStatus,
    /// `None` while the month has never been closed.
    pub closing: Option<MonthlyClosing>,
    pub distributions: Vec<ProjectMonthlyDistribution>,
}

impl ClosingView {
    /// View of a month that was never closed.
    pub fn open(period: Period) -> Self {
        Self { period, status: ClosingStatus::Open, closing: None, distributions: Vec::new() }
    }
}

/// Actual revenue of a planned project as seen by the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueStamp {
    pub project_id: ProjectId,
    pub actual_revenue: Option<Decimal>,
}

/// Salary inputs of one pooled user as seen by the preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryStamp {
    pub user_id: UserId,
    pub base_salary: Option<Decimal>,
    pub extras: Decimal,
}

/// Inputs the distribution was computed from. The commit re-reads them in
/// its transaction and refuses to write if anything moved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputsStamp {
    pub revenues: Vec<RevenueStamp>,
    pub overhead_total: Decimal,
    pub salaries: Vec<SalaryStamp>,
}

/// Base salary frozen into the month at close time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalarySnapshot {
    pub user_id: UserId,
    pub base_salary: Decimal,
}

/// Everything a close writes, in one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseCommit {
    pub company_id: CompanyId,
    pub period: Period,
    /// Version of the closing row the preview saw; `None` when absent.
    pub expected_version: Option<i64>,
    pub totals: ClosingTotals,
    pub closed_by: UserId,
    pub closed_at: DateTime<Utc>,
    pub salary_snapshots: Vec<SalarySnapshot>,
    pub distributions: Vec<DistributionLine>,
    pub stamp: InputsStamp,
}

/// Write for an explicit or implicit reopen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReopenRecord {
    pub company_id: CompanyId,
    pub period: Period,
    pub expected_version: i64,
    pub reopened_by: UserId,
    pub reopened_at: DateTime<Utc>,
    pub reason: String,
}
