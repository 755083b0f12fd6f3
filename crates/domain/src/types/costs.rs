//! Monthly cost inputs: revenues, salary extras, overhead line items.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::organization::{CompanyId, ProjectId, UserId};
use super::period::Period;

/// Revenue recorded for a project in a month. Owned by the projects module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMonthlyRevenue {
    pub project_id: ProjectId,
    pub period: Period,
    pub estimated_revenue: Option<Decimal>,
    /// Only this figure feeds the distribution.
    pub actual_revenue: Option<Decimal>,
}

/// Per-user monthly salary record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyUserSalary {
    pub id: Uuid,
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub period: Period,
    pub extras: Decimal,
    /// Written only when the month is closed.
    pub base_salary_snapshot: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}

/// Salary line shown for a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalaryLine {
    pub user_id: UserId,
    pub user_name: String,
    /// Id of the monthly record, when one exists.
    pub salary_id: Option<Uuid>,
    pub base_salary: Option<Decimal>,
    pub extras: Decimal,
    pub total_salary: Decimal,
    /// Base salary comes from the close-time snapshot rather than the live
    /// user record.
    pub from_snapshot: bool,
}

/// Overhead line item (rent, tools, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyOverheadCost {
    pub id: Uuid,
    pub company_id: CompanyId,
    pub period: Period,
    pub concept: String,
    pub amount: Decimal,
    pub date: Option<NaiveDate>,
    pub created_by: UserId,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an overhead item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOverheadCost {
    pub year: i32,
    pub month: u32,
    pub concept: String,
    pub amount: Decimal,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

/// Partial update of an overhead item. Absent fields are left untouched,
/// except that a move to another month without a new `date` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverheadCostPatch {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub concept: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<NaiveDate>,
}

impl OverheadCostPatch {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Live-mode labor cost of one project for a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInternalCost {
    pub project_id: ProjectId,
    pub project_name: String,
    pub total_hours: Decimal,
    pub internal_cost: Decimal,
}

/// A mutation result plus the implicit-reopen warning, if one fired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithWarning<T> {
    #[serde(flatten)]
    pub value: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl<T> WithWarning<T> {
    /// Attach an optional reopen warning to a mutation result.
    pub fn new(value: T, warning: Option<String>) -> Self {
        Self { value, warning }
    }
}
