//! Port interfaces for the costs engine
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations. Every call is scoped to a company.

use async_trait::async_trait;
use costclose_domain::{
    CloseCommit, CompanyId, MonthRange, MonthlyClosing, MonthlyOverheadCost, MonthlyUserSalary,
    Period, Project, ProjectCategory, ProjectMonthlyDistribution, ProjectMonthlyRevenue,
    ReopenRecord, Result, TimeEntry, User, UserId,
};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Read-only access to records owned by other subsystems
#[async_trait]
pub trait CostInputsRepository: Send + Sync {
    /// Every user of the company, including guests, inactive and
    /// soft-deleted ones.
    async fn list_users(&self, company_id: CompanyId) -> Result<Vec<User>>;

    async fn find_user(&self, company_id: CompanyId, user_id: UserId) -> Result<Option<User>>;

    /// Non-deleted projects, active or not.
    async fn list_projects(&self, company_id: CompanyId) -> Result<Vec<Project>>;

    async fn list_categories(&self, company_id: CompanyId) -> Result<Vec<ProjectCategory>>;

    /// Entries whose `started_at` falls inside the range.
    async fn list_time_entries(
        &self,
        company_id: CompanyId,
        range: MonthRange,
    ) -> Result<Vec<TimeEntry>>;

    async fn list_revenues(
        &self,
        company_id: CompanyId,
        period: Period,
    ) -> Result<Vec<ProjectMonthlyRevenue>>;
}

/// Monthly salary extras and close-time snapshots
#[async_trait]
pub trait SalaryRepository: Send + Sync {
    async fn list_for_period(
        &self,
        company_id: CompanyId,
        period: Period,
    ) -> Result<Vec<MonthlyUserSalary>>;

    async fn find_by_id(&self, company_id: CompanyId, id: Uuid)
        -> Result<Option<MonthlyUserSalary>>;

    /// Insert or update the extras of (user, period). Leaves any snapshot
    /// untouched.
    async fn upsert_extras(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        period: Period,
        extras: Decimal,
    ) -> Result<MonthlyUserSalary>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, company_id: CompanyId, id: Uuid) -> Result<bool>;
}

/// Overhead line items
#[async_trait]
pub trait OverheadRepository: Send + Sync {
    async fn list_for_period(
        &self,
        company_id: CompanyId,
        period: Period,
    ) -> Result<Vec<MonthlyOverheadCost>>;

    async fn find_by_id(
        &self,
        company_id: CompanyId,
        id: Uuid,
    ) -> Result<Option<MonthlyOverheadCost>>;

    async fn insert(&self, item: MonthlyOverheadCost) -> Result<()>;

    async fn update(&self, item: MonthlyOverheadCost) -> Result<()>;

    /// Returns `false` when nothing was deleted.
    async fn delete(&self, company_id: CompanyId, id: Uuid) -> Result<bool>;
}

/// Closing rows and their distributions
#[async_trait]
pub trait ClosingRepository: Send + Sync {
    async fn find(&self, company_id: CompanyId, period: Period) -> Result<Option<MonthlyClosing>>;

    /// Rows of a closing, joined with the project name, in project-name order.
    async fn list_distributions(&self, closing_id: Uuid)
        -> Result<Vec<ProjectMonthlyDistribution>>;

    /// Write snapshots, the closing row and its distributions in one
    /// transaction.
    ///
    /// # Errors
    /// `Conflict` when the row's version differs from
    /// `commit.expected_version` or any input in `commit.stamp` changed.
    /// Nothing is written in that case.
    async fn commit_close(&self, commit: CloseCommit) -> Result<MonthlyClosing>;

    /// Flip the row to REOPENED with the given audit fields.
    ///
    /// # Errors
    /// `NotFound` if the row is missing, `Conflict` on a version mismatch.
    async fn reopen(&self, record: ReopenRecord) -> Result<MonthlyClosing>;
}
