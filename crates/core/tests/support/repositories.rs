//! In-memory implementations of the costs ports.
//!
//! One shared store backs every port so that services see each other's
//! writes, the way they would against a single database.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use costclose_core::{
    ClosingRepository, CostInputsRepository, OverheadRepository, SalaryRepository,
};
use costclose_domain::money::round_money;
use costclose_domain::{
    CloseCommit, ClosingStatus, CompanyId, CostCloseError, MonthRange, MonthlyClosing,
    MonthlyOverheadCost, MonthlyUserSalary, Period, Project, ProjectCategory,
    ProjectMonthlyDistribution, ProjectMonthlyRevenue, ReopenRecord, Result as DomainResult,
    TimeEntry, User, UserId,
};
use rust_decimal::Decimal;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryState {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub categories: Vec<ProjectCategory>,
    pub entries: Vec<TimeEntry>,
    pub revenues: Vec<ProjectMonthlyRevenue>,
    pub salaries: Vec<MonthlyUserSalary>,
    pub overhead: Vec<MonthlyOverheadCost>,
    pub closings: Vec<MonthlyClosing>,
    pub distributions: Vec<ProjectMonthlyDistribution>,
}

/// Shared store implementing all four ports.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCosts {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryCosts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Direct access for seeding and assertions.
    pub fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    fn stamp_matches(state: &MemoryState, commit: &CloseCommit) -> bool {
        let revenues_match = commit.stamp.revenues.iter().all(|stamp| {
            let current = state
                .revenues
                .iter()
                .find(|r| r.project_id == stamp.project_id && r.period == commit.period)
                .and_then(|r| r.actual_revenue);
            current == stamp.actual_revenue
        });

        let overhead_total = round_money(
            state
                .overhead
                .iter()
                .filter(|o| o.company_id == commit.company_id && o.period == commit.period)
                .map(|o| o.amount)
                .sum(),
        );

        let salaries_match = commit.stamp.salaries.iter().all(|stamp| {
            let base = state.users.iter().find(|u| u.id == stamp.user_id).and_then(|u| u.salary);
            let extras = state
                .salaries
                .iter()
                .find(|s| s.user_id == stamp.user_id && s.period == commit.period)
                .map(|s| s.extras)
                .unwrap_or_default();
            base == stamp.base_salary && extras == stamp.extras
        });

        revenues_match && overhead_total == commit.stamp.overhead_total && salaries_match
    }
}

#[async_trait]
impl CostInputsRepository for InMemoryCosts {
    async fn list_users(&self, company_id: CompanyId) -> DomainResult<Vec<User>> {
        Ok(self.state().users.iter().filter(|u| u.company_id == company_id).cloned().collect())
    }

    async fn find_user(&self, company_id: CompanyId, user_id: UserId) -> DomainResult<Option<User>> {
        Ok(self
            .state()
            .users
            .iter()
            .find(|u| u.company_id == company_id && u.id == user_id)
            .cloned())
    }

    async fn list_projects(&self, company_id: CompanyId) -> DomainResult<Vec<Project>> {
        Ok(self.state().projects.iter().filter(|p| p.company_id == company_id).cloned().collect())
    }

    async fn list_categories(&self, company_id: CompanyId) -> DomainResult<Vec<ProjectCategory>> {
        Ok(self
            .state()
            .categories
            .iter()
            .filter(|c| c.company_id == company_id)
            .cloned()
            .collect())
    }

    async fn list_time_entries(
        &self,
        company_id: CompanyId,
        range: MonthRange,
    ) -> DomainResult<Vec<TimeEntry>> {
        Ok(self
            .state()
            .entries
            .iter()
            .filter(|e| e.company_id == company_id && range.contains(e.started_at))
            .cloned()
            .collect())
    }

    async fn list_revenues(
        &self,
        company_id: CompanyId,
        period: Period,
    ) -> DomainResult<Vec<ProjectMonthlyRevenue>> {
        let state = self.state();
        Ok(state
            .revenues
            .iter()
            .filter(|r| {
                r.period == period
                    && state.projects.iter().any(|p| p.id == r.project_id && p.company_id == company_id)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SalaryRepository for InMemoryCosts {
    async fn list_for_period(
        &self,
        company_id: CompanyId,
        period: Period,
    ) -> DomainResult<Vec<MonthlyUserSalary>> {
        Ok(self
            .state()
            .salaries
            .iter()
            .filter(|s| s.company_id == company_id && s.period == period)
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        company_id: CompanyId,
        id: Uuid,
    ) -> DomainResult<Option<MonthlyUserSalary>> {
        Ok(self
            .state()
            .salaries
            .iter()
            .find(|s| s.company_id == company_id && s.id == id)
            .cloned())
    }

    async fn upsert_extras(
        &self,
        company_id: CompanyId,
        user_id: UserId,
        period: Period,
        extras: Decimal,
    ) -> DomainResult<MonthlyUserSalary> {
        let mut state = self.state();
        if let Some(existing) = state
            .salaries
            .iter_mut()
            .find(|s| s.company_id == company_id && s.user_id == user_id && s.period == period)
        {
            existing.extras = extras;
            existing.updated_at = Utc::now();
            return Ok(existing.clone());
        }

        let record = MonthlyUserSalary {
            id: Uuid::new_v4(),
            company_id,
            user_id,
            period,
            extras,
            base_salary_snapshot: None,
            updated_at: Utc::now(),
        };
        state.salaries.push(record.clone());
        Ok(record)
    }

    async fn delete(&self, company_id: CompanyId, id: Uuid) -> DomainResult<bool> {
        let mut state = self.state();
        let before = state.salaries.len();
        state.salaries.retain(|s| !(s.company_id == company_id && s.id == id));
        Ok(state.salaries.len() < before)
    }
}

#[async_trait]
impl OverheadRepository for InMemoryCosts {
    async fn list_for_period(
        &self,
        company_id: CompanyId,
        period: Period,
    ) -> DomainResult<Vec<MonthlyOverheadCost>> {
        Ok(self
            .state()
            .overhead
            .iter()
            .filter(|o| o.company_id == company_id && o.period == period)
            .cloned()
            .collect())
    }

    async fn find_by_id(
        &self,
        company_id: CompanyId,
        id: Uuid,
    ) -> DomainResult<Option<MonthlyOverheadCost>> {
        Ok(self
            .state()
            .overhead
            .iter()
            .find(|o| o.company_id == company_id && o.id == id)
            .cloned())
    }

    async fn insert(&self, item: MonthlyOverheadCost) -> DomainResult<()> {
        self.state().overhead.push(item);
        Ok(())
    }

    async fn update(&self, item: MonthlyOverheadCost) -> DomainResult<()> {
        let mut state = self.state();
        let slot = state
            .overhead
            .iter_mut()
            .find(|o| o.company_id == item.company_id && o.id == item.id)
            .ok_or_else(|| CostCloseError::NotFound(format!("overhead cost {}", item.id)))?;
        *slot = item;
        Ok(())
    }

    async fn delete(&self, company_id: CompanyId, id: Uuid) -> DomainResult<bool> {
        let mut state = self.state();
        let before = state.overhead.len();
        state.overhead.retain(|o| !(o.company_id == company_id && o.id == id));
        Ok(state.overhead.len() < before)
    }
}

#[async_trait]
impl ClosingRepository for InMemoryCosts {
    async fn find(&self, company_id: CompanyId, period: Period) -> DomainResult<Option<MonthlyClosing>> {
        Ok(self
            .state()
            .closings
            .iter()
            .find(|c| c.company_id == company_id && c.period == period)
            .cloned())
    }

    async fn list_distributions(
        &self,
        closing_id: Uuid,
    ) -> DomainResult<Vec<ProjectMonthlyDistribution>> {
        let mut rows: Vec<ProjectMonthlyDistribution> = self
            .state()
            .distributions
            .iter()
            .filter(|d| d.closing_id == closing_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.project_name.cmp(&b.project_name));
        Ok(rows)
    }

    async fn commit_close(&self, commit: CloseCommit) -> DomainResult<MonthlyClosing> {
        let mut state = self.state();

        let current_version = state
            .closings
            .iter()
            .find(|c| c.company_id == commit.company_id && c.period == commit.period)
            .map(|c| c.version);
        if current_version != commit.expected_version {
            return Err(CostCloseError::Conflict(format!(
                "closing {} changed concurrently",
                commit.period
            )));
        }
        if !Self::stamp_matches(&state, &commit) {
            return Err(CostCloseError::Conflict(format!(
                "inputs of {} changed since the preview",
                commit.period
            )));
        }

        for snapshot in &commit.salary_snapshots {
            match state
                .salaries
                .iter_mut()
                .find(|s| s.user_id == snapshot.user_id && s.period == commit.period)
            {
                Some(row) => row.base_salary_snapshot = Some(snapshot.base_salary),
                None => state.salaries.push(MonthlyUserSalary {
                    id: Uuid::new_v4(),
                    company_id: commit.company_id,
                    user_id: snapshot.user_id,
                    period: commit.period,
                    extras: Decimal::ZERO,
                    base_salary_snapshot: Some(snapshot.base_salary),
                    updated_at: commit.closed_at,
                }),
            }
        }

        let existing = state
            .closings
            .iter()
            .position(|c| c.company_id == commit.company_id && c.period == commit.period);
        let closing = MonthlyClosing {
            id: existing.map_or_else(Uuid::new_v4, |idx| state.closings[idx].id),
            company_id: commit.company_id,
            period: commit.period,
            status: ClosingStatus::Closed,
            total_salaries: Some(commit.totals.total_salaries),
            total_overhead: Some(commit.totals.total_overhead),
            total_non_productive: Some(commit.totals.total_non_productive),
            total_revenue: Some(commit.totals.total_revenue),
            closed_by: Some(commit.closed_by),
            closed_at: Some(commit.closed_at),
            reopened_by: None,
            reopened_at: None,
            reopen_reason: None,
            version: current_version.unwrap_or(0) + 1,
            updated_at: commit.closed_at,
        };
        match existing {
            Some(idx) => state.closings[idx] = closing.clone(),
            None => state.closings.push(closing.clone()),
        }

        state.distributions.retain(|d| d.closing_id != closing.id);
        for line in commit.distributions {
            state.distributions.push(ProjectMonthlyDistribution {
                id: Uuid::new_v4(),
                closing_id: closing.id,
                project_id: line.project_id,
                project_name: line.project_name,
                project_revenue: line.project_revenue,
                revenue_share_percent: line.revenue_share_percent,
                distributed_salaries: line.distributed_salaries,
                distributed_overhead: line.distributed_overhead,
                distributed_non_productive: line.distributed_non_productive,
                total_distributed: line.total_distributed,
            });
        }

        Ok(closing)
    }

    async fn reopen(&self, record: ReopenRecord) -> DomainResult<MonthlyClosing> {
        let mut state = self.state();
        let closing = state
            .closings
            .iter_mut()
            .find(|c| c.company_id == record.company_id && c.period == record.period)
            .ok_or_else(|| CostCloseError::NotFound(format!("no closing for {}", record.period)))?;
        if closing.version != record.expected_version {
            return Err(CostCloseError::Conflict(format!(
                "closing {} changed concurrently",
                record.period
            )));
        }

        closing.status = ClosingStatus::Reopened;
        closing.reopened_by = Some(record.reopened_by);
        closing.reopened_at = Some(record.reopened_at);
        closing.reopen_reason = Some(record.reason);
        closing.version += 1;
        closing.updated_at = record.reopened_at;
        Ok(closing.clone())
    }
}
