//! Closing service - the month lifecycle
//!
//! OPEN (no row) → CLOSED → REOPENED → CLOSED … Transitions go through
//! [`ClosingStatus::apply`]; this service loads inputs, runs the engine and
//! persists through the closing port.

use std::sync::Arc;

use chrono::Utc;
use costclose_domain::constants::{
    OVERHEAD_CHANGED_REOPEN_REASON, REOPENED_WARNING, SALARY_CHANGED_REOPEN_REASON,
};
use costclose_domain::{
    Actor, CloseCommit, ClosingEvent, ClosingPreview, ClosingStatus, ClosingView, CompanyId,
    CostCloseError, MonthlyClosing, Period, ProjectScope, ReopenRecord, Result, UserId,
};
use tracing::{debug, info, instrument, warn};

use super::locks::{PeriodGuard, PeriodLocks};
use super::month::{compute_month, MonthComputation, MonthInputs};
use super::ports::{ClosingRepository, CostInputsRepository, OverheadRepository, SalaryRepository};

/// Which kind of input edit triggered an implicit reopen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReopenCause {
    Salary,
    Overhead,
}

impl ReopenCause {
    fn reason(self) -> &'static str {
        match self {
            Self::Salary => SALARY_CHANGED_REOPEN_REASON,
            Self::Overhead => OVERHEAD_CHANGED_REOPEN_REASON,
        }
    }
}

/// Preview, close and reopen of company months.
pub struct ClosingService {
    inputs: Arc<dyn CostInputsRepository>,
    salaries: Arc<dyn SalaryRepository>,
    overhead: Arc<dyn OverheadRepository>,
    closings: Arc<dyn ClosingRepository>,
    locks: Arc<PeriodLocks>,
}

impl ClosingService {
    /// Wire the service to its repositories and the shared period locks.
    pub fn new(
        inputs: Arc<dyn CostInputsRepository>,
        salaries: Arc<dyn SalaryRepository>,
        overhead: Arc<dyn OverheadRepository>,
        closings: Arc<dyn ClosingRepository>,
        locks: Arc<PeriodLocks>,
    ) -> Self {
        Self { inputs, salaries, overhead, closings, locks }
    }

    /// Current status, `Open` when the month was never closed.
    pub async fn current_status(
        &self,
        company_id: CompanyId,
        period: Period,
    ) -> Result<ClosingStatus> {
        Ok(self.closings.find(company_id, period).await?.map(|c| c.status).unwrap_or_default())
    }

    /// Closing row and its persisted distributions, filtered to the projects
    /// the caller may see.
    #[instrument(skip(self, scope), fields(%company_id, %period))]
    pub async fn status(
        &self,
        company_id: CompanyId,
        period: Period,
        scope: &ProjectScope,
    ) -> Result<ClosingView> {
        match self.closings.find(company_id, period).await? {
            Some(closing) => self.view(closing, scope).await,
            None => Ok(ClosingView::open(period)),
        }
    }

    /// Dry run of a close: validation, totals and would-be distributions.
    /// Totals cover every project; rows are filtered by scope.
    #[instrument(skip(self, scope), fields(%company_id, %period))]
    pub async fn preview(
        &self,
        company_id: CompanyId,
        period: Period,
        scope: &ProjectScope,
    ) -> Result<ClosingPreview> {
        let (status, month) = tokio::try_join!(
            self.current_status(company_id, period),
            self.compute(company_id, period)
        )?;

        let can_close = month.can_close();
        Ok(ClosingPreview {
            period,
            status,
            can_close,
            errors: month.errors,
            totals: month.totals,
            non_productive: month.non_productive,
            users: month.users,
            distributions: month
                .distributions
                .into_iter()
                .filter(|line| scope.allows(&line.project_id))
                .collect(),
        })
    }

    /// Validate, snapshot and persist the month's distribution.
    ///
    /// # Errors
    /// - `InvalidInput` if the month is already closed
    /// - `ClosingBlocked` with every validation error; nothing is written
    /// - `Conflict` if the closing row or its inputs changed under us
    #[instrument(skip(self, actor), fields(company_id = %actor.company_id, %period, user_id = %actor.user_id))]
    pub async fn close(&self, actor: &Actor, period: Period) -> Result<ClosingView> {
        let _guard = self.locks.lock(actor.company_id, period).await;

        let existing = self.closings.find(actor.company_id, period).await?;
        let status = existing.as_ref().map(|c| c.status).unwrap_or_default();
        status.apply(ClosingEvent::Close)?;

        let month = self.compute(actor.company_id, period).await?;
        if !month.can_close() {
            warn!(errors = month.errors.len(), "close blocked by validation");
            return Err(CostCloseError::ClosingBlocked {
                message: "The month cannot be closed until every validation error is resolved"
                    .to_string(),
                errors: month.errors,
            });
        }

        debug!(
            total_salaries = %month.totals.total_salaries,
            total_overhead = %month.totals.total_overhead,
            total_non_productive = %month.totals.total_non_productive,
            total_revenue = %month.totals.total_revenue,
            projects = month.distributions.len(),
            "committing close"
        );

        let commit = CloseCommit {
            company_id: actor.company_id,
            period,
            expected_version: existing.as_ref().map(|c| c.version),
            totals: month.totals,
            closed_by: actor.user_id,
            closed_at: Utc::now(),
            salary_snapshots: month.salary_snapshots,
            distributions: month.distributions,
            stamp: month.stamp,
        };
        let closing = self.closings.commit_close(commit).await.inspect_err(|err| {
            if matches!(err, CostCloseError::Conflict(_)) {
                warn!(error = %err, "close lost a race; nothing written");
            }
        })?;

        info!(from = %status, version = closing.version, "month closed");
        self.view(closing, &actor.scope).await
    }

    /// Explicit reopen with a user-supplied reason.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank reason or an OPEN month
    /// - `NotFound` if the month was never closed
    #[instrument(skip(self, actor, reason), fields(company_id = %actor.company_id, %period, user_id = %actor.user_id))]
    pub async fn reopen(&self, actor: &Actor, period: Period, reason: &str) -> Result<ClosingView> {
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CostCloseError::InvalidInput("a reopen reason is required".to_string()));
        }

        let _guard = self.locks.lock(actor.company_id, period).await;

        let existing = self
            .closings
            .find(actor.company_id, period)
            .await?
            .ok_or_else(|| CostCloseError::NotFound(format!("no closing for {period}")))?;
        existing.status.apply(ClosingEvent::Reopen)?;

        let closing = self
            .closings
            .reopen(ReopenRecord {
                company_id: actor.company_id,
                period,
                expected_version: existing.version,
                reopened_by: actor.user_id,
                reopened_at: Utc::now(),
                reason: reason.to_string(),
            })
            .await?;

        info!(from = %existing.status, version = closing.version, "month reopened");
        self.view(closing, &actor.scope).await
    }

    /// Implicit reopen after salary or overhead data of a month changed.
    ///
    /// The caller must hold the period lock; the guard names the month.
    /// Returns the warning to surface when a CLOSED month was reopened.
    #[instrument(skip(self, guard), fields(company_id = %guard.company_id(), period = %guard.period(), ?cause))]
    pub async fn on_inputs_changed(
        &self,
        guard: &PeriodGuard,
        changed_by: UserId,
        cause: ReopenCause,
    ) -> Result<Option<String>> {
        let Some(existing) = self.closings.find(guard.company_id(), guard.period()).await? else {
            return Ok(None);
        };

        let next = existing.status.apply(ClosingEvent::InputsChanged)?;
        if next == existing.status {
            return Ok(None);
        }

        let closing = self
            .closings
            .reopen(ReopenRecord {
                company_id: guard.company_id(),
                period: guard.period(),
                expected_version: existing.version,
                reopened_by: changed_by,
                reopened_at: Utc::now(),
                reason: cause.reason().to_string(),
            })
            .await?;

        info!(version = closing.version, "closed month reopened by input change");
        Ok(Some(REOPENED_WARNING.to_string()))
    }

    async fn compute(&self, company_id: CompanyId, period: Period) -> Result<MonthComputation> {
        let inputs = self.load_inputs(company_id, period).await?;
        Ok(compute_month(period, &inputs))
    }

    async fn load_inputs(&self, company_id: CompanyId, period: Period) -> Result<MonthInputs> {
        let (users, projects, categories, entries, revenues, salaries, overhead) = tokio::try_join!(
            self.inputs.list_users(company_id),
            self.inputs.list_projects(company_id),
            self.inputs.list_categories(company_id),
            self.inputs.list_time_entries(company_id, period.range()),
            self.inputs.list_revenues(company_id, period),
            self.salaries.list_for_period(company_id, period),
            self.overhead.list_for_period(company_id, period),
        )?;

        debug!(
            users = users.len(),
            projects = projects.len(),
            entries = entries.len(),
            "month inputs loaded"
        );
        Ok(MonthInputs { users, projects, categories, entries, revenues, salaries, overhead })
    }

    async fn view(&self, closing: MonthlyClosing, scope: &ProjectScope) -> Result<ClosingView> {
        let distributions = self
            .closings
            .list_distributions(closing.id)
            .await?
            .into_iter()
            .filter(|row| scope.allows(&row.project_id))
            .collect();

        Ok(ClosingView {
            period: closing.period,
            status: closing.status,
            closing: Some(closing),
            distributions,
        })
    }
}
