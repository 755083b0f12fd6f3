//! Monthly salary extras and the salary view of a month.

use std::collections::HashMap;
use std::sync::Arc;

use costclose_domain::{
    Actor, CompanyId, CostCloseError, MonthlyUserSalary, Period, Result, SalaryLine, UserId,
    WithWarning,
};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use super::closing::{ClosingService, ReopenCause};
use super::locks::PeriodLocks;
use super::month::active_members;
use super::ports::{CostInputsRepository, SalaryRepository};

/// Salary extras per user and month.
pub struct MonthlySalaryService {
    inputs: Arc<dyn CostInputsRepository>,
    salaries: Arc<dyn SalaryRepository>,
    closing: Arc<ClosingService>,
    locks: Arc<PeriodLocks>,
}

impl MonthlySalaryService {
    pub fn new(
        inputs: Arc<dyn CostInputsRepository>,
        salaries: Arc<dyn SalaryRepository>,
        closing: Arc<ClosingService>,
        locks: Arc<PeriodLocks>,
    ) -> Self {
        Self { inputs, salaries, closing, locks }
    }

    /// One line per active non-guest user, in name order.
    ///
    /// In a CLOSED month the base salary is the close-time snapshot when one
    /// exists; otherwise it is the user's live salary.
    #[instrument(skip(self), fields(%company_id, %period))]
    pub async fn list(&self, company_id: CompanyId, period: Period) -> Result<Vec<SalaryLine>> {
        let (users, records, status) = tokio::try_join!(
            self.inputs.list_users(company_id),
            self.salaries.list_for_period(company_id, period),
            self.closing.current_status(company_id, period),
        )?;
        let by_user: HashMap<UserId, &MonthlyUserSalary> =
            records.iter().map(|r| (r.user_id, r)).collect();

        Ok(active_members(&users)
            .into_iter()
            .map(|user| {
                let record = by_user.get(&user.id);
                let snapshot = record
                    .and_then(|r| r.base_salary_snapshot)
                    .filter(|_| status.is_closed());
                let base_salary = snapshot.or(user.salary);
                let extras = record.map(|r| r.extras).unwrap_or_default();

                SalaryLine {
                    user_id: user.id,
                    user_name: user.name.clone(),
                    salary_id: record.map(|r| r.id),
                    base_salary,
                    extras,
                    total_salary: base_salary.unwrap_or_default() + extras,
                    from_snapshot: snapshot.is_some(),
                }
            })
            .collect())
    }

    /// Set a user's extras for the month. Reopens the month if it was closed.
    #[instrument(skip(self, actor), fields(company_id = %actor.company_id, %user_id, %period))]
    pub async fn upsert_extras(
        &self,
        actor: &Actor,
        user_id: UserId,
        period: Period,
        extras: Decimal,
    ) -> Result<WithWarning<MonthlyUserSalary>> {
        if extras < Decimal::ZERO {
            return Err(CostCloseError::InvalidInput("extras cannot be negative".to_string()));
        }

        let user = self
            .inputs
            .find_user(actor.company_id, user_id)
            .await?
            .filter(|u| !u.is_deleted())
            .ok_or_else(|| CostCloseError::NotFound(format!("user {user_id}")))?;
        if user.is_guest() {
            return Err(CostCloseError::InvalidInput(
                "guests do not have salary records".to_string(),
            ));
        }

        let guard = self.locks.lock(actor.company_id, period).await;
        let record = self.salaries.upsert_extras(actor.company_id, user_id, period, extras).await?;
        let warning =
            self.closing.on_inputs_changed(&guard, actor.user_id, ReopenCause::Salary).await?;

        info!(salary_id = %record.id, %extras, reopened = warning.is_some(), "salary extras saved");
        Ok(WithWarning::new(record, warning))
    }

    /// Remove a monthly salary record. Reopens the month if it was closed.
    #[instrument(skip(self, actor), fields(company_id = %actor.company_id, %id))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<Option<String>> {
        let record = self
            .salaries
            .find_by_id(actor.company_id, id)
            .await?
            .ok_or_else(|| CostCloseError::NotFound(format!("monthly salary {id}")))?;

        let guard = self.locks.lock(actor.company_id, record.period).await;
        if !self.salaries.delete(actor.company_id, id).await? {
            return Err(CostCloseError::NotFound(format!("monthly salary {id}")));
        }
        let warning =
            self.closing.on_inputs_changed(&guard, actor.user_id, ReopenCause::Salary).await?;

        info!(period = %record.period, reopened = warning.is_some(), "salary record deleted");
        Ok(warning)
    }
}
