//! Overhead line items.

use std::sync::Arc;

use chrono::Utc;
use costclose_domain::{
    Actor, CompanyId, CostCloseError, MonthlyOverheadCost, NewOverheadCost, OverheadCostPatch,
    Period, Result, WithWarning,
};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

use super::closing::{ClosingService, ReopenCause};
use super::locks::{PeriodGuard, PeriodLocks};
use super::ports::OverheadRepository;

/// Overhead line items per company month.
pub struct OverheadService {
    overhead: Arc<dyn OverheadRepository>,
    closing: Arc<ClosingService>,
    locks: Arc<PeriodLocks>,
}

impl OverheadService {
    pub fn new(
        overhead: Arc<dyn OverheadRepository>,
        closing: Arc<ClosingService>,
        locks: Arc<PeriodLocks>,
    ) -> Self {
        Self { overhead, closing, locks }
    }

    /// Items of one month.
    pub async fn list(&self, company_id: CompanyId, period: Period) -> Result<Vec<MonthlyOverheadCost>> {
        self.overhead.list_for_period(company_id, period).await
    }

    /// Validate and insert an item, reopening its month if closed.
    #[instrument(skip(self, actor, input), fields(company_id = %actor.company_id))]
    pub async fn create(
        &self,
        actor: &Actor,
        input: NewOverheadCost,
    ) -> Result<WithWarning<MonthlyOverheadCost>> {
        let period = Period::new(input.year, input.month)?;
        let item = MonthlyOverheadCost {
            id: Uuid::now_v7(),
            company_id: actor.company_id,
            period,
            concept: input.concept.trim().to_string(),
            amount: input.amount,
            date: input.date,
            created_by: actor.user_id,
            updated_at: Utc::now(),
        };
        validate_item(&item)?;

        let guard = self.locks.lock(actor.company_id, period).await;
        self.overhead.insert(item.clone()).await?;
        let warning = self.reopen_if_closed(&[guard], actor).await?;

        info!(overhead_id = %item.id, %period, amount = %item.amount, "overhead created");
        Ok(WithWarning::new(item, warning))
    }

    /// Apply a partial update. Moving the item to another month reopens
    /// both months if they were closed, and drops a stale date unless the
    /// patch carries a new one.
    #[instrument(skip(self, actor, patch), fields(company_id = %actor.company_id, %id))]
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: OverheadCostPatch,
    ) -> Result<WithWarning<MonthlyOverheadCost>> {
        let existing = self.find(actor.company_id, id).await?;
        if patch.is_empty() {
            return Ok(WithWarning::new(existing, None));
        }

        let period = Period::new(
            patch.year.unwrap_or(existing.period.year),
            patch.month.unwrap_or(existing.period.month),
        )?;
        let date = match patch.date {
            Some(date) => Some(date),
            None if period == existing.period => existing.date,
            None => None,
        };
        let updated = MonthlyOverheadCost {
            period,
            concept: patch.concept.map_or(existing.concept.clone(), |c| c.trim().to_string()),
            amount: patch.amount.unwrap_or(existing.amount),
            date,
            updated_at: Utc::now(),
            ..existing.clone()
        };
        validate_item(&updated)?;

        let guards = self.locks.lock_pair(actor.company_id, existing.period, period).await;
        self.overhead.update(updated.clone()).await?;
        let warning = self.reopen_if_closed(&guards, actor).await?;

        info!(
            from = %existing.period,
            to = %period,
            reopened = warning.is_some(),
            "overhead updated"
        );
        Ok(WithWarning::new(updated, warning))
    }

    /// Remove an item. Returns the reopen warning, if any.
    #[instrument(skip(self, actor), fields(company_id = %actor.company_id, %id))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<Option<String>> {
        let existing = self.find(actor.company_id, id).await?;

        let guard = self.locks.lock(actor.company_id, existing.period).await;
        if !self.overhead.delete(actor.company_id, id).await? {
            return Err(CostCloseError::NotFound(format!("overhead cost {id}")));
        }
        let warning = self.reopen_if_closed(&[guard], actor).await?;

        info!(period = %existing.period, reopened = warning.is_some(), "overhead deleted");
        Ok(warning)
    }

    async fn find(&self, company_id: CompanyId, id: Uuid) -> Result<MonthlyOverheadCost> {
        self.overhead
            .find_by_id(company_id, id)
            .await?
            .ok_or_else(|| CostCloseError::NotFound(format!("overhead cost {id}")))
    }

    async fn reopen_if_closed(
        &self,
        guards: &[PeriodGuard],
        actor: &Actor,
    ) -> Result<Option<String>> {
        let mut warning = None;
        for guard in guards {
            if let Some(w) =
                self.closing.on_inputs_changed(guard, actor.user_id, ReopenCause::Overhead).await?
            {
                warning = Some(w);
            }
        }
        Ok(warning)
    }
}

fn validate_item(item: &MonthlyOverheadCost) -> Result<()> {
    if item.concept.is_empty() {
        return Err(CostCloseError::InvalidInput("concept is required".to_string()));
    }
    if item.amount < Decimal::ZERO {
        return Err(CostCloseError::InvalidInput("amount cannot be negative".to_string()));
    }
    if let Some(date) = item.date {
        if !item.period.contains_date(date) {
            return Err(CostCloseError::InvalidInput(format!(
                "date {date} is outside {}",
                item.period
            )));
        }
    }
    Ok(())
}
