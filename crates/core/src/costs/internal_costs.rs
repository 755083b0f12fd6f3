//! Live-mode internal cost per project, outside of closing.

use std::collections::HashMap;
use std::sync::Arc;

use costclose_domain::{CompanyId, Period, ProjectInternalCost, ProjectScope, Result, UserId};
use rust_decimal::Decimal;
use tracing::instrument;

use super::ports::CostInputsRepository;
use super::project_costs::{hours_by_project, internal_costs_by_project, CostRates};

/// Live internal cost of projects, recomputed on every request.
pub struct InternalCostService {
    inputs: Arc<dyn CostInputsRepository>,
}

impl InternalCostService {
    pub fn new(inputs: Arc<dyn CostInputsRepository>) -> Self {
        Self { inputs }
    }

    /// Hours and cost at each user's current hourly rate, for every visible
    /// project with logged time, in project-name order.
    #[instrument(skip(self, scope), fields(%company_id, %period))]
    pub async fn for_month(
        &self,
        company_id: CompanyId,
        period: Period,
        scope: &ProjectScope,
    ) -> Result<Vec<ProjectInternalCost>> {
        let (users, projects, entries) = tokio::try_join!(
            self.inputs.list_users(company_id),
            self.inputs.list_projects(company_id),
            self.inputs.list_time_entries(company_id, period.range()),
        )?;

        let rates: HashMap<UserId, Decimal> =
            users.iter().filter_map(|u| u.hourly_cost.map(|rate| (u.id, rate))).collect();
        let costs = internal_costs_by_project(&entries, &rates, CostRates::Live);
        let hours = hours_by_project(&entries);

        let mut lines: Vec<ProjectInternalCost> = projects
            .into_iter()
            .filter(|p| scope.allows(&p.id) && hours.contains_key(&p.id))
            .map(|p| ProjectInternalCost {
                internal_cost: costs.get(&p.id).copied().unwrap_or_default(),
                total_hours: hours.get(&p.id).copied().unwrap_or_default().round_dp(2),
                project_id: p.id,
                project_name: p.name,
            })
            .collect();
        lines.sort_by(|a, b| a.project_name.cmp(&b.project_name));
        Ok(lines)
    }
}
