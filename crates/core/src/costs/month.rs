//! One month's computation, from raw inputs to a would-be closing.

use std::collections::HashMap;

use costclose_domain::money::round_money;
use costclose_domain::{
    ClosingTotals, DistributionLine, InputsStamp, MonthlyOverheadCost, MonthlyUserSalary,
    NonProductiveBreakdown, Period, Project, ProjectCategory, ProjectId, ProjectMonthlyRevenue,
    RevenueStamp, SalarySnapshot, SalaryStamp, TimeEntry, User, UserCostLine, UserId,
    ValidationError,
};
use rust_decimal::Decimal;

use super::cost_hour::monthly_cost_hours;
use super::distribution::{plan_distribution, sort_plan_projects, CostPools, PlanProject};
use super::non_productive::{non_productive_category, non_productive_cost, non_productive_project_ids};
use super::project_costs::{internal_costs_by_project, CostRates};
use super::validation::validate_month;

/// Everything read from storage for a month.
#[derive(Debug, Clone, Default)]
pub struct MonthInputs {
    pub users: Vec<User>,
    pub projects: Vec<Project>,
    pub categories: Vec<ProjectCategory>,
    /// Already restricted to the month.
    pub entries: Vec<TimeEntry>,
    pub revenues: Vec<ProjectMonthlyRevenue>,
    pub salaries: Vec<MonthlyUserSalary>,
    pub overhead: Vec<MonthlyOverheadCost>,
}

/// Result of running the engine over a month. Nothing persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthComputation {
    pub period: Period,
    pub errors: Vec<ValidationError>,
    pub totals: ClosingTotals,
    pub non_productive: NonProductiveBreakdown,
    /// Name order.
    pub users: Vec<UserCostLine>,
    /// Plan order.
    pub distributions: Vec<DistributionLine>,
    pub salary_snapshots: Vec<SalarySnapshot>,
    pub stamp: InputsStamp,
}

impl MonthComputation {
    /// No blocking validation errors.
    pub fn can_close(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Active, non-guest, non-deleted users in name order.
pub fn active_members(users: &[User]) -> Vec<&User> {
    let mut members: Vec<&User> = users.iter().filter(|u| u.is_active_member()).collect();
    members.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    members
}

/// Run validation, cost hours, non-productive cost and distribution over
/// one month.
pub fn compute_month(period: Period, inputs: &MonthInputs) -> MonthComputation {
    let extras: HashMap<UserId, Decimal> =
        inputs.salaries.iter().map(|s| (s.user_id, s.extras)).collect();
    let actual_revenues: HashMap<ProjectId, Decimal> = inputs
        .revenues
        .iter()
        .filter_map(|r| r.actual_revenue.map(|amount| (r.project_id, amount)))
        .collect();
    let live_rates: HashMap<UserId, Decimal> = inputs
        .users
        .iter()
        .filter_map(|u| u.hourly_cost.map(|rate| (u.id, rate)))
        .collect();

    // Cost per hour and the non-productive pool
    let cost_hours = monthly_cost_hours(&inputs.users, &extras, &inputs.entries);
    let category = non_productive_category(&inputs.categories);
    let non_productive_ids = non_productive_project_ids(category, &inputs.projects);
    let non_productive = non_productive_cost(&non_productive_ids, &inputs.entries, &cost_hours);

    // Pools
    let members = active_members(&inputs.users);
    let salaried: Vec<&User> = members.iter().copied().filter(|u| u.salary.is_some()).collect();
    let total_salaries = round_money(
        salaried
            .iter()
            .map(|u| u.salary.unwrap_or_default() + extras.get(&u.id).copied().unwrap_or_default())
            .sum(),
    );
    let total_overhead = round_money(inputs.overhead.iter().map(|o| o.amount).sum());

    // Productive projects in plan order
    let mut plan_projects: Vec<PlanProject> = inputs
        .projects
        .iter()
        .filter(|p| p.is_active && !non_productive_ids.contains(&p.id))
        .map(|p| PlanProject {
            project_id: p.id,
            project_name: p.name.clone(),
            revenue: actual_revenues.get(&p.id).copied().unwrap_or_default(),
        })
        .collect();
    sort_plan_projects(&mut plan_projects);

    let projects_by_id: HashMap<ProjectId, &Project> =
        inputs.projects.iter().map(|p| (p.id, p)).collect();
    let productive: Vec<&Project> =
        plan_projects.iter().filter_map(|p| projects_by_id.get(&p.project_id).copied()).collect();

    let errors = validate_month(&members, &productive, &actual_revenues);

    let pools = CostPools {
        salaries: total_salaries,
        overhead: total_overhead,
        non_productive: non_productive.total,
    };
    let plan = plan_distribution(pools, &plan_projects);
    let internal = internal_costs_by_project(
        &inputs.entries,
        &live_rates,
        CostRates::Monthly(&cost_hours),
    );

    let distributions = plan
        .shares
        .into_iter()
        .map(|share| DistributionLine {
            internal_cost: internal.get(&share.project_id).copied().unwrap_or_default(),
            project_id: share.project_id,
            project_name: share.project_name,
            project_revenue: share.project_revenue,
            revenue_share_percent: share.revenue_share_percent,
            distributed_salaries: share.distributed_salaries,
            distributed_overhead: share.distributed_overhead,
            distributed_non_productive: share.distributed_non_productive,
            total_distributed: share.total_distributed,
        })
        .collect();

    let names: HashMap<UserId, &str> = inputs.users.iter().map(|u| (u.id, u.name.as_str())).collect();
    let mut users: Vec<UserCostLine> = cost_hours
        .iter()
        .map(|(user_id, line)| UserCostLine {
            user_id: *user_id,
            user_name: names.get(user_id).copied().unwrap_or_default().to_string(),
            total_salary: round_money(line.total_salary),
            total_hours: round_money(line.total_hours),
            cost_hour: round_money(line.cost_hour),
            has_hours: line.has_hours,
        })
        .collect();
    users.sort_by(|a, b| a.user_name.cmp(&b.user_name).then_with(|| a.user_id.cmp(&b.user_id)));

    let salary_snapshots = salaried
        .iter()
        .filter_map(|u| u.salary.map(|base_salary| SalarySnapshot { user_id: u.id, base_salary }))
        .collect();

    let stamp = InputsStamp {
        revenues: plan_projects
            .iter()
            .map(|p| RevenueStamp {
                project_id: p.project_id,
                actual_revenue: actual_revenues.get(&p.project_id).copied(),
            })
            .collect(),
        overhead_total: total_overhead,
        salaries: members
            .iter()
            .map(|u| SalaryStamp {
                user_id: u.id,
                base_salary: u.salary,
                extras: extras.get(&u.id).copied().unwrap_or_default(),
            })
            .collect(),
    };

    MonthComputation {
        period,
        errors,
        totals: ClosingTotals {
            total_salaries,
            total_overhead,
            total_non_productive: non_productive.total,
            total_revenue: plan.total_revenue,
        },
        non_productive,
        users,
        distributions,
        salary_snapshots,
        stamp,
    }
}
