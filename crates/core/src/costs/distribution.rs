//! Revenue-weighted allocation of the month's cost pools to projects.
//!
//! Each pool (salaries, overhead, non-productive) is spread independently
//! with the same weights: a project's share of total actual revenue, or an
//! equal split when total revenue is zero. Amounts are rounded to cents per
//! project and the rounding residual of each pool is booked on the project
//! with the largest share, so every pool adds up exactly.

use std::cmp::Ordering;

use costclose_domain::money::{equal_share_percent, percent_of, round_money, share_percent};
use costclose_domain::ProjectId;
use rust_decimal::Decimal;

/// A productive project entering the plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanProject {
    pub project_id: ProjectId,
    pub project_name: String,
    /// Actual revenue, zero when unset.
    pub revenue: Decimal,
}

/// The three amounts to spread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CostPools {
    pub salaries: Decimal,
    pub overhead: Decimal,
    pub non_productive: Decimal,
}

/// Allocation to one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedShare {
    pub project_id: ProjectId,
    pub project_name: String,
    pub project_revenue: Decimal,
    /// Rounded to two decimals for storage; amounts use the exact share.
    pub revenue_share_percent: Decimal,
    pub distributed_salaries: Decimal,
    pub distributed_overhead: Decimal,
    pub distributed_non_productive: Decimal,
    pub total_distributed: Decimal,
}

/// Shares of every planned project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistributionPlan {
    pub total_revenue: Decimal,
    /// Ordered by project name, then id.
    pub shares: Vec<PlannedShare>,
}

/// Plan order: project name, then id.
pub fn sort_plan_projects(projects: &mut [PlanProject]) {
    projects.sort_by(|a, b| {
        a.project_name.cmp(&b.project_name).then_with(|| a.project_id.cmp(&b.project_id))
    });
}

/// Spread each pool over `projects` by revenue weight, booking the cent
/// residual on the largest share.
pub fn plan_distribution(pools: CostPools, projects: &[PlanProject]) -> DistributionPlan {
    if projects.is_empty() {
        return DistributionPlan::default();
    }

    let mut ordered = projects.to_vec();
    sort_plan_projects(&mut ordered);

    let total_revenue: Decimal = ordered.iter().map(|p| p.revenue).sum();
    let weights: Vec<Decimal> = if total_revenue > Decimal::ZERO {
        ordered.iter().map(|p| share_percent(p.revenue, total_revenue)).collect()
    } else {
        vec![equal_share_percent(ordered.len()); ordered.len()]
    };
    let anchor = largest_share_index(&weights);

    let salaries = spread(pools.salaries, &weights, anchor);
    let overhead = spread(pools.overhead, &weights, anchor);
    let non_productive = spread(pools.non_productive, &weights, anchor);

    let shares = ordered
        .into_iter()
        .enumerate()
        .map(|(i, project)| PlannedShare {
            project_id: project.project_id,
            project_name: project.project_name,
            project_revenue: project.revenue,
            revenue_share_percent: round_money(weights[i]),
            distributed_salaries: salaries[i],
            distributed_overhead: overhead[i],
            distributed_non_productive: non_productive[i],
            total_distributed: round_money(salaries[i] + overhead[i] + non_productive[i]),
        })
        .collect();

    DistributionPlan { total_revenue, shares }
}

/// Index of the largest weight; the first one wins ties.
fn largest_share_index(weights: &[Decimal]) -> usize {
    weights
        .iter()
        .enumerate()
        .fold(None::<(usize, Decimal)>, |best, (i, &w)| match best {
            Some((_, top)) if w.cmp(&top) != Ordering::Greater => best,
            _ => Some((i, w)),
        })
        .map_or(0, |(i, _)| i)
}

fn spread(pool: Decimal, weights: &[Decimal], anchor: usize) -> Vec<Decimal> {
    let mut amounts: Vec<Decimal> =
        weights.iter().map(|&w| round_money(percent_of(pool, w))).collect();

    let residual = round_money(pool) - amounts.iter().copied().sum::<Decimal>();
    if !residual.is_zero() {
        if let Some(slot) = amounts.get_mut(anchor) {
            *slot += residual;
        }
    }
    amounts
}
