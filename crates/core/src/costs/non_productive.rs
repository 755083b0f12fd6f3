//! Cost of non-productive time.
//!
//! Two sources: hours logged on projects of the "No productivos" category,
//! and the whole salary of salaried users who logged no hours at all.

use std::collections::HashSet;

use costclose_domain::constants::NON_PRODUCTIVE_CATEGORY;
use costclose_domain::money::round_money;
use costclose_domain::{
    NonProductiveBreakdown, Project, ProjectCategory, ProjectId, TimeEntry,
};
use rust_decimal::Decimal;

use super::cost_hour::CostHourMap;

/// The company's non-productive category, if it has one. Matched by exact
/// name.
pub fn non_productive_category(categories: &[ProjectCategory]) -> Option<&ProjectCategory> {
    categories.iter().find(|c| c.name == NON_PRODUCTIVE_CATEGORY)
}

/// Ids of every project filed under the non-productive category.
pub fn non_productive_project_ids(
    category: Option<&ProjectCategory>,
    projects: &[Project],
) -> HashSet<ProjectId> {
    let category_id = category.map(|c| c.id);
    projects.iter().filter(|p| p.in_category(category_id)).map(|p| p.id).collect()
}

/// Cost of hours on non-productive projects plus the salary of salaried
/// users with no hours, rounded to cents.
pub fn non_productive_cost(
    non_productive_projects: &HashSet<ProjectId>,
    entries: &[TimeEntry],
    cost_hours: &CostHourMap,
) -> NonProductiveBreakdown {
    let hours_cost: Decimal = entries
        .iter()
        .filter(|e| e.counts_as_worked())
        .filter(|e| e.project_id.is_some_and(|id| non_productive_projects.contains(&id)))
        .filter_map(|e| cost_hours.get(&e.user_id).map(|line| e.hours() * line.cost_hour))
        .sum();

    let idle_salaries: Decimal = cost_hours
        .values()
        .filter(|line| !line.has_hours && line.total_salary > Decimal::ZERO)
        .map(|line| line.total_salary)
        .sum();

    NonProductiveBreakdown {
        hours_cost: round_money(hours_cost),
        idle_salaries: round_money(idle_salaries),
        total: round_money(hours_cost + idle_salaries),
    }
}
