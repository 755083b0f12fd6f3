//! Conditions that block closing a month.

use std::collections::HashMap;

use costclose_domain::{Project, ProjectId, User, ValidationError};
use rust_decimal::Decimal;

/// Collect every blocking condition, never stopping at the first.
///
/// `members` are the active non-guest users in name order; `projects` are
/// the productive active projects in plan order; `revenues` holds the
/// recorded actual revenues only.
///
/// Order of the result: missing salaries, no active projects, missing
/// revenues, zero revenue.
pub fn validate_month(
    members: &[&User],
    projects: &[&Project],
    revenues: &HashMap<ProjectId, Decimal>,
) -> Vec<ValidationError> {
    let mut errors: Vec<ValidationError> = members
        .iter()
        .filter(|user| user.salary.is_none())
        .map(|user| ValidationError::missing_salary(user.id, &user.name))
        .collect();

    if projects.is_empty() {
        errors.push(ValidationError::no_active_projects());
        return errors;
    }

    errors.extend(
        projects
            .iter()
            .filter(|project| !revenues.contains_key(&project.id))
            .map(|project| ValidationError::missing_revenue(project.id, &project.name)),
    );

    let recorded: Vec<Decimal> =
        projects.iter().filter_map(|project| revenues.get(&project.id).copied()).collect();
    if !recorded.is_empty() && recorded.iter().copied().sum::<Decimal>().is_zero() {
        errors.push(ValidationError::zero_revenue());
    }

    errors
}
