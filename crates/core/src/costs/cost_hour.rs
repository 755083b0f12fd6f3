//! Monthly cost per hour of each salaried user.

use std::collections::HashMap;

use costclose_domain::money::minutes_to_hours;
use costclose_domain::{TimeEntry, User, UserId};
use rust_decimal::Decimal;

/// Cost-hour figures for one user and month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserCostHour {
    /// `total_salary / total_hours`, unrounded; zero without hours.
    pub cost_hour: Decimal,
    /// Hours from WORK and PAUSE_COFFEE entries.
    pub total_hours: Decimal,
    /// Base salary plus the month's extras.
    pub total_salary: Decimal,
    /// Whether the user logged any worked minutes.
    pub has_hours: bool,
}

/// Cost-hour figures keyed by user.
pub type CostHourMap = HashMap<UserId, UserCostHour>;

/// Worked minutes (WORK and PAUSE_COFFEE) per user.
pub fn worked_minutes_by_user(entries: &[TimeEntry]) -> HashMap<UserId, i64> {
    let mut minutes: HashMap<UserId, i64> = HashMap::new();
    for entry in entries.iter().filter(|e| e.counts_as_worked()) {
        *minutes.entry(entry.user_id).or_default() += entry.duration_minutes;
    }
    minutes
}

/// Build the cost-hour map for the month.
///
/// Every non-guest, non-deleted user is considered, active or not. Users
/// whose salary plus extras is zero are left out. `entries` must already be
/// restricted to the month.
pub fn monthly_cost_hours(
    users: &[User],
    extras: &HashMap<UserId, Decimal>,
    entries: &[TimeEntry],
) -> CostHourMap {
    let minutes = worked_minutes_by_user(entries);

    users
        .iter()
        .filter(|user| user.counts_for_cost_hour())
        .filter_map(|user| {
            let base_salary = user.salary.unwrap_or_default();
            let user_extras = extras.get(&user.id).copied().unwrap_or_default();
            let total_salary = base_salary + user_extras;
            if total_salary.is_zero() {
                return None;
            }

            let total_hours = minutes_to_hours(minutes.get(&user.id).copied().unwrap_or(0));
            let has_hours = total_hours > Decimal::ZERO;
            let cost_hour = if has_hours { total_salary / total_hours } else { Decimal::ZERO };

            Some((user.id, UserCostHour { cost_hour, total_hours, total_salary, has_hours }))
        })
        .collect()
}
