//! Internal labor cost per project.

use std::collections::HashMap;

use costclose_domain::money::round_money;
use costclose_domain::{ProjectId, TimeEntry, UserId};
use rust_decimal::Decimal;

use super::cost_hour::CostHourMap;

/// Which cost-per-hour applies to an entry.
#[derive(Debug, Clone, Copy)]
pub enum CostRates<'a> {
    /// Each user's current `hourly_cost`.
    Live,
    /// The month's computed cost-hour, falling back to the live rate for
    /// users absent from the map.
    Monthly(&'a CostHourMap),
}

/// Sum `hours × rate` per project over worked entries, rounded per project.
///
/// `live_rates` holds each user's `hourly_cost`; users missing from it cost
/// zero. Entries without a project are skipped.
pub fn internal_costs_by_project(
    entries: &[TimeEntry],
    live_rates: &HashMap<UserId, Decimal>,
    rates: CostRates<'_>,
) -> HashMap<ProjectId, Decimal> {
    let mut costs: HashMap<ProjectId, Decimal> = HashMap::new();

    for entry in entries.iter().filter(|e| e.counts_as_worked()) {
        let Some(project_id) = entry.project_id else { continue };
        let live = live_rates.get(&entry.user_id).copied().unwrap_or_default();
        let rate = match rates {
            CostRates::Live => live,
            CostRates::Monthly(map) => map.get(&entry.user_id).map_or(live, |line| line.cost_hour),
        };
        *costs.entry(project_id).or_default() += entry.hours() * rate;
    }

    costs.values_mut().for_each(|cost| *cost = round_money(*cost));
    costs
}

/// Worked hours per project.
pub fn hours_by_project(entries: &[TimeEntry]) -> HashMap<ProjectId, Decimal> {
    let mut hours: HashMap<ProjectId, Decimal> = HashMap::new();
    for entry in entries.iter().filter(|e| e.counts_as_worked()) {
        if let Some(project_id) = entry.project_id {
            *hours.entry(project_id).or_default() += entry.hours();
        }
    }
    hours
}
