//! Logged time.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::organization::{CompanyId, ProjectId, UserId};
use crate::impl_stored_enum_conversions;
use crate::money::minutes_to_hours;

/// Kind of a time entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeEntryKind {
    Work,
    PauseCoffee,
    PauseLunch,
}

impl_stored_enum_conversions!(TimeEntryKind {
    Work => "WORK",
    PauseCoffee => "PAUSE_COFFEE",
    PauseLunch => "PAUSE_LUNCH",
});

impl TimeEntryKind {
    /// Coffee breaks are paid time; lunch is not.
    pub fn counts_as_worked(self) -> bool {
        matches!(self, Self::Work | Self::PauseCoffee)
    }
}

/// A single block of logged time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    pub id: Uuid,
    pub company_id: CompanyId,
    pub user_id: UserId,
    pub project_id: Option<ProjectId>,
    pub kind: TimeEntryKind,
    pub started_at: DateTime<Utc>,
    pub duration_minutes: i64,
}

impl TimeEntry {
    /// WORK and PAUSE_COFFEE count, other kinds do not.
    pub fn counts_as_worked(&self) -> bool {
        self.kind.counts_as_worked()
    }

    pub fn hours(&self) -> Decimal {
        minutes_to_hours(self.duration_minutes)
    }
}
