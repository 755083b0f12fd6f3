//! Calendar month used as the unit of closing.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_PERIOD_YEAR, MIN_PERIOD_YEAR};
use crate::{CostCloseError, Result};

/// A validated (year, month) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    /// Build a period, rejecting months outside 1..=12 and implausible years.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(CostCloseError::InvalidInput(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        if !(MIN_PERIOD_YEAR..=MAX_PERIOD_YEAR).contains(&year) {
            return Err(CostCloseError::InvalidInput(format!(
                "year must be between {MIN_PERIOD_YEAR} and {MAX_PERIOD_YEAR}, got {year}"
            )));
        }
        Ok(Self { year, month })
    }

    /// Period containing the given date.
    pub fn containing(date: NaiveDate) -> Result<Self> {
        use chrono::Datelike;
        Self::new(date.year(), date.month())
    }

    /// First day of the month.
    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// The following month.
    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Half-open UTC range `[start, end)` covering the month.
    pub fn range(&self) -> MonthRange {
        MonthRange { start: midnight_utc(self.first_day()), end: midnight_utc(self.next().first_day()) }
    }

    /// Whether the date falls inside this month.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        use chrono::Datelike;
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Half-open instant range of a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MonthRange {
    /// Half-open: `start` included, `end` excluded.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}
