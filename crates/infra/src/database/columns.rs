//! Column codecs shared by the SQLite repositories.
//!
//! Money is stored as decimal text so that no precision is lost, UUIDs as
//! hyphenated text and instants as unix milliseconds.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use costclose_domain::Period;
use rust_decimal::Decimal;
use rusqlite::types::Type;
use rusqlite::Row;
use uuid::Uuid;

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

fn conversion_error(idx: usize, err: impl Into<BoxedError>) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn parse_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Into<BoxedError>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>().map_err(|err| conversion_error(idx, err))
}

fn parse_opt_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: Into<BoxedError>,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|value| value.parse::<T>().map_err(|err| conversion_error(idx, err))).transpose()
}

pub fn uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    parse_at(row, idx)
}

pub fn opt_uuid_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Uuid>> {
    parse_opt_at(row, idx)
}

pub fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    parse_at(row, idx)
}

pub fn opt_decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    parse_opt_at(row, idx)
}

pub fn opt_date_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    parse_opt_at(row, idx)
}

/// Stored enums (`CLOSED`, `WORK`, ...).
pub fn enum_at<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    parse_at(row, idx)
}

pub fn instant_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| conversion_error(idx, format!("timestamp out of range: {millis}")))
}

pub fn opt_instant_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let millis: Option<i64> = row.get(idx)?;
    millis
        .map(|value| {
            DateTime::from_timestamp_millis(value)
                .ok_or_else(|| conversion_error(idx, format!("timestamp out of range: {value}")))
        })
        .transpose()
}

/// `(year, month)` stored in two adjacent columns.
pub fn period_at(row: &Row<'_>, year_idx: usize) -> rusqlite::Result<Period> {
    let year: i32 = row.get(year_idx)?;
    let month: u32 = row.get(year_idx + 1)?;
    Period::new(year, month).map_err(|err| conversion_error(year_idx, err.to_string()))
}

pub fn money_text(value: Decimal) -> String {
    value.to_string()
}

pub fn opt_money_text(value: Option<Decimal>) -> Option<String> {
    value.map(money_text)
}

pub fn opt_uuid_text(value: Option<Uuid>) -> Option<String> {
    value.map(|id| id.to_string())
}

pub fn millis(instant: DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

pub fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

pub fn int_to_bool(value: i64) -> bool {
    value != 0
}
