//! Decimal helpers for money, hours and percentages.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::constants::MONEY_SCALE;

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);
const ONE_HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Round to two decimals, halves away from zero.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a minute count into fractional hours.
pub fn minutes_to_hours(minutes: i64) -> Decimal {
    Decimal::from(minutes) / MINUTES_PER_HOUR
}

/// `amount × percent / 100`, unrounded.
pub fn percent_of(amount: Decimal, percent: Decimal) -> Decimal {
    amount * percent / ONE_HUNDRED
}

/// Share of `part` in `whole` as a percentage. Zero when `whole` is zero.
pub fn share_percent(part: Decimal, whole: Decimal) -> Decimal {
    if whole.is_zero() {
        Decimal::ZERO
    } else {
        part / whole * ONE_HUNDRED
    }
}

/// Equal share in percent among `count` parts. Zero when `count` is zero.
pub fn equal_share_percent(count: usize) -> Decimal {
    if count == 0 {
        Decimal::ZERO
    } else {
        ONE_HUNDRED / Decimal::from(count)
    }
}
