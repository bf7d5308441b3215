//! Monetary rounding.
//!
//! Every itemized line is rounded once, to the cent, half-up. Totals are sums
//! of already-rounded lines so they never drift from the items they list.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places kept for money and hours.
pub const MONEY_DECIMAL_PLACES: u32 = 2;

/// Rounds to two decimal places, halves away from zero.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::round_money;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(round_money(Decimal::from_str("334.6875").unwrap()).to_string(), "334.69");
/// assert_eq!(round_money(Decimal::from_str("3.825").unwrap()).to_string(), "3.83");
/// assert_eq!(round_money(Decimal::from_str("100").unwrap()).to_string(), "100.00");
/// ```
pub fn round_money(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_DECIMAL_PLACES);
    rounded
}
