//! Wage, tax and deduction calculation.
//!
//! This module contains the calculation functions for a salary slip: earnings
//! from hours and rates, progressive income tax, proportional and flat
//! deductions, and the [`WageCalculator`] that combines them into a
//! [`SalarySlipRecord`](crate::models::SalarySlipRecord) with an audit trace.

mod calculator;
mod deductions;
mod earnings;
mod income_tax;
mod rounding;

pub use calculator::{MAX_GROSS_SALARY, NET_PAY_NON_POSITIVE, WageCalculator};
pub use deductions::{DeductionsResult, calculate_deductions};
pub use earnings::{EarningsResult, OVERTIME_RATE_OVERRIDE, calculate_earnings};
pub use income_tax::{BracketSlice, IncomeTaxResult, calculate_income_tax};
pub use rounding::{MONEY_DECIMAL_PLACES, round_money};
