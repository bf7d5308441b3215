//! Pay period model.
//!
//! This module contains the [`PayPeriod`] type describing the date range a
//! single timesheet and salary slip cover.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Represents a pay period with its inclusive date range.
///
/// # Example
///
/// ```
/// use payslip_engine::models::PayPeriod;
/// use chrono::NaiveDate;
///
/// let period = PayPeriod::new(
///     NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
/// )
/// .unwrap();
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2025, 10, 15).unwrap()));
/// assert_eq!(period.days(), 31);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// The start date of the pay period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the pay period (inclusive).
    pub end_date: NaiveDate,
}

impl PayPeriod {
    /// Creates a pay period, rejecting an end date before the start date.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> EngineResult<Self> {
        if end_date < start_date {
            return Err(EngineError::validation(
                "pay_period_end",
                format!(
                    "pay period end {} precedes start {}",
                    end_date, start_date
                ),
            ));
        }
        Ok(Self {
            start_date,
            end_date,
        })
    }

    /// Checks if a given date falls within this pay period (inclusive).
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Number of calendar days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// The end date formatted as `YYYYMMDD`, used in slip file names.
    pub fn end_stamp(&self) -> String {
        self.end_date.format("%Y%m%d").to_string()
    }
}
