//! Daily attendance rows.
//!
//! Timesheet exports list one row per calendar day with a status and the
//! hours worked. When the summary section leaves a total blank, the parser
//! derives it from these rows.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::trace;

use super::coercion::{coerce_date, coerce_non_negative, coerce_text};
use super::schema::normalize_header;
use crate::calculation::round_money;
use crate::error::{EngineError, EngineResult};
use crate::models::{CellValue, PayPeriod, RawRow};

/// What an employee did on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendanceStatus {
    /// A full ordinary working day.
    Present,
    /// A partial ordinary working day.
    HalfDay,
    /// Paid or unpaid leave.
    Leave,
    /// Worked on a public holiday.
    HolidayWork,
    /// A rostered day off.
    Weekend,
    /// Did not attend.
    Absent,
}

impl AttendanceStatus {
    /// True when the day's hours count as regular hours.
    pub fn counts_as_regular(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::HalfDay)
    }
}

impl FromStr for AttendanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_header(s).as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "half_day" | "halfday" => Ok(AttendanceStatus::HalfDay),
            "leave" => Ok(AttendanceStatus::Leave),
            "holiday_work" => Ok(AttendanceStatus::HolidayWork),
            "weekend" => Ok(AttendanceStatus::Weekend),
            "absent" => Ok(AttendanceStatus::Absent),
            _ => Err(format!("unknown attendance status {:?}", s.trim())),
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::HalfDay => "Half Day",
            AttendanceStatus::Leave => "Leave",
            AttendanceStatus::HolidayWork => "Holiday Work",
            AttendanceStatus::Weekend => "Weekend",
            AttendanceStatus::Absent => "Absent",
        };
        write!(f, "{}", label)
    }
}

/// One parsed attendance row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceDay {
    /// The calendar day.
    pub date: NaiveDate,
    /// What happened that day.
    pub status: AttendanceStatus,
    /// Hours worked that day.
    pub hours_worked: Decimal,
    /// Overtime hours worked that day.
    pub overtime_hours: Decimal,
}

/// Totals derived from attendance rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttendanceSummary {
    /// Hours worked on Present and Half Day rows.
    pub regular_hours: Decimal,
    /// Overtime hours over every row.
    pub overtime_hours: Decimal,
    /// Hours worked on Holiday Work rows.
    pub holiday_hours: Decimal,
    /// Number of Leave rows.
    pub leave_days: u32,
}

/// Parses attendance rows, skipping rows whose date cell is blank.
///
/// Field names in errors are indexed, e.g. `attendance[3].hours_worked`.
pub fn parse_attendance(rows: &[RawRow]) -> EngineResult<Vec<AttendanceDay>> {
    let mut days = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let cell = |name: &str| find_cell(row, name);
        let field = |name: &str| format!("attendance[{}].{}", index, name);

        let date = match cell("date") {
            Some(value) => coerce_date(&field("date"), value)?,
            None => None,
        };
        let Some(date) = date else {
            trace!(row = index, "Skipping attendance row without a date");
            continue;
        };

        let status_text = match cell("status") {
            Some(value) => coerce_text(&field("status"), value)?,
            None => None,
        }
        .ok_or_else(|| EngineError::validation(field("status"), "is required"))?;
        let status = AttendanceStatus::from_str(&status_text)
            .map_err(|message| EngineError::validation(field("status"), message))?;

        days.push(AttendanceDay {
            date,
            status,
            hours_worked: coerce_non_negative(&field("hours_worked"), cell("hours_worked"))?,
            overtime_hours: coerce_non_negative(&field("overtime_hours"), cell("overtime_hours"))?,
        });
    }

    Ok(days)
}

fn find_cell<'a>(row: &'a RawRow, name: &str) -> Option<&'a CellValue> {
    row.iter()
        .find(|(header, _)| normalize_header(header) == name)
        .map(|(_, value)| value)
}

/// Totals the attendance days, rejecting days outside the pay period or
/// listed twice.
pub fn summarize(days: &[AttendanceDay], period: &PayPeriod) -> EngineResult<AttendanceSummary> {
    let mut summary = AttendanceSummary::default();
    let mut seen: Vec<NaiveDate> = Vec::with_capacity(days.len());

    for (index, day) in days.iter().enumerate() {
        let field = format!("attendance[{}].date", index);
        if !period.contains_date(day.date) {
            return Err(EngineError::validation(
                field,
                format!(
                    "{} is outside the pay period {} to {}",
                    day.date, period.start_date, period.end_date
                ),
            ));
        }
        if seen.contains(&day.date) {
            return Err(EngineError::validation(
                field,
                format!("{} appears more than once", day.date),
            ));
        }
        seen.push(day.date);

        if day.status.counts_as_regular() {
            summary.regular_hours = add_hours(summary.regular_hours, day.hours_worked, index, "hours_worked")?;
        }
        if day.status == AttendanceStatus::HolidayWork {
            summary.holiday_hours = add_hours(summary.holiday_hours, day.hours_worked, index, "hours_worked")?;
        }
        if day.status == AttendanceStatus::Leave {
            summary.leave_days += 1;
        }
        summary.overtime_hours = add_hours(summary.overtime_hours, day.overtime_hours, index, "overtime_hours")?;
    }

    summary.regular_hours = round_money(summary.regular_hours);
    summary.overtime_hours = round_money(summary.overtime_hours);
    summary.holiday_hours = round_money(summary.holiday_hours);
    Ok(summary)
}

fn add_hours(total: Decimal, hours: Decimal, index: usize, column: &str) -> EngineResult<Decimal> {
    total.checked_add(hours).ok_or_else(|| {
        EngineError::validation(
            format!("attendance[{}].{}", index, column),
            "pushes the hours total out of range",
        )
    })
}
