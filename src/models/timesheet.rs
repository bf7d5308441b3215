//! Timesheet models.
//!
//! [`RawTimesheet`] is what arrives from a spreadsheet export: named cells of
//! mixed type, plus optional daily attendance rows. [`TimesheetRecord`] is the
//! validated, typed form the calculator consumes.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EmployeeInfo, PayPeriod};

/// A single spreadsheet cell value.
///
/// Cells arrive as text, numbers, booleans or nothing at all. The parser
/// coerces them into typed fields; this type only preserves what was read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// An empty cell.
    Empty,
    /// A boolean cell.
    Bool(bool),
    /// A numeric cell.
    Number(f64),
    /// A text cell.
    Text(String),
}

impl CellValue {
    /// True for empty cells and text cells containing only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => write!(f, "<empty>"),
            CellValue::Bool(value) => write!(f, "{}", value),
            CellValue::Number(value) => write!(f, "{}", value),
            CellValue::Text(value) => write!(f, "{:?}", value),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

/// One row of raw cells keyed by column header.
pub type RawRow = BTreeMap<String, CellValue>;

/// An unvalidated timesheet as extracted from a spreadsheet.
///
/// `fields` holds the summary cells (employee details, totals, rates, pay
/// period). `attendance` optionally holds one row per day with `date`,
/// `status`, `hours_worked` and `overtime_hours` columns.
///
/// # Example
///
/// ```
/// use payslip_engine::models::RawTimesheet;
///
/// let raw = RawTimesheet::default()
///     .with("Employee ID", "EMP001")
///     .with("Name", "John Smith")
///     .with("Regular Hours", 160.0);
/// assert_eq!(raw.fields.len(), 3);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTimesheet {
    /// Summary cells keyed by header label.
    pub fields: RawRow,
    /// Daily attendance rows, if the export included them.
    #[serde(default)]
    pub attendance: Vec<RawRow>,
}

impl RawTimesheet {
    /// Adds or replaces a summary cell.
    pub fn with(mut self, field: &str, value: impl Into<CellValue>) -> Self {
        self.fields.insert(field.to_string(), value.into());
        self
    }

    /// Appends an attendance row.
    pub fn with_attendance_row(mut self, row: RawRow) -> Self {
        self.attendance.push(row);
        self
    }
}

/// Hours worked and leave taken during a pay period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorkingHours {
    /// Ordinary hours worked.
    pub regular_hours: Decimal,
    /// Hours worked beyond ordinary time.
    pub overtime_hours: Decimal,
    /// Hours worked on holidays.
    pub holiday_hours: Decimal,
    /// Days of leave taken.
    pub leave_days: u32,
}

/// A validated timesheet for one employee and one pay period.
///
/// Every hour and money field is non-negative and normalized to two decimal
/// places. Rates are carried as given; the calculator enforces positivity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetRecord {
    /// Who the timesheet belongs to.
    pub employee: EmployeeInfo,
    /// The period the timesheet covers.
    pub period: PayPeriod,
    /// Hours worked and leave taken.
    pub hours: WorkingHours,
    /// Pay per ordinary hour.
    pub hourly_rate: Decimal,
    /// Distinct pay per overtime hour, when the timesheet supplies one.
    pub overtime_rate: Option<Decimal>,
    /// Allowances paid on top of hourly earnings.
    pub allowances: Decimal,
    /// Bonuses paid on top of hourly earnings.
    pub bonuses: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_mixed_cells() {
        let json = r#"{
            "fields": {
                "Employee ID": "EMP001",
                "Regular Hours": 160,
                "Overtime Hours": 12.5,
                "Bonuses": null,
                "Active": true
            }
        }"#;

        let raw: RawTimesheet = serde_json::from_str(json).unwrap();
        assert_eq!(raw.fields["Employee ID"], CellValue::Text("EMP001".to_string()));
        assert_eq!(raw.fields["Regular Hours"], CellValue::Number(160.0));
        assert_eq!(raw.fields["Overtime Hours"], CellValue::Number(12.5));
        assert_eq!(raw.fields["Bonuses"], CellValue::Empty);
        assert_eq!(raw.fields["Active"], CellValue::Bool(true));
        assert!(raw.attendance.is_empty());
    }

    #[test]
    fn test_deserialize_attendance_rows() {
        let json = r#"{
            "fields": {"Employee ID": "EMP001"},
            "attendance": [
                {"date": "2025-10-01", "status": "Present", "hours_worked": 8, "overtime_hours": 1}
            ]
        }"#;

        let raw: RawTimesheet = serde_json::from_str(json).unwrap();
        assert_eq!(raw.attendance.len(), 1);
        assert_eq!(
            raw.attendance[0]["status"],
            CellValue::Text("Present".to_string())
        );
    }

    #[test]
    fn test_is_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::from("   ").is_blank());
        assert!(!CellValue::from("x").is_blank());
        assert!(!CellValue::from(0.0).is_blank());
    }

    #[test]
    fn test_with_replaces_existing_cell() {
        let raw = RawTimesheet::default()
            .with("Name", "A")
            .with("Name", "B");
        assert_eq!(raw.fields["Name"], CellValue::from("B"));
    }

    #[test]
    fn test_cell_display() {
        assert_eq!(CellValue::Empty.to_string(), "<empty>");
        assert_eq!(CellValue::from("abc").to_string(), "\"abc\"");
        assert_eq!(CellValue::from(2.5).to_string(), "2.5");
    }
}
