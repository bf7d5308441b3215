//! The fixed timesheet field schema.
//!
//! Spreadsheet headers vary ("Employee ID", "employee_id", "Name:"), so every
//! header is normalized and matched against one canonical [`Field`] per
//! column. Unknown headers are ignored.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::{EngineError, EngineResult};
use crate::models::{CellValue, RawRow};

/// A canonical timesheet summary field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    /// Employee identifier.
    EmployeeId,
    /// Employee full name.
    EmployeeName,
    /// Department.
    Department,
    /// Job title.
    Designation,
    /// E-mail address.
    Email,
    /// Bank account.
    BankAccount,
    /// Ordinary hours total.
    RegularHours,
    /// Overtime hours total.
    OvertimeHours,
    /// Holiday hours total.
    HolidayHours,
    /// Leave days total.
    LeaveDays,
    /// Pay per ordinary hour.
    HourlyRate,
    /// Distinct pay per overtime hour.
    OvertimeRate,
    /// Allowances.
    Allowances,
    /// Bonuses.
    Bonuses,
    /// First day of the pay period.
    PayPeriodStart,
    /// Last day of the pay period.
    PayPeriodEnd,
}

impl Field {
    /// The canonical snake_case name used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            Field::EmployeeId => "employee_id",
            Field::EmployeeName => "employee_name",
            Field::Department => "department",
            Field::Designation => "designation",
            Field::Email => "email",
            Field::BankAccount => "bank_account",
            Field::RegularHours => "regular_hours",
            Field::OvertimeHours => "overtime_hours",
            Field::HolidayHours => "holiday_hours",
            Field::LeaveDays => "leave_days",
            Field::HourlyRate => "hourly_rate",
            Field::OvertimeRate => "overtime_rate",
            Field::Allowances => "allowances",
            Field::Bonuses => "bonuses",
            Field::PayPeriodStart => "pay_period_start",
            Field::PayPeriodEnd => "pay_period_end",
        }
    }

    /// Maps a normalized header to its field, accepting the labels used by
    /// the timesheet spreadsheet template.
    pub fn from_header(normalized: &str) -> Option<Field> {
        let field = match normalized {
            "employee_id" | "emp_id" | "employee_no" => Field::EmployeeId,
            "employee_name" | "name" => Field::EmployeeName,
            "department" | "dept" => Field::Department,
            "designation" | "job_title" | "title" => Field::Designation,
            "email" | "e_mail" | "email_address" => Field::Email,
            "bank_account" | "bank_account_number" | "account_number" => Field::BankAccount,
            "regular_hours" | "total_regular_hours" => Field::RegularHours,
            "overtime_hours" | "total_overtime_hours" => Field::OvertimeHours,
            "holiday_hours" | "holiday_work_hours" | "total_holiday_work_hours" => {
                Field::HolidayHours
            }
            "leave_days" | "total_leave_days" => Field::LeaveDays,
            "hourly_rate" => Field::HourlyRate,
            "overtime_rate" | "ot_rate" => Field::OvertimeRate,
            "allowances" | "allowance" => Field::Allowances,
            "bonuses" | "bonus" => Field::Bonuses,
            "pay_period_start" | "period_start" | "start_date" => Field::PayPeriodStart,
            "pay_period_end" | "period_end" | "end_date" => Field::PayPeriodEnd,
            _ => return None,
        };
        Some(field)
    }
}

/// Normalizes a header label: lower-cases, turns whitespace, `-` and `_`
/// runs into a single `_`, and drops every other punctuation character.
///
/// # Examples
///
/// ```
/// use payslip_engine::parser::normalize_header;
///
/// assert_eq!(normalize_header("Employee ID"), "employee_id");
/// assert_eq!(normalize_header("  Hourly Rate ($): "), "hourly_rate");
/// assert_eq!(normalize_header("holiday-work  hours"), "holiday_work_hours");
/// ```
pub fn normalize_header(label: &str) -> String {
    let mut normalized = String::with_capacity(label.len());
    for c in label.trim().chars() {
        if c.is_alphanumeric() {
            normalized.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_') && !normalized.ends_with('_') {
            normalized.push('_');
        }
    }
    normalized.trim_matches('_').to_string()
}

/// Summary cells resolved onto the canonical schema.
#[derive(Debug, Default)]
pub struct SchemaCells<'a> {
    cells: BTreeMap<Field, &'a CellValue>,
}

impl<'a> SchemaCells<'a> {
    /// Resolves raw headers to fields.
    ///
    /// Fails when two headers map to the same field with different non-blank
    /// values; blank duplicates are ignored.
    pub fn resolve(row: &'a RawRow) -> EngineResult<Self> {
        let mut cells: BTreeMap<Field, &'a CellValue> = BTreeMap::new();

        for (header, value) in row {
            let normalized = normalize_header(header);
            let Some(field) = Field::from_header(&normalized) else {
                trace!(header = %header, "Ignoring unrecognised timesheet column");
                continue;
            };

            match cells.get(&field).copied() {
                Some(existing) if existing.is_blank() => {
                    cells.insert(field, value);
                }
                Some(existing) if !value.is_blank() && existing != value => {
                    return Err(EngineError::validation(
                        field.name(),
                        format!(
                            "supplied more than once with conflicting values {} and {}",
                            existing, value
                        ),
                    ));
                }
                Some(_) => {}
                None => {
                    cells.insert(field, value);
                }
            }
        }

        Ok(Self { cells })
    }

    /// The cell for a field, if any header mapped to it.
    pub fn get(&self, field: Field) -> Option<&'a CellValue> {
        self.cells.get(&field).copied()
    }

    /// The cell for a field, or `None` when absent or blank.
    pub fn non_blank(&self, field: Field) -> Option<&'a CellValue> {
        self.get(field).filter(|cell| !cell.is_blank())
    }
}
