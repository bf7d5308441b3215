//! Raw timesheet to [`TimesheetRecord`].

use rust_decimal::Decimal;
use tracing::debug;

use super::attendance::{parse_attendance, summarize, AttendanceSummary};
use super::coercion::{coerce_count, coerce_date, coerce_decimal, coerce_non_negative, coerce_text};
use super::schema::{Field, SchemaCells};
use crate::calculation::round_money;
use crate::error::{EngineError, EngineResult};
use crate::models::{EmployeeInfo, PayPeriod, RawTimesheet, TimesheetRecord, WorkingHours};

/// Minimum number of alphanumeric characters in a bank account.
const MIN_BANK_ACCOUNT_LEN: usize = 4;

/// Validates and normalizes one raw timesheet.
///
/// Performs no computation beyond trimming, rounding hours and money to two
/// decimal places, and summing attendance rows when a summary total is blank.
/// Rates are not range-checked here; the calculator owns that.
///
/// # Example
///
/// ```
/// use payslip_engine::models::RawTimesheet;
/// use payslip_engine::parser::parse_timesheet;
///
/// let raw = RawTimesheet::default()
///     .with("Employee ID", "EMP001")
///     .with("Name", "John Smith")
///     .with("Department", "Engineering")
///     .with("Designation", "Engineer")
///     .with("Email", "john.smith@company.com")
///     .with("Bank Account", "1234567890")
///     .with("Regular Hours", 160.0)
///     .with("Hourly Rate", 25.0)
///     .with("Pay Period Start", "2025-10-01")
///     .with("Pay Period End", "2025-10-31");
///
/// let record = parse_timesheet(&raw).unwrap();
/// assert_eq!(record.employee.employee_id, "EMP001");
/// assert_eq!(record.hours.regular_hours.to_string(), "160.00");
/// assert_eq!(record.overtime_rate, None);
/// ```
pub fn parse_timesheet(raw: &RawTimesheet) -> EngineResult<TimesheetRecord> {
    let cells = SchemaCells::resolve(&raw.fields)?;

    let employee = EmployeeInfo {
        employee_id: required_text(&cells, Field::EmployeeId)?,
        name: required_text(&cells, Field::EmployeeName)?,
        department: required_text(&cells, Field::Department)?,
        designation: required_text(&cells, Field::Designation)?,
        email: parse_email(&cells)?,
        bank_account: parse_bank_account(&cells)?,
    };

    let period = PayPeriod::new(
        required_date(&cells, Field::PayPeriodStart)?,
        required_date(&cells, Field::PayPeriodEnd)?,
    )?;

    let derived = if raw.attendance.is_empty() {
        AttendanceSummary::default()
    } else {
        let days = parse_attendance(&raw.attendance)?;
        summarize(&days, &period)?
    };

    let hours = WorkingHours {
        regular_hours: hours_or(&cells, Field::RegularHours, derived.regular_hours)?,
        overtime_hours: hours_or(&cells, Field::OvertimeHours, derived.overtime_hours)?,
        holiday_hours: hours_or(&cells, Field::HolidayHours, derived.holiday_hours)?,
        leave_days: match cells.non_blank(Field::LeaveDays) {
            Some(cell) => coerce_count(Field::LeaveDays.name(), Some(cell))?,
            None => derived.leave_days,
        },
    };

    let hourly_rate = optional_rate(&cells, Field::HourlyRate)?.unwrap_or(Decimal::ZERO);
    let overtime_rate = optional_rate(&cells, Field::OvertimeRate)?;

    let record = TimesheetRecord {
        employee,
        period,
        hours,
        hourly_rate,
        overtime_rate,
        allowances: coerce_non_negative(Field::Allowances.name(), cells.get(Field::Allowances))?,
        bonuses: coerce_non_negative(Field::Bonuses.name(), cells.get(Field::Bonuses))?,
    };

    debug!(
        employee_id = %record.employee.employee_id,
        regular_hours = %record.hours.regular_hours,
        overtime_hours = %record.hours.overtime_hours,
        attendance_rows = raw.attendance.len(),
        "Parsed timesheet"
    );

    Ok(record)
}

/// Best-effort employee id for reporting, read without validating the rest
/// of the timesheet.
pub fn peek_employee_id(raw: &RawTimesheet) -> Option<String> {
    let cells = SchemaCells::resolve(&raw.fields).ok()?;
    let cell = cells.non_blank(Field::EmployeeId)?;
    coerce_text(Field::EmployeeId.name(), cell).ok().flatten()
}

/// Best-effort employee name for reporting.
pub fn peek_employee_name(raw: &RawTimesheet) -> Option<String> {
    let cells = SchemaCells::resolve(&raw.fields).ok()?;
    let cell = cells.non_blank(Field::EmployeeName)?;
    coerce_text(Field::EmployeeName.name(), cell).ok().flatten()
}

fn required_text(cells: &SchemaCells<'_>, field: Field) -> EngineResult<String> {
    let value = match cells.get(field) {
        Some(cell) => coerce_text(field.name(), cell)?,
        None => None,
    };
    value.ok_or_else(|| EngineError::validation(field.name(), "is required"))
}

fn required_date(cells: &SchemaCells<'_>, field: Field) -> EngineResult<chrono::NaiveDate> {
    let value = match cells.get(field) {
        Some(cell) => coerce_date(field.name(), cell)?,
        None => None,
    };
    value.ok_or_else(|| EngineError::validation(field.name(), "is required"))
}

fn hours_or(cells: &SchemaCells<'_>, field: Field, derived: Decimal) -> EngineResult<Decimal> {
    match cells.non_blank(field) {
        Some(cell) => coerce_non_negative(field.name(), Some(cell)),
        None => Ok(round_money(derived)),
    }
}

fn optional_rate(cells: &SchemaCells<'_>, field: Field) -> EngineResult<Option<Decimal>> {
    match cells.get(field) {
        Some(cell) => Ok(coerce_decimal(field.name(), cell)?.map(round_money)),
        None => Ok(None),
    }
}

fn parse_email(cells: &SchemaCells<'_>) -> EngineResult<String> {
    let email = required_text(cells, Field::Email)?;
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(EngineError::validation(
            Field::Email.name(),
            format!("{:?} is not an e-mail address", email),
        ));
    }
    Ok(email)
}

fn parse_bank_account(cells: &SchemaCells<'_>) -> EngineResult<String> {
    let account = required_text(cells, Field::BankAccount)?;
    let compact: String = account
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();
    if compact.len() < MIN_BANK_ACCOUNT_LEN || !compact.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(EngineError::validation(
            Field::BankAccount.name(),
            format!(
                "{:?} must be at least {} letters or digits, optionally separated by spaces or dashes",
                account, MIN_BANK_ACCOUNT_LEN
            ),
        ));
    }
    Ok(account)
}
