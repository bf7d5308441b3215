//! Earnings calculation.
//!
//! Turns worked hours and rates into the five itemized earnings lines:
//!
//! - base pay: regular hours at the hourly rate
//! - overtime pay: overtime hours at the supplied overtime rate, or at the
//!   hourly rate times the overtime multiplier (1.5) when none is supplied
//! - holiday pay: holiday hours at the hourly rate times the holiday
//!   multiplier (2.0)
//! - allowances and bonuses, passed through unchanged
//!
//! Each line is rounded to the cent once; gross is the sum of rounded lines.
//! Products and sums are checked: amounts beyond the range of [`Decimal`]
//! fail the record with [`EngineError::Calculation`] instead of panicking.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rounding::round_money;
use crate::config::EarningsRules;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, AuditWarning, Earnings, TimesheetRecord, WarningSeverity};

/// Warning code raised when a supplied overtime rate replaces the multiplier.
pub const OVERTIME_RATE_OVERRIDE: &str = "OVERTIME_RATE_OVERRIDE";

/// The result of the earnings calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsResult {
    /// The itemized earnings.
    pub earnings: Earnings,
    /// The rate actually applied to overtime hours.
    pub effective_overtime_rate: Decimal,
    /// Audit steps, one per earnings line plus the gross total.
    pub audit_steps: Vec<AuditStep>,
    /// Warnings raised while choosing rates.
    pub warnings: Vec<AuditWarning>,
}

/// Calculates itemized earnings for a timesheet.
///
/// Rates are assumed to have been checked by the caller. Fails only when a
/// line or the gross total overflows.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_earnings;
/// use payslip_engine::config::PayrollRules;
/// use payslip_engine::models::{EmployeeInfo, PayPeriod, TimesheetRecord, WorkingHours};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let record = TimesheetRecord {
///     employee: EmployeeInfo {
///         employee_id: "EMP001".to_string(),
///         name: "John Smith".to_string(),
///         department: "Engineering".to_string(),
///         designation: "Engineer".to_string(),
///         email: "john.smith@company.com".to_string(),
///         bank_account: "1234567890".to_string(),
///     },
///     period: PayPeriod::new(
///         NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
///         NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
///     )
///     .unwrap(),
///     hours: WorkingHours {
///         regular_hours: Decimal::from(160),
///         overtime_hours: Decimal::from(10),
///         holiday_hours: Decimal::ZERO,
///         leave_days: 0,
///     },
///     hourly_rate: Decimal::from(25),
///     overtime_rate: None,
///     allowances: Decimal::ZERO,
///     bonuses: Decimal::ZERO,
/// };
///
/// let result = calculate_earnings(&record, &PayrollRules::standard().earnings, 1).unwrap();
/// assert_eq!(result.earnings.overtime_pay, Decimal::from_str("375.00").unwrap());
/// assert_eq!(result.earnings.gross_salary, Decimal::from_str("4375.00").unwrap());
/// ```
pub fn calculate_earnings(
    record: &TimesheetRecord,
    rules: &EarningsRules,
    step_number_start: u32,
) -> EngineResult<EarningsResult> {
    let employee_id = record.employee.employee_id.as_str();
    let mut audit_steps = Vec::with_capacity(5);
    let mut warnings = Vec::new();
    let mut step_number = step_number_start;

    let hours = &record.hours;
    let hourly_rate = record.hourly_rate;

    // Base pay
    let base_pay = money_line(
        employee_id,
        "base pay",
        hours.regular_hours.checked_mul(hourly_rate),
    )?;
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "base_pay".to_string(),
        rule_name: "Base Pay".to_string(),
        input: serde_json::json!({
            "regular_hours": hours.regular_hours.normalize().to_string(),
            "hourly_rate": hourly_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "amount": base_pay.to_string()
        }),
        reasoning: format!(
            "{} hours × ${} = ${}",
            hours.regular_hours.normalize(),
            hourly_rate.normalize(),
            base_pay
        ),
    });
    step_number += 1;

    // Overtime pay: a supplied rate is authoritative, the multiplier is the fallback
    let multiplied_rate = hourly_rate
        .checked_mul(rules.overtime_multiplier)
        .ok_or_else(|| out_of_range(employee_id, "overtime rate"))?;
    let (overtime_rate, rate_source) = match record.overtime_rate {
        Some(rate) => (rate, "supplied"),
        None => (multiplied_rate, "multiplier"),
    };
    let overtime_pay = money_line(
        employee_id,
        "overtime pay",
        hours.overtime_hours.checked_mul(overtime_rate),
    )?;

    let overtime_reasoning = match record.overtime_rate {
        Some(rate) => {
            if hours.overtime_hours > Decimal::ZERO {
                warnings.push(AuditWarning {
                    code: OVERTIME_RATE_OVERRIDE.to_string(),
                    message: format!(
                        "Timesheet supplies an overtime rate of ${}; used instead of {}× the hourly rate (${})",
                        rate.normalize(),
                        rules.overtime_multiplier.normalize(),
                        multiplied_rate.normalize()
                    ),
                    severity: WarningSeverity::Low,
                });
            }
            format!(
                "{} hours × ${} (supplied overtime rate) = ${}",
                hours.overtime_hours.normalize(),
                rate.normalize(),
                overtime_pay
            )
        }
        None => format!(
            "{} hours × ${} × {} = ${}",
            hours.overtime_hours.normalize(),
            hourly_rate.normalize(),
            rules.overtime_multiplier.normalize(),
            overtime_pay
        ),
    };

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "overtime_pay".to_string(),
        rule_name: "Overtime Pay".to_string(),
        input: serde_json::json!({
            "overtime_hours": hours.overtime_hours.normalize().to_string(),
            "hourly_rate": hourly_rate.normalize().to_string(),
            "supplied_overtime_rate": record.overtime_rate.map(|r| r.normalize().to_string()),
            "overtime_multiplier": rules.overtime_multiplier.normalize().to_string()
        }),
        output: serde_json::json!({
            "rate": overtime_rate.normalize().to_string(),
            "rate_source": rate_source,
            "amount": overtime_pay.to_string()
        }),
        reasoning: overtime_reasoning,
    });
    step_number += 1;

    // Holiday pay
    let holiday_pay = money_line(
        employee_id,
        "holiday pay",
        hours
            .holiday_hours
            .checked_mul(hourly_rate)
            .and_then(|amount| amount.checked_mul(rules.holiday_multiplier)),
    )?;
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "holiday_pay".to_string(),
        rule_name: "Holiday Pay".to_string(),
        input: serde_json::json!({
            "holiday_hours": hours.holiday_hours.normalize().to_string(),
            "hourly_rate": hourly_rate.normalize().to_string(),
            "holiday_multiplier": rules.holiday_multiplier.normalize().to_string()
        }),
        output: serde_json::json!({
            "amount": holiday_pay.to_string()
        }),
        reasoning: format!(
            "{} hours × ${} × {} = ${}",
            hours.holiday_hours.normalize(),
            hourly_rate.normalize(),
            rules.holiday_multiplier.normalize(),
            holiday_pay
        ),
    });
    step_number += 1;

    // Allowances and bonuses
    let allowances = round_money(record.allowances);
    let bonuses = round_money(record.bonuses);
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "additional_earnings".to_string(),
        rule_name: "Allowances and Bonuses".to_string(),
        input: serde_json::json!({
            "allowances": record.allowances.to_string(),
            "bonuses": record.bonuses.to_string()
        }),
        output: serde_json::json!({
            "allowances": allowances.to_string(),
            "bonuses": bonuses.to_string()
        }),
        reasoning: format!(
            "Allowances ${} and bonuses ${} paid as supplied",
            allowances, bonuses
        ),
    });
    step_number += 1;

    let gross_salary = [overtime_pay, holiday_pay, allowances, bonuses]
        .into_iter()
        .try_fold(base_pay, |total, line| total.checked_add(line))
        .ok_or_else(|| out_of_range(employee_id, "gross salary"))?;
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "gross_salary".to_string(),
        rule_name: "Gross Salary".to_string(),
        input: serde_json::json!({
            "base_pay": base_pay.to_string(),
            "overtime_pay": overtime_pay.to_string(),
            "holiday_pay": holiday_pay.to_string(),
            "allowances": allowances.to_string(),
            "bonuses": bonuses.to_string()
        }),
        output: serde_json::json!({
            "gross_salary": gross_salary.to_string()
        }),
        reasoning: format!(
            "${} + ${} + ${} + ${} + ${} = ${}",
            base_pay, overtime_pay, holiday_pay, allowances, bonuses, gross_salary
        ),
    });

    Ok(EarningsResult {
        earnings: Earnings {
            base_pay,
            overtime_pay,
            holiday_pay,
            allowances,
            bonuses,
            gross_salary,
        },
        effective_overtime_rate: overtime_rate,
        audit_steps,
        warnings,
    })
}

/// Rounds a checked product, or reports which line overflowed.
fn money_line(employee_id: &str, line: &str, amount: Option<Decimal>) -> EngineResult<Decimal> {
    amount
        .map(round_money)
        .ok_or_else(|| out_of_range(employee_id, line))
}

fn out_of_range(employee_id: &str, line: &str) -> EngineError {
    EngineError::Calculation {
        employee_id: employee_id.to_string(),
        message: format!("{} is out of range", line),
    }
}
