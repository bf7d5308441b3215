//! The wage calculator.
//!
//! Combines earnings and deductions into a [`SalarySlipRecord`] with a
//! numbered audit trace.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::deductions::calculate_deductions;
use super::earnings::calculate_earnings;
use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AuditStep, AuditTrace, AuditWarning, SalarySlipRecord, TimesheetRecord, WarningSeverity,
};

/// Warning code raised when net salary is zero or negative.
pub const NET_PAY_NON_POSITIVE: &str = "NET_PAY_NON_POSITIVE";

/// Largest gross salary the calculator accepts, one quadrillion.
///
/// Deduction rates are at most 1, so every deduction total and net salary
/// derived from a gross at or below this bound fits in a [`Decimal`].
pub const MAX_GROSS_SALARY: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Computes salary slips from validated timesheets.
///
/// Holds the configuration immutably; calculating is a pure function of the
/// timesheet, the configuration and the generation timestamp.
#[derive(Debug, Clone)]
pub struct WageCalculator {
    config: Arc<PayrollConfig>,
}

impl WageCalculator {
    /// Creates a calculator for the given configuration.
    pub fn new(config: Arc<PayrollConfig>) -> Self {
        Self { config }
    }

    /// The configuration this calculator applies.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Calculates a salary slip stamped with the current time.
    pub fn calculate(&self, record: &TimesheetRecord) -> EngineResult<SalarySlipRecord> {
        self.calculate_at(record, Utc::now())
    }

    /// Calculates a salary slip stamped with `generated_at`.
    ///
    /// Fails when the hourly rate, or a supplied overtime rate, is not
    /// positive, and when gross salary overflows or exceeds
    /// [`MAX_GROSS_SALARY`]. Non-positive net pay is computed and flagged with
    /// a [`NET_PAY_NON_POSITIVE`] warning.
    ///
    /// # Examples
    ///
    /// ```
    /// use payslip_engine::calculation::WageCalculator;
    /// use payslip_engine::config::PayrollConfig;
    /// use payslip_engine::models::{EmployeeInfo, PayPeriod, TimesheetRecord, WorkingHours};
    /// use chrono::{NaiveDate, Utc};
    /// use rust_decimal::Decimal;
    /// use std::str::FromStr;
    /// use std::sync::Arc;
    ///
    /// let calculator = WageCalculator::new(Arc::new(PayrollConfig::standard()));
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
    /// let slip = calculator.calculate_at(&record, Utc::now()).unwrap();
    /// assert_eq!(slip.net_salary, Decimal::from_str("3079.06").unwrap());
    /// ```
    pub fn calculate_at(
        &self,
        record: &TimesheetRecord,
        generated_at: DateTime<Utc>,
    ) -> EngineResult<SalarySlipRecord> {
        let start_time = Instant::now();
        let employee_id = &record.employee.employee_id;

        check_rates(record)?;

        let rules = self.config.rules();
        let mut steps: Vec<AuditStep> = Vec::new();
        let mut warnings: Vec<AuditWarning> = Vec::new();

        let earnings_result = calculate_earnings(record, &rules.earnings, 1)?;
        if earnings_result.earnings.gross_salary > MAX_GROSS_SALARY {
            return Err(EngineError::Calculation {
                employee_id: employee_id.clone(),
                message: format!(
                    "gross salary {} exceeds the supported maximum of {}",
                    earnings_result.earnings.gross_salary, MAX_GROSS_SALARY
                ),
            });
        }
        let next_step = earnings_result.audit_steps.len() as u32 + 1;
        let earnings = earnings_result.earnings;
        steps.extend(earnings_result.audit_steps);
        warnings.extend(earnings_result.warnings);

        let deductions_result = calculate_deductions(earnings.gross_salary, rules, next_step);
        let next_step = next_step + deductions_result.audit_steps.len() as u32;
        let deductions = deductions_result.deductions;
        steps.extend(deductions_result.audit_steps);

        let net_salary = earnings.gross_salary - deductions.total_deductions;
        steps.push(AuditStep {
            step_number: next_step,
            rule_id: "net_salary".to_string(),
            rule_name: "Net Salary".to_string(),
            input: serde_json::json!({
                "gross_salary": earnings.gross_salary.to_string(),
                "total_deductions": deductions.total_deductions.to_string()
            }),
            output: serde_json::json!({
                "net_salary": net_salary.to_string()
            }),
            reasoning: format!(
                "${} - ${} = ${}",
                earnings.gross_salary, deductions.total_deductions, net_salary
            ),
        });

        if net_salary <= Decimal::ZERO {
            warn!(
                employee_id = %employee_id,
                net_salary = %net_salary,
                "Net salary is not positive; flagged for review"
            );
            warnings.push(AuditWarning {
                code: NET_PAY_NON_POSITIVE.to_string(),
                message: format!(
                    "Net salary ${} is not positive; review before payment",
                    net_salary
                ),
                severity: WarningSeverity::High,
            });
        }

        debug!(
            employee_id = %employee_id,
            gross_salary = %earnings.gross_salary,
            total_deductions = %deductions.total_deductions,
            net_salary = %net_salary,
            duration_us = start_time.elapsed().as_micros() as u64,
            "Calculated salary slip"
        );

        Ok(SalarySlipRecord {
            employee: record.employee.clone(),
            period: record.period,
            hours: record.hours,
            hourly_rate: record.hourly_rate,
            overtime_rate: earnings_result.effective_overtime_rate,
            earnings,
            deductions,
            net_salary,
            generated_at,
            audit_trace: AuditTrace { steps, warnings },
        })
    }
}

impl Default for WageCalculator {
    fn default() -> Self {
        Self::new(Arc::new(PayrollConfig::standard()))
    }
}

fn check_rates(record: &TimesheetRecord) -> EngineResult<()> {
    let employee_id = &record.employee.employee_id;
    if record.hourly_rate <= Decimal::ZERO {
        return Err(EngineError::Calculation {
            employee_id: employee_id.clone(),
            message: format!("hourly_rate must be positive, got {}", record.hourly_rate),
        });
    }
    if let Some(rate) = record.overtime_rate {
        if rate <= Decimal::ZERO {
            return Err(EngineError::Calculation {
                employee_id: employee_id.clone(),
                message: format!("overtime_rate must be positive when supplied, got {}", rate),
            });
        }
    }
    Ok(())
}
