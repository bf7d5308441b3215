//! Salary slip models.
//!
//! This module contains the [`SalarySlipRecord`] produced by the wage
//! calculator, its itemized [`Earnings`] and [`Deductions`], and the
//! [`AuditTrace`] recording every rule the calculator applied.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EmployeeInfo, PayPeriod, WorkingHours};

/// Itemized earnings for a pay period.
///
/// `gross_salary` is the exact sum of the five rounded lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Earnings {
    /// Regular hours at the hourly rate.
    pub base_pay: Decimal,
    /// Overtime hours at the overtime rate.
    pub overtime_pay: Decimal,
    /// Holiday hours at the holiday multiplier.
    pub holiday_pay: Decimal,
    /// Allowances passed through from the timesheet.
    pub allowances: Decimal,
    /// Bonuses passed through from the timesheet.
    pub bonuses: Decimal,
    /// Total earnings before deductions.
    pub gross_salary: Decimal,
}

impl Earnings {
    /// Sum of the itemized lines, independent of the stored gross.
    pub fn line_total(&self) -> Decimal {
        self.base_pay + self.overtime_pay + self.holiday_pay + self.allowances + self.bonuses
    }
}

/// Itemized deductions for a pay period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deductions {
    /// Progressive income tax.
    pub income_tax: Decimal,
    /// Combined social security and medicare contribution.
    pub social_security_medicare: Decimal,
    /// Insurance premium.
    pub insurance: Decimal,
    /// Provident fund contribution.
    pub provident_fund: Decimal,
    /// Sum of the four deductions.
    pub total_deductions: Decimal,
}

impl Deductions {
    /// Sum of the itemized lines, independent of the stored total.
    pub fn line_total(&self) -> Decimal {
        self.income_tax + self.social_security_medicare + self.insurance + self.provident_fund
    }
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The unique identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// How urgently a warning needs human attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningSeverity {
    /// Informational; an assumption was made.
    Low,
    /// Worth checking before payment.
    Medium,
    /// Must be reviewed before payment.
    High,
}

/// A non-fatal condition raised during calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditWarning {
    /// A code identifying the type of warning.
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// How serious the warning is.
    pub severity: WarningSeverity,
}

/// The complete audit trace for a calculation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrace {
    /// The sequence of calculation steps.
    pub steps: Vec<AuditStep>,
    /// Any warnings generated during calculation.
    pub warnings: Vec<AuditWarning>,
}

/// The computed salary slip for one employee and one pay period.
///
/// Created fresh per timesheet and never mutated afterwards. Apart from
/// `generated_at`, calculating the same timesheet twice yields an equal slip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalarySlipRecord {
    /// Who the slip is for.
    pub employee: EmployeeInfo,
    /// The period the slip covers.
    pub period: PayPeriod,
    /// Hours the earnings were computed from.
    pub hours: WorkingHours,
    /// Hourly rate applied to regular hours.
    pub hourly_rate: Decimal,
    /// Effective rate applied to overtime hours.
    pub overtime_rate: Decimal,
    /// Itemized earnings.
    pub earnings: Earnings,
    /// Itemized deductions.
    pub deductions: Deductions,
    /// Gross salary minus total deductions.
    pub net_salary: Decimal,
    /// When the slip was computed.
    pub generated_at: DateTime<Utc>,
    /// Every rule applied, plus any warnings.
    pub audit_trace: AuditTrace,
}

impl SalarySlipRecord {
    /// True when net pay is zero or negative and a human should look at it.
    pub fn needs_review(&self) -> bool {
        self.net_salary <= Decimal::ZERO
    }

    /// True when the calculator raised a warning of the given code.
    pub fn has_warning(&self, code: &str) -> bool {
        self.audit_trace.warnings.iter().any(|w| w.code == code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn sample_earnings() -> Earnings {
        Earnings {
            base_pay: dec("4000.00"),
            overtime_pay: dec("375.00"),
            holiday_pay: dec("0.00"),
            allowances: dec("0.00"),
            bonuses: dec("0.00"),
            gross_salary: dec("4375.00"),
        }
    }

    #[test]
    fn test_earnings_line_total_matches_gross() {
        let earnings = sample_earnings();
        assert_eq!(earnings.line_total(), earnings.gross_salary);
    }

    #[test]
    fn test_deductions_line_total() {
        let deductions = Deductions {
            income_tax: dec("642.50"),
            social_security_medicare: dec("334.69"),
            insurance: dec("100.00"),
            provident_fund: dec("218.75"),
            total_deductions: dec("1295.94"),
        };
        assert_eq!(deductions.line_total(), deductions.total_deductions);
    }

    #[test]
    fn test_earnings_serialize_amounts_as_strings() {
        let json = serde_json::to_string(&sample_earnings()).unwrap();
        assert!(json.contains("\"base_pay\":\"4000.00\""));
        assert!(json.contains("\"gross_salary\":\"4375.00\""));
    }

    #[test]
    fn test_warning_severity_serialization() {
        assert_eq!(
            serde_json::to_string(&WarningSeverity::High).unwrap(),
            "\"high\""
        );
        let severity: WarningSeverity = serde_json::from_str("\"low\"").unwrap();
        assert_eq!(severity, WarningSeverity::Low);
    }

    #[test]
    fn test_audit_trace_default_is_empty() {
        let trace = AuditTrace::default();
        assert!(trace.steps.is_empty());
        assert!(trace.warnings.is_empty());
    }
}
