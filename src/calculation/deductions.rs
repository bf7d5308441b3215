//! Deductions from gross salary.
//!
//! Income tax comes from [`calculate_income_tax`]; the remaining three lines
//! are proportional or flat:
//!
//! - social security and medicare: gross × (6.2% + 1.45%)
//! - provident fund: gross × 5%
//! - insurance: the flat premium, never more than gross itself
//!
//! The lines are independent, so for a very low gross their sum can exceed
//! gross. The calculator flags the resulting non-positive net pay.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::income_tax::calculate_income_tax;
use super::rounding::round_money;
use crate::config::PayrollRules;
use crate::models::{AuditStep, Deductions};

/// The result of the deductions calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionsResult {
    /// The itemized deductions.
    pub deductions: Deductions,
    /// Audit steps, one per line plus the total.
    pub audit_steps: Vec<AuditStep>,
}

/// Calculates itemized deductions on a gross salary.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_deductions;
/// use payslip_engine::config::PayrollRules;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let result = calculate_deductions(
///     Decimal::from_str("4375.00").unwrap(),
///     &PayrollRules::standard(),
///     1,
/// );
/// assert_eq!(result.deductions.total_deductions, Decimal::from_str("1295.94").unwrap());
/// ```
pub fn calculate_deductions(
    gross: Decimal,
    rules: &PayrollRules,
    step_number_start: u32,
) -> DeductionsResult {
    let mut audit_steps = Vec::with_capacity(5);
    let mut step_number = step_number_start;
    let rates = &rules.deductions;

    let tax_result = calculate_income_tax(gross, &rules.tax_brackets, step_number);
    let income_tax = tax_result.amount;
    audit_steps.push(tax_result.audit_step);
    step_number += 1;

    let ss_rate = rates.social_security_medicare_rate();
    let social_security_medicare = round_money(gross * ss_rate);
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "social_security_medicare".to_string(),
        rule_name: "Social Security and Medicare".to_string(),
        input: serde_json::json!({
            "gross_salary": gross.to_string(),
            "social_security_rate": rates.social_security_rate.normalize().to_string(),
            "medicare_rate": rates.medicare_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "amount": social_security_medicare.to_string()
        }),
        reasoning: format!(
            "${} × {}% = ${}",
            gross,
            (ss_rate * Decimal::from(100)).normalize(),
            social_security_medicare
        ),
    });
    step_number += 1;

    let provident_fund = round_money(gross * rates.provident_fund_rate);
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "provident_fund".to_string(),
        rule_name: "Provident Fund".to_string(),
        input: serde_json::json!({
            "gross_salary": gross.to_string(),
            "provident_fund_rate": rates.provident_fund_rate.normalize().to_string()
        }),
        output: serde_json::json!({
            "amount": provident_fund.to_string()
        }),
        reasoning: format!(
            "${} × {}% = ${}",
            gross,
            (rates.provident_fund_rate * Decimal::from(100)).normalize(),
            provident_fund
        ),
    });
    step_number += 1;

    // Insurance never exceeds gross
    let insurance = round_money(rates.insurance_flat.min(gross.max(Decimal::ZERO)));
    let capped = insurance < rates.insurance_flat;
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "insurance".to_string(),
        rule_name: "Insurance Premium".to_string(),
        input: serde_json::json!({
            "insurance_flat": rates.insurance_flat.to_string(),
            "gross_salary": gross.to_string()
        }),
        output: serde_json::json!({
            "amount": insurance.to_string(),
            "capped": capped
        }),
        reasoning: if capped {
            format!(
                "Flat premium ${} capped at gross ${}",
                rates.insurance_flat, insurance
            )
        } else {
            format!("Flat premium ${}", insurance)
        },
    });
    step_number += 1;

    let total_deductions = income_tax + social_security_medicare + insurance + provident_fund;
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "total_deductions".to_string(),
        rule_name: "Total Deductions".to_string(),
        input: serde_json::json!({
            "income_tax": income_tax.to_string(),
            "social_security_medicare": social_security_medicare.to_string(),
            "insurance": insurance.to_string(),
            "provident_fund": provident_fund.to_string()
        }),
        output: serde_json::json!({
            "total_deductions": total_deductions.to_string()
        }),
        reasoning: format!(
            "${} + ${} + ${} + ${} = ${}",
            income_tax, social_security_medicare, insurance, provident_fund, total_deductions
        ),
    });

    DeductionsResult {
        deductions: Deductions {
            income_tax,
            social_security_medicare,
            insurance,
            provident_fund,
            total_deductions,
        },
        audit_steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn deductions(gross: &str) -> Deductions {
        calculate_deductions(dec(gross), &PayrollRules::standard(), 1).deductions
    }

    #[test]
    fn test_scenario_deductions() {
        let d = deductions("4375.00");
        assert_eq!(d.income_tax, dec("642.50"));
        assert_eq!(d.social_security_medicare, dec("334.69"));
        assert_eq!(d.insurance, dec("100.00"));
        assert_eq!(d.provident_fund, dec("218.75"));
        assert_eq!(d.total_deductions, dec("1295.94"));
        assert_eq!(d.line_total(), d.total_deductions);
    }

    #[test]
    fn test_low_gross_caps_insurance() {
        let result = calculate_deductions(dec("50.00"), &PayrollRules::standard(), 1);
        let d = &result.deductions;
        assert_eq!(d.income_tax, dec("5.00"));
        assert_eq!(d.social_security_medicare, dec("3.83"));
        assert_eq!(d.provident_fund, dec("2.50"));
        assert_eq!(d.insurance, dec("50.00"));
        // The other lines are not subtracted before capping, so the total exceeds gross
        assert_eq!(d.total_deductions, dec("61.33"));
        assert_eq!(result.audit_steps[3].output["capped"], true);
    }

    #[test]
    fn test_insurance_is_full_premium_just_above_it() {
        let d = deductions("110.00");
        assert_eq!(d.insurance, dec("100.00"));
        assert_eq!(d.income_tax, dec("11.00"));
        assert_eq!(d.social_security_medicare, dec("8.42"));
        assert_eq!(d.provident_fund, dec("5.50"));
        assert_eq!(d.total_deductions, dec("124.92"));
    }

    #[test]
    fn test_zero_gross_has_no_deductions() {
        let d = deductions("0.00");
        assert_eq!(d.total_deductions, dec("0.00"));
        assert_eq!(d.insurance, dec("0.00"));
    }

    #[test]
    fn test_insurance_uncapped_above_threshold() {
        let result = calculate_deductions(dec("1000.00"), &PayrollRules::standard(), 1);
        assert_eq!(result.deductions.insurance, dec("100.00"));
        let insurance_step = &result.audit_steps[3];
        assert_eq!(insurance_step.rule_id, "insurance");
        assert_eq!(insurance_step.output["capped"], false);
    }

    #[test]
    fn test_audit_step_order() {
        let result = calculate_deductions(dec("4375.00"), &PayrollRules::standard(), 6);
        let ids: Vec<&str> = result.audit_steps.iter().map(|s| s.rule_id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "income_tax",
                "social_security_medicare",
                "provident_fund",
                "insurance",
                "total_deductions"
            ]
        );
        assert_eq!(result.audit_steps[0].step_number, 6);
        assert_eq!(result.audit_steps[4].step_number, 10);
    }
}
