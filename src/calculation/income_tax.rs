//! Progressive income tax.
//!
//! Tax is marginal: each band's rate applies only to the slice of gross
//! salary that falls inside that band. With the standard schedule a gross of
//! 4,375.00 is taxed as
//!
//! ```text
//!   1,000.00 × 10% = 100.00
//!   2,000.00 × 12% = 240.00
//!   1,375.00 × 22% = 302.50
//!                    ------
//!                    642.50
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::rounding::round_money;
use crate::config::TaxBracket;
use crate::models::AuditStep;

/// Tax owed on one slice of income.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketSlice {
    /// Lower bound of the band.
    pub lower: Decimal,
    /// Upper bound of the band, `None` for the open top band.
    pub upper: Option<Decimal>,
    /// Portion of income falling in the band.
    pub taxable: Decimal,
    /// The band's marginal rate.
    pub rate: Decimal,
    /// Unrounded tax for the slice.
    pub tax: Decimal,
}

/// The result of the income tax calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeTaxResult {
    /// Tax owed, rounded to the cent.
    pub amount: Decimal,
    /// Per-band breakdown.
    pub slices: Vec<BracketSlice>,
    /// The audit step recording this calculation.
    pub audit_step: AuditStep,
}

/// Calculates progressive income tax on a gross amount.
///
/// Slices are summed unrounded and the total rounded once. Negative or zero
/// gross owes no tax.
///
/// # Examples
///
/// ```
/// use payslip_engine::calculation::calculate_income_tax;
/// use payslip_engine::config::PayrollRules;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let brackets = PayrollRules::standard().tax_brackets;
/// let result = calculate_income_tax(Decimal::from_str("1000.00").unwrap(), &brackets, 1);
/// assert_eq!(result.amount, Decimal::from_str("100.00").unwrap());
/// ```
pub fn calculate_income_tax(
    gross: Decimal,
    brackets: &[TaxBracket],
    step_number: u32,
) -> IncomeTaxResult {
    let mut slices = Vec::new();
    let mut lower = Decimal::ZERO;

    for bracket in brackets {
        if gross <= lower {
            break;
        }
        let top = match bracket.upper_limit {
            Some(limit) => gross.min(limit),
            None => gross,
        };
        let taxable = top - lower;
        if taxable > Decimal::ZERO {
            slices.push(BracketSlice {
                lower,
                upper: bracket.upper_limit,
                taxable,
                rate: bracket.rate,
                tax: taxable * bracket.rate,
            });
        }
        match bracket.upper_limit {
            Some(limit) => lower = limit,
            None => break,
        }
    }

    let unrounded: Decimal = slices.iter().map(|slice| slice.tax).sum();
    let amount = round_money(unrounded);

    let reasoning = if slices.is_empty() {
        format!("No income tax on gross ${}", gross)
    } else {
        let parts: Vec<String> = slices
            .iter()
            .map(|slice| {
                format!(
                    "${} × {}%",
                    slice.taxable.normalize(),
                    (slice.rate * Decimal::from(100)).normalize()
                )
            })
            .collect();
        format!("{} = ${}", parts.join(" + "), amount)
    };

    let slice_json: Vec<serde_json::Value> = slices
        .iter()
        .map(|slice| {
            serde_json::json!({
                "lower": slice.lower.normalize().to_string(),
                "upper": slice.upper.map(|u| u.normalize().to_string()),
                "taxable": slice.taxable.normalize().to_string(),
                "rate": slice.rate.normalize().to_string(),
                "tax": slice.tax.normalize().to_string()
            })
        })
        .collect();

    let audit_step = AuditStep {
        step_number,
        rule_id: "income_tax".to_string(),
        rule_name: "Progressive Income Tax".to_string(),
        input: serde_json::json!({
            "gross_salary": gross.to_string(),
            "brackets": brackets.len()
        }),
        output: serde_json::json!({
            "slices": slice_json,
            "amount": amount.to_string()
        }),
        reasoning,
    };

    IncomeTaxResult {
        amount,
        slices,
        audit_step,
    }
}
