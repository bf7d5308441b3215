//! Configuration types for payroll calculation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files, together with the fixed
//! rule set the engine ships with.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One band of the progressive income tax schedule.
///
/// The band covers income from the previous bracket's `upper_limit` up to its
/// own. A bracket without an upper limit is open-ended and must be last.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    /// Cumulative upper bound of the band, or `None` for the top band.
    #[serde(default)]
    pub upper_limit: Option<Decimal>,
    /// Marginal rate applied to income within the band (e.g. 0.12).
    pub rate: Decimal,
}

/// Statutory and company deduction rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeductionRates {
    /// Social security share of gross salary (6.2%).
    pub social_security_rate: Decimal,
    /// Medicare share of gross salary (1.45%).
    pub medicare_rate: Decimal,
    /// Flat insurance premium per pay period.
    pub insurance_flat: Decimal,
    /// Provident fund share of gross salary.
    pub provident_fund_rate: Decimal,
}

impl DeductionRates {
    /// Combined social security and medicare rate.
    pub fn social_security_medicare_rate(&self) -> Decimal {
        self.social_security_rate + self.medicare_rate
    }
}

/// Multipliers applied to the hourly rate for non-ordinary hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarningsRules {
    /// Overtime multiplier used when no distinct overtime rate is supplied.
    pub overtime_multiplier: Decimal,
    /// Multiplier for hours worked on holidays.
    pub holiday_multiplier: Decimal,
}

/// Contents of `payroll.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRules {
    /// Progressive tax schedule, lowest band first.
    pub tax_brackets: Vec<TaxBracket>,
    /// Deduction rates.
    pub deductions: DeductionRates,
    /// Earnings multipliers.
    pub earnings: EarningsRules,
}

/// Company presentation metadata printed on every slip (`company.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Legal name of the employer.
    pub name: String,
    /// Postal address of the employer.
    pub address: String,
}

impl Default for CompanyInfo {
    fn default() -> Self {
        Self {
            name: "TechCorp Industries Inc.".to_string(),
            address: "123 Business Avenue, San Francisco, CA 94102".to_string(),
        }
    }
}

impl PayrollRules {
    /// The fixed single-jurisdiction rule set.
    ///
    /// | Band            | Rate |
    /// |-----------------|------|
    /// | 0 – 1,000       | 10%  |
    /// | 1,000 – 3,000   | 12%  |
    /// | 3,000 – 5,000   | 22%  |
    /// | above 5,000     | 24%  |
    pub fn standard() -> Self {
        Self {
            tax_brackets: vec![
                TaxBracket {
                    upper_limit: Some(Decimal::new(1000, 0)),
                    rate: Decimal::new(10, 2),
                },
                TaxBracket {
                    upper_limit: Some(Decimal::new(3000, 0)),
                    rate: Decimal::new(12, 2),
                },
                TaxBracket {
                    upper_limit: Some(Decimal::new(5000, 0)),
                    rate: Decimal::new(22, 2),
                },
                TaxBracket {
                    upper_limit: None,
                    rate: Decimal::new(24, 2),
                },
            ],
            deductions: DeductionRates {
                social_security_rate: Decimal::new(62, 3),
                medicare_rate: Decimal::new(145, 4),
                insurance_flat: Decimal::new(100, 0),
                provident_fund_rate: Decimal::new(5, 2),
            },
            earnings: EarningsRules {
                overtime_multiplier: Decimal::new(15, 1),
                holiday_multiplier: Decimal::new(2, 0),
            },
        }
    }

    /// Checks that the rule set can be applied.
    ///
    /// Brackets must be non-empty, strictly ascending, end with exactly one
    /// open-ended band, and every rate must lie within `[0, 1]`.
    pub fn validate(&self) -> EngineResult<()> {
        let invalid = |message: String| Err(EngineError::InvalidConfig { message });

        if self.tax_brackets.is_empty() {
            return invalid("at least one tax bracket is required".to_string());
        }

        let last = self.tax_brackets.len() - 1;
        let mut previous = Decimal::ZERO;
        for (index, bracket) in self.tax_brackets.iter().enumerate() {
            check_rate(&format!("tax_brackets[{}].rate", index), bracket.rate)?;
            match (bracket.upper_limit, index == last) {
                (Some(limit), false) => {
                    if limit <= previous {
                        return invalid(format!(
                            "tax bracket limits must be ascending: {} follows {}",
                            limit, previous
                        ));
                    }
                    previous = limit;
                }
                (None, true) => {}
                (Some(_), true) => {
                    return invalid("the last tax bracket must be open-ended".to_string());
                }
                (None, false) => {
                    return invalid(format!(
                        "only the last tax bracket may be open-ended (bracket {})",
                        index
                    ));
                }
            }
        }

        let d = &self.deductions;
        check_rate("deductions.social_security_rate", d.social_security_rate)?;
        check_rate("deductions.medicare_rate", d.medicare_rate)?;
        check_rate("deductions.provident_fund_rate", d.provident_fund_rate)?;
        if d.insurance_flat < Decimal::ZERO {
            return invalid("deductions.insurance_flat must not be negative".to_string());
        }

        if self.earnings.overtime_multiplier <= Decimal::ZERO
            || self.earnings.holiday_multiplier <= Decimal::ZERO
        {
            return invalid("earnings multipliers must be positive".to_string());
        }

        Ok(())
    }
}

fn check_rate(name: &str, rate: Decimal) -> EngineResult<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(EngineError::InvalidConfig {
            message: format!("{} must be between 0 and 1, got {}", name, rate),
        });
    }
    Ok(())
}

/// The complete payroll configuration.
///
/// Immutable once built; the calculator and renderers receive it at
/// construction time instead of reading module-level constants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayrollConfig {
    rules: PayrollRules,
    company: CompanyInfo,
}

impl PayrollConfig {
    /// Creates a configuration from its parts after validating the rules.
    pub fn new(rules: PayrollRules, company: CompanyInfo) -> EngineResult<Self> {
        rules.validate()?;
        Ok(Self { rules, company })
    }

    /// The shipped rule set with the default company branding.
    pub fn standard() -> Self {
        Self {
            rules: PayrollRules::standard(),
            company: CompanyInfo::default(),
        }
    }

    /// Returns the calculation rules.
    pub fn rules(&self) -> &PayrollRules {
        &self.rules
    }

    /// Returns the tax schedule.
    pub fn tax_brackets(&self) -> &[TaxBracket] {
        &self.rules.tax_brackets
    }

    /// Returns the deduction rates.
    pub fn deductions(&self) -> &DeductionRates {
        &self.rules.deductions
    }

    /// Returns the earnings multipliers.
    pub fn earnings(&self) -> &EarningsRules {
        &self.rules.earnings
    }

    /// Returns the company branding.
    pub fn company(&self) -> &CompanyInfo {
        &self.company
    }
}

impl Default for PayrollConfig {
    fn default() -> Self {
        Self::standard()
    }
}
