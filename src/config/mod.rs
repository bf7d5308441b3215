//! Configuration loading and management for the payroll engine.
//!
//! Tax brackets, deduction rates, earnings multipliers and company branding
//! are carried in an immutable [`PayrollConfig`], either the built-in
//! [`PayrollConfig::standard`] rule set or one loaded from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use payslip_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/standard").unwrap();
//! println!("Brackets: {}", config.config().tax_brackets().len());
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CompanyInfo, DeductionRates, EarningsRules, PayrollConfig, PayrollRules, TaxBracket,
};
