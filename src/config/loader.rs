//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configurations from YAML files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{EngineError, EngineResult};

use super::types::{CompanyInfo, PayrollConfig, PayrollRules};

/// Loads payroll configuration from a directory.
///
/// # Directory Structure
///
/// ```text
/// config/standard/
/// ├── payroll.yaml   # Tax brackets, deduction rates, earnings multipliers
/// └── company.yaml   # Company name and address printed on slips
/// ```
///
/// # Example
///
/// ```no_run
/// use payslip_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/standard")?;
/// println!("Company: {}", loader.config().company().name);
/// # Ok::<(), payslip_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if either file is missing, contains invalid YAML, or
    /// describes a rule set that fails validation.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let rules = Self::load_yaml::<PayrollRules>(&path.join("payroll.yaml"))?;
        let company = Self::load_yaml::<CompanyInfo>(&path.join("company.yaml"))?;

        let config = PayrollConfig::new(rules, company)?;
        debug!(path = %path.display(), brackets = config.tax_brackets().len(), "Loaded payroll configuration");

        Ok(Self { config })
    }

    /// Wraps an already-built configuration.
    pub fn from_config(config: PayrollConfig) -> Self {
        Self { config }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    pub fn into_config(self) -> PayrollConfig {
        self.config
    }
}
