//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every failure the pipeline can report. Each error also belongs to a
//! [`FailureKind`], which is how the run summary tells a record that never
//! parsed apart from one that was calculated but never delivered.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The main error type for the payroll engine.
///
/// # Example
///
/// ```
/// use payslip_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/payroll.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/payroll.yaml");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// Configuration parsed but describes an unusable rule set.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// A timesheet field was missing, malformed or out of range.
    #[error("Invalid field '{field}': {message}")]
    Validation {
        /// The canonical name of the offending field.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// The same employee appeared more than once in a processing run.
    #[error("Duplicate employee_id '{employee_id}' in processing run")]
    DuplicateEmployee {
        /// The repeated employee identifier.
        employee_id: String,
    },

    /// The calculator hit an invariant it cannot work around.
    #[error("Calculation error for employee '{employee_id}': {message}")]
    Calculation {
        /// The employee whose calculation failed.
        employee_id: String,
        /// A description of the calculation error.
        message: String,
    },

    /// A salary slip could not be rendered or delivered.
    #[error("Failed to render salary slip for employee '{employee_id}': {message}")]
    Render {
        /// The employee whose slip failed to render.
        employee_id: String,
        /// A description of the render failure.
        message: String,
    },

    /// A timesheet file could not be read or decoded.
    #[error("Invalid timesheet file '{path}': {message}")]
    InvalidInput {
        /// The file that could not be decoded.
        path: String,
        /// A description of the problem.
        message: String,
    },

    /// A requested salary slip file does not exist.
    #[error("Salary slip not found: {file_name}")]
    SlipNotFound {
        /// The requested file name.
        file_name: String,
    },

    /// Reading or writing the input/output directories failed.
    #[error("Storage error at '{path}': {message}")]
    Storage {
        /// The path involved in the failed operation.
        path: String,
        /// A description of the I/O failure.
        message: String,
    },
}

/// The pipeline stage an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The record never produced a valid timesheet.
    Validation,
    /// The timesheet was valid but could not be calculated.
    Calculation,
    /// The slip was calculated but could not be rendered or written.
    Render,
    /// Configuration or file-system problems outside a single record.
    Storage,
}

impl EngineError {
    /// Returns the failure class this error is reported under.
    pub fn kind(&self) -> FailureKind {
        match self {
            EngineError::Validation { .. }
            | EngineError::DuplicateEmployee { .. }
            | EngineError::InvalidInput { .. } => FailureKind::Validation,
            EngineError::Calculation { .. } => FailureKind::Calculation,
            EngineError::Render { .. } => FailureKind::Render,
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. }
            | EngineError::SlipNotFound { .. }
            | EngineError::Storage { .. } => FailureKind::Storage,
        }
    }

    /// Shorthand for building a [`EngineError::Validation`].
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
