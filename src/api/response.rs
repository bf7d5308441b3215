//! Response types for the payroll API.
//!
//! This module defines the response bodies and the error handling for the
//! HTTP API.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::pipeline::RunSummary;
use crate::storage::SlipFileInfo;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates an invalid upload error response.
    pub fn invalid_upload(message: impl Into<String>) -> Self {
        Self::new("INVALID_UPLOAD", message)
    }

    /// Creates an internal error response.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// Creates an error response.
    pub fn new(status: StatusCode, error: ApiError) -> Self {
        Self { status, error }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        let (status, error) = match error {
            EngineError::ConfigNotFound { .. }
            | EngineError::ConfigParseError { .. }
            | EngineError::InvalidConfig { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
            ),
            EngineError::Validation { field, .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::with_details(
                    "VALIDATION_ERROR",
                    message,
                    format!("The timesheet field '{}' is invalid", field),
                ),
            ),
            EngineError::DuplicateEmployee { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("DUPLICATE_EMPLOYEE", message),
            ),
            EngineError::InvalidInput { .. } => (
                StatusCode::BAD_REQUEST,
                ApiError::new("INVALID_INPUT", message),
            ),
            EngineError::Calculation { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiError::with_details("CALCULATION_ERROR", "Calculation failed", message),
            ),
            EngineError::Render { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("RENDER_ERROR", "Salary slip rendering failed", message),
            ),
            EngineError::SlipNotFound { .. } => (
                StatusCode::NOT_FOUND,
                ApiError::new("SLIP_NOT_FOUND", message),
            ),
            EngineError::Storage { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::with_details("STORAGE_ERROR", "Storage error", message),
            ),
        };
        ApiErrorResponse { status, error }
    }
}

/// Body of `GET /`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceIndex {
    /// Service name.
    pub service: String,
    /// Crate version.
    pub version: String,
    /// Route descriptions keyed by `METHOD path`.
    pub endpoints: BTreeMap<String, String>,
}

/// Body of `POST /api/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Outcome message.
    pub message: String,
    /// Stored file name.
    pub filename: String,
    /// Bytes stored.
    pub size: usize,
}

/// Body of `POST /api/process`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessResponse {
    /// One-line description of the run.
    pub message: String,
    /// The full run summary.
    #[serde(flatten)]
    pub summary: RunSummary,
}

impl From<RunSummary> for ProcessResponse {
    fn from(summary: RunSummary) -> Self {
        let message = if summary.attempted == 0 {
            "No timesheets found to process".to_string()
        } else {
            format!(
                "Processed {} timesheets: {} successful, {} failed",
                summary.attempted, summary.succeeded, summary.failed
            )
        };
        Self { message, summary }
    }
}

/// Body of `GET /api/salary-slips`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlipListResponse {
    /// Number of slips.
    pub total: usize,
    /// Slips, newest first.
    pub salary_slips: Vec<SlipFileInfo>,
}

/// Body of `DELETE /api/salary-slips/:filename`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// Outcome message.
    pub message: String,
    /// The deleted file.
    pub filename: String,
}
