//! HTTP request handlers for the payroll API.
//!
//! This module contains the handler functions for all API endpoints.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineResult;
use crate::pipeline::RunSummary;
use crate::render::SlipFormat;
use crate::storage::{DirectorySink, delete_slip, list_slips, load_input_dir, read_slip, save_upload};

use super::response::{
    ApiError, ApiErrorResponse, DeleteResponse, ProcessResponse, ServiceIndex, SlipListResponse,
    UploadResponse,
};
use super::state::AppState;

/// Largest accepted upload body.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Multipart field carrying the timesheet file.
const UPLOAD_FIELD: &str = "file";

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/upload", post(upload_handler))
        .route("/api/process", post(process_handler))
        .route("/api/salary-slips", get(list_handler))
        .route(
            "/api/salary-slips/:filename",
            get(download_handler).delete(delete_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

/// Handler for `GET /`.
async fn index_handler() -> Json<ServiceIndex> {
    let endpoints = [
        ("GET /", "Service index"),
        ("POST /api/upload", "Upload a timesheet .json or .xlsx file (multipart field 'file')"),
        ("POST /api/process", "Process all uploaded timesheets into salary slips"),
        ("GET /api/salary-slips", "List generated salary slips, newest first"),
        ("GET /api/salary-slips/:filename", "Download a salary slip"),
        ("DELETE /api/salary-slips/:filename", "Delete a salary slip"),
    ]
    .into_iter()
    .map(|(route, description)| (route.to_string(), description.to_string()))
    .collect::<BTreeMap<_, _>>();

    Json(ServiceIndex {
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints,
    })
}

/// Handler for `POST /api/upload`.
///
/// Stores the `file` field of a multipart body in the input directory.
async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing upload request");

    let mut multipart = multipart.map_err(|rejection| {
        warn!(correlation_id = %correlation_id, error = %rejection, "Multipart rejected");
        ApiErrorResponse::new(
            StatusCode::BAD_REQUEST,
            ApiError::invalid_upload(rejection.body_text()),
        )
    })?;

    let mut upload: Option<(String, Vec<u8>)> = None;
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(error) => {
                warn!(correlation_id = %correlation_id, error = %error, "Malformed multipart body");
                return Err(ApiErrorResponse::new(
                    error.status(),
                    ApiError::invalid_upload(format!(
                        "Failed to read multipart body: {}",
                        error.body_text()
                    )),
                ));
            }
        };
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            return Err(ApiErrorResponse::new(
                StatusCode::BAD_REQUEST,
                ApiError::invalid_upload("upload field 'file' has no file name"),
            ));
        };
        let bytes = field.bytes().await.map_err(|error| {
            warn!(correlation_id = %correlation_id, error = %error, "Failed to read upload bytes");
            ApiErrorResponse::new(
                error.status(),
                ApiError::invalid_upload(format!("Failed to read file data: {}", error.body_text())),
            )
        })?;
        upload = Some((file_name, bytes.to_vec()));
    }

    let Some((file_name, bytes)) = upload else {
        warn!(correlation_id = %correlation_id, "Upload without a file field");
        return Err(ApiErrorResponse::new(
            StatusCode::BAD_REQUEST,
            ApiError::invalid_upload("No file provided in field 'file'"),
        ));
    };

    save_upload(state.input_dir(), &file_name, &bytes).map_err(|error| {
        warn!(correlation_id = %correlation_id, error = %error, "Upload rejected");
        ApiErrorResponse::from(error)
    })?;

    info!(
        correlation_id = %correlation_id,
        filename = %file_name,
        size = bytes.len(),
        "Timesheet uploaded"
    );
    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        filename: file_name,
        size: bytes.len(),
    }))
}

/// Handler for `POST /api/process`.
///
/// Runs the pipeline over every timesheet in the input directory on a
/// blocking worker and writes slips into the output directory.
async fn process_handler(
    State(state): State<AppState>,
) -> Result<Json<ProcessResponse>, ApiErrorResponse> {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing payroll run request");
    let start_time = Instant::now();

    let summary = tokio::task::spawn_blocking(move || run_directory(&state))
        .await
        .map_err(|error| {
            warn!(correlation_id = %correlation_id, error = %error, "Payroll worker failed");
            ApiErrorResponse::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiError::internal("Payroll run did not complete"),
            )
        })?
        .map_err(|error| {
            warn!(correlation_id = %correlation_id, error = %error, "Payroll run failed");
            ApiErrorResponse::from(error)
        })?;

    info!(
        correlation_id = %correlation_id,
        run_id = %summary.run_id,
        attempted = summary.attempted,
        succeeded = summary.succeeded,
        failed = summary.failed,
        total_payroll = %summary.total_payroll,
        duration_us = start_time.elapsed().as_micros(),
        "Payroll run request completed"
    );
    Ok(Json(summary.into()))
}

/// Loads the input directory and runs it through a fresh pipeline.
///
/// A missing input directory means nothing has been uploaded yet.
fn run_directory(state: &AppState) -> EngineResult<RunSummary> {
    let records = if state.input_dir().exists() {
        load_input_dir(state.input_dir())?
    } else {
        Vec::new()
    };
    let sink = DirectorySink::new(state.output_dir());
    Ok(state.pipeline().run(records, &sink))
}

/// Handler for `GET /api/salary-slips`.
async fn list_handler(
    State(state): State<AppState>,
) -> Result<Json<SlipListResponse>, ApiErrorResponse> {
    let salary_slips = list_slips(state.output_dir())?;
    Ok(Json(SlipListResponse {
        total: salary_slips.len(),
        salary_slips,
    }))
}

/// Handler for `GET /api/salary-slips/:filename`.
async fn download_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiErrorResponse> {
    let bytes = read_slip(state.output_dir(), &filename).map_err(|error| {
        warn!(filename = %filename, error = %error, "Salary slip download failed");
        ApiErrorResponse::from(error)
    })?;

    let content_type = filename
        .rsplit_once('.')
        .and_then(|(_, extension)| SlipFormat::from_extension(extension))
        .map(|format| format.renderer().content_type())
        .unwrap_or("application/octet-stream");
    let disposition = format!("attachment; filename=\"{}\"", filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Handler for `DELETE /api/salary-slips/:filename`.
async fn delete_handler(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<DeleteResponse>, ApiErrorResponse> {
    delete_slip(state.output_dir(), &filename).map_err(|error| {
        warn!(filename = %filename, error = %error, "Salary slip delete failed");
        ApiErrorResponse::from(error)
    })?;
    Ok(Json(DeleteResponse {
        message: "Salary slip deleted successfully".to_string(),
        filename,
    }))
}
