//! HTTP API for the payroll engine.
//!
//! Uploaded timesheets land in the input directory, `POST /api/process`
//! runs the pipeline over it, and the salary slip routes list, download and
//! delete what the run produced.

mod handlers;
mod response;
mod state;

pub use handlers::{MAX_UPLOAD_BYTES, create_router};
pub use response::{
    ApiError, ApiErrorResponse, DeleteResponse, ProcessResponse, ServiceIndex, SlipListResponse,
    UploadResponse,
};
pub use state::AppState;
