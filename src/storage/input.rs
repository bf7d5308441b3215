//! Timesheet input discovery and decoding.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::workbook::{WORKBOOK_EXTENSION, load_workbook};
use crate::error::{EngineError, EngineResult};
use crate::models::RawTimesheet;
use crate::pipeline::InputRecord;

/// Extension of JSON timesheet input files.
pub const TIMESHEET_EXTENSION: &str = "json";

/// Lists timesheet files in `dir`, sorted by file name.
///
/// Only regular files with a `.json` or `.xlsx` extension (any case) are
/// returned.
pub fn discover_timesheets<P: AsRef<Path>>(dir: P) -> EngineResult<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries = fs::read_dir(dir).map_err(|e| EngineError::Storage {
        path: dir.display().to_string(),
        message: e.to_string(),
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_timesheet_file(path))
        .collect();
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    debug!(dir = %dir.display(), files = files.len(), "Discovered timesheet files");
    Ok(files)
}

/// True when the path has a `.json` or `.xlsx` extension.
pub fn is_timesheet_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ext.eq_ignore_ascii_case(TIMESHEET_EXTENSION)
                || ext.eq_ignore_ascii_case(WORKBOOK_EXTENSION)
        })
}

fn is_workbook_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(WORKBOOK_EXTENSION))
}

/// Decodes one timesheet file into input records.
///
/// A JSON file holds either one timesheet object or an array of them. Array
/// elements are decoded independently so one malformed element does not hide
/// the others; its sources are `name#index`. A workbook holds exactly one
/// timesheet. A file that cannot be read or decoded yields a single failed
/// record.
pub fn load_timesheet_file(path: &Path) -> Vec<InputRecord> {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    if is_workbook_file(path) {
        let content = load_workbook(path).map_err(|error| {
            warn!(path = %path.display(), error = %error, "Unreadable timesheet workbook");
            match error {
                EngineError::InvalidInput { message, .. } => EngineError::InvalidInput {
                    path: name.clone(),
                    message,
                },
                other => other,
            }
        });
        return vec![InputRecord {
            source: name,
            content,
        }];
    }

    let invalid = |message: String| EngineError::InvalidInput {
        path: name.clone(),
        message,
    };

    let value = fs::read_to_string(path)
        .map_err(|e| invalid(e.to_string()))
        .and_then(|content| {
            serde_json::from_str::<serde_json::Value>(&content).map_err(|e| invalid(e.to_string()))
        });

    let records = match value {
        Ok(serde_json::Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| InputRecord {
                source: format!("{}#{}", name, index),
                content: decode_timesheet(item).map_err(|message| invalid(message)),
            })
            .collect(),
        Ok(item) => vec![InputRecord {
            source: name.clone(),
            content: decode_timesheet(item).map_err(|message| invalid(message)),
        }],
        Err(error) => {
            warn!(path = %path.display(), error = %error, "Unreadable timesheet file");
            vec![InputRecord {
                source: name.clone(),
                content: Err(error),
            }]
        }
    };

    debug!(path = %path.display(), records = records.len(), "Loaded timesheet file");
    records
}

/// Decodes every timesheet file in `dir`, in discovery order.
pub fn load_input_dir<P: AsRef<Path>>(dir: P) -> EngineResult<Vec<InputRecord>> {
    let files = discover_timesheets(dir)?;
    Ok(files
        .iter()
        .flat_map(|path| load_timesheet_file(path))
        .collect())
}

fn decode_timesheet(value: serde_json::Value) -> Result<RawTimesheet, String> {
    serde_json::from_value(value).map_err(|e| e.to_string())
}
