//! Salary slip output directory.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::input::is_timesheet_file;
use crate::error::{EngineError, EngineResult};
use crate::pipeline::SlipSink;
use crate::render::SlipFormat;

/// Marker separating the employee part of a slip file name from its date.
const SLIP_MARKER: &str = "_SalarySlip_";

/// Writes delivered slips into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Creates a sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SlipSink for DirectorySink {
    fn deliver(&self, file_name: &str, _content_type: &str, bytes: &[u8]) -> EngineResult<()> {
        check_file_name(file_name)?;
        fs::create_dir_all(&self.dir).map_err(|e| storage_error(&self.dir, e))?;
        let path = self.dir.join(file_name);
        fs::write(&path, bytes).map_err(|e| storage_error(&path, e))?;
        debug!(path = %path.display(), bytes = bytes.len(), "Wrote salary slip");
        Ok(())
    }
}

/// A salary slip file in the output directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipFileInfo {
    /// File name within the output directory.
    pub filename: String,
    /// Employee id parsed from the file name.
    pub employee_id: String,
    /// Employee name parsed from the file name, underscores as spaces.
    pub employee_name: String,
    /// File modification time.
    pub created_at: DateTime<Utc>,
    /// File size in bytes.
    pub size: u64,
}

/// Splits `{id}_{name}_SalarySlip_{date}.{ext}` into id and display name.
///
/// Returns `None` for files that do not follow the slip naming scheme.
pub fn parse_slip_file_name(file_name: &str) -> Option<(String, String)> {
    let (stem, extension) = file_name.rsplit_once('.')?;
    SlipFormat::from_extension(extension)?;
    let (employee, _date) = stem.split_once(SLIP_MARKER)?;
    let (id, name) = employee.split_once('_').unwrap_or((employee, ""));
    if id.is_empty() {
        return None;
    }
    Some((id.to_string(), name.replace('_', " ")))
}

/// Lists slips in `dir`, newest first. A missing directory lists as empty.
pub fn list_slips<P: AsRef<Path>>(dir: P) -> EngineResult<Vec<SlipFileInfo>> {
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let entries = fs::read_dir(dir).map_err(|e| storage_error(dir, e))?;

    let mut slips = Vec::new();
    for entry in entries.filter_map(|entry| entry.ok()) {
        let filename = entry.file_name().to_string_lossy().into_owned();
        let Some((employee_id, employee_name)) = parse_slip_file_name(&filename) else {
            continue;
        };
        let metadata = entry.metadata().map_err(|e| storage_error(&entry.path(), e))?;
        if !metadata.is_file() {
            continue;
        }
        let created_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        slips.push(SlipFileInfo {
            filename,
            employee_id,
            employee_name,
            created_at,
            size: metadata.len(),
        });
    }

    slips.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.filename.cmp(&b.filename))
    });
    Ok(slips)
}

/// Reads one slip file.
pub fn read_slip<P: AsRef<Path>>(dir: P, file_name: &str) -> EngineResult<Vec<u8>> {
    let path = slip_path(dir.as_ref(), file_name)?;
    fs::read(&path).map_err(|e| storage_error(&path, e))
}

/// Deletes one slip file.
pub fn delete_slip<P: AsRef<Path>>(dir: P, file_name: &str) -> EngineResult<()> {
    let path = slip_path(dir.as_ref(), file_name)?;
    fs::remove_file(&path).map_err(|e| storage_error(&path, e))?;
    info!(path = %path.display(), "Deleted salary slip");
    Ok(())
}

/// Stores an uploaded timesheet file in the input directory.
///
/// Rejects names with path components and anything that is not `.json` or
/// `.xlsx`.
pub fn save_upload<P: AsRef<Path>>(dir: P, file_name: &str, bytes: &[u8]) -> EngineResult<PathBuf> {
    let dir = dir.as_ref();
    check_file_name(file_name)?;
    if !is_timesheet_file(Path::new(file_name)) {
        return Err(EngineError::InvalidInput {
            path: file_name.to_string(),
            message: "only .json and .xlsx timesheet files are accepted".to_string(),
        });
    }
    fs::create_dir_all(dir).map_err(|e| storage_error(dir, e))?;
    let path = dir.join(file_name);
    fs::write(&path, bytes).map_err(|e| storage_error(&path, e))?;
    info!(path = %path.display(), bytes = bytes.len(), "Saved uploaded timesheet");
    Ok(path)
}

fn slip_path(dir: &Path, file_name: &str) -> EngineResult<PathBuf> {
    check_file_name(file_name)?;
    let path = dir.join(file_name);
    if !path.is_file() {
        return Err(EngineError::SlipNotFound {
            file_name: file_name.to_string(),
        });
    }
    Ok(path)
}

fn check_file_name(file_name: &str) -> EngineResult<()> {
    let valid = !file_name.is_empty()
        && !file_name.contains(['/', '\\', '\0'])
        && !file_name.contains("..")
        && !file_name.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(EngineError::InvalidInput {
            path: file_name.to_string(),
            message: "file name must not contain path components".to_string(),
        })
    }
}

fn storage_error(path: &Path, error: std::io::Error) -> EngineError {
    EngineError::Storage {
        path: path.display().to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SLIP: &str = "EMP001_John_Smith_SalarySlip_20251031.txt";

    #[test]
    fn test_parse_slip_file_name() {
        assert_eq!(
            parse_slip_file_name(SLIP),
            Some(("EMP001".to_string(), "John Smith".to_string()))
        );
        assert_eq!(
            parse_slip_file_name("1001_Ana_SalarySlip_20251031.json"),
            Some(("1001".to_string(), "Ana".to_string()))
        );
        assert_eq!(parse_slip_file_name("notes.txt"), None);
        assert_eq!(
            parse_slip_file_name("EMP001_A_SalarySlip_20251031.pdf"),
            Some(("EMP001".to_string(), "A".to_string()))
        );
        assert_eq!(parse_slip_file_name("EMP001_A_SalarySlip_20251031.docx"), None);
    }

    #[test]
    fn test_sink_writes_into_created_dir() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("salary_slips");
        let sink = DirectorySink::new(&out);

        sink.deliver(SLIP, "text/plain", b"slip").unwrap();
        assert_eq!(fs::read(out.join(SLIP)).unwrap(), b"slip");
    }

    #[test]
    fn test_sink_rejects_path_components() {
        let dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(dir.path());
        assert!(sink.deliver("../escape.txt", "text/plain", b"x").is_err());
    }

    #[test]
    fn test_list_read_delete() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SLIP), b"hello").unwrap();
        fs::write(dir.path().join("README.md"), b"ignored").unwrap();

        let slips = list_slips(dir.path()).unwrap();
        assert_eq!(slips.len(), 1);
        assert_eq!(slips[0].employee_id, "EMP001");
        assert_eq!(slips[0].employee_name, "John Smith");
        assert_eq!(slips[0].size, 5);

        assert_eq!(read_slip(dir.path(), SLIP).unwrap(), b"hello");
        delete_slip(dir.path(), SLIP).unwrap();
        assert!(list_slips(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_slip_is_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            read_slip(dir.path(), SLIP),
            Err(EngineError::SlipNotFound { .. })
        ));
        assert!(matches!(
            delete_slip(dir.path(), SLIP),
            Err(EngineError::SlipNotFound { .. })
        ));
    }

    #[test]
    fn test_traversal_is_rejected() {
        let dir = TempDir::new().unwrap();
        let error = read_slip(dir.path(), "../secret.txt").unwrap_err();
        assert!(matches!(error, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn test_list_missing_dir_is_empty() {
        assert!(list_slips("/nonexistent/salary_slips").unwrap().is_empty());
    }

    #[test]
    fn test_save_upload() {
        let dir = TempDir::new().unwrap();
        let path = save_upload(dir.path().join("timesheets"), "october.json", b"{}").unwrap();
        assert!(path.ends_with("october.json"));
        assert_eq!(fs::read(path).unwrap(), b"{}");
    }

    #[test]
    fn test_save_upload_accepts_workbooks() {
        let dir = TempDir::new().unwrap();
        let path = save_upload(dir.path(), "october.xlsx", b"PK").unwrap();
        assert!(path.ends_with("october.xlsx"));
    }

    #[test]
    fn test_save_upload_rejects_other_extensions() {
        let dir = TempDir::new().unwrap();
        assert!(save_upload(dir.path(), "october.csv", b"x").is_err());
        assert!(save_upload(dir.path(), "../october.json", b"x").is_err());
    }
}
