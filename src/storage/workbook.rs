//! Spreadsheet (`.xlsx`) timesheet input.
//!
//! The timesheet template is a single `Timesheet` sheet laid out top to
//! bottom in blocks separated by blank rows:
//!
//! - label/value rows with the employee details and the pay period
//! - a daily attendance table whose header row starts with `date`
//! - label/value rows with the summary totals and rates
//!
//! Block positions are not fixed; rows are classified by content.

use std::path::Path;

use calamine::{Data, Reader, Xlsx, open_workbook};
use tracing::{debug, trace};

use crate::error::{EngineError, EngineResult};
use crate::models::{CellValue, RawRow, RawTimesheet};
use crate::parser::{Field, normalize_header};

/// Extension of spreadsheet timesheet files.
pub const WORKBOOK_EXTENSION: &str = "xlsx";

/// Sheet read when present; otherwise the first sheet is used.
pub const TIMESHEET_SHEET: &str = "Timesheet";

/// Header labels of the label/value blocks themselves.
const BLOCK_HEADERS: [&str; 3] = ["field", "metric", "value"];

/// Reads the timesheet sheet of an `.xlsx` workbook.
pub fn load_workbook(path: &Path) -> EngineResult<RawTimesheet> {
    let invalid = |message: String| EngineError::InvalidInput {
        path: path.display().to_string(),
        message,
    };

    let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: calamine::XlsxError| invalid(e.to_string()))?;
    let sheet_names = workbook.sheet_names();
    let sheet = sheet_names
        .iter()
        .find(|name| name.as_str() == TIMESHEET_SHEET)
        .or_else(|| sheet_names.first())
        .cloned()
        .ok_or_else(|| invalid("workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| invalid(format!("sheet {:?}: {}", sheet, e)))?;
    let rows: Vec<Vec<CellValue>> = range
        .rows()
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    debug!(path = %path.display(), sheet = %sheet, rows = rows.len(), "Read timesheet workbook");
    Ok(sheet_to_timesheet(&rows))
}

/// Maps sheet rows onto a raw timesheet.
///
/// Label/value rows become summary fields, keeping the first non-blank value
/// for a repeated label. Rows under a header starting with `date` become
/// attendance rows until a blank row or a row labelled with a known summary
/// field.
pub fn sheet_to_timesheet(rows: &[Vec<CellValue>]) -> RawTimesheet {
    let mut timesheet = RawTimesheet::default();
    let mut attendance_headers: Option<Vec<String>> = None;

    for row in rows {
        if row.iter().all(CellValue::is_blank) {
            attendance_headers = None;
            continue;
        }

        let label = match row.first() {
            Some(CellValue::Text(text)) => Some(text.trim()),
            _ => None,
        };
        let normalized = label.map(normalize_header).unwrap_or_default();

        if normalized == "date" {
            attendance_headers = Some(row.iter().map(header_text).collect());
            continue;
        }
        if Field::from_header(&normalized).is_some() || BLOCK_HEADERS.contains(&normalized.as_str())
        {
            attendance_headers = None;
        }

        if let Some(headers) = &attendance_headers {
            let day: RawRow = headers
                .iter()
                .zip(row)
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, value)| (header.clone(), value.clone()))
                .collect();
            timesheet.attendance.push(day);
            continue;
        }

        let Some(label) = label else {
            trace!(row = ?row, "Skipping unlabelled timesheet row");
            continue;
        };
        if BLOCK_HEADERS.contains(&normalized.as_str()) {
            continue;
        }
        let value = row.get(1).cloned().unwrap_or(CellValue::Empty);
        match timesheet.fields.get(label) {
            Some(existing) if !existing.is_blank() => {}
            _ => {
                timesheet.fields.insert(label.to_string(), value);
            }
        }
    }

    timesheet
}

fn header_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Text(text) => text.trim().to_string(),
        _ => String::new(),
    }
}

/// Converts a workbook cell. Dates become spreadsheet serial numbers.
fn cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Bool(value) => CellValue::Bool(*value),
        Data::Int(value) => CellValue::from(*value),
        Data::Float(value) => CellValue::Number(*value),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            CellValue::Text(text.clone())
        }
        Data::DateTime(date) => CellValue::Number(date.as_f64()),
        Data::Error(error) => CellValue::Text(format!("#{:?}", error)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_timesheet;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn text(value: &str) -> CellValue {
        CellValue::from(value)
    }

    fn pair(label: &str, value: CellValue) -> Vec<CellValue> {
        vec![text(label), value]
    }

    fn blank() -> Vec<CellValue> {
        vec![CellValue::Empty, CellValue::Empty]
    }

    fn day(date: &str, weekday: &str, status: &str, hours: f64, overtime: f64) -> Vec<CellValue> {
        vec![
            text(date),
            text(weekday),
            text(status),
            CellValue::Number(hours),
            CellValue::Number(overtime),
            text(""),
        ]
    }

    /// The template layout: details, period, attendance table, summary.
    fn template_rows() -> Vec<Vec<CellValue>> {
        vec![
            pair("Field", text("Value")),
            pair("Employee ID", text("EMP001")),
            pair("Name", text("John Smith")),
            pair("Department", text("Engineering")),
            pair("Designation", text("Senior Software Engineer")),
            pair("Email", text("john.smith@company.com")),
            pair("Bank Account", text("1234567890")),
            blank(),
            pair("Field", text("Value")),
            pair("Pay Period Start", text("2025-10-01")),
            pair("Pay Period End", text("2025-10-31")),
            blank(),
            blank(),
            vec![
                text("date"),
                text("day"),
                text("status"),
                text("hours_worked"),
                text("overtime_hours"),
                text("notes"),
            ],
            day("2025-10-01", "Wednesday", "Present", 8.0, 2.0),
            day("2025-10-02", "Thursday", "Half Day", 4.0, 0.0),
            day("2025-10-03", "Friday", "Leave", 0.0, 0.0),
            day("2025-10-04", "Saturday", "Weekend", 0.0, 0.0),
            blank(),
            blank(),
            pair("Metric", text("Value")),
            pair("Total Regular Hours", CellValue::Number(12.0)),
            pair("Total Overtime Hours", CellValue::Number(2.0)),
            pair("Total Leave Days", CellValue::Number(1.0)),
            pair("Holiday Work Hours", CellValue::Number(0.0)),
            pair("Hourly Rate ($)", CellValue::Number(45.0)),
            pair("Overtime Rate ($)", CellValue::Number(67.5)),
        ]
    }

    #[test]
    fn test_template_blocks_are_mapped() {
        let raw = sheet_to_timesheet(&template_rows());

        assert_eq!(raw.fields.get("Employee ID"), Some(&text("EMP001")));
        assert_eq!(raw.fields.get("Pay Period End"), Some(&text("2025-10-31")));
        assert_eq!(raw.fields.get("Hourly Rate ($)"), Some(&CellValue::Number(45.0)));
        assert!(!raw.fields.contains_key("Field"));
        assert!(!raw.fields.contains_key("Metric"));

        assert_eq!(raw.attendance.len(), 4);
        assert_eq!(raw.attendance[1].get("status"), Some(&text("Half Day")));
        assert_eq!(raw.attendance[0].get("overtime_hours"), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn test_template_parses_into_timesheet() {
        let record = parse_timesheet(&sheet_to_timesheet(&template_rows())).unwrap();

        assert_eq!(record.employee.employee_id, "EMP001");
        assert_eq!(record.employee.designation, "Senior Software Engineer");
        assert_eq!(record.hours.regular_hours, dec("12.00"));
        assert_eq!(record.hours.overtime_hours, dec("2.00"));
        assert_eq!(record.hours.leave_days, 1);
        assert_eq!(record.hourly_rate, dec("45.00"));
        assert_eq!(record.overtime_rate, Some(dec("67.50")));
    }

    #[test]
    fn test_summary_label_ends_attendance_without_blank_row() {
        let rows = vec![
            vec![text("date"), text("status"), text("hours_worked")],
            vec![text("2025-10-01"), text("Present"), CellValue::Number(8.0)],
            pair("Hourly Rate", CellValue::Number(25.0)),
        ];
        let raw = sheet_to_timesheet(&rows);

        assert_eq!(raw.attendance.len(), 1);
        assert_eq!(raw.fields.get("Hourly Rate"), Some(&CellValue::Number(25.0)));
    }

    #[test]
    fn test_first_non_blank_value_wins() {
        let rows = vec![
            pair("Name", CellValue::Empty),
            pair("Name", text("John Smith")),
            pair("Name", text("Someone Else")),
        ];
        let raw = sheet_to_timesheet(&rows);
        assert_eq!(raw.fields.get("Name"), Some(&text("John Smith")));
    }

    #[test]
    fn test_workbook_cells_are_converted() {
        assert_eq!(cell_value(&Data::Int(160)), CellValue::Number(160.0));
        assert_eq!(cell_value(&Data::Float(37.5)), CellValue::Number(37.5));
        assert_eq!(cell_value(&Data::String("EMP001".to_string())), text("EMP001"));
        assert_eq!(cell_value(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_unreadable_workbook_is_invalid_input() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        match load_workbook(&path).unwrap_err() {
            EngineError::InvalidInput { path: reported, .. } => {
                assert!(reported.ends_with("broken.xlsx"));
            }
            other => panic!("Expected InvalidInput error, got {:?}", other),
        }
    }
}
