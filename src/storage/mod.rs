//! File-system adapters.
//!
//! Input timesheets are JSON files or `.xlsx` workbooks discovered in sorted
//! order; rendered slips are written to an output directory that the HTTP API
//! can list, download from and delete from.

mod input;
mod slips;
mod workbook;

pub use input::{
    TIMESHEET_EXTENSION, discover_timesheets, is_timesheet_file, load_input_dir,
    load_timesheet_file,
};
pub use slips::{
    DirectorySink, SlipFileInfo, delete_slip, list_slips, parse_slip_file_name,
    read_slip, save_upload,
};
pub use workbook::{TIMESHEET_SHEET, WORKBOOK_EXTENSION, load_workbook, sheet_to_timesheet};
