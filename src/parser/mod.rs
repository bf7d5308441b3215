//! Timesheet parsing.
//!
//! Turns a [`RawTimesheet`](crate::models::RawTimesheet) into a validated
//! [`TimesheetRecord`](crate::models::TimesheetRecord). Parsing is pure: it
//! reads cells, coerces them through one fixed schema and reports the first
//! invalid field.

mod attendance;
mod coercion;
mod schema;
mod timesheet;

pub use attendance::{
    parse_attendance, summarize, AttendanceDay, AttendanceStatus, AttendanceSummary,
};
pub use coercion::{
    coerce_count, coerce_date, coerce_decimal, coerce_non_negative, coerce_text,
};
pub use schema::{normalize_header, Field, SchemaCells};
pub use timesheet::{parse_timesheet, peek_employee_id, peek_employee_name};
