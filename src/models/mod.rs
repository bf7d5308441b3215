//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod pay_period;
mod salary_slip;
mod timesheet;

pub use employee::EmployeeInfo;
pub use pay_period::PayPeriod;
pub use salary_slip::{
    AuditStep, AuditTrace, AuditWarning, Deductions, Earnings, SalarySlipRecord, WarningSeverity,
};
pub use timesheet::{CellValue, RawRow, RawTimesheet, TimesheetRecord, WorkingHours};
