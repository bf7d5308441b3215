//! Timesheet to Salary Slip payroll engine.
//!
//! This crate turns raw timesheet records into salary slips through a three-stage
//! pipeline: the [`parser`] validates and normalizes records, the [`calculation`]
//! module applies wage, tax and deduction rules, and the [`render`] module turns the
//! result into a document. The [`pipeline`] module runs records through all three
//! stages with per-record failure isolation, and [`api`] exposes it over HTTP.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod storage;
