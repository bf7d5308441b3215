//! Batch processing.
//!
//! Each record moves through `Received → Parsed → Calculated → Rendered`.
//! Records are processed one at a time in input order and share no state
//! apart from the duplicate-id check, so one record's failure never affects
//! another's result.

mod outcome;
mod runner;

pub use outcome::{RecordFailure, RecordOutcome, RecordStage, RunSummary};
pub use runner::{InputRecord, MemorySink, PayrollPipeline, SlipSink};
