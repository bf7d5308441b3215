//! Per-record outcomes and the run summary.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, FailureKind};

/// How far a record got through the pipeline.
///
/// Stages are ordered; a record that failed carries the last stage it
/// reached alongside the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStage {
    /// Read from input, not yet validated.
    Received,
    /// Validated into a timesheet record.
    Parsed,
    /// Salary slip computed.
    Calculated,
    /// Slip rendered and delivered.
    Rendered,
}

/// Why a record did not reach [`RecordStage::Rendered`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFailure {
    /// The failure class.
    pub kind: FailureKind,
    /// Human-readable description.
    pub message: String,
}

impl From<&EngineError> for RecordFailure {
    fn from(error: &EngineError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// What happened to one input record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordOutcome {
    /// Where the record came from, e.g. `october.json#2`.
    pub source: String,
    /// Employee identifier, when one could be read.
    pub employee_id: Option<String>,
    /// Employee name, when one could be read.
    pub employee_name: Option<String>,
    /// The furthest stage reached.
    pub stage: RecordStage,
    /// Net salary, once calculated.
    pub net_salary: Option<Decimal>,
    /// Delivered document name, once rendered.
    pub file_name: Option<String>,
    /// True when the slip carries a warning that needs human review.
    pub flagged: bool,
    /// The failure that stopped the record, if any.
    pub failure: Option<RecordFailure>,
}

impl RecordOutcome {
    /// A fresh outcome at [`RecordStage::Received`].
    pub fn received(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            employee_id: None,
            employee_name: None,
            stage: RecordStage::Received,
            net_salary: None,
            file_name: None,
            flagged: false,
            failure: None,
        }
    }

    /// True when the slip was delivered.
    pub fn succeeded(&self) -> bool {
        self.failure.is_none() && self.stage == RecordStage::Rendered
    }

    /// True when the slip was calculated but could not be delivered.
    pub fn calculated_not_delivered(&self) -> bool {
        self.stage == RecordStage::Calculated
            && self
                .failure
                .as_ref()
                .is_some_and(|failure| failure.kind == FailureKind::Render)
    }
}

/// Aggregate result of one processing run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique identifier of the run.
    pub run_id: Uuid,
    /// When processing started.
    pub started_at: DateTime<Utc>,
    /// When processing finished.
    pub completed_at: DateTime<Utc>,
    /// Records read.
    pub attempted: usize,
    /// Slips delivered.
    pub succeeded: usize,
    /// Records that failed at any stage.
    pub failed: usize,
    /// Delivered or calculated slips carrying a review warning.
    pub flagged: usize,
    /// Slips calculated but not delivered.
    pub calculated_not_delivered: usize,
    /// Sum of net salary over delivered slips.
    pub total_payroll: Decimal,
    /// Per-record outcomes, in processing order.
    pub outcomes: Vec<RecordOutcome>,
}

impl RunSummary {
    /// Builds the summary from per-record outcomes.
    pub fn from_outcomes(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        outcomes: Vec<RecordOutcome>,
    ) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.succeeded()).count();
        let total_payroll = outcomes
            .iter()
            .filter(|o| o.succeeded())
            .filter_map(|o| o.net_salary)
            .sum();

        Self {
            run_id,
            started_at,
            completed_at,
            attempted: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            flagged: outcomes.iter().filter(|o| o.flagged).count(),
            calculated_not_delivered: outcomes
                .iter()
                .filter(|o| o.calculated_not_delivered())
                .count(),
            total_payroll,
            outcomes,
        }
    }

    /// Outcomes that did not deliver a slip.
    pub fn failures(&self) -> impl Iterator<Item = &RecordOutcome> {
        self.outcomes.iter().filter(|o| !o.succeeded())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn delivered(id: &str, net: &str) -> RecordOutcome {
        RecordOutcome {
            employee_id: Some(id.to_string()),
            stage: RecordStage::Rendered,
            net_salary: Some(dec(net)),
            file_name: Some(format!("{}.txt", id)),
            ..RecordOutcome::received("batch.json")
        }
    }

    fn failed_at(stage: RecordStage, kind: FailureKind) -> RecordOutcome {
        RecordOutcome {
            stage,
            net_salary: (stage == RecordStage::Calculated).then(|| dec("500.00")),
            failure: Some(RecordFailure {
                kind,
                message: "boom".to_string(),
            }),
            ..RecordOutcome::received("batch.json")
        }
    }

    #[test]
    fn test_stages_are_ordered() {
        assert!(RecordStage::Received < RecordStage::Parsed);
        assert!(RecordStage::Parsed < RecordStage::Calculated);
        assert!(RecordStage::Calculated < RecordStage::Rendered);
    }

    #[test]
    fn test_summary_counts() {
        let outcomes = vec![
            delivered("EMP001", "3079.06"),
            failed_at(RecordStage::Received, FailureKind::Validation),
            delivered("EMP003", "1000.00"),
            failed_at(RecordStage::Parsed, FailureKind::Calculation),
            failed_at(RecordStage::Calculated, FailureKind::Render),
        ];
        let now = Utc::now();
        let summary = RunSummary::from_outcomes(Uuid::new_v4(), now, now, outcomes);

        assert_eq!(summary.attempted, 5);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 3);
        assert_eq!(summary.calculated_not_delivered, 1);
        assert_eq!(summary.total_payroll, dec("4079.06"));
        assert_eq!(summary.failures().count(), 3);
    }

    #[test]
    fn test_empty_run() {
        let now = Utc::now();
        let summary = RunSummary::from_outcomes(Uuid::new_v4(), now, now, Vec::new());
        assert_eq!(summary.attempted, 0);
        assert_eq!(summary.total_payroll, Decimal::ZERO);
    }

    #[test]
    fn test_failure_from_engine_error() {
        let error = EngineError::Calculation {
            employee_id: "EMP009".to_string(),
            message: "hourly_rate must be positive, got -5".to_string(),
        };
        let failure = RecordFailure::from(&error);
        assert_eq!(failure.kind, FailureKind::Calculation);
        assert!(failure.message.contains("EMP009"));
    }

    #[test]
    fn test_stage_serialization() {
        assert_eq!(
            serde_json::to_string(&RecordStage::Calculated).unwrap(),
            "\"calculated\""
        );
    }
}
