//! The parse → calculate → render orchestrator.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::outcome::{RecordFailure, RecordOutcome, RecordStage, RunSummary};
use crate::calculation::{WageCalculator, NET_PAY_NON_POSITIVE};
use crate::config::PayrollConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{RawTimesheet, SalarySlipRecord};
use crate::parser::{parse_timesheet, peek_employee_id, peek_employee_name};
use crate::render::{slip_file_name, SlipRenderer};

/// One record handed to the pipeline.
///
/// `content` is an error when the record could not even be decoded from its
/// source file; the pipeline reports it like any other validation failure.
#[derive(Debug, Clone)]
pub struct InputRecord {
    /// Where the record came from, e.g. `october.json#2`.
    pub source: String,
    /// The decoded record, or why decoding failed.
    pub content: EngineResult<RawTimesheet>,
}

impl InputRecord {
    /// Wraps an already decoded record.
    pub fn new(source: impl Into<String>, raw: RawTimesheet) -> Self {
        Self {
            source: source.into(),
            content: Ok(raw),
        }
    }
}

/// Destination for rendered slips.
pub trait SlipSink: Send + Sync {
    /// Stores one rendered document under `file_name`.
    fn deliver(&self, file_name: &str, content_type: &str, bytes: &[u8]) -> EngineResult<()>;
}

/// A sink that keeps documents in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    documents: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivered documents in delivery order.
    pub fn documents(&self) -> Vec<(String, Vec<u8>)> {
        match self.documents.lock() {
            Ok(documents) => documents.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl SlipSink for MemorySink {
    fn deliver(&self, file_name: &str, _content_type: &str, bytes: &[u8]) -> EngineResult<()> {
        let mut documents = self.documents.lock().map_err(|_| EngineError::Storage {
            path: file_name.to_string(),
            message: "in-memory sink lock poisoned".to_string(),
        })?;
        documents.push((file_name.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// Runs timesheets through parse, calculate and render, one record at a time.
///
/// A failing record never stops the batch: its failure is recorded in its
/// [`RecordOutcome`] and the next record starts from scratch.
pub struct PayrollPipeline {
    config: Arc<PayrollConfig>,
    calculator: WageCalculator,
    renderer: Box<dyn SlipRenderer>,
}

impl PayrollPipeline {
    /// Creates a pipeline for a configuration and renderer.
    pub fn new(config: Arc<PayrollConfig>, renderer: Box<dyn SlipRenderer>) -> Self {
        Self {
            calculator: WageCalculator::new(Arc::clone(&config)),
            config,
            renderer,
        }
    }

    /// The calculator used for every record.
    pub fn calculator(&self) -> &WageCalculator {
        &self.calculator
    }

    /// The renderer used for every record.
    pub fn renderer(&self) -> &dyn SlipRenderer {
        self.renderer.as_ref()
    }

    /// Processes records in order and delivers each slip to `sink`.
    pub fn run<I>(&self, records: I, sink: &dyn SlipSink) -> RunSummary
    where
        I: IntoIterator<Item = InputRecord>,
    {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(run_id = %run_id, "Starting payroll run");

        let mut seen_ids: HashSet<String> = HashSet::new();
        let outcomes: Vec<RecordOutcome> = records
            .into_iter()
            .map(|record| self.process_record(record, &mut seen_ids, sink))
            .collect();

        let summary = RunSummary::from_outcomes(run_id, started_at, Utc::now(), outcomes);
        info!(
            run_id = %run_id,
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            flagged = summary.flagged,
            calculated_not_delivered = summary.calculated_not_delivered,
            total_payroll = %summary.total_payroll,
            "Payroll run completed"
        );
        summary
    }

    /// Carries one record as far as it can go.
    fn process_record(
        &self,
        record: InputRecord,
        seen_ids: &mut HashSet<String>,
        sink: &dyn SlipSink,
    ) -> RecordOutcome {
        let mut outcome = RecordOutcome::received(record.source);

        let raw = match record.content {
            Ok(raw) => raw,
            Err(error) => return fail(outcome, error),
        };
        outcome.employee_id = peek_employee_id(&raw);
        outcome.employee_name = peek_employee_name(&raw);

        // Received → Parsed
        let timesheet = match parse_timesheet(&raw) {
            Ok(timesheet) => timesheet,
            Err(error) => return fail(outcome, error),
        };
        let employee_id = timesheet.employee.employee_id.clone();
        outcome.employee_id = Some(employee_id.clone());
        outcome.employee_name = Some(timesheet.employee.name.clone());
        if !seen_ids.insert(employee_id.clone()) {
            return fail(outcome, EngineError::DuplicateEmployee { employee_id });
        }
        outcome.stage = RecordStage::Parsed;

        // Parsed → Calculated
        let slip = match self.calculator.calculate(&timesheet) {
            Ok(slip) => slip,
            Err(error) => return fail(outcome, error),
        };
        outcome.stage = RecordStage::Calculated;
        outcome.net_salary = Some(slip.net_salary);
        outcome.flagged = slip.has_warning(NET_PAY_NON_POSITIVE);

        // Calculated → Rendered
        match self.deliver(&slip, sink) {
            Ok(file_name) => {
                debug!(
                    employee_id = %employee_id,
                    file_name = %file_name,
                    net_salary = %slip.net_salary,
                    "Salary slip delivered"
                );
                outcome.stage = RecordStage::Rendered;
                outcome.file_name = Some(file_name);
                outcome
            }
            Err(error) => fail(outcome, error),
        }
    }

    fn deliver(&self, slip: &SalarySlipRecord, sink: &dyn SlipSink) -> EngineResult<String> {
        let bytes = self.renderer.render(slip, self.config.company())?;
        let file_name = slip_file_name(slip, self.renderer.extension());
        sink.deliver(&file_name, self.renderer.content_type(), &bytes)
            .map_err(|error| match error {
                EngineError::Render { .. } => error,
                other => EngineError::Render {
                    employee_id: slip.employee.employee_id.clone(),
                    message: other.to_string(),
                },
            })?;
        Ok(file_name)
    }
}

fn fail(mut outcome: RecordOutcome, error: EngineError) -> RecordOutcome {
    warn!(
        source = %outcome.source,
        employee_id = outcome.employee_id.as_deref().unwrap_or("<unknown>"),
        stage = ?outcome.stage,
        error = %error,
        "Record failed"
    );
    outcome.failure = Some(RecordFailure::from(&error));
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CompanyInfo;
    use crate::error::FailureKind;
    use crate::render::TextSlipRenderer;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn create_test_raw(id: &str, name: &str, rate: f64) -> RawTimesheet {
        RawTimesheet::default()
            .with("Employee ID", id)
            .with("Name", name)
            .with("Department", "Engineering")
            .with("Designation", "Engineer")
            .with("Email", "staff@company.com")
            .with("Bank Account", "1234567890")
            .with("Regular Hours", 160.0)
            .with("Overtime Hours", 10.0)
            .with("Hourly Rate", rate)
            .with("Pay Period Start", "2025-10-01")
            .with("Pay Period End", "2025-10-31")
    }

    fn pipeline() -> PayrollPipeline {
        PayrollPipeline::new(
            Arc::new(PayrollConfig::standard()),
            Box::new(TextSlipRenderer),
        )
    }

    struct FailingSink;

    impl SlipSink for FailingSink {
        fn deliver(&self, file_name: &str, _: &str, _: &[u8]) -> EngineResult<()> {
            Err(EngineError::Storage {
                path: file_name.to_string(),
                message: "disk full".to_string(),
            })
        }
    }

    struct BrokenRenderer;

    impl SlipRenderer for BrokenRenderer {
        fn extension(&self) -> &'static str {
            "txt"
        }

        fn content_type(&self) -> &'static str {
            "text/plain"
        }

        fn render(&self, slip: &SalarySlipRecord, _: &CompanyInfo) -> EngineResult<Vec<u8>> {
            Err(EngineError::Render {
                employee_id: slip.employee.employee_id.clone(),
                message: "template missing".to_string(),
            })
        }
    }

    #[test]
    fn test_successful_record_is_delivered() {
        let sink = MemorySink::new();
        let summary = pipeline().run(
            vec![InputRecord::new("a.json", create_test_raw("EMP001", "John Smith", 25.0))],
            &sink,
        );

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.total_payroll, dec("3079.06"));
        let documents = sink.documents();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].0, "EMP001_John_Smith_SalarySlip_20251031.txt");
        assert_eq!(
            summary.outcomes[0].file_name.as_deref(),
            Some("EMP001_John_Smith_SalarySlip_20251031.txt")
        );
    }

    #[test]
    fn test_failure_isolation() {
        let sink = MemorySink::new();
        let records = vec![
            InputRecord::new("batch.json#0", create_test_raw("EMP001", "A One", 25.0)),
            InputRecord::new("batch.json#1", create_test_raw("EMP002", "B Two", -5.0)),
            InputRecord::new("batch.json#2", create_test_raw("EMP003", "C Three", 25.0)),
        ];
        let summary = pipeline().run(records, &sink);

        assert_eq!(summary.attempted, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total_payroll, dec("6158.12"));

        let failed = &summary.outcomes[1];
        assert_eq!(failed.employee_id.as_deref(), Some("EMP002"));
        assert_eq!(failed.stage, RecordStage::Parsed);
        assert_eq!(failed.failure.as_ref().unwrap().kind, FailureKind::Calculation);
        assert_eq!(sink.documents().len(), 2);
    }

    #[test]
    fn test_overflowing_hours_fail_only_their_record() {
        let sink = MemorySink::new();
        let huge = create_test_raw("EMP002", "B Two", 25.0)
            .with("Regular Hours", "7000000000000000000000000000");
        let records = vec![
            InputRecord::new("batch.json#0", create_test_raw("EMP001", "A One", 25.0)),
            InputRecord::new("batch.json#1", huge),
            InputRecord::new("batch.json#2", create_test_raw("EMP003", "C Three", 25.0)),
        ];
        let summary = pipeline().run(records, &sink);

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total_payroll, dec("6158.12"));
        let failed = &summary.outcomes[1];
        assert_eq!(failed.employee_id.as_deref(), Some("EMP002"));
        assert_eq!(failed.failure.as_ref().unwrap().kind, FailureKind::Calculation);
        assert!(failed.failure.as_ref().unwrap().message.contains("out of range"));
        assert_eq!(sink.documents().len(), 2);
    }

    #[test]
    fn test_validation_failure_keeps_peeked_id() {
        let raw = create_test_raw("EMP004", "D Four", 25.0).with("Regular Hours", "many");
        let summary = pipeline().run(vec![InputRecord::new("x.json", raw)], &MemorySink::new());

        let outcome = &summary.outcomes[0];
        assert_eq!(outcome.stage, RecordStage::Received);
        assert_eq!(outcome.employee_id.as_deref(), Some("EMP004"));
        assert_eq!(outcome.failure.as_ref().unwrap().kind, FailureKind::Validation);
    }

    #[test]
    fn test_undecodable_input_is_validation_failure() {
        let record = InputRecord {
            source: "broken.json".to_string(),
            content: Err(EngineError::InvalidInput {
                path: "broken.json".to_string(),
                message: "expected value at line 1 column 1".to_string(),
            }),
        };
        let summary = pipeline().run(vec![record], &MemorySink::new());
        assert_eq!(summary.failed, 1);
        assert_eq!(
            summary.outcomes[0].failure.as_ref().unwrap().kind,
            FailureKind::Validation
        );
    }

    #[test]
    fn test_duplicate_employee_is_rejected_after_first() {
        let records = vec![
            InputRecord::new("a.json", create_test_raw("EMP001", "John Smith", 25.0)),
            InputRecord::new("b.json", create_test_raw("EMP001", "John Smith", 30.0)),
        ];
        let sink = MemorySink::new();
        let summary = pipeline().run(records, &sink);

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.total_payroll, dec("3079.06"));
        let duplicate = &summary.outcomes[1];
        assert_eq!(duplicate.failure.as_ref().unwrap().kind, FailureKind::Validation);
        assert!(duplicate.failure.as_ref().unwrap().message.contains("Duplicate"));
        assert_eq!(sink.documents().len(), 1);
    }

    #[test]
    fn test_sink_failure_is_calculated_not_delivered() {
        let summary = pipeline().run(
            vec![InputRecord::new("a.json", create_test_raw("EMP001", "John Smith", 25.0))],
            &FailingSink,
        );

        assert_eq!(summary.succeeded, 0);
        assert_eq!(summary.calculated_not_delivered, 1);
        assert_eq!(summary.total_payroll, Decimal::ZERO);
        let outcome = &summary.outcomes[0];
        assert_eq!(outcome.stage, RecordStage::Calculated);
        assert_eq!(outcome.net_salary, Some(dec("3079.06")));
        assert_eq!(outcome.failure.as_ref().unwrap().kind, FailureKind::Render);
        assert!(outcome.failure.as_ref().unwrap().message.contains("disk full"));
    }

    #[test]
    fn test_renderer_failure_is_distinct_from_calculation() {
        let pipeline = PayrollPipeline::new(
            Arc::new(PayrollConfig::standard()),
            Box::new(BrokenRenderer),
        );
        let summary = pipeline.run(
            vec![InputRecord::new("a.json", create_test_raw("EMP001", "John Smith", 25.0))],
            &MemorySink::new(),
        );
        assert_eq!(summary.calculated_not_delivered, 1);
        assert_eq!(
            summary.outcomes[0].failure.as_ref().unwrap().kind,
            FailureKind::Render
        );
    }

    #[test]
    fn test_low_earner_is_flagged_and_delivered() {
        let raw = create_test_raw("EMP005", "E Five", 25.0)
            .with("Regular Hours", 2.0)
            .with("Overtime Hours", 0.0);
        let summary = pipeline().run(vec![InputRecord::new("a.json", raw)], &MemorySink::new());

        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.flagged, 1);
        assert!(summary.outcomes[0].flagged);
    }
}
