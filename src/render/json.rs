//! Machine-readable salary slip.

use serde::Serialize;

use super::SlipRenderer;
use crate::config::CompanyInfo;
use crate::error::{EngineError, EngineResult};
use crate::models::SalarySlipRecord;

/// Renders a salary slip as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSlipRenderer;

#[derive(Serialize)]
struct JsonSlip<'a> {
    company: &'a CompanyInfo,
    #[serde(flatten)]
    slip: &'a SalarySlipRecord,
}

impl SlipRenderer for JsonSlipRenderer {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }

    fn render(&self, slip: &SalarySlipRecord, company: &CompanyInfo) -> EngineResult<Vec<u8>> {
        serde_json::to_vec_pretty(&JsonSlip { company, slip }).map_err(|e| EngineError::Render {
            employee_id: slip.employee.employee_id.clone(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::WageCalculator;
    use crate::models::{EmployeeInfo, PayPeriod, TimesheetRecord, WorkingHours};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn create_test_slip() -> SalarySlipRecord {
        let record = TimesheetRecord {
            employee: EmployeeInfo {
                employee_id: "EMP002".to_string(),
                name: "Jane Doe".to_string(),
                department: "Finance".to_string(),
                designation: "Analyst".to_string(),
                email: "jane.doe@company.com".to_string(),
                bank_account: "9876543210".to_string(),
            },
            period: PayPeriod::new(
                NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
            )
            .unwrap(),
            hours: WorkingHours {
                regular_hours: Decimal::from(160),
                overtime_hours: Decimal::from(10),
                holiday_hours: Decimal::ZERO,
                leave_days: 0,
            },
            hourly_rate: Decimal::from(25),
            overtime_rate: None,
            allowances: Decimal::ZERO,
            bonuses: Decimal::ZERO,
        };
        WageCalculator::default().calculate(&record).unwrap()
    }

    #[test]
    fn test_json_slip_has_company_and_amounts() {
        let bytes = JsonSlipRenderer
            .render(&create_test_slip(), &CompanyInfo::default())
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["company"]["name"], "TechCorp Industries Inc.");
        assert_eq!(value["employee"]["employee_id"], "EMP002");
        assert_eq!(value["net_salary"], "3079.06");
        assert_eq!(value["earnings"]["gross_salary"], "4375.00");
        assert_eq!(value["deductions"]["total_deductions"], "1295.94");
        assert!(value["audit_trace"]["steps"].as_array().unwrap().len() > 5);
    }

    #[test]
    fn test_json_renderer_metadata() {
        assert_eq!(JsonSlipRenderer.extension(), "json");
        assert_eq!(JsonSlipRenderer.content_type(), "application/json");
    }
}
