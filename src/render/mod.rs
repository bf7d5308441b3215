//! Salary slip rendering.
//!
//! A [`SlipRenderer`] turns one [`SalarySlipRecord`] plus the company's
//! presentation metadata into document bytes. Rendering never changes the
//! numbers; a render failure leaves the calculated slip intact.

mod json;
mod pdf;
mod text;

pub use json::JsonSlipRenderer;
pub use pdf::PdfSlipRenderer;
pub use text::TextSlipRenderer;

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::CompanyInfo;
use crate::error::EngineResult;
use crate::models::SalarySlipRecord;

/// Produces a finished salary slip document.
pub trait SlipRenderer: Send + Sync {
    /// File extension of the produced document, without the dot.
    fn extension(&self) -> &'static str;

    /// MIME type of the produced document.
    fn content_type(&self) -> &'static str;

    /// Renders one slip.
    fn render(&self, slip: &SalarySlipRecord, company: &CompanyInfo) -> EngineResult<Vec<u8>>;
}

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlipFormat {
    /// Plain-text slip laid out for printing.
    #[default]
    Text,
    /// Machine-readable JSON slip.
    Json,
    /// Printable A4 PDF slip.
    Pdf,
}

impl SlipFormat {
    /// The renderer for this format.
    pub fn renderer(self) -> Box<dyn SlipRenderer> {
        match self {
            SlipFormat::Text => Box::new(TextSlipRenderer),
            SlipFormat::Json => Box::new(JsonSlipRenderer),
            SlipFormat::Pdf => Box::new(PdfSlipRenderer),
        }
    }

    /// Maps a file extension back to its format.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "txt" => Some(SlipFormat::Text),
            "json" => Some(SlipFormat::Json),
            "pdf" => Some(SlipFormat::Pdf),
            _ => None,
        }
    }
}

impl FromStr for SlipFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(SlipFormat::Text),
            "json" => Ok(SlipFormat::Json),
            "pdf" => Ok(SlipFormat::Pdf),
            other => Err(format!("unknown slip format '{}'", other)),
        }
    }
}

/// The file name a slip is delivered under:
/// `{employee_id}_{employee_name}_SalarySlip_{YYYYMMDD}.{ext}`, with the id
/// and name sanitized and the date taken from the pay period end.
///
/// # Examples
///
/// ```
/// use payslip_engine::render::slip_file_name;
/// # use payslip_engine::calculation::WageCalculator;
/// # use payslip_engine::models::{EmployeeInfo, PayPeriod, TimesheetRecord, WorkingHours};
/// # use chrono::NaiveDate;
/// # use rust_decimal::Decimal;
/// # let record = TimesheetRecord {
/// #     employee: EmployeeInfo {
/// #         employee_id: "EMP001".to_string(),
/// #         name: "John Smith".to_string(),
/// #         department: "Engineering".to_string(),
/// #         designation: "Engineer".to_string(),
/// #         email: "john.smith@company.com".to_string(),
/// #         bank_account: "1234567890".to_string(),
/// #     },
/// #     period: PayPeriod::new(
/// #         NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
/// #         NaiveDate::from_ymd_opt(2025, 10, 31).unwrap(),
/// #     )
/// #     .unwrap(),
/// #     hours: WorkingHours::default(),
/// #     hourly_rate: Decimal::from(25),
/// #     overtime_rate: None,
/// #     allowances: Decimal::ZERO,
/// #     bonuses: Decimal::ZERO,
/// # };
/// let slip = WageCalculator::default().calculate(&record).unwrap();
/// assert_eq!(slip_file_name(&slip, "txt"), "EMP001_John_Smith_SalarySlip_20251031.txt");
/// ```
pub fn slip_file_name(slip: &SalarySlipRecord, extension: &str) -> String {
    format!(
        "{}_{}_SalarySlip_{}.{}",
        slip.employee.sanitized_id(),
        slip.employee.sanitized_name(),
        slip.period.end_stamp(),
        extension
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!(SlipFormat::from_str("text").unwrap(), SlipFormat::Text);
        assert_eq!(SlipFormat::from_str("JSON").unwrap(), SlipFormat::Json);
        assert_eq!(SlipFormat::from_str("pdf").unwrap(), SlipFormat::Pdf);
        assert!(SlipFormat::from_str("docx").is_err());
    }

    #[test]
    fn test_format_extension_round_trip() {
        for format in [SlipFormat::Text, SlipFormat::Json, SlipFormat::Pdf] {
            let extension = format.renderer().extension();
            assert_eq!(SlipFormat::from_extension(extension), Some(format));
        }
    }

    #[test]
    fn test_default_format_is_text() {
        assert_eq!(SlipFormat::default(), SlipFormat::Text);
    }
}
