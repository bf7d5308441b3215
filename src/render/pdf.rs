//! PDF salary slip.
//!
//! Prints the fixed-width text layout in Courier on A4 pages, starting a new
//! page when the slip runs past the bottom margin.

use std::io::BufWriter;

use printpdf::{BuiltinFont, Mm, PdfDocument};

use super::SlipRenderer;
use super::text::write_slip;
use crate::config::CompanyInfo;
use crate::error::{EngineError, EngineResult};
use crate::models::SalarySlipRecord;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const LEFT_MARGIN_MM: f32 = 20.0;
const TOP_MM: f32 = 280.0;
const LINE_HEIGHT_MM: f32 = 4.2;
const FONT_SIZE_PT: f32 = 9.0;

/// Lines that fit between the top line and the bottom margin.
const LINES_PER_PAGE: usize = 63;

/// Renders a salary slip as an A4 PDF document.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfSlipRenderer;

impl SlipRenderer for PdfSlipRenderer {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn content_type(&self) -> &'static str {
        "application/pdf"
    }

    fn render(&self, slip: &SalarySlipRecord, company: &CompanyInfo) -> EngineResult<Vec<u8>> {
        let render_error = |message: String| EngineError::Render {
            employee_id: slip.employee.employee_id.clone(),
            message,
        };

        let mut text = String::with_capacity(2048);
        write_slip(&mut text, slip, company).map_err(|e| render_error(e.to_string()))?;

        let title = format!("Salary Slip - {}", slip.employee.name);
        let (doc, first_page, first_layer) =
            PdfDocument::new(&title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let font = doc
            .add_builtin_font(BuiltinFont::Courier)
            .map_err(|e| render_error(format!("PDF font error: {e}")))?;

        let mut first = Some((first_page, first_layer));
        for (index, lines) in paginate(&text).into_iter().enumerate() {
            let (page, layer) = match first.take() {
                Some(first) => first,
                None => doc.add_page(
                    Mm(PAGE_WIDTH_MM),
                    Mm(PAGE_HEIGHT_MM),
                    format!("Page {}", index + 1),
                ),
            };
            let layer = doc.get_page(page).get_layer(layer);

            let mut y = TOP_MM;
            for line in lines {
                if !line.trim().is_empty() {
                    layer.use_text(line, FONT_SIZE_PT, Mm(LEFT_MARGIN_MM), Mm(y), &font);
                }
                y -= LINE_HEIGHT_MM;
            }
        }

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf)
            .map_err(|e| render_error(format!("PDF save error: {e}")))?;
        buf.into_inner()
            .map_err(|e| render_error(format!("PDF buffer error: {e}")))
    }
}

/// Splits the text layout into pages of at most [`LINES_PER_PAGE`] lines.
fn paginate(text: &str) -> Vec<Vec<&str>> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return vec![Vec::new()];
    }
    lines.chunks(LINES_PER_PAGE).map(<[&str]>::to_vec).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::WageCalculator;
    use crate::models::{
        AuditWarning, EmployeeInfo, PayPeriod, TimesheetRecord, WarningSeverity, WorkingHours,
    };
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn create_test_slip() -> SalarySlipRecord {
        let record = TimesheetRecord {
            employee: EmployeeInfo {
                employee_id: "EMP001".to_string(),
                name: "John Smith".to_string(),
                department: "Engineering".to_string(),
                designation: "Senior Software Engineer".to_string(),
                email: "john.smith@company.com".to_string(),
                bank_account: "1234567890".to_string(),
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
                leave_days: 1,
            },
            hourly_rate: Decimal::from(25),
            overtime_rate: None,
            allowances: Decimal::ZERO,
            bonuses: Decimal::ZERO,
        };
        WageCalculator::default()
            .calculate_at(&record, Utc.with_ymd_and_hms(2025, 11, 1, 9, 30, 0).unwrap())
            .unwrap()
    }

    #[test]
    fn test_pdf_starts_with_magic_bytes() {
        let bytes = PdfSlipRenderer
            .render(&create_test_slip(), &CompanyInfo::default())
            .unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }

    #[test]
    fn test_pdf_renderer_metadata() {
        assert_eq!(PdfSlipRenderer.extension(), "pdf");
        assert_eq!(PdfSlipRenderer.content_type(), "application/pdf");
    }

    #[test]
    fn test_standard_slip_fits_one_page() {
        let mut text = String::new();
        write_slip(&mut text, &create_test_slip(), &CompanyInfo::default()).unwrap();
        assert_eq!(paginate(&text).len(), 1);
    }

    #[test]
    fn test_long_notes_continue_on_next_page() {
        let mut slip = create_test_slip();
        for n in 0..40 {
            slip.audit_trace.warnings.push(AuditWarning {
                code: "REVIEW".to_string(),
                message: format!("Note number {}", n),
                severity: WarningSeverity::Low,
            });
        }
        let mut text = String::new();
        write_slip(&mut text, &slip, &CompanyInfo::default()).unwrap();

        let pages = paginate(&text);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), LINES_PER_PAGE);
        assert_eq!(pages.iter().map(Vec::len).sum::<usize>(), text.lines().count());

        let bytes = PdfSlipRenderer.render(&slip, &CompanyInfo::default()).unwrap();
        assert_eq!(&bytes[0..4], b"%PDF");
    }
}
