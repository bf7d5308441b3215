//! Plain-text salary slip.

use std::fmt::Write;

use rust_decimal::Decimal;

use super::SlipRenderer;
use crate::calculation::round_money;
use crate::config::CompanyInfo;
use crate::error::{EngineError, EngineResult};
use crate::models::SalarySlipRecord;

const WIDTH: usize = 72;
const LABEL_WIDTH: usize = 40;

/// Renders a salary slip as fixed-width text.
///
/// Sections follow the printed slip: title and company, pay period, employee
/// information, working hours, earnings, deductions, net salary, footer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSlipRenderer;

impl SlipRenderer for TextSlipRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn render(&self, slip: &SalarySlipRecord, company: &CompanyInfo) -> EngineResult<Vec<u8>> {
        let mut out = String::with_capacity(2048);
        write_slip(&mut out, slip, company).map_err(|e| EngineError::Render {
            employee_id: slip.employee.employee_id.clone(),
            message: e.to_string(),
        })?;
        Ok(out.into_bytes())
    }
}

/// Writes the fixed-width slip layout shared by the text and PDF renderers.
pub(super) fn write_slip(
    out: &mut String,
    slip: &SalarySlipRecord,
    company: &CompanyInfo,
) -> std::fmt::Result {
    let heavy = "=".repeat(WIDTH);
    let light = "-".repeat(WIDTH);
    let employee = &slip.employee;
    let hours = &slip.hours;
    let earnings = &slip.earnings;
    let deductions = &slip.deductions;

    writeln!(out, "{}", heavy)?;
    writeln!(out, "{:^width$}", "SALARY SLIP", width = WIDTH)?;
    writeln!(out, "{:^width$}", company.name, width = WIDTH)?;
    writeln!(out, "{:^width$}", company.address, width = WIDTH)?;
    writeln!(out, "{}", heavy)?;
    let period = format!(
        "Pay Period: {} to {}",
        slip.period.start_date, slip.period.end_date
    );
    writeln!(out, "{:^width$}", period, width = WIDTH)?;
    writeln!(out)?;

    writeln!(out, "EMPLOYEE INFORMATION")?;
    writeln!(out, "{}", light)?;
    writeln!(out, "{:<14}{:<22}{:<14}{}", "Employee ID:", employee.employee_id, "Department:", employee.department)?;
    writeln!(out, "{:<14}{:<22}{:<14}{}", "Name:", employee.name, "Designation:", employee.designation)?;
    writeln!(out, "{:<14}{:<22}{:<14}{}", "Email:", employee.email, "Bank Account:", employee.bank_account)?;
    writeln!(out)?;

    writeln!(out, "WORKING HOURS SUMMARY")?;
    writeln!(out, "{}", light)?;
    line(out, "Regular Hours:", &format!("{} hrs", hours.regular_hours))?;
    line(out, "Overtime Hours:", &format!("{} hrs", hours.overtime_hours))?;
    line(out, "Leave Days:", &format!("{} days", hours.leave_days))?;
    line(out, "Holiday Work Hours:", &format!("{} hrs", hours.holiday_hours))?;
    writeln!(out)?;

    line(out, "EARNINGS", "AMOUNT")?;
    writeln!(out, "{}", light)?;
    money(out, "Base Pay", earnings.base_pay)?;
    money(out, "Overtime Pay", earnings.overtime_pay)?;
    money(out, "Holiday Pay", earnings.holiday_pay)?;
    money(out, "Allowances", earnings.allowances)?;
    money(out, "Bonuses", earnings.bonuses)?;
    writeln!(out, "{}", light)?;
    money(out, "GROSS SALARY", earnings.gross_salary)?;
    writeln!(out)?;

    line(out, "DEDUCTIONS", "AMOUNT")?;
    writeln!(out, "{}", light)?;
    money(out, "Income Tax", deductions.income_tax)?;
    money(out, "Social Security & Medicare", deductions.social_security_medicare)?;
    money(out, "Insurance", deductions.insurance)?;
    money(out, "Provident Fund", deductions.provident_fund)?;
    writeln!(out, "{}", light)?;
    money(out, "TOTAL DEDUCTIONS", deductions.total_deductions)?;
    writeln!(out)?;

    writeln!(out, "{}", heavy)?;
    money(out, "NET SALARY (TAKE HOME)", slip.net_salary)?;
    writeln!(out, "{}", heavy)?;

    if !slip.audit_trace.warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "NOTES")?;
        for warning in &slip.audit_trace.warnings {
            writeln!(out, "* {}", warning.message)?;
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "This is a computer-generated salary slip and does not require a signature."
    )?;
    writeln!(
        out,
        "Generated on: {} UTC",
        slip.generated_at.format("%B %d, %Y at %I:%M %p")
    )?;
    writeln!(out, "For any queries, please contact the HR Department.")?;
    Ok(())
}

fn line(out: &mut String, label: &str, value: &str) -> std::fmt::Result {
    writeln!(
        out,
        "{:<lw$}{:>vw$}",
        label,
        value,
        lw = LABEL_WIDTH,
        vw = WIDTH - LABEL_WIDTH
    )
}

fn money(out: &mut String, label: &str, amount: Decimal) -> std::fmt::Result {
    line(out, label, &format_money(amount))
}

/// Formats an amount as `$1,234.56` (`-$12.00` when negative).
fn format_money(amount: Decimal) -> String {
    let rounded = round_money(amount);
    let text = rounded.abs().to_string();
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}
