//! Typed coercion of spreadsheet cells.
//!
//! Each function takes the canonical field name and a cell and either returns
//! the typed value or a [`EngineError::Validation`] naming that field. Blank
//! cells come back as `None`; the caller decides whether blank means zero or
//! missing.

use std::str::FromStr;

use chrono::{Days, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::calculation::round_money;
use crate::error::{EngineError, EngineResult};
use crate::models::CellValue;

/// Text date layouts accepted for date cells.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Timestamp layouts accepted for date cells; the time part is dropped.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Largest spreadsheet serial date (9999-12-31).
const MAX_SERIAL_DATE: f64 = 2_958_465.0;

/// Coerces a cell into trimmed text.
pub fn coerce_text(field: &str, cell: &CellValue) -> EngineResult<Option<String>> {
    match cell {
        CellValue::Empty => Ok(None),
        CellValue::Text(text) => {
            let trimmed = text.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        // Numeric ids such as 1001 arrive as numbers from spreadsheets.
        CellValue::Number(value) if value.is_finite() => Ok(Some(value.to_string())),
        other => Err(EngineError::validation(
            field,
            format!("expected text, got {}", other),
        )),
    }
}

/// Coerces a cell into a decimal.
///
/// Text may carry a leading currency sign and thousands separators
/// (`"$1,250.50"`). Numbers are converted through their shortest decimal
/// representation so `37.1` stays `37.1`.
pub fn coerce_decimal(field: &str, cell: &CellValue) -> EngineResult<Option<Decimal>> {
    let text = match cell {
        CellValue::Empty => return Ok(None),
        CellValue::Number(value) if value.is_finite() => value.to_string(),
        CellValue::Text(text) => {
            let cleaned: String = text
                .trim()
                .trim_start_matches('$')
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            if cleaned.is_empty() {
                return Ok(None);
            }
            cleaned
        }
        other => {
            return Err(EngineError::validation(
                field,
                format!("expected a number, got {}", other),
            ));
        }
    };

    Decimal::from_str(&text)
        .map(Some)
        .map_err(|_| EngineError::validation(field, format!("expected a number, got {}", cell)))
}

/// Coerces a cell into a non-negative amount rounded to two decimal places.
///
/// Blank cells count as zero.
pub fn coerce_non_negative(field: &str, cell: Option<&CellValue>) -> EngineResult<Decimal> {
    let value = match cell {
        Some(cell) => coerce_decimal(field, cell)?.unwrap_or(Decimal::ZERO),
        None => Decimal::ZERO,
    };
    if value < Decimal::ZERO {
        return Err(EngineError::validation(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(round_money(value))
}

/// Coerces a cell into a non-negative whole number. Blank counts as zero.
pub fn coerce_count(field: &str, cell: Option<&CellValue>) -> EngineResult<u32> {
    let value = match cell {
        Some(cell) => coerce_decimal(field, cell)?.unwrap_or(Decimal::ZERO),
        None => return Ok(0),
    };
    if value < Decimal::ZERO {
        return Err(EngineError::validation(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    if value.fract() != Decimal::ZERO {
        return Err(EngineError::validation(
            field,
            format!("must be a whole number, got {}", value),
        ));
    }
    value
        .to_u32()
        .ok_or_else(|| EngineError::validation(field, format!("is too large: {}", value)))
}

/// Coerces a cell into a date.
///
/// Text accepts `YYYY-MM-DD`, `YYYY/MM/DD`, `YYYYMMDD`, and timestamps whose
/// time part is dropped. Numbers are spreadsheet serial dates counted from
/// 1899-12-30.
pub fn coerce_date(field: &str, cell: &CellValue) -> EngineResult<Option<NaiveDate>> {
    match cell {
        CellValue::Empty => Ok(None),
        CellValue::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            parse_date_text(text).map(Some).ok_or_else(|| {
                EngineError::validation(field, format!("unrecognised date {:?}", text))
            })
        }
        CellValue::Number(serial) => serial_to_date(*serial).map(Some).ok_or_else(|| {
            EngineError::validation(field, format!("invalid serial date {}", serial))
        }),
        CellValue::Bool(_) => Err(EngineError::validation(
            field,
            format!("expected a date, got {}", cell),
        )),
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
                .map(|datetime| datetime.date())
        })
}

fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL_DATE {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    epoch.checked_add_days(Days::new(serial.trunc() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_text_is_trimmed() {
        assert_eq!(
            coerce_text("department", &CellValue::from("  Engineering ")).unwrap(),
            Some("Engineering".to_string())
        );
    }

    #[test]
    fn test_blank_text_is_none() {
        assert_eq!(coerce_text("department", &CellValue::from("   ")).unwrap(), None);
        assert_eq!(coerce_text("department", &CellValue::Empty).unwrap(), None);
    }

    #[test]
    fn test_numeric_id_becomes_text() {
        assert_eq!(
            coerce_text("employee_id", &CellValue::from(1001.0)).unwrap(),
            Some("1001".to_string())
        );
    }

    #[test]
    fn test_bool_is_not_text() {
        assert!(coerce_text("employee_name", &CellValue::from(true)).is_err());
    }

    #[test]
    fn test_decimal_from_number_keeps_short_form() {
        assert_eq!(
            coerce_decimal("regular_hours", &CellValue::from(37.1)).unwrap(),
            Some(dec("37.1"))
        );
    }

    #[test]
    fn test_decimal_from_currency_text() {
        assert_eq!(
            coerce_decimal("bonuses", &CellValue::from(" $1,250.50 ")).unwrap(),
            Some(dec("1250.50"))
        );
    }

    #[test]
    fn test_decimal_rejects_words() {
        let err = coerce_decimal("regular_hours", &CellValue::from("eight")).unwrap_err();
        assert_eq!(
            err,
            EngineError::validation("regular_hours", "expected a number, got \"eight\"")
        );
    }

    #[test]
    fn test_decimal_rejects_non_finite() {
        assert!(coerce_decimal("regular_hours", &CellValue::from(f64::NAN)).is_err());
        assert!(coerce_decimal("regular_hours", &CellValue::from(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_non_negative_blank_is_zero() {
        assert_eq!(
            coerce_non_negative("overtime_hours", Some(&CellValue::Empty)).unwrap(),
            dec("0.00")
        );
        assert_eq!(coerce_non_negative("overtime_hours", None).unwrap(), dec("0"));
    }

    #[test]
    fn test_non_negative_rounds_to_cents() {
        let value = coerce_non_negative("regular_hours", Some(&CellValue::from(7.555))).unwrap();
        assert_eq!(value.to_string(), "7.56");
    }

    #[test]
    fn test_non_negative_rejects_negative() {
        let err = coerce_non_negative("holiday_hours", Some(&CellValue::from(-1.0))).unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
    }

    #[test]
    fn test_count_accepts_integral_float() {
        assert_eq!(coerce_count("leave_days", Some(&CellValue::from(2.0))).unwrap(), 2);
        assert_eq!(coerce_count("leave_days", Some(&CellValue::from("3"))).unwrap(), 3);
        assert_eq!(coerce_count("leave_days", Some(&CellValue::from("3.00"))).unwrap(), 3);
        assert_eq!(coerce_count("leave_days", None).unwrap(), 0);
    }

    #[test]
    fn test_count_rejects_fraction_and_negative() {
        assert!(coerce_count("leave_days", Some(&CellValue::from(2.5))).is_err());
        assert!(coerce_count("leave_days", Some(&CellValue::from(-1.0))).is_err());
    }

    #[test]
    fn test_date_formats() {
        let expected = Some(date(2025, 10, 31));
        for text in ["2025-10-31", "2025/10/31", "20251031", "2025-10-31 00:00:00"] {
            assert_eq!(
                coerce_date("pay_period_end", &CellValue::from(text)).unwrap(),
                expected,
                "text {:?}",
                text
            );
        }
    }

    #[test]
    fn test_serial_date() {
        // 45931 is 2025-10-01 in spreadsheet serial numbering.
        assert_eq!(
            coerce_date("pay_period_start", &CellValue::from(45931.0)).unwrap(),
            Some(date(2025, 10, 1))
        );
    }

    #[test]
    fn test_invalid_date_text() {
        let err = coerce_date("pay_period_start", &CellValue::from("31st October")).unwrap_err();
        assert!(err.to_string().contains("unrecognised date"));
    }

    #[test]
    fn test_invalid_serial_date() {
        assert!(coerce_date("pay_period_start", &CellValue::from(-4.0)).is_err());
    }
}
