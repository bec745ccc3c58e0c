//! Date and time functions
//!
//! Dates are serial numbers: whole days since 1899-12-30 plus the time of day
//! as a fraction. That epoch keeps serials aligned with other spreadsheets for
//! every date after February 1900.

use super::{numeric_args, value_error};
use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Timelike};
use gridcalc_core::CellValue;

const MS_PER_DAY: f64 = 86_400_000.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Largest millisecond offset accepted when decoding a serial
const MAX_OFFSET_MS: f64 = 1e17;

fn epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)
}

/// Serial number for a date and time
pub fn to_serial(datetime: NaiveDateTime) -> Option<f64> {
    let elapsed = datetime.signed_duration_since(epoch()?);
    Some(elapsed.num_milliseconds() as f64 / MS_PER_DAY)
}

/// Date and time for a serial number, rounded to the millisecond
pub fn from_serial(serial: f64) -> Option<NaiveDateTime> {
    let ms = (serial * MS_PER_DAY).round();
    if !ms.is_finite() || ms.abs() > MAX_OFFSET_MS {
        return None;
    }
    epoch()?.checked_add_signed(Duration::milliseconds(ms as i64))
}

/// DATE(year, month, day)
///
/// Out-of-range months and days are rejected rather than rolled over.
pub fn fn_date(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let Some([year, month, day]) = numeric_args(args, ctx) else {
        return value_error();
    };

    let (year, month, day) = (year.trunc(), month.trunc(), day.trunc());
    let in_range = year >= i32::MIN as f64 && year <= i32::MAX as f64;
    if !(in_range && month >= 1.0 && day >= 1.0) {
        return value_error();
    }

    let serial = NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(to_serial);

    match serial {
        Some(serial) => Ok(CellValue::Number(serial)),
        None => value_error(),
    }
}

/// Decode the single serial argument and pick one component
fn component(
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
    pick: fn(&NaiveDateTime) -> u32,
) -> FormulaResult<CellValue> {
    let Some([serial]) = numeric_args(args, ctx) else {
        return value_error();
    };

    match from_serial(serial) {
        Some(datetime) => Ok(CellValue::Number(pick(&datetime) as f64)),
        None => value_error(),
    }
}

/// YEAR(serial_number)
pub fn fn_year(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let Some([serial]) = numeric_args(args, ctx) else {
        return value_error();
    };

    match from_serial(serial) {
        Some(datetime) => Ok(CellValue::Number(datetime.year() as f64)),
        None => value_error(),
    }
}

/// MONTH(serial_number)
pub fn fn_month(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    component(args, ctx, |dt| dt.month())
}

/// DAY(serial_number)
pub fn fn_day(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    component(args, ctx, |dt| dt.day())
}

/// HOUR(serial_number)
pub fn fn_hour(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    component(args, ctx, |dt| dt.hour())
}

/// MINUTE(serial_number)
pub fn fn_minute(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    component(args, ctx, |dt| dt.minute())
}

/// SECOND(serial_number)
pub fn fn_second(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    component(args, ctx, |dt| dt.second())
}

/// TODAY() - Current local date
pub fn fn_today(_args: &[FormulaExpr], _ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let today = Local::now().date_naive();
    match today.and_hms_opt(0, 0, 0).and_then(to_serial) {
        Some(serial) => Ok(CellValue::Number(serial)),
        None => value_error(),
    }
}

/// NOW() - Current local date and time
pub fn fn_now(_args: &[FormulaExpr], _ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    match to_serial(Local::now().naive_local()) {
        Some(serial) => Ok(CellValue::Number(serial)),
        None => value_error(),
    }
}

/// TIME(hour, minute, second) - Fraction of a day in [0, 1)
///
/// Totals past a day wrap around; negative totals wrap from the end of the day.
pub fn fn_time(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let Some([hour, minute, second]) = numeric_args(args, ctx) else {
        return value_error();
    };

    let seconds = hour.trunc() * 3600.0 + minute.trunc() * 60.0 + second.trunc();
    let mut fraction = (seconds / SECONDS_PER_DAY).fract();
    if fraction < 0.0 {
        fraction += 1.0;
    }

    Ok(CellValue::Number(fraction))
}
