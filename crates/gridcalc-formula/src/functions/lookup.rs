//! Lookup and reference functions
//!
//! The table argument must be written as a range (`A1:C10`); a computed value
//! in that position is `#VALUE!`. Matching is always an exact linear scan.

use super::value_error;
use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use gridcalc_core::{text_eq_ignore_case, CellAddress, CellError, CellRange, CellValue};

fn range_arg(expr: &FormulaExpr) -> Option<CellRange> {
    match expr {
        FormulaExpr::Range(range) => Some(*range),
        _ => None,
    }
}

/// Lookup equality: numbers within epsilon, text ignoring case, booleans
/// exactly. Values of different types never match.
fn lookup_eq(a: &CellValue, b: &CellValue) -> bool {
    match (a, b) {
        (CellValue::Number(x), CellValue::Number(y)) => (x - y).abs() < f64::EPSILON,
        (CellValue::String(x), CellValue::String(y)) => text_eq_ignore_case(x, y),
        (CellValue::Boolean(x), CellValue::Boolean(y)) => x == y,
        _ => false,
    }
}

/// Absolute coordinate `offset` (1-based) places past `start`, if it does not
/// go beyond `end`
fn offset_within(start: u32, end: u32, offset: f64) -> Option<u32> {
    if !(offset >= 1.0) {
        return None;
    }
    let target = start as f64 + offset - 1.0;
    if !(target <= end as f64) {
        return None;
    }
    Some(target as u32)
}

/// VLOOKUP(lookup_value, table_array, col_index_num, [range_lookup])
///
/// `range_lookup` is accepted for compatibility; the first column is always
/// scanned top to bottom for an exact match.
pub fn fn_vlookup(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let lookup_value = ctx.evaluate(&args[0])?;
    let Some(table) = range_arg(&args[1]) else {
        return value_error();
    };
    let Ok(col_index) = ctx.number(&args[2]) else {
        return value_error();
    };

    let Some(result_col) = offset_within(table.start.col, table.end.col, col_index.trunc()) else {
        return Ok(CellValue::Error(CellError::Ref));
    };

    for row in table.start.row..=table.end.row {
        let key = ctx.resolve(CellAddress::new(row, table.start.col));
        if lookup_eq(&key, &lookup_value) {
            return Ok(ctx.resolve(CellAddress::new(row, result_col)));
        }
    }

    Ok(CellValue::Error(CellError::Na))
}

/// MATCH(lookup_value, lookup_array, [match_type])
///
/// Position (1-based, row-major) of the first exact match.
pub fn fn_match(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let lookup_value = ctx.evaluate(&args[0])?;
    let Some(range) = range_arg(&args[1]) else {
        return value_error();
    };
    if let Some(match_type) = args.get(2) {
        if ctx.number(match_type).is_err() {
            return value_error();
        }
    }

    let position = range
        .cells()
        .position(|addr| lookup_eq(&ctx.resolve(addr), &lookup_value));

    match position {
        Some(index) => Ok(CellValue::Number((index + 1) as f64)),
        None => Ok(CellValue::Error(CellError::Na)),
    }
}

/// INDEX(array, row_num, [column_num]) - Cell at 1-based offsets into a range
pub fn fn_index(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let Some(range) = range_arg(&args[0]) else {
        return value_error();
    };
    let Ok(row) = ctx.number(&args[1]) else {
        return value_error();
    };
    let col = match args.get(2) {
        Some(arg) => match ctx.number(arg) {
            Ok(col) => col,
            Err(_) => return value_error(),
        },
        None => 1.0,
    };

    let target_row = offset_within(range.start.row, range.end.row, row.trunc());
    let target_col = offset_within(range.start.col, range.end.col, col.trunc());

    match (target_row, target_col) {
        (Some(row), Some(col)) => Ok(ctx.resolve(CellAddress::new(row, col))),
        _ => Ok(CellValue::Error(CellError::Ref)),
    }
}
