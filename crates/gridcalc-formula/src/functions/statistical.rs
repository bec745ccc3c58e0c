//! Statistical functions
//!
//! All of these read a flattened view of their arguments: ranges contribute
//! every contained cell, other arguments contribute their evaluated value.

use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use gridcalc_core::{CellError, CellValue};

/// AVERAGE(number1, ...) - `#DIV/0!` when there are no numbers
pub fn fn_average(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let (sum, count) = ctx
        .values(args)
        .numbers()
        .fold((0.0, 0usize), |(sum, count), n| (sum + n, count + 1));

    if count == 0 {
        return Ok(CellValue::Error(CellError::Div0));
    }

    Ok(CellValue::Number(sum / count as f64))
}

/// COUNT(value1, ...) - Counts numbers
pub fn fn_count(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    Ok(CellValue::Number(ctx.values(args).numbers().count() as f64))
}

/// COUNTA(value1, ...) - Counts non-empty values
pub fn fn_counta(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let count = ctx.values(args).filter(|arg| !arg.value.is_empty()).count();
    Ok(CellValue::Number(count as f64))
}

/// COUNTBLANK(value1, ...) - Counts empty values and empty strings
pub fn fn_countblank(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let count = ctx.values(args).filter(|arg| arg.value.is_blank()).count();
    Ok(CellValue::Number(count as f64))
}

/// MAX(number1, ...) - 0 when there are no numbers
pub fn fn_max(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let max = ctx.values(args).numbers().reduce(f64::max);
    Ok(CellValue::Number(max.unwrap_or(0.0)))
}

/// MIN(number1, ...) - 0 when there are no numbers
pub fn fn_min(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let min = ctx.values(args).numbers().reduce(f64::min);
    Ok(CellValue::Number(min.unwrap_or(0.0)))
}
