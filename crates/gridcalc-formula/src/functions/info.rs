//! Information functions

use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use gridcalc_core::CellValue;

fn test_value(
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
    predicate: fn(&CellValue) -> bool,
) -> FormulaResult<CellValue> {
    let value = ctx.evaluate(&args[0])?;
    Ok(CellValue::Boolean(predicate(&value)))
}

/// ISNUMBER(value)
pub fn fn_isnumber(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    test_value(args, ctx, |v| matches!(v, CellValue::Number(_)))
}

/// ISTEXT(value)
pub fn fn_istext(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    test_value(args, ctx, |v| matches!(v, CellValue::String(_)))
}

/// ISLOGICAL(value)
pub fn fn_islogical(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    test_value(args, ctx, |v| matches!(v, CellValue::Boolean(_)))
}

/// ISERROR(value) - True for every error, including diagnostic messages
pub fn fn_iserror(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    test_value(args, ctx, CellValue::is_error)
}

/// ISBLANK(value) - True for an empty cell or the empty string
pub fn fn_isblank(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    test_value(args, ctx, CellValue::is_blank)
}
