//! Logical functions

use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use gridcalc_core::CellValue;

/// AND(logical1, ...) - Stops at the first false argument
pub fn fn_and(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    for arg in args {
        if !ctx.evaluate(arg)?.as_bool() {
            return Ok(CellValue::Boolean(false));
        }
    }
    Ok(CellValue::Boolean(true))
}

/// OR(logical1, ...) - Stops at the first true argument
pub fn fn_or(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    for arg in args {
        if ctx.evaluate(arg)?.as_bool() {
            return Ok(CellValue::Boolean(true));
        }
    }
    Ok(CellValue::Boolean(false))
}

/// NOT(logical)
pub fn fn_not(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    Ok(CellValue::Boolean(!ctx.evaluate(&args[0])?.as_bool()))
}

/// IF(condition, value_if_true, [value_if_false])
///
/// Only the chosen branch is evaluated. A missing else branch is `FALSE`.
pub fn fn_if(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    if ctx.evaluate(&args[0])?.as_bool() {
        ctx.evaluate(&args[1])
    } else {
        match args.get(2) {
            Some(otherwise) => ctx.evaluate(otherwise),
            None => Ok(CellValue::Boolean(false)),
        }
    }
}

/// TRUE()
pub fn fn_true(_args: &[FormulaExpr], _ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    Ok(CellValue::Boolean(true))
}

/// FALSE()
pub fn fn_false(_args: &[FormulaExpr], _ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    Ok(CellValue::Boolean(false))
}
