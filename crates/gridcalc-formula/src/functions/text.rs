//! Text functions
//!
//! Lengths and positions count characters, not bytes.

use super::value_error;
use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use gridcalc_core::CellValue;

/// Longest string REPT will build
const MAX_TEXT_LEN: usize = 32767;

/// CONCATENATE(text1, ...) - Joins the display text of every argument
pub fn fn_concatenate(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let mut result = String::new();
    for arg in args {
        result.push_str(&ctx.text(arg)?);
    }
    Ok(CellValue::String(result))
}

/// LEN(text)
pub fn fn_len(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let text = ctx.text(&args[0])?;
    Ok(CellValue::Number(text.chars().count() as f64))
}

/// LOWER(text)
pub fn fn_lower(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    Ok(CellValue::String(ctx.text(&args[0])?.to_lowercase()))
}

/// UPPER(text)
pub fn fn_upper(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    Ok(CellValue::String(ctx.text(&args[0])?.to_uppercase()))
}

/// Optional character count, truncated toward zero
fn char_count(args: &[FormulaExpr], index: usize, ctx: &EvaluationContext) -> FormulaResult<f64> {
    match args.get(index) {
        Some(arg) => Ok(ctx.number(arg)?.trunc()),
        None => Ok(1.0),
    }
}

/// LEFT(text, [num_chars]) - First characters of a string
pub fn fn_left(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let text = ctx.text(&args[0])?;
    let count = char_count(args, 1, ctx)?;
    if !(count >= 0.0) {
        return value_error();
    }

    Ok(CellValue::String(text.chars().take(count as usize).collect()))
}

/// RIGHT(text, [num_chars]) - Last characters of a string
pub fn fn_right(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let text = ctx.text(&args[0])?;
    let count = char_count(args, 1, ctx)?;
    if !(count >= 0.0) {
        return value_error();
    }

    let len = text.chars().count();
    let skip = len.saturating_sub(count as usize);
    Ok(CellValue::String(text.chars().skip(skip).collect()))
}

/// MID(text, start_num, num_chars) - Characters from a 1-based position
pub fn fn_mid(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let text = ctx.text(&args[0])?;
    let start = ctx.number(&args[1])?.trunc();
    let count = ctx.number(&args[2])?.trunc();

    // Negated so that NaN is rejected too
    if !(start >= 1.0 && count >= 0.0) {
        return value_error();
    }

    // Past the end yields an empty string; the count is clamped
    Ok(CellValue::String(
        text.chars()
            .skip(start as usize - 1)
            .take(count as usize)
            .collect(),
    ))
}

/// TRIM(text) - Removes leading and trailing whitespace
pub fn fn_trim(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    Ok(CellValue::String(ctx.text(&args[0])?.trim().to_string()))
}

/// REPT(text, number_times)
pub fn fn_rept(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let text = ctx.text(&args[0])?;
    let times = ctx.number(&args[1])?.trunc();
    if !(times >= 0.0) {
        return value_error();
    }

    let times = times as usize;
    if text.chars().count().saturating_mul(times) > MAX_TEXT_LEN {
        return value_error();
    }

    Ok(CellValue::String(text.repeat(times)))
}

/// FIND(find_text, within_text, [start_num]) - Case-sensitive position
pub fn fn_find(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let find_text = ctx.text(&args[0])?;
    let within_text = ctx.text(&args[1])?;
    find_from(&find_text, &within_text, args.get(2), ctx)
}

/// SEARCH(find_text, within_text, [start_num]) - Case-insensitive position
pub fn fn_search(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let find_text = ctx.text(&args[0])?.to_lowercase();
    let within_text = ctx.text(&args[1])?;

    // Lowercase per character so positions still line up with the original
    let lowered: String = within_text
        .chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect();
    find_from(&find_text, &lowered, args.get(2), ctx)
}

fn find_from(
    needle: &str,
    haystack: &str,
    start: Option<&FormulaExpr>,
    ctx: &EvaluationContext,
) -> FormulaResult<CellValue> {
    let start = match start {
        Some(arg) => match ctx.number(arg) {
            Ok(n) => n.trunc(),
            Err(_) => return value_error(),
        },
        None => 1.0,
    };

    let len = haystack.chars().count();
    if !(start >= 1.0 && start <= len as f64) {
        return value_error();
    }

    let skip = start as usize - 1;
    let tail: String = haystack.chars().skip(skip).collect();

    match tail.find(needle) {
        Some(byte_pos) => {
            let char_pos = tail[..byte_pos].chars().count();
            Ok(CellValue::Number((skip + char_pos + 1) as f64))
        }
        None => value_error(),
    }
}

/// SUBSTITUTE(text, old_text, new_text, [instance_num])
///
/// Without `instance_num` every occurrence is replaced.
pub fn fn_substitute(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let text = ctx.text(&args[0])?;
    let old_text = ctx.text(&args[1])?;
    let new_text = ctx.text(&args[2])?;

    let instance = match args.get(3) {
        Some(arg) => {
            let n = ctx.number(arg)?.trunc();
            if !(n >= 1.0) {
                return value_error();
            }
            Some(n as usize)
        }
        None => None,
    };

    if old_text.is_empty() {
        return Ok(CellValue::String(text));
    }

    let Some(instance) = instance else {
        return Ok(CellValue::String(text.replace(&old_text, &new_text)));
    };

    match text.match_indices(&old_text).nth(instance - 1) {
        Some((pos, _)) => {
            let mut result = String::with_capacity(text.len());
            result.push_str(&text[..pos]);
            result.push_str(&new_text);
            result.push_str(&text[pos + old_text.len()..]);
            Ok(CellValue::String(result))
        }
        None => Ok(CellValue::String(text)),
    }
}
