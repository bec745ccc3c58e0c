//! Math functions

use super::{finite_number, numeric_args, value_error};
use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use gridcalc_core::{CellError, CellValue};
use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

/// SUM(value1, ...) - Adds numbers
///
/// Range cells count only when they hold numbers. Other arguments are coerced
/// and silently skipped when they are not numeric.
pub fn fn_sum(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let mut sum = 0.0;

    for arg in ctx.values(args) {
        let n = if arg.from_range {
            match arg.value {
                CellValue::Number(n) => n,
                _ => continue,
            }
        } else {
            match arg.value.as_number() {
                Some(n) => n,
                None => continue,
            }
        };
        sum += n;
    }

    Ok(CellValue::Number(sum))
}

/// Shared shape of the one-argument numeric functions
fn unary(
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
    f: impl FnOnce(f64) -> CellValue,
) -> FormulaResult<CellValue> {
    match numeric_args::<1>(args, ctx) {
        Some([n]) => Ok(f(n)),
        None => value_error(),
    }
}

/// ABS(number)
pub fn fn_abs(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    unary(args, ctx, |n| CellValue::Number(n.abs()))
}

/// ACOS(number) - Arc cosine in radians; outside [-1, 1] is #NUM!
pub fn fn_acos(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    unary(args, ctx, |n| finite_number(n.acos()))
}

/// COS(number) - Cosine of an angle in radians
pub fn fn_cos(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    unary(args, ctx, |n| CellValue::Number(n.cos()))
}

/// PI()
pub fn fn_pi(_args: &[FormulaExpr], _ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    Ok(CellValue::Number(std::f64::consts::PI))
}

/// POWER(number, power)
pub fn fn_power(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let Some([base, exp]) = numeric_args(args, ctx) else {
        return value_error();
    };
    Ok(finite_number(base.powf(exp)))
}

/// SQRT(number) - Negative input is #NUM!
pub fn fn_sqrt(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    unary(args, ctx, |n| {
        if n < 0.0 {
            CellValue::Error(CellError::Num)
        } else {
            CellValue::Number(n.sqrt())
        }
    })
}

/// ROUND(number, num_digits) - Rounds half away from zero
pub fn fn_round(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    round_by(args, ctx, RoundingStrategy::MidpointAwayFromZero)
}

/// ROUNDUP(number, num_digits) - Rounds away from zero
pub fn fn_roundup(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    round_by(args, ctx, RoundingStrategy::AwayFromZero)
}

/// ROUNDDOWN(number, num_digits) - Rounds toward zero
pub fn fn_rounddown(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    round_by(args, ctx, RoundingStrategy::ToZero)
}

fn round_by(
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
    strategy: RoundingStrategy,
) -> FormulaResult<CellValue> {
    let Some([number, digits]) = numeric_args(args, ctx) else {
        return value_error();
    };
    Ok(CellValue::Number(round_to_digits(number, digits.trunc() as i32, strategy)))
}

/// Round in decimal so that values such as 1.1 are not pushed over by
/// binary representation error. Falls back to f64 outside Decimal's range.
fn round_to_digits(number: f64, digits: i32, strategy: RoundingStrategy) -> f64 {
    if !number.is_finite() {
        return number;
    }
    decimal_round(number, digits, strategy).unwrap_or_else(|| float_round(number, digits, strategy))
}

fn decimal_round(number: f64, digits: i32, strategy: RoundingStrategy) -> Option<f64> {
    let value = Decimal::from_f64(number)?;

    let rounded = if digits >= 0 {
        value.round_dp_with_strategy(digits as u32, strategy)
    } else {
        let power = 10i128.checked_pow(digits.unsigned_abs())?;
        let scale = Decimal::try_from_i128_with_scale(power, 0).ok()?;
        value
            .checked_div(scale)?
            .round_dp_with_strategy(0, strategy)
            .checked_mul(scale)?
    };

    rounded.to_f64()
}

fn float_round(number: f64, digits: i32, strategy: RoundingStrategy) -> f64 {
    let factor = 10f64.powi(digits);
    let scaled = number * factor;
    let rounded = match strategy {
        RoundingStrategy::AwayFromZero => scaled.abs().ceil().copysign(scaled),
        RoundingStrategy::ToZero => scaled.trunc(),
        _ => scaled.round(),
    };
    let result = rounded / factor;
    if result.is_finite() {
        result
    } else {
        number
    }
}

/// INT(number) - Rounds down to the nearest integer
pub fn fn_int(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    unary(args, ctx, |n| CellValue::Number(n.floor()))
}

/// MOD(number, divisor) - Remainder with the sign of the dividend
pub fn fn_mod(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let Some([number, divisor]) = numeric_args(args, ctx) else {
        return value_error();
    };

    if divisor == 0.0 {
        return Ok(CellValue::Error(CellError::Div0));
    }

    Ok(CellValue::Number(number % divisor))
}

/// RAND() - Uniform random number in [0, 1)
pub fn fn_rand(_args: &[FormulaExpr], _ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let mut rng = rand::thread_rng();
    Ok(CellValue::Number(rng.gen::<f64>()))
}

/// RANDBETWEEN(bottom, top) - Random integer in [bottom, top]
pub fn fn_randbetween(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let Some([bottom, top]) = numeric_args(args, ctx) else {
        return value_error();
    };

    let (bottom, top) = (bottom.trunc(), top.trunc());
    if !(bottom <= top) {
        return Ok(CellValue::Error(CellError::Num));
    }
    let (bottom, top) = (bottom as i64, top as i64);

    let mut rng = rand::thread_rng();
    Ok(CellValue::Number(rng.gen_range(bottom..=top) as f64))
}

#[cfg(test)]
mod tests {
    use crate::evaluator::{evaluate, CellResolver, EmptySheet, EvaluationContext};
    use crate::functions::FunctionRegistry;
    use crate::parser::parse_formula;
    use gridcalc_core::{CellAddress, CellError, CellValue};
    use pretty_assertions::assert_eq;

    fn eval(formula: &str) -> CellValue {
        eval_with(formula, &EmptySheet)
    }

    fn eval_with(formula: &str, resolver: &dyn CellResolver) -> CellValue {
        let registry = FunctionRegistry::new();
        let ctx = EvaluationContext::new(resolver, &registry);
        evaluate(&parse_formula(formula).unwrap(), &ctx)
    }

    fn assert_approx(value: CellValue, expected: f64) {
        match value {
            CellValue::Number(n) => assert!(
                (n - expected).abs() < 1e-9,
                "expected {expected}, got {n}"
            ),
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn test_sum() {
        assert_eq!(eval("=SUM(1,2,3,4,5)"), CellValue::Number(15.0));
        assert_eq!(eval("=SUM()"), CellValue::Number(0.0));
        // Direct text is coerced, booleans and junk are skipped
        assert_eq!(eval("=SUM(\"5\", TRUE, \"x\", 1)"), CellValue::Number(6.0));
    }

    #[test]
    fn test_sum_range_skips_non_numbers() {
        let resolver = |addr: CellAddress| match addr.row {
            0 => CellValue::Number(1.0),
            1 => CellValue::string("2"),
            2 => CellValue::Boolean(true),
            3 => CellValue::Error(CellError::Na),
            _ => CellValue::Number(4.0),
        };
        assert_eq!(eval_with("=SUM(A1:A5)", &resolver), CellValue::Number(5.0));
    }

    #[test]
    fn test_abs_sqrt_power() {
        assert_eq!(eval("=ABS(-3)"), CellValue::Number(3.0));
        assert_eq!(eval("=ABS(\"x\")"), CellValue::Error(CellError::Value));
        assert_eq!(eval("=SQRT(16)"), CellValue::Number(4.0));
        assert_eq!(eval("=SQRT(-1)"), CellValue::Error(CellError::Num));
        assert_eq!(eval("=POWER(2,10)"), CellValue::Number(1024.0));
        assert_eq!(eval("=POWER(0,-1)"), CellValue::Error(CellError::Num));
    }

    #[test]
    fn test_trig() {
        assert_approx(eval("=PI()"), std::f64::consts::PI);
        assert_approx(eval("=COS(0)"), 1.0);
        assert_approx(eval("=ACOS(-1)"), std::f64::consts::PI);
        assert_eq!(eval("=ACOS(2)"), CellValue::Error(CellError::Num));
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(eval("=ROUND(2.5,0)"), CellValue::Number(3.0));
        assert_eq!(eval("=ROUND(-2.5,0)"), CellValue::Number(-3.0));
        assert_eq!(eval("=ROUND(3.14159,2)"), CellValue::Number(3.14));
        assert_eq!(eval("=ROUND(1234.5,-2)"), CellValue::Number(1200.0));
        assert_eq!(eval("=ROUND(1.5)"), CellValue::Error(CellError::Value));
    }

    #[test]
    fn test_roundup_rounddown() {
        assert_eq!(eval("=ROUNDUP(3.2,0)"), CellValue::Number(4.0));
        assert_eq!(eval("=ROUNDUP(-3.2,0)"), CellValue::Number(-4.0));
        assert_eq!(eval("=ROUNDUP(1.1,1)"), CellValue::Number(1.1));
        assert_eq!(eval("=ROUNDUP(3.14159,3)"), CellValue::Number(3.142));
        assert_eq!(eval("=ROUNDDOWN(3.9,0)"), CellValue::Number(3.0));
        assert_eq!(eval("=ROUNDDOWN(-3.9,0)"), CellValue::Number(-3.0));
        assert_eq!(eval("=ROUNDDOWN(1999,-3)"), CellValue::Number(1000.0));
    }

    #[test]
    fn test_int_and_mod() {
        assert_eq!(eval("=INT(5.7)"), CellValue::Number(5.0));
        assert_eq!(eval("=INT(-5.2)"), CellValue::Number(-6.0));
        assert_eq!(eval("=MOD(10,3)"), CellValue::Number(1.0));
        assert_eq!(eval("=MOD(-10,3)"), CellValue::Number(-1.0));
        assert_eq!(eval("=MOD(10,0)"), CellValue::Error(CellError::Div0));
    }

    #[test]
    fn test_random() {
        for _ in 0..20 {
            match eval("=RAND()") {
                CellValue::Number(n) => assert!((0.0..1.0).contains(&n)),
                other => panic!("expected number, got {other:?}"),
            }
            match eval("=RANDBETWEEN(1,6)") {
                CellValue::Number(n) => {
                    assert!((1.0..=6.0).contains(&n));
                    assert_eq!(n.fract(), 0.0);
                }
                other => panic!("expected number, got {other:?}"),
            }
        }
        assert_eq!(eval("=RANDBETWEEN(3,3)"), CellValue::Number(3.0));
        assert_eq!(eval("=RANDBETWEEN(5,1)"), CellValue::Error(CellError::Num));
        assert_eq!(eval("=RANDBETWEEN(\"NaN\",1)"), CellValue::Error(CellError::Num));
    }
}
