//! Financial functions
//!
//! PMT, FV and PV solve the annuity relation
//!
//! ```text
//! pv * (1 + rate)^nper + pmt * (1 + rate * type) * ((1 + rate)^nper - 1) / rate + fv = 0
//! ```
//!
//! for one unknown. A zero rate uses the linear form `pv + pmt * nper + fv = 0`.
//! `type` is 0 for payments at the end of each period and 1 for the start.

use super::{finite_number, numeric_args, value_error};
use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use gridcalc_core::CellValue;

/// Required leading arguments plus the optional fourth and fifth
fn annuity_args(args: &[FormulaExpr], ctx: &EvaluationContext) -> Option<[f64; 5]> {
    let [rate, nper, third] = numeric_args(args, ctx)?;
    let fourth = ctx.number_or(args.get(3), 0.0);
    let kind = ctx.number_or(args.get(4), 0.0);
    Some([rate, nper, third, fourth, kind])
}

/// Growth factor `(1 + rate)^nper` and the annuity factor for `type`
fn factors(rate: f64, nper: f64, kind: f64) -> (f64, f64) {
    let growth = (1.0 + rate).powf(nper);
    let annuity = (1.0 + rate * kind) * (growth - 1.0) / rate;
    (growth, annuity)
}

/// PMT(rate, nper, pv, [fv], [type]) - Payment per period
pub fn fn_pmt(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let Some([rate, nper, pv, fv, kind]) = annuity_args(args, ctx) else {
        return value_error();
    };

    if rate == 0.0 {
        return Ok(finite_number(-(pv + fv) / nper));
    }

    let (growth, annuity) = factors(rate, nper, kind);
    Ok(finite_number((-fv - pv * growth) / annuity))
}

/// FV(rate, nper, pmt, [pv], [type]) - Future value
pub fn fn_fv(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let Some([rate, nper, pmt, pv, kind]) = annuity_args(args, ctx) else {
        return value_error();
    };

    if rate == 0.0 {
        return Ok(finite_number(-(pv + pmt * nper)));
    }

    let (growth, annuity) = factors(rate, nper, kind);
    Ok(finite_number(-(pv * growth + pmt * annuity)))
}

/// PV(rate, nper, pmt, [fv], [type]) - Present value
pub fn fn_pv(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let Some([rate, nper, pmt, fv, kind]) = annuity_args(args, ctx) else {
        return value_error();
    };

    if rate == 0.0 {
        return Ok(finite_number(-(fv + pmt * nper)));
    }

    let (growth, annuity) = factors(rate, nper, kind);
    Ok(finite_number((-fv - pmt * annuity) / growth))
}

/// NPV(rate, value1, ...) - Net present value of periodic cash flows
///
/// The first flow is discounted one full period. Only numbers inside ranges
/// count as flows; a direct argument that is not numeric is `#VALUE!`.
pub fn fn_npv(args: &[FormulaExpr], ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    let Some([rate]) = numeric_args(args, ctx) else {
        return value_error();
    };

    let mut npv = 0.0;
    let mut period = 1;

    for arg in ctx.values(&args[1..]) {
        let flow = if arg.from_range {
            match arg.value {
                CellValue::Number(n) => n,
                _ => continue,
            }
        } else {
            match arg.value.as_number() {
                Some(n) => n,
                None => return value_error(),
            }
        };

        npv += flow / (1.0 + rate).powi(period);
        period += 1;
    }

    Ok(finite_number(npv))
}

#[cfg(test)]
mod tests {
    use crate::evaluator::{evaluate, CellResolver, EmptySheet, EvaluationContext};
    use crate::functions::FunctionRegistry;
    use crate::parser::parse_formula;
    use gridcalc_core::{CellAddress, CellError, CellValue};
    use pretty_assertions::assert_eq;

    fn eval_with(formula: &str, resolver: &dyn CellResolver) -> CellValue {
        let registry = FunctionRegistry::new();
        let ctx = EvaluationContext::new(resolver, &registry);
        evaluate(&parse_formula(formula).unwrap(), &ctx)
    }

    fn eval(formula: &str) -> CellValue {
        eval_with(formula, &EmptySheet)
    }

    fn assert_approx(value: CellValue, expected: f64) {
        match value {
            CellValue::Number(n) => assert!(
                (n - expected).abs() < 0.01,
                "expected {expected}, got {n}"
            ),
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn test_pmt() {
        assert_approx(eval("=PMT(0.08/12, 10, 10000)"), -1037.03);
        assert_approx(eval("=PMT(0, 10, 1000)"), -100.0);
        // Paying at the start of each period needs slightly less
        assert_approx(eval("=PMT(0.08/12, 10, 10000, 0, 1)"), -1030.16);
        assert_eq!(eval("=PMT(\"x\", 10, 1000)"), CellValue::Error(CellError::Value));
    }

    #[test]
    fn test_fv() {
        assert_approx(eval("=FV(0.06/12, 12, -100, 0, 0)"), 1233.56);
        assert_approx(eval("=FV(0, 12, -100)"), 1200.0);
    }

    #[test]
    fn test_pv() {
        assert_approx(eval("=PV(0.08/12, 36, -500, 0)"), 15955.90);
        assert_approx(eval("=PV(0, 10, -100)"), 1000.0);
    }

    #[test]
    fn test_npv() {
        assert_approx(eval("=NPV(0.1, -100, 50, 60)"), -4.51);
        assert_eq!(eval("=NPV(0.1, \"x\")"), CellValue::Error(CellError::Value));
    }

    #[test]
    fn test_npv_skips_non_numbers_in_ranges() {
        let resolver = |addr: CellAddress| match addr.row {
            0 => CellValue::Number(-100.0),
            1 => CellValue::string("skip"),
            2 => CellValue::Number(50.0),
            3 => CellValue::Number(60.0),
            _ => CellValue::Empty,
        };
        assert_approx(eval_with("=NPV(0.1, A1:A5)", &resolver), -4.51);
    }

    #[test]
    fn test_non_finite_is_num_error() {
        assert_eq!(eval("=PMT(0.1, 0, 1000)"), CellValue::Error(CellError::Num));
    }
}
