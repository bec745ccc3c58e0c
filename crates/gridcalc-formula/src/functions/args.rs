//! Flattened argument values
//!
//! Aggregate functions treat a range argument as the sequence of its cells and
//! any other argument as its own evaluated value. [`ArgValues`] yields that
//! sequence lazily; clone it to walk the arguments again.

use crate::ast::FormulaExpr;
use crate::evaluator::EvaluationContext;
use gridcalc_core::{CellRangeIterator, CellValue};
use std::iter::FilterMap;
use std::slice;

/// One value produced while flattening arguments
#[derive(Debug, Clone, PartialEq)]
pub struct ArgValue {
    pub value: CellValue,
    /// True when the value was read from a cell inside a range argument
    pub from_range: bool,
}

/// Lazy, restartable iterator over flattened argument values
#[derive(Clone)]
pub struct ArgValues<'c, 'a> {
    ctx: &'c EvaluationContext<'a>,
    args: slice::Iter<'c, FormulaExpr>,
    range: Option<CellRangeIterator>,
}

impl<'c, 'a> ArgValues<'c, 'a> {
    pub(crate) fn new(ctx: &'c EvaluationContext<'a>, args: &'c [FormulaExpr]) -> Self {
        Self {
            ctx,
            args: args.iter(),
            range: None,
        }
    }

    /// Only the numbers, in order
    pub fn numbers(self) -> FilterMap<Self, fn(ArgValue) -> Option<f64>> {
        self.filter_map(number_of as fn(ArgValue) -> Option<f64>)
    }
}

fn number_of(arg: ArgValue) -> Option<f64> {
    match arg.value {
        CellValue::Number(n) => Some(n),
        _ => None,
    }
}

impl<'c, 'a> Iterator for ArgValues<'c, 'a> {
    type Item = ArgValue;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(range) = self.range.as_mut() {
                if let Some(addr) = range.next() {
                    return Some(ArgValue {
                        value: self.ctx.resolve(addr),
                        from_range: true,
                    });
                }
                self.range = None;
            }

            match self.args.next()? {
                FormulaExpr::Range(range) => self.range = Some(range.cells()),
                expr => {
                    let value = self
                        .ctx
                        .evaluate(expr)
                        .unwrap_or_else(|e| CellValue::message(e.message()));
                    return Some(ArgValue {
                        value,
                        from_range: false,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functions::FunctionRegistry;
    use crate::parser::parse_formula;
    use gridcalc_core::CellAddress;
    use pretty_assertions::assert_eq;

    fn args_of(formula: &str) -> Vec<FormulaExpr> {
        match parse_formula(formula).unwrap() {
            FormulaExpr::Function { args, .. } => args,
            other => panic!("expected a call, got {other:?}"),
        }
    }

    #[test]
    fn test_ranges_expand_row_major() {
        let resolver = |addr: CellAddress| CellValue::Number((addr.row * 10 + addr.col) as f64);
        let registry = FunctionRegistry::new();
        let ctx = EvaluationContext::new(&resolver, &registry);
        let args = args_of("=F(A1:B2, 1+1)");

        let values: Vec<_> = ctx.values(&args).collect();
        let expected: Vec<_> = [(0.0, true), (1.0, true), (10.0, true), (11.0, true), (2.0, false)]
            .into_iter()
            .map(|(n, from_range)| ArgValue {
                value: CellValue::Number(n),
                from_range,
            })
            .collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn test_restartable_and_numbers_only() {
        let resolver = |addr: CellAddress| {
            if addr.row == 0 {
                CellValue::string("label")
            } else {
                CellValue::Number(addr.row as f64)
            }
        };
        let registry = FunctionRegistry::new();
        let ctx = EvaluationContext::new(&resolver, &registry);
        let args = args_of("=F(A1:A3, \"x\")");

        let values = ctx.values(&args);
        assert_eq!(values.clone().count(), 4);
        assert_eq!(values.numbers().collect::<Vec<_>>(), vec![1.0, 2.0]);
    }
}
