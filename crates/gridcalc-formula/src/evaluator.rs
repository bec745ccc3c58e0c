//! Formula evaluator
//!
//! Evaluates formula ASTs to produce values.

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::{ArgValues, FunctionRegistry};
use gridcalc_core::{text_eq_ignore_case, CellAddress, CellError, CellValue};
use std::cell::Cell;

/// Deepest expression nesting the evaluator will walk
const MAX_EVAL_DEPTH: usize = 512;

/// Source of cell values for references
pub trait CellResolver {
    /// Current value of the cell at `address` (`Empty` when unset)
    fn resolve(&self, address: CellAddress) -> CellValue;
}

impl<F> CellResolver for F
where
    F: Fn(CellAddress) -> CellValue,
{
    fn resolve(&self, address: CellAddress) -> CellValue {
        self(address)
    }
}

/// Resolver for formulas evaluated outside any sheet; every cell is empty
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptySheet;

impl CellResolver for EmptySheet {
    fn resolve(&self, _address: CellAddress) -> CellValue {
        CellValue::Empty
    }
}

/// Context for formula evaluation
///
/// Function implementations receive their arguments unevaluated and use the
/// context to evaluate the ones they need ([`evaluate`](Self::evaluate)) and to
/// read single cells ([`resolve`](Self::resolve)).
pub struct EvaluationContext<'a> {
    resolver: &'a dyn CellResolver,
    registry: &'a FunctionRegistry,
    depth: Cell<usize>,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new evaluation context
    pub fn new(resolver: &'a dyn CellResolver, registry: &'a FunctionRegistry) -> Self {
        Self {
            resolver,
            registry,
            depth: Cell::new(0),
        }
    }

    /// Function registry used for calls
    pub fn registry(&self) -> &FunctionRegistry {
        self.registry
    }

    /// Evaluate an argument node
    pub fn evaluate(&self, expr: &FormulaExpr) -> FormulaResult<CellValue> {
        let depth = self.depth.get() + 1;
        if depth > MAX_EVAL_DEPTH {
            return Err(FormulaError::Evaluation(
                "Formula is nested too deeply to evaluate".into(),
            ));
        }

        self.depth.set(depth);
        let result = evaluate_expr(expr, self);
        self.depth.set(depth - 1);
        result
    }

    /// Read the current value of a single cell
    pub fn resolve(&self, address: CellAddress) -> CellValue {
        self.resolver.resolve(address)
    }

    /// Evaluate an argument and coerce it to a number
    ///
    /// Numbers pass through, empty is 0 and numeric text is parsed. Anything
    /// else is an argument error.
    pub fn number(&self, expr: &FormulaExpr) -> FormulaResult<f64> {
        let value = self.evaluate(expr)?;
        value
            .as_number()
            .ok_or_else(|| FormulaError::Argument("Expected number".into()))
    }

    /// Evaluate an optional numeric argument, falling back to `default`
    /// when it is missing or does not coerce
    pub fn number_or(&self, expr: Option<&FormulaExpr>, default: f64) -> f64 {
        expr.and_then(|e| self.number(e).ok()).unwrap_or(default)
    }

    /// Evaluate an argument and convert it to its display text
    pub fn text(&self, expr: &FormulaExpr) -> FormulaResult<String> {
        Ok(self.evaluate(expr)?.to_string())
    }

    /// Flattened values of `args`: ranges expand to each contained cell
    pub fn values<'c>(&'c self, args: &'c [FormulaExpr]) -> ArgValues<'c, 'a> {
        ArgValues::new(self, args)
    }
}

/// Evaluate a formula expression
///
/// Never fails: anything that goes wrong while walking the tree becomes an
/// error value carrying the failure's message.
///
/// # Example
/// ```rust
/// use gridcalc_core::CellValue;
/// use gridcalc_formula::{
///     evaluate, parse_formula, EmptySheet, EvaluationContext, FunctionRegistry,
/// };
///
/// let registry = FunctionRegistry::new();
/// let ctx = EvaluationContext::new(&EmptySheet, &registry);
/// let ast = parse_formula("=1+2*3").unwrap();
/// assert_eq!(evaluate(&ast, &ctx), CellValue::Number(7.0));
/// ```
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> CellValue {
    match ctx.evaluate(expr) {
        Ok(value) => value,
        Err(e) => CellValue::message(e.message()),
    }
}

fn evaluate_expr(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<CellValue> {
    match expr {
        FormulaExpr::Number(n) => Ok(CellValue::Number(*n)),
        FormulaExpr::String(s) => Ok(CellValue::String(s.clone())),
        FormulaExpr::CellRef(addr) => Ok(ctx.resolve(*addr)),

        // A range only means something as a function argument
        FormulaExpr::Range(_) => Ok(CellValue::Error(CellError::Value)),

        FormulaExpr::UnaryOp { op, operand } => {
            let value = ctx.evaluate(operand)?;
            Ok(evaluate_unary(*op, &value))
        }

        FormulaExpr::BinaryOp { op, left, right } => {
            let left = ctx.evaluate(left)?;
            let right = ctx.evaluate(right)?;
            Ok(evaluate_binary(*op, &left, &right))
        }

        FormulaExpr::Function { name, args } => Ok(ctx.registry().call(name, args, ctx)),
    }
}

fn evaluate_unary(op: UnaryOperator, value: &CellValue) -> CellValue {
    match value.as_operand() {
        Some(n) => match op {
            UnaryOperator::Plus => CellValue::Number(n),
            UnaryOperator::Negate => CellValue::Number(-n),
        },
        None => CellValue::Error(CellError::Value),
    }
}

fn evaluate_binary(op: BinaryOperator, left: &CellValue, right: &CellValue) -> CellValue {
    if let (Some(l), Some(r)) = (left.as_operand(), right.as_operand()) {
        return match op {
            BinaryOperator::Add => CellValue::Number(l + r),
            BinaryOperator::Subtract => CellValue::Number(l - r),
            BinaryOperator::Multiply => CellValue::Number(l * r),
            BinaryOperator::Divide => {
                if r == 0.0 {
                    CellValue::Error(CellError::Div0)
                } else {
                    CellValue::Number(l / r)
                }
            }
            BinaryOperator::Equal => CellValue::Boolean(l == r),
            BinaryOperator::NotEqual => CellValue::Boolean(l != r),
            BinaryOperator::LessThan => CellValue::Boolean(l < r),
            BinaryOperator::LessEqual => CellValue::Boolean(l <= r),
            BinaryOperator::GreaterThan => CellValue::Boolean(l > r),
            BinaryOperator::GreaterEqual => CellValue::Boolean(l >= r),
        };
    }

    // Two strings only support equality, ignoring case
    if let (CellValue::String(l), CellValue::String(r)) = (left, right) {
        match op {
            BinaryOperator::Equal => return CellValue::Boolean(text_eq_ignore_case(l, r)),
            BinaryOperator::NotEqual => return CellValue::Boolean(!text_eq_ignore_case(l, r)),
            _ => {}
        }
    }

    CellValue::Error(CellError::Value)
}
