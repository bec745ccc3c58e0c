//! Abstract Syntax Tree for formulas

use gridcalc_core::{CellAddress, CellRange};

/// Formula expression node
///
/// Each cell owns the tree it parsed; nodes are never shared between cells.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Number literal
    Number(f64),
    /// String literal
    String(String),
    /// Prefix operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },
    /// Infix operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Single cell reference (e.g., A1)
    CellRef(CellAddress),
    /// Range reference (e.g., A1:B10), corners as written
    Range(CellRange),
    /// Function call, name upper-cased
    Function { name: String, args: Vec<FormulaExpr> },
}

impl FormulaExpr {
    /// Visit every cell address this expression reads from
    ///
    /// Ranges are expanded to each contained cell. Function arguments and
    /// operands of both unary and binary operators are walked.
    pub fn for_each_reference(&self, f: &mut impl FnMut(CellAddress)) {
        match self {
            FormulaExpr::Number(_) | FormulaExpr::String(_) => {}
            FormulaExpr::CellRef(addr) => f(*addr),
            FormulaExpr::Range(range) => {
                for addr in range.cells() {
                    f(addr);
                }
            }
            FormulaExpr::UnaryOp { operand, .. } => operand.for_each_reference(f),
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.for_each_reference(f);
                right.for_each_reference(f);
            }
            FormulaExpr::Function { args, .. } => {
                for arg in args {
                    arg.for_each_reference(f);
                }
            }
        }
    }

    /// Collect the referenced addresses (ranges expanded, duplicates kept)
    pub fn references(&self) -> Vec<CellAddress> {
        let mut refs = Vec::new();
        self.for_each_reference(&mut |addr| refs.push(addr));
        refs
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,

    // Comparison
    Equal,
    NotEqual,
    LessThan,
    LessEqual,
    GreaterThan,
    GreaterEqual,
}

impl BinaryOperator {
    /// Operator symbol as written in a formula
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Equal => "=",
            BinaryOperator::NotEqual => "<>",
            BinaryOperator::LessThan => "<",
            BinaryOperator::LessEqual => "<=",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::GreaterEqual => ">=",
        }
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// +x
    Plus,
    /// -x
    Negate,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_references_expand_ranges_and_unary_operands() {
        let expr = FormulaExpr::BinaryOp {
            op: BinaryOperator::Add,
            left: Box::new(FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(FormulaExpr::CellRef(CellAddress::new(4, 4))),
            }),
            right: Box::new(FormulaExpr::Function {
                name: "SUM".into(),
                args: vec![FormulaExpr::Range(CellRange::new(
                    CellAddress::new(0, 0),
                    CellAddress::new(1, 1),
                ))],
            }),
        };

        assert_eq!(
            expr.references(),
            vec![
                CellAddress::new(4, 4),
                CellAddress::new(0, 0),
                CellAddress::new(0, 1),
                CellAddress::new(1, 0),
                CellAddress::new(1, 1),
            ]
        );
    }

    #[test]
    fn test_reversed_range_has_no_references() {
        let expr = FormulaExpr::Range(CellRange::new(
            CellAddress::new(2, 0),
            CellAddress::new(0, 0),
        ));
        assert!(expr.references().is_empty());
    }
}
