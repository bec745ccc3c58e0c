//! # gridcalc-formula
//!
//! Formula parser and evaluator for gridcalc.
//!
//! This crate provides:
//! - Formula lexing and parsing (text → AST)
//! - Formula evaluation (AST → value)
//! - Built-in functions (math, logical, text, statistical, date, lookup,
//!   financial, information)
//! - Dependency tracking for recalculation
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellAddress, CellValue};
//! use gridcalc_formula::{evaluate, parse_formula, EvaluationContext, FunctionRegistry};
//!
//! let sheet = |addr: CellAddress| match addr.to_string().as_str() {
//!     "A1" => CellValue::Number(2.0),
//!     "A2" => CellValue::Number(3.0),
//!     _ => CellValue::Empty,
//! };
//! let registry = FunctionRegistry::new();
//! let ctx = EvaluationContext::new(&sheet, &registry);
//!
//! let ast = parse_formula("=SUM(A1:A2)*2").unwrap();
//! assert_eq!(evaluate(&ast, &ctx), CellValue::Number(10.0));
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod parser;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use dependency::DependencyGraph;
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, CellResolver, EmptySheet, EvaluationContext};
pub use functions::{FunctionDef, FunctionRegistry};
pub use parser::parse_formula;
