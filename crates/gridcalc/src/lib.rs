//! # gridcalc
//!
//! An incremental spreadsheet formula engine.
//!
//! ## Features
//!
//! - A1-style formulas with arithmetic, comparisons, ranges and function calls
//! - Built-in math, logical, text, statistical, date, lookup, financial and
//!   information functions
//! - Dependency tracking: a write recalculates only the cells it affects, in
//!   dependency order
//! - Circular references reported as `#CYCLE!`
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut engine = Engine::new();
//! engine.set_cell("A1", "1").unwrap();
//! engine.set_cell("A2", "2").unwrap();
//! engine.set_cell("B1", "3").unwrap();
//! engine.set_cell("B2", "4").unwrap();
//! engine.set_cell("C1", "=SUM(A1:B2)").unwrap();
//!
//! assert_eq!(engine.get_cell_value("C1").unwrap(), CellValue::Number(10.0));
//! assert_eq!(engine.get_cell_value("Z99").unwrap(), CellValue::Empty);
//! ```

pub mod engine;
pub mod prelude;

pub use engine::{Engine, EngineOptions, RecalcMode, RecalcStats};

// Re-export core types
pub use gridcalc_core::{CellAddress, CellError, CellRange, CellValue, Error, Result};

// Re-export formula types
pub use gridcalc_formula::{
    evaluate, parse_formula, CellResolver, EvaluationContext, FormulaError, FormulaExpr,
    FormulaResult, FunctionDef, FunctionRegistry,
};
