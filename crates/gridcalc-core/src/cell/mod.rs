//! Cell-related types and utilities
//!
//! This module contains:
//! - [`CellValue`] - The value a cell evaluates to
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`CellRange`] - An inclusive rectangle of cells (e.g., "A1:B10")

mod address;
mod value;

pub use address::{CellAddress, CellRange, CellRangeIterator};
pub use value::{parse_number, text_eq_ignore_case, CellError, CellValue};
