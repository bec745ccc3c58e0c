//! # gridcalc-core
//!
//! Core data structures for the gridcalc formula engine.
//!
//! This crate provides the fundamental types used throughout gridcalc:
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and rectangular ranges
//! - [`CellValue`] - Runtime values (numbers, strings, booleans, errors, empty)
//! - [`CellError`] - Canonical spreadsheet error kinds
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellAddress, CellValue};
//!
//! let addr = CellAddress::parse("AA10").unwrap();
//! assert_eq!(addr.row, 9);
//! assert_eq!(addr.col, 26);
//! assert_eq!(addr.to_string(), "AA10");
//!
//! assert_eq!(CellValue::Boolean(true).to_string(), "TRUE");
//! ```

pub mod cell;
pub mod error;

pub use cell::{
    parse_number, text_eq_ignore_case, CellAddress, CellError, CellRange, CellRangeIterator,
    CellValue,
};
pub use error::{Error, Result};
