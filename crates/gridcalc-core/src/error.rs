//! Error types for gridcalc-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gridcalc-core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Address text does not match `[A-Za-z]+[0-9]+`, or is out of range
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),
}
