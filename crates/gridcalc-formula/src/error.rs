//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    Argument(String),
}

impl FormulaError {
    /// The message without the error-kind prefix
    pub fn message(&self) -> &str {
        match self {
            FormulaError::Parse(msg)
            | FormulaError::Evaluation(msg)
            | FormulaError::Argument(msg) => msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_drops_prefix() {
        let err = FormulaError::Parse("Unknown identifier 'x'".into());
        assert_eq!(err.to_string(), "Parse error: Unknown identifier 'x'");
        assert_eq!(err.message(), "Unknown identifier 'x'");
    }
}
