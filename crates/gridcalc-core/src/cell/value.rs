//! Cell value types

use std::fmt;

/// The value a cell (or any sub-expression) evaluates to
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Numeric value (all numbers stored as f64, including dates)
    Number(f64),

    /// String value
    String(String),

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Error value (#VALUE!, #REF!, etc.)
    Error(CellError),

    /// Empty cell (no value)
    #[default]
    Empty,
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(s.into())
    }

    /// Create an error value carrying a diagnostic message
    pub fn message<S: Into<String>>(msg: S) -> Self {
        CellValue::Error(CellError::Message(msg.into()))
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Check if the value is an error
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// True for `Empty` and for the empty string
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Numeric view used by operators: numbers pass through, empty is 0
    ///
    /// Strings, booleans and errors do not coerce.
    pub fn as_operand(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Empty => Some(0.0),
            _ => None,
        }
    }

    /// Numeric view used by function arguments
    ///
    /// Like [`as_operand`](Self::as_operand), but a string that parses as a
    /// number is accepted too.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::String(s) => parse_number(s),
            other => other.as_operand(),
        }
    }

    /// Truthiness used by logical functions
    ///
    /// Booleans as-is, numbers are true when nonzero, strings only when they
    /// spell "true" (case-insensitive). Everything else is false.
    pub fn as_bool(&self) -> bool {
        match self {
            CellValue::Boolean(b) => *b,
            CellValue::Number(n) => *n != 0.0,
            CellValue::String(s) => s.trim().eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// Get the error if this is one
    pub fn error(&self) -> Option<&CellError> {
        match self {
            CellValue::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Get the type name for this value
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Number(_) => "number",
            CellValue::String(_) => "string",
            CellValue::Boolean(_) => "boolean",
            CellValue::Error(_) => "error",
            CellValue::Empty => "empty",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::String(s) => f.write_str(s),
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::Error(e) => write!(f, "{}", e),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// Spreadsheet error values
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellError {
    /// #VALUE! - Wrong type of argument or operand
    Value,
    /// #DIV/0! - Division by zero
    Div0,
    /// #REF! - Invalid cell reference
    Ref,
    /// #NAME? - Unrecognized function name
    Name,
    /// #N/A - Value not available
    Na,
    /// #NUM! - Invalid numeric value
    Num,
    /// #CYCLE! - The cell takes part in (or depends on) a circular reference
    Circular,
    /// A diagnostic message for failures without a canonical code
    Message(String),
}

impl CellError {
    /// Get the display string for this error
    pub fn as_str(&self) -> &str {
        match self {
            CellError::Value => "#VALUE!",
            CellError::Div0 => "#DIV/0!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Na => "#N/A",
            CellError::Num => "#NUM!",
            CellError::Circular => "#CYCLE!",
            CellError::Message(msg) => msg,
        }
    }

    /// Parse a canonical error code
    pub fn from_code(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "#VALUE!" => Some(CellError::Value),
            "#DIV/0!" => Some(CellError::Div0),
            "#REF!" => Some(CellError::Ref),
            "#NAME?" => Some(CellError::Name),
            "#N/A" => Some(CellError::Na),
            "#NUM!" => Some(CellError::Num),
            "#CYCLE!" => Some(CellError::Circular),
            _ => None,
        }
    }

    /// True for the fixed spreadsheet codes, false for diagnostic messages
    pub fn is_canonical(&self) -> bool {
        !matches!(self, CellError::Message(_))
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse literal text as a floating-point number
///
/// Surrounding whitespace is ignored. Returns `None` for anything that is not
/// a complete number.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok()
}

/// Case-insensitive equality by upper-cased code points
pub fn text_eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_uppercase)
        .eq(b.chars().flat_map(char::to_uppercase))
}
