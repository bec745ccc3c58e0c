//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    // Cell types
    CellAddress,
    CellError,
    CellRange,
    CellValue,
    // Engine
    Engine,
    EngineOptions,
    // Error types
    Error,
    // Functions
    FunctionDef,
    FunctionRegistry,
    RecalcMode,
    RecalcStats,
    Result,
};
