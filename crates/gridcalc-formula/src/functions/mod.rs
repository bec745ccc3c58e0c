//! Built-in spreadsheet functions

mod args;
pub mod date;
pub mod financial;
pub mod info;
pub mod logical;
pub mod lookup;
pub mod math;
pub mod statistical;
pub mod text;

pub use args::{ArgValue, ArgValues};

use crate::ast::FormulaExpr;
use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use ahash::AHashMap;
use gridcalc_core::{CellError, CellValue};
use std::sync::{Arc, OnceLock};

/// Built-in registry shared by every engine that does not bring its own
static BUILTIN_REGISTRY: OnceLock<Arc<FunctionRegistry>> = OnceLock::new();

/// Function implementation signature
///
/// Arguments arrive unevaluated so that functions decide what to evaluate
/// (`IF` evaluates one branch) and how ranges are read (`SUM` walks cells).
/// An `Err` is reported as an `Error in NAME: ...` value by
/// [`FunctionRegistry::call`].
pub type FunctionImpl = fn(&[FormulaExpr], &EvaluationContext) -> FormulaResult<CellValue>;

/// Function definition
#[derive(Clone)]
pub struct FunctionDef {
    /// Function name (uppercase)
    pub name: &'static str,
    /// Minimum arguments
    pub min_args: usize,
    /// Maximum arguments (None = unlimited)
    pub max_args: Option<usize>,
    /// Implementation
    pub implementation: FunctionImpl,
}

impl FunctionDef {
    pub fn new(
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        implementation: FunctionImpl,
    ) -> Self {
        Self {
            name,
            min_args,
            max_args,
            implementation,
        }
    }

    /// Whether `count` arguments are acceptable
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.map_or(true, |max| count <= max)
    }
}

/// Function registry
///
/// Lookup is case-insensitive. The registry is filled before it is shared and
/// is read-only afterwards.
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self::empty();

        registry.register_math_functions();
        registry.register_logical_functions();
        registry.register_text_functions();
        registry.register_statistical_functions();
        registry.register_date_functions();
        registry.register_lookup_functions();
        registry.register_financial_functions();
        registry.register_info_functions();

        registry
    }

    /// Create a registry without any functions
    pub fn empty() -> Self {
        Self {
            functions: AHashMap::new(),
        }
    }

    /// The process-wide built-in registry, built on first use
    pub fn shared() -> Arc<FunctionRegistry> {
        BUILTIN_REGISTRY
            .get_or_init(|| Arc::new(FunctionRegistry::new()))
            .clone()
    }

    /// Look up a function by name
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_uppercase())
    }

    /// Check whether a function is registered
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of registered functions
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Register a function, replacing any existing one with the same name
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_uppercase(), def);
    }

    /// Call a function by name
    ///
    /// Unknown names give `#NAME?` and a wrong argument count gives `#VALUE!`.
    pub fn call(&self, name: &str, args: &[FormulaExpr], ctx: &EvaluationContext) -> CellValue {
        let Some(def) = self.get(name) else {
            return CellValue::Error(CellError::Name);
        };

        if !def.accepts(args.len()) {
            return CellValue::Error(CellError::Value);
        }

        match (def.implementation)(args, ctx) {
            Ok(value) => value,
            Err(e) => {
                log::debug!("{} failed: {}", def.name, e);
                CellValue::message(format!("Error in {}: {}", def.name, e.message()))
            }
        }
    }

    fn register_math_functions(&mut self) {
        self.register(FunctionDef::new("SUM", 0, None, math::fn_sum));
        self.register(FunctionDef::new("ABS", 1, Some(1), math::fn_abs));
        self.register(FunctionDef::new("ACOS", 1, Some(1), math::fn_acos));
        self.register(FunctionDef::new("COS", 1, Some(1), math::fn_cos));
        self.register(FunctionDef::new("PI", 0, Some(0), math::fn_pi));
        self.register(FunctionDef::new("POWER", 2, Some(2), math::fn_power));
        self.register(FunctionDef::new("SQRT", 1, Some(1), math::fn_sqrt));
        self.register(FunctionDef::new("ROUND", 2, Some(2), math::fn_round));
        self.register(FunctionDef::new("ROUNDUP", 2, Some(2), math::fn_roundup));
        self.register(FunctionDef::new("ROUNDDOWN", 2, Some(2), math::fn_rounddown));
        self.register(FunctionDef::new("INT", 1, Some(1), math::fn_int));
        self.register(FunctionDef::new("MOD", 2, Some(2), math::fn_mod));
        self.register(FunctionDef::new("RAND", 0, Some(0), math::fn_rand));
        self.register(FunctionDef::new("RANDBETWEEN", 2, Some(2), math::fn_randbetween));
    }

    fn register_logical_functions(&mut self) {
        self.register(FunctionDef::new("AND", 1, None, logical::fn_and));
        self.register(FunctionDef::new("OR", 1, None, logical::fn_or));
        self.register(FunctionDef::new("NOT", 1, Some(1), logical::fn_not));
        self.register(FunctionDef::new("IF", 2, Some(3), logical::fn_if));
        // TRUE and FALSE ignore any arguments they are given
        self.register(FunctionDef::new("TRUE", 0, None, logical::fn_true));
        self.register(FunctionDef::new("FALSE", 0, None, logical::fn_false));
    }

    fn register_text_functions(&mut self) {
        self.register(FunctionDef::new("CONCATENATE", 0, None, text::fn_concatenate));
        self.register(FunctionDef::new("LEN", 1, Some(1), text::fn_len));
        self.register(FunctionDef::new("LOWER", 1, Some(1), text::fn_lower));
        self.register(FunctionDef::new("UPPER", 1, Some(1), text::fn_upper));
        self.register(FunctionDef::new("LEFT", 1, Some(2), text::fn_left));
        self.register(FunctionDef::new("RIGHT", 1, Some(2), text::fn_right));
        self.register(FunctionDef::new("MID", 3, Some(3), text::fn_mid));
        self.register(FunctionDef::new("TRIM", 1, Some(1), text::fn_trim));
        self.register(FunctionDef::new("REPT", 2, Some(2), text::fn_rept));
        self.register(FunctionDef::new("FIND", 2, Some(3), text::fn_find));
        self.register(FunctionDef::new("SEARCH", 2, Some(3), text::fn_search));
        self.register(FunctionDef::new("SUBSTITUTE", 3, Some(4), text::fn_substitute));
    }

    fn register_statistical_functions(&mut self) {
        self.register(FunctionDef::new("AVERAGE", 0, None, statistical::fn_average));
        self.register(FunctionDef::new("COUNT", 0, None, statistical::fn_count));
        self.register(FunctionDef::new("COUNTA", 0, None, statistical::fn_counta));
        self.register(FunctionDef::new("COUNTBLANK", 0, None, statistical::fn_countblank));
        self.register(FunctionDef::new("MAX", 0, None, statistical::fn_max));
        self.register(FunctionDef::new("MIN", 0, None, statistical::fn_min));
    }

    fn register_date_functions(&mut self) {
        self.register(FunctionDef::new("DATE", 3, Some(3), date::fn_date));
        self.register(FunctionDef::new("YEAR", 1, Some(1), date::fn_year));
        self.register(FunctionDef::new("MONTH", 1, Some(1), date::fn_month));
        self.register(FunctionDef::new("DAY", 1, Some(1), date::fn_day));
        self.register(FunctionDef::new("TODAY", 0, Some(0), date::fn_today));
        self.register(FunctionDef::new("NOW", 0, Some(0), date::fn_now));
        self.register(FunctionDef::new("TIME", 3, Some(3), date::fn_time));
        self.register(FunctionDef::new("HOUR", 1, Some(1), date::fn_hour));
        self.register(FunctionDef::new("MINUTE", 1, Some(1), date::fn_minute));
        self.register(FunctionDef::new("SECOND", 1, Some(1), date::fn_second));
    }

    fn register_lookup_functions(&mut self) {
        self.register(FunctionDef::new("VLOOKUP", 3, Some(4), lookup::fn_vlookup));
        self.register(FunctionDef::new("MATCH", 2, Some(3), lookup::fn_match));
        self.register(FunctionDef::new("INDEX", 2, Some(3), lookup::fn_index));
    }

    fn register_financial_functions(&mut self) {
        self.register(FunctionDef::new("PMT", 3, Some(5), financial::fn_pmt));
        self.register(FunctionDef::new("FV", 3, Some(5), financial::fn_fv));
        self.register(FunctionDef::new("PV", 3, Some(5), financial::fn_pv));
        self.register(FunctionDef::new("NPV", 2, None, financial::fn_npv));
    }

    fn register_info_functions(&mut self) {
        self.register(FunctionDef::new("ISNUMBER", 1, Some(1), info::fn_isnumber));
        self.register(FunctionDef::new("ISTEXT", 1, Some(1), info::fn_istext));
        self.register(FunctionDef::new("ISLOGICAL", 1, Some(1), info::fn_islogical));
        self.register(FunctionDef::new("ISERROR", 1, Some(1), info::fn_iserror));
        self.register(FunctionDef::new("ISBLANK", 1, Some(1), info::fn_isblank));
    }
}

/// Evaluate the first `N` arguments as numbers
///
/// `None` when an argument is missing or does not coerce; callers turn that
/// into `#VALUE!`.
pub(crate) fn numeric_args<const N: usize>(
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
) -> Option<[f64; N]> {
    if args.len() < N {
        return None;
    }

    let mut values = [0.0; N];
    for (slot, arg) in values.iter_mut().zip(args) {
        *slot = ctx.number(arg).ok()?;
    }
    Some(values)
}

/// The `#VALUE!` result
pub(crate) fn value_error() -> FormulaResult<CellValue> {
    Ok(CellValue::Error(CellError::Value))
}

/// A numeric result, or `#NUM!` when it is not finite
pub(crate) fn finite_number(n: f64) -> CellValue {
    if n.is_finite() {
        CellValue::Number(n)
    } else {
        CellValue::Error(CellError::Num)
    }
}
