//! Recalculation engine
//!
//! Owns the cell store and keeps every cached value consistent with the
//! formulas it depends on. Each write re-parses the cell, rewires its
//! dependency edges and recalculates the affected cells in dependency order.
//!
//! # Example
//!
//! ```rust
//! use gridcalc::{CellValue, Engine};
//!
//! let mut engine = Engine::new();
//! engine.set_cell("A1", "10").unwrap();
//! engine.set_cell("A2", "20").unwrap();
//! engine.set_cell("A3", "=A1+A2").unwrap();
//! assert_eq!(engine.get_cell_value("A3").unwrap(), CellValue::Number(30.0));
//!
//! engine.set_cell("A1", "5").unwrap();
//! assert_eq!(engine.get_cell_value("A3").unwrap(), CellValue::Number(25.0));
//! ```

use crate::{CellAddress, CellError, CellValue, Result};
use ahash::{AHashMap, AHashSet};
use gridcalc_core::parse_number;
use gridcalc_formula::{
    evaluate, parse_formula, CellResolver, DependencyGraph, EvaluationContext, FormulaExpr,
    FunctionRegistry,
};
use log::{debug, trace, warn};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;

/// When writes trigger recalculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecalcMode {
    /// Every write recalculates the cells it affects before returning
    #[default]
    Automatic,
    /// Writes only mark affected cells dirty; see [`Engine::recalculate`]
    Manual,
}

/// Options for the engine
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// When writes trigger recalculation (default: automatic)
    pub recalc_mode: RecalcMode,
    /// Mark cells on a dependency cycle `#CYCLE!` (default: true)
    ///
    /// When disabled those cells are skipped by recalculation and keep their
    /// previous values.
    pub detect_cycles: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            recalc_mode: RecalcMode::Automatic,
            detect_cycles: true,
        }
    }
}

/// Statistics from a recalculation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecalcStats {
    /// Number of cells whose value was recomputed
    pub cells_evaluated: usize,
    /// Number of cells marked as circular references
    pub circular: usize,
}

/// Per-cell state
#[derive(Debug, Clone, Default)]
struct CellRecord {
    /// Text exactly as written
    raw: String,
    /// Parsed form; `None` when the formula failed to parse
    ast: Option<FormulaExpr>,
    /// Last computed value
    value: CellValue,
    /// Value is out of date
    dirty: bool,
}

impl CellRecord {
    /// Build the record for `text`: formulas are parsed, anything else is a
    /// number or string literal
    fn compile(text: &str) -> Self {
        let mut record = CellRecord {
            raw: text.to_string(),
            ..Default::default()
        };

        if text.starts_with('=') {
            match parse_formula(text) {
                Ok(ast) => {
                    record.ast = Some(ast);
                    record.dirty = true;
                }
                Err(e) => {
                    debug!("formula {text:?} failed to parse: {e}");
                    record.value = CellValue::message(e.to_string());
                }
            }
        } else {
            let literal = match parse_number(text) {
                Some(n) => FormulaExpr::Number(n),
                None => FormulaExpr::String(text.to_string()),
            };
            record.ast = Some(literal);
            record.dirty = true;
        }

        record
    }
}

/// Read view of the cell store handed to the evaluator
///
/// Clean cells answer from cache. A dirty cell is evaluated on the spot
/// without being cached; re-entering a cell that is already being evaluated
/// yields `#CYCLE!`.
struct CellStore<'e> {
    cells: &'e AHashMap<CellAddress, CellRecord>,
    registry: &'e FunctionRegistry,
    evaluating: RefCell<AHashSet<CellAddress>>,
}

impl<'e> CellStore<'e> {
    fn new(cells: &'e AHashMap<CellAddress, CellRecord>, registry: &'e FunctionRegistry) -> Self {
        Self {
            cells,
            registry,
            evaluating: RefCell::new(AHashSet::new()),
        }
    }

    fn evaluate(&self, address: CellAddress, ast: &FormulaExpr) -> CellValue {
        if !self.evaluating.borrow_mut().insert(address) {
            return CellValue::Error(CellError::Circular);
        }

        let ctx = EvaluationContext::new(self, self.registry);
        let value = evaluate(ast, &ctx);

        self.evaluating.borrow_mut().remove(&address);
        value
    }
}

impl CellResolver for CellStore<'_> {
    fn resolve(&self, address: CellAddress) -> CellValue {
        let Some(record) = self.cells.get(&address) else {
            return CellValue::Empty;
        };

        match &record.ast {
            Some(ast) if record.dirty => self.evaluate(address, ast),
            _ => record.value.clone(),
        }
    }
}

/// Formula engine over a single sheet of cells
pub struct Engine {
    cells: AHashMap<CellAddress, CellRecord>,
    graph: DependencyGraph,
    registry: Arc<FunctionRegistry>,
    options: EngineOptions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Create an engine with default options and the built-in functions
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    /// Create an engine with custom options and the built-in functions
    pub fn with_options(options: EngineOptions) -> Self {
        Self::with_registry(FunctionRegistry::shared(), options)
    }

    /// Create an engine that calls functions from `registry`
    pub fn with_registry(registry: Arc<FunctionRegistry>, options: EngineOptions) -> Self {
        Self {
            cells: AHashMap::new(),
            graph: DependencyGraph::new(),
            registry,
            options,
        }
    }

    /// Engine options
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Function registry used for evaluation
    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    /// Set a cell's text
    ///
    /// Text starting with `=` is a formula; anything else is a literal, numeric
    /// when it parses as a number. Writing the exact text a cell already holds
    /// does nothing. Fails only when `address` is not a valid cell address;
    /// formula problems become error values in the cell.
    pub fn set_cell(&mut self, address: &str, text: &str) -> Result<RecalcStats> {
        let address = CellAddress::parse(address)?;
        Ok(self.set_cell_at(address, text))
    }

    /// Set a cell's text by address
    pub fn set_cell_at(&mut self, address: CellAddress, text: &str) -> RecalcStats {
        if let Some(record) = self.cells.get(&address) {
            if record.raw == text {
                trace!("{address} unchanged");
                return RecalcStats::default();
            }
        }

        self.graph.remove_dependencies(address);

        let record = CellRecord::compile(text);
        if let Some(ast) = &record.ast {
            self.link(address, ast);
        }
        debug!(
            "set {address} = {text:?} ({})",
            if record.ast.is_some() { "ok" } else { "parse error" }
        );
        self.cells.insert(address, record);

        match self.options.recalc_mode {
            RecalcMode::Automatic => self.recalculate_from(&[address]),
            RecalcMode::Manual => {
                self.mark_dirty(address);
                RecalcStats::default()
            }
        }
    }

    /// Record one edge per referenced cell, ranges expanded
    fn link(&mut self, address: CellAddress, ast: &FormulaExpr) {
        let mut closing = None;

        ast.for_each_reference(&mut |precedent| {
            if closing.is_none() && self.graph.has_cycle(address, precedent) {
                closing = Some(precedent);
            }
            self.graph.add_dependency(address, precedent);
        });

        if let Some(precedent) = closing {
            warn!("{address} reading {precedent} creates a circular reference");
        }
    }

    /// Mark everything downstream of `address` as needing evaluation
    fn mark_dirty(&mut self, address: CellAddress) {
        for cell in self.graph.affected(&[address]) {
            if let Some(record) = self.cells.get_mut(&cell) {
                if record.ast.is_some() {
                    record.dirty = true;
                }
            }
        }
    }

    /// Evaluate every dirty cell and everything downstream of it
    ///
    /// Only needed in [`RecalcMode::Manual`]; in automatic mode writes leave no
    /// dirty cells behind except ones skipped on a cycle with cycle detection
    /// off.
    pub fn recalculate(&mut self) -> RecalcStats {
        let mut dirty: Vec<CellAddress> = self
            .cells
            .iter()
            .filter(|(_, record)| record.dirty)
            .map(|(&address, _)| address)
            .collect();

        if dirty.is_empty() {
            return RecalcStats::default();
        }

        dirty.sort_unstable();
        self.recalculate_from(&dirty)
    }

    fn recalculate_from(&mut self, changed: &[CellAddress]) -> RecalcStats {
        let order = self.graph.recalculation_order_many(changed);
        let mut stats = RecalcStats::default();

        for &address in &order {
            if self.evaluate_cell(address) {
                stats.cells_evaluated += 1;
            }
        }

        let affected = self.graph.affected(changed);
        if affected.len() > order.len() {
            if self.options.detect_cycles {
                stats.circular = self.mark_circular(&affected, &order);
            } else {
                debug!(
                    "{} cells on a cycle left unevaluated",
                    affected.len() - order.len()
                );
            }
        }

        debug!(
            "recalculated {} cells ({} circular)",
            stats.cells_evaluated, stats.circular
        );
        stats
    }

    /// Cache `#CYCLE!` in every affected cell the ordering left out
    fn mark_circular(&mut self, affected: &AHashSet<CellAddress>, order: &[CellAddress]) -> usize {
        let ordered: AHashSet<CellAddress> = order.iter().copied().collect();
        let mut circular: Vec<CellAddress> = affected.difference(&ordered).copied().collect();
        circular.sort_unstable();

        for address in &circular {
            if let Some(record) = self.cells.get_mut(address) {
                record.value = CellValue::Error(CellError::Circular);
                record.dirty = false;
            }
        }

        warn!(
            "circular reference: {}",
            circular
                .iter()
                .map(CellAddress::to_a1_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        circular.len()
    }

    /// Recompute and cache one cell; false for cells without a formula
    fn evaluate_cell(&mut self, address: CellAddress) -> bool {
        let Some(record) = self.cells.get(&address) else {
            return false;
        };
        let Some(ast) = &record.ast else {
            return false;
        };

        let value = CellStore::new(&self.cells, &self.registry).evaluate(address, ast);
        trace!("{address} => {value}");

        if let Some(record) = self.cells.get_mut(&address) {
            record.value = value;
            record.dirty = false;
        }
        true
    }

    /// Value of a cell; unset cells are `Empty`
    pub fn get_cell_value(&mut self, address: &str) -> Result<CellValue> {
        let address = CellAddress::parse(address)?;
        Ok(self.get_cell_value_at(address))
    }

    /// Value of a cell by address
    ///
    /// A dirty cell is brought up to date first, together with every dirty
    /// cell it reads from, and the results are cached.
    pub fn get_cell_value_at(&mut self, address: CellAddress) -> CellValue {
        let Some(record) = self.cells.get(&address) else {
            return CellValue::Empty;
        };
        if record.dirty {
            self.refresh(address);
        }

        self.cells
            .get(&address)
            .map(|record| record.value.clone())
            .unwrap_or_default()
    }

    /// Evaluate `address` and its dirty precedents, precedents first
    fn refresh(&mut self, address: CellAddress) {
        let stale = self.stale_precedents(address);
        let order = self.graph.topological_order(&stale);

        for &cell in &order {
            self.evaluate_cell(cell);
        }
        if order.len() < stale.len() {
            self.mark_circular(&stale, &order);
        }
        trace!("refreshed {} cells for {address}", order.len());
    }

    /// `address` and every dirty cell it reads from, directly or not
    fn stale_precedents(&self, address: CellAddress) -> AHashSet<CellAddress> {
        let mut stale = AHashSet::new();
        let mut stack = vec![address];

        while let Some(cell) = stack.pop() {
            let is_dirty = self.cells.get(&cell).is_some_and(|record| record.dirty);
            if is_dirty && stale.insert(cell) {
                stack.extend(self.graph.get_precedents(cell));
            }
        }

        stale
    }

    /// Display text of every cell that has been set, keyed by address
    pub fn get_all_cells(&mut self) -> BTreeMap<String, String> {
        let addresses: Vec<CellAddress> = self.cells.keys().copied().collect();

        addresses
            .into_iter()
            .map(|address| {
                let value = self.get_cell_value_at(address);
                (address.to_a1_string(), value.to_string())
            })
            .collect()
    }

    /// Text a cell was last set to
    pub fn formula(&self, address: &str) -> Result<Option<&str>> {
        let address = CellAddress::parse(address)?;
        Ok(self.cells.get(&address).map(|record| record.raw.as_str()))
    }

    /// Cells that `address` reads from, sorted
    pub fn precedents(&self, address: &str) -> Result<Vec<CellAddress>> {
        let address = CellAddress::parse(address)?;
        let mut cells: Vec<_> = self.graph.get_precedents(address).collect();
        cells.sort_unstable();
        Ok(cells)
    }

    /// Cells that read from `address`, sorted
    pub fn dependents(&self, address: &str) -> Result<Vec<CellAddress>> {
        let address = CellAddress::parse(address)?;
        let mut cells: Vec<_> = self.graph.get_dependents(address).collect();
        cells.sort_unstable();
        Ok(cells)
    }

    /// Number of cells that have been set
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compile_literals() {
        let record = CellRecord::compile("10");
        assert!(matches!(record.ast, Some(FormulaExpr::Number(n)) if n == 10.0));
        assert!(record.dirty);

        let record = CellRecord::compile("hello");
        assert!(matches!(record.ast, Some(FormulaExpr::String(ref s)) if s == "hello"));

        let record = CellRecord::compile("");
        assert!(matches!(record.ast, Some(FormulaExpr::String(ref s)) if s.is_empty()));
    }

    #[test]
    fn test_compile_parse_error() {
        let record = CellRecord::compile("=(");
        assert!(record.ast.is_none());
        assert!(!record.dirty);
        assert!(matches!(
            record.value,
            CellValue::Error(CellError::Message(ref m)) if !m.is_empty()
        ));
    }

    #[test]
    fn test_store_detects_reentry() {
        let mut cells = AHashMap::new();
        let a1 = CellAddress::new(0, 0);
        cells.insert(
            a1,
            CellRecord {
                raw: "=A1".into(),
                ast: Some(FormulaExpr::CellRef(a1)),
                value: CellValue::Empty,
                dirty: true,
            },
        );

        let registry = FunctionRegistry::new();
        let store = CellStore::new(&cells, &registry);
        assert_eq!(
            store.evaluate(a1, &FormulaExpr::CellRef(a1)),
            CellValue::Error(CellError::Circular)
        );
    }

    #[test]
    fn test_manual_mode_defers_work() {
        let mut engine = Engine::with_options(EngineOptions {
            recalc_mode: RecalcMode::Manual,
            ..Default::default()
        });

        engine.set_cell_at(CellAddress::new(0, 0), "1");
        engine.set_cell_at(CellAddress::new(1, 0), "=A1*2");
        assert!(engine.cells.values().all(|record| record.dirty));

        let stats = engine.recalculate();
        assert_eq!(stats.cells_evaluated, 2);
        assert!(engine.cells.values().all(|record| !record.dirty));
        assert_eq!(engine.recalculate(), RecalcStats::default());
    }
}
