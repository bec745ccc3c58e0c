//! Dependency tracking for formula calculation

use ahash::{AHashMap, AHashSet};
use gridcalc_core::CellAddress;
use std::collections::VecDeque;

/// Dependency graph between cells
///
/// Tracks which cells read from which other cells so that a change can be
/// pushed to exactly the cells it affects. Both directions are stored and are
/// always exact mirrors of each other.
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// Cell → Cells that read from it (dependents)
    dependents: AHashMap<CellAddress, AHashSet<CellAddress>>,
    /// Cell → Cells it reads from (precedents)
    precedents: AHashMap<CellAddress, AHashSet<CellAddress>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency: `dependent` reads from `precedent`
    pub fn add_dependency(&mut self, dependent: CellAddress, precedent: CellAddress) {
        self.dependents
            .entry(precedent)
            .or_default()
            .insert(dependent);
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Remove every edge from `dependent` to the cells it reads
    ///
    /// Edges from cells that read `dependent` are kept; they belong to those
    /// cells' formulas.
    pub fn remove_dependencies(&mut self, dependent: CellAddress) {
        let Some(precedents) = self.precedents.remove(&dependent) else {
            return;
        };

        for precedent in precedents {
            if let Some(deps) = self.dependents.get_mut(&precedent) {
                deps.remove(&dependent);
                if deps.is_empty() {
                    self.dependents.remove(&precedent);
                }
            }
        }
    }

    /// Get cells that read from the given cell
    pub fn get_dependents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.dependents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Get cells that the given cell reads from
    pub fn get_precedents(&self, cell: CellAddress) -> impl Iterator<Item = CellAddress> + '_ {
        self.precedents
            .get(&cell)
            .into_iter()
            .flat_map(|set| set.iter().copied())
    }

    /// Dependents of `cell`, sorted
    fn sorted_dependents(&self, cell: CellAddress) -> Vec<CellAddress> {
        let mut cells: Vec<_> = self.get_dependents(cell).collect();
        cells.sort_unstable();
        cells
    }

    /// Every cell a change to `changed` can reach, the changed cells included
    pub fn affected(&self, changed: &[CellAddress]) -> AHashSet<CellAddress> {
        let mut affected: AHashSet<CellAddress> = changed.iter().copied().collect();
        let mut queue: VecDeque<CellAddress> = changed.iter().copied().collect();

        while let Some(cell) = queue.pop_front() {
            for dependent in self.get_dependents(cell) {
                if affected.insert(dependent) {
                    queue.push_back(dependent);
                }
            }
        }

        affected
    }

    /// Cells to recalculate after `changed` changes, precedents first
    pub fn recalculation_order(&self, changed: CellAddress) -> Vec<CellAddress> {
        self.recalculation_order_many(&[changed])
    }

    /// Cells to recalculate after all of `changed` change, precedents first
    ///
    /// Uses Kahn's algorithm over the affected cells. Cells on a cycle never
    /// become ready and are left out of the order. Ties are broken by address
    /// so the order is deterministic.
    pub fn recalculation_order_many(&self, changed: &[CellAddress]) -> Vec<CellAddress> {
        self.topological_order(&self.affected(changed))
    }

    /// Order `cells` so that every cell comes after the members of `cells`
    /// it reads from
    ///
    /// Edges leaving the set are ignored. Cells on a cycle, and cells that
    /// read from one, are left out.
    pub fn topological_order(&self, cells: &AHashSet<CellAddress>) -> Vec<CellAddress> {
        // In-degree counts only edges inside the set
        let mut in_degree: AHashMap<CellAddress, usize> = cells
            .iter()
            .map(|&cell| {
                let degree = self
                    .get_precedents(cell)
                    .filter(|p| cells.contains(p))
                    .count();
                (cell, degree)
            })
            .collect();

        let mut ready: Vec<CellAddress> = in_degree
            .iter()
            .filter(|&(_, &degree)| degree == 0)
            .map(|(&cell, _)| cell)
            .collect();
        ready.sort_unstable();

        let mut queue: VecDeque<CellAddress> = ready.into();
        let mut order = Vec::with_capacity(cells.len());

        while let Some(cell) = queue.pop_front() {
            order.push(cell);

            for dependent in self.sorted_dependents(cell) {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }

        order
    }

    /// Check whether `start` is reachable from `end` through precedents
    ///
    /// Before adding an edge "`start` reads `end`", a true result means the
    /// edge would close a cycle. A cell reading itself counts.
    pub fn has_cycle(&self, start: CellAddress, end: CellAddress) -> bool {
        let mut visited = AHashSet::new();
        let mut queue = VecDeque::from([end]);

        while let Some(cell) = queue.pop_front() {
            if cell == start {
                return true;
            }
            if !visited.insert(cell) {
                continue;
            }
            queue.extend(self.get_precedents(cell));
        }

        false
    }

    /// Whether `cell` has any edges in either direction
    pub fn contains(&self, cell: CellAddress) -> bool {
        self.dependents.contains_key(&cell) || self.precedents.contains_key(&cell)
    }

    /// True when no edges are recorded
    pub fn is_empty(&self) -> bool {
        self.precedents.is_empty()
    }

    /// Clear the entire graph
    pub fn clear(&mut self) {
        self.dependents.clear();
        self.precedents.clear();
    }
}
