//! Evaluation pass over the cell store
//!
//! Every mutation made while evaluating goes through [`Transaction::touch`],
//! which journals the first-seen state of each cell. Dropping the journal
//! commits; replaying it rolls the store back to exactly the state it had
//! before the transaction began.
//!
//! A pass either re-evaluates every cell it reaches or, once
//! [`Transaction::reuse_committed_except`] has named the cells a write can
//! affect, takes the committed value of every other cell as it stands.

use crate::cell::Cell;
use crate::scope::GridScope;
use ahash::{AHashMap, AHashSet};
use gridcalc_core::{CellAddress, Extent};
use gridcalc_formula::{evaluate, Expr, FormulaError, FormulaResult, FunctionRegistry, Value};
use std::collections::VecDeque;
use tracing::{trace, warn};

/// Counters reported by a committed evaluation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecalcStats {
    /// Cells holding an expression after the pass
    pub formula_count: usize,
    /// Cells evaluated during the pass
    pub cells_calculated: usize,
}

pub(crate) struct Transaction<'g> {
    cells: &'g mut AHashMap<CellAddress, Cell>,
    functions: &'g FunctionRegistry,
    extent: Extent,
    /// Original state of every touched cell, `None` if it did not exist
    journal: AHashMap<CellAddress, Option<Cell>>,
    /// Values settled during this pass
    computed: AHashMap<CellAddress, Value>,
    /// Cells currently being evaluated, outermost first
    chain: Vec<CellAddress>,
    /// Cells whose committed value is out of date, `None` if all of them are
    stale: Option<AHashSet<CellAddress>>,
    evaluated: usize,
}

impl<'g> Transaction<'g> {
    pub(crate) fn new(
        cells: &'g mut AHashMap<CellAddress, Cell>,
        functions: &'g FunctionRegistry,
        extent: Extent,
    ) -> Self {
        Self {
            cells,
            functions,
            extent,
            journal: AHashMap::new(),
            computed: AHashMap::new(),
            chain: Vec::new(),
            stale: None,
            evaluated: 0,
        }
    }

    pub(crate) fn extent(&self) -> Extent {
        self.extent
    }

    /// Mutable access to a cell, creating it if needed and journaling its
    /// original state on first touch
    fn touch(&mut self, address: CellAddress) -> &mut Cell {
        let cells = &mut *self.cells;
        self.journal
            .entry(address)
            .or_insert_with(|| cells.get(&address).cloned());
        cells
            .entry(address)
            .or_insert_with(|| Cell::new(address))
    }

    /// Stage a new expression for `address`
    pub(crate) fn assign(&mut self, address: CellAddress, input: &str, expression: Option<Expr>) {
        let cell = self.touch(address);
        cell.input = input.to_string();
        cell.expression = expression;
        cell.error = None;
    }

    /// Record that `observer` referenced `target`
    pub(crate) fn attach(&mut self, target: CellAddress, observer: CellAddress) {
        self.touch(target).observers.insert(observer);
        self.touch(observer).observing.insert(target);
    }

    /// Drop every edge from `address` to the cells it referenced
    fn detach(&mut self, address: CellAddress) {
        let observing = std::mem::take(&mut self.touch(address).observing);
        for target in observing {
            self.touch(target).observers.remove(&address);
        }
    }

    /// Trust the committed value of every cell not in `stale`
    ///
    /// `stale` must hold every assigned cell and everything that transitively
    /// observes one. A cycle through an assigned cell is still found, because
    /// every cell on it observes that cell.
    pub(crate) fn reuse_committed_except<I>(&mut self, stale: I)
    where
        I: IntoIterator<Item = CellAddress>,
    {
        self.stale = Some(stale.into_iter().collect());
    }

    fn committed(&self, address: CellAddress) -> Option<Value> {
        let stale = self.stale.as_ref()?;
        if stale.contains(&address) {
            return None;
        }
        self.cells.get(&address)?.value.clone()
    }

    /// Evaluate a cell once per pass
    ///
    /// A cell that is reached again while it is still on the evaluation chain
    /// closes a cycle and fails with [`FormulaError::CircularReference`].
    pub(crate) fn evaluate_cell(&mut self, address: CellAddress) -> FormulaResult<Value> {
        if self.chain.contains(&address) {
            return Err(FormulaError::CircularReference { address });
        }
        if let Some(value) = self.computed.get(&address) {
            return Ok(value.clone());
        }
        if let Some(value) = self.committed(address) {
            self.computed.insert(address, value.clone());
            return Ok(value);
        }

        self.detach(address);
        let expression = self.touch(address).expression.clone();

        self.chain.push(address);
        let functions = self.functions;
        let result = match &expression {
            Some(expr) => evaluate(expr, functions, &mut GridScope::new(self, address)),
            None => Ok(Value::default()),
        };
        self.chain.pop();

        let value = result?;
        trace!(%address, %value, "evaluated cell");
        self.evaluated += 1;
        self.touch(address).value = Some(value.clone());
        self.computed.insert(address, value.clone());
        Ok(value)
    }

    /// Every direct and transitive observer of `root`, in breadth order
    pub(crate) fn collect_observers(&self, root: CellAddress) -> Vec<CellAddress> {
        let mut seen = AHashSet::new();
        let mut queue = VecDeque::from([root]);
        let mut order = Vec::new();
        seen.insert(root);

        while let Some(address) = queue.pop_front() {
            let Some(cell) = self.cells.get(&address) else {
                continue;
            };
            for observer in cell.observers.iter().copied() {
                if seen.insert(observer) {
                    order.push(observer);
                    queue.push_back(observer);
                }
            }
        }

        order
    }

    /// Evaluate every cell in coordinate order, rebuilding all edges
    pub(crate) fn recalculate_all(&mut self) -> Result<(), (CellAddress, FormulaError)> {
        let mut addresses: Vec<CellAddress> = self.cells.keys().copied().collect();
        addresses.sort_unstable();

        for address in addresses {
            self.evaluate_cell(address).map_err(|e| (address, e))?;
        }
        Ok(())
    }

    pub(crate) fn commit(self) -> RecalcStats {
        trace!(touched = self.journal.len(), "committing transaction");
        RecalcStats {
            formula_count: self.cells.values().filter(|c| c.has_expression()).count(),
            cells_calculated: self.evaluated,
        }
    }

    pub(crate) fn rollback(self) {
        warn!(touched = self.journal.len(), "rolling back transaction");
        for (address, original) in self.journal {
            match original {
                Some(cell) => {
                    self.cells.insert(address, cell);
                }
                None => {
                    self.cells.remove(&address);
                }
            }
        }
    }
}
