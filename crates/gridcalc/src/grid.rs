//! The grid: cell store, dependency graph and atomic updates
//!
//! # Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut grid = Grid::new();
//! grid.set("A0", "100").unwrap();
//! grid.set("A1", "A0 * 2").unwrap();
//! grid.set("A0", "20").unwrap();
//! assert_eq!(grid.value(CellAddress::new(0, 1)), Value::Int64(40));
//!
//! // Cycles are rejected and leave the grid untouched
//! assert!(grid.set("A0", "A1").is_err());
//! assert_eq!(grid.value(CellAddress::new(0, 0)), Value::Int64(20));
//! ```

use crate::cell::Cell;
use crate::error::{GridError, GridResult};
use crate::options::GridOptions;
use crate::transaction::{RecalcStats, Transaction};
use ahash::AHashMap;
use gridcalc_core::{CellAddress, Extent};
use gridcalc_formula::{
    parse, Expr, FormulaResult, FunctionRegistry, IntoContextFunction, IntoFunction, Value,
};
use tracing::{debug, warn};

/// A grid of cells with reactive recomputation
///
/// The grid holds no lock. Callers that share it between threads must
/// serialize mutation themselves.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    options: GridOptions,
    cells: AHashMap<CellAddress, Cell>,
    functions: FunctionRegistry,
}

impl Grid {
    /// Create an empty 10x10 grid with only the conversion callees
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: GridOptions) -> Self {
        Self::with_registry(options, FunctionRegistry::new())
    }

    /// Create a grid that owns `functions`
    pub fn with_registry(options: GridOptions, functions: FunctionRegistry) -> Self {
        Self {
            options,
            cells: AHashMap::new(),
            functions,
        }
    }

    pub fn options(&self) -> GridOptions {
        self.options
    }

    pub fn extent(&self) -> Extent {
        self.options.extent()
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Register a function on this grid's registry
    pub fn register<Args, F>(&mut self, name: &str, func: F) -> GridResult<()>
    where
        F: IntoFunction<Args>,
    {
        self.functions
            .register(name, func)
            .map_err(GridError::Registration)
    }

    /// Register a function that receives the evaluating cell's context
    pub fn register_with_context<Args, F>(&mut self, name: &str, func: F) -> GridResult<()>
    where
        F: IntoContextFunction<Args>,
    {
        self.functions
            .register_with_context(name, func)
            .map_err(GridError::Registration)
    }

    // === Reading ===

    pub fn cell(&self, address: CellAddress) -> Option<&Cell> {
        self.cells.get(&address)
    }

    /// Committed value of a cell, the default `int64 0` if it has none
    pub fn value(&self, address: CellAddress) -> Value {
        self.cell(address).map(Cell::value).unwrap_or_default()
    }

    /// All cells, ordered by column then row
    pub fn cells(&self) -> Vec<&Cell> {
        let mut cells: Vec<&Cell> = self.cells.values().collect();
        cells.sort_unstable_by_key(|c| c.address());
        cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    // === Writing ===

    /// [`Grid::update`] with a textual coordinate (`B2` or `cell-B2`)
    pub fn set(&mut self, coordinate: &str, text: &str) -> GridResult<Value> {
        let address = CellAddress::parse_wire(coordinate)?;
        self.update(address, text)
    }

    /// Write an expression to a cell and recompute everything that observes it
    ///
    /// Empty text clears the expression. On failure nothing but the cell's
    /// last error changes: the cell keeps its previous expression and value,
    /// and every observer that had already been recomputed is reverted.
    ///
    /// Only the written cell and its transitive observers are evaluated.
    /// Cells the new expression references keep their committed values, so
    /// the cost of a write does not grow with the length of the chain feeding
    /// it. Evaluation moves to a growable stack, so long chains of observers
    /// do not overflow the calling thread's stack.
    pub fn update(&mut self, address: CellAddress, text: &str) -> GridResult<Value> {
        self.extent().check(&address)?;
        debug!(%address, text, "updating cell");

        let expression = match parse_input(text) {
            Ok(expression) => expression,
            Err(source) => {
                let err = GridError::Cell { address, source };
                self.record_error(address, err.to_string());
                return Err(err);
            }
        };

        let mut tx = Transaction::new(&mut self.cells, &self.functions, self.options.extent());
        tx.assign(address, text, expression);
        let outcome = propagate(&mut tx, address);

        match outcome {
            Ok(value) => {
                let stats = tx.commit();
                debug!(%address, %value, cells = stats.cells_calculated, "update committed");
                Ok(value)
            }
            Err(err) => {
                tx.rollback();
                warn!(%address, error = %err, "update rejected");
                self.record_error(address, err.to_string());
                Err(err)
            }
        }
    }

    /// Apply several assignments as one transaction
    ///
    /// All expressions are parsed first, then the whole grid is recomputed
    /// once. If any cell fails the grid is left exactly as it was and no
    /// cell's last error is touched.
    pub fn apply<I, S>(&mut self, assignments: I) -> GridResult<RecalcStats>
    where
        I: IntoIterator<Item = (CellAddress, S)>,
        S: AsRef<str>,
    {
        let mut staged = Vec::new();
        for (address, text) in assignments {
            let text = text.as_ref();
            self.extent().check(&address)?;
            let expression =
                parse_input(text).map_err(|source| GridError::Cell { address, source })?;
            staged.push((address, text.to_string(), expression));
        }
        debug!(cells = staged.len(), "applying batch");

        let mut tx = Transaction::new(&mut self.cells, &self.functions, self.options.extent());
        for (address, text, expression) in staged {
            tx.assign(address, &text, expression);
        }
        finish(tx)
    }

    /// Re-evaluate every cell, rebuilding all dependency edges
    pub fn recalculate(&mut self) -> GridResult<RecalcStats> {
        debug!(cells = self.cells.len(), "recalculating grid");
        let tx = Transaction::new(&mut self.cells, &self.functions, self.options.extent());
        finish(tx)
    }

    fn record_error(&mut self, address: CellAddress, message: String) {
        self.cells
            .entry(address)
            .or_insert_with(|| Cell::new(address))
            .error = Some(message);
    }
}

/// Blank text means "no expression"
fn parse_input(text: &str) -> FormulaResult<Option<Expr>> {
    if text.trim().is_empty() {
        Ok(None)
    } else {
        parse(text).map(Some)
    }
}

/// Evaluate `root`, then every cell that transitively observes it
///
/// Any other cell keeps its committed value.
fn propagate(tx: &mut Transaction<'_>, root: CellAddress) -> GridResult<Value> {
    let observers = tx.collect_observers(root);
    tx.reuse_committed_except(observers.iter().copied().chain([root]));

    let value = tx
        .evaluate_cell(root)
        .map_err(|source| GridError::Cell {
            address: root,
            source,
        })?;

    if !observers.is_empty() {
        debug!(%root, observers = observers.len(), "recomputing observers");
    }
    for address in observers {
        tx.evaluate_cell(address)
            .map_err(|source| GridError::Cell { address, source })?;
    }

    Ok(value)
}

/// Recompute the whole store and commit, or roll back on the first failure
fn finish(mut tx: Transaction<'_>) -> GridResult<RecalcStats> {
    match tx.recalculate_all() {
        Ok(()) => {
            let stats = tx.commit();
            debug!(?stats, "recalculation committed");
            Ok(stats)
        }
        Err((address, source)) => {
            tx.rollback();
            warn!(%address, error = %source, "recalculation rejected");
            Err(GridError::Cell { address, source })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridcalc_formula::{CallContext, FormulaError};
    use pretty_assertions::assert_eq;

    fn addr(s: &str) -> CellAddress {
        CellAddress::parse(s).unwrap()
    }

    #[test]
    fn test_empty_text_clears_expression() {
        let mut grid = Grid::new();
        grid.set("A0", "5").unwrap();
        grid.set("A1", "A0 + 1").unwrap();
        assert_eq!(grid.value(addr("A1")), Value::Int64(6));

        grid.set("A0", "  ").unwrap();
        let a0 = grid.cell(addr("A0")).unwrap();
        assert!(!a0.has_expression());
        assert_eq!(a0.value(), Value::Int64(0));
        assert_eq!(grid.value(addr("A1")), Value::Int64(1));
    }

    #[test]
    fn test_parse_error_keeps_edges_and_value() {
        let mut grid = Grid::new();
        grid.set("A0", "1").unwrap();
        grid.set("B0", "A0 + 1").unwrap();

        let err = grid.set("B0", "A0 +").unwrap_err();
        assert!(matches!(
            err.formula_error(),
            Some(FormulaError::Parse { .. })
        ));

        let b0 = grid.cell(addr("B0")).unwrap();
        assert_eq!(b0.expression_text(), "A0 + 1");
        assert_eq!(b0.value(), Value::Int64(2));
        assert!(b0.error().unwrap().contains("missing right-hand side"));
        assert_eq!(b0.observing().collect::<Vec<_>>(), vec![addr("A0")]);
    }

    #[test]
    fn test_successful_write_clears_error() {
        let mut grid = Grid::new();
        assert!(grid.set("A0", "nope").is_err());
        assert!(grid.cell(addr("A0")).unwrap().error().is_some());

        grid.set("A0", "3").unwrap();
        assert_eq!(grid.cell(addr("A0")).unwrap().error(), None);
    }

    #[test]
    fn test_keywords() {
        let mut grid = Grid::with_options(GridOptions::new(4, 6));
        grid.set("C2", "COLUMN * 10 + ROW").unwrap();
        grid.set("A0", "MAX_COLUMN * 10 + MAX_ROW").unwrap();
        grid.set("B1", "MIN_ROW + MIN_COLUMN + iota").unwrap();

        assert_eq!(grid.value(addr("C2")), Value::Int64(22));
        assert_eq!(grid.value(addr("A0")), Value::Int64(35));
        assert_eq!(grid.value(addr("B1")), Value::Int64(1));
    }

    #[test]
    fn test_cell_call_records_edges() {
        let mut grid = Grid::new();
        grid.set("B3", "7").unwrap();
        grid.set("A0", "cell(1, 3) * 2").unwrap();
        assert_eq!(grid.value(addr("A0")), Value::Int64(14));

        grid.set("B3", "8").unwrap();
        assert_eq!(grid.value(addr("A0")), Value::Int64(16));
        assert_eq!(
            grid.cell(addr("B3")).unwrap().observers().collect::<Vec<_>>(),
            vec![addr("A0")]
        );
    }

    #[test]
    fn test_edges_follow_the_new_expression() {
        let mut grid = Grid::new();
        grid.set("C0", "A0").unwrap();
        grid.set("C0", "B0").unwrap();

        assert_eq!(grid.cell(addr("A0")).unwrap().observers().count(), 0);
        assert_eq!(
            grid.cell(addr("B0")).unwrap().observers().collect::<Vec<_>>(),
            vec![addr("C0")]
        );
    }

    #[test]
    fn test_registered_functions_see_the_cell() {
        let mut grid = Grid::with_options(GridOptions::new(3, 3));
        grid.register_with_context("Here", |ctx: &CallContext| {
            format!("{},{} of {}x{}", ctx.column, ctx.row, ctx.columns, ctx.rows)
        })
        .unwrap();
        grid.set("B2", "Here()").unwrap();
        assert_eq!(grid.value(addr("B2")), Value::String("1,2 of 3x3".into()));
    }

    #[test]
    fn test_recalculate_counts() {
        let mut grid = Grid::new();
        grid.set("A0", "1").unwrap();
        grid.set("A1", "A0 + 1").unwrap();
        let stats = grid.recalculate().unwrap();
        assert_eq!(stats.formula_count, 2);
        assert_eq!(stats.cells_calculated, 2);
    }

    #[test]
    fn test_cells_are_sorted_column_major() {
        let mut grid = Grid::new();
        grid.set("B0", "1").unwrap();
        grid.set("A5", "2").unwrap();
        grid.set("A1", "3").unwrap();

        let order: Vec<String> = grid.cells().iter().map(|c| c.address().to_string()).collect();
        assert_eq!(order, vec!["A1", "A5", "B0"]);
    }
}
