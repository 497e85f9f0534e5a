//! Identifier resolution against the grid

use crate::transaction::Transaction;
use gridcalc_core::CellAddress;
use gridcalc_formula::{CallContext, FormulaError, FormulaResult, Scope, Value};
use tracing::trace;

/// Context keywords understood by every grid expression
pub const KEYWORDS: [&str; 7] = [
    "ROW",
    "COLUMN",
    "MIN_ROW",
    "MIN_COLUMN",
    "MAX_ROW",
    "MAX_COLUMN",
    "iota",
];

/// Scope of the cell currently being evaluated
///
/// Keywords come first, then coordinates. Any other identifier is unknown.
pub(crate) struct GridScope<'t, 'g> {
    tx: &'t mut Transaction<'g>,
    current: CellAddress,
}

impl<'t, 'g> GridScope<'t, 'g> {
    pub(crate) fn new(tx: &'t mut Transaction<'g>, current: CellAddress) -> Self {
        Self { tx, current }
    }

    fn keyword(&self, name: &str) -> Option<Value> {
        let extent = self.tx.extent();
        let index = match name {
            "ROW" | "iota" => self.current.row,
            "COLUMN" => self.current.column,
            "MIN_ROW" | "MIN_COLUMN" => 0,
            "MAX_ROW" => extent.max_row(),
            "MAX_COLUMN" => extent.max_column(),
            _ => return None,
        };
        Some(Value::Int64(index as i64))
    }
}

impl Scope for GridScope<'_, '_> {
    fn resolve(&mut self, name: &str) -> FormulaResult<Value> {
        if let Some(value) = self.keyword(name) {
            return Ok(value);
        }
        if CellAddress::is_address(name) {
            let address = CellAddress::parse(name)?;
            return self.resolve_cell(address);
        }
        Err(FormulaError::UnknownIdentifier(name.to_string()))
    }

    fn resolve_cell(&mut self, address: CellAddress) -> FormulaResult<Value> {
        self.tx.extent().check(&address)?;
        trace!(from = %self.current, to = %address, "resolving reference");
        self.tx.attach(address, self.current);
        self.tx.evaluate_cell(address)
    }

    fn context(&self) -> CallContext {
        let extent = self.tx.extent();
        CallContext {
            column: self.current.column,
            row: self.current.row,
            columns: extent.columns,
            rows: extent.rows,
        }
    }
}
