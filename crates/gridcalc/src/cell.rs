//! Grid cells

use gridcalc_core::CellAddress;
use gridcalc_formula::{Expr, Value};
use std::collections::BTreeSet;

/// One addressable grid entry
///
/// Dependency edges are stored on both ends as coordinate sets: `observing`
/// holds the cells this one referenced during its last evaluation, and
/// `observers` the cells whose last evaluation referenced this one.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    address: CellAddress,
    pub(crate) input: String,
    pub(crate) expression: Option<Expr>,
    pub(crate) value: Option<Value>,
    pub(crate) error: Option<String>,
    pub(crate) observing: BTreeSet<CellAddress>,
    pub(crate) observers: BTreeSet<CellAddress>,
}

impl Cell {
    pub(crate) fn new(address: CellAddress) -> Self {
        Self {
            address,
            input: String::new(),
            expression: None,
            value: None,
            error: None,
            observing: BTreeSet::new(),
            observers: BTreeSet::new(),
        }
    }

    pub fn address(&self) -> CellAddress {
        self.address
    }

    /// Raw text last written to the cell
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn expression(&self) -> Option<&Expr> {
        self.expression.as_ref()
    }

    /// Canonical text of the expression, or the raw input when there is no
    /// parsed expression
    pub fn expression_text(&self) -> String {
        match &self.expression {
            Some(expr) => expr.to_string(),
            None => self.input.clone(),
        }
    }

    pub fn has_expression(&self) -> bool {
        self.expression.is_some()
    }

    /// Committed value, or the default `int64 0` for a cell never evaluated
    pub fn value(&self) -> Value {
        self.value.clone().unwrap_or_default()
    }

    /// Committed value, `None` if the cell has never been evaluated
    pub fn computed_value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    /// Message of the last failed write to this cell
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Cells referenced during this cell's last evaluation
    pub fn observing(&self) -> impl Iterator<Item = CellAddress> + '_ {
        self.observing.iter().copied()
    }

    /// Cells whose last evaluation referenced this cell
    pub fn observers(&self) -> impl Iterator<Item = CellAddress> + '_ {
        self.observers.iter().copied()
    }
}
