//! Grid error types

use gridcalc_core::CellAddress;
use gridcalc_formula::FormulaError;
use thiserror::Error;

/// Result type for grid operations
pub type GridResult<T> = std::result::Result<T, GridError>;

/// Errors returned by grid operations
///
/// A failing operation never leaves the grid partially updated.
#[derive(Debug, Error)]
pub enum GridError {
    /// Parsing or evaluating the expression of `address` failed
    #[error("{address}: {source}")]
    Cell {
        address: CellAddress,
        #[source]
        source: FormulaError,
    },

    /// Bad coordinate text or a coordinate outside the grid
    #[error(transparent)]
    Core(#[from] gridcalc_core::Error),

    #[error("function registration failed: {0}")]
    Registration(#[source] FormulaError),

    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl GridError {
    /// The formula-level error, when there is one
    pub fn formula_error(&self) -> Option<&FormulaError> {
        match self {
            GridError::Cell { source, .. } | GridError::Registration(source) => Some(source),
            _ => None,
        }
    }

    /// The coordinate of the cell that failed, when the error is about one
    pub fn address(&self) -> Option<CellAddress> {
        match self {
            GridError::Cell { address, .. } => Some(*address),
            _ => None,
        }
    }
}
