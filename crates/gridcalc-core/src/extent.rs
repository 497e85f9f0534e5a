//! Grid bounds

use crate::address::{Axis, CellAddress};
use crate::error::{Error, Result};

/// The column and row counts of a grid
///
/// Valid coordinates satisfy `column < columns` and `row < rows`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Extent {
    pub columns: u32,
    pub rows: u32,
}

impl Extent {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Whether `addr` lies inside the grid
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.column < self.columns && addr.row < self.rows
    }

    /// Check `addr` against the bounds, naming the first axis that is out of range
    pub fn check(&self, addr: &CellAddress) -> Result<()> {
        if addr.column >= self.columns {
            return Err(Error::OutOfBounds {
                axis: Axis::Column,
                index: addr.column,
                limit: self.columns,
            });
        }
        if addr.row >= self.rows {
            return Err(Error::OutOfBounds {
                axis: Axis::Row,
                index: addr.row,
                limit: self.rows,
            });
        }
        Ok(())
    }

    /// Largest valid row index (`rows - 1`), saturating at zero for an empty grid
    pub fn max_row(&self) -> u32 {
        self.rows.saturating_sub(1)
    }

    /// Largest valid column index (`columns - 1`), saturating at zero for an empty grid
    pub fn max_column(&self) -> u32 {
        self.columns.saturating_sub(1)
    }

    /// Number of addressable cells
    pub fn cell_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }
}
