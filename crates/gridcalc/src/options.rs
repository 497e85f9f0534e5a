//! Grid configuration

use gridcalc_core::Extent;
use serde::{Deserialize, Serialize};

/// Options for creating a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridOptions {
    /// Number of columns (default: 10)
    pub columns: u32,
    /// Number of rows (default: 10)
    pub rows: u32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            columns: 10,
            rows: 10,
        }
    }
}

impl GridOptions {
    pub fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    pub fn extent(&self) -> Extent {
        Extent::new(self.columns, self.rows)
    }
}

impl From<Extent> for GridOptions {
    fn from(extent: Extent) -> Self {
        Self::new(extent.columns, extent.rows)
    }
}
