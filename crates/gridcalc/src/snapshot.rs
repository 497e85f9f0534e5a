//! Grid snapshot import/export
//!
//! The JSON shape is
//! `{"columns": 10, "rows": 10, "cells": [{"id": "B1", "ex": "A0 + 1"}]}`.
//! Only cells holding a parsed expression are exported. Import runs a full
//! recalculation and rejects the whole snapshot if any cell fails.

use crate::error::{GridError, GridResult};
use crate::grid::Grid;
use crate::options::GridOptions;
use crate::transaction::RecalcStats;
use gridcalc_core::CellAddress;
use gridcalc_formula::FunctionRegistry;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Serializable grid contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub columns: u32,
    pub rows: u32,
    #[serde(default)]
    pub cells: Vec<CellSnapshot>,
}

/// One exported cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    /// Coordinate text, optionally with the `cell-` prefix
    pub id: String,
    /// Expression text
    pub ex: String,
}

impl GridSnapshot {
    pub fn options(&self) -> GridOptions {
        GridOptions::new(self.columns, self.rows)
    }

    pub fn from_json(json: &str) -> GridResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> GridResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode every cell id
    fn assignments(&self) -> GridResult<Vec<(CellAddress, &str)>> {
        self.cells
            .iter()
            .map(|cell| Ok((CellAddress::parse_wire(&cell.id)?, cell.ex.as_str())))
            .collect()
    }
}

impl Grid {
    /// Export every cell that holds an expression, in coordinate order
    pub fn snapshot(&self) -> GridSnapshot {
        let options = self.options();
        GridSnapshot {
            columns: options.columns,
            rows: options.rows,
            cells: self
                .cells()
                .into_iter()
                .filter_map(|cell| {
                    cell.expression().map(|expr| CellSnapshot {
                        id: cell.address().to_string(),
                        ex: expr.to_string(),
                    })
                })
                .collect(),
        }
    }

    /// Build a grid from a snapshot, owning `functions`
    pub fn from_snapshot(snapshot: &GridSnapshot, functions: FunctionRegistry) -> GridResult<Self> {
        build(snapshot, functions).map(|(grid, _)| grid)
    }

    /// Replace the whole grid with a snapshot, keeping this grid's functions
    ///
    /// On failure the grid is left unchanged.
    pub fn load_snapshot(&mut self, snapshot: &GridSnapshot) -> GridResult<RecalcStats> {
        let (next, stats) = build(snapshot, self.functions().clone())?;
        *self = next;
        Ok(stats)
    }

    /// Read a JSON snapshot file
    pub fn load_path<P: AsRef<Path>>(path: P, functions: FunctionRegistry) -> GridResult<Self> {
        let reader = BufReader::new(File::open(path.as_ref())?);
        let snapshot: GridSnapshot = serde_json::from_reader(reader).map_err(GridError::from)?;
        Self::from_snapshot(&snapshot, functions)
    }

    /// Write the grid as a JSON snapshot file
    pub fn save_path<P: AsRef<Path>>(&self, path: P) -> GridResult<()> {
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(&mut writer, &self.snapshot())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

fn build(snapshot: &GridSnapshot, functions: FunctionRegistry) -> GridResult<(Grid, RecalcStats)> {
    let assignments = snapshot.assignments()?;
    debug!(
        columns = snapshot.columns,
        rows = snapshot.rows,
        cells = assignments.len(),
        "loading snapshot"
    );

    let mut grid = Grid::with_registry(snapshot.options(), functions);
    let stats = grid.apply(assignments)?;
    Ok((grid, stats))
}
