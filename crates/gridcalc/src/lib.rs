//! # gridcalc
//!
//! A reactive spreadsheet grid. Every cell holds an expression in a small
//! typed language; writing a cell re-evaluates everything that depends on it.
//!
//! ## Features
//!
//! - Fourteen value kinds (sized integers, floats, complex numbers, strings,
//!   booleans) with strict typing and explicit conversions
//! - Dependency edges discovered from the references actually made during
//!   evaluation, so short-circuited branches add none
//! - Atomic updates: a failed write, cycle or out-of-range reference leaves
//!   the grid exactly as it was
//! - User functions registered per grid from plain Rust closures
//! - JSON snapshots for saving and restoring a grid
//!
//! ## Example
//!
//! ```rust
//! use gridcalc::prelude::*;
//!
//! let mut grid = Grid::with_options(GridOptions::new(4, 4));
//! grid.register("Half", |x: f64| x / 2.0).unwrap();
//!
//! grid.set("A0", "float64(7)").unwrap();
//! grid.set("B0", "Half(A0) + 0.5").unwrap();
//! assert_eq!(grid.value(CellAddress::new(1, 0)), Value::Float64(4.0));
//!
//! let err = grid.set("A0", "B0").unwrap_err();
//! assert!(matches!(
//!     err.formula_error(),
//!     Some(FormulaError::CircularReference { .. })
//! ));
//! ```

pub mod cell;
pub mod error;
pub mod grid;
pub mod options;
pub mod prelude;
pub mod scope;
pub mod snapshot;
pub mod transaction;

pub use cell::Cell;
pub use error::{GridError, GridResult};
pub use grid::Grid;
pub use options::GridOptions;
pub use scope::KEYWORDS;
pub use snapshot::{CellSnapshot, GridSnapshot};
pub use transaction::RecalcStats;

// Re-export core types
pub use gridcalc_core::{Axis, CellAddress, Error as CoreError, Extent, WIRE_PREFIX};

// Re-export formula types
pub use gridcalc_formula::{
    evaluate, parse, CallContext, EmptyScope, Expr, FormulaError, FormulaResult,
    FunctionRegistry, Scope, Value, ValueKind,
};
