//! # gridcalc-core
//!
//! Core data structures shared by the gridcalc crates:
//! - [`CellAddress`] - a cell coordinate and its `B12` text form
//! - [`Extent`] - the column/row bounds of a grid
//! - [`Error`] - decode and bounds failures
//!
//! ## Example
//!
//! ```rust
//! use gridcalc_core::{CellAddress, Extent};
//!
//! let addr = CellAddress::parse("B12").unwrap();
//! assert_eq!(addr.column, 1);
//! assert_eq!(addr.row, 12);
//!
//! let extent = Extent::new(4, 20);
//! assert!(extent.check(&addr).is_ok());
//! ```

pub mod address;
pub mod error;
pub mod extent;

pub use address::{Axis, CellAddress, WIRE_PREFIX};
pub use error::{Error, Result};
pub use extent::Extent;
