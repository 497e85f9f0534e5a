//! Prelude module - common imports for gridcalc users
//!
//! ```rust
//! use gridcalc::prelude::*;
//! ```

pub use crate::{
    // Addressing
    CellAddress,
    Extent,

    // Errors
    FormulaError,
    GridError,
    GridResult,

    // Functions
    CallContext,
    FunctionRegistry,

    // Main types
    Cell,
    Grid,
    GridOptions,
    RecalcStats,

    // Snapshots
    GridSnapshot,

    // Values
    Value,
    ValueKind,
};
