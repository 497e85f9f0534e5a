//! Formula error types

use crate::value::ValueKind;
use gridcalc_core::{Axis, CellAddress};
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur while lexing, parsing or evaluating an expression
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    /// Character that cannot start any token
    #[error("lex error at offset {offset}: {message}")]
    Lex { offset: usize, message: String },

    /// Malformed token sequence
    #[error("parse error at offset {offset}: {reason}")]
    Parse { offset: usize, reason: String },

    /// Literal text that does not denote a value (overflow, bad escape)
    #[error("invalid literal {raw}: {reason}")]
    Literal { raw: String, reason: String },

    /// Binary operands of different kinds
    #[error("mismatched kinds for {op}: {left} and {right}")]
    KindMismatch {
        op: &'static str,
        left: ValueKind,
        right: ValueKind,
    },

    /// Operator applied to a kind it is not defined for
    #[error("operator {op} is not defined for {kind}")]
    InvalidOperation { op: &'static str, kind: ValueKind },

    /// Division or remainder by zero
    #[error("division by zero in {op}")]
    DivisionByZero { op: &'static str },

    /// Overflowing exponent or factorial, negative shift counts and similar
    #[error("{0}")]
    Arithmetic(String),

    #[error("unknown identifier {0:?}")]
    UnknownIdentifier(String),

    #[error("unknown function {0:?}")]
    UnknownFunction(String),

    #[error("wrong number of arguments for {function}: expected {expected}, got {actual}")]
    ArgumentCount {
        function: String,
        expected: usize,
        actual: usize,
    },

    /// Value that has no representation in the target kind
    #[error("cannot convert {from} to {to}")]
    Conversion { from: ValueKind, to: ValueKind },

    /// Call argument that cannot be coerced to the declared parameter kind
    #[error("argument {position} of {function}: cannot convert {actual} to {expected}")]
    Argument {
        function: String,
        position: usize,
        expected: ValueKind,
        actual: ValueKind,
    },

    /// Failure reported by (or panic raised inside) a registered function
    #[error("{function}: {message}")]
    Callee { function: String, message: String },

    /// `cell(column, row)` index that is negative or too wide for a coordinate
    #[error("{axis} index {value} is not a valid coordinate")]
    InvalidCoordinate { axis: Axis, value: String },

    /// A cell that is reached again while it is still being resolved
    #[error("recursive reference to {address}")]
    CircularReference { address: CellAddress },

    /// Rejected function registration
    #[error("cannot register {name:?}: {reason}")]
    Registration { name: String, reason: String },

    /// Coordinate decode or bounds failure raised while resolving a reference
    #[error(transparent)]
    Core(#[from] gridcalc_core::Error),
}

impl FormulaError {
    pub(crate) fn parse<S: Into<String>>(offset: usize, reason: S) -> Self {
        FormulaError::Parse {
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn literal<S: Into<String>>(raw: &str, reason: S) -> Self {
        FormulaError::Literal {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}
