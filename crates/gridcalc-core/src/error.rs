//! Error types for gridcalc-core

use crate::address::Axis;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in gridcalc-core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Coordinate text that does not match `[A-Z]+[0-9]+`
    #[error("invalid cell address {input:?}: {axis} {reason}")]
    InvalidAddress {
        input: String,
        axis: Axis,
        reason: String,
    },

    /// Coordinate outside the configured grid extent
    #[error("{axis} index {index} out of range [0, {limit})")]
    OutOfBounds { axis: Axis, index: u32, limit: u32 },
}

impl Error {
    pub(crate) fn invalid_address<S: Into<String>>(input: &str, axis: Axis, reason: S) -> Self {
        Error::InvalidAddress {
            input: input.to_string(),
            axis,
            reason: reason.into(),
        }
    }
}
