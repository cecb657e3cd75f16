//! Error types for annealing runs.

use thiserror::Error;

/// Errors raised while preparing or running an anneal.
///
/// Every failure is fatal to the call that produced it; nothing is retried.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IsingError {
    /// The weight matrix has a zero-length dimension.
    #[error("weight matrix is empty (shape {rows}x{cols})")]
    EmptyWeights {
        /// Number of rows.
        rows: usize,
        /// Number of columns.
        cols: usize,
    },

    /// The weight matrix contains NaN or an infinity.
    #[error("weight matrix has a non-finite value at ({row}, {col})")]
    NonFiniteWeights {
        /// Row of the first offending entry.
        row: usize,
        /// Column of the first offending entry.
        col: usize,
    },

    /// All weight magnitudes are equal, so the field cannot be standardized.
    ///
    /// Only returned under [`DegenerateField::Reject`](crate::field::DegenerateField::Reject).
    #[error("weight magnitudes have zero variance")]
    DegenerateWeights,

    /// A configuration parameter is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Two grids that must agree in shape do not.
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// Shape of the reference grid.
        expected: (usize, usize),
        /// Shape that was supplied.
        found: (usize, usize),
    },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, IsingError>;
