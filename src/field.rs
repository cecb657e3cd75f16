//! External field derived from a weight matrix.
//!
//! The field is the standardized magnitude of each weight:
//!
//! ```text
//! field[i, j] = (|W[i, j]| - mean(|W|)) / std(|W|)
//! ```
//!
//! using the population standard deviation. When every magnitude is equal
//! the standard deviation is zero and [`DegenerateField`] decides the outcome.

use ndarray::{Array2, ArrayView2};
use tracing::warn;

use crate::error::{IsingError, Result};

/// Relative spread below which magnitudes count as equal.
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Policy for weight matrices whose magnitudes have zero variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DegenerateField {
    /// Use an all-zero field.
    #[default]
    Zero,
    /// Fail with [`IsingError::DegenerateWeights`].
    Reject,
}

/// Computes the standardized magnitude field of `weights`.
///
/// # Errors
///
/// - [`IsingError::EmptyWeights`] if either dimension is zero.
/// - [`IsingError::NonFiniteWeights`] if any weight is NaN or infinite.
/// - [`IsingError::DegenerateWeights`] if the magnitudes have zero variance
///   and `policy` is [`DegenerateField::Reject`].
///
/// # Examples
///
/// ```
/// use ndarray::array;
/// use u_ising::field::{standardized_field, DegenerateField};
///
/// let field = standardized_field(array![[1.0, -3.0]].view(), DegenerateField::Zero).unwrap();
/// assert_eq!(field, array![[-1.0, 1.0]]);
/// ```
pub fn standardized_field(weights: ArrayView2<'_, f64>, policy: DegenerateField) -> Result<Array2<f64>> {
    let (rows, cols) = weights.dim();
    if rows == 0 || cols == 0 {
        return Err(IsingError::EmptyWeights { rows, cols });
    }
    if let Some(((row, col), _)) = weights.indexed_iter().find(|(_, w)| !w.is_finite()) {
        return Err(IsingError::NonFiniteWeights { row, col });
    }

    let magnitude = weights.mapv(f64::abs);
    let n = magnitude.len() as f64;
    let mean = magnitude.sum() / n;
    let variance = magnitude.fold(0.0, |acc, &m| acc + (m - mean) * (m - mean)) / n;
    let std = variance.sqrt();

    // Equal magnitudes can leave rounding residue in the mean.
    if std <= DEGENERATE_TOLERANCE * mean {
        return match policy {
            DegenerateField::Zero => {
                warn!(rows, cols, "ising.field.degenerate_zero");
                Ok(Array2::zeros((rows, cols)))
            }
            DegenerateField::Reject => Err(IsingError::DegenerateWeights),
        };
    }

    Ok(magnitude.mapv_into(|m| (m - mean) / std))
}
