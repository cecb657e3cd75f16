//! Whole-grid operations on a toroidal spin lattice.
//!
//! All neighbour lookups wrap around the grid edges (periodic boundary
//! conditions) and are expressed as cyclic shifts of the full array.

use ndarray::{Array2, ArrayView2, Axis, Slice};

/// Cyclically shifts `a` by `shift` positions along `axis`.
///
/// Element `i` of the result is element `i - shift` (mod length) of the
/// input, so a shift of `1` moves every row (or column) one step forward.
pub fn roll(a: ArrayView2<'_, f64>, shift: isize, axis: Axis) -> Array2<f64> {
    let n = a.len_of(axis);
    if n == 0 {
        return a.to_owned();
    }
    let k = shift.rem_euclid(n as isize) as usize;
    if k == 0 {
        return a.to_owned();
    }

    let mut out = Array2::zeros(a.raw_dim());
    out.slice_axis_mut(axis, Slice::from(k..))
        .assign(&a.slice_axis(axis, Slice::from(..n - k)));
    out.slice_axis_mut(axis, Slice::from(..k))
        .assign(&a.slice_axis(axis, Slice::from(n - k..)));
    out
}

/// Sum of the four nearest neighbours of every cell.
pub fn neighbor_sum(spins: ArrayView2<'_, f64>) -> Array2<f64> {
    roll(spins, 1, Axis(0))
        + roll(spins, -1, Axis(0))
        + roll(spins, 1, Axis(1))
        + roll(spins, -1, Axis(1))
}

/// Effective field on every cell: `field + coupling * neighbor_sum(spins)`.
pub fn local_field(
    spins: ArrayView2<'_, f64>,
    field: ArrayView2<'_, f64>,
    coupling: f64,
) -> Array2<f64> {
    let mut h = neighbor_sum(spins);
    h.zip_mut_with(&field, |h, &f| *h = f + coupling * *h);
    h
}

/// Ising energy `-sum(field * s) - coupling * sum_bonds(s_i * s_j)`.
///
/// Each toroidal bond is counted once (right and down neighbours).
pub fn energy(spins: ArrayView2<'_, f64>, field: ArrayView2<'_, f64>, coupling: f64) -> f64 {
    let bonds = roll(spins, -1, Axis(0)) + roll(spins, -1, Axis(1));
    let interaction = (&bonds * &spins).sum();
    let bias = (&field * &spins).sum();
    -bias - coupling * interaction
}

/// Mean spin value; `0.0` for an empty grid.
pub fn magnetization(spins: ArrayView2<'_, f64>) -> f64 {
    spins.mean().unwrap_or(0.0)
}

/// One of the two interleaved sub-lattices of a checkerboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Cells with `(row + col) % 2 == 0`.
    Even,
    /// Cells with `(row + col) % 2 == 1`.
    Odd,
}

impl Phase {
    /// Update order within one sweep.
    pub const SWEEP: [Phase; 2] = [Phase::Even, Phase::Odd];

    /// Whether cell `(row, col)` belongs to this phase.
    pub fn contains(self, row: usize, col: usize) -> bool {
        let parity = (row + col) % 2;
        match self {
            Phase::Even => parity == 0,
            Phase::Odd => parity == 1,
        }
    }
}

/// Cached boolean masks for both checkerboard phases of a fixed shape.
#[derive(Debug, Clone)]
pub struct Checkerboard {
    even: Array2<bool>,
    odd: Array2<bool>,
}

impl Checkerboard {
    /// Builds the masks for a grid of `shape`.
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            even: Array2::from_shape_fn(shape, |(r, c)| Phase::Even.contains(r, c)),
            odd: Array2::from_shape_fn(shape, |(r, c)| Phase::Odd.contains(r, c)),
        }
    }

    /// Grid shape the masks were built for.
    pub fn dim(&self) -> (usize, usize) {
        self.even.dim()
    }

    /// Mask selecting the cells of `phase`.
    pub fn mask(&self, phase: Phase) -> ArrayView2<'_, bool> {
        match phase {
            Phase::Even => self.even.view(),
            Phase::Odd => self.odd.view(),
        }
    }
}
