//! Checkerboard Metropolis-Hastings sweep.
//!
//! One step updates the even sub-lattice, then the odd sub-lattice. Cells of
//! one phase only neighbour cells of the other phase, so every cell of a
//! phase can be decided independently. The odd phase always sees the spins
//! produced by the even phase of the same step (Gauss-Seidel order).

use ndarray::{Array2, ArrayView2, Zip};

use crate::error::{IsingError, Result};
use crate::key::PrngKey;
use crate::lattice::{local_field, Checkerboard, Phase};

/// Inputs shared by both phase updates of one step.
#[derive(Debug, Clone, Copy)]
pub struct StepParams<'a> {
    /// External field, same shape as the spin grid.
    pub field: ArrayView2<'a, f64>,
    /// Nearest-neighbour coupling `J`.
    pub coupling: f64,
    /// Temperature of this step.
    pub temperature: f64,
    /// Update cells with rayon when the `parallel` feature is enabled.
    pub parallel: bool,
}

/// Spins after an update together with the number of accepted flips.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub spins: Array2<f64>,
    pub flips: usize,
}

/// Metropolis acceptance for a single spin.
///
/// `exp` may overflow to `+inf` for strongly favourable moves, which still
/// compares above any draw.
#[inline]
fn should_flip(spin: f64, h: f64, draw: f64, temperature: f64) -> bool {
    let delta_e = 2.0 * spin * h;
    let probability = (-delta_e / temperature).exp();
    delta_e < 0.0 || draw < probability
}

/// Updates every cell selected by `mask`, leaving the rest untouched.
///
/// The local field is computed from `spins` as given, and one uniform draw
/// per grid cell is taken from `key`.
///
/// # Errors
///
/// [`IsingError::ShapeMismatch`] if `spins` or `mask` disagree with the
/// field's shape.
pub fn update_phase(
    spins: &Array2<f64>,
    key: PrngKey,
    mask: ArrayView2<'_, bool>,
    params: &StepParams<'_>,
) -> Result<StepOutcome> {
    let expected = params.field.dim();
    for found in [spins.dim(), mask.dim()] {
        if found != expected {
            return Err(IsingError::ShapeMismatch { expected, found });
        }
    }

    let h = local_field(spins.view(), params.field, params.coupling);
    let draws = key.uniform(spins.dim());
    let mut next = spins.clone();
    apply_flips(&mut next, &h, &draws, mask, params.temperature, params.parallel);

    let flips = Zip::from(&next)
        .and(spins)
        .fold(0usize, |acc, &a, &b| acc + usize::from(a != b));
    Ok(StepOutcome { spins: next, flips })
}

fn apply_flips(
    next: &mut Array2<f64>,
    h: &Array2<f64>,
    draws: &Array2<f64>,
    mask: ArrayView2<'_, bool>,
    temperature: f64,
    parallel: bool,
) {
    let zip = Zip::from(next).and(h).and(draws).and(mask);
    let flip = move |s: &mut f64, &h: &f64, &u: &f64, &m: &bool| {
        if m && should_flip(*s, h, u, temperature) {
            *s = -*s;
        }
    };

    #[cfg(feature = "parallel")]
    if parallel {
        zip.par_for_each(flip);
        return;
    }
    #[cfg(not(feature = "parallel"))]
    let _ = parallel;

    zip.for_each(flip);
}

/// Runs one full checkerboard sweep at `params.temperature`.
///
/// `key` is split into one key per phase; the even phase is updated first
/// and its result feeds the odd phase.
pub fn metropolis_step(
    key: PrngKey,
    spins: &Array2<f64>,
    board: &Checkerboard,
    params: &StepParams<'_>,
) -> Result<StepOutcome> {
    let (even_key, odd_key) = key.split();
    let mut current = StepOutcome {
        spins: spins.clone(),
        flips: 0,
    };
    for (phase, phase_key) in Phase::SWEEP.into_iter().zip([even_key, odd_key]) {
        let outcome = update_phase(&current.spins, phase_key, board.mask(phase), params)?;
        current.spins = outcome.spins;
        current.flips += outcome.flips;
    }
    Ok(current)
}
