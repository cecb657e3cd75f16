//! Splittable pseudo-random keys.
//!
//! A [`PrngKey`] is a plain value: sampling from it never mutates it, and
//! fresh keys are obtained by [`PrngKey::split`]. Threading keys explicitly
//! keeps every draw of an anneal reproducible from the initial seed alone.
//!
//! # Examples
//!
//! ```
//! use u_ising::key::PrngKey;
//!
//! let key = PrngKey::new(42);
//! let (next, sub) = key.split();
//! assert_ne!(next, sub);
//! assert_eq!(key.split(), (next, sub));
//! ```

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Offset that separates sampling streams from splitting streams.
const SAMPLE_STREAM: u64 = 0x9E37_79B9_7F4A_7C15;

/// An immutable, splittable seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrngKey(u64);

impl PrngKey {
    /// Creates a key from a raw seed.
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    /// Returns the raw seed.
    pub fn seed(&self) -> u64 {
        self.0
    }

    /// Deterministically derives two independent child keys.
    pub fn split(self) -> (PrngKey, PrngKey) {
        let mut rng = StdRng::seed_from_u64(self.0);
        let first = PrngKey(rng.next_u64());
        let second = PrngKey(rng.next_u64());
        (first, second)
    }

    /// Draws a grid of uniform values in `[0, 1)`, filled in row-major order.
    pub fn uniform(&self, shape: (usize, usize)) -> Array2<f64> {
        let mut rng = self.sampler();
        Array2::from_shape_simple_fn(shape, || rng.random::<f64>())
    }

    /// Draws a grid of spins, each independently `-1.0` or `+1.0` with equal
    /// probability.
    pub fn spins(&self, shape: (usize, usize)) -> Array2<f64> {
        let mut rng = self.sampler();
        Array2::from_shape_simple_fn(shape, || if rng.random_bool(0.5) { 1.0 } else { -1.0 })
    }

    fn sampler(&self) -> StdRng {
        StdRng::seed_from_u64(self.0 ^ SAMPLE_STREAM)
    }
}
