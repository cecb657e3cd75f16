//! Annealing execution loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use ndarray::Array2;
use tracing::{debug, trace};

use super::config::AnnealConfig;
use super::step::{metropolis_step, StepParams};
use crate::error::Result;
use crate::field::standardized_field;
use crate::key::PrngKey;
use crate::lattice::{energy, magnetization, Checkerboard};

/// Result of an annealing run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealResult {
    /// Final spin grid; every entry is `-1.0` or `+1.0`.
    pub spins: Array2<f64>,

    /// External field the spins were biased by.
    pub field: Array2<f64>,

    /// Number of completed sweeps.
    pub steps: usize,

    /// Temperature of the last completed sweep (`t_start` if none ran).
    pub final_temperature: f64,

    /// Total accepted spin flips over the run.
    pub flips: usize,

    /// Energy sampled every `history_interval` steps, including the initial
    /// and final state. Empty when sampling is off.
    pub energy_history: Vec<f64>,

    /// Magnetization sampled alongside `energy_history`.
    pub magnetization_history: Vec<f64>,

    /// Whether cancelled externally.
    pub cancelled: bool,
}

impl AnnealResult {
    /// Splits the result into `(spins, field)`.
    pub fn into_parts(self) -> (Array2<f64>, Array2<f64>) {
        (self.spins, self.field)
    }
}

/// Executes the annealing loop.
pub struct AnnealRunner;

impl AnnealRunner {
    /// Anneals a spin grid biased by `weights`.
    ///
    /// # Errors
    ///
    /// Fails on an invalid config or unusable weights; see
    /// [`IsingError`](crate::error::IsingError).
    pub fn run(weights: &Array2<f64>, config: &AnnealConfig) -> Result<AnnealResult> {
        Self::run_with_cancel(weights, config, None)
    }

    /// Anneals with an optional cancellation flag, checked before every step.
    pub fn run_with_cancel(
        weights: &Array2<f64>,
        config: &AnnealConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<AnnealResult> {
        config.validate()?;
        let field = standardized_field(weights.view(), config.degenerate_field)?;
        let shape = field.dim();

        let mut key = PrngKey::new(config.seed);
        let mut spins = key.spins(shape);
        let temperatures = config
            .schedule
            .temperatures(config.steps, config.t_start, config.t_end);
        let board = Checkerboard::new(shape);

        debug!(
            rows = shape.0,
            cols = shape.1,
            steps = config.steps,
            seed = config.seed,
            "ising.anneal.start"
        );

        let mut history = History::new(config.history_interval);
        history.record(0, &spins, &field, config.coupling);

        let mut completed = 0usize;
        let mut flips = 0usize;
        let mut final_temperature = config.t_start;
        let mut cancelled = false;

        for &temperature in &temperatures {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    debug!(completed, "ising.anneal.cancelled");
                    break;
                }
            }

            let (next_key, step_key) = key.split();
            key = next_key;

            let params = StepParams {
                field: field.view(),
                coupling: config.coupling,
                temperature,
                parallel: config.parallel,
            };
            let outcome = metropolis_step(step_key, &spins, &board, &params)?;
            spins = outcome.spins;
            flips += outcome.flips;
            completed += 1;
            final_temperature = temperature;

            if history.due(completed) {
                history.record(completed, &spins, &field, config.coupling);
            }
        }

        history.finish(completed, &spins, &field, config.coupling);

        debug!(completed, flips, final_temperature, cancelled, "ising.anneal.end");

        Ok(AnnealResult {
            spins,
            field,
            steps: completed,
            final_temperature,
            flips,
            energy_history: history.energy,
            magnetization_history: history.magnetization,
            cancelled,
        })
    }
}

/// Anneals `weights` with the default parameters and returns
/// `(spins, field)`.
///
/// Equivalent to [`AnnealRunner::run`] with [`AnnealConfig::default`]:
/// 2500 steps from temperature 5.0 down to 0.1, coupling 0.7, seed 42.
///
/// # Examples
///
/// ```
/// use ndarray::Array2;
/// use u_ising::anneal_layer;
///
/// let weights = Array2::from_shape_fn((8, 8), |(r, c)| (r * 8 + c) as f64 - 31.5);
/// let (spins, field) = anneal_layer(&weights).unwrap();
/// assert_eq!(spins.dim(), (8, 8));
/// assert_eq!(field.dim(), (8, 8));
/// ```
pub fn anneal_layer(weights: &Array2<f64>) -> Result<(Array2<f64>, Array2<f64>)> {
    AnnealRunner::run(weights, &AnnealConfig::default()).map(AnnealResult::into_parts)
}

/// Periodic energy/magnetization samples.
struct History {
    interval: usize,
    last_step: Option<usize>,
    energy: Vec<f64>,
    magnetization: Vec<f64>,
}

impl History {
    fn new(interval: usize) -> Self {
        Self {
            interval,
            last_step: None,
            energy: Vec::new(),
            magnetization: Vec::new(),
        }
    }

    fn due(&self, step: usize) -> bool {
        self.interval > 0 && step.is_multiple_of(self.interval)
    }

    fn record(&mut self, step: usize, spins: &Array2<f64>, field: &Array2<f64>, coupling: f64) {
        if self.interval == 0 {
            return;
        }
        let e = energy(spins.view(), field.view(), coupling);
        let m = magnetization(spins.view());
        trace!(step, energy = e, magnetization = m, "ising.anneal.sample");
        self.energy.push(e);
        self.magnetization.push(m);
        self.last_step = Some(step);
    }

    /// Records the final state unless it was just sampled.
    fn finish(&mut self, step: usize, spins: &Array2<f64>, field: &Array2<f64>, coupling: f64) {
        if self.last_step != Some(step) {
            self.record(step, spins, field, coupling);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IsingError;
    use crate::field::DegenerateField;
    use crate::schedule::Schedule;
    use proptest::prelude::*;

    fn ramp(rows: usize, cols: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, cols), |(r, c)| ((r * cols + c) as f64 + 1.0) * 0.37)
    }

    fn short_config() -> AnnealConfig {
        AnnealConfig::default().with_steps(50)
    }

    fn is_spin_grid(spins: &Array2<f64>) -> bool {
        spins.iter().all(|&s| s == 1.0 || s == -1.0)
    }

    #[test]
    fn test_output_shapes_match_weights() {
        let weights = ramp(5, 7);
        let result = AnnealRunner::run(&weights, &short_config()).unwrap();
        assert_eq!(result.spins.dim(), (5, 7));
        assert_eq!(result.field.dim(), (5, 7));
        assert!(is_spin_grid(&result.spins));
        assert_eq!(result.steps, 50);
        assert!(!result.cancelled);
    }

    #[test]
    fn test_runs_are_bit_identical() {
        let weights = ramp(6, 6);
        let config = short_config();
        let a = AnnealRunner::run(&weights, &config).unwrap();
        let b = AnnealRunner::run(&weights, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_seed_changes_outcome() {
        // One hot sweep keeps the grid close to its random start.
        let weights = ramp(16, 16);
        let config = AnnealConfig::default().with_steps(1);
        let a = AnnealRunner::run(&weights, &config.clone().with_seed(1)).unwrap();
        let b = AnnealRunner::run(&weights, &config.with_seed(2)).unwrap();
        assert_ne!(a.spins, b.spins);
        assert_eq!(a.field, b.field);
    }

    #[test]
    fn test_single_step_uses_t_start() {
        let weights = ramp(4, 4);
        let config = AnnealConfig::default()
            .with_steps(1)
            .with_t_start(3.0)
            .with_t_end(0.5);
        let result = AnnealRunner::run(&weights, &config).unwrap();
        assert_eq!(result.steps, 1);
        assert_eq!(result.final_temperature, 3.0);
    }

    #[test]
    fn test_final_temperature_is_t_end() {
        let weights = ramp(4, 4);
        let result = AnnealRunner::run(&weights, &short_config()).unwrap();
        assert_eq!(result.final_temperature, 0.1);
    }

    #[test]
    fn test_uniform_weights_zero_field() {
        let weights = Array2::from_elem((4, 4), 1.0);
        let config = AnnealConfig::default()
            .with_steps(1)
            .with_t_start(1.0)
            .with_t_end(1.0)
            .with_coupling(0.5);
        let result = AnnealRunner::run(&weights, &config).unwrap();
        assert!(result.field.iter().all(|&f| f == 0.0));
        assert!(is_spin_grid(&result.spins));
    }

    #[test]
    fn test_uniform_weights_without_coupling_flip_every_spin() {
        // Zero field and zero coupling give dE = 0, so every spin flips.
        let weights = Array2::from_elem((4, 4), 1.0);
        let config = AnnealConfig::default()
            .with_steps(1)
            .with_t_start(1.0)
            .with_t_end(1.0)
            .with_coupling(0.0);
        let result = AnnealRunner::run(&weights, &config).unwrap();

        let initial = PrngKey::new(config.seed).spins((4, 4));
        assert_eq!(result.spins, -initial);
        assert_eq!(result.flips, 16);
    }

    #[test]
    fn test_uniform_weights_reject_policy() {
        let weights = Array2::from_elem((4, 4), 1.0);
        let config = short_config().with_degenerate_field(DegenerateField::Reject);
        assert_eq!(
            AnnealRunner::run(&weights, &config),
            Err(IsingError::DegenerateWeights)
        );
    }

    #[test]
    fn test_invalid_config_rejected() {
        let weights = ramp(3, 3);
        let config = short_config().with_steps(0);
        assert!(matches!(
            AnnealRunner::run(&weights, &config),
            Err(IsingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_cold_uncoupled_spins_follow_field() {
        let weights = ramp(4, 4);
        let config = AnnealConfig::default()
            .with_steps(50)
            .with_t_start(1.0)
            .with_t_end(1e-3)
            .with_coupling(0.0);
        let result = AnnealRunner::run(&weights, &config).unwrap();
        for (&s, &f) in result.spins.iter().zip(result.field.iter()) {
            assert_eq!(s, f.signum(), "spin {s} against field {f}");
        }
    }

    #[test]
    fn test_ferromagnetic_anneal_lowers_energy() {
        let weights = ramp(16, 16);
        let config = AnnealConfig::default()
            .with_steps(300)
            .with_coupling(1.0)
            .with_history_interval(50);
        let result = AnnealRunner::run(&weights, &config).unwrap();

        let first = result.energy_history[0];
        let last = *result.energy_history.last().unwrap();
        assert!(last < first, "energy rose from {first} to {last}");
    }

    #[test]
    fn test_history_sampling() {
        let weights = ramp(4, 4);
        let config = AnnealConfig::default()
            .with_steps(25)
            .with_history_interval(10);
        let result = AnnealRunner::run(&weights, &config).unwrap();
        // Steps 0, 10, 20 and the final step 25.
        assert_eq!(result.energy_history.len(), 4);
        assert_eq!(result.magnetization_history.len(), 4);
        assert!(result
            .magnetization_history
            .iter()
            .all(|m| (-1.0..=1.0).contains(m)));

        let final_energy = energy(result.spins.view(), result.field.view(), config.coupling);
        assert_eq!(*result.energy_history.last().unwrap(), final_energy);
    }

    #[test]
    fn test_history_off_by_default() {
        let result = AnnealRunner::run(&ramp(4, 4), &short_config()).unwrap();
        assert!(result.energy_history.is_empty());
        assert!(result.magnetization_history.is_empty());
    }

    #[test]
    fn test_cancellation_returns_initial_state() {
        let weights = ramp(4, 4);
        let config = short_config();
        let cancel = Arc::new(AtomicBool::new(true));

        let result = AnnealRunner::run_with_cancel(&weights, &config, Some(cancel)).unwrap();
        assert!(result.cancelled);
        assert_eq!(result.steps, 0);
        assert_eq!(result.flips, 0);
        assert_eq!(result.final_temperature, config.t_start);
        assert_eq!(result.spins, PrngKey::new(config.seed).spins((4, 4)));
    }

    #[test]
    fn test_geometric_schedule_runs() {
        let weights = ramp(4, 4);
        let config = short_config().with_schedule(Schedule::Geometric);
        let result = AnnealRunner::run(&weights, &config).unwrap();
        assert!(is_spin_grid(&result.spins));
        assert!((result.final_temperature - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_anneal_layer_matches_default_run() {
        let weights = ramp(3, 5);
        let (spins, field) = anneal_layer(&weights).unwrap();
        let result = AnnealRunner::run(&weights, &AnnealConfig::default()).unwrap();
        assert_eq!(spins, result.spins);
        assert_eq!(field, result.field);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_run_matches_sequential() {
        let weights = ramp(24, 24);
        let seq = AnnealRunner::run(&weights, &short_config()).unwrap();
        let par = AnnealRunner::run(&weights, &short_config().with_parallel(true)).unwrap();
        assert_eq!(seq, par);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_shape_and_spin_values(
            rows in 1usize..7,
            cols in 1usize..7,
            seed in any::<u64>(),
            coupling in -2.0f64..2.0,
        ) {
            let weights = Array2::from_shape_fn((rows, cols), |(r, c)| {
                ((r * 31 + c * 17 + 3) % 11) as f64 - 5.0
            });
            let config = AnnealConfig::default()
                .with_steps(5)
                .with_coupling(coupling)
                .with_seed(seed);
            let result = AnnealRunner::run(&weights, &config).unwrap();
            prop_assert_eq!(result.spins.dim(), (rows, cols));
            prop_assert_eq!(result.field.dim(), (rows, cols));
            prop_assert!(is_spin_grid(&result.spins));
        }

        #[test]
        fn prop_deterministic(seed in any::<u64>(), steps in 1usize..10) {
            let weights = ramp(5, 4);
            let config = AnnealConfig::default().with_steps(steps).with_seed(seed);
            let a = AnnealRunner::run(&weights, &config).unwrap();
            let b = AnnealRunner::run(&weights, &config).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
