//! Annealing configuration.

use crate::error::{IsingError, Result};
use crate::field::DegenerateField;
use crate::schedule::Schedule;

/// Configuration for an annealing run.
///
/// # Examples
///
/// ```
/// use u_ising::anneal::AnnealConfig;
/// use u_ising::schedule::Schedule;
///
/// let config = AnnealConfig::default()
///     .with_steps(500)
///     .with_t_start(3.0)
///     .with_t_end(0.05)
///     .with_coupling(1.0)
///     .with_schedule(Schedule::Geometric);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealConfig {
    /// Number of checkerboard sweeps, one per temperature.
    pub steps: usize,

    /// First temperature of the schedule.
    pub t_start: f64,

    /// Last temperature of the schedule.
    ///
    /// Normally below `t_start`; a flat or rising schedule is allowed.
    pub t_end: f64,

    /// Nearest-neighbour coupling `J`.
    pub coupling: f64,

    /// Seed of the root [`PrngKey`](crate::key::PrngKey).
    pub seed: u64,

    /// Temperature schedule shape.
    pub schedule: Schedule,

    /// What to do with zero-variance weight magnitudes.
    pub degenerate_field: DegenerateField,

    /// Update each phase with rayon (requires the `parallel` feature;
    /// ignored otherwise). Results are identical either way.
    pub parallel: bool,

    /// Record energy and magnetization every this many steps. 0 = off.
    pub history_interval: usize,
}

impl Default for AnnealConfig {
    fn default() -> Self {
        Self {
            steps: 2500,
            t_start: 5.0,
            t_end: 0.1,
            coupling: 0.7,
            seed: 42,
            schedule: Schedule::default(),
            degenerate_field: DegenerateField::default(),
            parallel: false,
            history_interval: 0,
        }
    }
}

impl AnnealConfig {
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    pub fn with_t_start(mut self, t: f64) -> Self {
        self.t_start = t;
        self
    }

    pub fn with_t_end(mut self, t: f64) -> Self {
        self.t_end = t;
        self
    }

    pub fn with_coupling(mut self, coupling: f64) -> Self {
        self.coupling = coupling;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_schedule(mut self, schedule: Schedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_degenerate_field(mut self, policy: DegenerateField) -> Self {
        self.degenerate_field = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_history_interval(mut self, n: usize) -> Self {
        self.history_interval = n;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.steps == 0 {
            return Err(IsingError::InvalidConfig("steps must be positive".into()));
        }
        if !(self.t_start.is_finite() && self.t_start > 0.0) {
            return Err(IsingError::InvalidConfig(format!(
                "t_start must be positive and finite, got {}",
                self.t_start
            )));
        }
        if !(self.t_end.is_finite() && self.t_end > 0.0) {
            return Err(IsingError::InvalidConfig(format!(
                "t_end must be positive and finite, got {}",
                self.t_end
            )));
        }
        if !self.coupling.is_finite() {
            return Err(IsingError::InvalidConfig(format!(
                "coupling must be finite, got {}",
                self.coupling
            )));
        }
        Ok(())
    }
}
