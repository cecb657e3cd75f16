//! Simulated annealing of a 2-D Ising spin grid.
//!
//! Spins on a toroidal grid are biased by an external field derived from a
//! weight matrix and coupled to their four nearest neighbours. The grid is
//! relaxed over a fixed temperature schedule, one checkerboard
//! Metropolis-Hastings sweep per temperature, with no early exit.
//!
//! # References
//!
//! - Metropolis et al. (1953), "Equation of State Calculations by Fast
//!   Computing Machines"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

mod config;
mod runner;
mod step;

pub use config::AnnealConfig;
pub use runner::{anneal_layer, AnnealResult, AnnealRunner};
pub use step::{metropolis_step, update_phase, StepOutcome, StepParams};
