//! Temperature schedules.
//!
//! A schedule is fully determined by `steps`, `t_start` and `t_end`: it
//! yields exactly `steps` temperatures, the first being `t_start` and the
//! last `t_end` (a single-step schedule holds only `t_start`).
//!
//! # References
//!
//! - Linear: fixed-duration cooling
//! - Geometric: standard textbook approach, Kirkpatrick et al. (1983)

/// Shape of the temperature descent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Schedule {
    /// Evenly spaced: `T_k = T_0 + k * (T_end - T_0) / (steps - 1)`.
    #[default]
    Linear,

    /// Constant ratio: `T_k = T_0 * (T_end / T_0)^(k / (steps - 1))`.
    ///
    /// Spends more steps at low temperature than [`Schedule::Linear`].
    Geometric,
}

impl Schedule {
    /// Returns the `steps` temperatures of this schedule.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_ising::schedule::Schedule;
    ///
    /// let temps = Schedule::Linear.temperatures(5, 5.0, 1.0);
    /// assert_eq!(temps, vec![5.0, 4.0, 3.0, 2.0, 1.0]);
    /// ```
    pub fn temperatures(self, steps: usize, t_start: f64, t_end: f64) -> Vec<f64> {
        match steps {
            0 => Vec::new(),
            1 => vec![t_start],
            _ => {
                let last = steps - 1;
                let span = last as f64;
                (0..steps)
                    .map(|k| {
                        if k == last {
                            return t_end;
                        }
                        let frac = k as f64 / span;
                        match self {
                            Schedule::Linear => t_start + (t_end - t_start) * frac,
                            Schedule::Geometric => t_start * (t_end / t_start).powf(frac),
                        }
                    })
                    .collect()
            }
        }
    }
}
