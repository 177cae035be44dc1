use log::debug;
use ndarray::Array1;
use seirsim_core::{DenseOutput, OdeSystem};
use seirsim_solvers::runge_kutta::{self, Config, Solution, Stats};

use crate::{Block, InitialState, QueryError, SimulationError};

/// A simulated epidemic over `[0, horizon]` days.
///
/// Backed by the dense output of the integrator, so the state can be queried
/// at any time, not only at the integrator's steps. Times before zero return
/// the initial state unchanged; lagged outcomes rely on this near the start.
#[derive(Debug, Clone)]
pub struct Trajectory {
    initial: InitialState,
    horizon: f64,
    solution: Solution,
}

impl Trajectory {
    /// Returns the number of compartments.
    #[must_use]
    pub fn compartments(&self) -> usize {
        self.initial.compartments()
    }

    /// Returns the simulated horizon in days.
    #[must_use]
    pub fn horizon(&self) -> f64 {
        self.horizon
    }

    /// Returns the state at `t = 0`.
    #[must_use]
    pub fn initial_state(&self) -> &InitialState {
        &self.initial
    }

    /// Returns the integrator's work counters.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.solution.stats()
    }

    /// Returns the underlying dense solution.
    #[must_use]
    pub fn solution(&self) -> &Solution {
        &self.solution
    }

    /// Returns the full state vector at `time`.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if `time` is not finite or is beyond the
    /// horizon.
    pub fn state_at(&self, time: f64) -> Result<Array1<f64>, QueryError> {
        let mut state = vec![0.0; self.initial.as_slice().len()];
        self.state_into(time, &mut state)?;
        Ok(Array1::from(state))
    }

    /// Writes the full state vector at `time` into `out`.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if `time` is not finite or is beyond the
    /// horizon.
    ///
    /// # Panics
    ///
    /// Panics if `out` is not exactly as long as the state vector.
    pub fn state_into(&self, time: f64, out: &mut [f64]) -> Result<(), QueryError> {
        assert_eq!(out.len(), self.initial.as_slice().len(), "state length mismatch");
        if self.check(time)? {
            self.solution
                .interpolate_into(time, out)
                .map_err(|_| self.beyond(time))
        } else {
            out.copy_from_slice(self.initial.as_slice());
            Ok(())
        }
    }

    /// Returns one entry of the state at `time`.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if `time` is not finite or is beyond the
    /// horizon.
    ///
    /// # Panics
    ///
    /// Panics if `compartment` is out of range.
    pub fn value(&self, time: f64, block: Block, compartment: usize) -> Result<f64, QueryError> {
        let n = self.compartments();
        assert!(compartment < n, "compartment index out of range");
        let index = block.index(n, compartment);

        if self.check(time)? {
            self.solution
                .component(time, index)
                .map_err(|_| self.beyond(time))
        } else {
            Ok(self.initial.as_slice()[index])
        }
    }

    /// Validates `time`, returning whether it falls in the integrated span.
    pub(crate) fn check(&self, time: f64) -> Result<bool, QueryError> {
        if !time.is_finite() {
            return Err(QueryError::NonFiniteTime { time });
        }
        if time > self.horizon {
            return Err(self.beyond(time));
        }
        Ok(time >= 0.0)
    }

    fn beyond(&self, time: f64) -> QueryError {
        QueryError::BeyondHorizon {
            time,
            horizon: self.horizon,
        }
    }
}

/// Integrates `system` from `initial` over `[0, days]`.
pub(crate) fn simulate<S: OdeSystem>(
    system: &S,
    initial: &InitialState,
    days: f64,
    config: &Config,
) -> Result<Trajectory, SimulationError> {
    if !days.is_finite() || days <= 0.0 {
        return Err(SimulationError::InvalidHorizon { days });
    }

    let solution = runge_kutta::solve(system, 0.0, days, initial.as_slice(), config)?;
    let stats = solution.stats();
    debug!(
        "simulated {days} days: {} steps accepted, {} rejected",
        stats.accepted, stats.rejected
    );

    Ok(Trajectory {
        initial: initial.clone(),
        horizon: days,
        solution,
    })
}
