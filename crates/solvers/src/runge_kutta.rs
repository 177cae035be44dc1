//! Adaptive Dormand–Prince integration with continuous output.
//!
//! Stepping and error control are delegated to the `ode_solvers` crate (see
//! [`Method`]). The solver records every accepted step, and [`solve`] turns
//! those steps into a [`Solution`] that can be evaluated at any time in the
//! span through [`DenseOutput`](seirsim_core::DenseOutput).
//!
//! # Failure
//!
//! Integration either covers the whole span or fails with an [`Error`]. A
//! failing system derivative stops the integrator at its next accepted step
//! and is reported as [`Error::System`] with the original error as its source.
//!
//! # Example
//!
//! ```ignore
//! use seirsim_solvers::runge_kutta::{self, Config};
//!
//! let solution = runge_kutta::solve(&system, 0.0, 10.0, &initial, &Config::default())?;
//! let midpoint = solution.interpolate(5.0)?;
//! ```

mod config;
mod error;
mod method;
mod solution;


pub use config::{Config, ConfigError};
pub use error::Error;
pub use method::Method;
pub use ode_solvers::dop_shared::IntegrationError;
pub use solution::{Solution, Stats};

use std::{cell::RefCell, rc::Rc};

use log::{debug, trace, warn};
use ode_solvers::{DVector, Dop853, Dopri5, System, dop_shared::OutputType};
use seirsim_core::OdeSystem;

/// Number of steps between stiffness checks.
const STIFFNESS_CHECK: u32 = 1000;

/// Integrates `system` from `start` to `end` starting at `initial`.
///
/// # Errors
///
/// Returns an error if the span or initial state is invalid, the system
/// derivative fails, or the integrator cannot reach `end`.
pub fn solve<S: OdeSystem>(
    system: &S,
    start: f64,
    end: f64,
    initial: &[f64],
    config: &Config,
) -> Result<Solution, Error> {
    if !start.is_finite() || !end.is_finite() || end <= start {
        return Err(Error::InvalidSpan { start, end });
    }

    let n = system.dimension();
    if initial.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: initial.len(),
        });
    }
    if !all_finite(initial) {
        return Err(Error::NonFinite { time: start });
    }

    let failure = Rc::new(RefCell::new(None));
    let wrapped = Wrapped {
        system,
        failure: Rc::clone(&failure),
    };

    let span = end - start;
    let y_start = DVector::from_column_slice(initial);
    let (rel_tol, abs_tol) = (config.rel_tol(), config.abs_tol());
    let h_max = config.max_step().min(span);
    let h_start = config.initial_step().unwrap_or(0.0);
    let control = config.method().control();

    let result = match config.method() {
        Method::Dopri5 => {
            let mut stepper = Dopri5::from_param(
                wrapped,
                start,
                end,
                span,
                y_start,
                rel_tol,
                abs_tol,
                control.safety,
                control.beta,
                control.fac_min,
                control.fac_max,
                h_max,
                h_start,
                config.max_steps(),
                STIFFNESS_CHECK,
                OutputType::Sparse,
            );
            stepper.integrate().map(|stats| {
                let x_out = stepper.x_out().clone();
                let y_out = stepper.y_out().clone();
                (stats, x_out, y_out)
            })
        }
        Method::Dop853 => {
            let mut stepper = Dop853::from_param(
                wrapped,
                start,
                end,
                span,
                y_start,
                rel_tol,
                abs_tol,
                control.safety,
                control.beta,
                control.fac_min,
                control.fac_max,
                h_max,
                h_start,
                config.max_steps(),
                STIFFNESS_CHECK,
                OutputType::Sparse,
            );
            stepper.integrate().map(|stats| {
                let x_out = stepper.x_out().clone();
                let y_out = stepper.y_out().clone();
                (stats, x_out, y_out)
            })
        }
    };

    if let Some((time, source)) = failure.borrow_mut().take() {
        warn!("system derivative failed at t = {time}");
        return Err(Error::system(time, source));
    }
    let (stats, x_out, y_out) = result.inspect_err(|err| warn!("integration failed: {err}"))?;

    let mut stats = Stats::from(stats);
    let mut rate = vec![0.0; n];
    evaluate(system, start, initial, &mut rate, &mut stats)?;
    let mut solution = Solution::new(start, initial, &rate);

    // The recorded steps may or may not repeat the initial point.
    for (time, state) in x_out.into_iter().zip(&y_out) {
        if time <= solution.end() {
            continue;
        }
        let state = state.as_slice();
        if !all_finite(state) {
            return Err(Error::NonFinite { time });
        }
        evaluate(system, time, state, &mut rate, &mut stats)?;
        trace!("accepted step to t = {time}");
        solution.push_step(time, state, &rate);
    }

    // The last step may land a rounding error away from `end`.
    let reached = solution.end();
    if end - reached > 1e-9 * span.max(1.0) {
        return Err(Error::Incomplete { time: reached, end });
    }
    solution.close(end);

    debug!(
        "integrated [{start}, {end}] with {:?}: {} accepted, {} rejected, {} evaluations",
        config.method(),
        stats.accepted,
        stats.rejected,
        stats.evaluations
    );

    Ok(solution.finish(config.method(), stats))
}

/// Adapts an [`OdeSystem`] to the `ode_solvers` system interface.
///
/// The first derivative failure is kept in `failure`. The derivative is then
/// filled with NaN so the step is rejected, and [`System::solout`] stops the
/// integration at the next accepted step.
struct Wrapped<'a, S: OdeSystem> {
    system: &'a S,
    failure: Rc<RefCell<Option<(f64, S::Error)>>>,
}

impl<S: OdeSystem> System<f64, DVector<f64>> for Wrapped<'_, S> {
    fn system(&self, x: f64, y: &DVector<f64>, dy: &mut DVector<f64>) {
        if dy.len() != y.len() {
            *dy = DVector::zeros(y.len());
        }
        if let Err(err) = self.system.derivative(x, y.as_slice(), dy.as_mut_slice()) {
            let mut failure = self.failure.borrow_mut();
            if failure.is_none() {
                *failure = Some((x, err));
            }
            dy.fill(f64::NAN);
        }
    }

    fn solout(&mut self, _x: f64, _y: &DVector<f64>, _dy: &DVector<f64>) -> bool {
        self.failure.borrow().is_some()
    }
}

fn evaluate<S: OdeSystem>(
    system: &S,
    time: f64,
    state: &[f64],
    rate: &mut [f64],
    stats: &mut Stats,
) -> Result<(), Error> {
    stats.evaluations += 1;
    system
        .derivative(time, state, rate)
        .map_err(|err| Error::system(time, err))
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}
