use seirsim_core::{DenseOutput, OutOfSpan};

use super::Method;

/// Counters describing the work done by an integration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Steps accepted by the error control.
    pub accepted: u32,

    /// Steps rejected and retried with a smaller size.
    pub rejected: u32,

    /// Calls to the system derivative.
    pub evaluations: u32,
}

impl From<ode_solvers::dop_shared::Stats> for Stats {
    fn from(stats: ode_solvers::dop_shared::Stats) -> Self {
        Self {
            accepted: stats.accepted_steps,
            rejected: stats.rejected_steps,
            evaluations: stats.num_eval,
        }
    }
}

/// A continuous trajectory produced by [`solve`](super::solve).
///
/// Stores the state and its derivative at every accepted step. Between two
/// steps `t0 < t1`, with `h = t1 - t0` and `θ = (t - t0) / h`, the state is the
/// cubic Hermite interpolant through both ends:
///
/// ```text
/// Δ = y1 - y0,  a = h f0 - Δ,  b = Δ - h f1 - a
/// y(t) = y0 + θ (Δ + (1 - θ) (a + θ b))
/// ```
///
/// A stretch where the state and its derivative are constant interpolates to
/// exactly that constant.
#[derive(Debug, Clone)]
pub struct Solution {
    method: Method,
    dimension: usize,

    /// Step boundaries: the start time followed by the end of every step.
    times: Vec<f64>,

    /// `dimension` values per step boundary.
    states: Vec<f64>,

    /// Derivatives matching `states`.
    rates: Vec<f64>,

    stats: Stats,
}

impl Solution {
    pub(super) fn new(start: f64, state: &[f64], rate: &[f64]) -> Self {
        Self {
            method: Method::default(),
            dimension: state.len(),
            times: vec![start],
            states: state.to_vec(),
            rates: rate.to_vec(),
            stats: Stats::default(),
        }
    }

    /// Appends an accepted step ending at `time`.
    pub(super) fn push_step(&mut self, time: f64, state: &[f64], rate: &[f64]) {
        debug_assert_eq!(state.len(), self.dimension);
        self.times.push(time);
        self.states.extend_from_slice(state);
        self.rates.extend_from_slice(rate);
    }

    /// Returns the time of the last recorded step.
    pub(super) fn end(&self) -> f64 {
        self.times[self.times.len() - 1]
    }

    /// Pins the last step boundary to `end`.
    pub(super) fn close(&mut self, end: f64) {
        let last = self.times.len() - 1;
        if last > 0 {
            self.times[last] = end;
        }
    }

    pub(super) fn finish(self, method: Method, stats: Stats) -> Self {
        Self {
            method,
            stats,
            ..self
        }
    }

    /// Returns the method that produced this solution.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the work counters for the integration.
    #[must_use]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Returns the step boundaries, from the start time to the end time.
    #[must_use]
    pub fn step_times(&self) -> &[f64] {
        &self.times
    }

    /// Returns the state at the end of the span.
    #[must_use]
    pub fn final_state(&self) -> &[f64] {
        let last = self.times.len() - 1;
        &self.states[last * self.dimension..]
    }

    fn check(&self, time: f64) -> Result<(), OutOfSpan> {
        if self.contains(time) {
            Ok(())
        } else {
            let [start, end] = self.span();
            Err(OutOfSpan { time, start, end })
        }
    }

    /// Locates the step containing `time` and its normalized position `θ`.
    fn locate(&self, time: f64) -> (usize, f64) {
        let steps = self.times.len() - 1;
        if steps == 0 {
            return (0, 0.0);
        }
        let step = self
            .times
            .partition_point(|&t| t <= time)
            .saturating_sub(1)
            .min(steps - 1);
        let start = self.times[step];
        let width = self.times[step + 1] - start;
        (step, (time - start) / width)
    }

    fn evaluate(&self, step: usize, theta: f64, index: usize) -> f64 {
        let n = self.dimension;
        let (first, second) = (step * n + index, (step + 1) * n + index);
        let y0 = self.states[first];
        if theta == 0.0 {
            return y0;
        }
        let y1 = self.states[second];
        if theta == 1.0 {
            return y1;
        }

        let h = self.times[step + 1] - self.times[step];
        let delta = y1 - y0;
        let a = h * self.rates[first] - delta;
        let b = delta - h * self.rates[second] - a;
        y0 + theta * (delta + (1.0 - theta) * (a + theta * b))
    }
}

impl DenseOutput for Solution {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn span(&self) -> [f64; 2] {
        [self.times[0], self.end()]
    }

    fn interpolate_into(&self, time: f64, out: &mut [f64]) -> Result<(), OutOfSpan> {
        self.check(time)?;
        let (step, theta) = self.locate(time);
        for (index, value) in out.iter_mut().enumerate().take(self.dimension) {
            *value = self.evaluate(step, theta, index);
        }
        Ok(())
    }

    fn component(&self, time: f64, index: usize) -> Result<f64, OutOfSpan> {
        assert!(index < self.dimension, "component index out of range");
        self.check(time)?;
        let (step, theta) = self.locate(time);
        Ok(self.evaluate(step, theta, index))
    }
}
