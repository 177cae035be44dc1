use thiserror::Error;

/// Error returned when a trajectory is queried outside the span it covers.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("time {time} is outside the solution span [{start}, {end}]")]
pub struct OutOfSpan {
    pub time: f64,
    pub start: f64,
    pub end: f64,
}

/// A continuously queryable trajectory of an ODE system.
///
/// Unlike a fixed grid of samples, a dense output can be evaluated at any time
/// within its span. This is what lets downstream code ask for the state at
/// arbitrary, non-grid times such as `t - lag`.
pub trait DenseOutput {
    /// Returns the number of state variables.
    fn dimension(&self) -> usize;

    /// Returns the covered time span as `[start, end]`.
    fn span(&self) -> [f64; 2];

    /// Writes the interpolated state at `time` into `out`.
    ///
    /// `out` has length [`DenseOutput::dimension`].
    ///
    /// # Errors
    ///
    /// Returns [`OutOfSpan`] if `time` is not within [`DenseOutput::span`].
    fn interpolate_into(&self, time: f64, out: &mut [f64]) -> Result<(), OutOfSpan>;

    /// Returns a single interpolated state variable at `time`.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfSpan`] if `time` is not within [`DenseOutput::span`].
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than [`DenseOutput::dimension`].
    fn component(&self, time: f64, index: usize) -> Result<f64, OutOfSpan>;

    /// Returns the interpolated state at `time` as a new vector.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfSpan`] if `time` is not within [`DenseOutput::span`].
    fn interpolate(&self, time: f64) -> Result<Vec<f64>, OutOfSpan> {
        let mut out = vec![0.0; self.dimension()];
        self.interpolate_into(time, &mut out)?;
        Ok(out)
    }

    /// Returns `true` if `time` lies within the covered span.
    fn contains(&self, time: f64) -> bool {
        let [start, end] = self.span();
        start <= time && time <= end
    }
}
