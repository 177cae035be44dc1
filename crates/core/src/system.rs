/// Defines a system of ordinary differential equations `dy/dt = f(t, y)`.
///
/// The state is a flat slice of `dimension()` values. Solvers call
/// [`OdeSystem::derivative`] many times per step at times and states of their
/// own choosing, so implementations should be pure and avoid allocating.
pub trait OdeSystem {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the number of state variables.
    fn dimension(&self) -> usize;

    /// Writes the rate of change of `state` at `time` into `rate`.
    ///
    /// Both slices have length [`OdeSystem::dimension`]. Implementations must
    /// overwrite every element of `rate`.
    ///
    /// # Errors
    ///
    /// Returns [`Self::Error`] if the derivative cannot be computed.
    fn derivative(&self, time: f64, state: &[f64], rate: &mut [f64]) -> Result<(), Self::Error>;
}

impl<S: OdeSystem + ?Sized> OdeSystem for &S {
    type Error = S::Error;

    fn dimension(&self) -> usize {
        (**self).dimension()
    }

    fn derivative(&self, time: f64, state: &[f64], rate: &mut [f64]) -> Result<(), Self::Error> {
        (**self).derivative(time, state, rate)
    }
}
