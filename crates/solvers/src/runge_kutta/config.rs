use thiserror::Error;

use super::Method;

/// Configuration for the adaptive Dormand–Prince solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    method: Method,
    rel_tol: f64,
    abs_tol: f64,
    max_step: f64,
    initial_step: Option<f64>,
    max_steps: u32,
}

/// Errors that can occur when validating a solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rel_tol must be finite and positive")]
    RelTol,

    #[error("abs_tol must be finite and non-negative")]
    AbsTol,

    #[error("max_step must be positive")]
    MaxStep,

    #[error("initial_step must be finite, positive and not above max_step")]
    InitialStep,

    #[error("max_steps must be at least one")]
    MaxSteps,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(Method::Dop853, 1e-6, 1e-9, f64::INFINITY).unwrap()
    }
}

impl Config {
    /// Default limit on the number of steps.
    pub const DEFAULT_MAX_STEPS: u32 = 100_000;

    /// Creates a new config with validated tolerances and step bound.
    ///
    /// The step limit defaults to [`Config::DEFAULT_MAX_STEPS`] and the
    /// initial step is chosen automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is out of range or `max_step` is not
    /// positive. `max_step` may be infinite.
    pub fn new(
        method: Method,
        rel_tol: f64,
        abs_tol: f64,
        max_step: f64,
    ) -> Result<Self, ConfigError> {
        if !rel_tol.is_finite() || rel_tol <= 0.0 {
            return Err(ConfigError::RelTol);
        }
        if !abs_tol.is_finite() || abs_tol < 0.0 {
            return Err(ConfigError::AbsTol);
        }
        if max_step.is_nan() || max_step <= 0.0 {
            return Err(ConfigError::MaxStep);
        }

        Ok(Self {
            method,
            rel_tol,
            abs_tol,
            max_step,
            initial_step: None,
            max_steps: Self::DEFAULT_MAX_STEPS,
        })
    }

    /// Returns a copy using a different integration method.
    #[must_use]
    pub fn with_method(self, method: Method) -> Self {
        Self { method, ..self }
    }

    /// Returns a copy with a different maximum step.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_step` is not positive or falls below the
    /// configured initial step.
    pub fn with_max_step(self, max_step: f64) -> Result<Self, ConfigError> {
        if max_step.is_nan() || max_step <= 0.0 {
            return Err(ConfigError::MaxStep);
        }
        if self.initial_step.is_some_and(|h| h > max_step) {
            return Err(ConfigError::InitialStep);
        }
        Ok(Self { max_step, ..self })
    }

    /// Returns a copy with a fixed first step instead of the automatic guess.
    ///
    /// # Errors
    ///
    /// Returns an error if `initial_step` is not finite and positive or
    /// exceeds the maximum step.
    pub fn with_initial_step(self, initial_step: f64) -> Result<Self, ConfigError> {
        if !initial_step.is_finite() || initial_step <= 0.0 || initial_step > self.max_step {
            return Err(ConfigError::InitialStep);
        }
        Ok(Self {
            initial_step: Some(initial_step),
            ..self
        })
    }

    /// Returns a copy with a different limit on the number of steps.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_steps` is zero.
    pub fn with_max_steps(self, max_steps: u32) -> Result<Self, ConfigError> {
        if max_steps == 0 {
            return Err(ConfigError::MaxSteps);
        }
        Ok(Self { max_steps, ..self })
    }

    /// Returns the integration method.
    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the relative tolerance for the local error estimate.
    #[must_use]
    pub fn rel_tol(&self) -> f64 {
        self.rel_tol
    }

    /// Returns the absolute tolerance for the local error estimate.
    #[must_use]
    pub fn abs_tol(&self) -> f64 {
        self.abs_tol
    }

    /// Returns the largest step the solver may take.
    #[must_use]
    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    /// Returns the fixed first step, if one was set.
    #[must_use]
    pub fn initial_step(&self) -> Option<f64> {
        self.initial_step
    }

    /// Returns the limit on the number of steps.
    #[must_use]
    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = Config::default();

        assert_eq!(config.method(), Method::Dop853);
        assert!(config.max_step().is_infinite());
        assert_eq!(config.max_steps(), Config::DEFAULT_MAX_STEPS);
        assert_eq!(config.initial_step(), None);
    }

    #[test]
    fn rejects_bad_tolerances() {
        assert_eq!(
            Config::new(Method::Dopri5, 0.0, 1e-9, 1.0),
            Err(ConfigError::RelTol)
        );
        assert_eq!(
            Config::new(Method::Dopri5, f64::NAN, 1e-9, 1.0),
            Err(ConfigError::RelTol)
        );
        assert_eq!(
            Config::new(Method::Dopri5, 1e-6, -1.0, 1.0),
            Err(ConfigError::AbsTol)
        );
        assert_eq!(
            Config::new(Method::Dopri5, 1e-6, 1e-9, 0.0),
            Err(ConfigError::MaxStep)
        );
    }

    #[test]
    fn step_bounds_are_consistent() {
        let config = Config::default().with_max_step(0.5).unwrap();

        assert_eq!(config.with_initial_step(0.75), Err(ConfigError::InitialStep));
        assert_eq!(config.with_max_steps(0), Err(ConfigError::MaxSteps));

        let config = config.with_initial_step(0.1).unwrap();
        assert_eq!(config.with_max_step(0.05), Err(ConfigError::InitialStep));
        assert_eq!(config.initial_step(), Some(0.1));
    }

    #[test]
    fn with_method_keeps_tolerances() {
        let config = Config::new(Method::Dop853, 1e-4, 1e-6, 2.0)
            .unwrap()
            .with_method(Method::Dopri5);

        assert_eq!(config.method(), Method::Dopri5);
        assert!((config.rel_tol() - 1e-4).abs() < f64::EPSILON);
        assert!((config.max_step() - 2.0).abs() < f64::EPSILON);
    }
}
