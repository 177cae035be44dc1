use std::error::Error as StdError;

use ode_solvers::dop_shared::IntegrationError;
use thiserror::Error;

/// Errors that can occur during integration.
///
/// Every variant is fatal: the solver never returns a partial trajectory.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid time span [{start}, {end}]: bounds must be finite with start < end")]
    InvalidSpan { start: f64, end: f64 },

    #[error("initial state has {found} values but the system has {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("non-finite state at t = {time}")]
    NonFinite { time: f64 },

    #[error("integration stopped at t = {time} before reaching {end}")]
    Incomplete { time: f64, end: f64 },

    #[error(transparent)]
    Integration(#[from] IntegrationError),

    #[error("system derivative failed at t = {time}")]
    System {
        time: f64,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    pub(crate) fn system<E: StdError + Send + Sync + 'static>(time: f64, err: E) -> Self {
        Self::System {
            time,
            source: Box::new(err),
        }
    }
}
