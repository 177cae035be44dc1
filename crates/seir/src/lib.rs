//! A multi-compartment SEIR epidemic model with lagged clinical outcomes.
//!
//! The population is split into compartments, such as age bands, that mix
//! through a contact matrix. Each compartment moves people from susceptible
//! (S) to exposed (E), infectious (I) and removed (R). From the simulated
//! onset flow the model derives hospital occupancy, ICU occupancy and
//! cumulative deaths, each lagged from onset per compartment.
//!
//! Data flows one way:
//!
//! - [`Parameters`] are validated into a [`CompartmentConfig`]
//! - the [`InfectivityMatrix`] is calibrated to the target R0
//! - [`SeirDynamics`] is the rate law, with optional [`Restrictions`] and
//!   [`ImportedCases`] strategies
//! - [`SeirModel::simulate`] integrates an [`InitialState`] into a
//!   [`Trajectory`]
//! - [`SeirModel::evaluate`] derives an [`OutcomeSeries`] from it
//!
//! Deaths are a downstream statistic and never feed back into the dynamics.

mod compartments;
mod contacts;
mod error;
mod importation;
mod law;
mod model;
mod outcomes;
mod parameters;
mod restrictions;
mod simulation;
mod state;

pub use compartments::{CompartmentConfig, DEFAULT_LABEL, Pathway};
pub use contacts::{ContactMatrix, InfectivityMatrix};
pub use error::{
    ConfigError, Error, InitialStateError, LawError, QueryError, SimulationError, WindowError,
};
pub use importation::{ConstantImportation, ImportedCases, Importation, NoImportedCases};
pub use law::SeirDynamics;
pub use model::{DEFAULT_MAX_STEP, SeirModel, default_solver_config};
pub use outcomes::{Outcome, OutcomeSeries, boxcar_same, window_width};
pub use parameters::{Parameters, Value};
pub use restrictions::{Multiplier, NoRestrictions, RestrictionSchedule, Restrictions, Window};
pub use simulation::Trajectory;
pub use state::{Block, InitialState, Scale};

pub use seirsim_solvers::runge_kutta;
