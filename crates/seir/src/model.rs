use log::debug;
use seirsim_solvers::runge_kutta::{Config, Method};

use crate::{
    CompartmentConfig, ConfigError, ContactMatrix, Error, ImportedCases, InfectivityMatrix,
    InitialState, InitialStateError, NoImportedCases, NoRestrictions, OutcomeSeries, Parameters,
    QueryError, Restrictions, Scale, SeirDynamics, SimulationError, Trajectory, Value, outcomes,
    simulation,
};

/// Longest integration step, in days, used by [`SeirModel::simulate`].
pub const DEFAULT_MAX_STEP: f64 = 0.5;

/// Returns the integrator settings used by [`SeirModel::simulate`].
///
/// Dormand–Prince 8(5,3) with the solver's default tolerances and steps of at
/// most [`DEFAULT_MAX_STEP`] days.
#[must_use]
pub fn default_solver_config() -> Config {
    // Known-good values, unwrap is safe
    Config::default()
        .with_method(Method::Dop853)
        .with_max_step(DEFAULT_MAX_STEP)
        .unwrap()
}

/// Returns [`default_solver_config`] with a step limit that fits `days`.
///
/// The limit leaves room for every step at [`DEFAULT_MAX_STEP`] twice over,
/// and never drops below the solver's default.
fn solver_config_for(days: f64) -> Config {
    let config = default_solver_config();
    let needed = (2.0 * days / DEFAULT_MAX_STEP).ceil();
    if needed.is_finite() && needed > f64::from(config.max_steps()) {
        let limit = needed.min(f64::from(u32::MAX)) as u32;
        // Known-good values, unwrap is safe
        config.with_max_steps(limit).unwrap()
    } else {
        config
    }
}

/// A multi-compartment SEIR epidemic model.
///
/// The model is immutable once built. Running it is a chain of values:
/// [`initial_state`](Self::initial_state) builds an [`InitialState`],
/// [`simulate`](Self::simulate) turns it into a [`Trajectory`], and
/// [`evaluate`](Self::evaluate) derives an [`OutcomeSeries`] from that.
///
/// Restrictions and imported cases are strategies given as type parameters;
/// by default there are none.
///
/// # Examples
///
/// ```
/// use seirsim::{Outcome, Parameters, Scale, SeirModel};
///
/// let model = SeirModel::new(&Parameters {
///     incubation_period: 3.0.into(),
///     infectious_period: 7.0.into(),
///     initial_r0: 2.3,
///     hospitalization_probability: 0.01.into(),
///     hospitalization_duration: 21.0.into(),
///     hospitalization_lag_from_onset: 6.0.into(),
///     icu_probability: 0.001.into(),
///     icu_duration: 7.0.into(),
///     icu_lag_from_onset: 21.0.into(),
///     death_probability: 0.1.into(),
///     death_lag_from_onset: 27.0.into(),
///     population: vec![2.5e6, 1e6].into(),
///     compartments: Some(vec!["young".into(), "old".into()]),
///     contacts: None,
/// })?;
///
/// let initial = model.initial_state(0.99, 0.005, 0.005, Scale::Fractions)?;
/// let days: Vec<f64> = (0..100).map(f64::from).collect();
/// let outcomes = model.run(&initial, 100.0, &days)?;
///
/// let deaths = outcomes.total(Outcome::CumulativeDeaths);
/// assert!(deaths[99] > deaths[0]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct SeirModel<R = NoRestrictions, I = NoImportedCases> {
    config: CompartmentConfig,
    infectivity: InfectivityMatrix,
    restrictions: R,
    imported: I,
}

impl SeirModel {
    /// Builds a model without restrictions or imported cases.
    ///
    /// Scalars are broadcast to every compartment and the infectivity matrix
    /// is calibrated to `initial_r0`, using homogeneous mixing if no contact
    /// matrix is given.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if any parameter is invalid.
    pub fn new(parameters: &Parameters) -> Result<Self, ConfigError> {
        let config = CompartmentConfig::new(parameters)?;
        let contacts = match &parameters.contacts {
            Some(contacts) => contacts.clone(),
            None => ContactMatrix::homogeneous(config.len()),
        };
        let infectivity = InfectivityMatrix::calibrate(&config, &contacts, parameters.initial_r0)?;

        debug!(
            "built SEIR model with {} compartments, transmission scale {:.6}",
            config.len(),
            infectivity.scale()
        );

        Ok(Self {
            config,
            infectivity,
            restrictions: NoRestrictions,
            imported: NoImportedCases,
        })
    }
}

impl<R: Restrictions, I: ImportedCases> SeirModel<R, I> {
    /// Replaces the restriction strategy.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the strategy does not fit the model's
    /// compartments.
    pub fn with_restrictions<R2: Restrictions>(
        self,
        restrictions: R2,
    ) -> Result<SeirModel<R2, I>, ConfigError> {
        restrictions.validate(self.config.len())?;
        Ok(SeirModel {
            config: self.config,
            infectivity: self.infectivity,
            restrictions,
            imported: self.imported,
        })
    }

    /// Replaces the imported-cases strategy.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the strategy does not fit the model's
    /// compartments.
    pub fn with_imported_cases<I2: ImportedCases>(
        self,
        imported: I2,
    ) -> Result<SeirModel<R, I2>, ConfigError> {
        imported.validate(self.config.len())?;
        Ok(SeirModel {
            config: self.config,
            infectivity: self.infectivity,
            restrictions: self.restrictions,
            imported,
        })
    }

    /// Returns the validated per-compartment parameters.
    #[must_use]
    pub fn config(&self) -> &CompartmentConfig {
        &self.config
    }

    /// Returns the calibrated infectivity matrix.
    #[must_use]
    pub fn infectivity(&self) -> &InfectivityMatrix {
        &self.infectivity
    }

    #[must_use]
    pub fn restrictions(&self) -> &R {
        &self.restrictions
    }

    #[must_use]
    pub fn imported_cases(&self) -> &I {
        &self.imported
    }

    /// Returns the derivative law of this model.
    #[must_use]
    pub fn dynamics(&self) -> SeirDynamics<'_, R, I> {
        SeirDynamics::new(
            &self.config,
            &self.infectivity,
            &self.restrictions,
            &self.imported,
        )
    }

    /// Builds the state at `t = 0` with nobody removed.
    ///
    /// With [`Scale::Counts`] values are numbers of people and a scalar is
    /// split evenly across compartments. With [`Scale::Fractions`] values are
    /// fractions of each compartment's population.
    ///
    /// # Errors
    ///
    /// Returns an [`InitialStateError`] if a vector has the wrong length, a
    /// value is negative or non-finite, or S + E + I exceeds a population.
    pub fn initial_state(
        &self,
        susceptible: impl Into<Value>,
        exposed: impl Into<Value>,
        infectious: impl Into<Value>,
        scale: Scale,
    ) -> Result<InitialState, InitialStateError> {
        InitialState::new(
            &self.config,
            &susceptible.into(),
            &exposed.into(),
            &infectious.into(),
            scale,
        )
    }

    /// Integrates the model over `[0, days]` with the default settings.
    ///
    /// The step limit grows with `days`, so long horizons are not cut short.
    ///
    /// # Errors
    ///
    /// Returns a [`SimulationError`] if `days` is not positive and finite,
    /// `initial` belongs to a model with another compartment count, or the
    /// integration fails.
    pub fn simulate(
        &self,
        initial: &InitialState,
        days: f64,
    ) -> Result<Trajectory, SimulationError> {
        self.simulate_with(initial, days, &solver_config_for(days))
    }

    /// Integrates the model over `[0, days]` with custom solver settings.
    ///
    /// # Errors
    ///
    /// Returns a [`SimulationError`] as for [`simulate`](Self::simulate).
    pub fn simulate_with(
        &self,
        initial: &InitialState,
        days: f64,
        solver: &Config,
    ) -> Result<Trajectory, SimulationError> {
        if initial.compartments() != self.config.len() {
            return Err(SimulationError::CompartmentMismatch {
                expected: self.config.len(),
                found: initial.compartments(),
            });
        }
        simulation::simulate(&self.dynamics(), initial, days, solver)
    }

    /// Evaluates every outcome of `trajectory` at `times`.
    ///
    /// Times should be ascending and evenly spaced, typically one per day:
    /// cumulative series sum over samples and occupancy windows count
    /// samples. Lagged queries before `t = 0` use the initial state.
    ///
    /// # Errors
    ///
    /// Returns a [`QueryError`] if a time is non-finite or beyond the
    /// trajectory's horizon, or `trajectory` came from a model with another
    /// compartment count.
    pub fn evaluate(
        &self,
        trajectory: &Trajectory,
        times: &[f64],
    ) -> Result<OutcomeSeries, QueryError> {
        outcomes::extract(&self.config, trajectory, times)
    }

    /// Simulates over `[0, days]` and evaluates the outcomes at `times`.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if either step fails.
    pub fn run(
        &self,
        initial: &InitialState,
        days: f64,
        times: &[f64],
    ) -> Result<OutcomeSeries, Error> {
        let trajectory = self.simulate(initial, days)?;
        Ok(self.evaluate(&trajectory, times)?)
    }
}
