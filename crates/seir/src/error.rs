use thiserror::Error;

use seirsim_solvers::runge_kutta;

/// Errors raised while validating model parameters.
///
/// Configuration problems are reported when the model is built; nothing is
/// silently broadcast or truncated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("the model needs at least one compartment")]
    NoCompartments,

    #[error("{parameter} has {found} values but there are {expected} compartments")]
    LengthMismatch {
        parameter: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{parameter}[{index}] = {value}: must be {requirement}")]
    InvalidValue {
        parameter: &'static str,
        index: usize,
        value: f64,
        requirement: &'static str,
    },

    #[error("initial_R0 = {value}: must be finite and non-negative")]
    InvalidR0 { value: f64 },

    #[error("a scalar population needs exactly one compartment, found {compartments}")]
    ScalarPopulation { compartments: usize },

    #[error("contact matrix row {row} has {found} columns, expected {expected}")]
    RaggedContacts {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("contact matrix is {rows}x{cols}, expected {expected}x{expected}")]
    ContactShape {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("contact matrix entry ({row}, {col}) = {value}: must be finite and non-negative")]
    InvalidContact { row: usize, col: usize, value: f64 },

    #[error("contact matrix has no population-weighted contacts")]
    NoContacts,

    #[error("restriction matrix is {rows}x{cols}, expected {expected}x{expected}")]
    RestrictionShape {
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("imported {block} cases have {found} values, expected {expected}")]
    ImportationShape {
        block: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Errors raised when building time windows for schedules and importations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WindowError {
    #[error("window [{start}, {end}) must have finite bounds with start < end")]
    Empty { start: f64, end: f64 },

    #[error("windows overlap: [{}, {}) and [{}, {})", first[0], first[1], second[0], second[1])]
    Overlap { first: [f64; 2], second: [f64; 2] },
}

/// Errors raised while building an initial state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitialStateError {
    #[error("{block} has {found} values but there are {expected} compartments")]
    LengthMismatch {
        block: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{block}[{index}] = {value}: must be finite and non-negative")]
    InvalidValue {
        block: &'static str,
        index: usize,
        value: f64,
    },

    #[error(
        "compartment {compartment} starts with {total} people in S, E and I but has a population of {population}"
    )]
    ExceedsPopulation {
        compartment: usize,
        total: f64,
        population: f64,
    },
}

/// Errors raised by the derivative law during integration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LawError {
    #[error("restriction at t = {time} is {rows}x{cols}, expected {expected}x{expected}")]
    RestrictionShape {
        time: f64,
        expected: usize,
        rows: usize,
        cols: usize,
    },

    #[error("imported {block} cases at t = {time} have {found} values, expected {expected}")]
    ImportationShape {
        time: f64,
        block: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Errors raised when running a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("simulation horizon must be finite and positive, got {days}")]
    InvalidHorizon { days: f64 },

    #[error("initial state has {found} compartments but the model has {expected}")]
    CompartmentMismatch { expected: usize, found: usize },

    #[error("integration failed")]
    Integration(#[from] runge_kutta::Error),
}

/// Errors raised when querying a trajectory.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    #[error("query time {time} is not finite")]
    NonFiniteTime { time: f64 },

    #[error("query time {time} is beyond the simulated horizon of {horizon} days")]
    BeyondHorizon { time: f64, horizon: f64 },

    #[error("trajectory has {found} compartments but the model has {expected}")]
    CompartmentMismatch { expected: usize, found: usize },
}

/// Any error produced by [`SeirModel::run`](crate::SeirModel::run).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Query(#[from] QueryError),
}
