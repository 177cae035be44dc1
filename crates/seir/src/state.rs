use ndarray::{Array1, ArrayView1};

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

use crate::{CompartmentConfig, InitialStateError, Value};

/// How initial S, E and I values are given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(rename_all = "snake_case"))]
pub enum Scale {
    /// Numbers of people. A scalar is split evenly across compartments.
    #[default]
    Counts,

    /// Fractions of each compartment's population.
    Fractions,
}

/// One of the four blocks of the state vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Block {
    Susceptible,
    Exposed,
    Infectious,
    Removed,
}

impl Block {
    /// All blocks in state vector order.
    pub const ALL: [Block; 4] = [
        Block::Susceptible,
        Block::Exposed,
        Block::Infectious,
        Block::Removed,
    ];

    /// Returns the position of `compartment` of this block in a state vector
    /// with `n` compartments.
    #[must_use]
    pub fn index(self, n: usize, compartment: usize) -> usize {
        self as usize * n + compartment
    }

    fn name(self) -> &'static str {
        match self {
            Block::Susceptible => "susceptible",
            Block::Exposed => "exposed",
            Block::Infectious => "infectious",
            Block::Removed => "removed",
        }
    }
}

/// The state of a model at `t = 0`.
///
/// The state vector concatenates the S, E, I and R blocks, each with one
/// entry per compartment. R starts at zero and S + E + I never exceeds the
/// population of a compartment.
///
/// Built by [`SeirModel::initial_state`](crate::SeirModel::initial_state).
#[derive(Debug, Clone, PartialEq)]
pub struct InitialState {
    values: Vec<f64>,
    compartments: usize,
}

/// Relative slack allowed when S + E + I is compared against the population.
const POPULATION_SLACK: f64 = 1e-9;

impl InitialState {
    pub(crate) fn new(
        config: &CompartmentConfig,
        susceptible: &Value,
        exposed: &Value,
        infectious: &Value,
        scale: Scale,
    ) -> Result<Self, InitialStateError> {
        let n = config.len();
        let population = config.population();

        let s = resolve(Block::Susceptible, susceptible, scale, population)?;
        let e = resolve(Block::Exposed, exposed, scale, population)?;
        let i = resolve(Block::Infectious, infectious, scale, population)?;

        let total = &s + &e + &i;
        let exceeded = total
            .iter()
            .zip(population)
            .position(|(total, population)| total - population > POPULATION_SLACK * population);
        if let Some(compartment) = exceeded {
            return Err(InitialStateError::ExceedsPopulation {
                compartment,
                total: total[compartment],
                population: population[compartment],
            });
        }

        let removed = Array1::zeros(n);
        let values = [s, e, i, removed].iter().flatten().copied().collect();

        Ok(Self {
            values,
            compartments: n,
        })
    }

    /// Returns the number of compartments.
    #[must_use]
    pub fn compartments(&self) -> usize {
        self.compartments
    }

    /// Returns the full state vector.
    #[must_use]
    pub fn values(&self) -> ArrayView1<'_, f64> {
        ArrayView1::from(self.values.as_slice())
    }

    /// Returns one block of the state vector.
    #[must_use]
    pub fn block(&self, block: Block) -> ArrayView1<'_, f64> {
        let n = self.compartments;
        let start = block.index(n, 0);
        ArrayView1::from(&self.values[start..start + n])
    }

    pub(crate) fn as_slice(&self) -> &[f64] {
        &self.values
    }
}

fn resolve(
    block: Block,
    value: &Value,
    scale: Scale,
    population: &Array1<f64>,
) -> Result<Array1<f64>, InitialStateError> {
    let n = population.len();
    let name = block.name();

    let raw = match value {
        Value::Scalar(v) => Array1::from_elem(1, *v),
        Value::PerCompartment(values) if values.len() == n => Array1::from(values.clone()),
        Value::PerCompartment(values) => {
            return Err(InitialStateError::LengthMismatch {
                block: name,
                expected: n,
                found: values.len(),
            });
        }
    };

    if let Some((index, &value)) = raw
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite() || **v < 0.0)
    {
        return Err(InitialStateError::InvalidValue {
            block: name,
            index,
            value,
        });
    }

    Ok(match (value, scale) {
        (Value::Scalar(v), Scale::Counts) => Array1::from_elem(n, v / n as f64),
        (Value::Scalar(v), Scale::Fractions) => population * *v,
        (Value::PerCompartment(_), Scale::Counts) => raw,
        (Value::PerCompartment(_), Scale::Fractions) => raw * population,
    })
}
