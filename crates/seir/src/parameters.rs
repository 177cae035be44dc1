use ndarray::Array1;

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ContactMatrix};

/// A parameter given either once for every compartment or per compartment.
///
/// Scalars are broadcast to every compartment when the model is built.
/// With the `serde-derive` feature both `2.3` and `[2.3, 2.1]` deserialize.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde-derive", serde(untagged))]
pub enum Value {
    Scalar(f64),
    PerCompartment(Vec<f64>),
}

impl Value {
    /// Returns the number of values if given per compartment.
    #[must_use]
    pub fn per_compartment_len(&self) -> Option<usize> {
        match self {
            Value::Scalar(_) => None,
            Value::PerCompartment(values) => Some(values.len()),
        }
    }

    /// Expands the value to exactly `n` entries.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::LengthMismatch`] if a per-compartment value does
    /// not have `n` entries.
    pub fn broadcast(
        &self,
        parameter: &'static str,
        n: usize,
    ) -> Result<Array1<f64>, ConfigError> {
        match self {
            Value::Scalar(value) => Ok(Array1::from_elem(n, *value)),
            Value::PerCompartment(values) if values.len() == n => Ok(Array1::from(values.clone())),
            Value::PerCompartment(values) => Err(ConfigError::LengthMismatch {
                parameter,
                expected: n,
                found: values.len(),
            }),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(value)
    }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self {
        Value::PerCompartment(values)
    }
}

impl From<&[f64]> for Value {
    fn from(values: &[f64]) -> Self {
        Value::PerCompartment(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for Value {
    fn from(values: [f64; N]) -> Self {
        Value::PerCompartment(values.to_vec())
    }
}

impl From<Array1<f64>> for Value {
    fn from(values: Array1<f64>) -> Self {
        Value::PerCompartment(values.to_vec())
    }
}

/// Disease and population parameters of a model.
///
/// This is the outward-facing configuration. It is validated and normalized
/// into a [`CompartmentConfig`](crate::CompartmentConfig) when a
/// [`SeirModel`](crate::SeirModel) is built.
///
/// Periods, durations and lags are in days.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
pub struct Parameters {
    /// Mean time from exposure to becoming infectious.
    pub incubation_period: Value,

    /// Mean time a case stays infectious.
    pub infectious_period: Value,

    /// Basic reproduction number the transmission rate is calibrated to.
    #[cfg_attr(
        feature = "serde-derive",
        serde(rename = "initial_R0", alias = "initial_r0")
    )]
    pub initial_r0: f64,

    pub hospitalization_probability: Value,
    pub hospitalization_duration: Value,
    pub hospitalization_lag_from_onset: Value,

    pub icu_probability: Value,
    pub icu_duration: Value,
    pub icu_lag_from_onset: Value,

    pub death_probability: Value,
    pub death_lag_from_onset: Value,

    /// Number of people, in total (one compartment) or per compartment.
    pub population: Value,

    /// Compartment labels, such as age bands.
    ///
    /// Without labels the compartment count follows the population.
    #[cfg_attr(feature = "serde-derive", serde(default))]
    pub compartments: Option<Vec<String>>,

    /// Daily contacts between compartments; homogeneous mixing if absent.
    #[cfg_attr(
        feature = "serde-derive",
        serde(default, rename = "contacts_matrix", alias = "contacts")
    )]
    pub contacts: Option<ContactMatrix>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_broadcast_to_every_compartment() {
        let value = Value::from(2.5);
        assert_eq!(value.broadcast("x", 3).unwrap().to_vec(), vec![2.5; 3]);
        assert_eq!(value.per_compartment_len(), None);
    }

    #[test]
    fn per_compartment_values_must_match_the_count() {
        let value = Value::from([1.0, 2.0]);
        assert_eq!(value.broadcast("x", 2).unwrap().to_vec(), vec![1.0, 2.0]);
        assert_eq!(
            value.broadcast("incubation_period", 3),
            Err(ConfigError::LengthMismatch {
                parameter: "incubation_period",
                expected: 3,
                found: 2,
            })
        );
    }

    #[cfg(feature = "serde-derive")]
    #[test]
    fn values_deserialize_from_numbers_or_lists() {
        let scalar: Value = serde_json::from_str("2.3").unwrap();
        let vector: Value = serde_json::from_str("[2.3, 2.1]").unwrap();

        assert_eq!(scalar, Value::Scalar(2.3));
        assert_eq!(vector, Value::PerCompartment(vec![2.3, 2.1]));
    }
}
