use ndarray::Array1;

use crate::{ConfigError, Parameters, Value};

/// Label used when a model has a single unlabelled compartment.
pub const DEFAULT_LABEL: &str = "All";

/// Validated per-compartment parameters.
///
/// Every vector has exactly one entry per compartment. Built once from
/// [`Parameters`] and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct CompartmentConfig {
    labels: Vec<String>,
    population: Array1<f64>,
    incubation_period: Array1<f64>,
    infectious_period: Array1<f64>,
    hospitalization: Pathway,
    icu: Pathway,
    death: Pathway,
}

/// Probability, lag and duration of one clinical outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Pathway {
    /// Probability that an onset leads to this outcome.
    pub probability: Array1<f64>,

    /// Days from onset to the outcome.
    pub lag: Array1<f64>,

    /// Days spent in the outcome, for occupancy outcomes.
    pub duration: Option<Array1<f64>>,
}

struct Rule {
    requirement: &'static str,
    check: fn(f64) -> bool,
}

const POSITIVE: Rule = Rule {
    requirement: "finite and positive",
    check: |v| v.is_finite() && v > 0.0,
};

const NON_NEGATIVE: Rule = Rule {
    requirement: "finite and non-negative",
    check: |v| v.is_finite() && v >= 0.0,
};

const PROBABILITY: Rule = Rule {
    requirement: "a probability in [0, 1]",
    check: |v| (0.0..=1.0).contains(&v),
};

impl CompartmentConfig {
    /// Normalizes and validates `parameters`.
    ///
    /// The compartment count comes from the labels if given, otherwise from
    /// a per-compartment population, otherwise it is one.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a vector has the wrong length, a value is
    /// out of range, or a scalar population is given for several compartments.
    pub fn new(parameters: &Parameters) -> Result<Self, ConfigError> {
        let labels = resolve_labels(parameters)?;
        let n = labels.len();

        let vector = |parameter, value: &Value, rule: &Rule| {
            let values = value.broadcast(parameter, n)?;
            validate(parameter, &values, rule)?;
            Ok::<_, ConfigError>(values)
        };

        let pathway =
            |names: [&'static str; 3], probability: &Value, lag: &Value, duration: Option<&Value>| {
                Ok::<_, ConfigError>(Pathway {
                    probability: vector(names[0], probability, &PROBABILITY)?,
                    lag: vector(names[1], lag, &NON_NEGATIVE)?,
                    duration: duration
                        .map(|duration| vector(names[2], duration, &POSITIVE))
                        .transpose()?,
                })
            };

        Ok(Self {
            population: vector("population", &parameters.population, &POSITIVE)?,
            incubation_period: vector(
                "incubation_period",
                &parameters.incubation_period,
                &POSITIVE,
            )?,
            infectious_period: vector(
                "infectious_period",
                &parameters.infectious_period,
                &POSITIVE,
            )?,
            hospitalization: pathway(
                [
                    "hospitalization_probability",
                    "hospitalization_lag_from_onset",
                    "hospitalization_duration",
                ],
                &parameters.hospitalization_probability,
                &parameters.hospitalization_lag_from_onset,
                Some(&parameters.hospitalization_duration),
            )?,
            icu: pathway(
                ["icu_probability", "icu_lag_from_onset", "icu_duration"],
                &parameters.icu_probability,
                &parameters.icu_lag_from_onset,
                Some(&parameters.icu_duration),
            )?,
            death: pathway(
                ["death_probability", "death_lag_from_onset", ""],
                &parameters.death_probability,
                &parameters.death_lag_from_onset,
                None,
            )?,
            labels,
        })
    }

    /// Returns the number of compartments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always `false`: a valid configuration has at least one compartment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[must_use]
    pub fn population(&self) -> &Array1<f64> {
        &self.population
    }

    #[must_use]
    pub fn incubation_period(&self) -> &Array1<f64> {
        &self.incubation_period
    }

    #[must_use]
    pub fn infectious_period(&self) -> &Array1<f64> {
        &self.infectious_period
    }

    #[must_use]
    pub fn hospitalization(&self) -> &Pathway {
        &self.hospitalization
    }

    #[must_use]
    pub fn icu(&self) -> &Pathway {
        &self.icu
    }

    #[must_use]
    pub fn death(&self) -> &Pathway {
        &self.death
    }

    /// Returns the population-weighted mean infectious period.
    #[must_use]
    pub fn mean_infectious_period(&self) -> f64 {
        self.population.dot(&self.infectious_period) / self.population.sum()
    }
}

fn resolve_labels(parameters: &Parameters) -> Result<Vec<String>, ConfigError> {
    let labels = match (&parameters.compartments, parameters.population.per_compartment_len()) {
        (Some(labels), _) => labels.clone(),
        (None, None | Some(1)) => vec![DEFAULT_LABEL.to_owned()],
        (None, Some(n)) => (0..n).map(|i| i.to_string()).collect(),
    };

    if labels.is_empty() {
        return Err(ConfigError::NoCompartments);
    }
    if parameters.population.per_compartment_len().is_none() && labels.len() != 1 {
        return Err(ConfigError::ScalarPopulation {
            compartments: labels.len(),
        });
    }
    Ok(labels)
}

fn validate(
    parameter: &'static str,
    values: &Array1<f64>,
    rule: &Rule,
) -> Result<(), ConfigError> {
    match values.iter().position(|&v| !(rule.check)(v)) {
        Some(index) => Err(ConfigError::InvalidValue {
            parameter,
            index,
            value: values[index],
            requirement: rule.requirement,
        }),
        None => Ok(()),
    }
}
