#![allow(dead_code)]

use seirsim::{Outcome, OutcomeSeries, Parameters};

/// A single-compartment scenario: a fast-spreading disease in a million people.
pub fn parameters() -> Parameters {
    Parameters {
        incubation_period: 3.0.into(),
        infectious_period: 7.0.into(),
        initial_r0: 2.3,
        hospitalization_probability: 0.01.into(),
        hospitalization_duration: 21.0.into(),
        hospitalization_lag_from_onset: 6.0.into(),
        icu_probability: 0.001.into(),
        icu_duration: 7.0.into(),
        icu_lag_from_onset: 21.0.into(),
        death_probability: 0.1.into(),
        death_lag_from_onset: 27.0.into(),
        population: 1e6.into(),
        compartments: None,
        contacts: None,
    }
}

/// Whole days `0, 1, …, days - 1`.
pub fn days(days: u32) -> Vec<f64> {
    (0..days).map(f64::from).collect()
}

/// Returns a single-compartment series as a plain vector.
pub fn column(outcomes: &OutcomeSeries, outcome: Outcome) -> Vec<f64> {
    outcomes.compartment(outcome, 0).to_vec()
}

/// Asserts that `values` never decrease, allowing for rounding.
pub fn assert_non_decreasing(values: &[f64]) {
    let scale = values.iter().fold(0.0_f64, |max, v| max.max(v.abs()));
    for (k, pair) in values.windows(2).enumerate() {
        assert!(
            pair[1] >= pair[0] - 1e-12 * scale,
            "decreases at index {k}: {} -> {}",
            pair[0],
            pair[1]
        );
    }
}

/// Returns the index of the largest value.
pub fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(best, max), (k, &v)| {
            if v > max { (k, v) } else { (best, max) }
        })
        .0
}
