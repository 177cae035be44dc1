mod common;

use approx::assert_relative_eq;
use seirsim::{Block, Outcome, Parameters, QueryError, Scale, SeirModel};

use common::{argmax, assert_non_decreasing, column, days, parameters};

#[test]
fn zero_epidemic_has_no_outcomes() {
    let model = SeirModel::new(&parameters()).unwrap();
    let initial = model.initial_state(1.0, 0.0, 0.0, Scale::Fractions).unwrap();

    let outcomes = model.run(&initial, 100.0, &days(100)).unwrap();

    for outcome in [
        Outcome::Exposed,
        Outcome::Infectious,
        Outcome::Removed,
        Outcome::CumulativeInfections,
        Outcome::Hospitalized,
        Outcome::Icu,
        Outcome::CumulativeDeaths,
    ] {
        assert!(
            outcomes.series(outcome).iter().all(|&v| v == 0.0),
            "{outcome:?} is not zero"
        );
    }
    assert!(outcomes.series(Outcome::Susceptible).iter().all(|&v| v == 1e6));
}

#[test]
fn deaths_lag_the_onset_flow() {
    let (lag, probability, exposed) = (5_usize, 0.2, 1000.0);
    let model = SeirModel::new(&Parameters {
        initial_r0: 0.0,
        population: 1e4.into(),
        death_probability: probability.into(),
        death_lag_from_onset: (lag as f64).into(),
        ..parameters()
    })
    .unwrap();
    let initial = model.initial_state(1e4 - exposed, exposed, 0.0, Scale::Counts).unwrap();

    let outcomes = model.run(&initial, 30.0, &days(31)).unwrap();
    let infections = column(&outcomes, Outcome::CumulativeInfections);
    let deaths = column(&outcomes, Outcome::CumulativeDeaths);

    // Before t = 0 the onset flow is that of the initial state.
    let onset = exposed / 3.0;
    for (k, &death) in deaths.iter().enumerate() {
        let expected = if k < lag {
            probability * (k + 1) as f64 * onset
        } else {
            probability * (lag as f64 * onset + infections[k - lag])
        };
        assert_relative_eq!(death, expected, max_relative = 1e-12);
    }

    // With nobody infected, onset decays with the incubation period.
    let analytic: f64 = (0..=10).map(|m| onset * (-f64::from(m) / 3.0).exp()).sum();
    assert_relative_eq!(infections[10], analytic, max_relative = 1e-5);
}

#[test]
fn hospital_and_icu_use_their_own_stay_windows() {
    let model = SeirModel::new(&Parameters {
        initial_r0: 0.0,
        population: 1e4.into(),
        hospitalization_duration: 21.0.into(),
        hospitalization_lag_from_onset: 0.0.into(),
        icu_duration: 3.0.into(),
        icu_lag_from_onset: 0.0.into(),
        ..parameters()
    })
    .unwrap();
    let initial = model.initial_state(9e3, 1e3, 0.0, Scale::Counts).unwrap();

    let outcomes = model.run(&initial, 60.0, &days(61)).unwrap();
    let onset: Vec<f64> = column(&outcomes, Outcome::Exposed)
        .iter()
        .map(|exposed| exposed / 3.0)
        .collect();
    let window = |k: usize, half: usize| onset[k - half..=k + half].iter().sum::<f64>();

    let hospitalized = column(&outcomes, Outcome::Hospitalized);
    let icu = column(&outcomes, Outcome::Icu);
    for k in 10..=50 {
        assert_relative_eq!(icu[k], 0.001 * window(k, 1), max_relative = 1e-12);
        assert_relative_eq!(hospitalized[k], 0.01 * window(k, 10), max_relative = 1e-12);
    }
}

#[test]
fn cumulative_outcomes_never_decrease() {
    let model = SeirModel::new(&Parameters {
        population: vec![6e5, 3e5, 1e5].into(),
        compartments: Some(vec!["0-29".into(), "30-59".into(), "60+".into()]),
        death_probability: vec![0.001, 0.01, 0.1].into(),
        ..parameters()
    })
    .unwrap();
    let initial = model.initial_state(0.999, 0.0005, 0.0005, Scale::Fractions).unwrap();

    let outcomes = model.run(&initial, 150.0, &days(150)).unwrap();

    let cumulative = [
        Outcome::CumulativeInfections,
        Outcome::CumulativeDeaths,
        Outcome::Removed,
    ];
    for compartment in 0..3 {
        for outcome in cumulative {
            assert_non_decreasing(&outcomes.compartment(outcome, compartment).to_vec());
        }
    }
    let deaths = outcomes.series(Outcome::CumulativeDeaths);
    assert!(deaths[[149, 2]] > deaths[[149, 0]]);
}

#[test]
fn end_to_end_epidemic_has_the_expected_shape() {
    let model = SeirModel::new(&parameters()).unwrap();
    let initial = model.initial_state(0.99, 0.005, 0.005, Scale::Fractions).unwrap();

    let outcomes = model.run(&initial, 200.0, &days(200)).unwrap();
    assert_eq!(outcomes.len(), 200);
    assert_eq!(outcomes.labels(), ["All"]);

    let infectious = column(&outcomes, Outcome::Infectious);
    let peak = argmax(&infectious);
    assert!(peak > 0 && peak < 199);
    assert_non_decreasing(&infectious[..=peak]);

    let hospitalized = column(&outcomes, Outcome::Hospitalized);
    let most = hospitalized.iter().copied().fold(0.0, f64::max);
    assert!(hospitalized[0] < 0.1 * most);
    assert_non_decreasing(&hospitalized[..=20]);
    assert_non_decreasing(&hospitalized[..=argmax(&hospitalized)]);

    let icu = column(&outcomes, Outcome::Icu);
    assert!(icu[60] > icu[0]);

    let deaths = column(&outcomes, Outcome::CumulativeDeaths);
    assert!(deaths[0] < 0.01 * deaths[199]);

    // Most of the population ends up infected.
    let removed = column(&outcomes, Outcome::Removed);
    assert!(removed[199] > 5e5);
}

#[test]
fn totals_sum_compartments() {
    let model = SeirModel::new(&Parameters {
        population: vec![2.5e6, 1e6].into(),
        ..parameters()
    })
    .unwrap();
    let initial = model.initial_state(0.99, 0.005, 0.005, Scale::Fractions).unwrap();

    let outcomes = model.run(&initial, 50.0, &days(50)).unwrap();
    let total = outcomes.total(Outcome::Hospitalized);

    for k in [0, 25, 49] {
        let parts = outcomes.compartment(Outcome::Hospitalized, 0)[k]
            + outcomes.compartment(Outcome::Hospitalized, 1)[k];
        assert_relative_eq!(total[k], parts);
    }
}

#[test]
fn queries_before_zero_return_the_initial_state() {
    let model = SeirModel::new(&parameters()).unwrap();
    let initial = model.initial_state(0.99, 0.005, 0.005, Scale::Fractions).unwrap();
    let trajectory = model.simulate(&initial, 10.0).unwrap();

    assert_eq!(trajectory.state_at(-3.0).unwrap(), initial.values());
    assert_eq!(
        trajectory.value(-27.0, Block::Exposed, 0).unwrap(),
        initial.block(Block::Exposed)[0]
    );
    assert_eq!(trajectory.horizon(), 10.0);
    assert!(trajectory.stats().accepted >= 20);
}

#[test]
fn queries_outside_the_trajectory_are_errors() {
    let model = SeirModel::new(&parameters()).unwrap();
    let initial = model.initial_state(0.99, 0.005, 0.005, Scale::Fractions).unwrap();
    let trajectory = model.simulate(&initial, 10.0).unwrap();

    assert!(matches!(
        model.evaluate(&trajectory, &[0.0, 10.5]),
        Err(QueryError::BeyondHorizon { time, horizon }) if time == 10.5 && horizon == 10.0
    ));
    assert!(matches!(
        trajectory.state_at(f64::NAN),
        Err(QueryError::NonFiniteTime { .. })
    ));

    let pair = SeirModel::new(&Parameters {
        population: vec![5e5, 5e5].into(),
        ..parameters()
    })
    .unwrap();
    assert!(matches!(
        pair.evaluate(&trajectory, &[1.0]),
        Err(QueryError::CompartmentMismatch { expected: 2, found: 1 })
    ));
}

#[test]
fn no_query_times_give_empty_series() {
    let model = SeirModel::new(&parameters()).unwrap();
    let initial = model.initial_state(0.99, 0.005, 0.005, Scale::Fractions).unwrap();

    let outcomes = model.run(&initial, 10.0, &[]).unwrap();

    assert!(outcomes.is_empty());
    assert_eq!(outcomes.series(Outcome::Icu).dim(), (0, 1));
}
