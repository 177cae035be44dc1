//! Clinical outcomes derived from a trajectory.
//!
//! Everything is computed from the onset flow `F_i(t) = E_i(t) / incubation_i`,
//! the rate at which exposed people become infectious, sampled at the
//! caller's query times:
//!
//! - cumulative infections are the running sum of `F`;
//! - hospital and ICU occupancy convolve `p · F(t - lag)` with a centred
//!   boxcar as wide as the stay, in samples;
//! - cumulative deaths are the running sum of `p · F(t - lag)`.
//!
//! Sums and windows count samples, so they only read as daily figures when
//! the query times are ascending and one day apart.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis, s};

use crate::{Block, CompartmentConfig, QueryError, Trajectory, compartments::Pathway};

/// A per-compartment series reported by [`OutcomeSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Susceptible,
    Exposed,
    Infectious,
    Removed,
    CumulativeInfections,
    Hospitalized,
    Icu,
    CumulativeDeaths,
}

impl Outcome {
    pub const ALL: [Outcome; 8] = [
        Outcome::Susceptible,
        Outcome::Exposed,
        Outcome::Infectious,
        Outcome::Removed,
        Outcome::CumulativeInfections,
        Outcome::Hospitalized,
        Outcome::Icu,
        Outcome::CumulativeDeaths,
    ];
}

/// Outcomes evaluated at a set of query times.
///
/// Each series is a matrix with one row per query time and one column per
/// compartment. Aggregating across compartments is left to the caller;
/// [`OutcomeSeries::total`] covers the plain sum.
#[derive(Debug, Clone, PartialEq)]
pub struct OutcomeSeries {
    times: Vec<f64>,
    labels: Vec<String>,
    susceptible: Array2<f64>,
    exposed: Array2<f64>,
    infectious: Array2<f64>,
    removed: Array2<f64>,
    cumulative_infections: Array2<f64>,
    hospitalized: Array2<f64>,
    icu: Array2<f64>,
    cumulative_deaths: Array2<f64>,
}

impl OutcomeSeries {
    /// Returns the query times, one per row.
    #[must_use]
    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Returns the compartment labels, one per column.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the number of query times.
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns a series as a `times × compartments` matrix.
    #[must_use]
    pub fn series(&self, outcome: Outcome) -> ArrayView2<'_, f64> {
        match outcome {
            Outcome::Susceptible => self.susceptible.view(),
            Outcome::Exposed => self.exposed.view(),
            Outcome::Infectious => self.infectious.view(),
            Outcome::Removed => self.removed.view(),
            Outcome::CumulativeInfections => self.cumulative_infections.view(),
            Outcome::Hospitalized => self.hospitalized.view(),
            Outcome::Icu => self.icu.view(),
            Outcome::CumulativeDeaths => self.cumulative_deaths.view(),
        }
    }

    /// Returns a series for one compartment.
    ///
    /// # Panics
    ///
    /// Panics if `compartment` is out of range.
    #[must_use]
    pub fn compartment(&self, outcome: Outcome, compartment: usize) -> ArrayView1<'_, f64> {
        self.series(outcome).index_axis_move(Axis(1), compartment)
    }

    /// Returns a series summed across compartments.
    #[must_use]
    pub fn total(&self, outcome: Outcome) -> Array1<f64> {
        self.series(outcome).sum_axis(Axis(1))
    }
}

/// Evaluates every outcome of `trajectory` at `times`.
pub(crate) fn extract(
    config: &CompartmentConfig,
    trajectory: &Trajectory,
    times: &[f64],
) -> Result<OutcomeSeries, QueryError> {
    let n = config.len();
    if trajectory.compartments() != n {
        return Err(QueryError::CompartmentMismatch {
            expected: n,
            found: trajectory.compartments(),
        });
    }
    for &time in times {
        trajectory.check(time)?;
    }

    let mut states = Array2::zeros((times.len(), 4 * n));
    let mut buffer = vec![0.0; 4 * n];
    for (mut row, &time) in states.rows_mut().into_iter().zip(times) {
        trajectory.state_into(time, &mut buffer)?;
        row.assign(&ArrayView1::from(buffer.as_slice()));
    }
    let block = |block: Block| {
        let start = block.index(n, 0);
        states.slice(s![.., start..start + n]).to_owned()
    };

    let exposed = block(Block::Exposed);
    let onset = &exposed / config.incubation_period();

    let lagged = |pathway: &Pathway| lagged_onset(config, trajectory, times, pathway);
    let hospitalized = occupancy(config.hospitalization(), &lagged(config.hospitalization())?);
    let icu = occupancy(config.icu(), &lagged(config.icu())?);
    let deaths = lagged(config.death())?;

    Ok(OutcomeSeries {
        times: times.to_vec(),
        labels: config.labels().to_vec(),
        susceptible: block(Block::Susceptible),
        infectious: block(Block::Infectious),
        removed: block(Block::Removed),
        cumulative_infections: cumulative_sum(onset),
        hospitalized,
        icu,
        cumulative_deaths: cumulative_sum(deaths),
        exposed,
    })
}

/// Returns `p_i · F_i(t - lag_i)` at each query time.
fn lagged_onset(
    config: &CompartmentConfig,
    trajectory: &Trajectory,
    times: &[f64],
    pathway: &Pathway,
) -> Result<Array2<f64>, QueryError> {
    let incubation = config.incubation_period();
    let mut flow = Array2::zeros((times.len(), config.len()));
    for ((row, col), value) in flow.indexed_iter_mut() {
        let exposed = trajectory.value(times[row] - pathway.lag[col], Block::Exposed, col)?;
        *value = pathway.probability[col] * exposed / incubation[col];
    }
    Ok(flow)
}

/// Convolves each column of `flow` with its compartment's stay window.
fn occupancy(pathway: &Pathway, flow: &Array2<f64>) -> Array2<f64> {
    let mut active = Array2::zeros(flow.dim());
    for (col, mut column) in active.columns_mut().into_iter().enumerate() {
        let width = pathway
            .duration
            .as_ref()
            .map_or(1, |duration| window_width(duration[col]));
        column.assign(&boxcar_same(flow.column(col), width));
    }
    active
}

fn cumulative_sum(mut series: Array2<f64>) -> Array2<f64> {
    series.accumulate_axis_inplace(Axis(0), |&previous, current| *current += previous);
    series
}

/// Returns the boxcar width, in samples, for a stay of `duration` days.
#[must_use]
pub fn window_width(duration: f64) -> usize {
    // Saturating float-to-int cast; durations are validated as positive.
    (duration.round() as usize).max(1)
}

/// Convolves `signal` with `width` ones, keeping the centred part.
///
/// Entry `k` sums `signal[k + (width - 1) / 2 - j]` for `j` in `0..width`,
/// skipping indices outside the signal, so the output is the middle of the
/// full convolution and always has the length of `signal`.
///
/// # Panics
///
/// Panics if `width` is zero.
#[must_use]
pub fn boxcar_same(signal: ArrayView1<'_, f64>, width: usize) -> Array1<f64> {
    assert!(width > 0, "boxcar width must be positive");
    let len = signal.len();
    let offset = (width - 1) / 2;

    Array1::from_shape_fn(len, |k| {
        let high = (k + offset).min(len - 1);
        let low = (k + offset).saturating_sub(width - 1);
        signal.slice(s![low..=high]).sum()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn boxcar_keeps_the_centred_part_of_the_full_convolution() {
        let signal = array![1.0, 2.0, 3.0, 4.0, 5.0];

        assert_eq!(boxcar_same(signal.view(), 4), array![3.0, 6.0, 10.0, 14.0, 12.0]);
        assert_eq!(boxcar_same(signal.view(), 3), array![3.0, 6.0, 9.0, 12.0, 9.0]);
        assert_eq!(boxcar_same(signal.view(), 1), signal);
        assert_eq!(boxcar_same(array![1.0, 2.0, 3.0].view(), 3), array![3.0, 6.0, 5.0]);
    }

    #[test]
    fn boxcar_keeps_signal_length() {
        let signal = array![1.0, 2.0, 3.0];

        assert_eq!(boxcar_same(signal.view(), 7), array![6.0, 6.0, 6.0]);
        assert_eq!(boxcar_same(Array1::zeros(0).view(), 5).len(), 0);
    }

    #[test]
    fn boxcar_of_a_pulse_spans_the_window() {
        let mut pulse = Array1::zeros(30);
        pulse[10] = 2.0;

        let active = boxcar_same(pulse.view(), 7);

        assert_eq!(active.sum(), 14.0);
        assert_eq!(active.iter().filter(|&&v| v == 2.0).count(), 7);
        assert_eq!(active[7], 2.0);
        assert_eq!(active[13], 2.0);
        assert_eq!(active[14], 0.0);
    }

    #[test]
    fn window_width_rounds_durations() {
        assert_eq!(window_width(21.0), 21);
        assert_eq!(window_width(6.6), 7);
        assert_eq!(window_width(0.2), 1);
    }

    #[test]
    fn cumulative_sum_runs_down_each_column() {
        let series = cumulative_sum(array![[1.0, 0.5], [2.0, 0.5], [3.0, 0.0]]);

        assert_eq!(series, array![[1.0, 0.5], [3.0, 1.0], [6.0, 1.0]]);
    }
}
