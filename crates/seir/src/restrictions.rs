//! Time-varying contact restrictions.
//!
//! A [`Restrictions`] strategy returns a [`Multiplier`] applied elementwise to
//! the infectivity matrix each time the derivative is evaluated. The
//! integrator chooses those times, so implementations must be pure functions
//! of time.

use std::ops::Range;

use ndarray::{Array2, ArrayView2, CowArray, Ix2};

use crate::{ConfigError, WindowError};

/// Threshold below which [`RestrictionSchedule`] scans its windows linearly.
const LINEAR_SEARCH_THRESHOLD: usize = 32;

/// A factor scaling transmission between compartments.
#[derive(Debug, Clone, PartialEq)]
pub enum Multiplier<'a> {
    /// Scales every entry of the infectivity matrix.
    Scalar(f64),

    /// Scales each entry of the infectivity matrix by the matching entry.
    Matrix(CowArray<'a, f64, Ix2>),
}

impl Multiplier<'static> {
    /// Wraps an owned `N×N` matrix.
    #[must_use]
    pub fn matrix(matrix: Array2<f64>) -> Self {
        Multiplier::Matrix(CowArray::from(matrix))
    }
}

impl Multiplier<'_> {
    /// Returns a multiplier borrowing from `self`.
    #[must_use]
    pub fn reborrow(&self) -> Multiplier<'_> {
        match self {
            Multiplier::Scalar(value) => Multiplier::Scalar(*value),
            Multiplier::Matrix(matrix) => Multiplier::Matrix(CowArray::from(matrix.view())),
        }
    }

    /// Checks that a matrix multiplier is `n×n`.
    ///
    /// # Errors
    ///
    /// Returns the actual `(rows, cols)` if the shape is wrong.
    pub fn check_shape(&self, n: usize) -> Result<(), (usize, usize)> {
        match self {
            Multiplier::Matrix(matrix) if matrix.dim() != (n, n) => Err(matrix.dim()),
            _ => Ok(()),
        }
    }
}

impl From<f64> for Multiplier<'_> {
    fn from(value: f64) -> Self {
        Multiplier::Scalar(value)
    }
}

impl From<Array2<f64>> for Multiplier<'_> {
    fn from(matrix: Array2<f64>) -> Self {
        Multiplier::Matrix(CowArray::from(matrix))
    }
}

impl<'a> From<ArrayView2<'a, f64>> for Multiplier<'a> {
    fn from(matrix: ArrayView2<'a, f64>) -> Self {
        Multiplier::Matrix(CowArray::from(matrix))
    }
}

/// A strategy scaling transmission over time.
///
/// Closures `Fn(f64) -> Multiplier<'static>` implement this trait.
pub trait Restrictions {
    /// Returns the multiplier in effect at `time`.
    fn multiplier(&self, time: f64) -> Multiplier<'_>;

    /// Checks the strategy against the compartment count of a model.
    ///
    /// Called once when the strategy is attached to a model. Strategies whose
    /// output is only known at evaluation time keep the default, and a wrong
    /// shape then fails the integration instead.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::RestrictionShape`] for a wrongly sized matrix.
    fn validate(&self, _compartments: usize) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// No restrictions: transmission is never scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoRestrictions;

impl Restrictions for NoRestrictions {
    fn multiplier(&self, _time: f64) -> Multiplier<'_> {
        Multiplier::Scalar(1.0)
    }
}

impl<F> Restrictions for F
where
    F: Fn(f64) -> Multiplier<'static>,
{
    fn multiplier(&self, time: f64) -> Multiplier<'_> {
        match self(time) {
            Multiplier::Scalar(value) => Multiplier::Scalar(value),
            Multiplier::Matrix(matrix) => Multiplier::Matrix(CowArray::from(matrix.into_owned())),
        }
    }
}

/// A multiplier in force over the half-open window `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    start: f64,
    end: f64,
    multiplier: Multiplier<'static>,
}

impl Window {
    /// Creates a window applying `multiplier` over `range`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::Empty`] unless the bounds are finite with
    /// `start < end`.
    pub fn new(
        range: Range<f64>,
        multiplier: impl Into<Multiplier<'static>>,
    ) -> Result<Self, WindowError> {
        let Range { start, end } = range;
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(WindowError::Empty { start, end });
        }
        Ok(Self {
            start,
            end,
            multiplier: multiplier.into(),
        })
    }

    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    #[must_use]
    pub fn multiplier(&self) -> &Multiplier<'static> {
        &self.multiplier
    }

    #[must_use]
    pub fn contains(&self, time: f64) -> bool {
        self.start <= time && time < self.end
    }

    fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Piecewise-constant restrictions, such as a scheduled lockdown.
///
/// Each [`Window`] applies its multiplier over `[start, end)`; outside every
/// window transmission is unrestricted.
///
/// # Examples
///
/// ```
/// use seirsim::{RestrictionSchedule, Restrictions, Window, Multiplier};
///
/// let schedule = RestrictionSchedule::new([
///     Window::new(10.0..30.0, 0.4).unwrap(),
///     Window::new(30.0..60.0, 0.7).unwrap(),
/// ]).unwrap();
///
/// assert_eq!(schedule.multiplier(5.0), Multiplier::Scalar(1.0));
/// assert_eq!(schedule.multiplier(10.0), Multiplier::Scalar(0.4));
/// assert_eq!(schedule.multiplier(45.0), Multiplier::Scalar(0.7));
/// assert_eq!(schedule.multiplier(60.0), Multiplier::Scalar(1.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestrictionSchedule {
    windows: Vec<Window>,
}

impl RestrictionSchedule {
    /// Creates a schedule ordered by start time.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::Overlap`] if any two windows overlap.
    pub fn new<I>(windows: I) -> Result<Self, WindowError>
    where
        I: IntoIterator<Item = Window>,
    {
        let mut windows: Vec<_> = windows.into_iter().collect();
        windows.sort_by(|a, b| a.start.total_cmp(&b.start));

        if let Some(index) = windows.windows(2).position(|pair| pair[0].overlaps(&pair[1])) {
            return Err(overlap(&windows[index], &windows[index + 1]));
        }

        Ok(Self { windows })
    }

    /// Adds a window, keeping the schedule ordered.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::Overlap`] if `window` overlaps an existing one.
    pub fn try_push(&mut self, window: Window) -> Result<(), WindowError> {
        let index = self.windows.partition_point(|w| w.start < window.start);

        if index > 0 && self.windows[index - 1].overlaps(&window) {
            return Err(overlap(&self.windows[index - 1], &window));
        }
        if index < self.windows.len() && self.windows[index].overlaps(&window) {
            return Err(overlap(&self.windows[index], &window));
        }

        self.windows.insert(index, window);
        Ok(())
    }

    /// Returns the windows in order of increasing start time.
    #[must_use]
    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// Returns the window containing `time`, if any.
    #[must_use]
    pub fn window_at(&self, time: f64) -> Option<&Window> {
        if self.windows.len() < LINEAR_SEARCH_THRESHOLD {
            self.windows.iter().find(|w| w.contains(time))
        } else {
            let index = self.windows.partition_point(|w| w.start <= time);
            index
                .checked_sub(1)
                .map(|i| &self.windows[i])
                .filter(|w| w.contains(time))
        }
    }
}

impl Restrictions for RestrictionSchedule {
    fn multiplier(&self, time: f64) -> Multiplier<'_> {
        self.window_at(time)
            .map_or(Multiplier::Scalar(1.0), |w| w.multiplier.reborrow())
    }

    fn validate(&self, compartments: usize) -> Result<(), ConfigError> {
        for window in &self.windows {
            window
                .multiplier
                .check_shape(compartments)
                .map_err(|(rows, cols)| ConfigError::RestrictionShape {
                    expected: compartments,
                    rows,
                    cols,
                })?;
        }
        Ok(())
    }
}

fn overlap(first: &Window, second: &Window) -> WindowError {
    WindowError::Overlap {
        first: [first.start, first.end],
        second: [second.start, second.end],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    #[test]
    fn no_restrictions_is_identity() {
        assert_eq!(NoRestrictions.multiplier(3.0), Multiplier::Scalar(1.0));
    }

    #[test]
    fn closures_are_restrictions() {
        let lockdown = |t: f64| Multiplier::Scalar(if t < 10.0 { 1.0 } else { 0.2 });

        assert_eq!(lockdown.multiplier(0.0), Multiplier::Scalar(1.0));
        assert_eq!(lockdown.multiplier(12.5), Multiplier::Scalar(0.2));

        let isolate = |_t: f64| Multiplier::matrix(array![[1.0, 0.0], [0.0, 1.0]]);
        let Multiplier::Matrix(found) = isolate.multiplier(4.0) else {
            panic!("expected a matrix multiplier");
        };
        assert_eq!(found, array![[1.0, 0.0], [0.0, 1.0]]);
        assert_eq!(isolate.multiplier(4.0).check_shape(2), Ok(()));
    }

    #[test]
    fn schedule_borrows_matrix_multipliers() {
        let matrix = array![[0.5, 1.0], [1.0, 0.5]];
        let schedule =
            RestrictionSchedule::new([Window::new(0.0..5.0, matrix.clone()).unwrap()]).unwrap();

        let Multiplier::Matrix(found) = schedule.multiplier(2.0) else {
            panic!("expected a matrix multiplier");
        };
        assert!(found.is_view());
        assert_eq!(found, matrix);
    }

    #[test]
    fn windows_are_half_open_and_sorted() {
        let schedule = RestrictionSchedule::new([
            Window::new(20.0..30.0, 0.5).unwrap(),
            Window::new(0.0..20.0, 0.1).unwrap(),
        ])
        .unwrap();

        assert_eq!(schedule.windows()[0].start(), 0.0);
        assert_eq!(schedule.multiplier(19.999), Multiplier::Scalar(0.1));
        assert_eq!(schedule.multiplier(20.0), Multiplier::Scalar(0.5));
        assert_eq!(schedule.multiplier(30.0), Multiplier::Scalar(1.0));
        assert_eq!(schedule.multiplier(-1.0), Multiplier::Scalar(1.0));
    }

    #[test]
    fn rejects_empty_and_overlapping_windows() {
        assert!(matches!(
            Window::new(5.0..5.0, 0.5),
            Err(WindowError::Empty { .. })
        ));
        assert!(matches!(
            Window::new(0.0..f64::INFINITY, 0.5),
            Err(WindowError::Empty { .. })
        ));

        let result = RestrictionSchedule::new([
            Window::new(0.0..10.0, 0.5).unwrap(),
            Window::new(9.0..15.0, 0.5).unwrap(),
        ]);
        assert_eq!(
            result,
            Err(WindowError::Overlap {
                first: [0.0, 10.0],
                second: [9.0, 15.0],
            })
        );
    }

    #[test]
    fn try_push_keeps_order_and_rejects_overlap() {
        let mut schedule = RestrictionSchedule::default();
        schedule.try_push(Window::new(10.0..20.0, 0.5).unwrap()).unwrap();
        schedule.try_push(Window::new(0.0..10.0, 0.2).unwrap()).unwrap();

        assert_eq!(schedule.windows()[0].end(), 10.0);
        assert!(
            schedule
                .try_push(Window::new(15.0..25.0, 0.9).unwrap())
                .is_err()
        );
    }

    #[test]
    fn large_schedules_use_binary_search() {
        let windows = (0..100).map(|i| {
            let start = f64::from(i) * 10.0;
            Window::new(start..start + 5.0, f64::from(i)).unwrap()
        });
        let schedule = RestrictionSchedule::new(windows).unwrap();

        assert_eq!(schedule.multiplier(423.0), Multiplier::Scalar(42.0));
        assert_eq!(schedule.multiplier(427.0), Multiplier::Scalar(1.0));
        assert_eq!(schedule.multiplier(995.0), Multiplier::Scalar(1.0));
    }

    #[test]
    fn validate_checks_matrix_shapes() {
        let window = Window::new(0.0..1.0, Array2::<f64>::ones((2, 3))).unwrap();
        let schedule = RestrictionSchedule::new([window]).unwrap();

        assert_eq!(
            schedule.validate(2),
            Err(ConfigError::RestrictionShape {
                expected: 2,
                rows: 2,
                cols: 3,
            })
        );
        assert!(schedule.validate(3).is_err());
    }
}
