//! Exogenous cases entering the population.
//!
//! Imported cases are added to the S, E and I rates on top of the internal
//! transmission dynamics. Nothing is subtracted elsewhere, so the total
//! number of people grows while cases are imported.

use std::{borrow::Cow, ops::Range};

use ndarray::Array1;

use crate::{ConfigError, WindowError};

/// Daily rates added to the susceptible, exposed and infectious blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Importation {
    pub susceptible: Array1<f64>,
    pub exposed: Array1<f64>,
    pub infectious: Array1<f64>,
}

impl Importation {
    /// Returns an importation of nothing for `n` compartments.
    #[must_use]
    pub fn zeros(n: usize) -> Self {
        Self {
            susceptible: Array1::zeros(n),
            exposed: Array1::zeros(n),
            infectious: Array1::zeros(n),
        }
    }

    /// Returns an importation of exposed cases only.
    #[must_use]
    pub fn exposed(rates: impl Into<Vec<f64>>) -> Self {
        let exposed = Array1::from(rates.into());
        let n = exposed.len();
        Self {
            exposed,
            ..Self::zeros(n)
        }
    }

    /// Returns an importation of infectious cases only.
    #[must_use]
    pub fn infectious(rates: impl Into<Vec<f64>>) -> Self {
        let infectious = Array1::from(rates.into());
        let n = infectious.len();
        Self {
            infectious,
            ..Self::zeros(n)
        }
    }

    /// Checks that every block has `n` entries.
    ///
    /// # Errors
    ///
    /// Returns the name and length of the first mismatched block.
    pub fn check_len(&self, n: usize) -> Result<(), (&'static str, usize)> {
        [
            ("susceptible", &self.susceptible),
            ("exposed", &self.exposed),
            ("infectious", &self.infectious),
        ]
        .into_iter()
        .find(|(_, rates)| rates.len() != n)
        .map_or(Ok(()), |(block, rates)| Err((block, rates.len())))
    }
}

/// A strategy injecting cases over time.
///
/// Closures `Fn(f64) -> Importation` implement this trait.
pub trait ImportedCases {
    /// Returns the rates imported at `time`, or `None` if there are none.
    fn importation(&self, time: f64) -> Option<Cow<'_, Importation>>;

    /// Checks the strategy against the compartment count of a model.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ImportationShape`] for wrongly sized rates.
    fn validate(&self, _compartments: usize) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// No imported cases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoImportedCases;

impl ImportedCases for NoImportedCases {
    fn importation(&self, _time: f64) -> Option<Cow<'_, Importation>> {
        None
    }
}

impl<F> ImportedCases for F
where
    F: Fn(f64) -> Importation,
{
    fn importation(&self, time: f64) -> Option<Cow<'_, Importation>> {
        Some(Cow::Owned(self(time)))
    }
}

/// Constant daily importation over the half-open window `[start, end)`.
///
/// # Examples
///
/// ```
/// use seirsim::{ConstantImportation, ImportedCases, Importation};
///
/// // Ten exposed travellers a day during the first week.
/// let seeding = ConstantImportation::new(0.0..7.0, Importation::exposed([10.0])).unwrap();
///
/// assert!(seeding.importation(3.0).is_some());
/// assert!(seeding.importation(7.0).is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantImportation {
    start: f64,
    end: f64,
    importation: Importation,
}

impl ConstantImportation {
    /// Imports `importation` every day within `range`.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::Empty`] unless the bounds are finite with
    /// `start < end`.
    pub fn new(range: Range<f64>, importation: Importation) -> Result<Self, WindowError> {
        let Range { start, end } = range;
        if !start.is_finite() || !end.is_finite() || start >= end {
            return Err(WindowError::Empty { start, end });
        }
        Ok(Self {
            start,
            end,
            importation,
        })
    }

    #[must_use]
    pub fn window(&self) -> Range<f64> {
        self.start..self.end
    }
}

impl ImportedCases for ConstantImportation {
    fn importation(&self, time: f64) -> Option<Cow<'_, Importation>> {
        (self.start <= time && time < self.end).then_some(Cow::Borrowed(&self.importation))
    }

    fn validate(&self, compartments: usize) -> Result<(), ConfigError> {
        self.importation
            .check_len(compartments)
            .map_err(|(block, found)| ConfigError::ImportationShape {
                block,
                expected: compartments,
                found,
            })
    }
}
