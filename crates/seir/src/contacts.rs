use ndarray::{Array2, ArrayView2};

#[cfg(feature = "serde-derive")]
use serde::{Deserialize, Serialize};

use crate::{CompartmentConfig, ConfigError};

/// Average daily contacts between compartments.
///
/// Entry `(i, j)` is the number of contacts a person in compartment `i` has
/// with people in compartment `j` per day. The matrix is square, finite and
/// non-negative; it need not be symmetric.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-derive", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde-derive",
    serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")
)]
pub struct ContactMatrix(Array2<f64>);

impl ContactMatrix {
    /// Validates and wraps a contact matrix.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the matrix is not square or has negative
    /// or non-finite entries.
    pub fn new(matrix: Array2<f64>) -> Result<Self, ConfigError> {
        let (rows, cols) = matrix.dim();
        if rows != cols {
            return Err(ConfigError::ContactShape {
                expected: rows,
                rows,
                cols,
            });
        }

        if let Some(((row, col), &value)) = matrix
            .indexed_iter()
            .find(|(_, v)| !v.is_finite() || **v < 0.0)
        {
            return Err(ConfigError::InvalidContact { row, col, value });
        }

        Ok(Self(matrix))
    }

    /// Returns the all-ones matrix of homogeneous mixing.
    #[must_use]
    pub fn homogeneous(n: usize) -> Self {
        Self(Array2::ones((n, n)))
    }

    /// Returns the number of compartments the matrix couples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.nrows()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.0.view()
    }
}

impl TryFrom<Vec<Vec<f64>>> for ContactMatrix {
    type Error = ConfigError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        let expected = rows.len();
        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(ConfigError::RaggedContacts {
                row,
                expected,
                found: values.len(),
            });
        }

        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let matrix = Array2::from_shape_vec((expected, expected), flat).map_err(|_| {
            ConfigError::ContactShape {
                expected,
                rows: expected,
                cols: expected,
            }
        })?;
        Self::new(matrix)
    }
}

impl From<ContactMatrix> for Vec<Vec<f64>> {
    fn from(contacts: ContactMatrix) -> Self {
        contacts.0.outer_iter().map(|row| row.to_vec()).collect()
    }
}

/// Transmission rates between compartments, calibrated to a target R0.
///
/// The matrix is `β · C`, where `C` is the contact matrix and
///
/// ```text
/// β = R0 · Σ_i P_i / (D̄ · Σ_ij P_i C_ij),    D̄ = Σ_i P_i D_i / Σ_i P_i
/// ```
///
/// with `P` the population and `D` the infectious period. A population-wide
/// average infectious case therefore causes `R0` infections over its
/// infectious period in a fully susceptible population, whatever the shape
/// of `C`.
#[derive(Debug, Clone, PartialEq)]
pub struct InfectivityMatrix {
    matrix: Array2<f64>,
    scale: f64,
}

impl InfectivityMatrix {
    /// Calibrates the contact matrix to the basic reproduction number `r0`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if `r0` is negative or non-finite, the
    /// contact matrix does not match the compartment count, or there are no
    /// population-weighted contacts to scale.
    pub fn calibrate(
        config: &CompartmentConfig,
        contacts: &ContactMatrix,
        r0: f64,
    ) -> Result<Self, ConfigError> {
        if !r0.is_finite() || r0 < 0.0 {
            return Err(ConfigError::InvalidR0 { value: r0 });
        }

        let n = config.len();
        let (rows, cols) = contacts.0.dim();
        if rows != n || cols != n {
            return Err(ConfigError::ContactShape {
                expected: n,
                rows,
                cols,
            });
        }

        let population = config.population();
        let throughput = population.dot(&contacts.0).sum();
        if throughput <= 0.0 || !throughput.is_finite() {
            return Err(ConfigError::NoContacts);
        }

        let scale = r0 * population.sum() / (config.mean_infectious_period() * throughput);
        Ok(Self {
            matrix: &contacts.0 * scale,
            scale,
        })
    }

    /// Returns the calibrated matrix `β · C`.
    #[must_use]
    pub fn matrix(&self) -> ArrayView2<'_, f64> {
        self.matrix.view()
    }

    /// Returns the calibration scalar `β`.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Returns the basic reproduction number implied by the matrix.
    ///
    /// Inverts the calibration, so it reports the `r0` the matrix was built
    /// with up to rounding.
    #[must_use]
    pub fn basic_reproduction_number(&self, config: &CompartmentConfig) -> f64 {
        let population = config.population();
        config.mean_infectious_period() * population.dot(&self.matrix).sum() / population.sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    use crate::{Parameters, compartments::tests::parameters};

    fn two_groups() -> CompartmentConfig {
        CompartmentConfig::new(&Parameters {
            population: vec![2.5e6, 1e6].into(),
            infectious_period: vec![5.0, 9.0].into(),
            ..parameters()
        })
        .unwrap()
    }

    #[test]
    fn single_compartment_matches_r0_over_infectious_period() {
        let config = CompartmentConfig::new(&parameters()).unwrap();
        let infectivity =
            InfectivityMatrix::calibrate(&config, &ContactMatrix::homogeneous(1), 2.3).unwrap();

        assert_relative_eq!(infectivity.matrix()[[0, 0]], 2.3 / 7.0);
        assert_relative_eq!(infectivity.basic_reproduction_number(&config), 2.3);
    }

    #[test]
    fn calibration_holds_for_asymmetric_contacts() {
        let config = two_groups();
        let contacts = ContactMatrix::new(array![[8.0, 2.0], [5.0, 1.0]]).unwrap();
        let infectivity = InfectivityMatrix::calibrate(&config, &contacts, 1.7).unwrap();

        assert_relative_eq!(
            infectivity.basic_reproduction_number(&config),
            1.7,
            max_relative = 1e-12
        );
        assert_relative_eq!(infectivity.matrix()[[1, 0]], 5.0 * infectivity.scale());
    }

    #[test]
    fn zero_r0_gives_zero_matrix() {
        let config = two_groups();
        let infectivity =
            InfectivityMatrix::calibrate(&config, &ContactMatrix::homogeneous(2), 0.0).unwrap();

        assert!(infectivity.matrix().iter().all(|&b| b == 0.0));
    }

    #[test]
    fn rejects_contacts_of_the_wrong_size() {
        let result =
            InfectivityMatrix::calibrate(&two_groups(), &ContactMatrix::homogeneous(3), 2.0);

        assert_eq!(
            result,
            Err(ConfigError::ContactShape {
                expected: 2,
                rows: 3,
                cols: 3,
            })
        );
    }

    #[test]
    fn rejects_invalid_r0_and_empty_contacts() {
        let config = two_groups();
        let zeros = ContactMatrix::new(Array2::zeros((2, 2))).unwrap();

        assert_eq!(
            InfectivityMatrix::calibrate(&config, &ContactMatrix::homogeneous(2), -1.0),
            Err(ConfigError::InvalidR0 { value: -1.0 })
        );
        assert_eq!(
            InfectivityMatrix::calibrate(&config, &zeros, 2.0),
            Err(ConfigError::NoContacts)
        );
    }

    #[test]
    fn contact_matrix_validates_entries() {
        assert!(matches!(
            ContactMatrix::new(Array2::ones((2, 3))),
            Err(ConfigError::ContactShape { rows: 2, cols: 3, .. })
        ));
        assert_eq!(
            ContactMatrix::new(array![[1.0, -2.0], [0.0, 1.0]]),
            Err(ConfigError::InvalidContact {
                row: 0,
                col: 1,
                value: -2.0,
            })
        );
        assert_eq!(
            ContactMatrix::try_from(vec![vec![1.0, 2.0], vec![3.0]]),
            Err(ConfigError::RaggedContacts {
                row: 1,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn converts_to_and_from_nested_vectors() {
        let rows = vec![vec![1.0, 2.0], vec![3.0, 4.0]];
        let contacts = ContactMatrix::try_from(rows.clone()).unwrap();

        assert_eq!(contacts.view()[[1, 0]], 3.0);
        assert_eq!(Vec::<Vec<f64>>::from(contacts), rows);
    }
}
