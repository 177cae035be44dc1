use ndarray::{Array1, ArrayView1};
use seirsim_core::OdeSystem;

use crate::{
    CompartmentConfig, ImportedCases, InfectivityMatrix, LawError, Multiplier, Restrictions,
};

/// The SEIR rate law as an [`OdeSystem`].
///
/// For compartment `i`, with force of infection
/// `λ_i = Σ_j M_ij(t) · B_ij · I_j` from the infectivity matrix `B` and the
/// restriction multiplier `M`:
///
/// ```text
/// dS_i/dt = -(S_i / P_i) λ_i
/// dE_i/dt =  (S_i / P_i) λ_i - E_i / incubation_i
/// dI_i/dt =  E_i / incubation_i - I_i / infectious_i
/// dR_i/dt =  I_i / infectious_i
/// ```
///
/// Imported cases are then added to the S, E and I rates. The state is never
/// renormalized.
#[derive(Debug)]
pub struct SeirDynamics<'a, R, I> {
    config: &'a CompartmentConfig,
    infectivity: &'a InfectivityMatrix,
    restrictions: &'a R,
    imported: &'a I,
}

impl<'a, R: Restrictions, I: ImportedCases> SeirDynamics<'a, R, I> {
    pub fn new(
        config: &'a CompartmentConfig,
        infectivity: &'a InfectivityMatrix,
        restrictions: &'a R,
        imported: &'a I,
    ) -> Self {
        Self {
            config,
            infectivity,
            restrictions,
            imported,
        }
    }
}

impl<R: Restrictions, I: ImportedCases> OdeSystem for SeirDynamics<'_, R, I> {
    type Error = LawError;

    fn dimension(&self) -> usize {
        4 * self.config.len()
    }

    fn derivative(&self, time: f64, state: &[f64], rate: &mut [f64]) -> Result<(), LawError> {
        let n = self.config.len();
        let (s, rest) = state.split_at(n);
        let (e, rest) = rest.split_at(n);
        let i = &rest[..n];

        let (ds, rest) = rate.split_at_mut(n);
        let (de, rest) = rest.split_at_mut(n);
        let (di, dr) = rest.split_at_mut(n);

        let infectious = ArrayView1::from(i);
        let infectivity = self.infectivity.matrix();
        let multiplier = self.restrictions.multiplier(time);
        if let Err((rows, cols)) = multiplier.check_shape(n) {
            return Err(LawError::RestrictionShape {
                time,
                expected: n,
                rows,
                cols,
            });
        }

        let population = self.config.population();
        let incubation = self.config.incubation_period();
        let infectious_period = self.config.infectious_period();

        for k in 0..n {
            let force = match &multiplier {
                Multiplier::Scalar(m) => m * infectivity.row(k).dot(&infectious),
                Multiplier::Matrix(m) => (0..n)
                    .map(|j| m[[k, j]] * infectivity[[k, j]] * i[j])
                    .sum::<f64>(),
            };
            let infections = s[k] / population[k] * force;
            let onset = e[k] / incubation[k];
            let recovery = i[k] / infectious_period[k];

            ds[k] = -infections;
            de[k] = infections - onset;
            di[k] = onset - recovery;
            dr[k] = recovery;
        }

        if let Some(importation) = self.imported.importation(time) {
            if let Err((block, found)) = importation.check_len(n) {
                return Err(LawError::ImportationShape {
                    time,
                    block,
                    expected: n,
                    found,
                });
            }
            add(ds, &importation.susceptible);
            add(de, &importation.exposed);
            add(di, &importation.infectious);
        }

        Ok(())
    }
}

fn add(rates: &mut [f64], imported: &Array1<f64>) {
    for (rate, extra) in rates.iter_mut().zip(imported) {
        *rate += extra;
    }
}
