//! # Stoichiometry and Continuity
//!
//! Builds the Petersen (process × component) stoichiometric matrix of ASM2d.
//!
//! ## Purpose
//!
//! Each process declares only its *primary* coefficients (substrates consumed, biomass or
//! storage pools produced) and its electron acceptor. The remaining coefficients follow from
//! the conservation laws and are computed here, so the matrix is consistent for any
//! stoichiometric parameter set:
//!
//! | Conserved quantity | Closing component |
//! |--------------------|-------------------|
//! | COD | `S_O2` (aerobic) or `S_NO3`/`S_N2` (anoxic) |
//! | nitrogen | `S_NH4` |
//! | phosphorus | `S_PO4` |
//! | ionic charge | `S_ALK` |
//!
//! ## Main Structures
//!
//! - **`Composition`**: per-component factors (COD, N, P, charge, TSS, biodegradable COD)
//! - **`ElectronAcceptor`**: which component closes the COD balance of a process
//! - **`close_continuity()`**: completes one stoichiometric column
//! - **`continuity_residuals()`**: ν·composition for every process and conserved quantity,
//!   used to check a matrix
use crate::ASM2d::parameters::StoichiometricParameters;
use crate::ASM2d::state_vector::{Component, ComponentVector, N_COMPONENTS};
use nalgebra::SMatrix;
use serde::{Deserialize, Serialize};

pub const N_PROCESSES: usize = 21;
pub const N_CONSERVED: usize = 4;

pub type StoichiometricMatrix = SMatrix<f64, N_PROCESSES, N_COMPONENTS>;
pub type CompositionMatrix = SMatrix<f64, N_COMPONENTS, N_CONSERVED>;
pub type ContinuityResiduals = SMatrix<f64, N_PROCESSES, N_CONSERVED>;

/// COD equivalent of nitrate reduced to N2, g COD/g N
pub const COD_PER_NITRATE_N: f64 = 64.0 / 14.0;
/// COD equivalent of dinitrogen, g COD/g N
pub const COD_PER_N2: f64 = 24.0 / 14.0;
/// Fe(OH)3 consumed per g P precipitated
pub const MEOH_PER_P: f64 = 3.45;
/// FePO4 formed per g P precipitated
pub const MEP_PER_P: f64 = 4.87;
/// TSS of polyphosphate, g TSS/g P
pub const TSS_PER_PP: f64 = 3.23;
/// TSS of PHA, g TSS/g COD
pub const TSS_PER_PHA: f64 = 0.60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectronAcceptor {
    Oxygen,
    Nitrate,
    /// no external acceptor: COD must already balance
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conserved {
    Cod,
    Nitrogen,
    Phosphorus,
    Charge,
}

impl Conserved {
    pub const ALL: [Conserved; N_CONSERVED] = [
        Conserved::Cod,
        Conserved::Nitrogen,
        Conserved::Phosphorus,
        Conserved::Charge,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Conserved::Cod => "COD",
            Conserved::Nitrogen => "N",
            Conserved::Phosphorus => "P",
            Conserved::Charge => "charge",
        }
    }
}

/// Conversion factors of every state component
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    /// COD including the negative COD of O2, NO3 and N2 (continuity)
    pub cod: ComponentVector,
    /// organic COD only (what a COD test measures)
    pub cod_pollutant: ComponentVector,
    pub biodegradable: ComponentVector,
    pub nitrogen: ComponentVector,
    pub phosphorus: ComponentVector,
    /// mol charge per unit of component
    pub charge: ComponentVector,
    pub tss: ComponentVector,
}

impl Composition {
    pub fn new(st: &StoichiometricParameters) -> Self {
        use Component::*;
        let mut cod = ComponentVector::zeros();
        let mut cod_pollutant = ComponentVector::zeros();
        for c in [S_F, S_A, S_I, X_I, X_S, X_H, X_PAO, X_PHA, X_AUT] {
            cod[c.index()] = 1.0;
            cod_pollutant[c.index()] = 1.0;
        }
        cod[S_O2.index()] = -1.0;
        cod[S_NO3.index()] = -COD_PER_NITRATE_N;
        cod[S_N2.index()] = -COD_PER_N2;

        let mut biodegradable = ComponentVector::zeros();
        for c in [S_F, S_A, X_S, X_PHA] {
            biodegradable[c.index()] = 1.0;
        }
        for c in [X_H, X_PAO, X_AUT] {
            biodegradable[c.index()] = 1.0 - st.f_XI;
        }

        let mut nitrogen = ComponentVector::zeros();
        nitrogen[S_F.index()] = st.i_N_SF;
        nitrogen[S_I.index()] = st.i_N_SI;
        nitrogen[X_I.index()] = st.i_N_XI;
        nitrogen[X_S.index()] = st.i_N_XS;
        for c in [S_NH4, S_NO3, S_N2] {
            nitrogen[c.index()] = 1.0;
        }

        let mut phosphorus = ComponentVector::zeros();
        phosphorus[S_F.index()] = st.i_P_SF;
        phosphorus[S_I.index()] = st.i_P_SI;
        phosphorus[X_I.index()] = st.i_P_XI;
        phosphorus[X_S.index()] = st.i_P_XS;
        phosphorus[S_PO4.index()] = 1.0;
        phosphorus[X_PP.index()] = 1.0;
        phosphorus[X_MeP.index()] = 1.0 / MEP_PER_P;

        for c in [X_H, X_PAO, X_AUT] {
            nitrogen[c.index()] = st.i_N_BM;
            phosphorus[c.index()] = st.i_P_BM;
        }

        let mut charge = ComponentVector::zeros();
        charge[S_A.index()] = -1.0 / 64.0;
        charge[S_NH4.index()] = 1.0 / 14.0;
        charge[S_NO3.index()] = -1.0 / 14.0;
        charge[S_PO4.index()] = -1.5 / 31.0;
        charge[S_ALK.index()] = -1.0;
        charge[X_PP.index()] = -1.0 / 31.0;

        let mut tss = ComponentVector::zeros();
        tss[X_I.index()] = st.i_TSS_XI;
        tss[X_S.index()] = st.i_TSS_XS;
        for c in [X_H, X_PAO, X_AUT] {
            tss[c.index()] = st.i_TSS_BM;
        }
        tss[X_PP.index()] = TSS_PER_PP;
        tss[X_PHA.index()] = TSS_PER_PHA;
        tss[X_MeOH.index()] = 1.0;
        tss[X_MeP.index()] = 1.0;

        Self {
            cod,
            cod_pollutant,
            biodegradable,
            nitrogen,
            phosphorus,
            charge,
            tss,
        }
    }

    pub fn conserved(&self, quantity: Conserved) -> &ComponentVector {
        match quantity {
            Conserved::Cod => &self.cod,
            Conserved::Nitrogen => &self.nitrogen,
            Conserved::Phosphorus => &self.phosphorus,
            Conserved::Charge => &self.charge,
        }
    }

    /// columns: COD, N, P, charge
    pub fn matrix(&self) -> CompositionMatrix {
        CompositionMatrix::from_columns(&[self.cod, self.nitrogen, self.phosphorus, self.charge])
    }
}

/// sum of ν_i·w_i over all components except `skip`
fn partial_balance(column: &ComponentVector, weights: &ComponentVector, skip: Component) -> f64 {
    column
        .iter()
        .zip(weights.iter())
        .enumerate()
        .filter(|(i, _)| *i != skip.index())
        .map(|(_, (nu, w))| nu * w)
        .sum()
}

/// Completes a stoichiometric column from its primary coefficients.
pub fn close_continuity(
    primary: &[(Component, f64)],
    acceptor: ElectronAcceptor,
    composition: &Composition,
) -> ComponentVector {
    let mut column = ComponentVector::zeros();
    for (component, coefficient) in primary {
        column[component.index()] += coefficient;
    }

    let cod_residual = column.dot(&composition.cod);
    match acceptor {
        ElectronAcceptor::Oxygen => {
            let o2 = Component::S_O2.index();
            column[o2] = -cod_residual / composition.cod[o2];
        }
        ElectronAcceptor::Nitrate => {
            // nitrate is reduced to N2: one g N carries 64/14 − 24/14 g COD of oxidizing capacity
            let per_n = COD_PER_NITRATE_N - COD_PER_N2;
            let nitrate = cod_residual / per_n;
            column[Component::S_NO3.index()] = nitrate;
            column[Component::S_N2.index()] = -nitrate;
        }
        ElectronAcceptor::Internal => {}
    }

    column[Component::S_NH4.index()] =
        -partial_balance(&column, &composition.nitrogen, Component::S_NH4);
    column[Component::S_PO4.index()] =
        -partial_balance(&column, &composition.phosphorus, Component::S_PO4);
    // S_ALK carries charge -1 per mol
    column[Component::S_ALK.index()] =
        partial_balance(&column, &composition.charge, Component::S_ALK);
    column
}

/// ν·composition: entry (j, q) is the imbalance of quantity q in process j
pub fn continuity_residuals(
    matrix: &StoichiometricMatrix,
    composition: &Composition,
) -> ContinuityResiduals {
    matrix * composition.matrix()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn composition() -> Composition {
        Composition::new(&StoichiometricParameters::default())
    }

    #[test]
    fn aerobic_heterotroph_growth_oxygen_demand() {
        let st = StoichiometricParameters::default();
        let column = close_continuity(
            &[(Component::S_F, -1.0 / st.Y_H), (Component::X_H, 1.0)],
            ElectronAcceptor::Oxygen,
            &composition(),
        );
        // -(1 - Y_H)/Y_H
        assert_relative_eq!(column[Component::S_O2.index()], -0.6, epsilon = 1e-12);
        // N: S_F 1.6·0.03 released, biomass 0.07 taken
        assert_relative_eq!(column[Component::S_NH4.index()], 1.6 * 0.03 - 0.07, epsilon = 1e-12);
        assert_relative_eq!(column[Component::S_PO4.index()], 1.6 * 0.01 - 0.02, epsilon = 1e-12);
    }

    #[test]
    fn anoxic_growth_reduces_nitrate_to_dinitrogen() {
        let column = close_continuity(
            &[(Component::S_A, -1.6), (Component::X_H, 1.0)],
            ElectronAcceptor::Nitrate,
            &composition(),
        );
        assert_relative_eq!(column[Component::S_NO3.index()], -0.6 / 2.86, epsilon = 1e-3);
        assert_relative_eq!(
            column[Component::S_N2.index()],
            -column[Component::S_NO3.index()],
            epsilon = 1e-15
        );
        assert!(column[Component::S_O2.index()] == 0.0);
        // denitrification releases alkalinity
        assert!(column[Component::S_ALK.index()] > 0.0);
    }

    #[test]
    fn nitrification_oxygen_demand_and_alkalinity() {
        let st = StoichiometricParameters::default();
        let column = close_continuity(
            &[(Component::S_NO3, 1.0 / st.Y_A), (Component::X_AUT, 1.0)],
            ElectronAcceptor::Oxygen,
            &composition(),
        );
        assert_relative_eq!(
            column[Component::S_O2.index()],
            -(64.0 / 14.0 - st.Y_A) / st.Y_A,
            epsilon = 1e-12
        );
        assert_relative_eq!(column[Component::S_NH4.index()], -0.07 - 1.0 / 0.24, epsilon = 1e-12);
        assert!(column[Component::S_ALK.index()] < -0.5);
    }

    #[test]
    fn precipitation_binds_one_gram_phosphate() {
        let column = close_continuity(
            &[(Component::X_MeOH, -MEOH_PER_P), (Component::X_MeP, MEP_PER_P)],
            ElectronAcceptor::Internal,
            &composition(),
        );
        assert_relative_eq!(column[Component::S_PO4.index()], -1.0, epsilon = 1e-12);
        assert_relative_eq!(column[Component::S_ALK.index()], 1.5 / 31.0, epsilon = 1e-12);
    }

    #[test]
    fn composition_matrix_columns() {
        let c = composition();
        let m = c.matrix();
        assert_eq!(m[(Component::S_O2.index(), 0)], -1.0);
        assert_eq!(m[(Component::S_NH4.index(), 1)], 1.0);
        assert_eq!(m[(Component::X_PP.index(), 2)], 1.0);
        assert_eq!(m[(Component::S_ALK.index(), 3)], -1.0);
        assert_eq!(c.cod_pollutant[Component::S_O2.index()], 0.0);
        assert_relative_eq!(c.biodegradable[Component::X_H.index()], 0.9, epsilon = 1e-15);
    }
}
