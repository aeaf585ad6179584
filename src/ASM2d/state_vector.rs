//! # ASM2d State Vector
//!
//! Fixed-shape record of the 18 ASM2d concentrations held by every reactor zone.
//!
//! ## Main Structures
//!
//! - **`Component`**: index enum of the state variables, in matrix column order
//! - **`StateVector`**: named concentrations (serialized by field name)
//! - **`ComponentVector`**: `nalgebra` static vector used by the integrator and the process model
//! - **`ConventionalIndices`**: COD, BOD5, TSS, nitrogen and phosphorus indices of a state
//!
//! ## Units
//!
//! | Component | Units |
//! |-----------|-------|
//! | `S_O2` | g O2/m³ |
//! | `S_F`, `S_A`, `S_I`, `X_I`, `X_S`, `X_H`, `X_PAO`, `X_PHA`, `X_AUT` | g COD/m³ |
//! | `S_NH4`, `S_NO3`, `S_N2` | g N/m³ |
//! | `S_PO4`, `X_PP` | g P/m³ |
//! | `S_ALK` | mol HCO3⁻/m³ |
//! | `X_MeOH`, `X_MeP` | g TSS/m³ |
//!
//! ## Non-Obvious Features
//!
//! - Suspended solids are not a state variable: `X_TSS` is derived from the particulate
//!   fractions through the TSS composition factors.
//! - Every component must stay non-negative; `clamp_non_negative` enforces this after each
//!   integration step and reports which components were touched.
use crate::ASM2d::stoichiometry::Composition;
use nalgebra::SVector;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const N_COMPONENTS: usize = 18;

pub type ComponentVector = SVector<f64, N_COMPONENTS>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[allow(non_camel_case_types)]
pub enum Component {
    S_O2,
    S_F,
    S_A,
    S_NH4,
    S_NO3,
    S_PO4,
    S_I,
    S_ALK,
    S_N2,
    X_I,
    X_S,
    X_H,
    X_PAO,
    X_PP,
    X_PHA,
    X_AUT,
    X_MeOH,
    X_MeP,
}

impl Component {
    pub const ALL: [Component; N_COMPONENTS] = [
        Component::S_O2,
        Component::S_F,
        Component::S_A,
        Component::S_NH4,
        Component::S_NO3,
        Component::S_PO4,
        Component::S_I,
        Component::S_ALK,
        Component::S_N2,
        Component::X_I,
        Component::X_S,
        Component::X_H,
        Component::X_PAO,
        Component::X_PP,
        Component::X_PHA,
        Component::X_AUT,
        Component::X_MeOH,
        Component::X_MeP,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Component::S_O2 => "S_O2",
            Component::S_F => "S_F",
            Component::S_A => "S_A",
            Component::S_NH4 => "S_NH4",
            Component::S_NO3 => "S_NO3",
            Component::S_PO4 => "S_PO4",
            Component::S_I => "S_I",
            Component::S_ALK => "S_ALK",
            Component::S_N2 => "S_N2",
            Component::X_I => "X_I",
            Component::X_S => "X_S",
            Component::X_H => "X_H",
            Component::X_PAO => "X_PAO",
            Component::X_PP => "X_PP",
            Component::X_PHA => "X_PHA",
            Component::X_AUT => "X_AUT",
            Component::X_MeOH => "X_MeOH",
            Component::X_MeP => "X_MeP",
        }
    }

    pub fn units(self) -> &'static str {
        match self {
            Component::S_O2 => "g O2/m3",
            Component::S_NH4 | Component::S_NO3 | Component::S_N2 => "g N/m3",
            Component::S_PO4 | Component::X_PP => "g P/m3",
            Component::S_ALK => "mol/m3",
            Component::X_MeOH | Component::X_MeP => "g TSS/m3",
            _ => "g COD/m3",
        }
    }

    /// particulate components are retained by the clarifier, soluble ones pass it
    pub fn is_particulate(self) -> bool {
        self.index() >= Component::X_I.index()
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Concentrations of one reactor zone (or of a stream).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[allow(non_snake_case)]
#[serde(default)]
pub struct StateVector {
    pub S_O2: f64,
    pub S_F: f64,
    pub S_A: f64,
    pub S_NH4: f64,
    pub S_NO3: f64,
    pub S_PO4: f64,
    pub S_I: f64,
    pub S_ALK: f64,
    pub S_N2: f64,
    pub X_I: f64,
    pub X_S: f64,
    pub X_H: f64,
    pub X_PAO: f64,
    pub X_PP: f64,
    pub X_PHA: f64,
    pub X_AUT: f64,
    pub X_MeOH: f64,
    pub X_MeP: f64,
}

impl StateVector {
    pub fn zeros() -> Self {
        Self::default()
    }

    /// Seed mixed liquor of a nutrient-removal plant, used when no initial state is given.
    /// Values are rounded from steady states of an A2O plant at SRT 15 d.
    pub fn default_seed() -> Self {
        Self {
            S_O2: 0.0,
            S_F: 5.0,
            S_A: 1.0,
            S_NH4: 5.0,
            S_NO3: 5.0,
            S_PO4: 5.0,
            S_I: 20.0,
            S_ALK: 4.0,
            S_N2: 15.0,
            X_I: 1000.0,
            X_S: 60.0,
            X_H: 700.0,
            X_PAO: 250.0,
            X_PP: 60.0,
            X_PHA: 15.0,
            X_AUT: 50.0,
            X_MeOH: 0.0,
            X_MeP: 0.0,
        }
    }

    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::S_O2 => self.S_O2,
            Component::S_F => self.S_F,
            Component::S_A => self.S_A,
            Component::S_NH4 => self.S_NH4,
            Component::S_NO3 => self.S_NO3,
            Component::S_PO4 => self.S_PO4,
            Component::S_I => self.S_I,
            Component::S_ALK => self.S_ALK,
            Component::S_N2 => self.S_N2,
            Component::X_I => self.X_I,
            Component::X_S => self.X_S,
            Component::X_H => self.X_H,
            Component::X_PAO => self.X_PAO,
            Component::X_PP => self.X_PP,
            Component::X_PHA => self.X_PHA,
            Component::X_AUT => self.X_AUT,
            Component::X_MeOH => self.X_MeOH,
            Component::X_MeP => self.X_MeP,
        }
    }

    pub fn set(&mut self, component: Component, value: f64) {
        let slot = match component {
            Component::S_O2 => &mut self.S_O2,
            Component::S_F => &mut self.S_F,
            Component::S_A => &mut self.S_A,
            Component::S_NH4 => &mut self.S_NH4,
            Component::S_NO3 => &mut self.S_NO3,
            Component::S_PO4 => &mut self.S_PO4,
            Component::S_I => &mut self.S_I,
            Component::S_ALK => &mut self.S_ALK,
            Component::S_N2 => &mut self.S_N2,
            Component::X_I => &mut self.X_I,
            Component::X_S => &mut self.X_S,
            Component::X_H => &mut self.X_H,
            Component::X_PAO => &mut self.X_PAO,
            Component::X_PP => &mut self.X_PP,
            Component::X_PHA => &mut self.X_PHA,
            Component::X_AUT => &mut self.X_AUT,
            Component::X_MeOH => &mut self.X_MeOH,
            Component::X_MeP => &mut self.X_MeP,
        };
        *slot = value;
    }

    pub fn to_vector(&self) -> ComponentVector {
        ComponentVector::from_fn(|i, _| self.get(Component::ALL[i]))
    }

    pub fn from_vector(vector: &ComponentVector) -> Self {
        let mut state = Self::zeros();
        for component in Component::ALL {
            state.set(component, vector[component.index()]);
        }
        state
    }

    /// Checks that every concentration is finite and non-negative.
    /// Returns the name of the first offending component.
    pub fn check_physical(&self) -> Result<(), String> {
        for component in Component::ALL {
            let value = self.get(component);
            if !value.is_finite() || value < 0.0 {
                return Err(format!(
                    "{} = {} is not a finite non-negative concentration",
                    component, value
                ));
            }
        }
        Ok(())
    }

    /// Derived suspended solids, g TSS/m3
    pub fn tss(&self, composition: &Composition) -> f64 {
        composition.tss.dot(&self.to_vector())
    }

    pub fn conventional_indices(
        &self,
        composition: &Composition,
        bod_factor: f64,
    ) -> ConventionalIndices {
        ConventionalIndices::from_vector(&self.to_vector(), composition, bod_factor)
    }
}

/// Clamps negative entries to zero; returns the indices that were clamped.
pub fn clamp_non_negative(vector: &mut ComponentVector) -> Vec<usize> {
    let mut clamped = Vec::new();
    for (i, value) in vector.iter_mut().enumerate() {
        if *value < 0.0 {
            *value = 0.0;
            clamped.push(i);
        }
    }
    clamped
}

/// Conventional wastewater indices of a stream, all in g/m3
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[allow(non_snake_case)]
pub struct ConventionalIndices {
    pub COD: f64,
    pub BOD5: f64,
    pub TSS: f64,
    pub TKN: f64,
    pub NH4: f64,
    pub NO3: f64,
    pub TN: f64,
    pub TP: f64,
    pub PO4: f64,
}

impl ConventionalIndices {
    /// `bod_factor` converts biodegradable COD into BOD5
    pub fn from_vector(x: &ComponentVector, composition: &Composition, bod_factor: f64) -> Self {
        let no3 = x[Component::S_NO3.index()];
        // dinitrogen gas carries N for continuity but is not part of TN
        let tn = composition.nitrogen.dot(x) - x[Component::S_N2.index()];
        Self {
            COD: composition.cod_pollutant.dot(x),
            BOD5: bod_factor * composition.biodegradable.dot(x),
            TSS: composition.tss.dot(x),
            TKN: tn - no3,
            NH4: x[Component::S_NH4.index()],
            NO3: no3,
            TN: tn,
            TP: composition.phosphorus.dot(x),
            PO4: x[Component::S_PO4.index()],
        }
    }

    pub fn named_values(&self) -> [(&'static str, f64); 9] {
        [
            ("COD", self.COD),
            ("BOD5", self.BOD5),
            ("TSS", self.TSS),
            ("TKN", self.TKN),
            ("NH4-N", self.NH4),
            ("NO3-N", self.NO3),
            ("TN", self.TN),
            ("TP", self.TP),
            ("PO4-P", self.PO4),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ASM2d::parameters::StoichiometricParameters;
    use approx::assert_relative_eq;

    #[test]
    fn vector_roundtrip_keeps_named_fields() {
        let seed = StateVector::default_seed();
        let v = seed.to_vector();
        assert_eq!(v[Component::X_PAO.index()], 250.0);
        assert_eq!(v[Component::S_ALK.index()], 4.0);
        assert_eq!(StateVector::from_vector(&v), seed);
    }

    #[test]
    fn particulate_split_starts_at_inert_solids() {
        let particulate: Vec<Component> = Component::ALL
            .iter()
            .copied()
            .filter(|c| c.is_particulate())
            .collect();
        assert_eq!(particulate.len(), 9);
        assert_eq!(particulate[0], Component::X_I);
        assert!(!Component::S_N2.is_particulate());
    }

    #[test]
    fn clamp_reports_only_negative_entries() {
        let mut v = ComponentVector::from_element(1.0);
        v[Component::S_NO3.index()] = -1e-6;
        v[Component::X_PHA.index()] = -3.0;
        let clamped = clamp_non_negative(&mut v);
        assert_eq!(
            clamped,
            vec![Component::S_NO3.index(), Component::X_PHA.index()]
        );
        assert!(v.iter().all(|x| *x >= 0.0));
    }

    #[test]
    fn check_physical_rejects_negative_and_nan() {
        let mut s = StateVector::default_seed();
        assert!(s.check_physical().is_ok());
        s.X_H = -1.0;
        assert!(s.check_physical().unwrap_err().contains("X_H"));
        s.X_H = f64::NAN;
        assert!(s.check_physical().is_err());
    }

    #[test]
    fn conventional_indices_of_simple_stream() {
        let composition = Composition::new(&StoichiometricParameters::default());
        let mut s = StateVector::zeros();
        s.S_A = 10.0;
        s.S_I = 5.0;
        s.S_NH4 = 20.0;
        s.S_NO3 = 4.0;
        s.S_N2 = 7.0;
        s.S_PO4 = 3.0;
        s.X_PP = 1.0;
        let ind = s.conventional_indices(&composition, 0.65);
        assert_relative_eq!(ind.COD, 15.0, epsilon = 1e-12);
        assert_relative_eq!(ind.BOD5, 6.5, epsilon = 1e-12);
        assert_relative_eq!(ind.TN, 24.0 + 5.0 * 0.01, epsilon = 1e-12);
        assert_relative_eq!(ind.TKN, 20.0 + 5.0 * 0.01, epsilon = 1e-12);
        assert_relative_eq!(ind.TP, 4.0, epsilon = 1e-12);
        assert_relative_eq!(ind.TSS, 3.23, epsilon = 1e-12);
    }
}
