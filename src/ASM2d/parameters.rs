//! # ASM2d Parameter Sets
//!
//! Three disjoint, immutable configuration records consumed by the process-rate model:
//!
//! - **`KineticParameters`**: maximum rates (1/d) and half-saturation constants
//!   (g/m³, mol/m³ for alkalinity)
//! - **`StoichiometricParameters`**: yields, inert fractions and N/P/TSS conversion factors
//! - **`TemperatureCoefficients`**: Arrhenius-type θ per rate constant family
//!
//! Defaults are the ASM2d values at 20 °C from Henze M., Gujer W., Mino T., Matsuo T.,
//! Wentzel M.C., Marais G.v.R., van Loosdrecht M.C.M. (1999) "Activated Sludge Model No.2d",
//! Water Sci. Technol. 39(1), 165-182.
//!
//! All records are plain values: they are built once by the caller, validated, and passed
//! explicitly into every run. Temperature correction produces a new `KineticParameters`
//! instead of mutating the reference set.
use crate::SludgeReactors::errors::SimulationError;
use serde::{Deserialize, Serialize};

fn check_non_negative(name: &str, value: f64) -> Result<(), SimulationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimulationError::InvalidParameter {
            name: name.to_string(),
            reason: format!("{} must be finite and non-negative", value),
        });
    }
    Ok(())
}

fn check_unit_interval(name: &str, value: f64, zero_allowed: bool) -> Result<(), SimulationError> {
    let lower_ok = if zero_allowed { value >= 0.0 } else { value > 0.0 };
    if !value.is_finite() || !lower_ok || value > 1.0 {
        let bounds = if zero_allowed { "[0, 1]" } else { "(0, 1]" };
        return Err(SimulationError::InvalidParameter {
            name: name.to_string(),
            reason: format!("{} is outside {}", value, bounds),
        });
    }
    Ok(())
}

/// Kinetic parameters of ASM2d
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
#[serde(default)]
pub struct KineticParameters {
    // hydrolysis of X_S
    /// hydrolysis rate constant, 1/d
    pub K_h: f64,
    /// anoxic hydrolysis reduction factor
    pub eta_NO3_hyd: f64,
    /// anaerobic hydrolysis reduction factor
    pub eta_fe: f64,
    pub K_O2_hyd: f64,
    pub K_NO3_hyd: f64,
    /// saturation coefficient for particulate COD, g X_S/g X_H
    pub K_X: f64,

    // heterotrophic organisms X_H
    pub mu_H: f64,
    /// maximum fermentation rate, 1/d
    pub q_fe: f64,
    pub eta_NO3_H: f64,
    pub b_H: f64,
    pub K_O2_H: f64,
    pub K_F: f64,
    pub K_fe: f64,
    pub K_A_H: f64,
    pub K_NO3_H: f64,
    pub K_NH4_H: f64,
    pub K_P_H: f64,
    pub K_ALK_H: f64,

    // phosphorus accumulating organisms X_PAO
    /// PHA storage rate, g X_PHA/(g X_PAO d)
    pub q_PHA: f64,
    /// polyphosphate storage rate, g X_PP/(g X_PAO d)
    pub q_PP: f64,
    pub mu_PAO: f64,
    /// share of aerobic PAO activity achievable with nitrate (denitrifying PAO)
    pub eta_NO3_PAO: f64,
    pub b_PAO: f64,
    pub b_PP: f64,
    pub b_PHA: f64,
    pub K_O2_PAO: f64,
    pub K_NO3_PAO: f64,
    pub K_A_PAO: f64,
    pub K_NH4_PAO: f64,
    /// saturation coefficient of phosphorus for PP storage
    pub K_PS: f64,
    /// saturation coefficient of phosphorus as nutrient
    pub K_P_PAO: f64,
    pub K_ALK_PAO: f64,
    pub K_PP: f64,
    /// maximum ratio X_PP/X_PAO, g P/g COD
    pub K_MAX: f64,
    pub K_IPP: f64,
    pub K_PHA: f64,

    // nitrifying organisms X_AUT
    pub mu_AUT: f64,
    pub b_AUT: f64,
    pub K_O2_AUT: f64,
    pub K_NH4_AUT: f64,
    pub K_ALK_AUT: f64,
    pub K_P_AUT: f64,

    // chemical precipitation
    /// precipitation rate constant, m3/(g Fe(OH)3 d)
    pub k_PRE: f64,
    /// redissolution rate constant, 1/d
    pub k_RED: f64,
    pub K_ALK_PRE: f64,
}

impl Default for KineticParameters {
    fn default() -> Self {
        Self {
            K_h: 3.0,
            eta_NO3_hyd: 0.6,
            eta_fe: 0.4,
            K_O2_hyd: 0.2,
            K_NO3_hyd: 0.5,
            K_X: 0.1,

            mu_H: 6.0,
            q_fe: 3.0,
            eta_NO3_H: 0.8,
            b_H: 0.4,
            K_O2_H: 0.2,
            K_F: 4.0,
            K_fe: 4.0,
            K_A_H: 4.0,
            K_NO3_H: 0.5,
            K_NH4_H: 0.05,
            K_P_H: 0.01,
            K_ALK_H: 0.1,

            q_PHA: 3.0,
            q_PP: 1.5,
            mu_PAO: 1.0,
            eta_NO3_PAO: 0.6,
            b_PAO: 0.2,
            b_PP: 0.2,
            b_PHA: 0.2,
            K_O2_PAO: 0.2,
            K_NO3_PAO: 0.5,
            K_A_PAO: 4.0,
            K_NH4_PAO: 0.05,
            K_PS: 0.2,
            K_P_PAO: 0.01,
            K_ALK_PAO: 0.1,
            K_PP: 0.01,
            K_MAX: 0.34,
            K_IPP: 0.02,
            K_PHA: 0.01,

            mu_AUT: 1.0,
            b_AUT: 0.15,
            K_O2_AUT: 0.5,
            K_NH4_AUT: 1.0,
            K_ALK_AUT: 0.5,
            K_P_AUT: 0.01,

            k_PRE: 1.0,
            k_RED: 0.6,
            K_ALK_PRE: 0.5,
        }
    }
}

impl KineticParameters {
    /// All parameters as (name, value) pairs, in declaration order
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("K_h", self.K_h),
            ("eta_NO3_hyd", self.eta_NO3_hyd),
            ("eta_fe", self.eta_fe),
            ("K_O2_hyd", self.K_O2_hyd),
            ("K_NO3_hyd", self.K_NO3_hyd),
            ("K_X", self.K_X),
            ("mu_H", self.mu_H),
            ("q_fe", self.q_fe),
            ("eta_NO3_H", self.eta_NO3_H),
            ("b_H", self.b_H),
            ("K_O2_H", self.K_O2_H),
            ("K_F", self.K_F),
            ("K_fe", self.K_fe),
            ("K_A_H", self.K_A_H),
            ("K_NO3_H", self.K_NO3_H),
            ("K_NH4_H", self.K_NH4_H),
            ("K_P_H", self.K_P_H),
            ("K_ALK_H", self.K_ALK_H),
            ("q_PHA", self.q_PHA),
            ("q_PP", self.q_PP),
            ("mu_PAO", self.mu_PAO),
            ("eta_NO3_PAO", self.eta_NO3_PAO),
            ("b_PAO", self.b_PAO),
            ("b_PP", self.b_PP),
            ("b_PHA", self.b_PHA),
            ("K_O2_PAO", self.K_O2_PAO),
            ("K_NO3_PAO", self.K_NO3_PAO),
            ("K_A_PAO", self.K_A_PAO),
            ("K_NH4_PAO", self.K_NH4_PAO),
            ("K_PS", self.K_PS),
            ("K_P_PAO", self.K_P_PAO),
            ("K_ALK_PAO", self.K_ALK_PAO),
            ("K_PP", self.K_PP),
            ("K_MAX", self.K_MAX),
            ("K_IPP", self.K_IPP),
            ("K_PHA", self.K_PHA),
            ("mu_AUT", self.mu_AUT),
            ("b_AUT", self.b_AUT),
            ("K_O2_AUT", self.K_O2_AUT),
            ("K_NH4_AUT", self.K_NH4_AUT),
            ("K_ALK_AUT", self.K_ALK_AUT),
            ("K_P_AUT", self.K_P_AUT),
            ("k_PRE", self.k_PRE),
            ("k_RED", self.k_RED),
            ("K_ALK_PRE", self.K_ALK_PRE),
        ]
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        for (name, value) in self.named_values() {
            check_non_negative(name, value)?;
        }
        for (name, value) in [
            ("eta_NO3_hyd", self.eta_NO3_hyd),
            ("eta_fe", self.eta_fe),
            ("eta_NO3_H", self.eta_NO3_H),
            ("eta_NO3_PAO", self.eta_NO3_PAO),
        ] {
            check_unit_interval(name, value, true)?;
        }
        // the storage capacity switch divides by K_IPP + (K_MAX - X_PP/X_PAO)
        if self.K_MAX <= 0.0 || self.K_IPP <= 0.0 {
            return Err(SimulationError::InvalidParameter {
                name: "K_MAX/K_IPP".to_string(),
                reason: "polyphosphate storage capacity constants must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Stoichiometric parameters and conversion factors of ASM2d
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
#[serde(default)]
pub struct StoichiometricParameters {
    /// production of S_I in hydrolysis
    pub f_SI: f64,
    /// heterotrophic yield, g X_H/g COD
    pub Y_H: f64,
    /// fraction of inert COD generated in lysis
    pub f_XI: f64,
    pub Y_PAO: f64,
    /// PP requirement for PHA storage (P release), g P/g COD
    pub Y_PO4: f64,
    /// PHA requirement for PP storage, g COD/g P
    pub Y_PHA: f64,
    /// autotrophic yield, g X_AUT/g N
    pub Y_A: f64,

    pub i_N_SI: f64,
    pub i_N_SF: f64,
    pub i_N_XI: f64,
    pub i_N_XS: f64,
    pub i_N_BM: f64,

    pub i_P_SI: f64,
    pub i_P_SF: f64,
    pub i_P_XI: f64,
    pub i_P_XS: f64,
    pub i_P_BM: f64,

    pub i_TSS_XI: f64,
    pub i_TSS_XS: f64,
    pub i_TSS_BM: f64,
}

impl Default for StoichiometricParameters {
    fn default() -> Self {
        Self {
            f_SI: 0.0,
            Y_H: 0.625,
            f_XI: 0.1,
            Y_PAO: 0.625,
            Y_PO4: 0.40,
            Y_PHA: 0.20,
            Y_A: 0.24,

            i_N_SI: 0.01,
            i_N_SF: 0.03,
            i_N_XI: 0.02,
            i_N_XS: 0.04,
            i_N_BM: 0.07,

            i_P_SI: 0.0,
            i_P_SF: 0.01,
            i_P_XI: 0.01,
            i_P_XS: 0.01,
            i_P_BM: 0.02,

            i_TSS_XI: 0.75,
            i_TSS_XS: 0.75,
            i_TSS_BM: 0.90,
        }
    }
}

impl StoichiometricParameters {
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("f_SI", self.f_SI),
            ("Y_H", self.Y_H),
            ("f_XI", self.f_XI),
            ("Y_PAO", self.Y_PAO),
            ("Y_PO4", self.Y_PO4),
            ("Y_PHA", self.Y_PHA),
            ("Y_A", self.Y_A),
            ("i_N_SI", self.i_N_SI),
            ("i_N_SF", self.i_N_SF),
            ("i_N_XI", self.i_N_XI),
            ("i_N_XS", self.i_N_XS),
            ("i_N_BM", self.i_N_BM),
            ("i_P_SI", self.i_P_SI),
            ("i_P_SF", self.i_P_SF),
            ("i_P_XI", self.i_P_XI),
            ("i_P_XS", self.i_P_XS),
            ("i_P_BM", self.i_P_BM),
            ("i_TSS_XI", self.i_TSS_XI),
            ("i_TSS_XS", self.i_TSS_XS),
            ("i_TSS_BM", self.i_TSS_BM),
        ]
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        for (name, value) in self.named_values() {
            check_non_negative(name, value)?;
        }
        for (name, value) in [("Y_H", self.Y_H), ("Y_PAO", self.Y_PAO), ("Y_A", self.Y_A)] {
            check_unit_interval(name, value, false)?;
        }
        for (name, value) in [("f_SI", self.f_SI), ("f_XI", self.f_XI)] {
            check_unit_interval(name, value, true)?;
        }
        for (name, value) in [("Y_PO4", self.Y_PO4), ("Y_PHA", self.Y_PHA)] {
            if value <= 0.0 {
                return Err(SimulationError::InvalidParameter {
                    name: name.to_string(),
                    reason: "storage yields must be positive".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Arrhenius-type temperature coefficients θ, one per rate constant family:
/// k(T) = k(T_ref)·θ^(T − T_ref)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
#[serde(default)]
pub struct TemperatureCoefficients {
    /// reference temperature of the kinetic set, °C
    pub T_ref: f64,
    /// K_h
    pub theta_hydrolysis: f64,
    /// mu_H, q_fe, b_H
    pub theta_heterotrophs: f64,
    /// q_PHA, q_PP, mu_PAO
    pub theta_pao_storage: f64,
    /// b_PAO, b_PP, b_PHA
    pub theta_pao_lysis: f64,
    pub theta_autotroph_growth: f64,
    pub theta_autotroph_lysis: f64,
    /// k_PRE, k_RED
    pub theta_precipitation: f64,
}

impl Default for TemperatureCoefficients {
    // θ = (k20/k10)^(1/10) from the 10 °C and 20 °C ASM2d parameter sets
    fn default() -> Self {
        Self {
            T_ref: 20.0,
            theta_hydrolysis: 1.041,
            theta_heterotrophs: 1.072,
            theta_pao_storage: 1.041,
            theta_pao_lysis: 1.072,
            theta_autotroph_growth: 1.111,
            theta_autotroph_lysis: 1.116,
            theta_precipitation: 1.0,
        }
    }
}

impl TemperatureCoefficients {
    /// coefficients that leave every rate constant unchanged
    pub fn neutral() -> Self {
        Self {
            T_ref: 20.0,
            theta_hydrolysis: 1.0,
            theta_heterotrophs: 1.0,
            theta_pao_storage: 1.0,
            theta_pao_lysis: 1.0,
            theta_autotroph_growth: 1.0,
            theta_autotroph_lysis: 1.0,
            theta_precipitation: 1.0,
        }
    }

    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("theta_hydrolysis", self.theta_hydrolysis),
            ("theta_heterotrophs", self.theta_heterotrophs),
            ("theta_pao_storage", self.theta_pao_storage),
            ("theta_pao_lysis", self.theta_pao_lysis),
            ("theta_autotroph_growth", self.theta_autotroph_growth),
            ("theta_autotroph_lysis", self.theta_autotroph_lysis),
            ("theta_precipitation", self.theta_precipitation),
        ]
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.T_ref.is_finite() {
            return Err(SimulationError::InvalidParameter {
                name: "T_ref".to_string(),
                reason: "reference temperature must be finite".to_string(),
            });
        }
        for (name, value) in self.named_values() {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimulationError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("temperature coefficient {} must be positive", value),
                });
            }
        }
        Ok(())
    }
}
