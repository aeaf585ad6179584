//! Temperature correction of ASM2d rate constants.
//!
//! `k(T) = k(T_ref)·θ^(T − T_ref)` is applied once per run to every rate constant family,
//! producing a new parameter set. Half-saturation constants and the η reduction factors are
//! temperature independent in ASM2d and are copied unchanged.
use crate::ASM2d::parameters::{KineticParameters, TemperatureCoefficients};

/// Arrhenius-type correction of a single rate constant
#[allow(non_snake_case)]
pub fn arrhenius_correction(k_ref: f64, theta: f64, T: f64, T_ref: f64) -> f64 {
    k_ref * theta.powf(T - T_ref)
}

/// Returns the kinetic set at operating temperature `T` (°C). The reference set is untouched.
#[allow(non_snake_case)]
pub fn correct_for_temperature(
    reference: &KineticParameters,
    coefficients: &TemperatureCoefficients,
    T: f64,
) -> KineticParameters {
    let T_ref = coefficients.T_ref;
    let c = |k: f64, theta: f64| arrhenius_correction(k, theta, T, T_ref);
    let mut corrected = reference.clone();

    corrected.K_h = c(reference.K_h, coefficients.theta_hydrolysis);

    corrected.mu_H = c(reference.mu_H, coefficients.theta_heterotrophs);
    corrected.q_fe = c(reference.q_fe, coefficients.theta_heterotrophs);
    corrected.b_H = c(reference.b_H, coefficients.theta_heterotrophs);

    corrected.q_PHA = c(reference.q_PHA, coefficients.theta_pao_storage);
    corrected.q_PP = c(reference.q_PP, coefficients.theta_pao_storage);
    corrected.mu_PAO = c(reference.mu_PAO, coefficients.theta_pao_storage);
    corrected.b_PAO = c(reference.b_PAO, coefficients.theta_pao_lysis);
    corrected.b_PP = c(reference.b_PP, coefficients.theta_pao_lysis);
    corrected.b_PHA = c(reference.b_PHA, coefficients.theta_pao_lysis);

    corrected.mu_AUT = c(reference.mu_AUT, coefficients.theta_autotroph_growth);
    corrected.b_AUT = c(reference.b_AUT, coefficients.theta_autotroph_lysis);

    corrected.k_PRE = c(reference.k_PRE, coefficients.theta_precipitation);
    corrected.k_RED = c(reference.k_RED, coefficients.theta_precipitation);
    corrected
}

impl KineticParameters {
    #[allow(non_snake_case)]
    pub fn at_temperature(&self, coefficients: &TemperatureCoefficients, T: f64) -> Self {
        correct_for_temperature(self, coefficients, T)
    }
}

/// Dissolved oxygen saturation in clean water at 1 atm, g O2/m3 (APHA polynomial, 0-40 °C)
#[allow(non_snake_case)]
pub fn oxygen_saturation(T: f64) -> f64 {
    14.652 - 0.41022 * T + 0.007991 * T.powi(2) - 0.000077774 * T.powi(3)
}
