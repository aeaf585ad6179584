//! # Influent Characterization
//!
//! Converts the conventional influent description (flow, COD, BOD5, nitrogen and phosphorus
//! species, VFA, alkalinity) into an ASM2d `StateVector`, and describes how the influent
//! varies in time during dynamic runs.
//!
//! ## Main Structures
//!
//! - **`InfluentDescriptor`**: measured flow and concentrations
//! - **`InfluentFractions`**: COD fractionation (S_I, X_I, S_F, X_H as fractions of total COD)
//! - **`InfluentProfile`** / **`InfluentPattern`**: time-varying multipliers of flow and load
//!   (constant, diurnal sinusoid, step change)
//!
//! ## Non-Obvious Features
//!
//! - VFA are taken as S_A directly; slowly biodegradable X_S is the COD remainder.
//! - Orthophosphate is computed as TP minus the organic P of the fractionated COD so that
//!   the modelled influent TP equals the measured one. The measured orthophosphate is only
//!   used when the organic fractions alone carry more P than TP.
//! - Alkalinity is given as g CaCO3/m3 and stored as mol HCO3/m3 (÷ 50).
//! - Measured TKN, PO4 and TSS that disagree with the fractionation are reported with `warn!`
//!   but never rejected.
use crate::ASM2d::state_vector::{Component, StateVector};
use crate::ASM2d::stoichiometry::Composition;
use crate::SludgeReactors::errors::SimulationError;
use enum_dispatch::enum_dispatch;
use log::warn;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// g CaCO3 per mol of alkalinity
pub const CACO3_PER_MOL_ALK: f64 = 50.0;
/// BOD5 per g biodegradable COD when the influent BOD5 is not known
pub const DEFAULT_BOD_FACTOR: f64 = 0.65;

fn default_alkalinity() -> f64 {
    250.0
}

/// Measured influent: flow in m3/d, concentrations in g/m3, alkalinity in g CaCO3/m3
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct InfluentDescriptor {
    pub Q: f64,
    pub COD: f64,
    #[serde(default)]
    pub BOD5: Option<f64>,
    #[serde(default)]
    pub TSS: Option<f64>,
    #[serde(default)]
    pub VSS: Option<f64>,
    #[serde(default)]
    pub TKN: Option<f64>,
    pub NH4: f64,
    #[serde(default)]
    pub NO3: f64,
    pub TP: f64,
    #[serde(default)]
    pub PO4: Option<f64>,
    #[serde(default)]
    pub VFA: f64,
    #[serde(default = "default_alkalinity")]
    pub alkalinity: f64,
}

impl Default for InfluentDescriptor {
    fn default() -> Self {
        Self {
            Q: 10_000.0,
            COD: 400.0,
            BOD5: Some(200.0),
            TSS: Some(200.0),
            VSS: Some(160.0),
            TKN: Some(40.0),
            NH4: 25.0,
            NO3: 0.0,
            TP: 8.0,
            PO4: Some(4.5),
            VFA: 40.0,
            alkalinity: default_alkalinity(),
        }
    }
}

impl InfluentDescriptor {
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !self.Q.is_finite() || self.Q <= 0.0 {
            return Err(SimulationError::InvalidInfluent(format!(
                "flow rate must be positive, got {}",
                self.Q
            )));
        }
        let optional = [
            ("BOD5", self.BOD5),
            ("TSS", self.TSS),
            ("VSS", self.VSS),
            ("TKN", self.TKN),
            ("PO4", self.PO4),
        ];
        let required = [
            ("COD", Some(self.COD)),
            ("NH4", Some(self.NH4)),
            ("NO3", Some(self.NO3)),
            ("TP", Some(self.TP)),
            ("VFA", Some(self.VFA)),
            ("alkalinity", Some(self.alkalinity)),
        ];
        for (name, value) in required.iter().chain(optional.iter()) {
            if let Some(v) = value {
                if !v.is_finite() || *v < 0.0 {
                    return Err(SimulationError::InvalidInfluent(format!(
                        "{} must be finite and non-negative, got {}",
                        name, v
                    )));
                }
            }
        }
        if self.VFA > self.COD {
            return Err(SimulationError::InvalidInfluent(format!(
                "VFA ({}) exceed total COD ({})",
                self.VFA, self.COD
            )));
        }
        if let Some(tkn) = self.TKN {
            if tkn < self.NH4 {
                return Err(SimulationError::InvalidInfluent(format!(
                    "TKN ({}) is lower than ammonia ({})",
                    tkn, self.NH4
                )));
            }
        }
        if let (Some(tss), Some(vss)) = (self.TSS, self.VSS) {
            if vss > tss {
                return Err(SimulationError::InvalidInfluent(format!(
                    "VSS ({}) exceed TSS ({})",
                    vss, tss
                )));
            }
        }
        Ok(())
    }
}

/// COD fractions of the influent; X_S takes the remainder after VFA and these fractions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
#[serde(default)]
pub struct InfluentFractions {
    pub f_SI: f64,
    pub f_XI: f64,
    pub f_SF: f64,
    pub f_XH: f64,
}

impl Default for InfluentFractions {
    fn default() -> Self {
        Self {
            f_SI: 0.05,
            f_XI: 0.13,
            f_SF: 0.15,
            f_XH: 0.05,
        }
    }
}

fn mismatch(measured: f64, modelled: f64) -> bool {
    (measured - modelled).abs() > 0.5_f64.max(0.1 * measured)
}

impl InfluentFractions {
    pub fn validate(&self) -> Result<(), SimulationError> {
        let fractions = [
            ("f_SI", self.f_SI),
            ("f_XI", self.f_XI),
            ("f_SF", self.f_SF),
            ("f_XH", self.f_XH),
        ];
        for (name, f) in fractions {
            if !f.is_finite() || !(0.0..=1.0).contains(&f) {
                return Err(SimulationError::InvalidParameter {
                    name: name.to_string(),
                    reason: format!("COD fraction {} is outside [0, 1]", f),
                });
            }
        }
        let sum: f64 = fractions.iter().map(|(_, f)| f).sum();
        if sum > 1.0 + 1e-12 {
            return Err(SimulationError::InvalidParameter {
                name: "influent fractions".to_string(),
                reason: format!("COD fractions sum to {:.3} > 1", sum),
            });
        }
        Ok(())
    }

    /// Converts the influent into an ASM2d state vector
    pub fn fractionate(
        &self,
        influent: &InfluentDescriptor,
        composition: &Composition,
    ) -> Result<StateVector, SimulationError> {
        influent.validate()?;
        self.validate()?;
        let cod = influent.COD;
        let mut state = StateVector::zeros();
        state.S_A = influent.VFA;
        state.S_I = self.f_SI * cod;
        state.S_F = self.f_SF * cod;
        state.X_I = self.f_XI * cod;
        state.X_H = self.f_XH * cod;
        let x_s = cod - state.S_A - state.S_I - state.S_F - state.X_I - state.X_H;
        if x_s < -1e-9 * cod.max(1.0) {
            return Err(SimulationError::InvalidInfluent(format!(
                "VFA and COD fractions exceed total COD by {:.3} g/m3",
                -x_s
            )));
        }
        state.X_S = x_s.max(0.0);
        state.S_NH4 = influent.NH4;
        state.S_NO3 = influent.NO3;
        state.S_ALK = influent.alkalinity / CACO3_PER_MOL_ALK;

        let organic_p = composition.phosphorus.dot(&state.to_vector());
        state.S_PO4 = if influent.TP >= organic_p {
            influent.TP - organic_p
        } else {
            let fallback = influent.PO4.unwrap_or(0.0);
            warn!(
                "organic P of the COD fractions ({:.2}) exceeds TP ({:.2}); \
                 using measured PO4 = {:.2}",
                organic_p, influent.TP, fallback
            );
            fallback
        };

        let vector = state.to_vector();
        if let Some(po4) = influent.PO4 {
            if mismatch(po4, state.S_PO4) {
                warn!(
                    "measured PO4 {:.2} differs from TP minus organic P ({:.2})",
                    po4, state.S_PO4
                );
            }
        }
        if let Some(tkn) = influent.TKN {
            let modelled = composition.nitrogen.dot(&vector) - state.S_NO3;
            if mismatch(tkn, modelled) {
                warn!(
                    "measured TKN {:.2} differs from the fractionated TKN {:.2}",
                    tkn, modelled
                );
            }
        }
        if let Some(tss) = influent.TSS {
            let modelled = composition.tss.dot(&vector);
            if mismatch(tss, modelled) {
                warn!(
                    "measured TSS {:.2} differs from the fractionated TSS {:.2}",
                    tss, modelled
                );
            }
        }
        Ok(state)
    }
}

/// BOD5 per g biodegradable COD, calibrated on the measured influent BOD5 when available
pub fn bod_factor(
    influent: &InfluentDescriptor,
    influent_state: &StateVector,
    composition: &Composition,
) -> f64 {
    let biodegradable = composition.biodegradable.dot(&influent_state.to_vector());
    match influent.BOD5 {
        Some(bod) if biodegradable > 0.0 && bod > 0.0 => {
            let factor = bod / biodegradable;
            if factor > 1.0 {
                warn!(
                    "influent BOD5 ({:.1}) exceeds the biodegradable COD ({:.1}); \
                     BOD factor capped at 1",
                    bod, biodegradable
                );
            }
            factor.min(1.0)
        }
        _ => DEFAULT_BOD_FACTOR,
    }
}

/// Influent at time `t`: concentrations scaled by the load factor (alkalinity excluded)
pub fn scaled_influent(base: &StateVector, load_factor: f64) -> StateVector {
    let mut scaled = *base;
    for component in Component::ALL {
        if component != Component::S_ALK {
            scaled.set(component, base.get(component) * load_factor);
        }
    }
    scaled
}

#[enum_dispatch]
pub trait InfluentProfile {
    /// multiplier of the design flow at time `t` (d)
    fn flow_factor(&self, t: f64) -> f64;
    /// multiplier of pollutant concentrations at time `t` (d)
    fn load_factor(&self, t: f64) -> f64;
    /// lowest flow multiplier the pattern can produce
    fn min_flow_factor(&self) -> f64;
    fn validate(&self) -> Result<(), SimulationError>;
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ConstantInfluent {}

impl InfluentProfile for ConstantInfluent {
    fn flow_factor(&self, _t: f64) -> f64 {
        1.0
    }
    fn load_factor(&self, _t: f64) -> f64 {
        1.0
    }
    fn min_flow_factor(&self) -> f64 {
        1.0
    }
    fn validate(&self) -> Result<(), SimulationError> {
        Ok(())
    }
}

/// Daily sinusoid: factor = 1 + A·cos(2π(t − t_peak)), t in days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiurnalInfluent {
    pub flow_amplitude: f64,
    pub load_amplitude: f64,
    /// hour of the day at which flow peaks
    pub flow_peak_hour: f64,
    pub load_peak_hour: f64,
}

impl Default for DiurnalInfluent {
    fn default() -> Self {
        Self {
            flow_amplitude: 0.3,
            load_amplitude: 0.2,
            flow_peak_hour: 12.0,
            load_peak_hour: 14.0,
        }
    }
}

fn daily_wave(t: f64, amplitude: f64, peak_hour: f64) -> f64 {
    1.0 + amplitude * (2.0 * PI * (t - peak_hour / 24.0)).cos()
}

impl InfluentProfile for DiurnalInfluent {
    fn flow_factor(&self, t: f64) -> f64 {
        daily_wave(t, self.flow_amplitude, self.flow_peak_hour)
    }
    fn load_factor(&self, t: f64) -> f64 {
        daily_wave(t, self.load_amplitude, self.load_peak_hour)
    }
    fn min_flow_factor(&self) -> f64 {
        1.0 - self.flow_amplitude
    }
    fn validate(&self) -> Result<(), SimulationError> {
        for (name, a) in [
            ("flow_amplitude", self.flow_amplitude),
            ("load_amplitude", self.load_amplitude),
        ] {
            if !a.is_finite() || !(0.0..1.0).contains(&a) {
                return Err(SimulationError::InvalidInfluent(format!(
                    "diurnal {} must lie in [0, 1), got {}",
                    name, a
                )));
            }
        }
        Ok(())
    }
}

/// Flow and load jump to new multipliers at `time` (d)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInfluent {
    pub time: f64,
    pub flow_factor: f64,
    pub load_factor: f64,
}

impl InfluentProfile for StepInfluent {
    fn flow_factor(&self, t: f64) -> f64 {
        if t >= self.time { self.flow_factor } else { 1.0 }
    }
    fn load_factor(&self, t: f64) -> f64 {
        if t >= self.time { self.load_factor } else { 1.0 }
    }
    fn min_flow_factor(&self) -> f64 {
        self.flow_factor.min(1.0)
    }
    fn validate(&self) -> Result<(), SimulationError> {
        if !self.flow_factor.is_finite() || self.flow_factor <= 0.0 {
            return Err(SimulationError::InvalidInfluent(
                "step flow factor must be positive".to_string(),
            ));
        }
        if !self.load_factor.is_finite() || self.load_factor < 0.0 {
            return Err(SimulationError::InvalidInfluent(
                "step load factor must be non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Time pattern of the influent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[enum_dispatch(InfluentProfile)]
pub enum InfluentPattern {
    Constant(ConstantInfluent),
    Diurnal(DiurnalInfluent),
    Step(StepInfluent),
}

impl Default for InfluentPattern {
    fn default() -> Self {
        InfluentPattern::Constant(ConstantInfluent {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ASM2d::parameters::StoichiometricParameters;
    use approx::assert_relative_eq;

    fn composition() -> Composition {
        Composition::new(&StoichiometricParameters::default())
    }

    #[test]
    fn fractionation_conserves_cod_and_tp() {
        let influent = InfluentDescriptor::default();
        let c = composition();
        let state = InfluentFractions::default()
            .fractionate(&influent, &c)
            .unwrap();
        let v = state.to_vector();
        assert_relative_eq!(c.cod_pollutant.dot(&v), 400.0, epsilon = 1e-9);
        assert_relative_eq!(c.phosphorus.dot(&v), 8.0, epsilon = 1e-9);
        assert_eq!(state.S_A, 40.0);
        assert_relative_eq!(state.X_S, 400.0 - 40.0 - 0.38 * 400.0, epsilon = 1e-9);
        assert_relative_eq!(state.S_ALK, 5.0, epsilon = 1e-12);
        assert_relative_eq!(state.S_PO4, 4.4, epsilon = 1e-9);
    }

    #[test]
    fn overshooting_fractions_are_rejected() {
        let mut influent = InfluentDescriptor::default();
        influent.VFA = 300.0;
        let result = InfluentFractions::default().fractionate(&influent, &composition());
        assert!(matches!(result, Err(SimulationError::InvalidInfluent(_))));

        let fractions = InfluentFractions {
            f_SI: 0.5,
            f_XI: 0.4,
            f_SF: 0.2,
            f_XH: 0.0,
        };
        assert!(fractions.validate().is_err());
    }

    #[test]
    fn negative_flow_is_rejected() {
        let mut influent = InfluentDescriptor::default();
        influent.Q = 0.0;
        assert!(influent.validate().is_err());
        influent.Q = 100.0;
        influent.TKN = Some(10.0);
        assert!(influent.validate().is_err());
    }

    #[test]
    fn bod_factor_uses_measured_bod() {
        let influent = InfluentDescriptor::default();
        let c = composition();
        let state = InfluentFractions::default().fractionate(&influent, &c).unwrap();
        let factor = bod_factor(&influent, &state, &c);
        let biodegradable = c.biodegradable.dot(&state.to_vector());
        assert_relative_eq!(factor * biodegradable, 200.0, epsilon = 1e-9);

        let mut unknown = influent.clone();
        unknown.BOD5 = None;
        assert_eq!(bod_factor(&unknown, &state, &c), DEFAULT_BOD_FACTOR);
    }

    #[test]
    fn patterns_dispatch_through_trait() {
        let constant = InfluentPattern::default();
        assert_eq!(constant.flow_factor(3.3), 1.0);

        let diurnal: InfluentPattern = DiurnalInfluent::default().into();
        assert_relative_eq!(diurnal.flow_factor(0.5), 1.3, epsilon = 1e-12);
        assert_relative_eq!(diurnal.flow_factor(0.0), 0.7, epsilon = 1e-12);
        assert_relative_eq!(diurnal.min_flow_factor(), 0.7, epsilon = 1e-12);

        let step = InfluentPattern::Step(StepInfluent {
            time: 2.0,
            flow_factor: 1.5,
            load_factor: 0.5,
        });
        assert_eq!(step.flow_factor(1.99), 1.0);
        assert_eq!(step.load_factor(2.0), 0.5);
        assert!(step.validate().is_ok());
    }

    #[test]
    fn pattern_serde_is_externally_tagged() {
        let json = r#"{"Diurnal": {"flow_amplitude": 0.2}}"#;
        let pattern: InfluentPattern = serde_json::from_str(json).unwrap();
        match pattern {
            InfluentPattern::Diurnal(d) => {
                assert_eq!(d.flow_amplitude, 0.2);
                assert_eq!(d.load_amplitude, 0.2);
            }
            other => panic!("unexpected pattern {:?}", other),
        }
    }

    #[test]
    fn scaling_leaves_alkalinity() {
        let mut s = StateVector::zeros();
        s.S_F = 10.0;
        s.S_ALK = 5.0;
        let scaled = scaled_influent(&s, 2.0);
        assert_eq!(scaled.S_F, 20.0);
        assert_eq!(scaled.S_ALK, 5.0);
    }
}
