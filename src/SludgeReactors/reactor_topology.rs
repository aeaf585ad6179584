//! # Reactor Topology & Recycle Coupling
//!
//! An ordered chain of continuously stirred zones followed by an ideal secondary clarifier.
//!
//! ## Flow scheme
//!
//! ```text
//!            Q_RAS (underflow, lagged)
//!   ┌───────────────────────────────────────────────┐
//!   v                                               │
//! Q ─> [zone 1] ─> [zone 2] ─> ... ─> [zone n] ─> clarifier ─> effluent Q_e = Q − Q_w
//!                     ^                   │  │
//!                     └── Q_IR (lagged) ──┘  └─> wastage Q_w (mixed liquor)
//! ```
//!
//! ## Main Structures
//!
//! - **`ReactorZone`**: name, `ZoneType`, volume or HRT, DO setpoint, step-feed share
//! - **`ReactorTopology`**: zones + SRT, temperature, recycle ratios, optional process groups
//! - **`FlowSheet`**: the topology resolved against a design flow: volumes, DO setpoints,
//!   recycle and wastage flows, clarifier split and zone inflow mixing
//!
//! ## Non-Obvious Features
//!
//! - The wastage flow is derived, not configured:
//!   `Q_w = (V_tot/SRT − (1 − e)(Q + Q_RAS))/e`, e being the clarifier capture efficiency,
//!   so that solids leaving through wastage and effluent realise the configured SRT.
//! - Recycles use the previous step's last-zone state (one-step lag). Forward links use the
//!   current step's upstream state because zones are swept in order.
//! - A capture efficiency of zero means no clarifier: no return sludge, no wastage, SRT = HRT.
use crate::ASM2d::process_rates::{ModelOptions, ZoneType};
use crate::ASM2d::state_vector::{Component, ComponentVector};
use crate::ASM2d::temperature_correction::oxygen_saturation;
use crate::SludgeReactors::errors::SimulationError;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_DO_SETPOINT: f64 = 2.0;
pub const DEFAULT_CAPTURE_EFFICIENCY: f64 = 0.999;
/// operating temperature range of the ASM2d parameter set, °C
pub const TEMPERATURE_RANGE: (f64, f64) = (5.0, 35.0);

fn default_true() -> bool {
    true
}

fn default_capture_efficiency() -> f64 {
    DEFAULT_CAPTURE_EFFICIENCY
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct ReactorZone {
    pub name: String,
    pub zone_type: ZoneType,
    /// m3
    #[serde(default)]
    pub volume: Option<f64>,
    /// hydraulic retention time based on the influent flow, h
    #[serde(default)]
    pub HRT_hours: Option<f64>,
    /// g O2/m3, aerobic zones only
    #[serde(default)]
    pub DO_setpoint: Option<f64>,
    /// share of the influent fed to this zone (step feed)
    #[serde(default)]
    pub feed_fraction: Option<f64>,
}

impl ReactorZone {
    pub fn new(name: &str, zone_type: ZoneType, volume: f64) -> Self {
        Self {
            name: name.to_string(),
            zone_type,
            volume: Some(volume),
            HRT_hours: None,
            DO_setpoint: None,
            feed_fraction: None,
        }
    }

    #[allow(non_snake_case)]
    pub fn with_HRT(name: &str, zone_type: ZoneType, hours: f64) -> Self {
        Self {
            name: name.to_string(),
            zone_type,
            volume: None,
            HRT_hours: Some(hours),
            DO_setpoint: None,
            feed_fraction: None,
        }
    }

    #[allow(non_snake_case)]
    pub fn DO(mut self, setpoint: f64) -> Self {
        self.DO_setpoint = Some(setpoint);
        self
    }

    pub fn feed(mut self, fraction: f64) -> Self {
        self.feed_fraction = Some(fraction);
        self
    }

    fn invalid(&self, reason: impl Into<String>) -> SimulationError {
        SimulationError::InvalidZone {
            zone: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn validate(&self) -> Result<(), SimulationError> {
        if self.name.trim().is_empty() {
            return Err(self.invalid("zone name is empty"));
        }
        match (self.volume, self.HRT_hours) {
            (None, None) => return Err(self.invalid("neither volume nor HRT is given")),
            (Some(v), _) if !v.is_finite() || v <= 0.0 => {
                return Err(self.invalid(format!("volume must be positive, got {}", v)));
            }
            (_, Some(h)) if !h.is_finite() || h <= 0.0 => {
                return Err(self.invalid(format!("HRT must be positive, got {}", h)));
            }
            _ => {}
        }
        if let Some(setpoint) = self.DO_setpoint {
            if self.zone_type != ZoneType::Aerobic {
                return Err(self.invalid(format!(
                    "DO setpoint given for a {} zone",
                    self.zone_type
                )));
            }
            if !setpoint.is_finite() || setpoint <= 0.0 {
                return Err(self.invalid(format!("DO setpoint must be positive, got {}", setpoint)));
            }
        }
        if let Some(f) = self.feed_fraction {
            if !f.is_finite() || !(0.0..=1.0).contains(&f) {
                return Err(self.invalid(format!("feed fraction {} is outside [0, 1]", f)));
            }
        }
        Ok(())
    }
}

/// Plant layout and operating conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct ReactorTopology {
    pub zones: Vec<ReactorZone>,
    /// solids retention time, d
    pub SRT: f64,
    /// °C
    pub temperature: f64,
    /// internal (mixed liquor) recycle, multiple of influent flow
    pub internal_recycle_ratio: f64,
    /// return activated sludge, multiple of influent flow
    pub return_sludge_ratio: f64,
    /// zone receiving the internal recycle; first anoxic zone when absent
    #[serde(default)]
    pub internal_recycle_to: Option<String>,
    #[serde(default = "default_true")]
    pub denitrifying_pao: bool,
    #[serde(default)]
    pub chemical_precipitation: bool,
    /// metal hydroxide dosed with the influent, g X_MeOH/m3
    #[serde(default)]
    pub metal_dose: f64,
    #[serde(default = "default_capture_efficiency")]
    pub capture_efficiency: f64,
}

impl Default for ReactorTopology {
    /// three-stage anaerobic/anoxic/aerobic (A2O) plant
    fn default() -> Self {
        Self {
            zones: vec![
                ReactorZone::new("anaerobic", ZoneType::Anaerobic, 1000.0),
                ReactorZone::new("anoxic", ZoneType::Anoxic, 2000.0),
                ReactorZone::new("aerobic", ZoneType::Aerobic, 4000.0).DO(DEFAULT_DO_SETPOINT),
            ],
            SRT: 15.0,
            temperature: 20.0,
            internal_recycle_ratio: 3.0,
            return_sludge_ratio: 0.5,
            internal_recycle_to: None,
            denitrifying_pao: true,
            chemical_precipitation: false,
            metal_dose: 0.0,
            capture_efficiency: DEFAULT_CAPTURE_EFFICIENCY,
        }
    }
}

impl ReactorTopology {
    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            denitrifying_pao: self.denitrifying_pao,
            chemical_precipitation: self.chemical_precipitation,
        }
    }

    /// index of the zone receiving the internal recycle
    pub fn recycle_target(&self) -> Result<Option<usize>, SimulationError> {
        match &self.internal_recycle_to {
            Some(name) => self
                .zones
                .iter()
                .position(|z| &z.name == name)
                .map(Some)
                .ok_or_else(|| {
                    SimulationError::InvalidConfiguration(format!(
                        "internal recycle target '{}' is not a zone",
                        name
                    ))
                }),
            None => Ok(self
                .zones
                .iter()
                .position(|z| z.zone_type == ZoneType::Anoxic)),
        }
    }

    /// Checks everything that does not depend on the influent flow
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.zones.is_empty() {
            return Err(SimulationError::InvalidConfiguration(
                "zone list is empty".to_string(),
            ));
        }
        let mut names = HashSet::new();
        for zone in &self.zones {
            zone.validate()?;
            if !names.insert(zone.name.as_str()) {
                return Err(zone.invalid("duplicate zone name"));
            }
        }
        let given: Vec<f64> = self.zones.iter().filter_map(|z| z.feed_fraction).collect();
        if !given.is_empty() {
            let sum: f64 = given.iter().sum();
            if (sum - 1.0).abs() > 1e-6 {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "feed fractions sum to {:.4}, expected 1",
                    sum
                )));
            }
        }
        if !self.SRT.is_finite() || self.SRT <= 0.0 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "SRT must be positive, got {}",
                self.SRT
            )));
        }
        let (t_min, t_max) = TEMPERATURE_RANGE;
        if !(t_min..=t_max).contains(&self.temperature) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "temperature {} °C is outside {}-{} °C",
                self.temperature, t_min, t_max
            )));
        }
        for (name, ratio) in [
            ("internal recycle ratio", self.internal_recycle_ratio),
            ("return sludge ratio", self.return_sludge_ratio),
        ] {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "{} must be non-negative, got {}",
                    name, ratio
                )));
            }
        }
        let target = self.recycle_target()?;
        if self.internal_recycle_ratio > 0.0 && target.is_none() {
            return Err(SimulationError::InvalidConfiguration(
                "internal recycle requires an anoxic zone or an explicit target".to_string(),
            ));
        }
        let e = self.capture_efficiency;
        if !e.is_finite() || !(0.0..=1.0).contains(&e) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "capture efficiency {} is outside [0, 1]",
                e
            )));
        }
        if e > 0.0 && self.return_sludge_ratio == 0.0 {
            return Err(SimulationError::InvalidConfiguration(
                "a clarifier retaining solids needs a positive return sludge ratio".to_string(),
            ));
        }
        if !self.metal_dose.is_finite() || self.metal_dose < 0.0 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "metal dose must be non-negative, got {}",
                self.metal_dose
            )));
        }
        if self.metal_dose > 0.0 && !self.chemical_precipitation {
            warn!("metal dose is set but chemical precipitation is disabled");
        }
        Ok(())
    }

    /// Resolves volumes, setpoints and flows for the design flow `q`.
    /// `min_flow_factor` is the lowest multiple of `q` the influent can reach.
    pub fn resolve(&self, q: f64, min_flow_factor: f64) -> Result<FlowSheet, SimulationError> {
        self.validate()?;
        if !q.is_finite() || q <= 0.0 {
            return Err(SimulationError::InvalidInfluent(format!(
                "flow rate must be positive, got {}",
                q
            )));
        }
        let saturation = oxygen_saturation(self.temperature);
        let any_feed = self.zones.iter().any(|z| z.feed_fraction.is_some());
        let target = self.recycle_target()?;

        let mut zones = Vec::with_capacity(self.zones.len());
        for (k, zone) in self.zones.iter().enumerate() {
            let volume = match (zone.volume, zone.HRT_hours) {
                (Some(v), Some(h)) => {
                    let from_hrt = h / 24.0 * q;
                    if (from_hrt - v).abs() > 0.01 * v {
                        warn!(
                            "zone '{}': volume {:.1} m3 overrides HRT {:.2} h ({:.1} m3)",
                            zone.name, v, h, from_hrt
                        );
                    }
                    v
                }
                (Some(v), None) => v,
                (None, Some(h)) => h / 24.0 * q,
                (None, None) => return Err(zone.invalid("neither volume nor HRT is given")),
            };
            let dissolved_oxygen = match zone.zone_type {
                ZoneType::Aerobic => {
                    let setpoint = zone.DO_setpoint.unwrap_or(DEFAULT_DO_SETPOINT);
                    if setpoint > saturation {
                        warn!(
                            "zone '{}': DO setpoint {:.2} capped at saturation {:.2} g/m3",
                            zone.name, setpoint, saturation
                        );
                    }
                    setpoint.min(saturation)
                }
                _ => 0.0,
            };
            let feed_fraction = if any_feed {
                zone.feed_fraction.unwrap_or(0.0)
            } else if k == 0 {
                1.0
            } else {
                0.0
            };
            zones.push(ResolvedZone {
                name: zone.name.clone(),
                zone_type: zone.zone_type,
                volume,
                dissolved_oxygen,
                feed_fraction,
            });
        }
        if let Some(t) = target {
            if self.zones[self.zones.len() - 1].zone_type != ZoneType::Aerobic
                && self.internal_recycle_ratio > 0.0
            {
                warn!(
                    "internal recycle to '{}' is drawn from a non-aerobic last zone",
                    self.zones[t].name
                );
            }
        }

        let total_volume: f64 = zones.iter().map(|z| z.volume).sum();
        let e = self.capture_efficiency;
        let q_ras = self.return_sludge_ratio * q;
        let q_ir = if target.is_some() {
            self.internal_recycle_ratio * q
        } else {
            0.0
        };
        let q_w = if e > 0.0 {
            (total_volume / self.SRT - (1.0 - e) * (q + q_ras)) / e
        } else {
            warn!("no clarifier: SRT equals the hydraulic retention time, configured SRT ignored");
            0.0
        };
        if e > 0.0 && q_w <= 0.0 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "SRT {} d cannot be reached: effluent solids alone remove more sludge \
                 (wastage flow {:.2} m3/d)",
                self.SRT, q_w
            )));
        }
        if q_w >= q * min_flow_factor {
            return Err(SimulationError::InvalidConfiguration(format!(
                "wastage flow {:.1} m3/d is not below the lowest influent flow {:.1} m3/d; \
                 SRT {} d is too short",
                q_w,
                q * min_flow_factor,
                self.SRT
            )));
        }
        info!(
            "flow sheet: V = {:.0} m3, Q = {:.0}, Q_RAS = {:.0}, Q_IR = {:.0}, Q_w = {:.2} m3/d",
            total_volume, q, q_ras, q_ir, q_w
        );
        let sheet = FlowSheet {
            zones,
            design_flow: q,
            return_sludge_flow: q_ras,
            internal_recycle_flow: q_ir,
            wastage_flow: q_w,
            recycle_target: target,
            capture_efficiency: e,
            total_volume,
            SRT: self.SRT,
            metal_dose: if self.chemical_precipitation {
                self.metal_dose
            } else {
                0.0
            },
        };
        // every zone needs throughput at the lowest influent flow
        let flows = sheet.zone_flows(q * min_flow_factor);
        if let Some((zone, _)) = self.zones.iter().zip(flows).find(|(_, f)| *f <= 0.0) {
            return Err(zone.invalid("zone receives no flow"));
        }
        Ok(sheet)
    }
}

/// Zone with its volume, DO and feed share fixed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedZone {
    pub name: String,
    pub zone_type: ZoneType,
    pub volume: f64,
    /// held value of S_O2 (zero outside aerobic zones)
    pub dissolved_oxygen: f64,
    pub feed_fraction: f64,
}

/// Flows of the clarifier at a given influent flow, m3/d
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClarifierFlows {
    pub inflow: f64,
    pub effluent: f64,
    pub underflow: f64,
    pub wastage: f64,
}

/// Topology resolved for a design flow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct FlowSheet {
    pub zones: Vec<ResolvedZone>,
    pub design_flow: f64,
    pub return_sludge_flow: f64,
    pub internal_recycle_flow: f64,
    pub wastage_flow: f64,
    pub recycle_target: Option<usize>,
    pub capture_efficiency: f64,
    pub total_volume: f64,
    pub SRT: f64,
    pub metal_dose: f64,
}

impl FlowSheet {
    /// outflow of every zone for influent flow `q`
    pub fn zone_flows(&self, q: f64) -> Vec<f64> {
        let mut flows = Vec::with_capacity(self.zones.len());
        let mut running = self.return_sludge_flow;
        for (k, zone) in self.zones.iter().enumerate() {
            running += zone.feed_fraction * q;
            if self.recycle_target == Some(k) {
                running += self.internal_recycle_flow;
            }
            flows.push(running);
        }
        flows
    }

    pub fn clarifier_flows(&self, q: f64) -> ClarifierFlows {
        ClarifierFlows {
            inflow: q + self.return_sludge_flow - self.wastage_flow,
            effluent: q - self.wastage_flow,
            underflow: self.return_sludge_flow,
            wastage: self.wastage_flow,
        }
    }

    /// Ideal clarifier: solubles pass unchanged, particulates split by capture efficiency.
    /// Returns (effluent, underflow) concentrations.
    pub fn split_clarifier(
        &self,
        mixed_liquor: &ComponentVector,
        q: f64,
    ) -> (ComponentVector, ComponentVector) {
        let flows = self.clarifier_flows(q);
        let e = self.capture_efficiency;
        let to_effluent = (1.0 - e) * flows.inflow / flows.effluent;
        let to_underflow = if flows.underflow > 0.0 {
            e * flows.inflow / flows.underflow
        } else {
            0.0
        };
        let mut effluent = *mixed_liquor;
        let mut underflow = *mixed_liquor;
        for component in Component::ALL {
            if component.is_particulate() {
                let i = component.index();
                effluent[i] *= to_effluent;
                underflow[i] *= to_underflow;
            }
        }
        (effluent, underflow)
    }

    /// Flow-weighted inflow of zone `k`: (flow, concentrations).
    /// `upstream` is the current state of zone k−1, `return_sludge` and `internal_recycle`
    /// come from the previous step.
    pub fn zone_inflow(
        &self,
        k: usize,
        q: f64,
        flows: &[f64],
        influent: &ComponentVector,
        upstream: Option<&ComponentVector>,
        return_sludge: &ComponentVector,
        internal_recycle: &ComponentVector,
    ) -> (f64, ComponentVector) {
        let mut mass = influent * (self.zones[k].feed_fraction * q);
        if k == 0 {
            mass += return_sludge * self.return_sludge_flow;
        } else if let Some(up) = upstream {
            mass += up * flows[k - 1];
        }
        if self.recycle_target == Some(k) {
            mass += internal_recycle * self.internal_recycle_flow;
        }
        let flow = flows[k];
        (flow, mass / flow)
    }

    /// nominal hydraulic retention time of zone `k` at the design flow, h
    pub fn nominal_hrt_hours(&self, k: usize) -> f64 {
        self.zones[k].volume / self.design_flow * 24.0
    }
}
