//! # Simulation Driver
//!
//! Advances the zone chain in time with fixed-step RK4 and assembles the result.
//!
//! ## Purpose
//!
//! Each step sweeps the zones in order. Zone k sees a constant inflow over the step, mixed from
//! its influent share, the already updated outflow of zone k−1, and (lagged by one step) the
//! return sludge and internal recycle drawn from the last zone. Its mass balance
//!
//! dx/dt = (F_k/V_k)(x_in − x) + νᵀ·ρ(x)
//!
//! is integrated with `ZoneIntegrator`. Dissolved oxygen is not integrated: aerobic zones hold
//! their setpoint, anaerobic and anoxic zones hold zero.
//!
//! ## Main Structures
//!
//! - **`SimulationConfig`**: horizon, step, reporting interval, mode, tolerances, initial state
//! - **`SimulationDriver`**: validated run (model compiled at the operating temperature)
//! - **`SimulationResult`**: final states, clarifier streams, time series, diagnostics, report
//!
//! ## Non-Obvious Features
//!
//! - Steady-state runs always integrate the full horizon. Convergence is judged on the last
//!   reporting sample: max over zones and components of |Δx|/(|x|+1)/Δt ≤ tolerance.
//! - Dynamic runs integrate the P loads (influent, effluent, wastage) step by step so the
//!   phosphorus balance covers the whole horizon including the inventory change.
use crate::ASM2d::parameters::{
    KineticParameters, StoichiometricParameters, TemperatureCoefficients,
};
use crate::ASM2d::process_rates::{ProcessModel, ProcessRates};
use crate::ASM2d::state_vector::{
    Component, ComponentVector, ConventionalIndices, N_COMPONENTS, StateVector,
};
use crate::SludgeReactors::errors::SimulationError;
use crate::SludgeReactors::influent::{
    InfluentDescriptor, InfluentFractions, InfluentPattern, InfluentProfile, bod_factor,
    scaled_influent,
};
use crate::SludgeReactors::integrator::ZoneIntegrator;
use crate::SludgeReactors::reactor_topology::{FlowSheet, ReactorTopology};
use crate::SludgeReactors::report::{
    PhosphorusBasis, PhosphorusLoads, PlantReport, ReportInputs, RunMetadata,
};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SimulationMode {
    #[default]
    SteadyState,
    Dynamic,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum InitialCondition {
    /// `StateVector::default_seed` in every zone
    #[default]
    Default,
    /// the same state in every zone
    Uniform(StateVector),
    /// one state per zone, e.g. carried over from an earlier run
    PerZone(Vec<StateVector>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
#[allow(non_snake_case)]
pub struct SimulationConfig {
    /// d
    pub start_time: f64,
    /// d
    pub end_time: f64,
    /// d
    pub time_step: f64,
    /// d
    pub reporting_interval: f64,
    pub mode: SimulationMode,
    /// 1/d, steady-state convergence only
    pub tolerance: f64,
    pub initial_condition: InitialCondition,
    /// %, allowed deviation of the P balance from 100 %
    pub P_closure_tolerance: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            end_time: 60.0,
            time_step: 0.001,
            reporting_interval: 1.0,
            mode: SimulationMode::SteadyState,
            tolerance: 1e-3,
            initial_condition: InitialCondition::Default,
            P_closure_tolerance: 10.0,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimulationError> {
        let finite = [
            self.start_time,
            self.end_time,
            self.time_step,
            self.reporting_interval,
            self.tolerance,
            self.P_closure_tolerance,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(SimulationError::InvalidConfiguration(
                "simulation settings must be finite numbers".to_string(),
            ));
        }
        if self.end_time <= self.start_time {
            return Err(SimulationError::InvalidConfiguration(format!(
                "end time {} must exceed start time {}",
                self.end_time, self.start_time
            )));
        }
        if self.time_step <= 0.0 {
            return Err(SimulationError::InvalidConfiguration(format!(
                "time step must be positive, got {}",
                self.time_step
            )));
        }
        if self.reporting_interval < self.time_step {
            return Err(SimulationError::InvalidConfiguration(format!(
                "reporting interval {} is shorter than the time step {}",
                self.reporting_interval, self.time_step
            )));
        }
        if self.tolerance <= 0.0 || self.P_closure_tolerance <= 0.0 {
            return Err(SimulationError::InvalidConfiguration(
                "tolerances must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn steps(&self) -> usize {
        ((self.end_time - self.start_time) / self.time_step).round() as usize
    }

    /// steps between two reporting samples
    pub fn steps_per_sample(&self) -> usize {
        ((self.reporting_interval / self.time_step).round() as usize).max(1)
    }
}

/// Snapshot of the plant in a dynamic run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub time: f64,
    /// influent flow, m3/d
    pub flow: f64,
    pub zone_states: Vec<StateVector>,
    pub effluent: StateVector,
    pub effluent_quality: ConventionalIndices,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// negative-value clamps per component, summed over zones
    pub clamp_events: Vec<(Component, u64)>,
    pub converged: bool,
    /// 1/d
    pub final_relative_change: f64,
    /// (time, max relative change per day) at every reporting sample
    pub convergence_history: Vec<(f64, f64)>,
}

impl Diagnostics {
    pub fn total_clamps(&self) -> u64 {
        self.clamp_events.iter().map(|(_, n)| n).sum()
    }

    pub fn clamps_of(&self, component: Component) -> u64 {
        self.clamp_events
            .iter()
            .find(|(c, _)| *c == component)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub zone_names: Vec<String>,
    pub final_states: Vec<StateVector>,
    /// process rates of every zone at the final state
    pub final_rates: Vec<ProcessRates>,
    pub effluent: StateVector,
    pub underflow: StateVector,
    pub time_series: Vec<TimePoint>,
    pub diagnostics: Diagnostics,
    pub flow_sheet: FlowSheet,
    pub report: PlantReport,
}

impl SimulationResult {
    pub fn state_of(&self, zone: &str) -> Option<&StateVector> {
        self.zone_names
            .iter()
            .position(|name| name == zone)
            .map(|k| &self.final_states[k])
    }
}

/// Validated, ready-to-run simulation
#[derive(Debug, Clone)]
pub struct SimulationDriver {
    pub influent: InfluentDescriptor,
    pub pattern: InfluentPattern,
    pub topology: ReactorTopology,
    pub config: SimulationConfig,
    pub flow_sheet: FlowSheet,
    pub model: ProcessModel,
    /// fractionated influent at the design load
    pub influent_state: StateVector,
    pub bod_factor: f64,
    initial_states: Vec<ComponentVector>,
}

/// max over zones and components of |Δx|/(|x|+1)/Δt; infinite once any state is not finite
fn relative_change(now: &[ComponentVector], before: &[ComponentVector], interval: f64) -> f64 {
    if now.iter().any(|x| x.iter().any(|v| !v.is_finite())) {
        return f64::INFINITY;
    }
    now.iter()
        .zip(before.iter())
        .flat_map(|(x, y)| {
            (0..N_COMPONENTS).map(move |i| (x[i] - y[i]).abs() / (x[i].abs() + 1.0))
        })
        .fold(0.0, f64::max)
        / interval
}

impl SimulationDriver {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        influent: InfluentDescriptor,
        pattern: InfluentPattern,
        fractions: InfluentFractions,
        topology: ReactorTopology,
        config: SimulationConfig,
        kinetic: KineticParameters,
        stoichiometric: StoichiometricParameters,
        temperature_coefficients: TemperatureCoefficients,
    ) -> Result<Self, SimulationError> {
        kinetic.validate()?;
        stoichiometric.validate()?;
        temperature_coefficients.validate()?;
        config.validate()?;
        pattern.validate()?;
        let flow_sheet = topology.resolve(influent.Q, pattern.min_flow_factor())?;

        let corrected = kinetic.at_temperature(&temperature_coefficients, topology.temperature);
        let model = ProcessModel::new(&corrected, &stoichiometric, topology.model_options());
        let influent_state = fractions.fractionate(&influent, &model.composition)?;
        let bod_factor = bod_factor(&influent, &influent_state, &model.composition);

        let n = flow_sheet.zones.len();
        let seeds: Vec<StateVector> = match &config.initial_condition {
            InitialCondition::Default => vec![StateVector::default_seed(); n],
            InitialCondition::Uniform(state) => vec![*state; n],
            InitialCondition::PerZone(states) => {
                if states.len() != n {
                    return Err(SimulationError::InvalidConfiguration(format!(
                        "{} initial states given for {} zones",
                        states.len(),
                        n
                    )));
                }
                states.clone()
            }
        };
        let mut initial_states = Vec::with_capacity(n);
        for (zone, seed) in flow_sheet.zones.iter().zip(seeds.iter()) {
            seed.check_physical().map_err(|reason| SimulationError::InvalidZone {
                zone: zone.name.clone(),
                reason: format!("initial state: {}", reason),
            })?;
            let mut x = seed.to_vector();
            x[Component::S_O2.index()] = zone.dissolved_oxygen;
            initial_states.push(x);
        }

        Ok(Self {
            influent,
            pattern,
            topology,
            config,
            flow_sheet,
            model,
            influent_state,
            bod_factor,
            initial_states,
        })
    }

    /// Influent flow and concentrations at time `t`
    pub fn influent_at(&self, t: f64) -> (f64, ComponentVector) {
        let q = self.influent.Q * self.pattern.flow_factor(t);
        let mut x_in =
            scaled_influent(&self.influent_state, self.pattern.load_factor(t)).to_vector();
        x_in[Component::X_MeOH.index()] += self.flow_sheet.metal_dose;
        (q, x_in)
    }

    /// P held in the reactor volume, g
    fn phosphorus_inventory(&self, states: &[ComponentVector]) -> f64 {
        self.flow_sheet
            .zones
            .iter()
            .zip(states.iter())
            .map(|(zone, x)| zone.volume * self.model.composition.phosphorus.dot(x))
            .sum()
    }

    /// Clarifier streams for the last-zone state `last`: (effluent, underflow)
    fn clarifier(&self, last: &ComponentVector, q: f64) -> (ComponentVector, ComponentVector) {
        self.flow_sheet.split_clarifier(last, q)
    }

    /// Advances every zone by one step at time `t`; returns clamps made in this step
    fn advance(
        &self,
        t: f64,
        states: &mut [ComponentVector],
        integrators: &mut [ZoneIntegrator],
    ) -> usize {
        let sheet = &self.flow_sheet;
        let (q, x_in) = self.influent_at(t);
        let flows = sheet.zone_flows(q);
        let last = states[states.len() - 1];
        let (_, return_sludge) = self.clarifier(&last, q);
        let mut clamped = 0;
        for k in 0..states.len() {
            let upstream = if k > 0 { Some(states[k - 1]) } else { None };
            let (flow, x_feed) =
                sheet.zone_inflow(k, q, &flows, &x_in, upstream.as_ref(), &return_sludge, &last);
            let zone = &sheet.zones[k];
            let dilution = flow / zone.volume;
            let zone_type = zone.zone_type;
            let o2 = Component::S_O2.index();
            let derivatives = |x: &ComponentVector| {
                let rates = self.model.process_rates(x, zone_type);
                let mut dx = (x_feed - x) * dilution + self.model.net_derivative(&rates);
                dx[o2] = 0.0;
                dx
            };
            clamped += integrators[k].step(&mut states[k], derivatives);
            states[k][o2] = zone.dissolved_oxygen;
        }
        clamped
    }

    pub fn run(&self) -> Result<SimulationResult, SimulationError> {
        let started = Instant::now();
        let config = &self.config;
        let sheet = &self.flow_sheet;
        let h = config.time_step;
        let n_steps = config.steps();
        let per_sample = config.steps_per_sample();
        let interval = per_sample as f64 * h;
        info!(
            "{:?} run: {} zones, {} steps of {} d, T = {} °C",
            config.mode,
            sheet.zones.len(),
            n_steps,
            h,
            self.topology.temperature
        );

        let mut states = self.initial_states.clone();
        let mut integrators: Vec<ZoneIntegrator> =
            states.iter().map(|_| ZoneIntegrator::new(h)).collect();
        let mut sampled = states.clone();
        let mut inventory_sampled = self.phosphorus_inventory(&states);
        let initial_inventory = inventory_sampled;
        let mut history = Vec::new();
        let mut time_series = Vec::new();
        let mut loads = PhosphorusLoads {
            basis: PhosphorusBasis::Total,
            influent: 0.0,
            effluent: 0.0,
            sludge: 0.0,
            storage_change: 0.0,
        };
        let dynamic = config.mode == SimulationMode::Dynamic;
        if dynamic {
            time_series.push(self.snapshot(config.start_time, &states));
        }
        let p = &self.model.composition.phosphorus;
        let mut last_inventory_change = 0.0;

        for step in 1..=n_steps {
            let t = config.start_time + (step - 1) as f64 * h;
            if dynamic {
                let (q, x_in) = self.influent_at(t);
                let last = states[states.len() - 1];
                let (effluent, _) = self.clarifier(&last, q);
                let flows = sheet.clarifier_flows(q);
                loads.influent += q * p.dot(&x_in) * h;
                loads.effluent += flows.effluent * p.dot(&effluent) * h;
                loads.sludge += flows.wastage * p.dot(&last) * h;
            }
            self.advance(t, &mut states, &mut integrators);

            if step % per_sample == 0 || step == n_steps {
                let time = config.start_time + step as f64 * h;
                let span = if step % per_sample == 0 {
                    interval
                } else {
                    (step % per_sample) as f64 * h
                };
                let change = relative_change(&states, &sampled, span);
                history.push((time, change));
                let inventory = self.phosphorus_inventory(&states);
                last_inventory_change = (inventory - inventory_sampled) / span;
                inventory_sampled = inventory;
                sampled.clone_from(&states);
                if dynamic {
                    time_series.push(self.snapshot(time, &states));
                }
            }
        }

        let end = config.start_time + n_steps as f64 * h;
        let (q_end, x_in_end) = self.influent_at(end);
        let last = states[states.len() - 1];
        let (effluent, underflow) = self.clarifier(&last, q_end);
        let final_relative_change = history.last().map(|(_, c)| *c).unwrap_or(f64::INFINITY);
        let converged = final_relative_change <= config.tolerance;
        if config.mode == SimulationMode::SteadyState && !converged {
            warn!(
                "steady state not reached after {} d: relative change {:.2e} per day > {:.1e}",
                end - config.start_time,
                final_relative_change,
                config.tolerance
            );
        }

        let loads = if dynamic {
            PhosphorusLoads {
                storage_change: (self.phosphorus_inventory(&states) - initial_inventory) / 1000.0,
                influent: loads.influent / 1000.0,
                effluent: loads.effluent / 1000.0,
                sludge: loads.sludge / 1000.0,
                basis: PhosphorusBasis::Total,
            }
        } else {
            let flows = sheet.clarifier_flows(q_end);
            PhosphorusLoads {
                basis: PhosphorusBasis::Rate,
                influent: q_end * p.dot(&x_in_end) / 1000.0,
                effluent: flows.effluent * p.dot(&effluent) / 1000.0,
                sludge: flows.wastage * p.dot(&last) / 1000.0,
                storage_change: last_inventory_change / 1000.0,
            }
        };

        let mut clamp_totals = [0u64; N_COMPONENTS];
        for (zone, integrator) in sheet.zones.iter().zip(integrators.iter()) {
            if integrator.total_clamps() > 0 {
                warn!(
                    "zone '{}': {} clamps in {} steps",
                    zone.name,
                    integrator.total_clamps(),
                    integrator.step_count
                );
            }
            for (total, n) in clamp_totals.iter_mut().zip(integrator.clamp_events.iter()) {
                *total += n;
            }
        }
        let clamp_events: Vec<(Component, u64)> = Component::ALL
            .iter()
            .zip(clamp_totals.iter())
            .filter(|(_, n)| **n > 0)
            .map(|(c, n)| (*c, *n))
            .collect();
        for (component, n) in &clamp_events {
            warn!("{} clamped to zero {} times", component, n);
        }
        let diagnostics = Diagnostics {
            clamp_events,
            converged,
            final_relative_change,
            convergence_history: history,
        };

        let final_states: Vec<StateVector> = states.iter().map(StateVector::from_vector).collect();
        let final_rates: Vec<ProcessRates> = states
            .iter()
            .zip(sheet.zones.iter())
            .map(|(x, zone)| self.model.process_rates(x, zone.zone_type))
            .collect();
        let influent_end = StateVector::from_vector(&x_in_end);
        let effluent = StateVector::from_vector(&effluent);
        let metadata = RunMetadata {
            mode: config.mode,
            steps: n_steps as u64,
            simulated_days: end - config.start_time,
            wall_clock_seconds: started.elapsed().as_secs_f64(),
            converged,
            clamp_events: diagnostics.total_clamps(),
        };
        let report = PlantReport::build(&ReportInputs {
            influent: &influent_end,
            flow: q_end,
            effluent: &effluent,
            zone_states: &final_states,
            flow_sheet: sheet,
            model: &self.model,
            bod_factor: self.bod_factor,
            phosphorus: loads,
            closure_tolerance: config.P_closure_tolerance,
            metadata,
        });
        info!(
            "run finished in {:.2} s: effluent NH4 {:.2}, TP {:.2} g/m3, P closure {:.1} %",
            report.metadata.wall_clock_seconds,
            report.effluent_quality.NH4,
            report.effluent_quality.TP,
            report.phosphorus.closure_percent
        );

        Ok(SimulationResult {
            zone_names: sheet.zones.iter().map(|z| z.name.clone()).collect(),
            final_states,
            final_rates,
            effluent,
            underflow: StateVector::from_vector(&underflow),
            time_series,
            diagnostics,
            flow_sheet: sheet.clone(),
            report,
        })
    }

    fn snapshot(&self, time: f64, states: &[ComponentVector]) -> TimePoint {
        let (q, _) = self.influent_at(time);
        let (effluent, _) = self.clarifier(&states[states.len() - 1], q);
        TimePoint {
            time,
            flow: q,
            zone_states: states.iter().map(StateVector::from_vector).collect(),
            effluent: StateVector::from_vector(&effluent),
            effluent_quality: ConventionalIndices::from_vector(
                &effluent,
                &self.model.composition,
                self.bod_factor,
            ),
        }
    }
}
