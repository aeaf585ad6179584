//! # Plant Task Files
//!
//! A plant task is one JSON document describing a complete simulation:
//!
//! ```json
//! {
//!   "problem_name": "A2O plant",
//!   "problem_description": "...",
//!   "influent": { "Q": 10000.0, "COD": 400.0, "NH4": 25.0, "TP": 8.0, "VFA": 40.0 },
//!   "influent_pattern": { "Diurnal": { "flow_amplitude": 0.3 } },
//!   "fractions": { "f_SI": 0.05 },
//!   "topology": { "zones": [
//!                   { "name": "anaerobic", "zone_type": "Anaerobic", "volume": 1000.0 } ],
//!                 "SRT": 15.0, "temperature": 20.0,
//!                 "internal_recycle_ratio": 0.0, "return_sludge_ratio": 0.5 },
//!   "simulation": { "end_time": 60.0, "mode": "SteadyState" },
//!   "kinetic": {}, "stoichiometric": {}, "temperature_coefficients": {}
//! }
//! ```
//!
//! Only `influent` and `topology` are required. Every other section, and every field inside
//! the parameter sections, falls back to the ASM2d defaults.
//!
//! ## Main Methods
//!
//! - **`PlantTask::load()`** / **`save()`**: JSON I/O, parse errors logged with line and column
//! - **`PlantTask::template()`** / **`write_template()`**: complete default task (A2O plant)
//! - **`PlantTask::driver()`**: validated `SimulationDriver`
//! - **`PlantTask::solve()`**: file → run → `SimulationResult`
//! - **`print_summary()`**: influent, zones and run settings as tables
//! - **`save_results()`**: report, final zone states and time series as JSON
use crate::ASM2d::parameters::{
    KineticParameters, StoichiometricParameters, TemperatureCoefficients,
};
use crate::ASM2d::state_vector::StateVector;
use crate::SludgeReactors::errors::SimulationError;
use crate::SludgeReactors::influent::{InfluentDescriptor, InfluentFractions, InfluentPattern};
use crate::SludgeReactors::reactor_topology::ReactorTopology;
use crate::SludgeReactors::report::PlantReport;
use crate::SludgeReactors::simulation::{
    SimulationConfig, SimulationDriver, SimulationResult, TimePoint,
};
use crate::Utils::load_from_file::{load_json, save_json};
use log::info;
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantTask {
    #[serde(default)]
    pub problem_name: Option<String>,
    #[serde(default)]
    pub problem_description: Option<String>,
    pub influent: InfluentDescriptor,
    #[serde(default)]
    pub influent_pattern: InfluentPattern,
    #[serde(default)]
    pub fractions: InfluentFractions,
    pub topology: ReactorTopology,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub kinetic: KineticParameters,
    #[serde(default)]
    pub stoichiometric: StoichiometricParameters,
    #[serde(default)]
    pub temperature_coefficients: TemperatureCoefficients,
}

/// What `save_results` writes
#[derive(Debug, Clone, Serialize)]
pub struct SavedResults<'a> {
    pub problem_name: Option<&'a str>,
    pub report: &'a PlantReport,
    pub zones: Vec<(&'a str, &'a StateVector)>,
    pub effluent: &'a StateVector,
    pub time_series: &'a [TimePoint],
}

impl PlantTask {
    /// Default A2O plant at 20 °C with the ASM2d parameter set
    pub fn template() -> Self {
        Self {
            problem_name: Some("A2O plant".to_string()),
            problem_description: Some(
                "Anaerobic/anoxic/aerobic activated sludge plant with biological N and P removal"
                    .to_string(),
            ),
            influent: InfluentDescriptor::default(),
            influent_pattern: InfluentPattern::default(),
            fractions: InfluentFractions::default(),
            topology: ReactorTopology::default(),
            simulation: SimulationConfig::default(),
            kinetic: KineticParameters::default(),
            stoichiometric: StoichiometricParameters::default(),
            temperature_coefficients: TemperatureCoefficients::default(),
        }
    }

    pub fn load(file_name: &str) -> Result<Self, SimulationError> {
        let task: PlantTask = load_json(file_name)?;
        info!(
            "loaded plant task '{}' with {} zones",
            task.problem_name.as_deref().unwrap_or(file_name),
            task.topology.zones.len()
        );
        Ok(task)
    }

    pub fn save(&self, file_name: &str) -> Result<(), SimulationError> {
        save_json(self, file_name)
    }

    pub fn write_template(file_name: &str) -> Result<(), SimulationError> {
        Self::template().save(file_name)
    }

    pub fn driver(&self) -> Result<SimulationDriver, SimulationError> {
        SimulationDriver::new(
            self.influent.clone(),
            self.influent_pattern.clone(),
            self.fractions.clone(),
            self.topology.clone(),
            self.simulation.clone(),
            self.kinetic.clone(),
            self.stoichiometric.clone(),
            self.temperature_coefficients.clone(),
        )
    }

    pub fn solve(&self) -> Result<SimulationResult, SimulationError> {
        if let Some(name) = &self.problem_name {
            info!("solving plant task '{}'", name);
        }
        self.driver()?.run()
    }

    /// Loads, solves and prints the report
    pub fn solve_from_file(file_name: &str) -> Result<SimulationResult, SimulationError> {
        let task = Self::load(file_name)?;
        let result = task.solve()?;
        result.report.print_report();
        Ok(result)
    }

    pub fn print_summary(&self) {
        println!("\n=== PLANT TASK SUMMARY ===");
        println!("Problem Name: {:?}", self.problem_name);
        println!("Problem Description: {:?}", self.problem_description);

        let i = &self.influent;
        let mut influent = Table::new();
        influent.add_row(row!["Influent", "Value", "Units"]);
        influent.add_row(row!["Q", format!("{:.1}", i.Q), "m3/d"]);
        influent.add_row(row!["COD", format!("{:.1}", i.COD), "g/m3"]);
        influent.add_row(row!["VFA", format!("{:.1}", i.VFA), "g COD/m3"]);
        influent.add_row(row!["NH4-N", format!("{:.1}", i.NH4), "g/m3"]);
        influent.add_row(row!["NO3-N", format!("{:.1}", i.NO3), "g/m3"]);
        influent.add_row(row!["TP", format!("{:.1}", i.TP), "g/m3"]);
        influent.add_row(row!["Alkalinity", format!("{:.0}", i.alkalinity), "g CaCO3/m3"]);
        influent.printstd();
        println!("Influent pattern: {:?}", self.influent_pattern);

        let t = &self.topology;
        let mut zones = Table::new();
        zones.add_row(row!["Zone", "Type", "Volume, m3", "HRT, h", "DO, g/m3", "Feed"]);
        let fmt = |v: Option<f64>| v.map(|x| format!("{}", x)).unwrap_or("-".to_string());
        for zone in &t.zones {
            zones.add_row(row![
                zone.name,
                zone.zone_type,
                fmt(zone.volume),
                fmt(zone.HRT_hours),
                fmt(zone.DO_setpoint),
                fmt(zone.feed_fraction)
            ]);
        }
        zones.printstd();
        println!(
            "SRT {} d, T {} °C, internal recycle {}, return sludge {}, dPAO {}, precipitation {}",
            t.SRT,
            t.temperature,
            t.internal_recycle_ratio,
            t.return_sludge_ratio,
            t.denitrifying_pao,
            t.chemical_precipitation
        );
        let s = &self.simulation;
        println!(
            "{:?} run from {} to {} d, step {} d, reporting every {} d",
            s.mode, s.start_time, s.end_time, s.time_step, s.reporting_interval
        );
    }

    pub fn save_results(
        &self,
        result: &SimulationResult,
        file_name: &str,
    ) -> Result<(), SimulationError> {
        let saved = SavedResults {
            problem_name: self.problem_name.as_deref(),
            report: &result.report,
            zones: result
                .zone_names
                .iter()
                .map(String::as_str)
                .zip(result.final_states.iter())
                .collect(),
            effluent: &result.effluent,
            time_series: &result.time_series,
        };
        save_json(&saved, file_name)
    }
}
