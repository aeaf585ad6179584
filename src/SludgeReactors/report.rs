//! # Plant Report
//!
//! Turns the final zone states of a run into the quantities an operator reads: effluent quality,
//! removal efficiencies, PAO activity, the phosphorus mass balance and operational figures.
//!
//! ## Main Structures
//!
//! - **`PlantReport`**: the complete report; `print_report()` prints it as tables
//! - **`PaoMetrics`**: PAO share of active biomass, storage ratios per zone, denitrifying share
//!   of PP uptake, P release and uptake rates
//! - **`PhosphorusBalance`**: influent, effluent, sludge and storage-change P with closure
//! - **`OperationalMetrics`**: wastage, sludge production, oxygen demand, MLSS and HRT
//!
//! ## Non-Obvious Features
//!
//! - The P balance is a rate balance (kg P/d at the final state) for steady-state runs and a
//!   time-integrated balance (kg P over the horizon) for dynamic runs; `PhosphorusBasis` tells
//!   which. Closure = (effluent + sludge + storage change)/influent·100.
//! - A removal efficiency is `None` when the influent value is zero.
//! - Oxygen demand is the O2 the aerobic zones consume to hold their DO setpoints, taken from the
//!   O2 column of the stoichiometric matrix.
use crate::ASM2d::process_rates::{Process, ProcessModel, ZoneType, ratio};
use crate::ASM2d::state_vector::{Component, ConventionalIndices, StateVector};
use crate::SludgeReactors::reactor_topology::FlowSheet;
use crate::SludgeReactors::simulation::SimulationMode;
use log::warn;
use prettytable::{Table, row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhosphorusBasis {
    /// kg P/d at the end of the run
    Rate,
    /// kg P accumulated over the run
    Total,
}

impl PhosphorusBasis {
    pub fn units(self) -> &'static str {
        match self {
            PhosphorusBasis::Rate => "kg P/d",
            PhosphorusBasis::Total => "kg P",
        }
    }
}

/// Raw P flows collected by the driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhosphorusLoads {
    pub basis: PhosphorusBasis,
    pub influent: f64,
    pub effluent: f64,
    pub sludge: f64,
    pub storage_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhosphorusBalance {
    pub basis: PhosphorusBasis,
    pub influent: f64,
    pub effluent: f64,
    pub sludge: f64,
    pub storage_change: f64,
    /// (effluent + sludge + storage change)/influent, %
    pub closure_percent: f64,
    pub within_tolerance: bool,
}

impl PhosphorusBalance {
    /// `tolerance` in percent around 100 % closure
    pub fn from_loads(loads: &PhosphorusLoads, tolerance: f64) -> Self {
        let out = loads.effluent + loads.sludge + loads.storage_change;
        let closure_percent = if loads.influent > 0.0 {
            out / loads.influent * 100.0
        } else {
            0.0
        };
        let within_tolerance = loads.influent > 0.0 && (closure_percent - 100.0).abs() <= tolerance;
        if !within_tolerance {
            warn!(
                "phosphorus balance closes at {:.1} % (tolerance ±{} %)",
                closure_percent, tolerance
            );
        }
        Self {
            basis: loads.basis,
            influent: loads.influent,
            effluent: loads.effluent,
            sludge: loads.sludge,
            storage_change: loads.storage_change,
            closure_percent,
            within_tolerance,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalEfficiency {
    pub index: String,
    pub influent: f64,
    pub effluent: f64,
    /// %; None when the influent value is zero
    pub removal: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStorage {
    pub zone: String,
    /// g P/g COD; None when the zone holds no PAO
    pub pp_per_pao: Option<f64>,
    /// g COD/g COD
    pub pha_per_pao: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaoMetrics {
    /// PAO share of the active biomass (X_H + X_PAO + X_AUT), volume weighted
    pub pao_fraction: f64,
    pub storage: Vec<ZoneStorage>,
    /// share of the PP uptake that runs on nitrate; None when there is no uptake
    pub denitrifying_share: Option<f64>,
    /// P released by PHA storage, kg P/d
    pub release_rate: f64,
    /// P taken up into X_PP, kg P/d
    pub uptake_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneOperation {
    pub zone: String,
    pub zone_type: ZoneType,
    pub volume: f64,
    /// g TSS/m3
    pub MLSS: f64,
    /// h, at the design flow
    pub HRT_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[allow(non_snake_case)]
pub struct OperationalMetrics {
    /// m3/d
    pub wastage_flow: f64,
    /// kg TSS/d wasted
    pub sludge_production: f64,
    /// kg O2/d
    pub oxygen_demand: f64,
    pub SRT: f64,
    /// h
    pub total_HRT_hours: f64,
    pub zones: Vec<ZoneOperation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub mode: SimulationMode,
    pub steps: u64,
    pub simulated_days: f64,
    pub wall_clock_seconds: f64,
    pub converged: bool,
    pub clamp_events: u64,
}

/// Everything the report is computed from
pub struct ReportInputs<'a> {
    pub influent: &'a StateVector,
    /// influent flow at the end of the run, m3/d
    pub flow: f64,
    pub effluent: &'a StateVector,
    pub zone_states: &'a [StateVector],
    pub flow_sheet: &'a FlowSheet,
    pub model: &'a ProcessModel,
    pub bod_factor: f64,
    pub phosphorus: PhosphorusLoads,
    pub closure_tolerance: f64,
    pub metadata: RunMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantReport {
    pub influent_quality: ConventionalIndices,
    pub effluent_quality: ConventionalIndices,
    pub removal: Vec<RemovalEfficiency>,
    pub pao: PaoMetrics,
    pub phosphorus: PhosphorusBalance,
    pub operation: OperationalMetrics,
    pub metadata: RunMetadata,
}

impl PlantReport {
    pub fn build(inputs: &ReportInputs) -> Self {
        let composition = &inputs.model.composition;
        let indices = |state: &StateVector| {
            ConventionalIndices::from_vector(&state.to_vector(), composition, inputs.bod_factor)
        };
        let influent_quality = indices(inputs.influent);
        let effluent_quality = indices(inputs.effluent);
        let removal = influent_quality
            .named_values()
            .iter()
            .zip(effluent_quality.named_values().iter())
            .map(|(&(name, inf), &(_, eff))| RemovalEfficiency {
                index: name.to_string(),
                influent: inf,
                effluent: eff,
                removal: if inf > 0.0 {
                    Some((inf - eff) / inf * 100.0)
                } else {
                    None
                },
            })
            .collect();

        let sheet = inputs.flow_sheet;
        let mut active = 0.0;
        let mut pao = 0.0;
        let mut aerobic_uptake = 0.0;
        let mut anoxic_uptake = 0.0;
        let mut release = 0.0;
        let mut oxygen = 0.0;
        let mut storage = Vec::with_capacity(sheet.zones.len());
        let mut zones = Vec::with_capacity(sheet.zones.len());
        let y_po4 = -inputs
            .model
            .coefficient(Process::PhaStorage, Component::X_PP);
        for (zone, state) in sheet.zones.iter().zip(inputs.zone_states.iter()) {
            let v = zone.volume;
            let x = state.to_vector();
            let (rates, _) = inputs.model.reaction_terms(&x, zone.zone_type);
            active += v * (state.X_H + state.X_PAO + state.X_AUT);
            pao += v * state.X_PAO;
            aerobic_uptake += v * rates[Process::AerobicPpStorage.index()];
            anoxic_uptake += v * rates[Process::AnoxicPpStorage.index()];
            release += v * y_po4 * rates[Process::PhaStorage.index()];
            if zone.zone_type == ZoneType::Aerobic {
                let o2 = inputs.model.stoichiometry.column(Component::S_O2.index()).dot(&rates);
                oxygen -= v * o2;
            }
            storage.push(ZoneStorage {
                zone: zone.name.clone(),
                pp_per_pao: ratio(state.X_PP, state.X_PAO),
                pha_per_pao: ratio(state.X_PHA, state.X_PAO),
            });
            zones.push(ZoneOperation {
                zone: zone.name.clone(),
                zone_type: zone.zone_type,
                volume: v,
                MLSS: state.tss(composition),
                HRT_hours: v / sheet.design_flow * 24.0,
            });
        }
        let uptake = aerobic_uptake + anoxic_uptake;
        let pao_metrics = PaoMetrics {
            pao_fraction: ratio(pao, active).unwrap_or(0.0),
            storage,
            denitrifying_share: ratio(anoxic_uptake, uptake),
            release_rate: release / 1000.0,
            uptake_rate: uptake / 1000.0,
        };

        let last_tss = zones.last().map(|z| z.MLSS).unwrap_or(0.0);
        let operation = OperationalMetrics {
            wastage_flow: sheet.wastage_flow,
            sludge_production: sheet.wastage_flow * last_tss / 1000.0,
            oxygen_demand: oxygen / 1000.0,
            SRT: sheet.SRT,
            total_HRT_hours: sheet.total_volume / sheet.design_flow * 24.0,
            zones,
        };
        if inputs.flow <= 0.0 {
            warn!("report built for a non-positive influent flow");
        }

        Self {
            influent_quality,
            effluent_quality,
            removal,
            pao: pao_metrics,
            phosphorus: PhosphorusBalance::from_loads(&inputs.phosphorus, inputs.closure_tolerance),
            operation,
            metadata: inputs.metadata.clone(),
        }
    }

    pub fn removal_of(&self, index: &str) -> Option<f64> {
        self.removal
            .iter()
            .find(|r| r.index == index)
            .and_then(|r| r.removal)
    }

    pub fn print_report(&self) {
        println!("\n=== EFFLUENT QUALITY ===");
        let mut quality = Table::new();
        quality.add_row(row!["Index", "Influent, g/m3", "Effluent, g/m3", "Removal, %"]);
        for r in &self.removal {
            let removal = match r.removal {
                Some(value) => format!("{:.1}", value),
                None => "-".to_string(),
            };
            quality.add_row(row![
                r.index,
                format!("{:.2}", r.influent),
                format!("{:.2}", r.effluent),
                removal
            ]);
        }
        quality.printstd();

        println!("\n=== PAO ACTIVITY ===");
        let mut pao = Table::new();
        pao.add_row(row!["Metric", "Value", "Units"]);
        pao.add_row(row![
            "PAO share of active biomass",
            format!("{:.1}", self.pao.pao_fraction * 100.0),
            "%"
        ]);
        let dpao = match self.pao.denitrifying_share {
            Some(share) => format!("{:.1}", share * 100.0),
            None => "-".to_string(),
        };
        pao.add_row(row!["Anoxic share of PP uptake", dpao, "%"]);
        pao.add_row(row!["P release", format!("{:.2}", self.pao.release_rate), "kg P/d"]);
        pao.add_row(row!["P uptake", format!("{:.2}", self.pao.uptake_rate), "kg P/d"]);
        pao.printstd();

        let mut storage = Table::new();
        storage.add_row(row!["Zone", "X_PP/X_PAO", "X_PHA/X_PAO"]);
        let fmt = |v: Option<f64>| v.map(|x| format!("{:.3}", x)).unwrap_or("-".to_string());
        for zone in &self.pao.storage {
            storage.add_row(row![zone.zone, fmt(zone.pp_per_pao), fmt(zone.pha_per_pao)]);
        }
        storage.printstd();

        println!("\n=== PHOSPHORUS BALANCE ===");
        let units = self.phosphorus.basis.units();
        let mut balance = Table::new();
        balance.add_row(row!["Term", "Value", "Units"]);
        balance.add_row(row!["Influent", format!("{:.3}", self.phosphorus.influent), units]);
        balance.add_row(row!["Effluent", format!("{:.3}", self.phosphorus.effluent), units]);
        balance.add_row(row!["Waste sludge", format!("{:.3}", self.phosphorus.sludge), units]);
        balance.add_row(row![
            "Storage change",
            format!("{:.3}", self.phosphorus.storage_change),
            units
        ]);
        balance.add_row(row![
            "Closure",
            format!("{:.1}", self.phosphorus.closure_percent),
            "%"
        ]);
        balance.printstd();
        if !self.phosphorus.within_tolerance {
            println!("\x1b[33mWARNING: phosphorus balance outside tolerance\x1b[0m");
        }

        println!("\n=== OPERATION ===");
        let mut operation = Table::new();
        operation.add_row(row!["Parameter", "Value", "Units"]);
        operation.add_row(row![
            "Wastage flow",
            format!("{:.1}", self.operation.wastage_flow),
            "m3/d"
        ]);
        operation.add_row(row![
            "Sludge production",
            format!("{:.1}", self.operation.sludge_production),
            "kg TSS/d"
        ]);
        operation.add_row(row![
            "Oxygen demand",
            format!("{:.1}", self.operation.oxygen_demand),
            "kg O2/d"
        ]);
        operation.add_row(row!["SRT", format!("{:.1}", self.operation.SRT), "d"]);
        operation.add_row(row![
            "HRT",
            format!("{:.2}", self.operation.total_HRT_hours),
            "h"
        ]);
        operation.printstd();

        let mut zones = Table::new();
        zones.add_row(row!["Zone", "Type", "Volume, m3", "MLSS, g/m3", "HRT, h"]);
        for zone in &self.operation.zones {
            zones.add_row(row![
                zone.zone,
                zone.zone_type,
                format!("{:.0}", zone.volume),
                format!("{:.0}", zone.MLSS),
                format!("{:.2}", zone.HRT_hours)
            ]);
        }
        zones.printstd();

        println!(
            "\n{:?} run: {:.1} d simulated in {} steps, {:.2} s wall clock, \
             converged: {}, clamps: {}",
            self.metadata.mode,
            self.metadata.simulated_days,
            self.metadata.steps,
            self.metadata.wall_clock_seconds,
            self.metadata.converged,
            self.metadata.clamp_events
        );
    }
}
