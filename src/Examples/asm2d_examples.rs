use crate::ASM2d::process_rates::ZoneType;
use crate::SludgeReactors::influent::{DiurnalInfluent, InfluentPattern};
use crate::SludgeReactors::reactor_topology::ReactorZone;
use crate::SludgeReactors::simulation::{InitialCondition, SimulationMode, SimulationResult};
use crate::SludgeReactors::task_parser::PlantTask;
use log::error;
use prettytable::{Table, row};

fn solve_or_log(task: &PlantTask) -> Option<SimulationResult> {
    match task.solve() {
        Ok(result) => Some(result),
        Err(e) => {
            let name = task.problem_name.as_deref().unwrap_or("?");
            error!("example '{}' failed: {}", name, e);
            None
        }
    }
}

fn percent(value: Option<f64>) -> String {
    value.map(|v| format!("{:.1}", v)).unwrap_or("-".to_string())
}

pub fn asm2d_examples(task: usize) {
    match task {
        0 => {
            // A2O plant at design load, run to steady state, full report
            let plant = PlantTask::template();
            plant.print_summary();
            if let Some(result) = solve_or_log(&plant) {
                result.report.print_report();
            }
        }
        1 => {
            // same plant without influent VFA: less anaerobic P release, poorer bio-P
            let with_vfa = PlantTask::template();
            let mut without_vfa = PlantTask::template();
            without_vfa.problem_name = Some("A2O plant, no VFA".to_string());
            without_vfa.influent.VFA = 0.0;

            let mut table = Table::new();
            table.add_row(row![
                "Case",
                "P release, kg/d",
                "P uptake, kg/d",
                "TP removal, %",
                "Effluent PO4-P"
            ]);
            for plant in [&with_vfa, &without_vfa] {
                if let Some(result) = solve_or_log(plant) {
                    let report = &result.report;
                    table.add_row(row![
                        plant.problem_name.as_deref().unwrap_or("-"),
                        format!("{:.1}", report.pao.release_rate),
                        format!("{:.1}", report.pao.uptake_rate),
                        percent(report.removal_of("TP")),
                        format!("{:.2}", report.effluent_quality.PO4)
                    ]);
                }
            }
            table.printstd();
        }
        2 => {
            // diurnal load on a plant carried over from steady state
            let base = PlantTask::template();
            let Some(steady) = solve_or_log(&base) else {
                return;
            };
            let mut plant = PlantTask::template();
            plant.problem_name = Some("A2O plant, diurnal load".to_string());
            plant.influent_pattern = InfluentPattern::Diurnal(DiurnalInfluent::default());
            plant.simulation.mode = SimulationMode::Dynamic;
            plant.simulation.end_time = 2.0;
            plant.simulation.reporting_interval = 2.0 / 24.0;
            plant.simulation.initial_condition = InitialCondition::PerZone(steady.final_states);
            if let Some(result) = solve_or_log(&plant) {
                let mut table = Table::new();
                table.add_row(row!["t, h", "Q, m3/d", "NH4-N", "NO3-N", "PO4-P", "TSS"]);
                for point in &result.time_series {
                    let e = &point.effluent_quality;
                    table.add_row(row![
                        format!("{:.1}", point.time * 24.0),
                        format!("{:.0}", point.flow),
                        format!("{:.2}", e.NH4),
                        format!("{:.2}", e.NO3),
                        format!("{:.2}", e.PO4),
                        format!("{:.1}", e.TSS)
                    ]);
                }
                table.printstd();
                result.report.print_report();
            }
        }
        3 => {
            // temperature sweep: nitrification is the first process to suffer in the cold
            let mut table = Table::new();
            table.add_row(row![
                "T, °C",
                "NH4-N removal, %",
                "TN removal, %",
                "TP removal, %",
                "O2 demand, kg/d"
            ]);
            for temperature in [10.0, 15.0, 20.0, 25.0] {
                let mut plant = PlantTask::template();
                plant.problem_name = Some(format!("A2O plant at {} °C", temperature));
                plant.topology.temperature = temperature;
                if let Some(result) = solve_or_log(&plant) {
                    let report = &result.report;
                    table.add_row(row![
                        format!("{:.0}", temperature),
                        percent(report.removal_of("NH4-N")),
                        percent(report.removal_of("TN")),
                        percent(report.removal_of("TP")),
                        format!("{:.0}", report.operation.oxygen_demand)
                    ]);
                }
            }
            table.printstd();
        }
        4 => {
            // simultaneous precipitation with a metal hydroxide dose
            let mut table = Table::new();
            table.add_row(row![
                "Metal dose, g/m3",
                "Effluent TP",
                "Effluent PO4-P",
                "TP removal, %",
                "Sludge, kg TSS/d"
            ]);
            for dose in [0.0, 10.0, 25.0] {
                let mut plant = PlantTask::template();
                plant.problem_name = Some(format!("A2O plant, metal dose {}", dose));
                plant.topology.chemical_precipitation = true;
                plant.topology.metal_dose = dose;
                if let Some(result) = solve_or_log(&plant) {
                    let report = &result.report;
                    table.add_row(row![
                        format!("{:.0}", dose),
                        format!("{:.2}", report.effluent_quality.TP),
                        format!("{:.2}", report.effluent_quality.PO4),
                        percent(report.removal_of("TP")),
                        format!("{:.0}", report.operation.sludge_production)
                    ]);
                }
            }
            table.printstd();
        }
        5 => {
            // MLE plant without an anaerobic zone, then the same volume as a two-pass step feed
            let mut mle = PlantTask::template();
            mle.problem_name = Some("MLE plant".to_string());
            mle.topology.zones = vec![
                ReactorZone::new("anoxic", ZoneType::Anoxic, 2500.0),
                ReactorZone::new("aerobic", ZoneType::Aerobic, 4500.0).DO(2.0),
            ];

            let mut step_feed = PlantTask::template();
            step_feed.problem_name = Some("Step feed plant".to_string());
            step_feed.topology.zones = vec![
                ReactorZone::new("anoxic 1", ZoneType::Anoxic, 1250.0).feed(0.6),
                ReactorZone::new("aerobic 1", ZoneType::Aerobic, 2250.0).DO(2.0),
                ReactorZone::new("anoxic 2", ZoneType::Anoxic, 1250.0).feed(0.4),
                ReactorZone::new("aerobic 2", ZoneType::Aerobic, 2250.0).DO(2.0),
            ];
            step_feed.topology.internal_recycle_ratio = 1.0;

            let mut table = Table::new();
            table.add_row(row!["Plant", "NH4-N", "NO3-N", "TN", "TN removal, %", "TP removal, %"]);
            for plant in [&mle, &step_feed] {
                if let Some(result) = solve_or_log(plant) {
                    let report = &result.report;
                    let e = &report.effluent_quality;
                    table.add_row(row![
                        plant.problem_name.as_deref().unwrap_or("-"),
                        format!("{:.2}", e.NH4),
                        format!("{:.2}", e.NO3),
                        format!("{:.2}", e.TN),
                        percent(report.removal_of("TN")),
                        percent(report.removal_of("TP"))
                    ]);
                }
            }
            table.printstd();
        }
        _ => println!("No such example: {}", task),
    }
}
