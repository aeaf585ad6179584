#[cfg(test)]
mod tests {
    use crate::ASM2d::parameters::{
        KineticParameters, StoichiometricParameters, TemperatureCoefficients,
    };
    use crate::ASM2d::process_rates::{Process, ProcessFamily, ZoneType};
    use crate::ASM2d::state_vector::{Component, StateVector};
    use crate::SludgeReactors::errors::SimulationError;
    use crate::SludgeReactors::influent::{
        DiurnalInfluent, InfluentDescriptor, InfluentFractions, InfluentPattern,
    };
    use crate::SludgeReactors::reactor_topology::{ReactorTopology, ReactorZone};
    use crate::SludgeReactors::report::PhosphorusBasis;
    use crate::SludgeReactors::simulation::{
        InitialCondition, SimulationConfig, SimulationDriver, SimulationMode, SimulationResult,
    };
    use std::sync::OnceLock;

    fn driver(
        influent: InfluentDescriptor,
        fractions: InfluentFractions,
        topology: ReactorTopology,
        config: SimulationConfig,
    ) -> Result<SimulationDriver, SimulationError> {
        SimulationDriver::new(
            influent,
            InfluentPattern::default(),
            fractions,
            topology,
            config,
            KineticParameters::default(),
            StoichiometricParameters::default(),
            TemperatureCoefficients::default(),
        )
    }

    fn steady_state(
        influent: InfluentDescriptor,
        fractions: InfluentFractions,
    ) -> SimulationResult {
        driver(
            influent,
            fractions,
            ReactorTopology::default(),
            SimulationConfig::default(),
        )
        .unwrap()
        .run()
        .unwrap()
    }

    /// A2O plant, Q 10 000 m3/d, COD 400, NH4 25, TP 8, VFA 40, SRT 15 d, 20 °C, 60 d
    fn baseline() -> &'static SimulationResult {
        static BASELINE: OnceLock<SimulationResult> = OnceLock::new();
        BASELINE.get_or_init(|| {
            steady_state(InfluentDescriptor::default(), InfluentFractions::default())
        })
    }

    #[test]
    fn a2o_plant_removes_nitrogen_and_phosphorus() {
        let result = baseline();
        let report = &result.report;
        let nh4 = report.removal_of("NH4-N").unwrap();
        let tp = report.removal_of("TP").unwrap();
        assert!(nh4 >= 70.0, "NH4 removal {:.1} %", nh4);
        assert!(tp >= 70.0, "TP removal {:.1} %", tp);
        assert!(
            report.phosphorus.closure_percent > 90.0 && report.phosphorus.closure_percent < 110.0,
            "P closure {:.1} %",
            report.phosphorus.closure_percent
        );
        assert!(report.phosphorus.within_tolerance);
        assert_eq!(report.phosphorus.basis, PhosphorusBasis::Rate);
        assert!(result.diagnostics.converged);
        assert_eq!(result.diagnostics.convergence_history.len(), 60);
        assert_eq!(report.metadata.steps, 60_000);
        assert!(result.time_series.is_empty());
    }

    #[test]
    fn dissolved_oxygen_is_held_per_zone() {
        let result = baseline();
        assert_eq!(result.state_of("anaerobic").unwrap().S_O2, 0.0);
        assert_eq!(result.state_of("anoxic").unwrap().S_O2, 0.0);
        assert_eq!(result.state_of("aerobic").unwrap().S_O2, 2.0);
        for state in &result.final_states {
            assert!(state.check_physical().is_ok());
        }
        // held, never integrated
        assert_eq!(result.diagnostics.clamps_of(Component::S_O2), 0);
    }

    #[test]
    fn a2o_plant_shows_bio_p_pattern() {
        let result = baseline();
        let anaerobic = result.state_of("anaerobic").unwrap();
        let aerobic = result.state_of("aerobic").unwrap();
        // release in the anaerobic zone, luxury uptake in the aerobic zone
        assert!(anaerobic.S_PO4 > aerobic.S_PO4);
        assert!(anaerobic.X_PHA > aerobic.X_PHA);
        let pao = &result.report.pao;
        assert!(pao.release_rate > 0.0);
        assert!(pao.uptake_rate > pao.release_rate);
        assert!(pao.pao_fraction > 0.0 && pao.pao_fraction < 1.0);
        assert!(pao.denitrifying_share.unwrap() > 0.0);
        let operation = &result.report.operation;
        assert!(operation.oxygen_demand > 0.0);
        assert!(operation.sludge_production > 0.0);
        assert!(result.report.effluent_quality.TSS < 20.0);
    }

    #[test]
    fn vfa_free_influent_reduces_pao_activity() {
        let base = baseline();
        let mut influent = InfluentDescriptor::default();
        influent.VFA = 0.0;
        let result = steady_state(influent, InfluentFractions::default());
        // fermentation of S_F still feeds the PAO: roughly 60 % of the baseline activity remains
        let release = result.report.pao.release_rate / base.report.pao.release_rate;
        let uptake = result.report.pao.uptake_rate / base.report.pao.uptake_rate;
        assert!((0.4..0.75).contains(&release), "release ratio {:.3}", release);
        assert!((0.4..0.75).contains(&uptake), "uptake ratio {:.3}", uptake);
        let tp = result.report.removal_of("TP").unwrap();
        let tp_base = base.report.removal_of("TP").unwrap();
        assert!(tp < tp_base - 10.0, "TP removal {:.1} % vs {:.1} %", tp, tp_base);
    }

    #[test]
    fn influent_without_biodegradable_carbon_starves_pao() {
        let base = baseline();
        let mut influent = InfluentDescriptor::default();
        influent.VFA = 0.0;
        let fractions = InfluentFractions {
            f_SI: 0.3,
            f_XI: 0.7,
            f_SF: 0.0,
            f_XH: 0.0,
        };
        let result = steady_state(influent, fractions);
        let pao = &result.report.pao;
        assert!(pao.release_rate < 0.01 * base.report.pao.release_rate);
        assert!(pao.uptake_rate < 0.01 * base.report.pao.uptake_rate);
    }

    #[test]
    fn nitrate_free_anoxic_reactor_stops_anoxic_growth() {
        let mut influent = InfluentDescriptor::default();
        influent.NO3 = 0.0;
        let mut topology = ReactorTopology::default();
        topology.zones = vec![ReactorZone::new("anoxic", ZoneType::Anoxic, 2000.0)];
        topology.internal_recycle_ratio = 0.0;
        let mut seed = StateVector::default_seed();
        seed.S_NO3 = 10.0;
        let config = SimulationConfig {
            end_time: 2.0,
            reporting_interval: 0.125,
            mode: SimulationMode::Dynamic,
            initial_condition: InitialCondition::Uniform(seed),
            ..SimulationConfig::default()
        };
        let driver = driver(influent, InfluentFractions::default(), topology, config).unwrap();
        let initial = driver
            .model
            .process_rates(&seed.to_vector(), ZoneType::Anoxic);
        let result = driver.run().unwrap();
        // V/F = 2000 m3 / 15 000 m3/d ≈ 0.133 d; the first snapshot lies just inside it
        let residence_time = 2000.0 / driver.flow_sheet.zone_flows(10_000.0)[0];
        let first = &result.time_series[1];
        assert!(first.time <= residence_time);
        let early = driver
            .model
            .process_rates(&first.zone_states[0].to_vector(), ZoneType::Anoxic);
        let last = &result.final_rates[0];
        for process in [
            Process::DenitrificationOnFermentable,
            Process::DenitrificationOnAcetate,
            Process::AnoxicPpStorage,
            Process::AnoxicPaoGrowth,
        ] {
            let j = process.index();
            assert!(initial[j] > 0.0, "{}", process);
            assert!(early[j] < 0.01 * initial[j], "{} after {} d", process, first.time);
            assert!(last[j] < 0.01 * initial[j], "{}", process);
        }
        for definition in &driver.model.definitions {
            if definition.family == ProcessFamily::Aerobic {
                assert_eq!(last[definition.process.index()], 0.0);
            }
        }
        assert!(result.final_states[0].S_NO3 < 0.01);
    }

    #[test]
    fn dynamic_run_keeps_snapshots_and_closes_phosphorus() {
        let config = SimulationConfig {
            end_time: 2.0,
            reporting_interval: 0.25,
            mode: SimulationMode::Dynamic,
            ..SimulationConfig::default()
        };
        let driver = SimulationDriver::new(
            InfluentDescriptor::default(),
            InfluentPattern::Diurnal(DiurnalInfluent::default()),
            InfluentFractions::default(),
            ReactorTopology::default(),
            config,
            KineticParameters::default(),
            StoichiometricParameters::default(),
            TemperatureCoefficients::default(),
        )
        .unwrap();
        let result = driver.run().unwrap();
        assert_eq!(result.time_series.len(), 9);
        assert_eq!(result.time_series[0].time, 0.0);
        for pair in result.time_series.windows(2) {
            assert!(pair[1].time > pair[0].time);
        }
        let flows: Vec<f64> = result.time_series.iter().map(|p| p.flow).collect();
        let max = flows.iter().cloned().fold(f64::MIN, f64::max);
        let min = flows.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max > 12_000.0 && min < 8_000.0);

        let balance = &result.report.phosphorus;
        assert_eq!(balance.basis, PhosphorusBasis::Total);
        assert!(
            (balance.closure_percent - 100.0).abs() < 2.0,
            "closure {:.2} %",
            balance.closure_percent
        );
    }

    #[test]
    fn configuration_errors_stop_before_integration() {
        let bad_interval = SimulationConfig {
            reporting_interval: 0.0001,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            driver(
                InfluentDescriptor::default(),
                InfluentFractions::default(),
                ReactorTopology::default(),
                bad_interval
            ),
            Err(SimulationError::InvalidConfiguration(_))
        ));

        let wrong_count = SimulationConfig {
            initial_condition: InitialCondition::PerZone(vec![StateVector::default_seed(); 2]),
            ..SimulationConfig::default()
        };
        assert!(
            driver(
                InfluentDescriptor::default(),
                InfluentFractions::default(),
                ReactorTopology::default(),
                wrong_count
            )
            .is_err()
        );

        let mut negative = StateVector::default_seed();
        negative.set(Component::X_PAO, -1.0);
        let negative_seed = SimulationConfig {
            initial_condition: InitialCondition::Uniform(negative),
            ..SimulationConfig::default()
        };
        assert!(matches!(
            driver(
                InfluentDescriptor::default(),
                InfluentFractions::default(),
                ReactorTopology::default(),
                negative_seed
            ),
            Err(SimulationError::InvalidZone { .. })
        ));

        let mut cold = ReactorTopology::default();
        cold.temperature = 2.0;
        assert!(
            driver(
                InfluentDescriptor::default(),
                InfluentFractions::default(),
                cold,
                SimulationConfig::default()
            )
            .is_err()
        );
    }

    #[test]
    fn carried_over_states_restart_close_to_steady_state() {
        let base = baseline();
        let config = SimulationConfig {
            end_time: 1.0,
            initial_condition: InitialCondition::PerZone(base.final_states.clone()),
            ..SimulationConfig::default()
        };
        let result = driver(
            InfluentDescriptor::default(),
            InfluentFractions::default(),
            ReactorTopology::default(),
            config,
        )
        .unwrap()
        .run()
        .unwrap();
        assert!(result.diagnostics.final_relative_change < 1e-2);
        let before = base.report.effluent_quality.NH4;
        let after = result.report.effluent_quality.NH4;
        assert!((after - before).abs() < 0.1 * before.max(0.5));
    }
}
