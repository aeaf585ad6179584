#[cfg(test)]
mod tests {
    use crate::ASM2d::parameters::{
        KineticParameters, StoichiometricParameters, TemperatureCoefficients,
    };
    use crate::ASM2d::process_rates::{
        ModelOptions, Process, ProcessFamily, ProcessModel, ZoneType,
    };
    use crate::ASM2d::state_vector::{Component, ComponentVector, StateVector};
    use crate::ASM2d::stoichiometry::{Conserved, continuity_residuals};
    use approx::assert_relative_eq;

    fn default_model(options: ModelOptions) -> ProcessModel {
        ProcessModel::new(
            &KineticParameters::default(),
            &StoichiometricParameters::default(),
            options,
        )
    }

    /// deterministic spread of mixed-liquor compositions
    fn sample_states(n: usize) -> Vec<ComponentVector> {
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed % 10_000) as f64 / 10_000.0
        };
        let base = StateVector::default_seed().to_vector();
        (0..n)
            .map(|_| {
                let mut x = base.map(|v| v * 2.0 * next());
                x[Component::S_O2.index()] = 4.0 * next();
                x[Component::S_NO3.index()] = 15.0 * next();
                x[Component::X_MeOH.index()] = 50.0 * next();
                x[Component::X_MeP.index()] = 20.0 * next();
                x
            })
            .collect()
    }

    #[test]
    fn every_process_conserves_cod_nitrogen_phosphorus_and_charge() {
        let mut altered = StoichiometricParameters::default();
        altered.Y_H = 0.67;
        altered.f_SI = 0.02;
        altered.i_N_BM = 0.086;
        altered.i_P_XS = 0.015;
        let options = ModelOptions {
            denitrifying_pao: true,
            chemical_precipitation: true,
        };
        for st in [StoichiometricParameters::default(), altered] {
            let model = ProcessModel::new(&KineticParameters::default(), &st, options);
            let residuals = continuity_residuals(&model.stoichiometry, &model.composition);
            for process in Process::ALL {
                for (q, quantity) in Conserved::ALL.iter().enumerate() {
                    let r = residuals[(process.index(), q)];
                    assert!(
                        r.abs() < 1e-9,
                        "{} of '{}' does not close: {}",
                        quantity.name(),
                        process,
                        r
                    );
                }
            }
        }
    }

    #[test]
    fn net_derivative_conserves_cod_for_any_state() {
        let model = default_model(ModelOptions::default());
        for x in sample_states(50) {
            let (_, dx) = model.reaction_terms(&x, ZoneType::Aerobic);
            let scale = dx.amax().max(1.0);
            assert!(model.composition.cod.dot(&dx).abs() < 1e-9 * scale);
            assert!(model.composition.phosphorus.dot(&dx).abs() < 1e-9 * scale);
        }
    }

    #[test]
    fn gated_processes_are_exactly_zero() {
        let model = default_model(ModelOptions {
            denitrifying_pao: true,
            chemical_precipitation: true,
        });
        for x in sample_states(200) {
            let anaerobic = model.process_rates(&x, ZoneType::Anaerobic);
            let anoxic = model.process_rates(&x, ZoneType::Anoxic);
            for definition in &model.definitions {
                let j = definition.process.index();
                match definition.family {
                    ProcessFamily::Aerobic => {
                        assert_eq!(anaerobic[j], 0.0);
                        assert_eq!(anoxic[j], 0.0);
                    }
                    ProcessFamily::Anoxic => assert_eq!(anaerobic[j], 0.0),
                    _ => {}
                }
            }
        }
    }

    #[test]
    fn aerobic_zone_runs_anoxic_processes_damped_by_oxygen() {
        let model = default_model(ModelOptions::default());
        let mut x = StateVector::default_seed().to_vector();
        x[Component::S_NO3.index()] = 8.0;
        let j = Process::DenitrificationOnAcetate.index();
        let no_oxygen = model.process_rates(&x, ZoneType::Aerobic)[j];
        x[Component::S_O2.index()] = 2.0;
        let with_oxygen = model.process_rates(&x, ZoneType::Aerobic)[j];
        assert!(no_oxygen > 0.0);
        assert!(with_oxygen > 0.0 && with_oxygen < 0.1 * no_oxygen);
    }

    #[test]
    fn pp_uptake_stops_at_storage_capacity() {
        let kinetic = KineticParameters::default();
        let model = default_model(ModelOptions::default());
        let mut x = StateVector::default_seed().to_vector();
        x[Component::S_O2.index()] = 2.0;
        let pao = x[Component::X_PAO.index()];
        let j = Process::AerobicPpStorage.index();

        x[Component::X_PP.index()] = 0.5 * kinetic.K_MAX * pao;
        assert!(model.process_rates(&x, ZoneType::Aerobic)[j] > 0.0);
        x[Component::X_PP.index()] = kinetic.K_MAX * pao;
        assert_eq!(model.process_rates(&x, ZoneType::Aerobic)[j], 0.0);
        x[Component::X_PP.index()] = 1.5 * kinetic.K_MAX * pao;
        assert_eq!(model.process_rates(&x, ZoneType::Aerobic)[j], 0.0);
    }

    #[test]
    fn optional_process_groups_follow_flags() {
        let mut x = StateVector::default_seed().to_vector();
        x[Component::S_NO3.index()] = 10.0;
        x[Component::X_MeOH.index()] = 40.0;
        x[Component::X_MeP.index()] = 10.0;
        let off = default_model(ModelOptions {
            denitrifying_pao: false,
            chemical_precipitation: false,
        });
        let on = default_model(ModelOptions {
            denitrifying_pao: true,
            chemical_precipitation: true,
        });
        let rates_off = off.process_rates(&x, ZoneType::Anoxic);
        let rates_on = on.process_rates(&x, ZoneType::Anoxic);
        for process in [
            Process::AnoxicPpStorage,
            Process::AnoxicPaoGrowth,
            Process::Precipitation,
            Process::Redissolution,
        ] {
            assert_eq!(rates_off[process.index()], 0.0, "{}", process);
            assert!(rates_on[process.index()] > 0.0, "{}", process);
        }
    }

    #[test]
    fn nitrate_free_anoxic_zone_has_no_anoxic_growth() {
        let model = default_model(ModelOptions::default());
        let mut x = StateVector::default_seed().to_vector();
        x[Component::S_NO3.index()] = 0.0;
        let rates = model.process_rates(&x, ZoneType::Anoxic);
        for process in [
            Process::DenitrificationOnFermentable,
            Process::DenitrificationOnAcetate,
            Process::AnoxicPpStorage,
            Process::AnoxicPaoGrowth,
            Process::AnoxicHydrolysis,
        ] {
            assert_eq!(rates[process.index()], 0.0, "{}", process);
        }
        // decay keeps running
        assert!(rates[Process::HeterotrophLysis.index()] > 0.0);
    }

    #[test]
    fn anaerobic_phosphorus_release_needs_acetate() {
        let model = default_model(ModelOptions::default());
        let mut x = StateVector::default_seed().to_vector();
        x[Component::S_NO3.index()] = 0.0;
        x[Component::S_A.index()] = 20.0;
        let (rates, dx) = model.reaction_terms(&x, ZoneType::Anaerobic);
        assert!(rates[Process::PhaStorage.index()] > 0.0);
        assert!(dx[Component::S_PO4.index()] > 0.0);
        assert!(dx[Component::X_PHA.index()] > 0.0);

        x[Component::S_A.index()] = 0.0;
        assert_eq!(
            model.process_rates(&x, ZoneType::Anaerobic)[Process::PhaStorage.index()],
            0.0
        );
    }

    #[test]
    fn reference_temperature_reproduces_reference_rates() {
        let kinetic = KineticParameters::default();
        let corrected = kinetic.at_temperature(&TemperatureCoefficients::default(), 20.0);
        let st = StoichiometricParameters::default();
        let reference = ProcessModel::new(&kinetic, &st, ModelOptions::default());
        let at_20 = ProcessModel::new(&corrected, &st, ModelOptions::default());
        let x = StateVector::default_seed().to_vector();
        assert_eq!(
            reference.process_rates(&x, ZoneType::Anoxic),
            at_20.process_rates(&x, ZoneType::Anoxic)
        );
    }

    #[test]
    fn cold_water_slows_nitrification() {
        let kinetic = KineticParameters::default();
        let st = StoichiometricParameters::default();
        let cold = kinetic.at_temperature(&TemperatureCoefficients::default(), 10.0);
        let warm_model = ProcessModel::new(&kinetic, &st, ModelOptions::default());
        let cold_model = ProcessModel::new(&cold, &st, ModelOptions::default());
        let mut x = StateVector::default_seed().to_vector();
        x[Component::S_O2.index()] = 2.0;
        let j = Process::AutotrophGrowth.index();
        let ratio = cold_model.process_rates(&x, ZoneType::Aerobic)[j]
            / warm_model.process_rates(&x, ZoneType::Aerobic)[j];
        assert_relative_eq!(ratio, 1.111_f64.powf(-10.0), epsilon = 1e-9);
    }
}
