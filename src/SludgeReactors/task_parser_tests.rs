#[cfg(test)]
mod tests {
    use crate::ASM2d::process_rates::ZoneType;
    use crate::SludgeReactors::errors::SimulationError;
    use crate::SludgeReactors::influent::InfluentPattern;
    use crate::SludgeReactors::simulation::SimulationMode;
    use crate::SludgeReactors::task_parser::PlantTask;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TASK: &str = r#"{
        "problem_name": "two-zone plant",
        "influent": { "Q": 5000.0, "COD": 350.0, "NH4": 30.0, "TP": 6.0, "VFA": 20.0 },
        "topology": {
            "zones": [
                { "name": "anoxic", "zone_type": "Anoxic", "volume": 1500.0 },
                { "name": "aerobic", "zone_type": "Aerobic", "volume": 3000.0 }
            ],
            "SRT": 12.0,
            "temperature": 15.0,
            "internal_recycle_ratio": 2.0,
            "return_sludge_ratio": 0.6
        },
        "simulation": { "end_time": 0.5, "reporting_interval": 0.1, "mode": "Dynamic" },
        "influent_pattern": { "Step": { "time": 0.25, "flow_factor": 1.2, "load_factor": 0.8 } },
        "kinetic": { "mu_AUT": 0.8 }
    }"#;

    fn temp_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn template_survives_a_file_round_trip() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        PlantTask::write_template(path).unwrap();
        let loaded = PlantTask::load(path).unwrap();
        assert_eq!(loaded, PlantTask::template());
        assert_eq!(loaded.topology.zones.len(), 3);
    }

    #[test]
    fn minimal_task_falls_back_to_defaults() {
        let file = temp_file(MINIMAL_TASK);
        let task = PlantTask::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(task.problem_name.as_deref(), Some("two-zone plant"));
        assert_eq!(task.influent.alkalinity, 250.0);
        assert_eq!(task.influent.BOD5, None);
        assert_eq!(task.kinetic.mu_AUT, 0.8);
        assert_eq!(task.kinetic.mu_H, 6.0);
        assert_eq!(task.fractions.f_SI, 0.05);
        assert_eq!(task.simulation.time_step, 0.001);
        assert_eq!(task.simulation.mode, SimulationMode::Dynamic);
        assert_eq!(task.topology.zones[1].zone_type, ZoneType::Aerobic);
        assert!(matches!(task.influent_pattern, InfluentPattern::Step(_)));
    }

    #[test]
    fn minimal_task_solves() {
        let file = temp_file(MINIMAL_TASK);
        let task = PlantTask::load(file.path().to_str().unwrap()).unwrap();
        let result = task.solve().unwrap();
        assert_eq!(result.time_series.len(), 6);
        assert_eq!(result.final_states.len(), 2);
        // step change after a quarter of a day
        assert_eq!(result.time_series[1].flow, 5000.0);
        assert_eq!(result.time_series[5].flow, 6000.0);

        let out = NamedTempFile::new().unwrap();
        let out_path = out.path().to_str().unwrap();
        task.save_results(&result, out_path).unwrap();
        let saved: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out_path).unwrap()).unwrap();
        assert_eq!(saved["problem_name"], "two-zone plant");
        assert_eq!(saved["time_series"].as_array().unwrap().len(), 6);
        assert!(saved["report"]["phosphorus"]["closure_percent"].is_number());
    }

    #[test]
    fn malformed_task_reports_json_error() {
        let broken = MINIMAL_TASK.replace("\"SRT\": 12.0,", "\"SRT\": 12.0");
        let file = temp_file(&broken);
        let result = PlantTask::load(file.path().to_str().unwrap());
        assert!(matches!(result, Err(SimulationError::Json(_))));
    }

    #[test]
    fn missing_required_section_is_rejected() {
        let file =
            temp_file(r#"{ "influent": { "Q": 1000.0, "COD": 300.0, "NH4": 20.0, "TP": 5.0 } }"#);
        assert!(matches!(
            PlantTask::load(file.path().to_str().unwrap()),
            Err(SimulationError::Json(_))
        ));
    }

    #[test]
    fn invalid_plant_fails_before_integration() {
        let mut task = PlantTask::template();
        task.topology.SRT = -1.0;
        let error = task.solve().unwrap_err();
        assert!(error.is_configuration_error());

        let mut task = PlantTask::template();
        task.kinetic.mu_H = -2.0;
        assert!(matches!(
            task.solve(),
            Err(SimulationError::InvalidParameter { .. })
        ));
    }
}
