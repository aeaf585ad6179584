use crate::SludgeReactors::errors::SimulationError;
use log::{error, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;

/// Logs where a JSON document failed to parse: line, column and a pointer under the column.
pub fn report_json_error(file_name: &str, content: &str, e: &serde_json::Error) {
    let error_line = e.line();
    let error_column = e.column();
    error!(
        "Error parsing '{}' at line {}, column {}: {}",
        file_name, error_line, error_column, e
    );
    if error_line == 0 {
        return;
    }
    if let Some(problem_line) = content.lines().nth(error_line - 1) {
        error!("Problematic line: {}", problem_line);
        if error_column >= 1 && error_column <= problem_line.len() + 1 {
            let pointer = " ".repeat(error_column - 1) + "^";
            error!("                  {}", pointer);
        }
    }
}

/// Reads a JSON file into `T`
pub fn load_json<T: DeserializeOwned>(file_name: &str) -> Result<T, SimulationError> {
    let path = Path::new(file_name);
    if !path.exists() {
        return Err(SimulationError::MissingData(format!(
            "File '{}' does not exist",
            file_name
        )));
    }
    let content = fs::read_to_string(path)?;
    match serde_json::from_str::<T>(&content) {
        Ok(data) => {
            info!("Successfully parsed '{}'", file_name);
            Ok(data)
        }
        Err(e) => {
            report_json_error(file_name, &content, &e);
            Err(SimulationError::Json(e))
        }
    }
}

/// Writes `data` as pretty-printed JSON
pub fn save_json<T: Serialize>(data: &T, file_name: &str) -> Result<(), SimulationError> {
    let content = serde_json::to_string_pretty(data)?;
    fs::write(file_name, content)?;
    info!("Saved '{}'", file_name);
    Ok(())
}

/// JSON files in `dir` whose name starts with `prefix`, sorted by name
pub fn find_json_files(dir: &str, prefix: &str) -> Result<Vec<String>, SimulationError> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if path.is_file() && name.starts_with(prefix) && name.ends_with(".json") {
            found.push(path.to_string_lossy().into_owned());
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;
    use tempfile::{NamedTempFile, tempdir};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        value: f64,
    }

    #[test]
    fn save_then_load() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_str().unwrap();
        let sample = Sample {
            name: "zone".to_string(),
            value: 2.5,
        };
        save_json(&sample, path).unwrap();
        let loaded: Sample = load_json(path).unwrap();
        assert_eq!(loaded, sample);
    }

    #[test]
    fn malformed_json_is_a_json_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{{\n  \"name\": \"zone\",\n  \"value\": 2.5,,\n}}").unwrap();
        let result: Result<Sample, _> = load_json(file.path().to_str().unwrap());
        match result {
            Err(SimulationError::Json(e)) => assert_eq!(e.line(), 3),
            other => panic!("expected a JSON error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file() {
        let result: Result<Sample, _> = load_json("no_such_plant_file.json");
        assert!(matches!(result, Err(SimulationError::MissingData(_))));
    }

    #[test]
    fn finds_prefixed_json_files() {
        let dir = tempdir().unwrap();
        for name in ["plant_b.json", "plant_a.json", "other.json", "plant_c.txt"] {
            fs::write(dir.path().join(name), "{}").unwrap();
        }
        let found = find_json_files(dir.path().to_str().unwrap(), "plant").unwrap();
        assert_eq!(found.len(), 2);
        assert!(found[0].ends_with("plant_a.json"));
        assert!(found[1].ends_with("plant_b.json"));
    }
}
