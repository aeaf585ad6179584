use thiserror::Error;

/// Errors that stop a simulation run before integration starts
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid zone '{zone}': {reason}")]
    InvalidZone { zone: String, reason: String },
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },
    #[error("Invalid influent: {0}")]
    InvalidInfluent(String),
    #[error("Missing data: {0}")]
    MissingData(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimulationError {
    /// true for errors caused by the plant or run configuration (as opposed to file handling)
    pub fn is_configuration_error(&self) -> bool {
        !matches!(self, SimulationError::Io(_) | SimulationError::Json(_))
    }
}
