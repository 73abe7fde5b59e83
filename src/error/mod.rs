use std::path::PathBuf;

use thiserror::Error;

/// Application-level errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Environment configuration could not be used.
    #[error("Configuration error: {message}")]
    Config {
        /// What was wrong with the configuration.
        message: String,
    },

    /// A simulation run failed.
    #[error("Simulation error: {0}")]
    Simulation(#[from] SimulationError),
}

/// Preset loading errors
#[derive(Debug, Error)]
pub enum PresetError {
    /// No preset is registered under the requested name.
    #[error("Preset '{name}' not found. Available presets: {}", format_available(.available))]
    NotFound {
        /// Requested preset name.
        name: String,
        /// Every name the store could load, sorted.
        available: Vec<String>,
    },

    /// The preset document does not match the preset schema.
    #[error("Invalid preset '{name}': {message}")]
    Validation {
        /// Preset that failed to load.
        name: String,
        /// Parser or validation detail.
        message: String,
    },

    /// The preset file exists but could not be read.
    #[error("Failed to read preset file {}: {source}", .path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Reporting sink errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// The sink refused a step transition.
    #[error("Reporting sink rejected step {step_id}: {message}")]
    Sink {
        /// Step whose transition was refused.
        step_id: String,
        /// Reason given by the sink.
        message: String,
    },

    /// Writing an event failed.
    #[error("Event write failed: {0}")]
    Io(#[from] std::io::Error),

    /// Encoding an event failed.
    #[error("Event serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Simulation run errors
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The preset could not be loaded.
    #[error("Preset error: {0}")]
    Preset(#[from] PresetError),

    /// The reporter failed mid-run.
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// A run argument is out of range.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Which argument was rejected and why.
        message: String,
    },
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "(none)".to_string()
    } else {
        available.join(", ")
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

/// Result type alias for preset loading
pub type PresetResult<T> = Result<T, PresetError>;

/// Result type alias for reporting sink operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type alias for simulation runs
pub type SimResult<T> = Result<T, SimulationError>;
