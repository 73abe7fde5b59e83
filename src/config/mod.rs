use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Default upper bound for a timer-tick run.
pub const DEFAULT_MAX_TIMER_SECONDS: f64 = 600.0;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Preset storage settings.
    pub presets: PresetConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Simulation run settings.
    pub simulation: SimulationConfig,
}

/// Preset storage configuration
#[derive(Debug, Clone)]
pub struct PresetConfig {
    /// Directory holding `{name}.json` preset files.
    pub dir: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// Human-readable lines.
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Simulation run configuration
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Seed for reproducible delay sampling; `None` uses thread randomness.
    pub seed: Option<u64>,
    /// Largest total accepted by timer-tick runs.
    pub max_timer_seconds: f64,
    /// Tick interval used when none is given.
    pub tick_interval_seconds: f64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let presets = PresetConfig {
            dir: PathBuf::from(env::var("PRESETS_DIR").unwrap_or_else(|_| "./presets".to_string())),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let seed = match env::var("SIMULATOR_SEED") {
            Ok(raw) if !raw.trim().is_empty() => {
                Some(raw.trim().parse::<u64>().map_err(|_| AppError::Config {
                    message: format!("SIMULATOR_SEED must be an unsigned integer, got '{}'", raw),
                })?)
            }
            _ => None,
        };

        let simulation = SimulationConfig {
            seed,
            max_timer_seconds: env::var("MAX_TIMER_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v: &f64| *v >= 0.0 && Duration::try_from_secs_f64(*v).is_ok())
                .unwrap_or(DEFAULT_MAX_TIMER_SECONDS),
            tick_interval_seconds: env::var("TICK_INTERVAL_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|v: &f64| *v > 0.0 && Duration::try_from_secs_f64(*v).is_ok())
                .unwrap_or(1.0),
        };

        Ok(Config {
            presets,
            logging,
            simulation,
        })
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_timer_seconds: DEFAULT_MAX_TIMER_SECONDS,
            tick_interval_seconds: 1.0,
        }
    }
}
