//! Command-line interface for running simulations.

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;

use crate::config::Config;
use crate::presets::{DirectoryPresetStore, MemoryPresetStore, PresetStore};
use crate::report::{JsonLinesReporter, LogReporter, StepReporter};
use crate::simulator::{RandomSource, SeededRandom, ThreadRandom, WorkflowSimulator};

/// Scripted multi-agent workflow simulator.
#[derive(Parser, Debug)]
#[command(name = "workflow-simulator", version, about)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Simulator subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run a workflow preset
    Run {
        /// Preset name (file stem in the presets directory)
        preset: String,

        /// Seed for reproducible delays (overrides SIMULATOR_SEED)
        #[arg(long)]
        seed: Option<u64>,

        /// Where step events go
        #[arg(long, value_enum, default_value = "log")]
        events: EventOutput,
    },

    /// Emit one step per tick for a fixed duration
    Tick {
        /// Total run time in seconds
        #[arg(long)]
        total: f64,

        /// Seconds between ticks (defaults to TICK_INTERVAL_SECONDS)
        #[arg(long)]
        interval: Option<f64>,

        /// Where step events go
        #[arg(long, value_enum, default_value = "log")]
        events: EventOutput,
    },

    /// List available presets
    List,

    /// Show a preset summary
    Show {
        /// Preset name
        preset: String,
    },
}

/// Destination of step events.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutput {
    /// Structured log lines on stderr
    Log,
    /// JSON lines on stdout
    Json,
}

/// Result of CLI command execution.
pub struct CliResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Output message
    pub message: String,
}

impl CliResult {
    /// Create a success result with the given message.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            exit_code: 0,
            message: message.into(),
        }
    }

    /// Create an error result with the given message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            exit_code: 1,
            message: message.into(),
        }
    }
}

/// Execute a CLI command.
pub async fn execute_command(command: Commands, config: &Config) -> CliResult {
    match command {
        Commands::Run {
            preset,
            seed,
            events,
        } => execute_run(config, &preset, seed, events).await,
        Commands::Tick {
            total,
            interval,
            events,
        } => {
            let interval = interval.unwrap_or(config.simulation.tick_interval_seconds);
            execute_tick(config, total, interval, events).await
        }
        Commands::List => execute_list(config),
        Commands::Show { preset } => execute_show(config, &preset),
    }
}

/// Preset store for `config`: the presets directory when it holds any
/// presets, otherwise the built-ins.
pub fn preset_store(config: &Config) -> Arc<dyn PresetStore> {
    let directory = DirectoryPresetStore::new(config.presets.dir.clone());
    match directory.list_available() {
        Ok(names) if !names.is_empty() => {
            info!(dir = %config.presets.dir.display(), presets = names.len(), "Using preset directory");
            Arc::new(directory)
        }
        _ => {
            info!(dir = %config.presets.dir.display(), "No presets found, using built-in presets");
            Arc::new(MemoryPresetStore::with_builtins())
        }
    }
}

fn reporter_for(events: EventOutput) -> Arc<dyn StepReporter> {
    match events {
        EventOutput::Log => Arc::new(LogReporter::new()),
        EventOutput::Json => Arc::new(JsonLinesReporter::stdout()),
    }
}

fn build_simulator(config: &Config, seed: Option<u64>, events: EventOutput) -> WorkflowSimulator {
    let random: Box<dyn RandomSource> = match seed.or(config.simulation.seed) {
        Some(seed) => {
            info!(seed, "Using seeded delays");
            Box::new(SeededRandom::new(seed))
        }
        None => Box::new(ThreadRandom),
    };
    WorkflowSimulator::new(preset_store(config), reporter_for(events))
        .with_random(random)
        .with_max_timer_seconds(config.simulation.max_timer_seconds)
}

fn to_json<T: Serialize>(value: &T) -> CliResult {
    match serde_json::to_string_pretty(value) {
        Ok(json) => CliResult::success(json),
        Err(e) => CliResult::error(format!("Failed to serialize output: {}", e)),
    }
}

async fn execute_run(
    config: &Config,
    preset: &str,
    seed: Option<u64>,
    events: EventOutput,
) -> CliResult {
    let mut simulator = build_simulator(config, seed, events);
    match simulator.run(preset).await {
        Ok(result) => to_json(&result),
        Err(e) => CliResult::error(e.to_string()),
    }
}

async fn execute_tick(config: &Config, total: f64, interval: f64, events: EventOutput) -> CliResult {
    let mut simulator = build_simulator(config, None, events);
    match simulator.run_timer_tick(total, interval).await {
        Ok(result) => to_json(&result),
        Err(e) => CliResult::error(e.to_string()),
    }
}

fn execute_list(config: &Config) -> CliResult {
    match preset_store(config).list_available() {
        Ok(names) => CliResult::success(names.join("\n")),
        Err(e) => CliResult::error(e.to_string()),
    }
}

fn execute_show(config: &Config, preset: &str) -> CliResult {
    match preset_store(config).load(preset) {
        Ok(preset) => to_json(&preset.to_summary()),
        Err(e) => CliResult::error(e.to_string()),
    }
}
