//! # Workflow Simulator
//!
//! Replays scripted multi-agent workflows as nested step events, for
//! demonstrating and testing event-reporting pipelines without running any
//! real agents.
//!
//! ## Features
//!
//! - **Presets**: declarative workflows of phases, agents and task messages,
//!   loaded by name from a directory of JSON files or from built-ins
//! - **Nested steps**: `workflow ⊃ phase ⊃ agent ⊃ task`, always closed in
//!   reverse order of opening, even when the reporter fails mid-run
//! - **Randomized timing**: per-phase and per-agent delay windows, with
//!   injectable clock and random source for deterministic runs
//! - **Timer-tick mode**: one step per fixed interval for a bounded duration
//!
//! ## Architecture
//!
//! ```text
//! PresetStore → WorkflowPreset → WorkflowSimulator → StepReporter
//!                                      ↑
//!                         Clock + RandomSource (DelayGenerator)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use workflow_simulator::presets::MemoryPresetStore;
//! use workflow_simulator::report::LogReporter;
//! use workflow_simulator::simulator::WorkflowSimulator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryPresetStore::with_builtins());
//!     let mut simulator = WorkflowSimulator::new(store, Arc::new(LogReporter::new()));
//!     let result = simulator.run("incident_response").await?;
//!     println!("{} events in {:.1}s", result.total_events, result.elapsed_seconds);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]

/// Command-line interface.
pub mod cli;
/// Configuration loaded from the environment.
pub mod config;
/// Error types and result aliases.
pub mod error;
/// Preset model, storage and built-ins.
pub mod presets;
/// Step reporting contract and reporters.
pub mod report;
/// Clock, delay generation and the simulation engine.
pub mod simulator;

pub use config::Config;
pub use error::{AppError, AppResult, PresetError, ReportError, SimulationError};
pub use simulator::{SimulationResult, WorkflowSimulator};
