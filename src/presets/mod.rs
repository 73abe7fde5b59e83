//! Workflow preset model and storage.
//!
//! This module provides:
//! - `WorkflowPreset`: phases of agents, each agent emitting task messages
//! - `PresetStore`: lookup of presets by name (directory or in-memory)
//! - Built-in presets for demos

mod builtins;
mod store;
mod types;

pub use builtins::*;
pub use store::{parse_preset, DirectoryPresetStore, MemoryPresetStore, PresetStore, PRESET_EXTENSION};
pub use types::*;
