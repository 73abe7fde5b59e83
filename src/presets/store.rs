//! Preset storage: resolving preset names to validated definitions.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tracing::{debug, warn};

use super::builtins;
use super::types::WorkflowPreset;
use crate::error::{PresetError, PresetResult};

/// File extension of preset documents.
pub const PRESET_EXTENSION: &str = "json";

/// Source of named workflow presets.
pub trait PresetStore: Send + Sync {
    /// Resolve `name` to a validated preset.
    ///
    /// # Errors
    /// `PresetError::NotFound` (listing every available name) when nothing is
    /// stored under `name`, `PresetError::Validation` when the stored document
    /// does not match the preset schema.
    fn load(&self, name: &str) -> PresetResult<WorkflowPreset>;

    /// All currently discoverable preset names, sorted.
    fn list_available(&self) -> PresetResult<Vec<String>>;
}

/// Parse a preset document and apply structural validation.
pub fn parse_preset(name: &str, document: &str) -> PresetResult<WorkflowPreset> {
    let preset: WorkflowPreset =
        serde_json::from_str(document).map_err(|e| PresetError::Validation {
            name: name.to_string(),
            message: e.to_string(),
        })?;
    check_preset(name, preset)
}

fn check_preset(name: &str, preset: WorkflowPreset) -> PresetResult<WorkflowPreset> {
    preset
        .validate()
        .map_err(|message| PresetError::Validation {
            name: name.to_string(),
            message,
        })?;
    Ok(preset)
}

/// Presets stored as `{dir}/{name}.json`, one file per preset.
#[derive(Debug, Clone)]
pub struct DirectoryPresetStore {
    dir: PathBuf,
}

impl DirectoryPresetStore {
    /// Create a store rooted at `dir`. The directory does not need to exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory of this store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, name: &str) -> Option<PathBuf> {
        let invalid = name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..");
        if invalid {
            return None;
        }
        Some(self.dir.join(format!("{}.{}", name, PRESET_EXTENSION)))
    }

    fn not_found(&self, name: &str) -> PresetError {
        PresetError::NotFound {
            name: name.to_string(),
            available: self.list_available().unwrap_or_default(),
        }
    }
}

impl PresetStore for DirectoryPresetStore {
    fn load(&self, name: &str) -> PresetResult<WorkflowPreset> {
        let Some(path) = self.path_for(name) else {
            warn!(preset = name, "Rejected preset name that cannot map to a file");
            return Err(self.not_found(name));
        };

        let document = match fs::read_to_string(&path) {
            Ok(doc) => doc,
            Err(e) if e.kind() == ErrorKind::NotFound => return Err(self.not_found(name)),
            Err(source) => return Err(PresetError::Io { path, source }),
        };

        debug!(preset = name, path = %path.display(), "Loaded preset document");
        parse_preset(name, &document)
    }

    fn list_available(&self) -> PresetResult<Vec<String>> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(PresetError::Io {
                    path: self.dir.clone(),
                    source,
                })
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some(PRESET_EXTENSION))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        names.sort();
        Ok(names)
    }
}

#[derive(Debug, Clone)]
enum StoredPreset {
    Typed(WorkflowPreset),
    Document(String),
}

/// In-memory preset store.
///
/// Holds either typed presets or raw JSON documents; both go through the same
/// validation on `load`.
#[derive(Debug, Default)]
pub struct MemoryPresetStore {
    presets: RwLock<BTreeMap<String, StoredPreset>>,
}

impl MemoryPresetStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the built-in presets.
    pub fn with_builtins() -> Self {
        let store = Self::new();
        for preset in builtins::builtin_presets() {
            store.insert(preset);
        }
        store
    }

    /// Register a typed preset under its own name, replacing any previous one.
    pub fn insert(&self, preset: WorkflowPreset) {
        self.write()
            .insert(preset.name.clone(), StoredPreset::Typed(preset));
    }

    /// Register a raw JSON document under `name`.
    pub fn insert_document(&self, name: impl Into<String>, document: impl Into<String>) {
        self.write()
            .insert(name.into(), StoredPreset::Document(document.into()));
    }

    /// Number of stored presets.
    pub fn count(&self) -> usize {
        self.read().len()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, BTreeMap<String, StoredPreset>> {
        self.presets.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, BTreeMap<String, StoredPreset>> {
        self.presets.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl PresetStore for MemoryPresetStore {
    fn load(&self, name: &str) -> PresetResult<WorkflowPreset> {
        let stored = self.read().get(name).cloned();
        match stored {
            Some(StoredPreset::Typed(preset)) => check_preset(name, preset),
            Some(StoredPreset::Document(document)) => parse_preset(name, &document),
            None => Err(PresetError::NotFound {
                name: name.to_string(),
                available: self.read().keys().cloned().collect(),
            }),
        }
    }

    fn list_available(&self) -> PresetResult<Vec<String>> {
        Ok(self.read().keys().cloned().collect())
    }
}
