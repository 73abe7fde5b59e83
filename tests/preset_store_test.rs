//! Integration tests for directory-backed preset storage
//!
//! Each test writes preset files into its own temporary directory.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use workflow_simulator::error::PresetError;
use workflow_simulator::presets::{DelayRange, DirectoryPresetStore, PresetStore};

const RESEARCH: &str = r#"{
    "name": "research",
    "description": "Research workflow",
    "phases": [
        {
            "id": "discover",
            "name": "Discovery",
            "delay_range_ms": [100, 200],
            "agents": [
                {"id": "search", "name": "Searcher", "tasks": ["Searching", "Found 3 papers"]},
                {"id": "rank", "name": "Ranker", "tasks": [], "delay_range_ms": [0, 50]}
            ]
        },
        {"id": "write", "name": "Writing"}
    ]
}"#;

fn write_preset(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(format!("{}.json", name)), body).unwrap();
}

fn validation_message(store: &DirectoryPresetStore, name: &str) -> String {
    match store.load(name) {
        Err(PresetError::Validation { name: failed, message }) => {
            assert_eq!(failed, name);
            message
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_load_valid_preset() {
    let dir = tempdir().unwrap();
    write_preset(dir.path(), "research", RESEARCH);
    let store = DirectoryPresetStore::new(dir.path());

    let preset = store.load("research").unwrap();
    assert_eq!(preset.name, "research");
    assert_eq!(preset.phases.len(), 2);
    assert_eq!(
        preset.phases[0].delay_range_ms,
        DelayRange::new(100, 200).unwrap()
    );
    assert_eq!(preset.phases[0].agents[0].delay_range_ms, DelayRange::AGENT_DEFAULT);
    assert_eq!(preset.phases[0].agents[1].delay_range_ms, DelayRange::new(0, 50).unwrap());
    assert_eq!(preset.phases[1].delay_range_ms, DelayRange::PHASE_DEFAULT);
    assert!(preset.phases[1].agents.is_empty());
}

#[test]
fn test_not_found_lists_every_available_preset() {
    let dir = tempdir().unwrap();
    write_preset(dir.path(), "research", RESEARCH);
    write_preset(dir.path(), "alpha", RESEARCH);
    write_preset(dir.path(), "zeta", "not even json");
    let store = DirectoryPresetStore::new(dir.path());

    let err = store.load("missing").unwrap_err();
    match &err {
        PresetError::NotFound { name, available } => {
            assert_eq!(name, "missing");
            assert_eq!(available, &vec!["alpha", "research", "zeta"]);
        }
        other => panic!("expected NotFound, got {:?}", other),
    }
    let message = err.to_string();
    for name in ["alpha", "research", "zeta"] {
        assert!(message.contains(name), "{} missing from: {}", name, message);
    }
}

#[test]
fn test_list_available_is_sorted_and_ignores_other_files() {
    let dir = tempdir().unwrap();
    write_preset(dir.path(), "b_preset", RESEARCH);
    write_preset(dir.path(), "a_preset", RESEARCH);
    fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
    fs::create_dir(dir.path().join("nested.json")).unwrap();
    let store = DirectoryPresetStore::new(dir.path());

    assert_eq!(store.list_available().unwrap(), vec!["a_preset", "b_preset"]);
}

#[test]
fn test_missing_directory_is_empty_not_error() {
    let dir = tempdir().unwrap();
    let store = DirectoryPresetStore::new(dir.path().join("absent"));

    assert!(store.list_available().unwrap().is_empty());
    match store.load("anything") {
        Err(PresetError::NotFound { available, .. }) => assert!(available.is_empty()),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_malformed_json_is_validation_error() {
    let dir = tempdir().unwrap();
    write_preset(dir.path(), "broken", "{ \"name\": ");
    let store = DirectoryPresetStore::new(dir.path());

    validation_message(&store, "broken");
}

#[test]
fn test_missing_required_field() {
    let dir = tempdir().unwrap();
    write_preset(
        dir.path(),
        "no_tasks",
        r#"{"name": "n", "description": "d", "phases": [
            {"id": "p", "name": "P", "agents": [{"id": "a", "name": "A"}]}
        ]}"#,
    );
    let store = DirectoryPresetStore::new(dir.path());

    assert!(validation_message(&store, "no_tasks").contains("tasks"));
}

#[test]
fn test_wrong_type_rejected() {
    let dir = tempdir().unwrap();
    write_preset(
        dir.path(),
        "wrong_type",
        r#"{"name": "n", "description": "d", "phases": [
            {"id": "p", "name": "P", "agents": [{"id": "a", "name": "A", "tasks": "one"}]}
        ]}"#,
    );
    let store = DirectoryPresetStore::new(dir.path());

    validation_message(&store, "wrong_type");
}

#[test]
fn test_inverted_delay_range_rejected() {
    let dir = tempdir().unwrap();
    write_preset(
        dir.path(),
        "inverted",
        r#"{"name": "n", "description": "d", "phases": [
            {"id": "p", "name": "P", "delay_range_ms": [2000, 500]}
        ]}"#,
    );
    let store = DirectoryPresetStore::new(dir.path());

    assert!(validation_message(&store, "inverted").contains("exceeds maximum"));
}

#[test]
fn test_empty_phases_rejected() {
    let dir = tempdir().unwrap();
    write_preset(
        dir.path(),
        "empty",
        r#"{"name": "n", "description": "d", "phases": []}"#,
    );
    let store = DirectoryPresetStore::new(dir.path());

    assert!(validation_message(&store, "empty").contains("at least one phase"));
}

#[test]
fn test_unknown_field_rejected() {
    let dir = tempdir().unwrap();
    write_preset(
        dir.path(),
        "extra",
        r#"{"name": "n", "description": "d", "phases": [
            {"id": "p", "name": "P", "parallel": true}
        ]}"#,
    );
    let store = DirectoryPresetStore::new(dir.path());

    assert!(validation_message(&store, "extra").contains("parallel"));
}
