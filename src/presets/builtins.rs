//! Built-in workflow presets for demos without a preset directory.

use super::types::{AgentConfig, DelayRange, PhaseConfig, WorkflowPreset};

/// Names of all built-in presets, sorted.
pub const BUILTIN_PRESET_NAMES: [&str; 2] = ["incident_response", "research_pipeline"];

/// All built-in presets, in name order.
pub fn builtin_presets() -> Vec<WorkflowPreset> {
    vec![incident_response_preset(), research_pipeline_preset()]
}

/// Literature research workflow.
///
/// Phases:
/// 1. Discovery - search and triage agents gather sources
/// 2. Analysis - a reader and a critic work through the sources
/// 3. Synthesis - a writer assembles the report
pub fn research_pipeline_preset() -> WorkflowPreset {
    WorkflowPreset {
        name: "research_pipeline".to_string(),
        description: "Multi-agent literature research with discovery, analysis and synthesis"
            .to_string(),
        phases: vec![
            PhaseConfig::new("discovery", "Source Discovery")
                .with_agent(
                    AgentConfig::new("searcher", "Search Agent")
                        .with_task("Expanding query terms")
                        .with_task("Querying academic indexes")
                        .with_task("Collected 42 candidate sources"),
                )
                .with_agent(
                    AgentConfig::new("triage", "Triage Agent")
                        .with_task("Scoring source relevance")
                        .with_task("Kept 12 high-relevance sources"),
                ),
            PhaseConfig::new("analysis", "Deep Analysis")
                .with_delay(DelayRange::fixed(1000))
                .with_agent(
                    AgentConfig::new("reader", "Reader Agent")
                        .with_task("Extracting key claims")
                        .with_task("Cross-referencing citations"),
                )
                .with_agent(
                    AgentConfig::new("critic", "Critic Agent")
                        .with_task("Checking methodology")
                        .with_task("Flagging 3 weak claims"),
                ),
            PhaseConfig::new("synthesis", "Report Synthesis").with_agent(
                AgentConfig::new("writer", "Writer Agent")
                    .with_delay(DelayRange::PHASE_DEFAULT)
                    .with_task("Outlining report")
                    .with_task("Drafting sections")
                    .with_task("Report ready"),
            ),
        ],
    }
}

/// Production incident response workflow.
///
/// Phases:
/// 1. Detection - the monitor raises the alert
/// 2. Mitigation - responder and communicator work in sequence
pub fn incident_response_preset() -> WorkflowPreset {
    WorkflowPreset {
        name: "incident_response".to_string(),
        description: "On-call incident detection and mitigation".to_string(),
        phases: vec![
            PhaseConfig::new("detect", "Detection").with_agent(
                AgentConfig::new("monitor", "Monitoring Agent")
                    .with_task("Error rate above threshold")
                    .with_task("Paging on-call"),
            ),
            PhaseConfig::new("mitigate", "Mitigation")
                .with_agent(
                    AgentConfig::new("responder", "Responder Agent")
                        .with_task("Identifying faulty deploy")
                        .with_task("Rolling back release")
                        .with_task("Error rate recovered"),
                )
                .with_agent(
                    AgentConfig::new("comms", "Communications Agent")
                        .with_task("Posting status page update"),
                ),
        ],
    }
}
