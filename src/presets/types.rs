//! Data types for workflow presets.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Inclusive `[min, max]` delay window in milliseconds.
///
/// Serialized as a two-element JSON array. Deserialization rejects any other
/// length and inverted bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u64>", into = "[u64; 2]")]
pub struct DelayRange {
    min_ms: u64,
    max_ms: u64,
}

impl DelayRange {
    /// Default window between consecutive agent tasks.
    pub const AGENT_DEFAULT: DelayRange = DelayRange {
        min_ms: 1000,
        max_ms: 3000,
    };

    /// Default window for phase transitions.
    pub const PHASE_DEFAULT: DelayRange = DelayRange {
        min_ms: 500,
        max_ms: 2000,
    };

    /// Zero-length window, handy for instant runs.
    pub const ZERO: DelayRange = DelayRange { min_ms: 0, max_ms: 0 };

    /// Create a range, rejecting `min_ms > max_ms`.
    pub fn new(min_ms: u64, max_ms: u64) -> Result<Self, String> {
        if min_ms > max_ms {
            return Err(format!(
                "delay_range_ms minimum {} exceeds maximum {}",
                min_ms, max_ms
            ));
        }
        Ok(Self { min_ms, max_ms })
    }

    /// Fixed delay of exactly `ms` milliseconds.
    pub fn fixed(ms: u64) -> Self {
        Self {
            min_ms: ms,
            max_ms: ms,
        }
    }

    /// Lower bound in milliseconds.
    pub fn min_ms(&self) -> u64 {
        self.min_ms
    }

    /// Upper bound in milliseconds.
    pub fn max_ms(&self) -> u64 {
        self.max_ms
    }

    /// Shortest duration this range can produce.
    pub fn min_duration(&self) -> Duration {
        Duration::from_millis(self.min_ms)
    }

    /// Longest duration this range can produce.
    pub fn max_duration(&self) -> Duration {
        Duration::from_millis(self.max_ms)
    }

    /// Whether `delay` falls inside the window.
    pub fn contains(&self, delay: Duration) -> bool {
        delay >= self.min_duration() && delay <= self.max_duration()
    }
}

impl TryFrom<Vec<u64>> for DelayRange {
    type Error = String;

    fn try_from(values: Vec<u64>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [min, max] => DelayRange::new(*min, *max),
            other => Err(format!(
                "delay_range_ms must have exactly 2 entries, got {}",
                other.len()
            )),
        }
    }
}

impl From<DelayRange> for [u64; 2] {
    fn from(range: DelayRange) -> Self {
        [range.min_ms, range.max_ms]
    }
}

impl fmt::Display for DelayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]ms", self.min_ms, self.max_ms)
    }
}

fn default_agent_delay() -> DelayRange {
    DelayRange::AGENT_DEFAULT
}

fn default_phase_delay() -> DelayRange {
    DelayRange::PHASE_DEFAULT
}

/// A simulated agent inside a phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Identifier, unique within its phase.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Status messages emitted in order, one step per entry.
    pub tasks: Vec<String>,
    /// Delay window between task updates.
    #[serde(default = "default_agent_delay")]
    pub delay_range_ms: DelayRange,
}

/// A workflow phase grouping agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseConfig {
    /// Identifier, unique within its workflow.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Delay window for phase transitions.
    #[serde(default = "default_phase_delay")]
    pub delay_range_ms: DelayRange,
    /// Agents executed in declaration order.
    #[serde(default)]
    pub agents: Vec<AgentConfig>,
}

/// Complete workflow preset definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowPreset {
    /// Preset name, also used in the workflow step id.
    pub name: String,
    /// What the workflow simulates.
    pub description: String,
    /// Ordered phases; declaration order is execution order.
    pub phases: Vec<PhaseConfig>,
}

/// Brief preset summary for listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresetSummary {
    /// Preset name.
    pub name: String,
    /// Preset description.
    pub description: String,
    /// Number of phases.
    pub phase_count: usize,
    /// Number of agents across all phases.
    pub agent_count: usize,
    /// Number of tasks across all agents.
    pub task_count: usize,
}

impl WorkflowPreset {
    /// Check the structural rules serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Preset name is required".to_string());
        }
        if self.phases.is_empty() {
            return Err("Preset must have at least one phase".to_string());
        }
        Ok(())
    }

    /// Total number of agents across all phases.
    pub fn agent_count(&self) -> usize {
        self.phases.iter().map(|p| p.agents.len()).sum()
    }

    /// Total number of tasks across all agents.
    pub fn task_count(&self) -> usize {
        self.phases
            .iter()
            .flat_map(|p| p.agents.iter())
            .map(|a| a.tasks.len())
            .sum()
    }

    /// Number of step events a full run of this preset emits.
    ///
    /// Workflow open/close, plus open/close for every phase and agent, plus
    /// an open/close pair per task.
    pub fn expected_events(&self) -> usize {
        2 + 2 * self.phases.len() + 2 * self.agent_count() + 2 * self.task_count()
    }

    /// Lower bound on the wall-clock time of a full run.
    ///
    /// Each phase pauses twice and each agent pauses once per task plus once
    /// before finishing, every pause taking at least the range minimum.
    pub fn minimum_runtime(&self) -> Duration {
        self.phases
            .iter()
            .map(|phase| {
                let agents: Duration = phase
                    .agents
                    .iter()
                    .map(|a| a.delay_range_ms.min_duration() * (a.tasks.len() as u32 + 1))
                    .sum();
                phase.delay_range_ms.min_duration() * 2 + agents
            })
            .sum()
    }

    /// Create a summary from the full preset.
    pub fn to_summary(&self) -> PresetSummary {
        PresetSummary {
            name: self.name.clone(),
            description: self.description.clone(),
            phase_count: self.phases.len(),
            agent_count: self.agent_count(),
            task_count: self.task_count(),
        }
    }
}

impl PhaseConfig {
    /// Create a phase with the default delay window and no agents.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            delay_range_ms: DelayRange::PHASE_DEFAULT,
            agents: Vec::new(),
        }
    }

    /// Set the delay window.
    pub fn with_delay(mut self, range: DelayRange) -> Self {
        self.delay_range_ms = range;
        self
    }

    /// Append an agent.
    pub fn with_agent(mut self, agent: AgentConfig) -> Self {
        self.agents.push(agent);
        self
    }
}

impl AgentConfig {
    /// Create an agent with the default delay window and no tasks.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            tasks: Vec::new(),
            delay_range_ms: DelayRange::AGENT_DEFAULT,
        }
    }

    /// Set the delay window.
    pub fn with_delay(mut self, range: DelayRange) -> Self {
        self.delay_range_ms = range;
        self
    }

    /// Append a task status message.
    pub fn with_task(mut self, task: impl Into<String>) -> Self {
        self.tasks.push(task.into());
        self
    }
}
