//! Step reporting: the sink contract the simulator drives.
//!
//! A step is opened with a message and later finished. `StepScope` ties the
//! finish to the guard's lifetime, so a scope that is left early (an error
//! propagated with `?`, a cancelled future) is still closed, in reverse
//! order of opening, with `StepStatus::Aborted`.

mod sinks;

pub use sinks::{JsonLinesReporter, LogReporter, RecordingReporter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ReportResult;

/// How a step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// Finished normally.
    Completed,
    /// Closed because its scope was left without finishing.
    Aborted,
}

impl StepStatus {
    /// Convert to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Completed => "completed",
            StepStatus::Aborted => "aborted",
        }
    }
}

impl std::fmt::Display for StepStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Open or close marker of a step event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepEventKind {
    /// The step was opened.
    Started,
    /// The step was closed.
    Finished,
}

/// A single reported step transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    /// Hierarchical step identifier (e.g. `agent:plan:writer:task-2`).
    pub step_id: String,
    /// Whether the step opened or closed.
    pub kind: StepEventKind,
    /// Outcome, present on `Finished` events only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<StepStatus>,
    /// Message attached to the transition.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// When the transition was reported.
    pub timestamp: DateTime<Utc>,
}

impl StepEvent {
    /// Event for a step being opened.
    pub fn started(step_id: &str, message: &str) -> Self {
        Self {
            step_id: step_id.to_string(),
            kind: StepEventKind::Started,
            status: None,
            message: Some(message.to_string()),
            timestamp: Utc::now(),
        }
    }

    /// Event for a step being closed.
    pub fn finished(step_id: &str, status: StepStatus, message: Option<&str>) -> Self {
        Self {
            step_id: step_id.to_string(),
            kind: StepEventKind::Finished,
            status: Some(status),
            message: message.map(String::from),
            timestamp: Utc::now(),
        }
    }
}

/// External sink that records step transitions.
///
/// Callers open and close steps in strict nesting order; implementations may
/// rely on that.
pub trait StepReporter: Send + Sync {
    /// Record that `step_id` started.
    fn start_step(&self, step_id: &str, message: &str) -> ReportResult<()>;

    /// Record that `step_id` finished.
    fn finish_step(
        &self,
        step_id: &str,
        status: StepStatus,
        message: Option<&str>,
    ) -> ReportResult<()>;
}

/// Guard for an open step.
///
/// Finish it explicitly with [`StepScope::finish`] or [`StepScope::close`];
/// dropping an unfinished guard closes the step as `Aborted`.
#[must_use = "dropping a StepScope immediately aborts the step"]
pub struct StepScope<'a> {
    reporter: &'a dyn StepReporter,
    step_id: String,
    open: bool,
}

impl<'a> StepScope<'a> {
    /// Open `step_id` on `reporter`.
    ///
    /// # Errors
    /// Propagates the sink error; no scope exists in that case.
    pub fn open(
        reporter: &'a dyn StepReporter,
        step_id: impl Into<String>,
        message: &str,
    ) -> ReportResult<Self> {
        let step_id = step_id.into();
        reporter.start_step(&step_id, message)?;
        Ok(Self {
            reporter,
            step_id,
            open: true,
        })
    }

    /// Identifier of the open step.
    pub fn step_id(&self) -> &str {
        &self.step_id
    }

    /// Close the step as completed with a final message.
    pub fn finish(mut self, message: &str) -> ReportResult<()> {
        self.open = false;
        self.reporter
            .finish_step(&self.step_id, StepStatus::Completed, Some(message))
    }

    /// Close the step as completed without a message.
    pub fn close(mut self) -> ReportResult<()> {
        self.open = false;
        self.reporter
            .finish_step(&self.step_id, StepStatus::Completed, None)
    }
}

impl Drop for StepScope<'_> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(e) = self
            .reporter
            .finish_step(&self.step_id, StepStatus::Aborted, None)
        {
            warn!(step_id = %self.step_id, error = %e, "Failed to close aborted step");
        }
    }
}

impl std::fmt::Debug for StepScope<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepScope")
            .field("step_id", &self.step_id)
            .field("open", &self.open)
            .finish()
    }
}
