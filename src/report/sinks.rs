//! Reporter implementations.

use std::collections::HashSet;
use std::io::Write;
use std::sync::{Mutex, MutexGuard};

use tracing::{info, warn};

use super::{StepEvent, StepReporter, StepStatus};
use crate::error::{ReportError, ReportResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Reports step transitions as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl LogReporter {
    /// Create a new log reporter.
    pub fn new() -> Self {
        Self
    }
}

impl StepReporter for LogReporter {
    fn start_step(&self, step_id: &str, message: &str) -> ReportResult<()> {
        info!(step_id, detail = message, "Step started");
        Ok(())
    }

    fn finish_step(
        &self,
        step_id: &str,
        status: StepStatus,
        message: Option<&str>,
    ) -> ReportResult<()> {
        match status {
            StepStatus::Completed => info!(step_id, detail = message, "Step finished"),
            StepStatus::Aborted => warn!(step_id, detail = message, "Step aborted"),
        }
        Ok(())
    }
}

/// Writes one JSON `StepEvent` per line to a writer.
pub struct JsonLinesReporter {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonLinesReporter {
    /// Wrap any writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Report to standard output.
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    fn emit(&self, event: &StepEvent) -> ReportResult<()> {
        let line = serde_json::to_string(event)?;
        let mut writer = lock(&self.writer);
        writeln!(writer, "{}", line)?;
        // Consumers tail the stream live
        writer.flush()?;
        Ok(())
    }
}

impl StepReporter for JsonLinesReporter {
    fn start_step(&self, step_id: &str, message: &str) -> ReportResult<()> {
        self.emit(&StepEvent::started(step_id, message))
    }

    fn finish_step(
        &self,
        step_id: &str,
        status: StepStatus,
        message: Option<&str>,
    ) -> ReportResult<()> {
        self.emit(&StepEvent::finished(step_id, status, message))
    }
}

impl std::fmt::Debug for JsonLinesReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonLinesReporter").finish_non_exhaustive()
    }
}

/// Keeps every reported event in memory.
///
/// Can be told to reject the start of specific steps, which lets callers
/// exercise sink failures.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<StepEvent>>,
    fail_on_start: Mutex<HashSet<String>>,
}

impl RecordingReporter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any later `start_step` for `step_id`.
    pub fn fail_on_start(&self, step_id: impl Into<String>) {
        lock(&self.fail_on_start).insert(step_id.into());
    }

    /// Snapshot of all recorded events in order.
    pub fn events(&self) -> Vec<StepEvent> {
        lock(&self.events).clone()
    }

    /// Number of recorded events.
    pub fn len(&self) -> usize {
        lock(&self.events).len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        lock(&self.events).is_empty()
    }

    /// Ids of started steps, in start order.
    pub fn started_step_ids(&self) -> Vec<String> {
        lock(&self.events)
            .iter()
            .filter(|e| e.kind == super::StepEventKind::Started)
            .map(|e| e.step_id.clone())
            .collect()
    }

    /// Forget all recorded events.
    pub fn clear(&self) {
        lock(&self.events).clear();
    }
}

impl StepReporter for RecordingReporter {
    fn start_step(&self, step_id: &str, message: &str) -> ReportResult<()> {
        if lock(&self.fail_on_start).contains(step_id) {
            return Err(ReportError::Sink {
                step_id: step_id.to_string(),
                message: "configured to fail".to_string(),
            });
        }
        lock(&self.events).push(StepEvent::started(step_id, message));
        Ok(())
    }

    fn finish_step(
        &self,
        step_id: &str,
        status: StepStatus,
        message: Option<&str>,
    ) -> ReportResult<()> {
        lock(&self.events).push(StepEvent::finished(step_id, status, message));
        Ok(())
    }
}
