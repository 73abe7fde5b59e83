//! Workflow simulation engine.
//!
//! Replays a preset as nested steps (workflow, phase, agent, task) on a
//! `StepReporter`, pausing for a randomized delay between steps. Also hosts
//! the flat timer-tick mode.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::clock::{Clock, TokioClock};
use super::delay::{DelayGenerator, RandomSource, ThreadRandom};
use crate::config::DEFAULT_MAX_TIMER_SECONDS;
use crate::error::{SimResult, SimulationError};
use crate::presets::{AgentConfig, PhaseConfig, PresetStore, WorkflowPreset};
use crate::report::{StepReporter, StepScope};

/// Preset name reported by timer-tick runs.
pub const TIMER_TICK_PRESET_NAME: &str = "timer_tick";

/// Outcome of a completed simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Name of the executed preset, or `timer_tick`.
    pub preset_name: String,
    /// Number of phases run.
    pub phases_completed: usize,
    /// Number of agents run across all phases.
    pub agents_executed: usize,
    /// Step events emitted (each open and each close counts once).
    pub total_events: usize,
    /// Wall-clock duration of the run.
    pub elapsed_seconds: f64,
}

/// Per-run counters.
#[derive(Debug, Default)]
struct RunTally {
    events: usize,
    agents_executed: usize,
}

/// Executes workflow presets and timer-tick runs against a reporter.
///
/// Runs take `&mut self`, so one simulator never executes two runs at once.
pub struct WorkflowSimulator {
    store: Arc<dyn PresetStore>,
    reporter: Arc<dyn StepReporter>,
    clock: Arc<dyn Clock>,
    delays: DelayGenerator,
    max_timer: Duration,
}

impl WorkflowSimulator {
    /// Create a simulator on real time with thread-local randomness.
    pub fn new(store: Arc<dyn PresetStore>, reporter: Arc<dyn StepReporter>) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(TokioClock::new());
        Self {
            store,
            reporter,
            delays: DelayGenerator::new(Box::new(ThreadRandom), Arc::clone(&clock)),
            clock,
            max_timer: Duration::from_secs(DEFAULT_MAX_TIMER_SECONDS as u64),
        }
    }

    /// Use `clock` for timestamps and sleeping.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.delays = self.delays.with_clock(Arc::clone(&clock));
        self.clock = clock;
        self
    }

    /// Use `random` for delay sampling.
    pub fn with_random(mut self, random: Box<dyn RandomSource>) -> Self {
        self.delays = self.delays.with_random(random);
        self
    }

    /// Upper bound accepted for `run_timer_tick` total run time.
    ///
    /// NaN and negative bounds are ignored. Bounds too large for a
    /// `Duration` are clamped to `Duration::MAX`.
    pub fn with_max_timer_seconds(mut self, seconds: f64) -> Self {
        if seconds.is_nan() || seconds < 0.0 {
            warn!(seconds, "Ignoring invalid timer bound");
            return self;
        }
        self.max_timer = Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX);
        self
    }

    /// The store presets are loaded from.
    pub fn store(&self) -> &Arc<dyn PresetStore> {
        &self.store
    }

    /// Load `preset_name` and run it.
    ///
    /// # Errors
    /// Loader failures are returned before any step is opened. Reporter
    /// failures abort the run after every open scope has been closed.
    pub async fn run(&mut self, preset_name: &str) -> SimResult<SimulationResult> {
        let started = self.clock.now();
        let preset = self.store.load(preset_name)?;
        self.execute(&preset, started).await
    }

    /// Run an already loaded preset.
    pub async fn run_preset(&mut self, preset: &WorkflowPreset) -> SimResult<SimulationResult> {
        let started = self.clock.now();
        self.execute(preset, started).await
    }

    async fn execute(
        &mut self,
        preset: &WorkflowPreset,
        started: Duration,
    ) -> SimResult<SimulationResult> {
        let reporter = Arc::clone(&self.reporter);
        let mut tally = RunTally::default();

        let workflow_step_id = format!("workflow:{}", preset.name);
        info!(step_id = %workflow_step_id, description = %preset.description, "Starting workflow");
        let workflow_step = StepScope::open(
            reporter.as_ref(),
            workflow_step_id,
            &format!("Starting workflow: {}", preset.description),
        )?;
        tally.events += 1;

        for phase in &preset.phases {
            self.execute_phase(reporter.as_ref(), phase, &mut tally).await?;
        }

        let elapsed = self.clock.now().saturating_sub(started).as_secs_f64();
        workflow_step.finish(&format!("Workflow completed in {:.1}s", elapsed))?;
        tally.events += 1;

        info!(
            preset = %preset.name,
            phases = preset.phases.len(),
            agents = tally.agents_executed,
            events = tally.events,
            elapsed_seconds = elapsed,
            "Workflow completed"
        );

        Ok(SimulationResult {
            preset_name: preset.name.clone(),
            phases_completed: preset.phases.len(),
            agents_executed: tally.agents_executed,
            total_events: tally.events,
            elapsed_seconds: elapsed,
        })
    }

    async fn execute_phase(
        &mut self,
        reporter: &dyn StepReporter,
        phase: &PhaseConfig,
        tally: &mut RunTally,
    ) -> SimResult<()> {
        let phase_step_id = format!("phase:{}", phase.id);
        info!(step_id = %phase_step_id, name = %phase.name, "Starting phase");
        let phase_step =
            StepScope::open(reporter, phase_step_id, &format!("{} started", phase.name))?;
        tally.events += 1;
        self.delays.pause(phase.delay_range_ms).await;

        for agent in &phase.agents {
            self.execute_agent(reporter, &phase.id, agent, tally).await?;
        }

        self.delays.pause(phase.delay_range_ms).await;
        phase_step.finish(&format!("{} completed", phase.name))?;
        tally.events += 1;
        Ok(())
    }

    async fn execute_agent(
        &mut self,
        reporter: &dyn StepReporter,
        phase_id: &str,
        agent: &AgentConfig,
        tally: &mut RunTally,
    ) -> SimResult<()> {
        let agent_step_id = format!("agent:{}:{}", phase_id, agent.id);
        info!(step_id = %agent_step_id, name = %agent.name, "Starting agent");
        let agent_step = StepScope::open(
            reporter,
            agent_step_id.as_str(),
            &format!("{} started", agent.name),
        )?;
        tally.events += 1;

        for (index, task) in agent.tasks.iter().enumerate() {
            self.delays.pause(agent.delay_range_ms).await;
            let task_step_id = format!("{}:task-{}", agent_step_id, index + 1);
            info!(step_id = %task_step_id, task = %task, "Task");
            StepScope::open(reporter, task_step_id, task)?.close()?;
            tally.events += 2;
        }

        self.delays.pause(agent.delay_range_ms).await;
        agent_step.finish(&format!("{} completed", agent.name))?;
        tally.events += 1;
        tally.agents_executed += 1;
        Ok(())
    }

    /// Emit one `timer:tick:{n}` step per interval until `total_run_time_seconds`
    /// has elapsed.
    ///
    /// The last sleep is shortened so the run never overshoots its end time.
    ///
    /// # Errors
    /// `SimulationError::InvalidArgument` when either duration is not finite,
    /// the total is negative or above the configured maximum, or the interval
    /// is not positive.
    pub async fn run_timer_tick(
        &mut self,
        total_run_time_seconds: f64,
        tick_interval_seconds: f64,
    ) -> SimResult<SimulationResult> {
        let (total, interval) =
            self.check_timer_arguments(total_run_time_seconds, tick_interval_seconds)?;
        let reporter = Arc::clone(&self.reporter);
        let mut tally = RunTally::default();

        let start = self.clock.now();
        let end = start
            .checked_add(total)
            .ok_or_else(|| SimulationError::InvalidArgument {
                message: format!("total run time {}s overflows the clock", total_run_time_seconds),
            })?;
        let mut tick_index: u64 = 0;

        while self.clock.now() < end {
            tick_index += 1;
            info!(tick = tick_index, "Tick");
            StepScope::open(
                reporter.as_ref(),
                format!("timer:tick:{}", tick_index),
                &format!("Tick {}", tick_index),
            )?
            .close()?;
            tally.events += 2;

            let remaining = end.saturating_sub(self.clock.now());
            if remaining.is_zero() {
                break;
            }
            self.clock.sleep(interval.min(remaining)).await;
        }

        let elapsed = self.clock.now().saturating_sub(start).as_secs_f64();
        info!(ticks = tick_index, elapsed_seconds = elapsed, "Timer run completed");

        Ok(SimulationResult {
            preset_name: TIMER_TICK_PRESET_NAME.to_string(),
            phases_completed: 0,
            agents_executed: 0,
            total_events: tally.events,
            elapsed_seconds: elapsed,
        })
    }

    fn check_timer_arguments(&self, total: f64, interval: f64) -> SimResult<(Duration, Duration)> {
        let invalid = |message: String| SimulationError::InvalidArgument { message };

        if !total.is_finite() || total < 0.0 {
            return Err(invalid(format!(
                "total run time must be a non-negative number of seconds, got {}",
                total
            )));
        }
        let total_duration = Duration::try_from_secs_f64(total).map_err(|_| {
            invalid(format!("total run time {}s is not a representable duration", total))
        })?;
        if total_duration > self.max_timer {
            return Err(invalid(format!(
                "total run time {}s exceeds the maximum of {}s",
                total,
                self.max_timer.as_secs_f64()
            )));
        }
        if !interval.is_finite() || interval <= 0.0 {
            return Err(invalid(format!(
                "tick interval must be a positive number of seconds, got {}",
                interval
            )));
        }

        let interval_duration = Duration::try_from_secs_f64(interval).map_err(|_| {
            invalid(format!("tick interval {}s is not a representable duration", interval))
        })?;
        if interval_duration.is_zero() {
            return Err(invalid(format!("tick interval {}s is too small", interval)));
        }
        Ok((total_duration, interval_duration))
    }
}

impl std::fmt::Debug for WorkflowSimulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowSimulator")
            .field("max_timer", &self.max_timer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{DelayRange, MemoryPresetStore};
    use crate::report::{RecordingReporter, StepEventKind, StepStatus};
    use crate::simulator::{FixedRandom, ManualClock};

    fn instant_preset() -> WorkflowPreset {
        WorkflowPreset {
            name: "instant".to_string(),
            description: "Zero-delay workflow".to_string(),
            phases: vec![PhaseConfig::new("p1", "Phase One")
                .with_delay(DelayRange::ZERO)
                .with_agent(
                    AgentConfig::new("a1", "Agent One")
                        .with_delay(DelayRange::ZERO)
                        .with_task("first")
                        .with_task("second"),
                )],
        }
    }

    fn simulator(
        store: MemoryPresetStore,
    ) -> (WorkflowSimulator, Arc<RecordingReporter>, Arc<ManualClock>) {
        let reporter = Arc::new(RecordingReporter::new());
        let clock = Arc::new(ManualClock::new());
        let sim = WorkflowSimulator::new(Arc::new(store), reporter.clone())
            .with_clock(clock.clone())
            .with_random(Box::new(FixedRandom::Minimum));
        (sim, reporter, clock)
    }

    #[tokio::test]
    async fn test_single_agent_event_count() {
        let store = MemoryPresetStore::new();
        store.insert(instant_preset());
        let (mut sim, reporter, _) = simulator(store);

        let result = sim.run("instant").await.unwrap();
        assert_eq!(result.preset_name, "instant");
        assert_eq!(result.phases_completed, 1);
        assert_eq!(result.agents_executed, 1);
        assert_eq!(result.total_events, 10);
        assert_eq!(reporter.len(), 10);
        assert_eq!(result.elapsed_seconds, 0.0);
    }

    #[tokio::test]
    async fn test_step_ids_and_messages() {
        let (mut sim, reporter, _) = simulator(MemoryPresetStore::new());
        sim.run_preset(&instant_preset()).await.unwrap();

        assert_eq!(
            reporter.started_step_ids(),
            vec![
                "workflow:instant",
                "phase:p1",
                "agent:p1:a1",
                "agent:p1:a1:task-1",
                "agent:p1:a1:task-2",
            ]
        );

        let events = reporter.events();
        assert_eq!(
            events[0].message.as_deref(),
            Some("Starting workflow: Zero-delay workflow")
        );
        assert_eq!(events[1].message.as_deref(), Some("Phase One started"));
        assert_eq!(events[2].message.as_deref(), Some("Agent One started"));
        assert_eq!(events[3].message.as_deref(), Some("first"));
        assert_eq!(events[4].message, None);
        assert_eq!(events[7].message.as_deref(), Some("Agent One completed"));
        assert_eq!(events[8].message.as_deref(), Some("Phase One completed"));
        assert_eq!(
            events[9].message.as_deref(),
            Some("Workflow completed in 0.0s")
        );
    }

    #[tokio::test]
    async fn test_counters_reset_between_runs() {
        let store = MemoryPresetStore::new();
        store.insert(instant_preset());
        let (mut sim, _, _) = simulator(store);

        let first = sim.run("instant").await.unwrap();
        let second = sim.run("instant").await.unwrap();
        assert_eq!(first.total_events, second.total_events);
        assert_eq!(first.agents_executed, second.agents_executed);
    }

    #[tokio::test]
    async fn test_unknown_preset_opens_no_steps() {
        let (mut sim, reporter, _) = simulator(MemoryPresetStore::with_builtins());
        let err = sim.run("missing").await.unwrap_err();
        assert!(matches!(err, SimulationError::Preset(_)));
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn test_reporter_failure_closes_outer_scopes() {
        let (mut sim, reporter, _) = simulator(MemoryPresetStore::new());
        reporter.fail_on_start("agent:p1:a1:task-2");

        let err = sim.run_preset(&instant_preset()).await.unwrap_err();
        assert!(matches!(err, SimulationError::Report(_)));

        let closed: Vec<(String, Option<StepStatus>)> = reporter
            .events()
            .into_iter()
            .filter(|e| e.kind == StepEventKind::Finished)
            .map(|e| (e.step_id, e.status))
            .collect();
        assert_eq!(
            closed,
            vec![
                ("agent:p1:a1:task-1".to_string(), Some(StepStatus::Completed)),
                ("agent:p1:a1".to_string(), Some(StepStatus::Aborted)),
                ("phase:p1".to_string(), Some(StepStatus::Aborted)),
                ("workflow:instant".to_string(), Some(StepStatus::Aborted)),
            ]
        );
    }

    #[tokio::test]
    async fn test_timer_tick_zero_duration() {
        let (mut sim, reporter, _) = simulator(MemoryPresetStore::new());
        let result = sim.run_timer_tick(0.0, 1.0).await.unwrap();
        assert_eq!(result.total_events, 0);
        assert_eq!(result.preset_name, TIMER_TICK_PRESET_NAME);
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn test_timer_tick_five_by_two() {
        let (mut sim, reporter, clock) = simulator(MemoryPresetStore::new());
        let result = sim.run_timer_tick(5.0, 2.0).await.unwrap();

        assert_eq!(result.total_events, 6);
        assert_eq!(result.phases_completed, 0);
        assert_eq!(result.agents_executed, 0);
        assert_eq!(
            reporter.started_step_ids(),
            vec!["timer:tick:1", "timer:tick:2", "timer:tick:3"]
        );
        assert_eq!(clock.now(), Duration::from_secs(5));
        assert_eq!(result.elapsed_seconds, 5.0);
    }

    #[tokio::test]
    async fn test_timer_tick_rejects_bad_arguments() {
        let (mut sim, reporter, _) = simulator(MemoryPresetStore::new());
        let sim_max = 10.0;
        sim = sim.with_max_timer_seconds(sim_max);

        for (total, interval) in [
            (-1.0, 1.0),
            (f64::NAN, 1.0),
            (11.0, 1.0),
            (5.0, 0.0),
            (5.0, -2.0),
            (5.0, f64::INFINITY),
        ] {
            let err = sim.run_timer_tick(total, interval).await.unwrap_err();
            assert!(
                matches!(err, SimulationError::InvalidArgument { .. }),
                "({}, {}) should be rejected",
                total,
                interval
            );
        }
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn test_timer_tick_unrepresentable_durations_rejected() {
        let (mut sim, reporter, _) = simulator(MemoryPresetStore::new());
        sim = sim.with_max_timer_seconds(1e30);

        for (total, interval) in [(1e25, 1e24), (5.0, 1e25)] {
            let err = sim.run_timer_tick(total, interval).await.unwrap_err();
            assert!(
                matches!(err, SimulationError::InvalidArgument { .. }),
                "({}, {}) should be rejected",
                total,
                interval
            );
        }
        assert!(reporter.is_empty());
    }

    #[tokio::test]
    async fn test_nan_timer_bound_keeps_previous_bound() {
        let (mut sim, reporter, _) = simulator(MemoryPresetStore::new());
        sim = sim
            .with_max_timer_seconds(10.0)
            .with_max_timer_seconds(f64::NAN)
            .with_max_timer_seconds(-1.0);

        let err = sim.run_timer_tick(10_000.0, 5_000.0).await.unwrap_err();
        assert!(matches!(err, SimulationError::InvalidArgument { .. }));
        assert!(reporter.is_empty());

        let result = sim.run_timer_tick(10.0, 5.0).await.unwrap();
        assert_eq!(result.total_events, 4);
    }
}
