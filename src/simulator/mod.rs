//! Simulation runtime: clock, delay generation and the execution engine.

mod clock;
mod delay;
mod engine;

pub use clock::{Clock, ManualClock, TokioClock};
pub use delay::{DelayGenerator, FixedRandom, RandomSource, SeededRandom, ThreadRandom};
pub use engine::{SimulationResult, WorkflowSimulator, TIMER_TICK_PRESET_NAME};
