mod display;
mod engine;

pub use display::{format_clock, DisplayFrame, VibrationCue};
pub use engine::{EngineOutput, PhaseKind, SessionEngine, MAX_REPETITIONS};
