//! # Holdset Core Library
//!
//! Core logic for Holdset, an interval-exercise timer built around a measured
//! maximum hold: the user holds as long as they can, work and rest durations
//! are derived from that measurement, and the session walks through a fixed
//! number of work/rest repetitions while tracking the shortest interrupted
//! work interval.
//!
//! ## Architecture
//!
//! - **Session Engine**: a wall-clock state machine that requires the caller
//!   to deliver a 1-second tick and confirm-button events; every call returns
//!   the current display frame plus a vibration cue
//! - **Events**: each phase transition produces a serializable event for
//!   logging and scripted replay
//! - **Config**: TOML-based presentation preferences
//!
//! The engine performs no rendering, no persistence, and no I/O of its own;
//! a presentation adapter (the CLI crate) owns the event loop.

pub mod config;
pub mod error;
pub mod events;
pub mod timer;

pub use config::Config;
pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use timer::{
    DisplayFrame, EngineOutput, PhaseKind, SessionEngine, VibrationCue, MAX_REPETITIONS,
};
