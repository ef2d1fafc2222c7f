use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::PhaseKind;

/// Every phase transition produces an Event.
/// The CLI prints them as JSON lines; scripted replays assert on them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// User confirmed readiness; the hold measurement is live.
    MeasurementStarted { at: DateTime<Utc> },
    /// Hold ended; work/rest durations derived from the measured maximum.
    MeasurementCompleted {
        max_hold_secs: i64,
        work_secs: i64,
        rest_secs: i64,
        at: DateTime<Utc>,
    },
    /// A rest or work sub-phase ended, by timeout or by an early skip.
    IntervalAdvanced {
        phase: i32,
        repetitions_left: i32,
        /// True when a work sub-phase was cut short by the button.
        incomplete: bool,
        elapsed_secs: i64,
        at: DateTime<Utc>,
    },
    /// The last repetition finished; the session is terminal.
    SessionCompleted {
        max_hold_secs: i64,
        /// `min(min_work / 0.8, max_hold)` -- the summary's second line.
        min_adjusted_secs: i64,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: i32,
        kind: PhaseKind,
        max_hold_secs: i64,
        work_secs: i64,
        rest_secs: i64,
        min_work_secs: i64,
        top_label: String,
        repetition_label: String,
        time_label: String,
        at: DateTime<Utc>,
    },
}
