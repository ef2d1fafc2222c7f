//! Interval session engine.
//!
//! A wall-clock state machine with no internal threads -- the caller delivers
//! a 1-second tick and confirm-button presses. Every call returns the current
//! [`DisplayFrame`], a [`VibrationCue`] and, when a phase transition happened,
//! an [`Event`].
//!
//! ## Phase progression
//!
//! ```text
//! -2 Idle -> -1 Measuring -> 0 Rest -> 1 Work -> ... -> 9 Work -> 10 Summary
//! ```
//!
//! Even repeating phases are rest, odd ones are work. `phase` only ever
//! increases within a session; the summary is terminal and every later event
//! is a no-op.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::display::{format_clock, DisplayFrame, VibrationCue};
use crate::events::Event;

/// Total work/rest repetitions per session.
pub const MAX_REPETITIONS: i32 = 5;

/// Work interval as a fraction of the measured maximum hold.
const WORK_RATIO: f64 = 0.8;
/// Rest interval as a fraction of the measured maximum hold.
const REST_RATIO: f64 = 0.5;

/// Which kind of phase the numeric `phase` currently denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseKind {
    Idle,
    Measuring,
    Rest,
    Work,
    Summary,
}

/// What one engine call hands back to the presentation layer.
#[derive(Debug, Clone)]
pub struct EngineOutput {
    pub frame: DisplayFrame,
    pub cue: VibrationCue,
    pub event: Option<Event>,
}

/// The interval session state machine.
///
/// Durations are whole seconds; derived durations truncate toward zero.
#[derive(Debug, Clone)]
pub struct SessionEngine {
    phase: i32,
    /// Whether the current phase has latched its start instant.
    phase_running: bool,
    /// Latched on the phase's first tick, not at the transition itself.
    phase_start: Option<DateTime<Utc>>,
    max_hold_secs: i64,
    work_secs: i64,
    rest_secs: i64,
    /// Shortest completed-or-interrupted work interval so far.
    min_work_secs: i64,
    top_label: String,
    repetition_label: String,
    time_label: String,
}

impl SessionEngine {
    pub fn new() -> Self {
        Self {
            phase: -2,
            phase_running: false,
            phase_start: None,
            max_hold_secs: 0,
            work_secs: 0,
            rest_secs: 0,
            min_work_secs: 0,
            top_label: "Get ready".into(),
            repetition_label: String::new(),
            time_label: "0:00".into(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> i32 {
        self.phase
    }

    pub fn kind(&self) -> PhaseKind {
        match self.phase {
            -2 => PhaseKind::Idle,
            -1 => PhaseKind::Measuring,
            p if p >= MAX_REPETITIONS * 2 => PhaseKind::Summary,
            p if p % 2 == 0 => PhaseKind::Rest,
            _ => PhaseKind::Work,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.phase >= MAX_REPETITIONS * 2
    }

    pub fn max_hold_secs(&self) -> i64 {
        self.max_hold_secs
    }

    pub fn work_secs(&self) -> i64 {
        self.work_secs
    }

    pub fn rest_secs(&self) -> i64 {
        self.rest_secs
    }

    pub fn min_work_secs(&self) -> i64 {
        self.min_work_secs
    }

    /// Seconds since the current phase latched its start, 0 before the first
    /// tick of the phase.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        self.phase_start
            .map(|start| (now - start).num_seconds())
            .unwrap_or(0)
    }

    /// Freshly constructed copy of the current display text.
    pub fn frame(&self) -> DisplayFrame {
        DisplayFrame {
            top_label: self.top_label.clone(),
            repetition_label: self.repetition_label.clone(),
            time_label: self.time_label.clone(),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            kind: self.kind(),
            max_hold_secs: self.max_hold_secs,
            work_secs: self.work_secs,
            rest_secs: self.rest_secs,
            min_work_secs: self.min_work_secs,
            top_label: self.top_label.clone(),
            repetition_label: self.repetition_label.clone(),
            time_label: self.time_label.clone(),
            at: Utc::now(),
        }
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Deliver the periodic 1-second tick.
    ///
    /// Idle and summary phases ignore ticks; measuring updates the live
    /// elapsed display; repeating phases count down and auto-advance on the
    /// tick where the allotted duration is used up. The remaining-time label
    /// is the raw `allotted - elapsed` and is not clamped, so a late tick can
    /// render a negative remainder once before the advance fires.
    pub fn on_tick(&mut self, now: DateTime<Utc>) -> EngineOutput {
        match self.kind() {
            PhaseKind::Idle | PhaseKind::Summary => self.output(VibrationCue::None, None),
            PhaseKind::Measuring => {
                self.tick_measuring(now);
                self.output(VibrationCue::None, None)
            }
            PhaseKind::Rest | PhaseKind::Work => self.tick_interval(now),
        }
    }

    /// Deliver a confirm-button press.
    ///
    /// Idle arms the measurement, measuring ends it and derives the interval
    /// durations, a work sub-phase is skipped early and recorded as
    /// incomplete. Rest sub-phases and the summary ignore the button.
    pub fn on_confirm(&mut self, now: DateTime<Utc>) -> EngineOutput {
        match self.kind() {
            PhaseKind::Idle => {
                self.phase = -1;
                self.output(
                    VibrationCue::None,
                    Some(Event::MeasurementStarted { at: now }),
                )
            }
            PhaseKind::Measuring => self.compute_times(now),
            PhaseKind::Work => {
                let elapsed = self.elapsed_secs(now);
                self.next_repetition(now, elapsed, true)
            }
            PhaseKind::Rest | PhaseKind::Summary => self.output(VibrationCue::None, None),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn tick_measuring(&mut self, now: DateTime<Utc>) {
        if !self.phase_running {
            self.phase_running = true;
            self.phase_start = Some(now);
            self.top_label = "Hold as long as you can".into();
        }
        self.time_label = format_clock(self.elapsed_secs(now));
    }

    fn tick_interval(&mut self, now: DateTime<Utc>) -> EngineOutput {
        let is_rest = self.phase % 2 == 0;
        if !self.phase_running {
            self.phase_running = true;
            self.phase_start = Some(now);
            self.top_label = if is_rest { "Rest" } else { "Work" }.into();
            self.repetition_label = format!("{}", MAX_REPETITIONS - self.phase / 2);
        }

        let elapsed = self.elapsed_secs(now);
        let allotted = if is_rest { self.rest_secs } else { self.work_secs };
        let remaining = allotted - elapsed;
        self.time_label = format_clock(remaining);

        if remaining <= 0 {
            return self.next_repetition(now, elapsed, false);
        }
        self.output(VibrationCue::None, None)
    }

    /// End the measurement and derive the interval durations.
    fn compute_times(&mut self, now: DateTime<Utc>) -> EngineOutput {
        self.phase_running = false;
        self.max_hold_secs = self.elapsed_secs(now);
        self.rest_secs = scale(self.max_hold_secs, REST_RATIO);
        self.work_secs = scale(self.max_hold_secs, WORK_RATIO).min(self.max_hold_secs);
        self.min_work_secs = self.work_secs;
        self.phase = 0;
        self.output(
            VibrationCue::None,
            Some(Event::MeasurementCompleted {
                max_hold_secs: self.max_hold_secs,
                work_secs: self.work_secs,
                rest_secs: self.rest_secs,
                at: now,
            }),
        )
    }

    /// Advance one sub-phase.
    ///
    /// The summary is entered (and rendered) before an incomplete interval
    /// can lower `min_work_secs`, so a skip on the final work sub-phase does
    /// not change the summary already on screen.
    fn next_repetition(&mut self, now: DateTime<Utc>, elapsed: i64, incomplete: bool) -> EngineOutput {
        self.phase_running = false;
        self.phase += 1;

        let (cue, event) = if self.phase >= MAX_REPETITIONS * 2 {
            let min_adjusted = self.enter_summary();
            (
                VibrationCue::DoublePulse,
                Event::SessionCompleted {
                    max_hold_secs: self.max_hold_secs,
                    min_adjusted_secs: min_adjusted,
                    at: now,
                },
            )
        } else {
            (
                VibrationCue::ShortPulse,
                Event::IntervalAdvanced {
                    phase: self.phase,
                    repetitions_left: MAX_REPETITIONS - self.phase / 2,
                    incomplete,
                    elapsed_secs: elapsed,
                    at: now,
                },
            )
        };

        if incomplete && elapsed < self.min_work_secs {
            self.min_work_secs = elapsed;
        }

        self.output(cue, Some(event))
    }

    /// Set the terminal summary display. Returns the adjusted minimum.
    fn enter_summary(&mut self) -> i64 {
        self.top_label = "Max time".into();
        self.time_label = format_clock(self.max_hold_secs);
        let min_adjusted = ((self.min_work_secs as f64 / WORK_RATIO) as i64).min(self.max_hold_secs);
        self.repetition_label = format_clock(min_adjusted);
        min_adjusted
    }

    fn output(&self, cue: VibrationCue, event: Option<Event>) -> EngineOutput {
        EngineOutput {
            frame: self.frame(),
            cue,
            event,
        }
    }
}

impl Default for SessionEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn scale(secs: i64, ratio: f64) -> i64 {
    (secs as f64 * ratio) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    /// Arm the engine and complete a hold of `hold_secs`.
    fn measured(hold_secs: i64) -> (SessionEngine, DateTime<Utc>) {
        let mut engine = SessionEngine::new();
        let mut now = t0();
        engine.on_confirm(now);
        engine.on_tick(now); // latches phase_start
        now += Duration::seconds(hold_secs);
        engine.on_tick(now);
        engine.on_confirm(now);
        (engine, now)
    }

    #[test]
    fn idle_ticks_keep_initial_frame() {
        let mut engine = SessionEngine::new();
        let out = engine.on_tick(t0());
        assert_eq!(out.frame.top_label, "Get ready");
        assert_eq!(out.frame.time_label, "0:00");
        assert_eq!(out.cue, VibrationCue::None);
        assert!(out.event.is_none());
        assert_eq!(engine.phase(), -2);
    }

    #[test]
    fn measuring_shows_live_elapsed() {
        let mut engine = SessionEngine::new();
        let mut now = t0();
        let out = engine.on_confirm(now);
        assert!(matches!(out.event, Some(Event::MeasurementStarted { .. })));
        assert_eq!(engine.kind(), PhaseKind::Measuring);

        let out = engine.on_tick(now);
        assert_eq!(out.frame.top_label, "Hold as long as you can");
        assert_eq!(out.frame.time_label, "0:00");

        now += Duration::seconds(125);
        let out = engine.on_tick(now);
        assert_eq!(out.frame.time_label, "2:05");
    }

    #[test]
    fn compute_times_derives_work_and_rest() {
        let (engine, _) = measured(30);
        assert_eq!(engine.max_hold_secs(), 30);
        assert_eq!(engine.work_secs(), 24);
        assert_eq!(engine.rest_secs(), 15);
        assert_eq!(engine.min_work_secs(), 24);
        assert_eq!(engine.phase(), 0);
        assert_eq!(engine.kind(), PhaseKind::Rest);
        assert!(engine.work_secs() <= engine.max_hold_secs());
    }

    #[test]
    fn compute_times_emits_event_without_cue() {
        let mut engine = SessionEngine::new();
        let mut now = t0();
        engine.on_confirm(now);
        engine.on_tick(now);
        now += Duration::seconds(30);
        let out = engine.on_confirm(now);
        assert_eq!(out.cue, VibrationCue::None);
        match out.event {
            Some(Event::MeasurementCompleted {
                max_hold_secs,
                work_secs,
                rest_secs,
                ..
            }) => {
                assert_eq!(max_hold_secs, 30);
                assert_eq!(work_secs, 24);
                assert_eq!(rest_secs, 15);
            }
            other => panic!("expected MeasurementCompleted, got {other:?}"),
        }
    }

    #[test]
    fn rest_counts_down_and_auto_advances() {
        let (mut engine, mut now) = measured(30);

        let out = engine.on_tick(now);
        assert_eq!(out.frame.top_label, "Rest");
        assert_eq!(out.frame.repetition_label, "5");
        assert_eq!(out.frame.time_label, "0:15");

        now += Duration::seconds(15);
        let out = engine.on_tick(now);
        assert_eq!(out.frame.time_label, "0:00");
        assert_eq!(out.cue, VibrationCue::ShortPulse);
        assert!(matches!(
            out.event,
            Some(Event::IntervalAdvanced {
                phase: 1,
                incomplete: false,
                ..
            })
        ));
        assert_eq!(engine.kind(), PhaseKind::Work);
    }

    #[test]
    fn rest_cannot_be_skipped() {
        let (mut engine, mut now) = measured(30);
        engine.on_tick(now);
        now += Duration::seconds(3);
        let out = engine.on_confirm(now);
        assert_eq!(engine.phase(), 0);
        assert_eq!(out.cue, VibrationCue::None);
        assert!(out.event.is_none());
    }

    #[test]
    fn skipping_work_records_incomplete_interval() {
        let (mut engine, mut now) = measured(30);

        // Run out the first rest.
        engine.on_tick(now);
        now += Duration::seconds(15);
        engine.on_tick(now);

        // First tick of work 1, then skip 10 seconds in.
        now += Duration::seconds(1);
        let out = engine.on_tick(now);
        assert_eq!(out.frame.top_label, "Work");
        assert_eq!(out.frame.time_label, "0:24");

        now += Duration::seconds(10);
        let out = engine.on_confirm(now);
        assert_eq!(engine.phase(), 2);
        assert_eq!(engine.min_work_secs(), 10);
        assert_eq!(out.cue, VibrationCue::ShortPulse);
        match out.event {
            Some(Event::IntervalAdvanced {
                phase,
                repetitions_left,
                incomplete,
                elapsed_secs,
                ..
            }) => {
                assert_eq!(phase, 2);
                assert_eq!(repetitions_left, 4);
                assert!(incomplete);
                assert_eq!(elapsed_secs, 10);
            }
            other => panic!("expected IntervalAdvanced, got {other:?}"),
        }

        // Label for the next rest reflects one repetition used up.
        now += Duration::seconds(1);
        let out = engine.on_tick(now);
        assert_eq!(out.frame.repetition_label, "4");
    }

    #[test]
    fn completed_work_does_not_lower_minimum() {
        let (mut engine, mut now) = measured(30);
        engine.on_tick(now);
        now += Duration::seconds(15);
        engine.on_tick(now); // -> work 1
        now += Duration::seconds(1);
        engine.on_tick(now);
        now += Duration::seconds(24);
        engine.on_tick(now); // work ran to completion
        assert_eq!(engine.phase(), 2);
        assert_eq!(engine.min_work_secs(), 24);
    }

    #[test]
    fn full_session_reaches_summary_with_one_double_pulse() {
        let (mut engine, mut now) = measured(30);

        let mut double_pulses = 0;
        let mut guard = 0;
        while !engine.is_finished() {
            now += Duration::seconds(1);
            let out = engine.on_tick(now);
            if out.cue == VibrationCue::DoublePulse {
                double_pulses += 1;
            }
            guard += 1;
            assert!(guard < 1000, "session did not terminate");
        }

        assert_eq!(engine.phase(), MAX_REPETITIONS * 2);
        assert_eq!(double_pulses, 1);

        // No skips: minimum stayed at work length, adjusted back to the hold.
        let frame = engine.frame();
        assert_eq!(frame.top_label, "Max time");
        assert_eq!(frame.time_label, "0:30");
        assert_eq!(frame.repetition_label, "0:30");
    }

    #[test]
    fn summary_shows_adjusted_minimum_after_skip() {
        let (mut engine, mut now) = measured(30);

        // Skip the first work sub-phase at 10s, run everything else out.
        engine.on_tick(now);
        now += Duration::seconds(15);
        engine.on_tick(now);
        now += Duration::seconds(1);
        engine.on_tick(now);
        now += Duration::seconds(10);
        engine.on_confirm(now);

        let mut guard = 0;
        while !engine.is_finished() {
            now += Duration::seconds(1);
            engine.on_tick(now);
            guard += 1;
            assert!(guard < 1000);
        }

        // 10 / 0.8 = 12, under the 30s cap.
        assert_eq!(engine.frame().repetition_label, "0:12");
        assert_eq!(engine.frame().time_label, "0:30");
    }

    #[test]
    fn summary_is_terminal() {
        let (mut engine, mut now) = measured(10);
        let mut guard = 0;
        while !engine.is_finished() {
            now += Duration::seconds(1);
            engine.on_tick(now);
            guard += 1;
            assert!(guard < 1000);
        }

        let phase = engine.phase();
        let frame = engine.frame();
        for _ in 0..5 {
            now += Duration::seconds(1);
            let tick = engine.on_tick(now);
            let press = engine.on_confirm(now);
            assert_eq!(tick.cue, VibrationCue::None);
            assert_eq!(press.cue, VibrationCue::None);
            assert!(tick.event.is_none());
            assert!(press.event.is_none());
        }
        assert_eq!(engine.phase(), phase);
        assert_eq!(engine.frame(), frame);
    }

    #[test]
    fn confirm_before_first_measuring_tick_measures_zero() {
        let mut engine = SessionEngine::new();
        let now = t0();
        engine.on_confirm(now);
        // No tick latched a start; an instant second press measures nothing.
        engine.on_confirm(now);
        assert_eq!(engine.max_hold_secs(), 0);
        assert_eq!(engine.work_secs(), 0);
        assert_eq!(engine.phase(), 0);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Phase never decreases and the observed work minimum never
            /// increases, for any interleaving of ticks and presses.
            #[test]
            fn phase_monotone_under_any_input(presses in proptest::collection::vec(any::<bool>(), 0..200)) {
                let mut engine = SessionEngine::new();
                let mut now = t0();
                let mut last_phase = engine.phase();
                let mut last_min: Option<i64> = None;

                for press in presses {
                    now += Duration::seconds(1);
                    if press {
                        engine.on_confirm(now);
                    } else {
                        engine.on_tick(now);
                    }

                    prop_assert!(engine.phase() >= last_phase);
                    last_phase = engine.phase();

                    if engine.phase() >= 0 {
                        prop_assert!(engine.work_secs() <= engine.max_hold_secs());
                        if let Some(min) = last_min {
                            prop_assert!(engine.min_work_secs() <= min);
                        }
                        last_min = Some(engine.min_work_secs());
                    }
                }
            }
        }
    }
}
