//! Interactive terminal session.
//!
//! Owns the event loop the engine itself refuses to have: a tokio 1-second
//! interval delivers ticks, stdin lines (Enter) deliver confirm presses, and
//! the two are serialized through one `select!` so engine calls never
//! interleave.

use std::io::Write;

use chrono::Utc;
use holdset_core::{Config, CoreError, EngineOutput, SessionEngine, VibrationCue};
use tokio::io::AsyncBufReadExt;
use tracing::debug;

pub async fn run() -> Result<(), CoreError> {
    let config = Config::load_or_default();
    let mut engine = SessionEngine::new();

    println!("Press Enter to start the hold measurement, and again to end it.");
    println!("During a work interval, Enter skips ahead to the rest.");
    println!();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(1));

    loop {
        let out = tokio::select! {
            _ = interval.tick() => engine.on_tick(Utc::now()),
            line = lines.next_line() => match line? {
                Some(_) => engine.on_confirm(Utc::now()),
                // stdin closed; the session cannot receive further input.
                None => break,
            },
        };

        if let Some(event) = &out.event {
            debug!(?event, "phase transition");
        }
        render(&out, &config)?;

        if engine.is_finished() {
            println!();
            break;
        }
    }

    Ok(())
}

/// Redraw the current frame in place; transitions get their own line.
fn render(out: &EngineOutput, config: &Config) -> Result<(), CoreError> {
    let frame = &out.frame;
    let line = if frame.repetition_label.is_empty() {
        format!("{}   {}", frame.top_label, frame.time_label)
    } else {
        format!(
            "{} [{}]   {}",
            frame.top_label, frame.repetition_label, frame.time_label
        )
    };

    let mut stdout = std::io::stdout();
    write!(stdout, "\r{line:<48}{}", cue_marker(out.cue, config))?;
    if out.event.is_some() {
        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

fn cue_marker(cue: VibrationCue, config: &Config) -> &'static str {
    if !config.notifications.enabled {
        return "";
    }
    match (cue, config.notifications.bell) {
        (VibrationCue::None, _) => "",
        (VibrationCue::ShortPulse, true) => "\x07",
        (VibrationCue::DoublePulse, true) => "\x07\x07",
        (VibrationCue::ShortPulse, false) => " *bzz*",
        (VibrationCue::DoublePulse, false) => " *bzz-bzz*",
    }
}
