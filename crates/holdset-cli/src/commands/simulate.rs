//! Deterministic virtual-clock replay.
//!
//! Drives the same engine the interactive mode uses, but advances a virtual
//! clock one second per tick, so a whole session replays instantly. Each
//! transition event is printed as a JSON line, followed by a pretty-printed
//! final snapshot. Nothing is persisted.

use chrono::{Duration, Utc};
use holdset_core::{CoreError, EngineOutput, PhaseKind, SessionEngine, MAX_REPETITIONS};

/// One `--skip REP:SECS` argument: skip work repetition `repetition`
/// (1-based) once its elapsed time reaches `at_secs`.
#[derive(Debug, Clone, Copy)]
pub struct SkipSpec {
    pub repetition: i32,
    pub at_secs: i64,
}

pub fn parse_skip(s: &str) -> Result<SkipSpec, String> {
    let (rep, secs) = s
        .split_once(':')
        .ok_or_else(|| format!("expected REP:SECS, got '{s}'"))?;
    let repetition: i32 = rep
        .parse()
        .map_err(|_| format!("'{rep}' is not a repetition number"))?;
    let at_secs: i64 = secs
        .parse()
        .map_err(|_| format!("'{secs}' is not a number of seconds"))?;
    if !(1..=MAX_REPETITIONS).contains(&repetition) {
        return Err(format!(
            "repetition must be between 1 and {MAX_REPETITIONS}, got {repetition}"
        ));
    }
    Ok(SkipSpec {
        repetition,
        at_secs,
    })
}

pub fn run(hold_secs: i64, skips: &[SkipSpec]) -> Result<(), CoreError> {
    let mut engine = SessionEngine::new();
    let mut now = Utc::now();

    // Arm the measurement, latch its start on the first tick, hold, end it.
    emit(&engine.on_confirm(now))?;
    engine.on_tick(now);
    for _ in 0..hold_secs {
        now += Duration::seconds(1);
        engine.on_tick(now);
    }
    emit(&engine.on_confirm(now))?;

    while !engine.is_finished() {
        now += Duration::seconds(1);
        let out = engine.on_tick(now);
        let advanced = out.event.is_some();
        emit(&out)?;

        // A tick that produced no event ran inside the current phase, so the
        // phase has latched its start and elapsed time is meaningful.
        if !advanced && engine.kind() == PhaseKind::Work {
            let repetition = engine.phase() / 2 + 1;
            let due = skips
                .iter()
                .any(|s| s.repetition == repetition && engine.elapsed_secs(now) >= s.at_secs);
            if due {
                emit(&engine.on_confirm(now))?;
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    Ok(())
}

fn emit(out: &EngineOutput) -> Result<(), CoreError> {
    if let Some(event) = &out.event {
        println!("{}", serde_json::to_string(event)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skip_accepts_rep_and_seconds() {
        let spec = parse_skip("2:45").unwrap();
        assert_eq!(spec.repetition, 2);
        assert_eq!(spec.at_secs, 45);
    }

    #[test]
    fn parse_skip_rejects_missing_colon() {
        assert!(parse_skip("12").is_err());
    }

    #[test]
    fn parse_skip_rejects_out_of_range_repetition() {
        assert!(parse_skip("0:10").is_err());
        assert!(parse_skip("6:10").is_err());
    }

    #[test]
    fn parse_skip_rejects_garbage() {
        assert!(parse_skip("one:ten").is_err());
    }
}
