use serde::{Deserialize, Serialize};

/// Vibration cue to play alongside a display update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibrationCue {
    None,
    /// Single pulse on a repetition transition.
    ShortPulse,
    /// Double pulse when the summary screen is reached.
    DoublePulse,
}

impl VibrationCue {
    pub fn is_none(&self) -> bool {
        matches!(self, VibrationCue::None)
    }
}

/// The three text fields the presentation layer renders.
///
/// Strings are freshly constructed for every engine call; nothing is shared
/// or reused between frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFrame {
    pub top_label: String,
    /// Remaining repetitions while repeating, the adjusted minimum on the
    /// summary screen, empty otherwise.
    pub repetition_label: String,
    /// `M:SS` clock text.
    pub time_label: String,
}

/// Format whole seconds as `M:SS`.
///
/// Minutes wrap modulo 100 and are not zero-padded; seconds are modulo 60.
/// Negative inputs keep their magnitude and gain a leading `-` (a late tick
/// can briefly render a negative remainder, see [`SessionEngine::on_tick`]).
///
/// [`SessionEngine::on_tick`]: super::SessionEngine::on_tick
pub fn format_clock(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let abs = secs.abs();
    let minutes = abs / 60 % 100;
    let seconds = abs % 60;
    format!("{sign}{minutes}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_renders_flat() {
        assert_eq!(format_clock(0), "0:00");
    }

    #[test]
    fn seconds_wrap_into_minutes() {
        assert_eq!(format_clock(125), "2:05");
        assert_eq!(format_clock(59), "0:59");
        assert_eq!(format_clock(60), "1:00");
    }

    #[test]
    fn minutes_wrap_modulo_100() {
        assert_eq!(format_clock(100 * 60), "0:00");
        assert_eq!(format_clock(101 * 60 + 7), "1:07");
    }

    #[test]
    fn negative_remainder_keeps_magnitude() {
        assert_eq!(format_clock(-5), "-0:05");
        assert_eq!(format_clock(-65), "-1:05");
    }

    #[test]
    fn cue_none_predicate() {
        assert!(VibrationCue::None.is_none());
        assert!(!VibrationCue::ShortPulse.is_none());
        assert!(!VibrationCue::DoublePulse.is_none());
    }
}
