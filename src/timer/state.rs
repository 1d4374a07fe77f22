use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionType {
    #[default]
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionType {
    pub fn label(&self) -> &'static str {
        match self {
            SessionType::Focus => "Focus",
            SessionType::ShortBreak => "Short Break",
            SessionType::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        !matches!(self, SessionType::Focus)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    /// Loaded with a full duration and not started.
    #[default]
    Idle,
    Running,
    /// Stopped mid-session; the clock keeps the elapsed progress.
    Paused,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub session_type: SessionType,
    pub status: TimerStatus,
    /// Focus sessions finished in the current cycle; always below `sessionsUntilLongBreak`.
    pub completed_in_cycle: u32,
    pub session_id: Option<String>,
}

impl SessionState {
    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }
}

/// Read-only values for the display layer.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub session_type: SessionType,
    pub status: TimerStatus,
    pub session_id: Option<String>,
    pub label: String,
    pub time_display: String,
    pub remaining_ms: u64,
    /// Elapsed share of the session in `[0, 100]`.
    pub progress_percent: f64,
    pub is_running: bool,
    pub completed_in_cycle: u32,
    /// One entry per focus session in a cycle; `true` for the ones already finished.
    pub session_dots: Vec<bool>,
}

impl TimerSnapshot {
    pub fn filled_dots(&self) -> usize {
        self.session_dots.iter().filter(|filled| **filled).count()
    }
}

pub fn status_label(session_type: SessionType, status: TimerStatus) -> &'static str {
    match status {
        TimerStatus::Paused => "Paused",
        TimerStatus::Idle | TimerStatus::Running => session_type.label(),
    }
}

/// Formats as `MM:SS`, flooring partial seconds. Minutes are not wrapped at the hour.
pub fn format_mmss(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;
    format!("{minutes:02}:{seconds:02}")
}

pub fn session_dots(sessions_until_long_break: u32, completed_in_cycle: u32) -> Vec<bool> {
    (0..sessions_until_long_break)
        .map(|index| index < completed_in_cycle)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_mmss(Duration::from_secs(25 * 60)), "25:00");
        assert_eq!(format_mmss(Duration::from_millis(59_999)), "00:59");
        assert_eq!(format_mmss(Duration::from_secs(61)), "01:01");
        assert_eq!(format_mmss(Duration::from_secs(90 * 60)), "90:00");
        assert_eq!(format_mmss(Duration::ZERO), "00:00");
    }

    #[test]
    fn dots_fill_from_the_left() {
        assert_eq!(session_dots(4, 0), vec![false; 4]);
        assert_eq!(session_dots(4, 2), vec![true, true, false, false]);
    }

    #[test]
    fn paused_label_overrides_session_label() {
        assert_eq!(status_label(SessionType::LongBreak, TimerStatus::Idle), "Long Break");
        assert_eq!(status_label(SessionType::Focus, TimerStatus::Paused), "Paused");
    }
}
