use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub completed_sessions: u64,
    pub today_completed_sessions: u64,
    pub total_focus_ms: u64,
    pub today_focus_ms: u64,
    pub last_session_date: Option<DateTime<Utc>>,
    /// Carried for the display layer; nothing advances it yet.
    pub current_streak: u32,
}

/// Accumulates focus-session counters. Only the session state machine writes here,
/// once per completed focus session.
#[derive(Debug, Clone, Default)]
pub struct StatsAccumulator {
    stats: SessionStats,
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_focus_completion(&mut self, duration: Duration, now: DateTime<Utc>) {
        let ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        let stats = &mut self.stats;
        stats.completed_sessions += 1;
        stats.today_completed_sessions += 1;
        stats.total_focus_ms = stats.total_focus_ms.saturating_add(ms);
        stats.today_focus_ms = stats.today_focus_ms.saturating_add(ms);
        stats.last_session_date = Some(now);
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn records_counters_and_durations() {
        let mut acc = StatsAccumulator::new();
        let first = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();

        acc.record_focus_completion(Duration::from_secs(25 * 60), first);
        acc.record_focus_completion(Duration::from_secs(25 * 60), second);

        let stats = acc.stats();
        assert_eq!(stats.completed_sessions, 2);
        assert_eq!(stats.today_completed_sessions, 2);
        assert_eq!(stats.total_focus_ms, 50 * 60 * 1000);
        assert_eq!(stats.today_focus_ms, 50 * 60 * 1000);
        assert_eq!(stats.last_session_date, Some(second));
    }

    #[test]
    fn starts_empty() {
        let acc = StatsAccumulator::new();
        assert_eq!(acc.stats(), &SessionStats::default());
        assert!(acc.stats().last_session_date.is_none());
    }
}
