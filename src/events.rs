use anyhow::Result;
use log::info;
use serde::Serialize;

use crate::{
    stats::SessionStats,
    timer::{SessionTransition, TimerSnapshot},
};

/// Events pushed to the display layer in place of property-change bindings.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", rename_all = "kebab-case")]
pub enum TimerEvent {
    /// After every command and every transition.
    #[serde(rename_all = "camelCase")]
    StateChanged { snapshot: TimerSnapshot },
    #[serde(rename_all = "camelCase")]
    Heartbeat { snapshot: TimerSnapshot },
    #[serde(rename_all = "camelCase")]
    SessionCompleted {
        transition: SessionTransition,
        stats: SessionStats,
    },
}

impl TimerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TimerEvent::StateChanged { .. } => "timer-state-changed",
            TimerEvent::Heartbeat { .. } => "timer-heartbeat",
            TimerEvent::SessionCompleted { .. } => "session-completed",
        }
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: TimerEvent) -> Result<()>;
}

/// Logs each event as a JSON line.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl EventSink for LogEventSink {
    fn emit(&self, event: TimerEvent) -> Result<()> {
        let payload = serde_json::to_string(&event)?;
        info!("{}: {}", event.name(), payload);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::SessionType;

    #[test]
    fn serializes_with_event_tag() {
        let event = TimerEvent::SessionCompleted {
            transition: SessionTransition {
                session_id: "abc".into(),
                finished: SessionType::Focus,
                next: SessionType::ShortBreak,
                skipped: false,
                auto_started: false,
                completed_in_cycle: 1,
            },
            stats: SessionStats::default(),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["event"], "session-completed");
        assert_eq!(value["transition"]["finished"], "focus");
        assert_eq!(value["transition"]["next"], "shortBreak");
        assert_eq!(value["stats"]["completedSessions"], 0);
        assert_eq!(event.name(), "session-completed");
    }
}
