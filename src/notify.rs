use anyhow::Result;
use log::info;
use serde::Serialize;

use crate::settings::TimerSettings;
use crate::timer::{SessionTransition, SessionType};

/// Content handed to the notification/sound subsystem when a session ends.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub finished: SessionType,
    pub next: SessionType,
    pub play_sound: bool,
    pub volume: f32,
}

impl Notification {
    pub fn for_transition(transition: &SessionTransition, settings: &TimerSettings) -> Self {
        let title = if transition.finished.is_break() {
            "Break is over"
        } else {
            "Focus session complete"
        };
        let body = match transition.next {
            SessionType::Focus => "Time to focus.".to_string(),
            SessionType::ShortBreak => {
                format!("Take a {}-minute break.", settings.short_break_minutes)
            }
            SessionType::LongBreak => {
                format!(
                    "Cycle done! Enjoy a {}-minute long break.",
                    settings.long_break_minutes
                )
            }
        };

        Self {
            title: title.to_string(),
            body,
            finished: transition.finished,
            next: transition.next,
            play_sound: settings.sound_enabled,
            volume: settings.sound_volume,
        }
    }
}

/// Fire-and-forget sink for session-complete notifications. Errors are logged by
/// the caller and otherwise ignored.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<()>;
}

/// Writes notifications to the log; used by the headless host.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: &Notification) -> Result<()> {
        info!(
            "[notify] {}: {} (sound: {}, volume: {:.2})",
            notification.title, notification.body, notification.play_sound, notification.volume
        );
        Ok(())
    }
}

/// Drops every notification.
#[derive(Debug, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notification: &Notification) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(finished: SessionType, next: SessionType) -> SessionTransition {
        SessionTransition {
            session_id: "s-1".into(),
            finished,
            next,
            skipped: false,
            auto_started: false,
            completed_in_cycle: 0,
        }
    }

    #[test]
    fn focus_to_long_break_mentions_duration() {
        let settings = TimerSettings::default();
        let n = Notification::for_transition(
            &transition(SessionType::Focus, SessionType::LongBreak),
            &settings,
        );
        assert_eq!(n.title, "Focus session complete");
        assert!(n.body.contains("15-minute"));
        assert!(n.play_sound);
    }

    #[test]
    fn sound_follows_settings() {
        let settings = TimerSettings {
            sound_enabled: false,
            sound_volume: 0.2,
            ..TimerSettings::default()
        };
        let n = Notification::for_transition(
            &transition(SessionType::ShortBreak, SessionType::Focus),
            &settings,
        );
        assert_eq!(n.title, "Break is over");
        assert!(!n.play_sound);
        assert_eq!(n.volume, 0.2);
    }
}
