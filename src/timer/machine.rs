use std::{sync::Arc, time::Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    notify::{Notification, Notifier},
    settings::TimerSettings,
    stats::{SessionStats, StatsAccumulator},
};

use super::{
    clock::{ClockReading, SessionClock},
    state::{format_mmss, session_dots, status_label},
    SessionState, SessionType, TimerSnapshot, TimerStatus,
};

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// Outcome of a finished session, returned to the caller and mirrored to the notifier.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionTransition {
    pub session_id: String,
    pub finished: SessionType,
    pub next: SessionType,
    /// Completed through `skip()` rather than by expiring.
    pub skipped: bool,
    pub auto_started: bool,
    pub completed_in_cycle: u32,
}

/// Drives Focus / ShortBreak / LongBreak sessions.
///
/// Not reentrant: callers serialize `tick`, `start`, `pause`, `reset` and `skip`
/// (see [`super::TimerController`] for the async host that does so).
pub struct SessionStateMachine {
    settings: TimerSettings,
    state: SessionState,
    clock: SessionClock,
    stats: StatsAccumulator,
    notifier: Arc<dyn Notifier>,
    /// Pairs a monotonic instant with the wall-clock time it was taken at, so
    /// completion dates follow the same timeline as the injected `now`.
    wall_anchor: (Instant, DateTime<Utc>),
}

impl SessionStateMachine {
    pub fn new(settings: TimerSettings, notifier: Arc<dyn Notifier>) -> Result<Self> {
        settings.validate().context("invalid timer settings")?;

        let clock = SessionClock::new(settings.duration_for(SessionType::Focus));
        Ok(Self {
            settings,
            state: SessionState {
                session_id: Some(new_session_id()),
                ..SessionState::default()
            },
            clock,
            stats: StatsAccumulator::new(),
            notifier,
            wall_anchor: (Instant::now(), Utc::now()),
        })
    }

    /// Pins the wall-clock time that corresponds to `instant`.
    pub fn with_wall_anchor(mut self, instant: Instant, wall: DateTime<Utc>) -> Self {
        self.wall_anchor = (instant, wall);
        self
    }

    pub fn wall_time(&self, now: Instant) -> DateTime<Utc> {
        let (anchor, wall) = self.wall_anchor;
        let shifted = if now >= anchor {
            chrono::Duration::from_std(now - anchor)
                .ok()
                .and_then(|delta| wall.checked_add_signed(delta))
        } else {
            chrono::Duration::from_std(anchor - now)
                .ok()
                .and_then(|delta| wall.checked_sub_signed(delta))
        };
        shifted.unwrap_or(wall)
    }

    pub fn settings(&self) -> &TimerSettings {
        &self.settings
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn stats(&self) -> &SessionStats {
        self.stats.stats()
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn reading(&self, now: Instant) -> ClockReading {
        self.clock.tick(now)
    }

    /// Starts an idle session or resumes a paused one with its remaining time.
    /// Returns `false` when already running.
    pub fn start(&mut self, now: Instant) -> bool {
        match self.state.status {
            TimerStatus::Running => false,
            TimerStatus::Idle => {
                self.clock.resume(now);
                self.state.status = TimerStatus::Running;
                log_info!(
                    "{} session {} started ({} min)",
                    self.state.session_type.label(),
                    self.session_id(),
                    self.settings.minutes_for(self.state.session_type)
                );
                true
            }
            TimerStatus::Paused => {
                self.clock.resume(now);
                self.state.status = TimerStatus::Running;
                log_info!(
                    "session {} resumed with {} remaining",
                    self.session_id(),
                    format_mmss(self.clock.remaining(now))
                );
                true
            }
        }
    }

    /// Stops the clock but keeps its progress. Pausing twice is the same as once.
    pub fn pause(&mut self, now: Instant) -> bool {
        if self.state.status != TimerStatus::Running {
            return false;
        }
        self.clock.pause(now);
        self.state.status = TimerStatus::Paused;
        log_info!(
            "session {} paused with {} remaining",
            self.session_id(),
            format_mmss(self.clock.remaining(now))
        );
        true
    }

    /// The start/pause button.
    pub fn toggle(&mut self, now: Instant) -> TimerStatus {
        if self.is_running() {
            self.pause(now);
        } else {
            self.start(now);
        }
        self.state.status
    }

    /// Stops and reloads the configured duration for the current session type.
    pub fn reset(&mut self) {
        self.load_session(self.state.session_type);
        log_info!("{} session reset", self.state.session_type.label());
    }

    /// Ends the current session immediately, taking the same path as expiry.
    pub fn skip(&mut self, now: Instant) -> SessionTransition {
        self.clock.pause(now);
        self.complete_session(now, true)
    }

    /// Completes the session once its clock has expired. No-op unless running.
    pub fn tick(&mut self, now: Instant) -> Option<SessionTransition> {
        if !self.is_running() {
            return None;
        }
        if !self.clock.is_expired(now) {
            log_debug!("tick: {} remaining", format_mmss(self.clock.remaining(now)));
            return None;
        }
        self.clock.pause(now);
        Some(self.complete_session(now, false))
    }

    /// Replaces the settings if they validate; otherwise the previous ones stay.
    ///
    /// A session that is not running reloads its duration from the new settings.
    /// A running session finishes with the duration it was started with.
    pub fn apply_settings(&mut self, settings: TimerSettings) -> Result<()> {
        if let Err(err) = settings.validate() {
            log_warn!("rejected timer settings: {err}");
            return Err(err.context("invalid timer settings"));
        }

        self.settings = settings;
        let cycle_max = self.settings.sessions_until_long_break - 1;
        self.state.completed_in_cycle = self.state.completed_in_cycle.min(cycle_max);

        if !self.is_running() {
            self.load_session(self.state.session_type);
        }
        log_info!("timer settings applied");
        Ok(())
    }

    pub fn snapshot(&self, now: Instant) -> TimerSnapshot {
        let reading = self.clock.tick(now);
        TimerSnapshot {
            session_type: self.state.session_type,
            status: self.state.status,
            session_id: self.state.session_id.clone(),
            label: status_label(self.state.session_type, self.state.status).to_string(),
            time_display: format_mmss(reading.remaining),
            remaining_ms: u64::try_from(reading.remaining.as_millis()).unwrap_or(u64::MAX),
            progress_percent: reading.progress * 100.0,
            is_running: self.is_running(),
            completed_in_cycle: self.state.completed_in_cycle,
            session_dots: session_dots(
                self.settings.sessions_until_long_break,
                self.state.completed_in_cycle,
            ),
        }
    }

    fn complete_session(&mut self, now: Instant, skipped: bool) -> SessionTransition {
        let finished = self.state.session_type;
        let session_id = self.session_id().to_string();

        let next = match finished {
            SessionType::Focus => {
                self.state.completed_in_cycle += 1;
                let completed_at = self.wall_time(now);
                self.stats
                    .record_focus_completion(self.clock.configured(), completed_at);

                if self.state.completed_in_cycle >= self.settings.sessions_until_long_break {
                    self.state.completed_in_cycle = 0;
                    SessionType::LongBreak
                } else {
                    SessionType::ShortBreak
                }
            }
            SessionType::ShortBreak | SessionType::LongBreak => SessionType::Focus,
        };

        self.load_session(next);
        let auto_started = self.settings.auto_start_for(next) && self.start(now);

        let transition = SessionTransition {
            session_id,
            finished,
            next,
            skipped,
            auto_started,
            completed_in_cycle: self.state.completed_in_cycle,
        };

        log_info!(
            "{} session {} {}; next: {}{}",
            finished.label(),
            transition.session_id,
            if skipped { "skipped" } else { "completed" },
            next.label(),
            if auto_started { " (auto-started)" } else { "" }
        );

        self.notify(&transition);
        transition
    }

    fn load_session(&mut self, session_type: SessionType) {
        self.state.session_type = session_type;
        self.state.status = TimerStatus::Idle;
        self.state.session_id = Some(new_session_id());
        self.clock.load(self.settings.duration_for(session_type));
    }

    fn notify(&self, transition: &SessionTransition) {
        if !self.settings.notifications_enabled {
            return;
        }
        let notification = Notification::for_transition(transition, &self.settings);
        if let Err(err) = self.notifier.notify(&notification) {
            log_warn!("session-complete notification failed: {err:#}");
        }
    }

    fn session_id(&self) -> &str {
        self.state.session_id.as_deref().unwrap_or("-")
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}
