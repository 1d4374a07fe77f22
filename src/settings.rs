use anyhow::{bail, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock, time::Duration};

use crate::timer::SessionType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSettings {
    pub focus_minutes: u32,
    pub short_break_minutes: u32,
    pub long_break_minutes: u32,
    pub sessions_until_long_break: u32,
    pub auto_start_breaks: bool,
    pub auto_start_focus: bool,
    pub sound_enabled: bool,
    /// Chime volume in `[0, 1]`.
    pub sound_volume: f32,
    pub notifications_enabled: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            sessions_until_long_break: 4,
            auto_start_breaks: false,
            auto_start_focus: false,
            sound_enabled: true,
            sound_volume: 0.5,
            notifications_enabled: true,
        }
    }
}

impl TimerSettings {
    pub fn validate(&self) -> Result<()> {
        if self.focus_minutes == 0 {
            bail!("focusMinutes must be greater than zero");
        }
        if self.short_break_minutes == 0 {
            bail!("shortBreakMinutes must be greater than zero");
        }
        if self.long_break_minutes == 0 {
            bail!("longBreakMinutes must be greater than zero");
        }
        if self.sessions_until_long_break == 0 {
            bail!("sessionsUntilLongBreak must be greater than zero");
        }
        if !self.sound_volume.is_finite() || !(0.0..=1.0).contains(&self.sound_volume) {
            bail!("soundVolume must be between 0 and 1, got {}", self.sound_volume);
        }
        Ok(())
    }

    pub fn minutes_for(&self, session_type: SessionType) -> u32 {
        match session_type {
            SessionType::Focus => self.focus_minutes,
            SessionType::ShortBreak => self.short_break_minutes,
            SessionType::LongBreak => self.long_break_minutes,
        }
    }

    pub fn duration_for(&self, session_type: SessionType) -> Duration {
        Duration::from_secs(u64::from(self.minutes_for(session_type)) * 60)
    }

    pub fn auto_start_for(&self, session_type: SessionType) -> bool {
        match session_type {
            SessionType::Focus => self.auto_start_focus,
            SessionType::ShortBreak | SessionType::LongBreak => self.auto_start_breaks,
        }
    }
}

/// JSON-backed source of [`TimerSettings`] for the host.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<TimerSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            Self::parse_or_default(&contents, &path)
        } else {
            TimerSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn parse_or_default(contents: &str, path: &std::path::Path) -> TimerSettings {
        let parsed: TimerSettings = match serde_json::from_str(contents) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("Ignoring unreadable settings file {}: {err}", path.display());
                return TimerSettings::default();
            }
        };

        match parsed.validate() {
            Ok(()) => parsed,
            Err(err) => {
                warn!("Ignoring invalid settings in {}: {err}", path.display());
                TimerSettings::default()
            }
        }
    }

    pub fn timer_settings(&self) -> TimerSettings {
        self.data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Validates and persists `settings`; rejected input leaves memory and disk untouched.
    pub fn update(&self, settings: TimerSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self
            .data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    pub fn reset_to_defaults(&self) -> Result<TimerSettings> {
        let defaults = TimerSettings::default();
        self.update(defaults.clone())?;
        Ok(defaults)
    }

    fn persist(&self, data: &TimerSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
