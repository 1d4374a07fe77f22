use anyhow::{anyhow, bail, Result};

use crate::{
    settings::{SettingsStore, TimerSettings},
    timer::TimerController,
};

/// One line typed into the headless host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    Start,
    Pause,
    Toggle,
    Reset,
    Skip,
    Status,
    Stats,
    Settings,
    Set { key: String, value: String },
    Defaults,
    Quit,
}

impl HostCommand {
    pub fn parse(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace();
        let Some(verb) = parts.next() else {
            bail!("empty command");
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "start" | "resume" => HostCommand::Start,
            "pause" => HostCommand::Pause,
            "toggle" => HostCommand::Toggle,
            "reset" => HostCommand::Reset,
            "skip" => HostCommand::Skip,
            "status" => HostCommand::Status,
            "stats" => HostCommand::Stats,
            "settings" => HostCommand::Settings,
            "defaults" => HostCommand::Defaults,
            "quit" | "exit" => HostCommand::Quit,
            "set" => {
                let key = parts.next().ok_or_else(|| anyhow!("usage: set <key> <value>"))?;
                let value = parts.next().ok_or_else(|| anyhow!("usage: set <key> <value>"))?;
                HostCommand::Set {
                    key: key.to_string(),
                    value: value.to_string(),
                }
            }
            other => bail!("unknown command: {other}"),
        };
        Ok(command)
    }
}

/// Applies a single `set <key> <value>` to a copy of `settings`.
pub fn apply_setting(settings: &TimerSettings, key: &str, value: &str) -> Result<TimerSettings> {
    let mut next = settings.clone();
    let minutes = || -> Result<u32> {
        value
            .parse()
            .map_err(|_| anyhow!("{key} expects a whole number, got {value}"))
    };
    let flag = || -> Result<bool> {
        match value.to_ascii_lowercase().as_str() {
            "on" | "true" | "1" | "yes" => Ok(true),
            "off" | "false" | "0" | "no" => Ok(false),
            _ => Err(anyhow!("{key} expects on/off, got {value}")),
        }
    };

    match key {
        "focus" => next.focus_minutes = minutes()?,
        "short" => next.short_break_minutes = minutes()?,
        "long" => next.long_break_minutes = minutes()?,
        "cycle" => next.sessions_until_long_break = minutes()?,
        "autobreaks" => next.auto_start_breaks = flag()?,
        "autofocus" => next.auto_start_focus = flag()?,
        "sound" => next.sound_enabled = flag()?,
        "notifications" => next.notifications_enabled = flag()?,
        "volume" => {
            next.sound_volume = value
                .parse()
                .map_err(|_| anyhow!("volume expects a number, got {value}"))?
        }
        other => bail!("unknown setting: {other}"),
    }

    next.validate()?;
    Ok(next)
}

/// Runs one command. Returns `false` when the host should exit.
pub async fn execute(
    command: HostCommand,
    timer: &TimerController,
    store: &SettingsStore,
) -> Result<bool> {
    match command {
        HostCommand::Start => print_snapshot(&timer.start().await),
        HostCommand::Pause => print_snapshot(&timer.pause().await),
        HostCommand::Toggle => print_snapshot(&timer.toggle().await),
        HostCommand::Reset => print_snapshot(&timer.reset().await),
        HostCommand::Skip => {
            let transition = timer.skip().await;
            println!(
                "skipped {} -> {}",
                transition.finished.label(),
                transition.next.label()
            );
        }
        HostCommand::Status => print_snapshot(&timer.snapshot().await),
        HostCommand::Stats => {
            println!("{}", serde_json::to_string_pretty(&timer.stats().await)?)
        }
        HostCommand::Settings => {
            println!("{}", serde_json::to_string_pretty(&timer.settings().await)?)
        }
        HostCommand::Set { key, value } => {
            let next = apply_setting(&timer.settings().await, &key, &value)?;
            // Persist first so a failed write leaves the running timer untouched.
            store.update(next.clone())?;
            timer.apply_settings(next).await?;
            println!("{key} = {value}");
        }
        HostCommand::Defaults => {
            let defaults = store.reset_to_defaults()?;
            print_snapshot(&timer.apply_settings(defaults).await?);
        }
        HostCommand::Quit => return Ok(false),
    }
    Ok(true)
}

fn print_snapshot(snapshot: &crate::timer::TimerSnapshot) {
    let dots: String = snapshot
        .session_dots
        .iter()
        .map(|filled| if *filled { '●' } else { '○' })
        .collect();
    println!(
        "{:<11} {}  {:>5.1}%  {}",
        snapshot.label, snapshot.time_display, snapshot.progress_percent, dots
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{events::LogEventSink, notify::SilentNotifier, timer::SessionStateMachine};
    use std::sync::Arc;

    #[test]
    fn parses_verbs_case_insensitively() {
        assert_eq!(HostCommand::parse("START").unwrap(), HostCommand::Start);
        assert_eq!(HostCommand::parse("  skip ").unwrap(), HostCommand::Skip);
        assert_eq!(
            HostCommand::parse("set focus 50").unwrap(),
            HostCommand::Set {
                key: "focus".into(),
                value: "50".into()
            }
        );
    }

    #[test]
    fn rejects_unknown_and_incomplete_commands() {
        assert!(HostCommand::parse("").is_err());
        assert!(HostCommand::parse("dance").is_err());
        assert!(HostCommand::parse("set focus").is_err());
    }

    fn timer() -> TimerController {
        let machine =
            SessionStateMachine::new(TimerSettings::default(), Arc::new(SilentNotifier)).unwrap();
        TimerController::new(machine, Arc::new(LogEventSink))
    }

    #[tokio::test]
    async fn set_updates_store_and_timer() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let timer = timer();

        let command = HostCommand::parse("set focus 50").unwrap();
        assert!(execute(command, &timer, &store).await.unwrap());
        assert_eq!(store.timer_settings().focus_minutes, 50);
        assert_eq!(timer.settings().await.focus_minutes, 50);
        assert_eq!(timer.snapshot().await.time_display, "50:00");
    }

    #[tokio::test]
    async fn failed_settings_write_leaves_timer_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let unwritable = dir.path().join("missing").join("settings.json");
        let store = SettingsStore::new(unwritable).unwrap();
        let timer = timer();

        let command = HostCommand::parse("set focus 50").unwrap();
        assert!(execute(command, &timer, &store).await.is_err());
        assert_eq!(store.timer_settings().focus_minutes, 25);
        assert_eq!(timer.settings().await.focus_minutes, 25);
        assert_eq!(timer.snapshot().await.time_display, "25:00");
    }

    #[test]
    fn apply_setting_validates() {
        let base = TimerSettings::default();
        let next = apply_setting(&base, "autobreaks", "on").unwrap();
        assert!(next.auto_start_breaks);
        assert_eq!(apply_setting(&base, "long", "30").unwrap().long_break_minutes, 30);

        assert!(apply_setting(&base, "focus", "0").is_err());
        assert!(apply_setting(&base, "focus", "-5").is_err());
        assert!(apply_setting(&base, "volume", "2").is_err());
        assert!(apply_setting(&base, "colour", "red").is_err());
    }
}
