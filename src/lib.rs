pub mod commands;
pub mod dock;
pub mod events;
pub mod notify;
pub mod settings;
pub mod stats;
pub mod timer;
mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use commands::{execute, HostCommand};
use events::LogEventSink;
use notify::LogNotifier;
use settings::SettingsStore;
use timer::{SessionStateMachine, TimerController};

const DEFAULT_SETTINGS_FILE: &str = "focustime.json";

/// Runs the headless host: loads settings, drives the timer at 1 Hz and reads
/// commands from stdin until `quit`, EOF or Ctrl-C.
pub fn run() -> anyhow::Result<()> {
    // Reads RUST_LOG, defaulting to info.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("FocusTime starting up...");

    let settings_path = std::env::var_os("FOCUSTIME_SETTINGS")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let store = SettingsStore::new(settings_path)?;

    let machine = SessionStateMachine::new(store.timer_settings(), Arc::new(LogNotifier))?;

    let runtime = tokio::runtime::Runtime::new().context("failed to build tokio runtime")?;
    runtime.block_on(async move {
        let timer = TimerController::new(machine, Arc::new(LogEventSink));
        let result = command_loop(&timer, &store).await;
        timer.shutdown().await;
        result
    })
}

async fn command_loop(timer: &TimerController, store: &SettingsStore) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, shutting down");
                return Ok(());
            }
        };

        let Some(line) = line else {
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match HostCommand::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                warn!("{err}");
                continue;
            }
        };

        match execute(command, timer, store).await {
            Ok(true) => {}
            Ok(false) => return Ok(()),
            Err(err) => warn!("{err:#}"),
        }
    }
}
