use std::{sync::Arc, time::Duration};

use anyhow::Result;
use log::{error, info};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::{
    events::{EventSink, TimerEvent},
    settings::TimerSettings,
    stats::SessionStats,
};

use super::{SessionStateMachine, SessionTransition, TimerSnapshot};

struct Ticker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Async host around [`SessionStateMachine`].
///
/// Owns the periodic tick schedule and serializes every command and tick through a
/// single mutex. Commands hold the ticker slot from the state change until the
/// schedule matches it, so a concurrent command cannot cancel a fresh ticker.
/// The ticker runs only while the machine is running; pause, reset and
/// non-auto-started completions stop it.
#[derive(Clone)]
pub struct TimerController {
    machine: Arc<Mutex<SessionStateMachine>>,
    events: Arc<dyn EventSink>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    tick_interval: Duration,
    heartbeat_every_ticks: u32,
}

impl TimerController {
    pub fn new(machine: SessionStateMachine, events: Arc<dyn EventSink>) -> Self {
        let debug_mode = std::env::var("FOCUSTIME_DEBUG")
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Self {
            machine: Arc::new(Mutex::new(machine)),
            events,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
            heartbeat_every_ticks: if debug_mode { 1 } else { 10 },
        }
    }

    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn with_heartbeat_every(mut self, ticks: u32) -> Self {
        self.heartbeat_every_ticks = ticks.max(1);
        self
    }

    pub async fn snapshot(&self) -> TimerSnapshot {
        self.machine.lock().await.snapshot(now())
    }

    pub async fn stats(&self) -> SessionStats {
        self.machine.lock().await.stats().clone()
    }

    pub async fn settings(&self) -> TimerSettings {
        self.machine.lock().await.settings().clone()
    }

    pub async fn is_ticking(&self) -> bool {
        self.ticker
            .lock()
            .await
            .as_ref()
            .is_some_and(|ticker| !ticker.handle.is_finished())
    }

    pub async fn start(&self) -> TimerSnapshot {
        let mut ticker = self.ticker.lock().await;
        let (was_running, started, running, snapshot) = {
            let mut machine = self.machine.lock().await;
            let now = now();
            let was_running = machine.is_running();
            let started = machine.start(now);
            (was_running, started, machine.is_running(), machine.snapshot(now))
        };
        if !started {
            info!("start ignored: timer already running");
        }
        self.reconcile_ticker(&mut ticker, was_running, running).await;
        drop(ticker);

        self.emit(TimerEvent::StateChanged {
            snapshot: snapshot.clone(),
        });
        snapshot
    }

    pub async fn pause(&self) -> TimerSnapshot {
        let mut ticker = self.ticker.lock().await;
        let (was_running, running, snapshot) = {
            let mut machine = self.machine.lock().await;
            let now = now();
            let was_running = machine.is_running();
            machine.pause(now);
            (was_running, machine.is_running(), machine.snapshot(now))
        };
        self.reconcile_ticker(&mut ticker, was_running, running).await;
        drop(ticker);

        self.emit(TimerEvent::StateChanged {
            snapshot: snapshot.clone(),
        });
        snapshot
    }

    pub async fn toggle(&self) -> TimerSnapshot {
        let mut ticker = self.ticker.lock().await;
        let (was_running, running, snapshot) = {
            let mut machine = self.machine.lock().await;
            let now = now();
            let was_running = machine.is_running();
            machine.toggle(now);
            (was_running, machine.is_running(), machine.snapshot(now))
        };
        self.reconcile_ticker(&mut ticker, was_running, running).await;
        drop(ticker);

        self.emit(TimerEvent::StateChanged {
            snapshot: snapshot.clone(),
        });
        snapshot
    }

    pub async fn reset(&self) -> TimerSnapshot {
        let mut ticker = self.ticker.lock().await;
        let (was_running, running, snapshot) = {
            let mut machine = self.machine.lock().await;
            let was_running = machine.is_running();
            machine.reset();
            (was_running, machine.is_running(), machine.snapshot(now()))
        };
        self.reconcile_ticker(&mut ticker, was_running, running).await;
        drop(ticker);

        self.emit(TimerEvent::StateChanged {
            snapshot: snapshot.clone(),
        });
        snapshot
    }

    pub async fn skip(&self) -> SessionTransition {
        let mut ticker = self.ticker.lock().await;
        let (was_running, transition, snapshot, stats, running) = {
            let mut machine = self.machine.lock().await;
            let now = now();
            let was_running = machine.is_running();
            let transition = machine.skip(now);
            (
                was_running,
                transition,
                machine.snapshot(now),
                machine.stats().clone(),
                machine.is_running(),
            )
        };
        self.reconcile_ticker(&mut ticker, was_running, running).await;
        drop(ticker);

        self.emit(TimerEvent::SessionCompleted {
            transition: transition.clone(),
            stats,
        });
        self.emit(TimerEvent::StateChanged { snapshot });
        transition
    }

    pub async fn apply_settings(&self, settings: TimerSettings) -> Result<TimerSnapshot> {
        let snapshot = {
            let mut machine = self.machine.lock().await;
            machine.apply_settings(settings)?;
            machine.snapshot(now())
        };
        self.emit(TimerEvent::StateChanged {
            snapshot: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Stops the tick schedule without touching the session.
    pub async fn shutdown(&self) {
        let mut ticker = self.ticker.lock().await;
        cancel_ticker(&mut ticker).await;
    }

    /// Brings the tick schedule in line with the machine: one live ticker while
    /// running, none otherwise. A ticker left over from before the machine
    /// (re)started may already be on its way out, so it is always replaced.
    ///
    /// Callers hold the ticker slot for the whole command and must have released the
    /// machine lock, which the ticker task takes on every tick.
    async fn reconcile_ticker(
        &self,
        slot: &mut Option<Ticker>,
        was_running: bool,
        running: bool,
    ) {
        if !running {
            cancel_ticker(slot).await;
            return;
        }
        let alive = slot
            .as_ref()
            .is_some_and(|ticker| !ticker.handle.is_finished());
        if !was_running || !alive {
            cancel_ticker(slot).await;
            *slot = Some(self.spawn_ticker());
        }
    }

    fn spawn_ticker(&self) -> Ticker {
        let machine = self.machine.clone();
        let events = self.events.clone();
        let tick_interval = self.tick_interval;
        let heartbeat_every = self.heartbeat_every_ticks;
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut ticks: u32 = 0;

            loop {
                tokio::select! {
                    _ = interval.tick() => {}
                    _ = token.cancelled() => break,
                }

                let (transition, snapshot, stats, still_running) = {
                    let mut guard = machine.lock().await;
                    if !guard.is_running() {
                        break;
                    }
                    let now = now();
                    let transition = guard.tick(now);
                    (
                        transition,
                        guard.snapshot(now),
                        guard.stats().clone(),
                        guard.is_running(),
                    )
                };

                if let Some(transition) = transition {
                    let completed = TimerEvent::SessionCompleted { transition, stats };
                    emit_event(events.as_ref(), completed);
                    emit_event(events.as_ref(), TimerEvent::StateChanged { snapshot });
                    if !still_running {
                        break;
                    }
                    ticks = 0;
                    continue;
                }

                ticks = ticks.wrapping_add(1);
                if ticks % heartbeat_every == 0 {
                    emit_event(events.as_ref(), TimerEvent::Heartbeat { snapshot });
                }
            }
        });

        Ticker { handle, cancel }
    }

    fn emit(&self, event: TimerEvent) {
        emit_event(self.events.as_ref(), event);
    }
}

async fn cancel_ticker(slot: &mut Option<Ticker>) {
    if let Some(ticker) = slot.take() {
        ticker.cancel.cancel();
        if let Err(err) = ticker.handle.await {
            if !err.is_cancelled() {
                error!("timer ticker task failed: {err}");
            }
        }
    }
}

fn emit_event(events: &dyn EventSink, event: TimerEvent) {
    let name = event.name();
    if let Err(err) = events.emit(event) {
        error!("failed to emit {name}: {err:#}");
    }
}

/// Current instant on tokio's clock, so paused test time drives the machine too.
fn now() -> std::time::Instant {
    time::Instant::now().into_std()
}
