use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use focustime_lib::{
    notify::{Notification, Notifier},
    settings::TimerSettings,
    timer::{SessionStateMachine, SessionType, TimerStatus},
};

#[derive(Default)]
struct CountingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl Notifier for CountingNotifier {
    fn notify(&self, notification: &Notification) -> anyhow::Result<()> {
        self.notifications.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

fn standard_settings() -> TimerSettings {
    TimerSettings {
        focus_minutes: 25,
        short_break_minutes: 5,
        long_break_minutes: 15,
        sessions_until_long_break: 4,
        ..TimerSettings::default()
    }
}

#[test]
fn four_focus_sessions_reach_a_long_break() {
    let notifier = Arc::new(CountingNotifier::default());
    let mut machine = SessionStateMachine::new(standard_settings(), notifier.clone()).unwrap();
    let mut now = Instant::now();
    let focus = Duration::from_secs(25 * 60);

    let mut last = None;
    for round in 1..=4 {
        assert_eq!(machine.state().session_type, SessionType::Focus);
        machine.start(now);
        now += focus;
        let transition = machine.tick(now).expect("focus should expire");
        assert_eq!(transition.finished, SessionType::Focus);

        if round < 4 {
            assert_eq!(transition.next, SessionType::ShortBreak);
            assert_eq!(machine.state().completed_in_cycle, round);
            // Break skipped immediately.
            let back = machine.skip(now);
            assert_eq!(back.next, SessionType::Focus);
        }
        last = Some(transition);
    }

    let last = last.unwrap();
    assert_eq!(last.next, SessionType::LongBreak);
    assert_eq!(machine.state().session_type, SessionType::LongBreak);
    assert_eq!(machine.state().completed_in_cycle, 0);
    assert_eq!(machine.stats().completed_sessions, 4);
    assert_eq!(machine.stats().today_completed_sessions, 4);
    assert_eq!(machine.stats().total_focus_ms, 4 * 25 * 60 * 1000);
    assert!(machine.stats().last_session_date.is_some());

    // 4 focus completions + 3 skipped breaks.
    assert_eq!(notifier.notifications.lock().unwrap().len(), 7);

    let snapshot = machine.snapshot(now);
    assert_eq!(snapshot.label, "Long Break");
    assert_eq!(snapshot.time_display, "15:00");
    assert_eq!(snapshot.status, TimerStatus::Idle);
    assert_eq!(snapshot.filled_dots(), 0);
}

#[test]
fn long_break_leads_back_to_focus() {
    let mut machine =
        SessionStateMachine::new(standard_settings(), Arc::new(CountingNotifier::default()))
            .unwrap();
    let now = Instant::now();
    for _ in 0..7 {
        machine.skip(now);
    }
    assert_eq!(machine.state().session_type, SessionType::LongBreak);

    machine.start(now);
    let transition = machine.tick(now + Duration::from_secs(15 * 60)).unwrap();
    assert_eq!(transition.finished, SessionType::LongBreak);
    assert_eq!(transition.next, SessionType::Focus);
    assert_eq!(machine.state().completed_in_cycle, 0);
    assert_eq!(machine.stats().completed_sessions, 4);
}

#[test]
fn delayed_tick_still_completes_once() {
    let mut machine =
        SessionStateMachine::new(standard_settings(), Arc::new(CountingNotifier::default()))
            .unwrap();
    let t0 = Instant::now();
    machine.start(t0);

    // Host was suspended for an hour; no intermediate ticks arrived.
    let transition = machine.tick(t0 + Duration::from_secs(3600));
    assert!(transition.is_some());
    assert!(machine.tick(t0 + Duration::from_secs(3601)).is_none());
    assert_eq!(machine.stats().completed_sessions, 1);
}
