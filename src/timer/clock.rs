use std::time::{Duration, Instant};

/// Remaining time and progress at a given instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockReading {
    pub remaining: Duration,
    /// Fraction of the configured duration that has elapsed, in `[0, 1]`.
    pub progress: f64,
}

/// Wall-clock countdown for a single session.
///
/// Elapsed time is always derived from the anchor instant rather than from a
/// tick count, so late or missed ticks never skew the reading. Pausing folds
/// the running window into `elapsed_baseline`; resuming re-anchors at the new
/// instant, which is equivalent to restarting with the remaining duration.
#[derive(Debug, Clone)]
pub struct SessionClock {
    configured: Duration,
    /// Time accumulated from earlier running windows; combines with `running_anchor`
    /// to compute the true elapsed duration.
    elapsed_baseline: Duration,
    running_anchor: Option<Instant>,
}

impl SessionClock {
    /// A stopped clock loaded with `duration` and no progress.
    pub fn new(duration: Duration) -> Self {
        Self {
            configured: duration,
            elapsed_baseline: Duration::ZERO,
            running_anchor: None,
        }
    }

    pub fn start(&mut self, duration: Duration, now: Instant) {
        self.load(duration);
        self.running_anchor = Some(now);
    }

    /// Stops the clock and reloads it with a fresh duration.
    pub fn load(&mut self, duration: Duration) {
        *self = Self::new(duration);
    }

    pub fn resume(&mut self, now: Instant) {
        if self.running_anchor.is_none() {
            self.running_anchor = Some(now);
        }
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(anchor) = self.running_anchor.take() {
            self.elapsed_baseline = self
                .elapsed_baseline
                .saturating_add(now.saturating_duration_since(anchor));
        }
    }

    pub fn is_running(&self) -> bool {
        self.running_anchor.is_some()
    }

    pub fn configured(&self) -> Duration {
        self.configured
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.running_anchor {
            Some(anchor) => self
                .elapsed_baseline
                .saturating_add(now.saturating_duration_since(anchor)),
            None => self.elapsed_baseline,
        }
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.configured.saturating_sub(self.elapsed(now))
    }

    pub fn progress(&self, now: Instant) -> f64 {
        if self.configured.is_zero() {
            return 1.0;
        }
        let fraction = self.elapsed(now).as_secs_f64() / self.configured.as_secs_f64();
        fraction.clamp(0.0, 1.0)
    }

    pub fn tick(&self, now: Instant) -> ClockReading {
        ClockReading {
            remaining: self.remaining(now),
            progress: self.progress(now),
        }
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.elapsed(now) >= self.configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_MIN: Duration = Duration::from_secs(300);

    #[test]
    fn reading_is_derived_from_wall_clock() {
        let t0 = Instant::now();
        let mut clock = SessionClock::new(FIVE_MIN);
        clock.start(FIVE_MIN, t0);

        let reading = clock.tick(t0 + Duration::from_secs(60));
        assert_eq!(reading.remaining, Duration::from_secs(240));
        assert!((reading.progress - 0.2).abs() < 1e-9);
        assert!(!clock.is_expired(t0 + Duration::from_secs(299)));
    }

    #[test]
    fn expires_exactly_at_duration_even_with_missed_ticks() {
        let t0 = Instant::now();
        let mut clock = SessionClock::new(FIVE_MIN);
        clock.start(FIVE_MIN, t0);

        assert!(clock.is_expired(t0 + FIVE_MIN));
        let late = clock.tick(t0 + FIVE_MIN * 3);
        assert_eq!(late.remaining, Duration::ZERO);
        assert_eq!(late.progress, 1.0);
    }

    #[test]
    fn pause_preserves_elapsed_progress() {
        let t0 = Instant::now();
        let mut clock = SessionClock::new(FIVE_MIN);
        clock.start(FIVE_MIN, t0);
        clock.pause(t0 + Duration::from_secs(100));

        // Time spent paused does not count.
        let later = t0 + Duration::from_secs(1000);
        assert_eq!(clock.remaining(later), Duration::from_secs(200));

        clock.resume(later);
        assert_eq!(
            clock.remaining(later + Duration::from_secs(50)),
            Duration::from_secs(150)
        );
        assert!(clock.is_expired(later + Duration::from_secs(200)));
    }

    #[test]
    fn double_pause_is_harmless() {
        let t0 = Instant::now();
        let mut clock = SessionClock::new(FIVE_MIN);
        clock.start(FIVE_MIN, t0);
        clock.pause(t0 + Duration::from_secs(10));
        clock.pause(t0 + Duration::from_secs(90));
        assert_eq!(clock.elapsed(t0 + Duration::from_secs(120)), Duration::from_secs(10));
    }

    #[test]
    fn load_resets_progress() {
        let t0 = Instant::now();
        let mut clock = SessionClock::new(FIVE_MIN);
        clock.start(FIVE_MIN, t0);
        clock.load(Duration::from_secs(60));
        assert!(!clock.is_running());
        assert_eq!(clock.progress(t0 + FIVE_MIN), 0.0);
        assert_eq!(clock.remaining(t0 + FIVE_MIN), Duration::from_secs(60));
    }
}
