//! Fixed-cadence frame scheduling for the update loop

use std::time::Duration;

/// Schedules update-loop ticks at a fixed interval
///
/// Times are [`Clock`](crate::Clock) readings. When the caller falls behind by
/// more than one frame the missed frames are dropped rather than replayed, so
/// a stall never produces a burst of catch-up ticks.
#[derive(Debug, Clone)]
pub struct Ticker {
    interval: Duration,
    next: Duration,
}

impl Ticker {
    pub fn new(interval: Duration, now: Duration) -> Self {
        let interval = interval.max(Duration::from_micros(1));
        Self {
            interval,
            next: now + interval,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next frame is due
    pub fn timeout(&self, now: Duration) -> Duration {
        self.next.saturating_sub(now)
    }

    /// Consume the next frame if it is due
    pub fn due(&mut self, now: Duration) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.interval;
        if self.next <= now {
            self.next = now + self.interval;
        }
        true
    }
}
