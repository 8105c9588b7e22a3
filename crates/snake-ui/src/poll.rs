use std::time::{Duration, Instant};

/// Repeating timer driven by frame times. Starting it makes the first tick
/// due immediately; at most one tick fires per check.
#[derive(Debug, Clone)]
pub struct PollTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl PollTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.next_due = Some(now);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// True when a tick is due at `now`; schedules the following one.
    pub fn due(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        let mut next = due + self.interval;
        if next <= now {
            // fell behind; skip missed ticks instead of bursting
            next = now + self.interval;
        }
        self.next_due = Some(next);
        true
    }

    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}
