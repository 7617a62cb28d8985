//! Caller-pumped interval trigger for periodic status reports.
//!
//! The reporter never owns a timer thread; the embedding event loop asks
//! `due(now)` whenever it wakes up. Change-driven callers skip this entirely
//! and call `send_status` directly.

use std::time::{Duration, Instant};

/// Fixed-interval status trigger.
#[derive(Debug, Clone)]
pub struct StatusSchedule {
    interval: Duration,
    next_due: Instant,
}

impl StatusSchedule {
    /// Create a schedule whose first tick is one interval from now.
    pub fn new(interval: Duration) -> Self {
        Self::starting_at(interval, Instant::now())
    }

    /// Create a schedule anchored at an explicit start time.
    pub fn starting_at(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now + interval,
        }
    }

    /// True when a status report is due; advances to the next tick.
    pub fn due(&mut self, now: Instant) -> bool {
        if now >= self.next_due {
            self.next_due = now + self.interval;
            true
        } else {
            false
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_due_before_first_interval() {
        let start = Instant::now();
        let mut schedule = StatusSchedule::starting_at(Duration::from_secs(5), start);
        assert!(!schedule.due(start));
        assert!(!schedule.due(start + Duration::from_secs(4)));
    }

    #[test]
    fn due_advances_the_next_tick() {
        let start = Instant::now();
        let mut schedule = StatusSchedule::starting_at(Duration::from_secs(5), start);

        let first_tick = start + Duration::from_secs(5);
        assert!(schedule.due(first_tick));
        assert!(!schedule.due(first_tick));
        assert!(schedule.due(first_tick + Duration::from_secs(5)));
    }
}
