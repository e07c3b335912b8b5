//! Leading + trailing publish throttle
//!
//! The first trigger after a quiet period fires immediately and opens a
//! window. Triggers inside the window only mark the window dirty; when it
//! closes a dirty window fires once more and opens the next one. At most one
//! publish happens per interval and the last trigger is never lost.
//!
//! Time is passed in rather than read, so the schedule is deterministic.

use std::time::Duration;
use tokio::time::Instant;

/// Outcome of [`UpdateScheduler::trigger`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Publish now
    Fire,
    /// Publish when the current window closes
    Deferred,
}

#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    interval: Duration,
    window_end: Option<Instant>,
    pending: bool,
}

impl UpdateScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            window_end: None,
            pending: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Request a publish at `now`
    pub fn trigger(&mut self, now: Instant) -> Trigger {
        match self.window_end {
            Some(end) if now < end => {
                self.pending = true;
                Trigger::Deferred
            }
            _ => {
                self.window_end = Some(now + self.interval);
                self.pending = false;
                Trigger::Fire
            }
        }
    }

    /// Returns true if a deferred publish is due at `now`
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.window_end {
            Some(end) if now >= end => {
                if self.pending {
                    self.pending = false;
                    self.window_end = Some(now + self.interval);
                    true
                } else {
                    self.window_end = None;
                    false
                }
            }
            _ => false,
        }
    }

    /// When the deferred publish is due, if one is waiting
    pub fn deadline(&self) -> Option<Instant> {
        if self.pending {
            self.window_end
        } else {
            None
        }
    }

    /// Drop any deferred publish and close the window
    pub fn cancel(&mut self) {
        self.window_end = None;
        self.pending = false;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: Duration = Duration::from_millis(100);

    #[test]
    fn test_first_trigger_fires() {
        let mut scheduler = UpdateScheduler::new(INTERVAL);
        assert_eq!(scheduler.trigger(Instant::now()), Trigger::Fire);
        assert!(scheduler.deadline().is_none());
    }

    #[test]
    fn test_burst_fires_leading_and_trailing_once() {
        let mut scheduler = UpdateScheduler::new(INTERVAL);
        let start = Instant::now();
        let mut fires = 0;

        for i in 0..50 {
            let now = start + Duration::from_millis(i);
            if scheduler.trigger(now) == Trigger::Fire {
                fires += 1;
            }
        }
        assert_eq!(fires, 1);
        assert_eq!(scheduler.deadline(), Some(start + INTERVAL));

        assert!(!scheduler.poll(start + Duration::from_millis(99)));
        if scheduler.poll(start + INTERVAL) {
            fires += 1;
        }
        assert!(!scheduler.poll(start + INTERVAL * 2));
        assert!(!scheduler.poll(start + INTERVAL * 3));

        assert_eq!(fires, 2);
    }

    #[test]
    fn test_trailing_opens_new_window() {
        let mut scheduler = UpdateScheduler::new(INTERVAL);
        let start = Instant::now();

        scheduler.trigger(start);
        scheduler.trigger(start + Duration::from_millis(10));
        assert!(scheduler.poll(start + INTERVAL));

        let next = start + INTERVAL + Duration::from_millis(5);
        assert_eq!(scheduler.trigger(next), Trigger::Deferred);
        assert_eq!(scheduler.deadline(), Some(start + INTERVAL * 2));
    }

    #[test]
    fn test_quiet_period_fires_immediately() {
        let mut scheduler = UpdateScheduler::new(INTERVAL);
        let start = Instant::now();

        scheduler.trigger(start);
        assert_eq!(scheduler.trigger(start + INTERVAL * 5), Trigger::Fire);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let mut scheduler = UpdateScheduler::new(INTERVAL);
        let start = Instant::now();

        scheduler.trigger(start);
        scheduler.trigger(start + Duration::from_millis(1));
        assert!(scheduler.is_pending());

        scheduler.cancel();
        assert!(!scheduler.is_pending());
        assert!(!scheduler.poll(start + INTERVAL));
        assert_eq!(scheduler.trigger(start + Duration::from_millis(2)), Trigger::Fire);
    }
}
