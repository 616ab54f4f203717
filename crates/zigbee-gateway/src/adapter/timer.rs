// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deadline timers polled by the adapter event loop.

use std::time::{Duration, Instant};

/// A restartable timer with an optional repeat.
///
/// `start()` always replaces the current deadline, so restarting a timer
/// never stacks a second expiry.
#[derive(Debug, Clone)]
pub struct Timer {
    interval: Duration,
    single_shot: bool,
    deadline: Option<Instant>,
}

impl Timer {
    pub fn single_shot(interval: Duration) -> Self {
        Self {
            interval,
            single_shot: true,
            deadline: None,
        }
    }

    pub fn periodic(interval: Duration) -> Self {
        Self {
            interval,
            single_shot: false,
            deadline: None,
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` once per expiry. Periodic timers re-arm relative to `now`.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = if self.single_shot {
                    None
                } else {
                    Some(now + self.interval)
                };
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_shot_fires_once() {
        let t0 = Instant::now();
        let mut timer = Timer::single_shot(Duration::from_millis(10));
        assert!(!timer.poll(t0));

        timer.start(t0);
        assert!(!timer.poll(t0 + Duration::from_millis(9)));
        assert!(timer.poll(t0 + Duration::from_millis(10)));
        assert!(!timer.is_active());
        assert!(!timer.poll(t0 + Duration::from_millis(50)));
    }

    #[test]
    fn test_restart_replaces_deadline() {
        let t0 = Instant::now();
        let mut timer = Timer::single_shot(Duration::from_millis(10));
        timer.start(t0);
        timer.start(t0 + Duration::from_millis(8));
        assert!(!timer.poll(t0 + Duration::from_millis(12)));
        assert!(timer.poll(t0 + Duration::from_millis(18)));
    }

    #[test]
    fn test_periodic_rearms() {
        let t0 = Instant::now();
        let mut timer = Timer::periodic(Duration::from_secs(1));
        timer.start(t0);
        assert!(timer.poll(t0 + Duration::from_secs(1)));
        assert!(timer.is_active());
        assert_eq!(timer.deadline(), Some(t0 + Duration::from_secs(2)));
    }
}
