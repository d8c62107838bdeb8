//! Elapsed-time tracking
//!
//! A [`Countdown`] measures time against timestamps handed to it by the
//! caller, so the same code runs against a wall clock or a scripted one.
//! Timestamps are [`Duration`]s since an arbitrary epoch chosen by the
//! [`Clock`] that produces them.

use std::{cell::Cell, rc::Rc, time::Duration};

use serde::{Deserialize, Serialize};
use web_time::Instant;

/// Source of monotonic timestamps
pub trait Clock {
    /// Current time since this clock's epoch
    fn now(&self) -> Duration;
}

/// Wall clock backed by [`web_time::Instant`], usable on native and wasm targets
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    /// Creates a clock whose epoch is the moment of creation
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}

/// Scripted clock that only moves when told to
///
/// Clones share the same reading, so a test can keep one handle while a
/// driver owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Creates a clock reading zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock to an absolute reading
    pub fn set(&self, now: Duration) {
        self.now.set(now);
    }

    /// Moves the clock forward
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Elapsed-time tracker with reset
///
/// An unstarted countdown reports zero elapsed time and never expires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Countdown {
    origin: Option<Duration>,
}

impl Countdown {
    /// Begins measuring from `now`
    pub fn start(&mut self, now: Duration) {
        self.origin = Some(now);
    }

    /// Sets the elapsed time back to zero without stopping measurement
    pub fn reset(&mut self, now: Duration) {
        self.origin = Some(now);
    }

    /// Whether [`Countdown::start`] has been called
    pub fn is_running(&self) -> bool {
        self.origin.is_some()
    }

    /// Time elapsed between the last start/reset and `now`
    ///
    /// Saturates at zero if `now` precedes the origin.
    pub fn elapsed(&self, now: Duration) -> Duration {
        self.origin
            .map_or(Duration::ZERO, |origin| now.saturating_sub(origin))
    }

    /// Whether at least `threshold` has elapsed
    pub fn expired(&self, threshold: Duration, now: Duration) -> bool {
        self.is_running() && self.elapsed(now) >= threshold
    }

    /// Moment at which `threshold` elapses, if running
    pub fn deadline(&self, threshold: Duration) -> Option<Duration> {
        self.origin.map(|origin| origin + threshold)
    }

    /// Time left until `threshold` elapses, zero once expired
    pub fn remaining(&self, threshold: Duration, now: Duration) -> Duration {
        threshold.saturating_sub(self.elapsed(now))
    }
}
