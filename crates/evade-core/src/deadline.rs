#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A monotonic "not before" gate.
///
/// `ready(now)` is `now >= next`; `fire(now, interval)` moves the gate to `now + interval`.
/// Times are seconds on the host's clock.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Deadline {
    next: f64,
}

impl Deadline {
    pub const fn new() -> Self {
        Self { next: 0.0 }
    }

    /// Gate that opens at `at`.
    pub const fn at(at: f64) -> Self {
        Self { next: at }
    }

    pub fn next(&self) -> f64 {
        self.next
    }

    pub fn ready(&self, now: f64) -> bool {
        now >= self.next
    }

    pub fn fire(&mut self, now: f64, interval: f64) {
        self.next = now + interval.max(0.0);
    }

    /// Fire only if ready. Returns whether the gate fired.
    pub fn try_fire(&mut self, now: f64, interval: f64) -> bool {
        if !self.ready(now) {
            return false;
        }
        self.fire(now, interval);
        true
    }

    pub fn reset(&mut self) {
        self.next = 0.0;
    }
}
