//! Time types for the imprint engine.
//!
//! Simulation time only. Wall clock time is never consulted; every clock is
//! advanced explicitly by the tick driver.

use serde::{Deserialize, Serialize};

/// Simulation time in seconds since the world started
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
pub struct SimTime(f64);

impl SimTime {
    /// Time zero
    #[must_use]
    pub const fn zero() -> Self {
        Self(0.0)
    }

    /// Create from seconds
    #[must_use]
    pub const fn from_secs(seconds: f64) -> Self {
        Self(seconds)
    }

    /// Get seconds
    #[must_use]
    pub const fn as_secs(&self) -> f64 {
        self.0
    }

    /// Seconds elapsed since `earlier`. Negative if `earlier` is in the future.
    #[must_use]
    pub fn elapsed_since(&self, earlier: SimTime) -> f64 {
        self.0 - earlier.0
    }

    /// Time `seconds` after this one
    #[must_use]
    pub fn after(&self, seconds: f64) -> Self {
        Self(self.0 + seconds)
    }
}

impl std::fmt::Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

impl From<f64> for SimTime {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

/// Simulation clock - current time plus a tick counter
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Clock {
    now: SimTime,
    tick: u64,
}

impl Clock {
    /// Create a clock at time zero, tick zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock starting at `now`
    #[must_use]
    pub fn starting_at(now: SimTime) -> Self {
        Self { now, tick: 0 }
    }

    /// Current time
    #[must_use]
    pub const fn now(&self) -> SimTime {
        self.now
    }

    /// Number of ticks advanced so far
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Advance by one tick of `dt` seconds. Negative steps are ignored.
    pub fn advance(&mut self, dt: f64) {
        if dt > 0.0 {
            self.now = self.now.after(dt);
        }
        self.tick += 1;
    }
}
