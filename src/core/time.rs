//! Simulation timers

use serde::{Deserialize, Serialize};

/// Accumulating repeat timer compared against a fixed period.
///
/// Fires at most once per [`Timer::tick`]; the accumulator resets to zero
/// when it fires, so long frames do not queue up extra firings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    period: f32,
    elapsed: f32,
}

impl Timer {
    /// Create a timer with the given period in seconds
    #[must_use]
    pub fn new(period: f32) -> Self {
        Self {
            period: period.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Create a timer that fires on the next tick
    #[must_use]
    pub fn ready(period: f32) -> Self {
        let mut timer = Self::new(period);
        timer.force();
        timer
    }

    /// Advance by `dt`; returns `true` if the period elapsed
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.period {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }

    /// Make the next tick fire regardless of elapsed time
    pub fn force(&mut self) {
        self.elapsed = self.period;
    }
}

/// One-shot countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Countdown {
    remaining: f32,
}

impl Countdown {
    /// Start counting down from `seconds`
    #[must_use]
    pub fn new(seconds: f32) -> Self {
        Self {
            remaining: seconds.max(0.0),
        }
    }

    /// Advance by `dt`; returns `true` on the tick the countdown reaches zero
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.remaining <= 0.0 {
            return false;
        }
        self.remaining -= dt;
        self.remaining <= 0.0
    }

    /// Seconds left (zero once finished)
    #[must_use]
    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    /// Check whether the countdown is still running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.remaining > 0.0
    }
}
