//! Frame timing.

use std::time::Instant;

/// Measures the time between frames, clamped to an upper bound so a hitch
/// never produces one huge simulation step.
#[derive(Debug, Clone)]
pub struct FrameClock {
    max_dt: f32,
    last: Instant,
}

impl FrameClock {
    /// A clock starting now.
    #[must_use]
    pub fn new(max_dt: f32) -> Self {
        Self::starting_at(max_dt, Instant::now())
    }

    /// A clock whose first tick measures from `start`.
    #[must_use]
    pub fn starting_at(max_dt: f32, start: Instant) -> Self {
        Self { max_dt, last: start }
    }

    /// Largest `dt` a tick returns, in seconds.
    #[must_use]
    pub fn max_dt(&self) -> f32 {
        self.max_dt
    }

    /// Seconds since the previous tick, at most `max_dt`.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Seconds since the previous tick, clamped to [`max_dt`](Self::max_dt).
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let elapsed = now.saturating_duration_since(self.last).as_secs_f32();
        self.last = now;
        elapsed.min(self.max_dt)
    }
}
