//! Fixed-Step Clock
//!
//! Accumulates elapsed time in units of one tick period and releases whole
//! ticks one at a time. The fractional remainder carries over, so a loop
//! that wakes late catches up instead of losing ticks.

use std::time::Duration;
use tokio::time::Instant;

const ONE_SECOND: Duration = Duration::from_secs(1);

/// Fixed-step tick accumulator.
#[derive(Clone, Debug)]
pub struct FixedStepClock {
    period_ns: f64,
    accumulated: f64,
    last: Instant,
}

impl FixedStepClock {
    /// Start a clock at `now` with the given tick period.
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period_ns: (period.as_nanos() as f64).max(1.0),
            accumulated: 0.0,
            last: now,
        }
    }

    /// Add the time elapsed since the previous call.
    pub fn advance(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last);
        self.accumulated += elapsed.as_nanos() as f64 / self.period_ns;
        self.last = now;
    }

    /// Consume one tick if a whole one has accumulated.
    pub fn try_fire(&mut self) -> bool {
        if self.accumulated >= 1.0 {
            self.accumulated -= 1.0;
            true
        } else {
            false
        }
    }

    /// Time left until the next whole tick is available.
    pub fn until_next(&self) -> Duration {
        let missing = (1.0 - self.accumulated).max(0.0);
        Duration::from_nanos((missing * self.period_ns).ceil() as u64)
    }

    /// Pending ticks, including the fractional part.
    pub fn accumulated(&self) -> f64 {
        self.accumulated
    }
}

/// Counts fired ticks and samples the achieved rate once per second.
#[derive(Clone, Debug)]
pub struct RateMeter {
    window_start: Instant,
    frames: u32,
    current: u32,
}

impl RateMeter {
    /// Start measuring; `initial_fps` is reported until the first sample.
    pub fn new(initial_fps: u32, now: Instant) -> Self {
        Self {
            window_start: now,
            frames: 0,
            current: initial_fps,
        }
    }

    /// Last sampled rate.
    pub fn fps(&self) -> u32 {
        self.current
    }

    /// Ticks fired so far in the current second.
    pub fn frame(&self) -> u32 {
        self.frames
    }

    /// Count one tick. Returns the new rate when a second has passed.
    pub fn record(&mut self, now: Instant) -> Option<u32> {
        self.frames += 1;
        if now.saturating_duration_since(self.window_start) >= ONE_SECOND {
            self.current = self.frames;
            self.window_start += ONE_SECOND;
            self.frames = 0;
            return Some(self.current);
        }
        None
    }
}
