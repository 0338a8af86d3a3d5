//! Phases
//!
//! The four independently clocked update passes, their nominal rates, and
//! which preferred-frequency band each one owns for border refresh.

use std::fmt;
use std::time::Duration;
use serde::{Serialize, Deserialize};

/// One of the four update passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    /// 120 Hz render-prep and position integration
    Render,
    /// 60 Hz primary logic
    Logic,
    /// 30 Hz medium-priority work
    Slow,
    /// 15 Hz low-priority, long running work
    Basic,
}

impl Phase {
    /// Every phase, fastest first.
    pub const ALL: [Phase; 4] = [Phase::Render, Phase::Logic, Phase::Slow, Phase::Basic];

    /// Target frequency before any FPS ceiling.
    pub const fn nominal_hz(self) -> u32 {
        match self {
            Phase::Render => 120,
            Phase::Logic => 60,
            Phase::Slow => 30,
            Phase::Basic => 15,
        }
    }

    /// Lowercase name for logs.
    pub const fn name(self) -> &'static str {
        match self {
            Phase::Render => "render",
            Phase::Logic => "logic",
            Phase::Slow => "slow",
            Phase::Basic => "basic",
        }
    }

    /// Phase that refreshes border state for a preferred frequency.
    ///
    /// `120` exactly and `1..15` fall in no band, so those entities keep
    /// whatever border state they last had.
    pub fn band_of(preferred_fps: u16) -> Option<Phase> {
        match preferred_fps {
            0 => Some(Phase::Render),
            f if f > 120 => Some(Phase::Render),
            60..=119 => Some(Phase::Logic),
            30..=59 => Some(Phase::Slow),
            15..=29 => Some(Phase::Basic),
            _ => None,
        }
    }

    /// Whether this phase refreshes border state for the frequency.
    pub fn owns(self, preferred_fps: u16) -> bool {
        Self::band_of(preferred_fps) == Some(self)
    }

    /// Effective rate under an FPS ceiling.
    pub fn timing(self, max_fps: u32) -> PhaseTiming {
        PhaseTiming::new(self.nominal_hz(), max_fps)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rate a phase actually runs at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhaseTiming {
    /// Requested rate
    pub nominal_hz: u32,
    /// Rate after applying the ceiling
    pub effective_hz: u32,
    /// `nominal / effective`; 1.0 when not throttled
    pub speed_delta: f32,
}

impl PhaseTiming {
    /// Throttle `nominal_hz` to `max_fps` when it exceeds it.
    pub fn new(nominal_hz: u32, max_fps: u32) -> Self {
        let ceiling = max_fps.max(1);
        if nominal_hz > ceiling {
            Self {
                nominal_hz,
                effective_hz: ceiling,
                speed_delta: nominal_hz as f32 / ceiling as f32,
            }
        } else {
            Self {
                nominal_hz,
                effective_hz: nominal_hz.max(1),
                speed_delta: 1.0,
            }
        }
    }

    /// Wall-clock length of one tick.
    pub fn tick_period(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.effective_hz.max(1)))
    }
}
