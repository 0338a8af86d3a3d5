//! Kernel Configuration
//!
//! Defaults match the stock demo. Every field can be overridden from the
//! environment; values that fail to parse are logged and ignored.

use std::str::FromStr;
use std::time::Duration;
use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::core::rng::{derive_level_seed, DEFAULT_SEED};

/// Runtime settings of the kernel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KernelConfig {
    /// Global FPS ceiling; faster phases are throttled to it
    pub max_fps: u32,
    /// Inject unseeded noise into the perturbed RNG
    pub inconsistent_rand: bool,
    /// Type keys in layer order
    pub object_types: Vec<String>,
    /// Base RNG seed
    pub seed: u64,
    /// Optional level name; mixes into the seed when set
    pub level: Option<String>,
    /// World size refresh cadence in milliseconds
    pub size_poll_ms: u64,
    /// Delay before each phase loop starts, in milliseconds
    pub warmup_ms: u64,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            max_fps: 120,
            inconsistent_rand: true,
            object_types: vec!["object".to_string()],
            seed: DEFAULT_SEED,
            level: None,
            size_poll_ms: 300,
            warmup_ms: 100,
        }
    }
}

impl KernelConfig {
    /// Defaults overridden by `QUADTICK_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns per variable.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(fps) = parse_var::<u32, _>(&lookup, "QUADTICK_MAX_FPS") {
            if fps == 0 {
                warn!("QUADTICK_MAX_FPS must be positive, keeping {}", config.max_fps);
            } else {
                config.max_fps = fps;
            }
        }
        if let Some(raw) = lookup("QUADTICK_INCONSISTENT_RAND") {
            match raw.trim() {
                "true" | "1" => config.inconsistent_rand = true,
                "false" | "0" => config.inconsistent_rand = false,
                other => warn!("Ignoring QUADTICK_INCONSISTENT_RAND={:?}", other),
            }
        }
        if let Some(raw) = lookup("QUADTICK_OBJECT_TYPES") {
            let types: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            if !types.is_empty() {
                config.object_types = types;
            }
        }
        if let Some(seed) = parse_var(&lookup, "QUADTICK_SEED") {
            config.seed = seed;
        }
        if let Some(level) = lookup("QUADTICK_LEVEL").filter(|l| !l.trim().is_empty()) {
            config.level = Some(level.trim().to_string());
        }
        if let Some(ms) = parse_var(&lookup, "QUADTICK_SIZE_POLL_MS") {
            config.size_poll_ms = ms;
        }
        if let Some(ms) = parse_var(&lookup, "QUADTICK_WARMUP_MS") {
            config.warmup_ms = ms;
        }

        config
    }

    /// Seed actually used: the base seed, or the per-level derivation of it.
    pub fn resolved_seed(&self) -> u64 {
        match &self.level {
            Some(level) => derive_level_seed(self.seed, level),
            None => self.seed,
        }
    }

    /// Size poll cadence.
    pub fn size_poll_interval(&self) -> Duration {
        Duration::from_millis(self.size_poll_ms.max(1))
    }

    /// Delay before phase loops start.
    pub fn warmup(&self) -> Duration {
        Duration::from_millis(self.warmup_ms)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring {}={:?}: not a valid value", key, raw);
            None
        }
    }
}
