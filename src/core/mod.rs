//! Core primitives.
//!
//! Math and randomness shared by the world and the scheduler.
//! Nothing in here knows about entities or phases.

pub mod vec2;
pub mod rng;

// Re-export core types
pub use vec2::{Vec2, Direction};
pub use rng::{DeterministicRng, PerturbedRng, DEFAULT_SEED, derive_level_seed};
