//! # Quadtick
//!
//! Multi-rate 2D simulation kernel: four independently paced update loops
//! sharing one world, with per-axis border policies and type-filtered
//! collision queries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          QUADTICK                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/            - Primitives                               │
//! │  ├── vec2.rs      - f32 2D vector, distance and direction    │
//! │  └── rng.rs       - Xorshift128+ and the perturbed RNG       │
//! │                                                              │
//! │  world/           - Simulation state                         │
//! │  ├── size.rs      - Canvas size and logical bounds           │
//! │  ├── entity.rs    - Entity record and callback slots         │
//! │  ├── registry.rs  - Type-bucketed entity storage             │
//! │  ├── border.rs    - Border state machine and policies        │
//! │  ├── collision.rs - Hitbox tests and type visibility         │
//! │  └── state.rs     - World aggregate and create hook          │
//! │                                                              │
//! │  sched/           - Scheduling                               │
//! │  ├── phase.rs     - Phases, bands, throttling                │
//! │  ├── clock.rs     - Fixed-step accumulator, rate meter       │
//! │  ├── tick.rs      - One locked phase sweep                   │
//! │  └── runtime.rs   - tokio loops, size poller, shutdown       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Phases
//!
//! | phase  | nominal | owns border refresh for preferred fps |
//! |--------|---------|---------------------------------------|
//! | render | 120 Hz  | `0` or `> 120`                        |
//! | logic  | 60 Hz   | `60..120`                             |
//! | slow   | 30 Hz   | `30..60`                              |
//! | basic  | 15 Hz   | `15..30`                              |
//!
//! Every phase runs every entity's callback for that phase. Only the render
//! phase moves entities and applies border policies.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod core;
pub mod sched;
pub mod world;

// Re-export commonly used types
pub use config::KernelConfig;
pub use crate::core::vec2::{Vec2, Direction};
pub use crate::core::rng::{PerturbedRng, DEFAULT_SEED};
pub use sched::{Kernel, KernelHandle, KernelError, Phase, PhaseCtx, TickInfo, RenderSink, Placement};
pub use world::{
    World, Entity, EntityHandle, BorderMethod, CollisionShape, TypeCollisionMethod, WorldSize,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
