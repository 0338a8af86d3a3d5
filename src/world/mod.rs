//! Simulation state.
//!
//! Entities, the registry that owns them, and the two systems that act on
//! them every tick: the border state machine and the collision engine.

pub mod size;
pub mod entity;
pub mod registry;
pub mod border;
pub mod collision;
pub mod state;

pub use size::{WorldSize, SizeProvider, FixedSize};
pub use entity::{
    Entity, EntityId, EntityHandle, BorderMethod, BorderState, CollisionShape,
    Callbacks, PhaseCallback, Drawable,
};
pub use registry::Registry;
pub use border::BorderOutcome;
pub use collision::TypeCollisionMethod;
pub use state::{World, SharedWorld};
