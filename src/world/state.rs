//! World State
//!
//! The single shared simulation state: world size, registry and RNG.
//! The kernel wraps it in one mutex; every phase sweep, size update and
//! structural change goes through that lock.

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::KernelConfig;
use crate::core::rng::PerturbedRng;
use crate::core::vec2::Vec2;
use crate::world::entity::{Drawable, Entity, EntityHandle};
use crate::world::registry::Registry;
use crate::world::size::WorldSize;

/// World behind the kernel's lock.
pub type SharedWorld = Arc<Mutex<World>>;

/// Everything the phases mutate.
#[derive(Debug)]
pub struct World {
    /// Current size snapshot
    pub size: WorldSize,
    /// All entities
    pub objects: Registry,
    /// Process-wide RNG, only drawn from under the lock
    pub rng: PerturbedRng,
}

impl World {
    /// Empty world.
    pub fn new(size: WorldSize, rng: PerturbedRng) -> Self {
        Self {
            size,
            objects: Registry::new(),
            rng,
        }
    }

    /// Empty world with layers and RNG set up from config.
    pub fn from_config(config: &KernelConfig, size: WorldSize) -> Self {
        Self {
            size,
            objects: Registry::with_layers(&config.object_types),
            rng: PerturbedRng::new(config.resolved_seed(), config.inconsistent_rand),
        }
    }

    /// Create an entity and register it.
    ///
    /// `builder` runs once, before registration, with the current size.
    #[allow(clippy::too_many_arguments)]
    pub fn create<F>(
        &mut self,
        kind: &str,
        name: &str,
        x: f32,
        y: f32,
        half_width: f32,
        half_height: f32,
        builder: F,
    ) -> EntityHandle
    where
        F: FnOnce(&WorldSize) -> Drawable,
    {
        let drawable = builder(&self.size);
        let entity = Entity::new(
            kind,
            name,
            Vec2::new(x, y),
            Vec2::new(half_width, half_height),
            drawable,
        );
        self.objects.insert(entity)
    }

    /// Recompute the size snapshot from real pixel dimensions.
    ///
    /// A zero, negative or non-finite dimension keeps the previous size.
    pub fn resize(&mut self, real_width: f32, real_height: f32) -> bool {
        let Some(size) = WorldSize::checked_from_real(real_width, real_height) else {
            return false;
        };
        if size == self.size {
            return false;
        }
        self.size = size;
        true
    }

    /// Wrap for sharing between tasks.
    pub fn into_shared(self) -> SharedWorld {
        Arc::new(Mutex::new(self))
    }
}

impl Default for World {
    fn default() -> Self {
        Self::from_config(&KernelConfig::default(), WorldSize::default())
    }
}
