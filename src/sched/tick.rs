//! Phase Sweep
//!
//! One tick of one phase, run while holding the world lock:
//!
//! 1. refresh border state for entities whose preferred rate this phase owns
//! 2. run the entity's callback for this phase
//! 3. (render only) apply the border policy, then hand the entity to the sink
//!
//! Entities are visited in layer order over a snapshot of handles taken at
//! the start of the sweep. Anything removed mid-sweep is skipped; anything
//! created mid-sweep is first visited on the next tick.

use tracing::debug;

use crate::sched::phase::Phase;
use crate::world::border::{self, BorderOutcome};
use crate::world::collision;
use crate::world::entity::{Entity, EntityHandle};
use crate::world::size::WorldSize;
use crate::world::state::World;

/// Read-only tick descriptor handed to callbacks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickInfo {
    /// Phase being run
    pub phase: Phase,
    /// Achieved rate, sampled once per second
    pub fps: u32,
    /// Ticks fired so far in the current second
    pub frame: u32,
    /// Throttling multiplier for per-tick quantities
    pub speed_delta: f32,
}

impl TickInfo {
    /// Descriptor for the first tick of an unthrottled phase.
    pub fn first(phase: Phase) -> Self {
        Self {
            phase,
            fps: phase.nominal_hz(),
            frame: 0,
            speed_delta: 1.0,
        }
    }
}

/// What a callback sees: the whole world plus the entity it belongs to.
pub struct PhaseCtx<'a> {
    /// The locked world
    pub world: &'a mut World,
    /// Handle of the entity whose callback is running
    pub this: &'a EntityHandle,
    /// Tick descriptor
    pub tick: &'a TickInfo,
}

impl PhaseCtx<'_> {
    /// The entity this callback belongs to, if it still exists.
    pub fn entity(&self) -> Option<&Entity> {
        self.world.objects.get(self.this)
    }

    /// Mutable access to the entity this callback belongs to.
    pub fn entity_mut(&mut self) -> Option<&mut Entity> {
        self.world.objects.get_mut(self.this)
    }

    /// Current world size.
    pub fn size(&self) -> &WorldSize {
        &self.world.size
    }

    /// Everything this entity collides with.
    pub fn colliding_any(&self) -> Vec<&Entity> {
        match self.entity() {
            Some(me) => collision::colliding_any(&self.world.objects, me),
            None => Vec::new(),
        }
    }

    /// Entities of one type this entity collides with.
    pub fn colliding_type(&self, kind: &str) -> Vec<&Entity> {
        match self.entity() {
            Some(me) => collision::colliding_type(&self.world.objects, me, kind),
            None => Vec::new(),
        }
    }

    /// Entities of one type and name this entity collides with.
    pub fn colliding_name(&self, kind: &str, name: &str) -> Vec<&Entity> {
        match self.entity() {
            Some(me) => collision::colliding_name(&self.world.objects, me, kind, name),
            None => Vec::new(),
        }
    }

    /// Delete this entity. Its remaining work for the tick is skipped.
    pub fn remove_self(&mut self) -> bool {
        self.world.objects.remove(self.this).is_some()
    }
}

// =============================================================================
// RENDER SINK
// =============================================================================

/// Screen-space target for one entity, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Placement {
    /// Map an entity's logical box to pixels.
    pub fn of(entity: &Entity, size: &WorldSize) -> Self {
        Self {
            x: (entity.position.x - entity.extent.x) * size.scale + size.real_width / 2.0,
            y: (entity.position.y - entity.extent.y) * size.scale + size.real_height / 2.0,
            width: entity.extent.x * 2.0 * size.scale,
            height: entity.extent.y * 2.0 * size.scale,
        }
    }
}

/// Rendering collaborator fed after every render-phase policy pass.
pub trait RenderSink: Send {
    /// Move/resize/redraw the entity's drawable.
    fn present(&mut self, entity: &mut Entity, placement: Placement);
}

/// Sink that draws nothing. Used headless.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl RenderSink for NullSink {
    fn present(&mut self, _entity: &mut Entity, _placement: Placement) {}
}

// =============================================================================
// SWEEP
// =============================================================================

/// Result of one phase sweep.
#[derive(Debug, Clone, Default)]
pub struct PhaseReport {
    /// Entities visited
    pub visited: usize,
    /// Entities whose border state was refreshed
    pub refreshed: Vec<EntityHandle>,
    /// Entities deleted by their border policy
    pub removed: Vec<EntityHandle>,
}

/// Run one tick of `tick.phase` over every entity.
pub fn run_phase(world: &mut World, tick: &TickInfo, sink: &mut dyn RenderSink) -> PhaseReport {
    let phase = tick.phase;
    let mut report = PhaseReport::default();

    for handle in world.objects.handles() {
        let size = world.size;
        let Some(entity) = world.objects.get_mut(&handle) else {
            // Removed earlier in this sweep
            continue;
        };
        report.visited += 1;

        if phase.owns(entity.preferred_fps) {
            border::refresh(entity, &size);
            report.refreshed.push(handle.clone());
        }

        if let Some(mut callback) = entity.callbacks.take(phase) {
            let mut ctx = PhaseCtx {
                world: &mut *world,
                this: &handle,
                tick,
            };
            callback(&mut ctx);

            if let Some(entity) = world.objects.get_mut(&handle) {
                entity.callbacks.restore(phase, callback);
            }
        }

        if phase != Phase::Render {
            continue;
        }

        let size = world.size;
        let Some(entity) = world.objects.get_mut(&handle) else {
            continue;
        };

        match border::apply_policy(entity, &size, tick.speed_delta) {
            BorderOutcome::Keep => {
                let placement = Placement::of(entity, &size);
                sink.present(entity, placement);
            }
            BorderOutcome::Remove => {
                debug!(kind = %handle.kind, id = %handle.id, "removed at border");
                world.objects.remove(&handle);
                report.removed.push(handle);
            }
        }
    }

    report
}

// =============================================================================
// TESTS
// =============================================================================
