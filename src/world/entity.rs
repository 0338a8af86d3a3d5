//! Entity Definitions
//!
//! The record the registry owns for every simulated object, plus the
//! per-object enums that drive border and collision handling.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use serde::{Serialize, Deserialize};

use crate::core::vec2::{Vec2, Direction};
use crate::sched::phase::Phase;
use crate::sched::tick::PhaseCtx;

// =============================================================================
// IDENTITY
// =============================================================================

/// Unique entity identifier (random UUID, never reused).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub uuid::Uuid);

impl EntityId {
    /// Generate a fresh identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of an entity: its type bucket plus its id.
///
/// Entities never move between buckets, so a handle stays valid until
/// the entity is removed.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityHandle {
    /// Type key of the bucket holding the entity
    pub kind: String,
    /// Entity id
    pub id: EntityId,
}

// =============================================================================
// BORDER & COLLISION ENUMS
// =============================================================================

/// Reaction of an entity to the world edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum BorderMethod {
    /// Nothing happens at the edge
    #[default]
    Ignore = 0,
    /// Stops moving while pushing against the edge
    Limit = 1,
    /// May leave fully, then stops while pushing further out
    Hide = 2,
    /// Like `Limit`, and pushed back inside if the world shrinks
    PushLimit = 3,
    /// Like `Hide`, and kept just outside if the world shrinks
    PushHide = 4,
    /// Velocity reverses when pushing against the edge
    Bounce = 5,
    /// Wraps to the opposite edge once pushing past
    Teleport = 6,
    /// Deleted once pushing past
    RemoveObject = 7,
}

impl BorderMethod {
    /// Decode a raw value. Unknown values fall back to `Ignore`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Limit,
            2 => Self::Hide,
            3 => Self::PushLimit,
            4 => Self::PushHide,
            5 => Self::Bounce,
            6 => Self::Teleport,
            7 => Self::RemoveObject,
            _ => Self::Ignore,
        }
    }
}

/// Geometric hitbox of an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum CollisionShape {
    /// Never collides
    #[default]
    Ghost = 0,
    /// Axis-aligned rectangle of the entity's half extents
    Box = 1,
    /// Circle-like hitbox derived from the half extents
    Radius = 2,
}

impl CollisionShape {
    /// Decode a raw value. Unknown values fall back to `Ghost`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Box,
            2 => Self::Radius,
            _ => Self::Ghost,
        }
    }
}

/// Signed per-axis border state, each in `[-4, 4]`.
///
/// | magnitude | meaning |
/// |---|---|
/// | 0 | clear of the edge |
/// | 1 | touching the edge |
/// | 2 | touching and moving outward |
/// | 3 | fully past the edge |
/// | 4 | fully past and still moving outward |
///
/// The sign is the side: negative for the left/top edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BorderState {
    /// X-axis state
    pub x: i8,
    /// Y-axis state
    pub y: i8,
}

// =============================================================================
// CALLBACKS
// =============================================================================

/// Per-phase behavior hook.
pub type PhaseCallback = Box<dyn FnMut(&mut PhaseCtx<'_>) + Send>;

/// Opaque render object produced by an entity's builder.
pub type Drawable = Box<dyn Any + Send>;

/// Optional callback slots, one per phase.
#[derive(Default)]
pub struct Callbacks {
    /// 120 Hz render-prep
    pub render: Option<PhaseCallback>,
    /// 60 Hz logic
    pub logic: Option<PhaseCallback>,
    /// 30 Hz medium-priority work
    pub slow: Option<PhaseCallback>,
    /// 15 Hz low-priority, long running work
    pub basic: Option<PhaseCallback>,
}

impl Callbacks {
    fn slot(&mut self, phase: Phase) -> &mut Option<PhaseCallback> {
        match phase {
            Phase::Render => &mut self.render,
            Phase::Logic => &mut self.logic,
            Phase::Slow => &mut self.slow,
            Phase::Basic => &mut self.basic,
        }
    }

    /// Install a callback for a phase, replacing any existing one.
    pub fn set(&mut self, phase: Phase, callback: PhaseCallback) {
        *self.slot(phase) = Some(callback);
    }

    /// Take the callback out of its slot for the duration of a call.
    pub(crate) fn take(&mut self, phase: Phase) -> Option<PhaseCallback> {
        self.slot(phase).take()
    }

    /// Put a taken callback back, unless the call installed a new one.
    pub(crate) fn restore(&mut self, phase: Phase, callback: PhaseCallback) {
        let slot = self.slot(phase);
        if slot.is_none() {
            *slot = Some(callback);
        }
    }

    /// Whether a callback is installed for a phase.
    pub fn has(&self, phase: Phase) -> bool {
        match phase {
            Phase::Render => self.render.is_some(),
            Phase::Logic => self.logic.is_some(),
            Phase::Slow => self.slow.is_some(),
            Phase::Basic => self.basic.is_some(),
        }
    }
}

// =============================================================================
// ENTITY
// =============================================================================

/// A simulated object.
///
/// Owned by the registry; everything else borrows it while holding the
/// world lock.
pub struct Entity {
    id: EntityId,
    kind: String,
    name: String,

    /// Center position in logical units (origin at world center)
    pub position: Vec2,

    /// Half extents (`x` = half-width, `y` = half-height)
    pub extent: Vec2,

    /// Velocity, integrated on render ticks as `velocity / 10 * speed_delta`
    pub velocity: Vec2,

    /// Last computed border state
    pub on_border: BorderState,

    /// Edge policy
    pub border_method: BorderMethod,

    /// Hitbox shape
    pub collision_shape: CollisionShape,

    /// Preferred rate for border refresh (0 = render phase)
    pub preferred_fps: u16,

    /// Per-phase hooks
    pub callbacks: Callbacks,

    /// Extra data attached by content scripts
    pub store: BTreeMap<String, serde_json::Value>,

    drawable: Drawable,
}

impl Entity {
    /// Create an entity with a fresh id. Everything else defaults to
    /// Ignore/Ghost, zero velocity and no callbacks.
    pub fn new(
        kind: impl Into<String>,
        name: impl Into<String>,
        position: Vec2,
        extent: Vec2,
        drawable: Drawable,
    ) -> Self {
        Self {
            id: EntityId::generate(),
            kind: kind.into(),
            name: name.into(),
            position,
            extent,
            velocity: Vec2::ZERO,
            on_border: BorderState::default(),
            border_method: BorderMethod::default(),
            collision_shape: CollisionShape::default(),
            preferred_fps: 0,
            callbacks: Callbacks::default(),
            store: BTreeMap::new(),
            drawable,
        }
    }

    /// Unique id.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Type key (bucket).
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Secondary, non-unique label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Handle for later lookup.
    pub fn handle(&self) -> EntityHandle {
        EntityHandle {
            kind: self.kind.clone(),
            id: self.id,
        }
    }

    /// Builder output, downcast to its concrete type.
    pub fn drawable<T: Any>(&self) -> Option<&T> {
        (*self.drawable).downcast_ref::<T>()
    }

    /// Mutable builder output, downcast to its concrete type.
    pub fn drawable_mut<T: Any>(&mut self) -> Option<&mut T> {
        (*self.drawable).downcast_mut::<T>()
    }

    /// Install a callback for a phase.
    pub fn on(&mut self, phase: Phase, callback: impl FnMut(&mut PhaseCtx<'_>) + Send + 'static) {
        self.callbacks.set(phase, Box::new(callback));
    }

    /// Distance between centers.
    pub fn distance(&self, other: &Entity) -> f32 {
        self.position.distance(other.position)
    }

    /// Distance and unit direction from this entity toward `other`.
    ///
    /// The direction is `other - self`, normalized, so it points at `other`;
    /// negate it to move away. ZERO for coincident centers.
    pub fn direction_to(&self, other: &Entity) -> Direction {
        Direction::between(self.position, other.position)
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("name", &self.name)
            .field("position", &self.position)
            .field("extent", &self.extent)
            .field("velocity", &self.velocity)
            .field("on_border", &self.on_border)
            .field("border_method", &self.border_method)
            .field("collision_shape", &self.collision_shape)
            .field("preferred_fps", &self.preferred_fps)
            .finish_non_exhaustive()
    }
}
