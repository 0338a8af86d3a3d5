//! Collision Detection
//!
//! Brute-force pairwise tests between entities, filtered first by
//! per-type visibility rules and then by each entity's hitbox shape.
//!
//! ## Hitboxes
//!
//! - `Box`: axis-aligned rectangle of the half extents (strict overlap).
//! - `Radius`: circle whose radius is `hypot(w, h) / (π / 2.25)`.
//! - `Box` vs `Radius`: the box is sampled on a grid and each sample is
//!   tested against the circle. The grid step and the `π / 2.25` factor are
//!   tuned constants, not derived geometry.

use std::f32::consts::PI;
use serde::{Serialize, Deserialize};

use crate::core::vec2::hypot;
use crate::world::entity::{CollisionShape, Entity};
use crate::world::registry::Registry;

/// Divisor turning the extent diagonal into a circle radius.
pub const CIRCLE_FACTOR: f32 = (std::f64::consts::PI / 2.25) as f32;

/// Upper bound on grid columns/rows sampled across a box.
pub const MAX_SAMPLES_PER_AXIS: f32 = 4096.0;

/// Which other types a type can collide with.
///
/// `SameType` and `OtherType` are the "Self" and "Other" rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum TypeCollisionMethod {
    /// Collides with every type
    #[default]
    Any = 0,
    /// Never reports or receives collisions
    Ghost = 1,
    /// Only collides within its own type
    SameType = 2,
    /// Only collides with other types
    OtherType = 3,
}

impl TypeCollisionMethod {
    /// Decode a raw value. Unknown values fall back to `Any`.
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Ghost,
            2 => Self::SameType,
            3 => Self::OtherType,
            _ => Self::Any,
        }
    }
}

impl From<u8> for TypeCollisionMethod {
    fn from(value: u8) -> Self {
        Self::from_u8(value)
    }
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Circle radius equivalent to an entity's half extents.
#[inline]
pub fn circle_radius(entity: &Entity) -> f32 {
    hypot(entity.extent.x, entity.extent.y) / CIRCLE_FACTOR
}

/// Whether two entities' hitboxes touch.
///
/// Ghost shapes and an entity paired with itself never collide.
pub fn collides(a: &Entity, b: &Entity) -> bool {
    if a.id() == b.id() {
        return false;
    }

    match (a.collision_shape, b.collision_shape) {
        (CollisionShape::Ghost, _) | (_, CollisionShape::Ghost) => false,
        (CollisionShape::Box, CollisionShape::Box) => boxes_overlap(a, b),
        (CollisionShape::Radius, CollisionShape::Radius) => radii_overlap(a, b),
        (CollisionShape::Box, CollisionShape::Radius) => box_hits_circle(a, b),
        (CollisionShape::Radius, CollisionShape::Box) => box_hits_circle(b, a),
    }
}

fn boxes_overlap(a: &Entity, b: &Entity) -> bool {
    let (pa, ea) = (a.position, a.extent);
    let (pb, eb) = (b.position, b.extent);

    pa.x + ea.x > pb.x - eb.x
        && pa.x - ea.x < pb.x + eb.x
        && pa.y + ea.y > pb.y - eb.y
        && pa.y - ea.y < pb.y + eb.y
}

fn radii_overlap(a: &Entity, b: &Entity) -> bool {
    let reach = hypot(a.extent.x + b.extent.x, a.extent.y + b.extent.y) / CIRCLE_FACTOR;
    a.distance(b) <= reach
}

/// Grid spacing across a box for a circle of the given extent.
fn sample_step(circle_extent: f32, box_extent: f32) -> f32 {
    let floor = box_extent * 2.0 / MAX_SAMPLES_PER_AXIS;
    let step = (circle_extent / PI).max(floor);
    if step > 0.0 {
        step
    } else {
        f32::INFINITY
    }
}

/// Sample points over the box and test each against the circle.
fn box_hits_circle(bx: &Entity, circle: &Entity) -> bool {
    let radius = circle_radius(circle);
    let (center, ext) = (bx.position, bx.extent);
    let target = circle.position;

    // Too far away for any sample to reach
    let dist = bx.distance(circle);
    if dist > radius + ext.x * 2.0 && dist > radius + ext.y * 2.0 {
        return false;
    }

    // Center inside the box: some grid point is always within the radius
    if (target.x - center.x).abs() <= ext.x && (target.y - center.y).abs() <= ext.y {
        return true;
    }

    let step_x = sample_step(circle.extent.x, ext.x);
    let step_y = sample_step(circle.extent.y, ext.y);

    let hits = |ox: f32, oy: f32| hypot(center.x + ox - target.x, center.y + oy - target.y) <= radius;

    let mut w = -ext.x;
    while w <= ext.x {
        let mut h = -ext.y;
        while h <= ext.y {
            if hits(w, h) {
                return true;
            }
            h += step_y;
        }

        // Closing row of this column
        if hits(w, ext.y) {
            return true;
        }
        w += step_x;
    }

    // Closing column
    let mut h = -ext.y;
    while h <= ext.y {
        if hits(ext.x, h) {
            return true;
        }
        h += step_y;
    }

    // Closing corner
    hits(ext.x, ext.y)
}

// =============================================================================
// TYPE FILTER
// =============================================================================

/// Whether a subject type is allowed to see a target type at all.
pub fn type_visible(registry: &Registry, subject_kind: &str, target_kind: &str) -> bool {
    let subject = registry.type_collision(subject_kind);
    let target = registry.type_collision(target_kind);
    let same = subject_kind == target_kind;

    let subject_blocks = subject == TypeCollisionMethod::Ghost
        || (!same && subject == TypeCollisionMethod::SameType)
        || (same && subject == TypeCollisionMethod::OtherType);

    let target_blocks = target == TypeCollisionMethod::Ghost
        || (!same && target == TypeCollisionMethod::SameType);

    !subject_blocks && !target_blocks
}

/// Every entity the subject collides with, across all visible types.
pub fn colliding_any<'a>(registry: &'a Registry, subject: &Entity) -> Vec<&'a Entity> {
    let mut hits = Vec::new();
    for kind in registry.layers() {
        if !type_visible(registry, subject.kind(), kind) {
            continue;
        }
        hits.extend(registry.of_type(kind).iter().filter(|other| collides(subject, other)));
    }
    hits
}

/// Entities of one type the subject collides with.
pub fn colliding_type<'a>(registry: &'a Registry, subject: &Entity, kind: &str) -> Vec<&'a Entity> {
    if !type_visible(registry, subject.kind(), kind) {
        return Vec::new();
    }
    registry
        .of_type(kind)
        .iter()
        .filter(|other| collides(subject, other))
        .collect()
}

/// Entities of one type and name the subject collides with.
pub fn colliding_name<'a>(
    registry: &'a Registry,
    subject: &Entity,
    kind: &str,
    name: &str,
) -> Vec<&'a Entity> {
    if !type_visible(registry, subject.kind(), kind) {
        return Vec::new();
    }
    registry
        .of_type(kind)
        .iter()
        .filter(|other| other.name() == name && collides(subject, other))
        .collect()
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use proptest::prelude::*;

    fn shape(kind: &str, name: &str, shape: CollisionShape, x: f32, y: f32, w: f32, h: f32) -> Entity {
        let mut e = Entity::new(kind, name, Vec2::new(x, y), Vec2::new(w, h), Box::new(()));
        e.collision_shape = shape;
        e
    }

    fn boxed(x: f32, y: f32, w: f32, h: f32) -> Entity {
        shape("object", "box", CollisionShape::Box, x, y, w, h)
    }

    fn round(x: f32, y: f32, w: f32, h: f32) -> Entity {
        shape("object", "circle", CollisionShape::Radius, x, y, w, h)
    }

    #[test]
    fn test_box_box_overlap() {
        let a = boxed(0.0, 0.0, 4.0, 4.0);
        assert!(collides(&a, &boxed(7.0, 3.0, 4.0, 4.0)));
        assert!(!collides(&a, &boxed(20.0, 0.0, 4.0, 4.0)));
        // Edges exactly touching do not overlap
        assert!(!collides(&a, &boxed(8.0, 0.0, 4.0, 4.0)));
        // Overlap on x only
        assert!(!collides(&a, &boxed(2.0, 9.0, 4.0, 4.0)));
    }

    #[test]
    fn test_radius_radius_threshold() {
        let a = round(0.0, 0.0, 3.0, 4.0);
        let b = round(0.0, 0.0, 3.0, 4.0);
        // hypot(6, 8) = 10, reach = 10 / (π / 2.25) ≈ 7.16
        let reach = 10.0 / CIRCLE_FACTOR;

        let mut near = b;
        near.position = Vec2::new(reach - 0.01, 0.0);
        assert!(collides(&a, &near));

        let mut far = round(0.0, 0.0, 3.0, 4.0);
        far.position = Vec2::new(reach + 0.01, 0.0);
        assert!(!collides(&a, &far));
    }

    #[test]
    fn test_ghost_and_self_never_collide() {
        let a = boxed(0.0, 0.0, 4.0, 4.0);
        assert!(!collides(&a, &a));

        let ghost = shape("object", "g", CollisionShape::Ghost, 0.0, 0.0, 4.0, 4.0);
        assert!(!collides(&a, &ghost));
        assert!(!collides(&ghost, &a));
    }

    #[test]
    fn test_mixed_circle_inside_box() {
        let bx = boxed(0.0, 0.0, 10.0, 10.0);
        let circle = round(1.0, -2.0, 1.0, 1.0);
        assert!(collides(&bx, &circle));
        assert!(collides(&circle, &bx));
    }

    #[test]
    fn test_mixed_far_apart() {
        let bx = boxed(0.0, 0.0, 4.0, 4.0);
        let circle = round(40.0, 40.0, 2.0, 2.0);
        assert!(!collides(&bx, &circle));
        assert!(!collides(&circle, &bx));
    }

    #[test]
    fn test_mixed_near_corner() {
        let bx = boxed(0.0, 0.0, 4.0, 4.0);
        let r = circle_radius(&round(0.0, 0.0, 2.0, 2.0));

        // Circle centered just beyond the corner, within its radius
        let offset = 4.0 + r * 0.5;
        assert!(collides(&bx, &round(offset, offset, 2.0, 2.0)));

        // Same direction, well outside the radius
        let offset = 4.0 + r * 2.0;
        assert!(!collides(&bx, &round(offset, offset, 2.0, 2.0)));
    }

    #[test]
    fn test_mixed_closing_edge_sampled() {
        // Circle sits right against the +x edge, off the interior grid
        let bx = boxed(0.0, 0.0, 5.0, 5.0);
        let circle = round(5.0 + 0.5 * circle_radius(&round(0.0, 0.0, 0.3, 0.3)), 0.0, 0.3, 0.3);
        assert!(collides(&bx, &circle));
    }

    #[test]
    fn test_mixed_degenerate_extents_terminate() {
        let bx = boxed(0.0, 0.0, 1000.0, 1000.0);
        // Zero radius, but the center is inside the box
        assert!(collides(&bx, &round(999.0, 999.0, 0.0, 0.0)));
        // Small circle just clear of the +x edge
        let edge = boxed(0.0, 0.0, 10.0, 10.0);
        assert!(!collides(&edge, &round(10.7, 0.0, 0.5, 0.5)));

        let flat = boxed(0.0, 0.0, 0.0, 0.0);
        assert!(collides(&flat, &round(0.5, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_mixed_small_circle_inside_large_box() {
        let bx = boxed(0.0, 0.0, 1000.0, 1000.0);
        let small = round(0.24, 0.24, 0.05, 0.05);
        assert!(collides(&bx, &small));
        assert!(collides(&small, &bx));

        // Near a corner, still inside
        let cornered = round(-999.9, 999.9, 0.01, 0.01);
        assert!(collides(&bx, &cornered));
    }

    fn mixed_registry() -> (Registry, Vec<crate::world::entity::EntityHandle>) {
        let mut registry = Registry::new();
        let mut handles = Vec::new();
        for (kind, name) in [("alpha", "a1"), ("alpha", "a2"), ("beta", "b1"), ("beta", "b2")] {
            handles.push(registry.insert(shape(kind, name, CollisionShape::Box, 0.0, 0.0, 5.0, 5.0)));
        }
        (registry, handles)
    }

    fn names(list: &[&Entity]) -> Vec<String> {
        let mut out: Vec<String> = list.iter().map(|e| e.name().to_string()).collect();
        out.sort();
        out
    }

    #[test]
    fn test_any_sees_everything_but_self() {
        let (registry, handles) = mixed_registry();
        let subject = registry.get(&handles[0]).unwrap();
        assert_eq!(names(&colliding_any(&registry, subject)), vec!["a2", "b1", "b2"]);
    }

    #[test]
    fn test_same_type_and_other_type_filters() {
        let (mut registry, handles) = mixed_registry();
        registry.set_type_collision("alpha", TypeCollisionMethod::SameType);
        registry.set_type_collision("beta", TypeCollisionMethod::OtherType);

        let a1 = registry.get(&handles[0]).unwrap();
        assert_eq!(names(&colliding_any(&registry, a1)), vec!["a2"]);
        assert!(colliding_type(&registry, a1, "beta").is_empty());

        // beta may only see other types, and alpha hides itself from others
        let b1 = registry.get(&handles[2]).unwrap();
        assert!(colliding_type(&registry, b1, "beta").is_empty());
        assert!(colliding_type(&registry, b1, "alpha").is_empty());
        assert!(colliding_any(&registry, b1).is_empty());
    }

    #[test]
    fn test_ghost_type_is_invisible() {
        let (mut registry, handles) = mixed_registry();
        registry.set_type_collision("beta", TypeCollisionMethod::Ghost);

        let a1 = registry.get(&handles[0]).unwrap();
        assert_eq!(names(&colliding_any(&registry, a1)), vec!["a2"]);

        let b1 = registry.get(&handles[2]).unwrap();
        assert!(colliding_any(&registry, b1).is_empty());
        assert!(colliding_type(&registry, b1, "alpha").is_empty());
    }

    #[test]
    fn test_name_query() {
        let (registry, handles) = mixed_registry();
        let a1 = registry.get(&handles[0]).unwrap();
        assert_eq!(names(&colliding_name(&registry, a1, "beta", "b2")), vec!["b2"]);
        assert!(colliding_name(&registry, a1, "beta", "nobody").is_empty());
    }

    #[test]
    fn test_unknown_type_query_empty() {
        let (registry, handles) = mixed_registry();
        let a1 = registry.get(&handles[0]).unwrap();
        assert!(colliding_type(&registry, a1, "gamma").is_empty());
    }

    #[test]
    fn test_removed_entity_not_reported() {
        let (mut registry, handles) = mixed_registry();
        registry.remove(&handles[3]);
        let a1 = registry.get(&handles[0]).unwrap();
        let hits = colliding_any(&registry, a1);
        assert!(hits.iter().all(|e| e.id() != handles[3].id));
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn test_type_method_normalization() {
        assert_eq!(TypeCollisionMethod::from(2), TypeCollisionMethod::SameType);
        assert_eq!(TypeCollisionMethod::from(200), TypeCollisionMethod::Any);
    }

    proptest! {
        #[test]
        fn prop_box_box_symmetric(
            ax in -50.0f32..50.0, ay in -50.0f32..50.0, aw in 0.1f32..20.0, ah in 0.1f32..20.0,
            bx in -50.0f32..50.0, by in -50.0f32..50.0, bw in 0.1f32..20.0, bh in 0.1f32..20.0,
        ) {
            let a = boxed(ax, ay, aw, ah);
            let b = boxed(bx, by, bw, bh);
            prop_assert_eq!(collides(&a, &b), collides(&b, &a));
        }

        #[test]
        fn prop_radius_radius_symmetric(
            ax in -50.0f32..50.0, ay in -50.0f32..50.0, aw in 0.1f32..20.0, ah in 0.1f32..20.0,
            bx in -50.0f32..50.0, by in -50.0f32..50.0, bw in 0.1f32..20.0, bh in 0.1f32..20.0,
        ) {
            let a = round(ax, ay, aw, ah);
            let b = round(bx, by, bw, bh);
            prop_assert_eq!(collides(&a, &b), collides(&b, &a));
        }

        #[test]
        fn prop_mixed_symmetric(
            ax in -30.0f32..30.0, ay in -30.0f32..30.0, aw in 0.5f32..10.0, ah in 0.5f32..10.0,
            bx in -30.0f32..30.0, by in -30.0f32..30.0, bw in 0.5f32..10.0, bh in 0.5f32..10.0,
        ) {
            let a = boxed(ax, ay, aw, ah);
            let b = round(bx, by, bw, bh);
            prop_assert_eq!(collides(&a, &b), collides(&b, &a));
        }
    }
}
