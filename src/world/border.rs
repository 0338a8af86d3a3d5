//! Border State Machine
//!
//! Two steps, run at different rates:
//!
//! 1. [`refresh`] classifies each axis of an entity against the world bounds
//!    (only in the phase that owns the entity's preferred rate).
//! 2. [`apply_policy`] integrates velocity gated by that state and applies the
//!    entity's [`BorderMethod`] effects (every render tick).
//!
//! ```text
//!   state:  -4   -3   -2   -1    0    1    2    3    4
//!           |  past  |  touching |clear| touching |  past  |
//!      even = being driven further out, odd = resting there
//! ```

use crate::world::entity::{BorderMethod, BorderState, Entity};
use crate::world::size::WorldSize;

/// Velocity units per logical unit of movement per render tick.
pub const VELOCITY_DIVISOR: f32 = 10.0;

/// Gap kept between a `PushHide` entity and the edge it left through.
pub const HIDE_MARGIN: f32 = 0.25;

/// What the caller must do with the entity after the policy ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderOutcome {
    /// Entity stays in the world
    Keep,
    /// Entity must be removed from the registry
    Remove,
}

/// Classify one axis.
///
/// `position`/`extent` are the entity's center and half extent on the axis,
/// `bound` is the world half extent, and `velocity` decides the pushing bit.
pub fn classify_axis(position: f32, extent: f32, bound: f32, velocity: f32) -> i8 {
    let mut state = if position + extent < -bound {
        -3
    } else if position - extent > bound {
        3
    } else if position - extent <= -bound {
        -1
    } else if position + extent >= bound {
        1
    } else {
        0
    };

    if velocity < 0.0 && state <= -1 {
        state -= 1;
    } else if velocity > 0.0 && state >= 1 {
        state += 1;
    }

    state
}

/// Recompute both axes of an entity's border state.
pub fn refresh(entity: &mut Entity, size: &WorldSize) {
    entity.on_border = BorderState {
        x: classify_axis(entity.position.x, entity.extent.x, size.width, entity.velocity.x),
        y: classify_axis(entity.position.y, entity.extent.y, size.height, entity.velocity.y),
    };
}

/// Nonzero even state: moving further into/past an edge.
#[inline]
pub fn is_pushing(state: i8) -> bool {
    state != 0 && state % 2 == 0
}

/// One axis of an entity, borrowed field by field.
struct Axis<'a> {
    position: &'a mut f32,
    velocity: &'a mut f32,
    state: &'a mut i8,
    extent: f32,
    bound: f32,
}

impl Axis<'_> {
    fn reclassify(&mut self) {
        *self.state = classify_axis(*self.position, self.extent, self.bound, *self.velocity);
    }

    fn may_integrate(&self, method: BorderMethod) -> bool {
        let state = *self.state;
        match method {
            BorderMethod::Limit | BorderMethod::PushLimit => state == 0 || state % 2 != 0,
            BorderMethod::Hide | BorderMethod::PushHide => (-3..=3).contains(&state),
            BorderMethod::Ignore
            | BorderMethod::Bounce
            | BorderMethod::Teleport
            | BorderMethod::RemoveObject => true,
        }
    }

    /// Returns true when the entity has to go.
    fn apply(&mut self, method: BorderMethod, speed_delta: f32) -> bool {
        if self.may_integrate(method) {
            *self.position += *self.velocity / VELOCITY_DIVISOR * speed_delta;
        }

        let (pos, ext, bound) = (*self.position, self.extent, self.bound);
        match method {
            BorderMethod::PushLimit => {
                if pos - ext < -bound {
                    *self.position = -bound + ext;
                } else if pos + ext > bound {
                    *self.position = bound - ext;
                }
            }
            BorderMethod::PushHide => {
                if pos + ext < -bound {
                    *self.position = -bound - ext - HIDE_MARGIN;
                } else if pos - ext > bound {
                    *self.position = bound + ext + HIDE_MARGIN;
                }
            }
            BorderMethod::Bounce => {
                if is_pushing(*self.state) {
                    *self.velocity = -*self.velocity;
                    // No longer driven outward; a stale even state would flip again.
                    self.reclassify();
                }
            }
            BorderMethod::Teleport => {
                if *self.state <= -4 {
                    *self.position = bound + ext;
                    self.reclassify();
                } else if *self.state >= 4 {
                    *self.position = -bound - ext;
                    self.reclassify();
                }
            }
            BorderMethod::RemoveObject => return self.state.abs() >= 4,
            BorderMethod::Ignore | BorderMethod::Limit | BorderMethod::Hide => {}
        }

        false
    }
}

/// Integrate velocity and apply the entity's border method on both axes.
///
/// Reads the stored border state as-is; it may be a few render ticks old
/// when the entity refreshes at a slower rate.
pub fn apply_policy(entity: &mut Entity, size: &WorldSize, speed_delta: f32) -> BorderOutcome {
    let method = entity.border_method;

    let mut x = Axis {
        position: &mut entity.position.x,
        velocity: &mut entity.velocity.x,
        state: &mut entity.on_border.x,
        extent: entity.extent.x,
        bound: size.width,
    };
    let remove_x = x.apply(method, speed_delta);

    let mut y = Axis {
        position: &mut entity.position.y,
        velocity: &mut entity.velocity.y,
        state: &mut entity.on_border.y,
        extent: entity.extent.y,
        bound: size.height,
    };
    let remove_y = y.apply(method, speed_delta);

    if remove_x || remove_y {
        BorderOutcome::Remove
    } else {
        BorderOutcome::Keep
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vec2::Vec2;
    use proptest::prelude::*;

    /// 100x100 logical world: bounds are +-50 on both axes.
    fn world() -> WorldSize {
        WorldSize {
            real_width: 100.0,
            real_height: 100.0,
            scale: 1.0,
            width: 50.0,
            height: 50.0,
        }
    }

    fn entity_at(x: f32, y: f32, method: BorderMethod) -> Entity {
        let mut e = Entity::new("object", "scout", Vec2::new(x, y), Vec2::splat(4.0), Box::new(()));
        e.border_method = method;
        e
    }

    /// Distinct consecutive states seen while sweeping `x` across the bound.
    fn sweep(from: f32, to: f32, velocity: f32) -> Vec<i8> {
        let mut seen = Vec::new();
        let steps = 800;
        for i in 0..=steps {
            let x = from + (to - from) * i as f32 / steps as f32;
            let state = classify_axis(x, 4.0, 50.0, velocity);
            if seen.last() != Some(&state) {
                seen.push(state);
            }
        }
        seen
    }

    #[test]
    fn test_classify_levels() {
        assert_eq!(classify_axis(0.0, 4.0, 50.0, 0.0), 0);
        assert_eq!(classify_axis(46.0, 4.0, 50.0, 0.0), 1);
        assert_eq!(classify_axis(46.0, 4.0, 50.0, 1.0), 2);
        assert_eq!(classify_axis(46.0, 4.0, 50.0, -1.0), 1);
        assert_eq!(classify_axis(54.5, 4.0, 50.0, 0.0), 3);
        assert_eq!(classify_axis(54.5, 4.0, 50.0, 2.0), 4);
        assert_eq!(classify_axis(-46.0, 4.0, 50.0, -1.0), -2);
        assert_eq!(classify_axis(-60.0, 4.0, 50.0, -1.0), -4);
        // Exactly on the far side of the bound is still touching
        assert_eq!(classify_axis(54.0, 4.0, 50.0, 0.0), 1);
    }

    #[test]
    fn test_classify_monotonic_sweep() {
        assert_eq!(sweep(0.0, 80.0, 0.0), vec![0, 1, 3]);
        assert_eq!(sweep(0.0, 80.0, 1.0), vec![0, 2, 4]);
        assert_eq!(sweep(0.0, -80.0, 0.0), vec![0, -1, -3]);
        assert_eq!(sweep(0.0, -80.0, -1.0), vec![0, -2, -4]);
    }

    #[test]
    fn test_refresh_both_axes() {
        let mut e = entity_at(47.0, -60.0, BorderMethod::Ignore);
        e.velocity = Vec2::new(1.0, 0.0);
        refresh(&mut e, &world());
        assert_eq!(e.on_border, BorderState { x: 2, y: -3 });
    }

    #[test]
    fn test_ignore_integrates_with_speed_delta() {
        let mut e = entity_at(0.0, 0.0, BorderMethod::Ignore);
        e.velocity = Vec2::new(10.0, -5.0);
        apply_policy(&mut e, &world(), 2.0);
        assert_eq!(e.position, Vec2::new(2.0, -1.0));
    }

    #[test]
    fn test_limit_blocks_only_pushing() {
        let size = world();
        let mut e = entity_at(46.0, 0.0, BorderMethod::Limit);
        e.velocity = Vec2::new(5.0, 0.0);
        refresh(&mut e, &size);
        assert_eq!(e.on_border.x, 2);
        apply_policy(&mut e, &size, 1.0);
        assert_eq!(e.position.x, 46.0);

        // Moving back inward is allowed
        e.velocity = Vec2::new(-5.0, 0.0);
        refresh(&mut e, &size);
        assert_eq!(e.on_border.x, 1);
        apply_policy(&mut e, &size, 1.0);
        assert_eq!(e.position.x, 45.5);
    }

    #[test]
    fn test_hide_blocks_pushing_past_only() {
        let size = world();
        let mut e = entity_at(46.0, 0.0, BorderMethod::Hide);
        e.velocity = Vec2::new(5.0, 0.0);
        refresh(&mut e, &size);
        apply_policy(&mut e, &size, 1.0);
        // State 2 still integrates
        assert_eq!(e.position.x, 46.5);

        e.position.x = 60.0;
        refresh(&mut e, &size);
        assert_eq!(e.on_border.x, 4);
        apply_policy(&mut e, &size, 1.0);
        assert_eq!(e.position.x, 60.0);
    }

    #[test]
    fn test_push_limit_pulls_back_inside() {
        let size = world();
        let mut e = entity_at(70.0, -49.0, BorderMethod::PushLimit);
        refresh(&mut e, &size);
        apply_policy(&mut e, &size, 1.0);
        assert_eq!(e.position, Vec2::new(46.0, -46.0));
    }

    #[test]
    fn test_push_hide_parks_outside() {
        let size = world();
        let mut e = entity_at(80.0, -70.0, BorderMethod::PushHide);
        refresh(&mut e, &size);
        apply_policy(&mut e, &size, 1.0);
        assert_eq!(e.position.x, 50.0 + 4.0 + HIDE_MARGIN);
        assert_eq!(e.position.y, -50.0 - 4.0 - HIDE_MARGIN);
    }

    #[test]
    fn test_bounce_flips_once_per_contact() {
        let size = world();
        let mut e = entity_at(46.0, 0.0, BorderMethod::Bounce);
        e.velocity = Vec2::new(3.0, 0.0);

        let mut flips = 0;
        let mut last = e.velocity.x;
        for tick in 0..16 {
            // Border state refreshes at a quarter of the render rate
            if tick % 4 == 0 {
                refresh(&mut e, &size);
            }
            apply_policy(&mut e, &size, 1.0);
            if e.velocity.x.signum() != last.signum() {
                flips += 1;
                last = e.velocity.x;
            }
        }

        assert_eq!(flips, 1);
        assert_eq!(e.velocity.x, -3.0);
    }

    #[test]
    fn test_bounce_ignores_resting_contact() {
        let size = world();
        let mut e = entity_at(46.0, 0.0, BorderMethod::Bounce);
        e.velocity = Vec2::new(-3.0, 0.0);
        refresh(&mut e, &size);
        assert_eq!(e.on_border.x, 1);
        apply_policy(&mut e, &size, 1.0);
        assert_eq!(e.velocity.x, -3.0);
    }

    #[test]
    fn test_teleport_wraps_to_opposite_edge() {
        let size = world();
        let mut e = entity_at(60.0, 0.0, BorderMethod::Teleport);
        e.velocity = Vec2::new(2.0, 0.0);
        refresh(&mut e, &size);
        assert_eq!(e.on_border.x, 4);

        apply_policy(&mut e, &size, 1.0);
        assert_eq!(e.position.x, -54.0);
        assert_eq!(e.on_border.x, -1);

        // A second render tick with no refresh must not wrap back
        apply_policy(&mut e, &size, 1.0);
        assert!(e.position.x < 0.0);
    }

    #[test]
    fn test_remove_object_only_when_pushing_past() {
        let size = world();
        let mut e = entity_at(0.0, 56.0, BorderMethod::RemoveObject);
        refresh(&mut e, &size);
        assert_eq!(e.on_border.y, 3);
        assert_eq!(apply_policy(&mut e, &size, 1.0), BorderOutcome::Keep);

        e.velocity = Vec2::new(0.0, 1.0);
        refresh(&mut e, &size);
        assert_eq!(apply_policy(&mut e, &size, 1.0), BorderOutcome::Remove);
    }

    proptest! {
        #[test]
        fn prop_push_limit_contains(
            x in -500.0f32..500.0,
            y in -500.0f32..500.0,
            ext in 0.1f32..40.0,
            vx in -50.0f32..50.0,
            vy in -50.0f32..50.0,
            refreshed in any::<bool>(),
        ) {
            let size = world();
            let mut e = Entity::new("object", "p", Vec2::new(x, y), Vec2::splat(ext), Box::new(()));
            e.border_method = BorderMethod::PushLimit;
            e.velocity = Vec2::new(vx, vy);
            if refreshed {
                refresh(&mut e, &size);
            }
            apply_policy(&mut e, &size, 1.0);
            prop_assert!(e.position.x.abs() + ext <= size.width + 1e-3);
            prop_assert!(e.position.y.abs() + ext <= size.height + 1e-3);
        }
    }
}
