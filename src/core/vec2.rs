//! 2D Vector
//!
//! Plain `f32` vector used for positions, half-extents and velocities.
//! Simulation units are logical (world-centered), not pixels.

use std::fmt;
use std::ops::{Add, Sub, Neg, Mul};
use serde::{Serialize, Deserialize};

/// 2D vector with `f32` components.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Zero vector
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Both components set to the same value.
    #[inline]
    pub const fn splat(v: f32) -> Self {
        Self { x: v, y: v }
    }

    /// Scale by a scalar.
    #[inline]
    pub fn scale(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    /// Length (magnitude).
    ///
    /// Computed in `f64` and narrowed, so repeated calls on the same
    /// input agree bit-for-bit with [`distance`](Self::distance).
    #[inline]
    pub fn length(self) -> f32 {
        hypot(self.x, self.y)
    }

    /// Euclidean distance to another point.
    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        hypot(self.x - other.x, self.y - other.y)
    }

    /// Normalize to unit length.
    /// Returns ZERO if length is zero.
    #[inline]
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len == 0.0 {
            return Self::ZERO;
        }
        Self {
            x: self.x / len,
            y: self.y / len,
        }
    }
}

/// Distance from the origin of `(dx, dy)`, evaluated in `f64`.
#[inline]
pub(crate) fn hypot(dx: f32, dy: f32) -> f32 {
    let dx = dx as f64;
    let dy = dy as f64;
    (dx * dx + dy * dy).sqrt() as f32
}

/// Distance and unit direction between two points.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Direction {
    /// Distance between the points
    pub dist: f32,
    /// Unit vector from the first point toward the second.
    /// ZERO when the points coincide.
    pub dir: Vec2,
}

impl Direction {
    /// Direction from `from` toward `to`.
    ///
    /// This is `to - from`, normalized. Negate `dir` (or swap the arguments)
    /// for the vector pointing away from `to`.
    pub fn between(from: Vec2, to: Vec2) -> Self {
        let diff = to - from;
        let dist = diff.length();
        let dir = if dist == 0.0 {
            Vec2::ZERO
        } else {
            Vec2::new(diff.x / dist, diff.y / dist)
        };
        Self { dist, dir }
    }
}

impl Add for Vec2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        self.scale(rhs)
    }
}

impl fmt::Debug for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vec2({:.3}, {:.3})", self.x, self.y)
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}
