//! World Size
//!
//! Snapshot of the drawable area and the logical half extents derived from it.
//! Simulation math only ever uses `width`/`height`; pixels are for rendering.

use serde::{Serialize, Deserialize};

/// Padding added to real dimensions so logical bounds are never exactly zero.
pub const SIZE_EPSILON: f32 = 0.000025;

/// Logical units across the smaller real dimension.
pub const SCALE_DIVISOR: f32 = 100.0;

/// Canvas size in pixels plus the derived logical extents.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldSize {
    /// Actual canvas width in pixels
    pub real_width: f32,
    /// Actual canvas height in pixels
    pub real_height: f32,
    /// Pixels per logical unit, based on the smaller dimension
    pub scale: f32,
    /// Logical half-width
    pub width: f32,
    /// Logical half-height
    pub height: f32,
}

impl WorldSize {
    /// Derive a snapshot from real pixel dimensions.
    ///
    /// A degenerate (zero or negative) dimension yields the smallest positive
    /// scale instead of dividing by zero, which can leave the other extent
    /// infinite. [`checked_from_real`](Self::checked_from_real) rejects those.
    pub fn from_real(real_width: f32, real_height: f32) -> Self {
        let smallest = real_width.min(real_height);
        let scale = (smallest / SCALE_DIVISOR).max(f32::MIN_POSITIVE);

        let real_width = real_width + SIZE_EPSILON;
        let real_height = real_height + SIZE_EPSILON;

        Self {
            real_width,
            real_height,
            scale,
            width: real_width / scale / 2.0,
            height: real_height / scale / 2.0,
        }
    }

    /// Like [`from_real`](Self::from_real), but `None` unless both
    /// dimensions are positive and finite.
    pub fn checked_from_real(real_width: f32, real_height: f32) -> Option<Self> {
        let usable = |d: f32| d.is_finite() && d > 0.0;
        if usable(real_width) && usable(real_height) {
            Some(Self::from_real(real_width, real_height))
        } else {
            None
        }
    }
}

impl Default for WorldSize {
    fn default() -> Self {
        Self::from_real(720.0, 480.0)
    }
}

/// Source of the current display dimensions, polled by the kernel.
pub trait SizeProvider: Send + Sync {
    /// Current canvas size in pixels as `(width, height)`.
    fn real_size(&self) -> (f32, f32);
}

/// A display that never changes size. Useful headless.
#[derive(Clone, Copy, Debug)]
pub struct FixedSize {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl SizeProvider for FixedSize {
    fn real_size(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}
