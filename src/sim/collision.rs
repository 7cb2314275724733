//! Axis-aligned rectangle collision
//!
//! Player and obstacles are both plain rectangles, so a separating-axis test
//! on two intervals is all we need.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in surface pixels (origin top-left, y down)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square bounds anchored at `origin`
    pub fn square(origin: Vec2, edge: f32) -> Self {
        Self::new(origin.x, origin.y, edge, edge)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Bounds of the same size centered inside a `width` x `height` area
    pub fn centered_in(width: f32, height: f32, edge: f32) -> Self {
        Self::new((width - edge) / 2.0, (height - edge) / 2.0, edge, edge)
    }
}

/// Check whether two rectangles have a non-empty intersection
///
/// Rectangles that only share an edge do not overlap.
#[inline]
pub fn overlaps(a: &Bounds, b: &Bounds) -> bool {
    !(a.right() <= b.x || a.x >= b.right() || a.bottom() <= b.y || a.y >= b.bottom())
}
