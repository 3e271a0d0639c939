//! Axis-aligned geometry for paddles, bricks, and ball bounds
//!
//! Screen coordinates: x grows right, y grows down, rectangles are anchored
//! at their top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub min: Vec2,
    /// Width and height
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Bounding box of a circle
    #[inline]
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self {
            min: center - Vec2::splat(radius),
            size: Vec2::splat(radius * 2.0),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    /// Strict overlap test (touching edges do not count)
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.right() > other.left()
            && self.left() < other.right()
            && self.bottom() > other.top()
            && self.top() < other.bottom()
    }
}

/// Collision axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// Smallest positive face overlap of `prev` against `target`, per axis
///
/// For each axis both faces are considered (near edge of `prev` past the far
/// edge of `target` and vice versa). Axes with no positive overlap report
/// `f32::INFINITY`.
pub fn face_penetration(prev: &Rect, target: &Rect) -> Vec2 {
    fn smallest_positive(a: f32, b: f32) -> f32 {
        let a = if a > 0.0 { a } else { f32::INFINITY };
        let b = if b > 0.0 { b } else { f32::INFINITY };
        a.min(b)
    }

    Vec2::new(
        smallest_positive(prev.right() - target.left(), target.right() - prev.left()),
        smallest_positive(prev.bottom() - target.top(), target.bottom() - prev.top()),
    )
}

/// Which axis a moving body struck first
///
/// Penetration depths are converted to time-of-impact by dividing by the
/// absolute speed on that axis; a stationary axis never wins. Exact ties go to
/// X.
pub fn impact_axis(penetration: Vec2, vel: Vec2) -> Axis {
    let time = |depth: f32, speed: f32| {
        if speed == 0.0 {
            f32::INFINITY
        } else {
            (depth / speed).abs()
        }
    };
    let tx = time(penetration.x, vel.x);
    let ty = time(penetration.y, vel.y);

    if ty < tx { Axis::Y } else { Axis::X }
}
