//! Axis-aligned rectangle
//!
//! Screen-style coordinates: `y` grows downward, so the top edge has the
//! smaller `y`. Every constructor normalizes its corners, which keeps
//! `top_left <= bottom_right` on both axes.

use serde::{Deserialize, Serialize};

use super::response::{CollisionResponse, Sides};
use crate::foundation::math::{component_abs, component_max, component_min, Vec2};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    top_left: Vec2,
    bottom_right: Vec2,
}

impl Rect {
    /// Create a rectangle spanning two corners, in any order
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            top_left: component_min(a, b),
            bottom_right: component_max(a, b),
        }
    }

    /// Create a rectangle from its four edges
    pub fn from_edges(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self::new(Vec2::new(left, top), Vec2::new(right, bottom))
    }

    /// Create a rectangle with its top-left corner at the origin
    pub fn from_size(size: Vec2) -> Self {
        Self::new(Vec2::zeros(), size)
    }

    /// Create a rectangle centered on a point
    ///
    /// Negative sizes are treated as their absolute value.
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = component_abs(size) * 0.5;
        Self::new(center - half, center + half)
    }

    /// Top-left corner
    pub fn top_left(&self) -> Vec2 {
        self.top_left
    }

    /// Top-right corner
    pub fn top_right(&self) -> Vec2 {
        Vec2::new(self.bottom_right.x, self.top_left.y)
    }

    /// Bottom-left corner
    pub fn bottom_left(&self) -> Vec2 {
        Vec2::new(self.top_left.x, self.bottom_right.y)
    }

    /// Bottom-right corner
    pub fn bottom_right(&self) -> Vec2 {
        self.bottom_right
    }

    /// Top edge
    pub fn top(&self) -> f32 {
        self.top_left.y
    }

    /// Left edge
    pub fn left(&self) -> f32 {
        self.top_left.x
    }

    /// Bottom edge
    pub fn bottom(&self) -> f32 {
        self.bottom_right.y
    }

    /// Right edge
    pub fn right(&self) -> f32 {
        self.bottom_right.x
    }

    /// Width
    pub fn width(&self) -> f32 {
        self.bottom_right.x - self.top_left.x
    }

    /// Height
    pub fn height(&self) -> f32 {
        self.bottom_right.y - self.top_left.y
    }

    /// Width and height as a vector
    pub fn size(&self) -> Vec2 {
        self.bottom_right - self.top_left
    }

    /// Center point
    pub fn center(&self) -> Vec2 {
        (self.top_left + self.bottom_right) * 0.5
    }

    /// Check if this rectangle contains a point (edges inclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        self.top_left.x <= point.x
            && self.bottom_right.x >= point.x
            && self.top_left.y <= point.y
            && self.bottom_right.y >= point.y
    }

    /// Check if this rectangle fully contains another (edges inclusive)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.top_left.x >= self.top_left.x
            && other.top_left.y >= self.top_left.y
            && other.bottom_right.x <= self.bottom_right.x
            && other.bottom_right.y <= self.bottom_right.y
    }

    /// Check if this rectangle overlaps another
    ///
    /// Rectangles that only share an edge or a corner do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.top_left.x < other.bottom_right.x
            && self.bottom_right.x > other.top_left.x
            && self.top_left.y < other.bottom_right.y
            && self.bottom_right.y > other.top_left.y
    }

    /// Intersect with another rectangle and report the sides involved
    ///
    /// Sides are reported relative to `other`: a side is set when this
    /// rectangle's edge lies strictly inside `other`'s matching edge. With no
    /// side set the response is [`Sides::INSIDE`]; with all four set it is
    /// [`Sides::SURROUND`]. The result is not symmetric in its arguments.
    pub fn classified_intersect(&self, other: &Rect) -> CollisionResponse {
        if !self.intersects(other) {
            return CollisionResponse::NONE;
        }

        let mut sides = Sides::empty();
        sides.set(Sides::NORTH, self.top() > other.top());
        sides.set(Sides::WEST, self.left() > other.left());
        sides.set(Sides::SOUTH, self.bottom() < other.bottom());
        sides.set(Sides::EAST, self.right() < other.right());

        let edges = Sides::NORTH | Sides::SOUTH | Sides::EAST | Sides::WEST;
        if sides.is_empty() {
            sides = Sides::INSIDE;
        } else if sides == edges {
            sides = Sides::SURROUND;
        }

        CollisionResponse::hit(sides)
    }

    /// Smallest rectangle containing both rectangles
    pub fn union(&self, other: &Rect) -> Rect {
        Self {
            top_left: component_min(self.top_left, other.top_left),
            bottom_right: component_max(self.bottom_right, other.bottom_right),
        }
    }

    /// Scale both corners about the origin
    pub fn scaled(&self, factor: f32) -> Rect {
        Self::new(self.top_left * factor, self.bottom_right * factor)
    }

    /// Move the rectangle by an offset
    pub fn translated(&self, offset: Vec2) -> Rect {
        Self {
            top_left: self.top_left + offset,
            bottom_right: self.bottom_right + offset,
        }
    }

    /// Split into four quadrants around the midpoint
    ///
    /// Order: top-left, top-right, bottom-left, bottom-right.
    pub fn quadrants(&self) -> [Rect; 4] {
        let mid = self.center();
        [
            Self::new(self.top_left, mid),
            Self::new(Vec2::new(mid.x, self.top()), Vec2::new(self.right(), mid.y)),
            Self::new(Vec2::new(self.left(), mid.y), Vec2::new(mid.x, self.bottom())),
            Self::new(mid, self.bottom_right),
        ]
    }
}
