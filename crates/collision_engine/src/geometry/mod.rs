//! 2D geometry primitives
//!
//! Axis-aligned rectangles with directional intersection classification,
//! collision responses, and convex polygons for narrow-phase refinement.

mod polygon;
mod rect;
mod response;

pub use polygon::Polygon;
pub use rect::Rect;
pub use response::{CollisionResponse, Direction, Sides};
