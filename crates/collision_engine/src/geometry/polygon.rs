//! Convex polygons for narrow-phase refinement
//!
//! Polygon overlap uses the separating axis theorem: two convex shapes are
//! disjoint iff some edge normal of either shape separates their projections.

use serde::{Deserialize, Serialize};

use super::rect::Rect;
use crate::foundation::math::{component_max, component_min, Vec2};

/// Convex polygon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec2>", into = "Vec<Vec2>")]
pub struct Polygon {
    vertices: Vec<Vec2>,
}

impl Polygon {
    /// Create a polygon from its vertices in winding order
    ///
    /// Returns `None` for fewer than three vertices. Convexity is the
    /// caller's responsibility.
    pub fn new(vertices: Vec<Vec2>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        Some(Self { vertices })
    }

    /// Polygon covering a rectangle
    pub fn from_rect(rect: &Rect) -> Self {
        Self {
            vertices: vec![
                rect.top_left(),
                rect.top_right(),
                rect.bottom_right(),
                rect.bottom_left(),
            ],
        }
    }

    /// Vertices in winding order
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    /// Copy of this polygon moved by an offset
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            vertices: self.vertices.iter().map(|v| v + offset).collect(),
        }
    }

    /// Copy of this polygon scaled about the origin, per axis
    pub fn scaled(&self, factor: Vec2) -> Self {
        Self {
            vertices: self.vertices.iter().map(|v| v.component_mul(&factor)).collect(),
        }
    }

    /// Smallest rectangle containing every vertex
    pub fn bounding_rect(&self) -> Rect {
        let first = self.vertices[0];
        let (min, max) = self
            .vertices
            .iter()
            .fold((first, first), |(min, max), v| {
                (component_min(min, *v), component_max(max, *v))
            });
        Rect::new(min, max)
    }

    /// Separating axis test against another convex polygon
    ///
    /// Shapes that only touch do not intersect.
    pub fn intersects(&self, other: &Polygon) -> bool {
        self.axes()
            .chain(other.axes())
            .all(|axis| {
                let (min_a, max_a) = self.project(axis);
                let (min_b, max_b) = other.project(axis);
                max_a > min_b && max_b > min_a
            })
    }

    fn axes(&self) -> impl Iterator<Item = Vec2> + '_ {
        let count = self.vertices.len();
        (0..count).filter_map(move |i| {
            let edge = self.vertices[(i + 1) % count] - self.vertices[i];
            // Degenerate edges carry no axis
            if edge.x == 0.0 && edge.y == 0.0 {
                None
            } else {
                Some(Vec2::new(-edge.y, edge.x))
            }
        })
    }

    fn project(&self, axis: Vec2) -> (f32, f32) {
        self.vertices
            .iter()
            .map(|v| v.dot(&axis))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(min, max), p| {
                (min.min(p), max.max(p))
            })
    }
}

impl TryFrom<Vec<Vec2>> for Polygon {
    type Error = &'static str;

    fn try_from(vertices: Vec<Vec2>) -> Result<Self, Self::Error> {
        Self::new(vertices).ok_or("a polygon needs at least three vertices")
    }
}

impl From<Polygon> for Vec<Vec2> {
    fn from(polygon: Polygon) -> Self {
        polygon.vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle(offset: Vec2) -> Polygon {
        Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(0.0, 10.0),
        ])
        .unwrap()
        .translated(offset)
    }

    #[test]
    fn test_new_rejects_degenerate_vertex_lists() {
        assert!(Polygon::new(vec![Vec2::zeros(), Vec2::new(1.0, 1.0)]).is_none());
    }

    #[test]
    fn test_bounding_rect() {
        let poly = triangle(Vec2::new(5.0, -5.0));
        assert_eq!(poly.bounding_rect(), Rect::from_edges(-5.0, 5.0, 5.0, 15.0));
    }

    #[test]
    fn test_overlapping_polygons_intersect() {
        let a = triangle(Vec2::zeros());
        let b = Polygon::from_rect(&Rect::from_edges(1.0, 1.0, 3.0, 3.0));
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn test_bounding_boxes_overlap_but_polygons_do_not() {
        // Square sits past the triangle's hypotenuse
        let a = triangle(Vec2::zeros());
        let b = Polygon::from_rect(&Rect::from_edges(7.0, 7.0, 9.0, 9.0));
        assert!(a.bounding_rect().intersects(&b.bounding_rect()));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_touching_polygons_do_not_intersect() {
        let a = Polygon::from_rect(&Rect::from_edges(0.0, 0.0, 10.0, 10.0));
        let b = Polygon::from_rect(&Rect::from_edges(0.0, 10.0, 10.0, 20.0));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_scaled() {
        let poly = triangle(Vec2::zeros()).scaled(Vec2::new(2.0, 0.5));
        assert_eq!(poly.bounding_rect(), Rect::from_edges(0.0, 0.0, 5.0, 20.0));
    }
}
