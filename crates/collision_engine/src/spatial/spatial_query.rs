//! Abstract spatial query interface for the broad phase
//!
//! Lets callers look up candidates by point or region without depending on
//! how the index partitions space.

use crate::entity::EntityId;
use crate::foundation::math::Vec2;
use crate::geometry::Rect;

use super::quadtree::SpatialIndex;

/// Read-only broad-phase queries over a spatial structure
pub trait SpatialQuery {
    /// Identities whose bounds contain a point
    fn query_point(&self, point: Vec2) -> Vec<EntityId>;

    /// Identities whose bounds intersect a rectangle
    fn query_rect(&self, area: &Rect) -> Vec<EntityId>;

    /// Number of stored entities
    fn entity_count(&self) -> usize;
}

impl SpatialQuery for SpatialIndex {
    fn query_point(&self, point: Vec2) -> Vec<EntityId> {
        self.items_at(point).into_iter().map(|i| i.id().clone()).collect()
    }

    fn query_rect(&self, area: &Rect) -> Vec<EntityId> {
        self.items_in(area).into_iter().map(|i| i.id().clone()).collect()
    }

    fn entity_count(&self) -> usize {
        self.len()
    }
}
