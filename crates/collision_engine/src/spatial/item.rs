//! Items stored in the spatial index
//!
//! A [`SpatialItem`] binds an entity identity to a bounding rectangle and
//! keeps the list of partition nodes subscribed to it. Mutations return an
//! [`ItemNotification`] naming those subscribers; the index delivers it.

use crate::entity::EntityId;
use crate::foundation::collections::NodeKey;
use crate::foundation::math::{component_abs, Vec2};
use crate::geometry::{Polygon, Rect};

/// Kind of change reported by an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemEvent {
    /// The item's rectangle changed
    Moved,
    /// The item is being removed
    Removed,
}

/// Notification produced by an item mutation
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "notifications must be delivered to the subscribed nodes"]
pub struct ItemNotification {
    /// What happened
    pub event: ItemEvent,
    /// Nodes subscribed when the notification was fired
    pub recipients: Vec<NodeKey>,
}

/// Shape carried by an item
#[derive(Debug, Clone, PartialEq)]
pub enum ItemShape {
    /// Axis-aligned box of the item's size
    Rect,
    /// Convex polygon with vertices relative to the item's position
    Polygon(Polygon),
}

/// Lightweight handle binding an entity to its bounds
#[derive(Debug, Clone)]
pub struct SpatialItem {
    id: EntityId,
    position: Vec2,
    size: Vec2,
    rect: Rect,
    shape: ItemShape,
    subscribers: Vec<NodeKey>,
}

impl SpatialItem {
    /// Create a rectangular item centered on `position`
    ///
    /// A zero size is allowed and yields a point rectangle.
    pub fn new(id: impl Into<EntityId>, position: Vec2, size: Vec2) -> Self {
        let size = component_abs(size);
        Self {
            id: id.into(),
            position,
            size,
            rect: Rect::from_center_size(position, size),
            shape: ItemShape::Rect,
            subscribers: Vec::new(),
        }
    }

    /// Create an item shaped by a convex polygon
    ///
    /// The polygon's vertices are relative to `position`; the item's size is
    /// the polygon's bounding size.
    pub fn with_polygon(id: impl Into<EntityId>, position: Vec2, polygon: Polygon) -> Self {
        let local = polygon.bounding_rect();
        Self {
            id: id.into(),
            position,
            size: local.size(),
            rect: local.translated(position),
            shape: ItemShape::Polygon(polygon),
            subscribers: Vec::new(),
        }
    }

    /// Entity identity
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Center position (polygon origin for polygon items)
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Bounding size
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Bounding rectangle in world space
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Shape of this item
    pub fn shape(&self) -> &ItemShape {
        &self.shape
    }

    /// Whether the item carries a polygon shape
    pub fn is_polygon(&self) -> bool {
        matches!(self.shape, ItemShape::Polygon(_))
    }

    /// Shape of this item as a world-space polygon
    pub fn world_polygon(&self) -> Polygon {
        match &self.shape {
            ItemShape::Rect => Polygon::from_rect(&self.rect),
            ItemShape::Polygon(polygon) => polygon.translated(self.position),
        }
    }

    /// Move the item and notify its subscribers
    pub fn set_position(&mut self, position: Vec2) -> ItemNotification {
        self.position = position;
        self.refresh_rect();
        self.notify(ItemEvent::Moved)
    }

    /// Resize the item and notify its subscribers
    ///
    /// Polygon items are scaled per axis to the new bounding size.
    pub fn set_size(&mut self, size: Vec2) -> ItemNotification {
        let size = component_abs(size);
        if let ItemShape::Polygon(polygon) = &mut self.shape {
            let scale = Vec2::new(
                axis_scale(self.size.x, size.x),
                axis_scale(self.size.y, size.y),
            );
            *polygon = polygon.scaled(scale);
            self.size = polygon.bounding_rect().size();
        } else {
            self.size = size;
        }
        self.refresh_rect();
        self.notify(ItemEvent::Moved)
    }

    /// Announce removal to the subscribers
    ///
    /// The item must not be moved after this.
    pub fn remove(&mut self) -> ItemNotification {
        self.notify(ItemEvent::Removed)
    }

    /// Nodes currently subscribed to this item
    pub fn subscribers(&self) -> &[NodeKey] {
        &self.subscribers
    }

    pub(crate) fn subscribe(&mut self, node: NodeKey) {
        if !self.subscribers.contains(&node) {
            self.subscribers.push(node);
        }
    }

    pub(crate) fn unsubscribe(&mut self, node: NodeKey) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|&n| n != node);
        self.subscribers.len() != before
    }

    fn refresh_rect(&mut self) {
        self.rect = match &self.shape {
            ItemShape::Rect => Rect::from_center_size(self.position, self.size),
            ItemShape::Polygon(polygon) => polygon.bounding_rect().translated(self.position),
        };
    }

    fn notify(&self, event: ItemEvent) -> ItemNotification {
        ItemNotification {
            event,
            recipients: self.subscribers.clone(),
        }
    }
}

fn axis_scale(current: f32, target: f32) -> f32 {
    if current > 0.0 {
        target / current
    } else {
        1.0
    }
}
