//! Self-resizing quadtree index
//!
//! Owns the node tree and item storage. Every item rectangle stays inside
//! the root: inserting or moving an item outside it rebuilds the tree over a
//! grown world rectangle and reinserts everything. Item keys survive the
//! rebuild since items live in their own arena.

use crate::foundation::collections::{ItemKey, NodeKey};
use crate::foundation::math::Vec2;
use crate::geometry::Rect;

use super::item::{ItemEvent, ItemNotification, SpatialItem};
use super::node::{MoveOutcome, NodeTree, PartitionNode};

/// Configuration for quadtree behavior
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    /// Maximum items per node before subdivision
    pub capacity: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Factor applied to the required world rectangle when growing
    pub growth_factor: f32,

    /// Merge subtrees back into a leaf once they hold no more than `capacity` items
    pub collapse_empty_nodes: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            capacity: 4,
            max_depth: 16,
            growth_factor: 2.0,
            collapse_empty_nodes: false,
        }
    }
}

/// Quadtree spatial index
#[derive(Debug)]
pub struct SpatialIndex {
    tree: NodeTree,
    root: NodeKey,
    config: IndexConfig,
}

impl SpatialIndex {
    /// Create an empty index covering `world`
    pub fn new(world: Rect, config: IndexConfig) -> Self {
        let mut tree = NodeTree::new(config.capacity, config.max_depth);
        let root = tree.create_node(world, None, 0);
        Self { tree, root, config }
    }

    /// Create an index with its top-left corner at the origin
    pub fn with_size(size: Vec2, capacity: usize) -> Self {
        Self::new(
            Rect::from_size(size),
            IndexConfig {
                capacity,
                ..IndexConfig::default()
            },
        )
    }

    /// Insert an item, growing the world first if it does not fit
    pub fn insert(&mut self, item: SpatialItem) -> ItemKey {
        let world = self.world_rect();
        let rect = item.rect();
        if !world.contains_rect(&rect) {
            self.resize(self.grown(&world.union(&rect)));
        }

        let key = self.tree.items.insert(item);
        self.tree.insert(self.root, key);
        key
    }

    /// Remove an item and return it
    pub fn remove(&mut self, key: ItemKey) -> Option<SpatialItem> {
        let notification = self.tree.items.get_mut(key)?.remove();
        self.dispatch(key, &notification);
        self.tree.items.remove(key)
    }

    /// Move an item's center; returns `false` for an unknown key
    pub fn move_item(&mut self, key: ItemKey, position: Vec2) -> bool {
        let Some(item) = self.tree.items.get_mut(key) else {
            return false;
        };
        let notification = item.set_position(position);
        self.dispatch(key, &notification);
        true
    }

    /// Change an item's size; returns `false` for an unknown key
    pub fn resize_item(&mut self, key: ItemKey, size: Vec2) -> bool {
        let Some(item) = self.tree.items.get_mut(key) else {
            return false;
        };
        let notification = item.set_size(size);
        self.dispatch(key, &notification);
        true
    }

    /// Rebuild the tree over a new world rectangle, keeping every item
    pub fn resize(&mut self, world: Rect) {
        let mut keys = Vec::new();
        self.tree.all_items(self.root, &mut keys);
        log::info!(
            "Resizing world from {:?} to {:?} ({} items)",
            self.world_rect(),
            world,
            keys.len()
        );

        self.tree.destroy(self.root);
        self.root = self.tree.create_node(world, None, 0);
        for key in keys {
            self.tree.insert(self.root, key);
        }
    }

    /// Deliver an item notification to every subscribed node
    fn dispatch(&mut self, key: ItemKey, notification: &ItemNotification) {
        let mut required = None;

        for &node in &notification.recipients {
            match notification.event {
                ItemEvent::Removed => {
                    if let Some(id) = self.tree.items.get(key).map(|i| i.id().clone()) {
                        self.tree.remove_item(node, id.as_str());
                    }
                    self.collapse_from(node);
                }
                ItemEvent::Moved => match self.tree.item_moved(node, key) {
                    MoveOutcome::OutOfBounds { required: rect } => required = Some(rect),
                    MoveOutcome::PushedUp(_) => self.collapse_from(node),
                    MoveOutcome::Stayed | MoveOutcome::PushedDown | MoveOutcome::Unsubscribed => {}
                },
            }
        }

        if let Some(rect) = required {
            self.resize(self.grown(&rect));
        }
    }

    fn collapse_from(&mut self, node: NodeKey) {
        if self.config.collapse_empty_nodes && self.tree.nodes.contains_key(node) {
            self.tree.collapse_from(node);
        }
    }

    /// World rectangle grown to contain `required` with headroom
    fn grown(&self, required: &Rect) -> Rect {
        required.scaled(self.config.growth_factor).union(required)
    }

    /// Item behind a key
    pub fn item(&self, key: ItemKey) -> Option<&SpatialItem> {
        self.tree.items.get(key)
    }

    /// Items whose bounds contain a point
    pub fn items_at(&self, point: Vec2) -> Vec<&SpatialItem> {
        let mut keys = Vec::new();
        self.tree.items_at(self.root, point, &mut keys);
        self.resolve(keys)
    }

    /// Items whose bounds intersect a rectangle
    pub fn items_in(&self, area: &Rect) -> Vec<&SpatialItem> {
        self.resolve(self.keys_in(area))
    }

    /// Every item in the index
    pub fn all_items(&self) -> Vec<&SpatialItem> {
        let mut keys = Vec::new();
        self.tree.all_items(self.root, &mut keys);
        self.resolve(keys)
    }

    pub(crate) fn keys_in(&self, area: &Rect) -> Vec<ItemKey> {
        let mut keys = Vec::new();
        self.tree.items_in(self.root, area, &mut keys);
        keys
    }

    fn resolve(&self, keys: Vec<ItemKey>) -> Vec<&SpatialItem> {
        keys.into_iter().filter_map(|key| self.tree.items.get(key)).collect()
    }

    /// Node currently holding an item
    pub fn find_node_containing(&self, key: ItemKey) -> Option<NodeKey> {
        self.tree.find_node_containing(self.root, key)
    }

    /// Node behind a key
    pub fn node(&self, key: NodeKey) -> Option<&PartitionNode> {
        self.tree.nodes.get(key)
    }

    /// Bounds of a node
    pub fn node_rect(&self, key: NodeKey) -> Option<Rect> {
        self.node(key).map(PartitionNode::rect)
    }

    /// Root node key
    pub fn root(&self) -> NodeKey {
        self.root
    }

    /// Rectangle covered by the root
    pub fn world_rect(&self) -> Rect {
        self.node_rect(self.root).unwrap_or_else(|| Rect::from_size(Vec2::zeros()))
    }

    /// Number of stored items
    pub fn len(&self) -> usize {
        self.tree.items.len()
    }

    /// Whether the index stores no items
    pub fn is_empty(&self) -> bool {
        self.tree.items.is_empty()
    }

    /// Number of live partition nodes
    pub fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    /// Depth of the deepest node (0 = root only)
    pub fn depth(&self) -> u32 {
        self.tree.max_depth_below(self.root)
    }

    /// Per-node item capacity
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    /// Active configuration
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(size: f32, capacity: usize) -> SpatialIndex {
        SpatialIndex::with_size(Vec2::new(size, size), capacity)
    }

    fn square(id: &str, x: f32, y: f32, size: f32) -> SpatialItem {
        SpatialItem::new(id, Vec2::new(x, y), Vec2::new(size, size))
    }

    fn ids(items: Vec<&SpatialItem>) -> Vec<String> {
        let mut ids: Vec<String> = items.iter().map(|i| i.id().to_string()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_basic_insertion() {
        let mut index = index(100.0, 4);
        let key = index.insert(square("a", 10.0, 10.0, 2.0));

        assert_eq!(index.len(), 1);
        assert_eq!(index.find_node_containing(key), Some(index.root()));
        assert_eq!(index.item(key).unwrap().subscribers(), &[index.root()]);
    }

    #[test]
    fn test_subdivision_quadrisects_parent() {
        let mut index = index(100.0, 1);
        index.insert(square("a", 10.0, 10.0, 2.0));
        index.insert(square("b", 90.0, 90.0, 2.0));

        let root = index.node(index.root()).unwrap();
        let children = root.children().unwrap();
        let area: f32 = children
            .iter()
            .map(|&c| {
                let r = index.node_rect(c).unwrap();
                r.width() * r.height()
            })
            .sum();
        assert_eq!(area, 100.0 * 100.0);
        assert_eq!(index.node_count(), 5);
        assert_eq!(index.depth(), 1);
        for &child in &children {
            assert!(root.rect().contains_rect(&index.node_rect(child).unwrap()));
        }
    }

    #[test]
    fn test_insert_outside_grows_world() {
        let mut index = index(100.0, 1);
        let a = index.insert(square("a", 10.0, 10.0, 2.0));
        let b = index.insert(square("b", 90.0, 90.0, 2.0));
        let far = index.insert(square("far", 500.0, -300.0, 10.0));

        let world = index.world_rect();
        for key in [a, b, far] {
            let item = index.item(key).unwrap();
            assert!(world.contains_rect(&item.rect()));
            assert!(index.find_node_containing(key).is_some());
        }
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_growth_contains_required_rect_with_positive_corner() {
        let mut index = SpatialIndex::new(
            Rect::from_edges(100.0, 100.0, 200.0, 200.0),
            IndexConfig::default(),
        );
        let key = index.insert(square("a", 150.0, 150.0, 2.0));

        assert!(index.move_item(key, Vec2::new(250.0, 150.0)));
        let world = index.world_rect();
        assert!(world.contains_rect(&index.item(key).unwrap().rect()));
        assert!(world.contains_rect(&Rect::from_edges(100.0, 100.0, 200.0, 200.0)));
    }

    #[test]
    fn test_move_outside_grows_world() {
        let mut index = index(100.0, 2);
        let key = index.insert(square("a", 10.0, 10.0, 2.0));

        assert!(index.move_item(key, Vec2::new(-40.0, 180.0)));
        let item = index.item(key).unwrap();
        assert!(index.world_rect().contains_rect(&item.rect()));
        assert_eq!(item.subscribers().len(), 1);
        assert_eq!(index.find_node_containing(key), item.subscribers().first().copied());
    }

    #[test]
    fn test_move_keeps_single_subscriber() {
        let mut index = index(100.0, 1);
        let keys: Vec<ItemKey> = [(10.0, 10.0), (90.0, 10.0), (10.0, 90.0), (90.0, 90.0)]
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| index.insert(square(&format!("item{i}"), x, y, 2.0)))
            .collect();

        for (step, &key) in keys.iter().enumerate() {
            let offset = step as f32 * 7.0;
            assert!(index.move_item(key, Vec2::new(20.0 + offset, 60.0 - offset)));
        }

        for &key in &keys {
            let item = index.item(key).unwrap();
            assert_eq!(item.subscribers().len(), 1);
            let holder = index.find_node_containing(key).unwrap();
            assert_eq!(item.subscribers(), &[holder]);
            assert!(index.node(holder).unwrap().holds(item.id().as_str()));
        }
    }

    #[test]
    fn test_double_move_is_idempotent() {
        let mut index = index(100.0, 1);
        let a = index.insert(square("a", 10.0, 10.0, 2.0));
        index.insert(square("b", 90.0, 90.0, 2.0));

        index.move_item(a, Vec2::new(60.0, 20.0));
        let node = index.find_node_containing(a);
        let count = index.node_count();
        index.move_item(a, Vec2::new(60.0, 20.0));

        assert_eq!(index.find_node_containing(a), node);
        assert_eq!(index.node_count(), count);
    }

    #[test]
    fn test_remove_releases_item() {
        let mut index = index(100.0, 1);
        let a = index.insert(square("a", 10.0, 10.0, 2.0));
        index.insert(square("b", 90.0, 90.0, 2.0));

        let removed = index.remove(a).unwrap();
        assert_eq!(removed.id().as_str(), "a");
        assert!(removed.subscribers().is_empty());
        assert!(index.item(a).is_none());
        assert!(index.remove(a).is_none());
        assert_eq!(index.len(), 1);
        assert!(index.items_at(Vec2::new(10.0, 10.0)).is_empty());
    }

    #[test]
    fn test_queries_span_levels() {
        let mut index = index(100.0, 1);
        index.insert(square("center", 50.0, 50.0, 20.0));
        index.insert(square("nw", 30.0, 30.0, 4.0));
        index.insert(square("se", 80.0, 80.0, 4.0));

        assert_eq!(ids(index.items_at(Vec2::new(42.0, 42.0))), vec!["center"]);
        assert_eq!(
            ids(index.items_in(&Rect::from_edges(25.0, 25.0, 45.0, 45.0))),
            vec!["center", "nw"]
        );
        assert_eq!(ids(index.all_items()), vec!["center", "nw", "se"]);
    }

    #[test]
    fn test_resize_item_migrates_up() {
        let mut index = index(100.0, 1);
        let a = index.insert(square("a", 30.0, 30.0, 2.0));
        index.insert(square("b", 90.0, 90.0, 2.0));
        assert_ne!(index.find_node_containing(a), Some(index.root()));

        assert!(index.resize_item(a, Vec2::new(50.0, 50.0)));
        assert_eq!(index.find_node_containing(a), Some(index.root()));
    }

    #[test]
    fn test_collapse_policy_merges_emptied_subtree() {
        let mut index = SpatialIndex::new(
            Rect::from_size(Vec2::new(100.0, 100.0)),
            IndexConfig {
                capacity: 1,
                collapse_empty_nodes: true,
                ..IndexConfig::default()
            },
        );
        let a = index.insert(square("a", 10.0, 10.0, 2.0));
        let b = index.insert(square("b", 90.0, 90.0, 2.0));
        assert_eq!(index.node_count(), 5);

        index.remove(b);
        assert_eq!(index.node_count(), 1);
        assert_eq!(index.find_node_containing(a), Some(index.root()));
    }

    #[test]
    fn test_partitioning_is_permanent_by_default() {
        let mut index = index(100.0, 1);
        index.insert(square("a", 10.0, 10.0, 2.0));
        let b = index.insert(square("b", 90.0, 90.0, 2.0));

        index.remove(b);
        assert_eq!(index.node_count(), 5);
    }
}
