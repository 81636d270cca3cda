//! Quadtree partition nodes
//!
//! Each node covers a rectangle of space and holds up to `capacity` items.
//! When a leaf overflows it subdivides into four quadrants and pushes every
//! item that fits into a child; items straddling the quadrant boundaries
//! stay at the coarser level. Nodes and items live in slot map arenas owned
//! by [`NodeTree`]; parent links are plain keys, never ownership.

use std::collections::HashMap;

use crate::entity::EntityId;
use crate::foundation::collections::{ItemArena, ItemKey, NodeArena, NodeKey};
use crate::foundation::math::Vec2;
use crate::geometry::Rect;

use super::item::SpatialItem;

/// Single node in the quadtree hierarchy
#[derive(Debug, Clone)]
pub struct PartitionNode {
    rect: Rect,
    capacity: usize,
    items: HashMap<EntityId, ItemKey>,
    children: Option<[NodeKey; 4]>,
    parent: Option<NodeKey>,
    depth: u32,
}

impl PartitionNode {
    fn new(rect: Rect, capacity: usize, parent: Option<NodeKey>, depth: u32) -> Self {
        Self {
            rect,
            capacity,
            items: HashMap::new(),
            children: None,
            parent,
            depth,
        }
    }

    /// World-space bounds of this node
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Item count that triggers subdivision when exceeded
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    /// Check if this node is the root
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Child quadrants: top-left, top-right, bottom-left, bottom-right
    pub fn children(&self) -> Option<[NodeKey; 4]> {
        self.children
    }

    /// Parent node, `None` for the root
    pub fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    /// Depth in the tree (0 = root)
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Number of items held directly by this node
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this node holds no items directly
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether this node holds the given entity directly
    pub fn holds(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Identities held directly by this node
    pub fn ids(&self) -> impl Iterator<Item = &EntityId> {
        self.items.keys()
    }
}

/// Result of delivering a move notification to a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum MoveOutcome {
    /// The node no longer holds the item and dropped its subscription
    Unsubscribed,
    /// The item still fits this node and stays
    Stayed,
    /// The item moved into a finer descendant
    PushedDown,
    /// The item moved to the given ancestor
    PushedUp(NodeKey),
    /// The item now lies outside the root; the world must grow to `required`
    OutOfBounds {
        /// Union of the current world and the item's bounds
        required: Rect,
    },
}

/// Arena-backed node tree with the item storage it indexes
#[derive(Debug)]
pub(crate) struct NodeTree {
    pub(crate) nodes: NodeArena<PartitionNode>,
    pub(crate) items: ItemArena<SpatialItem>,
    capacity: usize,
    max_depth: u32,
}

impl NodeTree {
    pub(crate) fn new(capacity: usize, max_depth: u32) -> Self {
        Self {
            nodes: NodeArena::with_key(),
            items: ItemArena::with_key(),
            capacity: capacity.max(1),
            max_depth,
        }
    }

    pub(crate) fn create_node(&mut self, rect: Rect, parent: Option<NodeKey>, depth: u32) -> NodeKey {
        self.nodes
            .insert(PartitionNode::new(rect, self.capacity, parent, depth))
    }

    fn node_rect(&self, node: NodeKey) -> Option<Rect> {
        self.nodes.get(node).map(PartitionNode::rect)
    }

    fn item_id(&self, item: ItemKey) -> Option<EntityId> {
        self.items.get(item).map(|i| i.id().clone())
    }

    /// Insert an item into a node, delegating to a child that fully contains it
    pub(crate) fn insert(&mut self, node: NodeKey, item: ItemKey) {
        if self.insert_in_child(node, item) {
            return;
        }

        let Some(id) = self.item_id(item) else {
            return;
        };
        let Some(target) = self.nodes.get_mut(node) else {
            return;
        };
        target.items.insert(id, item);
        let should_partition = target.is_leaf()
            && target.items.len() > target.capacity
            && target.depth < self.max_depth;

        if let Some(entry) = self.items.get_mut(item) {
            entry.subscribe(node);
        }

        if should_partition {
            self.partition(node);
        }
    }

    /// Insert an item into whichever child fully contains it
    fn insert_in_child(&mut self, node: NodeKey, item: ItemKey) -> bool {
        let Some(children) = self.nodes.get(node).and_then(PartitionNode::children) else {
            return false;
        };
        let Some(rect) = self.items.get(item).map(SpatialItem::rect) else {
            return false;
        };

        let fitting = children
            .into_iter()
            .find(|&child| self.node_rect(child).is_some_and(|r| r.contains_rect(&rect)));

        match fitting {
            Some(child) => {
                self.insert(child, item);
                true
            }
            None => false,
        }
    }

    /// Split a leaf into four quadrants and push its items down where they fit
    fn partition(&mut self, node: NodeKey) {
        let Some((rect, depth)) = self.nodes.get(node).map(|n| (n.rect, n.depth)) else {
            return;
        };

        let quadrants = rect.quadrants();
        let children = quadrants.map(|quadrant| self.create_node(quadrant, Some(node), depth + 1));

        let held: Vec<EntityId> = match self.nodes.get_mut(node) {
            Some(n) => {
                n.children = Some(children);
                n.items.keys().cloned().collect()
            }
            None => return,
        };

        let mut pushed = 0;
        for id in &held {
            if self.push_item_down(node, id) {
                pushed += 1;
            }
        }

        log::debug!(
            "Partitioned node at depth {} ({} of {} items pushed down)",
            depth,
            pushed,
            held.len()
        );
    }

    /// Move a held item into a fitting child
    fn push_item_down(&mut self, node: NodeKey, id: &EntityId) -> bool {
        let Some(item) = self.nodes.get(node).and_then(|n| n.items.get(id).copied()) else {
            return false;
        };
        if !self.insert_in_child(node, item) {
            return false;
        }
        self.remove_item(node, id.as_str());
        true
    }

    /// Drop an item from a node and cancel the node's subscription
    pub(crate) fn remove_item(&mut self, node: NodeKey, id: &str) -> bool {
        let Some(item) = self.nodes.get_mut(node).and_then(|n| n.items.remove(id)) else {
            return false;
        };
        if let Some(entry) = self.items.get_mut(item) {
            entry.unsubscribe(node);
        }
        true
    }

    /// React to a move notification delivered to `node`
    ///
    /// Tries the finer placement first, then keeps the item if it still
    /// fits, then climbs to the nearest ancestor that contains it. Reaching
    /// the root without a fit reports [`MoveOutcome::OutOfBounds`]; the item
    /// is left held by the root until the world is rebuilt.
    pub(crate) fn item_moved(&mut self, node: NodeKey, item: ItemKey) -> MoveOutcome {
        let Some(id) = self.item_id(item) else {
            return MoveOutcome::Unsubscribed;
        };
        let holds = self.nodes.get(node).is_some_and(|n| n.holds(id.as_str()));
        if !holds {
            if let Some(entry) = self.items.get_mut(item) {
                entry.unsubscribe(node);
            }
            return MoveOutcome::Unsubscribed;
        }

        if self.push_item_down(node, &id) {
            log::trace!("Item {} pushed down", id);
            return MoveOutcome::PushedDown;
        }

        let Some(rect) = self.items.get(item).map(SpatialItem::rect) else {
            return MoveOutcome::Unsubscribed;
        };
        let Some((node_rect, parent)) = self.nodes.get(node).map(|n| (n.rect, n.parent)) else {
            return MoveOutcome::Unsubscribed;
        };
        if node_rect.contains_rect(&rect) {
            return MoveOutcome::Stayed;
        }

        let Some(parent) = parent else {
            return MoveOutcome::OutOfBounds {
                required: node_rect.union(&rect),
            };
        };

        self.remove_item(node, id.as_str());
        let target = self.ascend(parent, &rect);
        self.insert(target, item);
        log::trace!("Item {} pushed up", id);

        match self.nodes.get(target) {
            Some(t) if t.is_root() && !t.rect.contains_rect(&rect) => MoveOutcome::OutOfBounds {
                required: t.rect.union(&rect),
            },
            _ => MoveOutcome::PushedUp(target),
        }
    }

    /// Climb from `start` to the first node containing `rect`, or the root
    fn ascend(&self, start: NodeKey, rect: &Rect) -> NodeKey {
        let mut current = start;
        while let Some(node) = self.nodes.get(current) {
            match node.parent {
                Some(parent) if !node.rect.contains_rect(rect) => current = parent,
                _ => break,
            }
        }
        current
    }

    /// Find the node holding an item, descending only through containing children
    pub(crate) fn find_node_containing(&self, node: NodeKey, item: ItemKey) -> Option<NodeKey> {
        let entry = self.items.get(item)?;
        self.find_node_for(node, entry.id().as_str(), &entry.rect())
    }

    fn find_node_for(&self, node: NodeKey, id: &str, rect: &Rect) -> Option<NodeKey> {
        let current = self.nodes.get(node)?;
        if current.holds(id) {
            return Some(node);
        }

        current
            .children?
            .into_iter()
            .filter(|&child| self.node_rect(child).is_some_and(|r| r.contains_rect(rect)))
            .find_map(|child| self.find_node_for(child, id, rect))
    }

    /// Collect items whose bounds contain a point
    pub(crate) fn items_at(&self, node: NodeKey, point: Vec2, found: &mut Vec<ItemKey>) {
        let Some(current) = self.nodes.get(node) else {
            return;
        };
        if !current.rect.contains(point) {
            return;
        }

        found.extend(
            current
                .items
                .values()
                .copied()
                .filter(|&key| self.items.get(key).is_some_and(|i| i.rect().contains(point))),
        );

        for child in current.children.into_iter().flatten() {
            if self.node_rect(child).is_some_and(|r| r.contains(point)) {
                self.items_at(child, point, found);
            }
        }
    }

    /// Collect items whose bounds intersect a rectangle
    pub(crate) fn items_in(&self, node: NodeKey, area: &Rect, found: &mut Vec<ItemKey>) {
        let Some(current) = self.nodes.get(node) else {
            return;
        };
        if !current.rect.intersects(area) {
            return;
        }

        found.extend(
            current
                .items
                .values()
                .copied()
                .filter(|&key| self.items.get(key).is_some_and(|i| i.rect().intersects(area))),
        );

        for child in current.children.into_iter().flatten() {
            if self.node_rect(child).is_some_and(|r| r.intersects(area)) {
                self.items_in(child, area, found);
            }
        }
    }

    /// Collect every item in a subtree
    pub(crate) fn all_items(&self, node: NodeKey, found: &mut Vec<ItemKey>) {
        let Some(current) = self.nodes.get(node) else {
            return;
        };
        found.extend(current.items.values().copied());
        for child in current.children.into_iter().flatten() {
            self.all_items(child, found);
        }
    }

    /// Count every item in a subtree
    pub(crate) fn subtree_len(&self, node: NodeKey) -> usize {
        self.nodes.get(node).map_or(0, |current| {
            current.items.len()
                + current
                    .children
                    .into_iter()
                    .flatten()
                    .map(|child| self.subtree_len(child))
                    .sum::<usize>()
        })
    }

    /// Destroy a subtree, releasing every subscription it holds
    ///
    /// Items stay in the item arena; only the nodes are discarded.
    pub(crate) fn destroy(&mut self, node: NodeKey) {
        let Some(removed) = self.nodes.remove(node) else {
            return;
        };
        for child in removed.children.into_iter().flatten() {
            self.destroy(child);
        }
        for item in removed.items.into_values() {
            if let Some(entry) = self.items.get_mut(item) {
                entry.unsubscribe(node);
            }
        }
    }

    /// Merge the children of the highest ancestor whose subtree fits in one leaf
    ///
    /// Walks from `start` to the root. Returns the collapsed node, if any.
    pub(crate) fn collapse_from(&mut self, start: NodeKey) -> Option<NodeKey> {
        let mut candidate = None;
        let mut current = Some(start);
        while let Some(key) = current {
            let node = self.nodes.get(key)?;
            if !node.is_leaf() && self.subtree_len(key) <= node.capacity {
                candidate = Some(key);
            }
            current = node.parent;
        }

        let target = candidate?;
        self.collapse(target);
        Some(target)
    }

    fn collapse(&mut self, node: NodeKey) {
        let Some(children) = self.nodes.get_mut(node).and_then(|n| n.children.take()) else {
            return;
        };

        let mut moved = Vec::new();
        for child in children {
            self.all_items(child, &mut moved);
            self.destroy(child);
        }

        for item in &moved {
            let Some(entry) = self.items.get_mut(*item) else {
                continue;
            };
            entry.subscribe(node);
            let id = entry.id().clone();
            if let Some(target) = self.nodes.get_mut(node) {
                target.items.insert(id, *item);
            }
        }

        log::debug!("Collapsed node into a leaf holding {} items", self.subtree_len(node));
    }

    /// Number of live nodes
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Deepest node depth in a subtree
    pub(crate) fn max_depth_below(&self, node: NodeKey) -> u32 {
        self.nodes.get(node).map_or(0, |current| {
            current
                .children
                .into_iter()
                .flatten()
                .map(|child| self.max_depth_below(child))
                .max()
                .unwrap_or(current.depth)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with_root(size: f32, capacity: usize) -> (NodeTree, NodeKey) {
        let mut tree = NodeTree::new(capacity, 8);
        let root = tree.create_node(Rect::from_size(Vec2::new(size, size)), None, 0);
        (tree, root)
    }

    fn add(tree: &mut NodeTree, root: NodeKey, id: &str, x: f32, y: f32, size: f32) -> ItemKey {
        let key = tree
            .items
            .insert(SpatialItem::new(id, Vec2::new(x, y), Vec2::new(size, size)));
        tree.insert(root, key);
        key
    }

    #[test]
    fn test_leaf_holds_items_up_to_capacity() {
        let (mut tree, root) = tree_with_root(100.0, 2);
        add(&mut tree, root, "a", 10.0, 10.0, 2.0);
        add(&mut tree, root, "b", 90.0, 90.0, 2.0);

        let node = &tree.nodes[root];
        assert!(node.is_leaf());
        assert_eq!(node.len(), 2);
    }

    #[test]
    fn test_overflow_partitions_into_quadrants() {
        let (mut tree, root) = tree_with_root(100.0, 1);
        let a = add(&mut tree, root, "a", 10.0, 10.0, 2.0);
        let b = add(&mut tree, root, "b", 90.0, 90.0, 2.0);

        let node = &tree.nodes[root];
        assert!(!node.is_leaf());
        assert!(node.is_empty());

        let children = node.children().unwrap();
        assert_eq!(tree.nodes[children[0]].rect(), Rect::from_edges(0.0, 0.0, 50.0, 50.0));
        assert_eq!(tree.nodes[children[3]].rect(), Rect::from_edges(50.0, 50.0, 100.0, 100.0));
        assert!(tree.nodes[children[0]].holds("a"));
        assert!(tree.nodes[children[3]].holds("b"));

        assert_eq!(tree.items[a].subscribers(), &[children[0]]);
        assert_eq!(tree.items[b].subscribers(), &[children[3]]);
    }

    #[test]
    fn test_straddling_item_stays_at_coarser_level() {
        let (mut tree, root) = tree_with_root(100.0, 1);
        add(&mut tree, root, "center", 50.0, 50.0, 10.0);
        add(&mut tree, root, "corner", 10.0, 10.0, 2.0);

        assert!(tree.nodes[root].holds("center"));
        assert!(!tree.nodes[root].holds("corner"));
        assert_eq!(tree.subtree_len(root), 2);
    }

    #[test]
    fn test_depth_limit_stops_partitioning() {
        let mut tree = NodeTree::new(1, 3);
        let root = tree.create_node(Rect::from_size(Vec2::new(64.0, 64.0)), None, 0);
        for i in 0..4 {
            add(&mut tree, root, &format!("p{i}"), 1.0, 1.0, 0.0);
        }
        assert_eq!(tree.subtree_len(root), 4);
        assert_eq!(tree.max_depth_below(root), 3);
    }

    #[test]
    fn test_move_pushes_item_up_and_down() {
        let (mut tree, root) = tree_with_root(100.0, 1);
        let a = add(&mut tree, root, "a", 10.0, 10.0, 2.0);
        add(&mut tree, root, "b", 90.0, 90.0, 2.0);
        let children = tree.nodes[root].children().unwrap();

        // Straddle the midpoint: climbs back to the root
        let _ = tree.items[a].set_position(Vec2::new(50.0, 50.0));
        let outcome = tree.item_moved(children[0], a);
        assert_eq!(outcome, MoveOutcome::PushedUp(root));
        assert!(tree.nodes[root].holds("a"));
        assert_eq!(tree.items[a].subscribers(), &[root]);

        // Back into a quadrant: sinks again
        let _ = tree.items[a].set_position(Vec2::new(80.0, 20.0));
        assert_eq!(tree.item_moved(root, a), MoveOutcome::PushedDown);
        assert_eq!(tree.find_node_containing(root, a), Some(children[1]));
    }

    #[test]
    fn test_move_outside_root_reports_out_of_bounds() {
        let (mut tree, root) = tree_with_root(100.0, 4);
        let a = add(&mut tree, root, "a", 10.0, 10.0, 2.0);

        let _ = tree.items[a].set_position(Vec2::new(150.0, 10.0));
        match tree.item_moved(root, a) {
            MoveOutcome::OutOfBounds { required } => {
                assert!(required.contains_rect(&tree.items[a].rect()));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_stale_subscriber_unsubscribes() {
        let (mut tree, root) = tree_with_root(100.0, 4);
        let other = tree.create_node(Rect::from_size(Vec2::new(10.0, 10.0)), None, 0);
        let a = add(&mut tree, root, "a", 10.0, 10.0, 2.0);
        tree.items[a].subscribe(other);

        assert_eq!(tree.item_moved(other, a), MoveOutcome::Unsubscribed);
        assert_eq!(tree.items[a].subscribers(), &[root]);
    }

    #[test]
    fn test_queries_collect_from_every_level() {
        let (mut tree, root) = tree_with_root(100.0, 1);
        let center = add(&mut tree, root, "center", 50.0, 50.0, 10.0);
        let corner = add(&mut tree, root, "corner", 48.0, 48.0, 2.0);
        let far = add(&mut tree, root, "far", 90.0, 90.0, 2.0);

        let mut found = Vec::new();
        tree.items_at(root, Vec2::new(48.0, 48.0), &mut found);
        found.sort();
        let mut expected = vec![center, corner];
        expected.sort();
        assert_eq!(found, expected);

        let mut found = Vec::new();
        tree.items_in(root, &Rect::from_edges(85.0, 85.0, 95.0, 95.0), &mut found);
        assert_eq!(found, vec![far]);

        let mut all = Vec::new();
        tree.all_items(root, &mut all);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_destroy_releases_subscriptions() {
        let (mut tree, root) = tree_with_root(100.0, 1);
        let a = add(&mut tree, root, "a", 10.0, 10.0, 2.0);
        let b = add(&mut tree, root, "b", 90.0, 90.0, 2.0);

        tree.destroy(root);
        assert_eq!(tree.node_count(), 0);
        assert!(tree.items[a].subscribers().is_empty());
        assert!(tree.items[b].subscribers().is_empty());
    }

    #[test]
    fn test_collapse_merges_children() {
        let (mut tree, root) = tree_with_root(100.0, 1);
        let a = add(&mut tree, root, "a", 10.0, 10.0, 2.0);
        add(&mut tree, root, "b", 90.0, 90.0, 2.0);
        let children = tree.nodes[root].children().unwrap();

        assert!(tree.remove_item(children[3], "b"));
        assert_eq!(tree.collapse_from(children[3]), Some(root));
        assert!(tree.nodes[root].is_leaf());
        assert!(tree.nodes[root].holds("a"));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.items[a].subscribers(), &[root]);
    }
}
