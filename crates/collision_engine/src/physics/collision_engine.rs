//! Collision engine
//!
//! Maps external identities to items in the spatial index and answers
//! pairwise collision queries. A query first finds the node holding the
//! first entity; a second entity that does not reach into that node's
//! region cannot collide with it. Only surviving pairs get the exact,
//! direction-classified rectangle test, refined by a polygon test when
//! either entity carries a polygon.

use std::collections::{HashMap, HashSet};

use crate::config::{ConfigError, MoveMode, WorldConfig};
use crate::entity::EntityId;
use crate::foundation::collections::{ItemKey, NodeKey};
use crate::foundation::math::Vec2;
use crate::geometry::{CollisionResponse, Polygon, Rect};
use crate::spatial::{IndexConfig, ItemShape, SpatialIndex, SpatialItem, SpatialQuery};

use super::collision_cache::{CollisionCache, CollisionEvents, CollisionPair};
use super::error::CollisionError;
use super::snapshot::{SnapshotItem, WorldSnapshot};

/// Registry of collidable entities over a quadtree index
#[derive(Debug)]
pub struct CollisionEngine {
    config: WorldConfig,
    index: SpatialIndex,
    registry: HashMap<EntityId, ItemKey>,
    cache: CollisionCache,
}

impl Default for CollisionEngine {
    fn default() -> Self {
        let config = WorldConfig::default();
        Self {
            index: SpatialIndex::new(config.world_rect(), IndexConfig::from(&config)),
            config,
            registry: HashMap::new(),
            cache: CollisionCache::new(),
        }
    }
}

impl CollisionEngine {
    /// Create an engine from a validated configuration
    pub fn new(config: WorldConfig) -> Result<Self, CollisionError> {
        config.validate()?;
        log::info!(
            "Creating collision world '{}' ({} x {}, capacity {})",
            config.name,
            config.world_size.x,
            config.world_size.y,
            config.node_capacity
        );

        Ok(Self {
            index: SpatialIndex::new(config.world_rect(), IndexConfig::from(&config)),
            config,
            registry: HashMap::new(),
            cache: CollisionCache::new(),
        })
    }

    /// Create an engine with the given extents and node capacity
    pub fn with_world(size: Vec2, capacity: usize) -> Result<Self, CollisionError> {
        Self::new(WorldConfig::with_world(size, capacity))
    }

    /// Register a rectangular entity; returns `false` if the id is taken
    pub fn register(&mut self, id: impl Into<EntityId>, position: Vec2, size: Vec2) -> bool {
        self.try_register(id, position, size).is_ok()
    }

    /// Register a rectangular entity
    pub fn try_register(
        &mut self,
        id: impl Into<EntityId>,
        position: Vec2,
        size: Vec2,
    ) -> Result<(), CollisionError> {
        let id = id.into();
        self.ensure_vacant(&id)?;
        self.insert_item(SpatialItem::new(id, position, size));
        Ok(())
    }

    /// Register a polygon entity; returns `false` if the id is taken
    pub fn register_polygon(
        &mut self,
        id: impl Into<EntityId>,
        position: Vec2,
        polygon: Polygon,
    ) -> bool {
        self.try_register_polygon(id, position, polygon).is_ok()
    }

    /// Register a polygon entity with vertices relative to `position`
    pub fn try_register_polygon(
        &mut self,
        id: impl Into<EntityId>,
        position: Vec2,
        polygon: Polygon,
    ) -> Result<(), CollisionError> {
        let id = id.into();
        self.ensure_vacant(&id)?;
        self.insert_item(SpatialItem::with_polygon(id, position, polygon));
        Ok(())
    }

    fn ensure_vacant(&self, id: &EntityId) -> Result<(), CollisionError> {
        if self.registry.contains_key(id) {
            return Err(CollisionError::DuplicateEntity(id.clone()));
        }
        Ok(())
    }

    fn insert_item(&mut self, item: SpatialItem) {
        let id = item.id().clone();
        log::debug!("Registering {} at {:?}", id, item.rect());
        let key = self.index.insert(item);
        self.registry.insert(id, key);
    }

    /// Remove an entity; returns `false` if it is unknown
    pub fn deregister(&mut self, id: &str) -> bool {
        self.try_deregister(id).is_ok()
    }

    /// Remove an entity and every cached pair involving it
    pub fn try_deregister(&mut self, id: &str) -> Result<(), CollisionError> {
        let key = self
            .registry
            .remove(id)
            .ok_or_else(|| CollisionError::UnknownEntity(id.into()))?;
        self.index.remove(key);
        self.cache.purge(id);
        log::debug!("Deregistered {}", id);
        Ok(())
    }

    /// Move an entity according to the configured [`MoveMode`]
    pub fn move_entity(&mut self, id: &str, vector: Vec2) -> bool {
        self.try_move_entity(id, vector).is_ok()
    }

    /// Move an entity according to the configured [`MoveMode`]
    pub fn try_move_entity(&mut self, id: &str, vector: Vec2) -> Result<(), CollisionError> {
        match self.config.move_mode {
            MoveMode::Absolute => self.try_move_to(id, vector),
            MoveMode::Relative => self.try_move_by(id, vector),
        }
    }

    /// Place an entity's center at `position`
    pub fn move_to(&mut self, id: &str, position: Vec2) -> bool {
        self.try_move_to(id, position).is_ok()
    }

    /// Place an entity's center at `position`
    pub fn try_move_to(&mut self, id: &str, position: Vec2) -> Result<(), CollisionError> {
        let key = self.key_of(id)?;
        self.index.move_item(key, position);
        Ok(())
    }

    /// Offset an entity's center by `delta`
    pub fn move_by(&mut self, id: &str, delta: Vec2) -> bool {
        self.try_move_by(id, delta).is_ok()
    }

    /// Offset an entity's center by `delta`
    pub fn try_move_by(&mut self, id: &str, delta: Vec2) -> Result<(), CollisionError> {
        let key = self.key_of(id)?;
        let position = self
            .index
            .item(key)
            .map(SpatialItem::position)
            .ok_or_else(|| CollisionError::Desync(id.into()))?;
        self.index.move_item(key, position + delta);
        Ok(())
    }

    /// Change an entity's size; returns `false` if it is unknown
    pub fn resize_entity(&mut self, id: &str, size: Vec2) -> bool {
        self.try_resize_entity(id, size).is_ok()
    }

    /// Change an entity's bounding size
    pub fn try_resize_entity(&mut self, id: &str, size: Vec2) -> Result<(), CollisionError> {
        let key = self.key_of(id)?;
        self.index.resize_item(key, size);
        Ok(())
    }

    fn key_of(&self, id: &str) -> Result<ItemKey, CollisionError> {
        self.registry
            .get(id)
            .copied()
            .ok_or_else(|| CollisionError::UnknownEntity(id.into()))
    }

    /// Classify `a` against `b`
    ///
    /// Unknown identities report no collision. A registered entity that no
    /// partition node holds is reported as [`CollisionError::Desync`].
    pub fn check_collision(&self, a: &str, b: &str) -> Result<CollisionResponse, CollisionError> {
        let (Some(&key_a), Some(&key_b)) = (self.registry.get(a), self.registry.get(b)) else {
            return Ok(CollisionResponse::NONE);
        };

        let (Some(item_a), Some(item_b)) = (self.index.item(key_a), self.index.item(key_b)) else {
            log::warn!("Registry and index disagree about {} or {}", a, b);
            return Err(CollisionError::Desync(a.into()));
        };

        let Some(node_rect) = self
            .index
            .find_node_containing(key_a)
            .and_then(|node| self.index.node_rect(node))
        else {
            log::warn!("{} is registered but no partition node holds it", a);
            return Err(CollisionError::Desync(a.into()));
        };

        if !item_b.rect().intersects(&node_rect) {
            return Ok(CollisionResponse::NONE);
        }

        Ok(classify(item_a, item_b))
    }

    /// Recompute every candidate pair once and report transitions
    ///
    /// Candidates come from the index; each unordered pair is classified in
    /// both orientations exactly once and cached for
    /// [`check_cached_collision`](Self::check_cached_collision).
    pub fn update(&mut self) -> CollisionEvents {
        self.cache.begin_tick();

        let mut entities: Vec<(&EntityId, ItemKey)> =
            self.registry.iter().map(|(id, &key)| (id, key)).collect();
        entities.sort_by(|a, b| a.0.cmp(b.0));

        let mut processed: HashSet<&EntityId> = HashSet::with_capacity(entities.len());
        for (id, key) in entities {
            let Some(item) = self.index.item(key) else {
                continue;
            };

            for candidate in self.index.keys_in(&item.rect()) {
                let Some(other) = self.index.item(candidate) else {
                    continue;
                };
                if candidate == key || processed.contains(other.id()) {
                    continue;
                }
                self.cache
                    .record(id, other.id(), classify(item, other), classify(other, item));
            }
            processed.insert(id);
        }

        let events = self.cache.events();
        log::debug!(
            "Collision update: {} candidate pairs, {} entered, {} exited",
            self.cache.len(),
            events.entered.len(),
            events.exited.len()
        );
        events
    }

    /// Classification of `a` against `b` from the last [`update`](Self::update)
    pub fn check_cached_collision(&self, a: &str, b: &str) -> CollisionResponse {
        self.cache.lookup(a, b)
    }

    /// Pairs colliding as of the last [`update`](Self::update), sorted
    pub fn colliding_pairs(&self) -> Vec<CollisionPair> {
        self.cache.colliding_pairs()
    }

    /// Discard every entity and start over with a fresh world
    ///
    /// The new world's top-left corner is the origin. Invalid extents or
    /// capacity leave the engine untouched.
    pub fn reset_world(&mut self, size: Vec2, capacity: usize) -> Result<(), ConfigError> {
        let config = WorldConfig {
            world_size: size,
            node_capacity: capacity,
            ..self.config.clone()
        };
        config.validate()?;

        log::info!(
            "Resetting collision world '{}' to {} x {} ({} entities dropped)",
            config.name,
            size.x,
            size.y,
            self.registry.len()
        );
        self.index = SpatialIndex::new(config.world_rect(), IndexConfig::from(&config));
        self.registry.clear();
        self.cache.clear();
        self.config = config;
        Ok(())
    }

    /// Center position of an entity
    pub fn position_of(&self, id: &str) -> Option<Vec2> {
        self.item_of(id).map(SpatialItem::position)
    }

    /// Bounding rectangle of an entity
    pub fn rect_of(&self, id: &str) -> Option<Rect> {
        self.item_of(id).map(SpatialItem::rect)
    }

    /// Partition node currently holding an entity
    pub fn node_of(&self, id: &str) -> Option<NodeKey> {
        let key = self.registry.get(id)?;
        self.index.find_node_containing(*key)
    }

    fn item_of(&self, id: &str) -> Option<&SpatialItem> {
        self.registry.get(id).and_then(|&key| self.index.item(key))
    }

    /// Whether an entity is registered
    pub fn contains(&self, id: &str) -> bool {
        self.registry.contains_key(id)
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no entity is registered
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Entities whose bounds contain a point, sorted
    pub fn entities_at(&self, point: Vec2) -> Vec<EntityId> {
        let mut ids = self.index.query_point(point);
        ids.sort();
        ids
    }

    /// Entities whose bounds intersect a rectangle, sorted
    pub fn entities_in(&self, area: &Rect) -> Vec<EntityId> {
        let mut ids = self.index.query_rect(area);
        ids.sort();
        ids
    }

    /// World name
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Active configuration
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Underlying spatial index
    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }

    /// Capture every registered entity
    pub fn snapshot(&self) -> WorldSnapshot {
        let mut items: Vec<SnapshotItem> = self
            .registry
            .values()
            .filter_map(|&key| self.index.item(key))
            .map(|item| SnapshotItem {
                id: item.id().clone(),
                position: item.position(),
                size: item.size(),
                polygon: match item.shape() {
                    ItemShape::Rect => None,
                    ItemShape::Polygon(polygon) => Some(polygon.clone()),
                },
            })
            .collect();
        items.sort_by(|a, b| a.id.cmp(&b.id));

        WorldSnapshot {
            config: self.config.clone(),
            items,
        }
    }

    /// Rebuild an engine from a snapshot
    pub fn from_snapshot(snapshot: WorldSnapshot) -> Result<Self, CollisionError> {
        let mut engine = Self::new(snapshot.config)?;
        for item in snapshot.items {
            match item.polygon {
                Some(polygon) => engine.try_register_polygon(item.id, item.position, polygon)?,
                None => engine.try_register(item.id, item.position, item.size)?,
            }
        }
        Ok(engine)
    }
}

/// Exact test of `a` against `b`, refined by polygons when present
fn classify(a: &SpatialItem, b: &SpatialItem) -> CollisionResponse {
    let response = a.rect().classified_intersect(&b.rect());
    if response.collided
        && (a.is_polygon() || b.is_polygon())
        && !a.world_polygon().intersects(&b.world_polygon())
    {
        return CollisionResponse::NONE;
    }
    response
}
