//! Collision detection over the quadtree index
//!
//! Provides the entity registry, directional pairwise queries, and the
//! incremental per-tick pair cache.

pub mod collision_cache;
pub mod collision_engine;
pub mod error;
pub mod snapshot;

#[cfg(test)]
mod tests;

pub use collision_cache::{CachedPair, CollisionCache, CollisionEvents, CollisionPair};
pub use collision_engine::CollisionEngine;
pub use error::CollisionError;
pub use snapshot::{SnapshotItem, WorldSnapshot};
