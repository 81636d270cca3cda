//! Spatial partitioning data structures
//!
//! Provides the adaptive quadtree used by the collision engine's broad phase.

mod item;
mod node;
mod quadtree;
mod spatial_query;

pub use item::{ItemEvent, ItemNotification, ItemShape, SpatialItem};
pub use node::PartitionNode;
pub use quadtree::{IndexConfig, SpatialIndex};
pub use spatial_query::SpatialQuery;
