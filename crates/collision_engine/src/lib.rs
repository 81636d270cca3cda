//! # Collision Engine
//!
//! A 2D collision engine built on an adaptive quadtree.
//!
//! ## Features
//!
//! - **Quadtree Broad Phase**: Nodes subdivide on overflow and items migrate
//!   between levels as they move
//! - **Self-Resizing World**: Items outside the world grow it without losing
//!   existing entities
//! - **Directional Narrow Phase**: Overlaps report which sides they came from
//! - **Incremental Mode**: Per-tick pair cache with entered/exited events
//! - **Polygon Refinement**: Convex polygons tested with separating axes
//!
//! ## Quick Start
//!
//! ```rust
//! use collision_engine::prelude::*;
//!
//! fn main() -> Result<(), CollisionError> {
//!     let mut engine = CollisionEngine::with_world(Vec2::new(1000.0, 1000.0), 4)?;
//!     engine.register("ship", Vec2::new(45.0, 50.0), Vec2::new(10.0, 10.0));
//!     engine.register("rock", Vec2::new(50.0, 50.0), Vec2::new(10.0, 10.0));
//!
//!     let response = engine.check_collision("rock", "ship")?;
//!     assert!(response.collided);
//!     assert!(response.sides.has(Direction::West));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod entity;
pub mod foundation;
pub mod geometry;
pub mod physics;
pub mod spatial;

pub use config::{Config, ConfigError, MoveMode, WorldConfig};
pub use entity::EntityId;
pub use physics::{CollisionEngine, CollisionError, CollisionEvents, CollisionPair};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, MoveMode, WorldConfig},
        entity::EntityId,
        foundation::math::Vec2,
        geometry::{CollisionResponse, Direction, Polygon, Rect, Sides},
        physics::{CollisionEngine, CollisionError, CollisionEvents, CollisionPair, WorldSnapshot},
        spatial::{SpatialIndex, SpatialItem, SpatialQuery},
    };
}
