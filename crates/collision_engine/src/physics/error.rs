//! Collision engine errors

use crate::config::ConfigError;
use crate::entity::EntityId;

/// Errors reported by the collision engine
#[derive(thiserror::Error, Debug)]
pub enum CollisionError {
    /// No entity is registered under this identifier
    #[error("Unknown entity: {0}")]
    UnknownEntity(EntityId),

    /// An entity is already registered under this identifier
    #[error("Entity already registered: {0}")]
    DuplicateEntity(EntityId),

    /// The registry knows the entity but no partition node holds it
    #[error("Entity {0} is registered but missing from the spatial index")]
    Desync(EntityId),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
