//! Serializable world snapshots

use serde::{Deserialize, Serialize};

use crate::config::{Config, WorldConfig};
use crate::entity::EntityId;
use crate::foundation::math::Vec2;
use crate::geometry::Polygon;

/// One registered entity in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotItem {
    /// Entity identity
    pub id: EntityId,
    /// Center position (polygon origin for polygon entities)
    pub position: Vec2,
    /// Bounding size
    pub size: Vec2,
    /// Polygon shape with vertices relative to `position`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub polygon: Option<Polygon>,
}

/// Persisted state of a collision world
///
/// Saved and loaded through [`Config`], so TOML and RON both work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSnapshot {
    /// World configuration
    pub config: WorldConfig,
    /// Registered entities sorted by identity
    pub items: Vec<SnapshotItem>,
}

impl Config for WorldSnapshot {}
