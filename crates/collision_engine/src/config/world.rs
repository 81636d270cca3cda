//! World configuration

use serde::{Deserialize, Serialize};

use super::{Config, ConfigError};
use crate::foundation::math::Vec2;
use crate::geometry::Rect;
use crate::spatial::IndexConfig;

/// How `move_entity` interprets its vector argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveMode {
    /// The vector is the new center position
    #[default]
    Absolute,
    /// The vector is added to the current position
    Relative,
}

/// Collision world configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// World name, used in log output
    pub name: String,

    /// Initial world extents; the world's top-left corner is the origin
    pub world_size: Vec2,

    /// Maximum items per node before subdivision
    pub node_capacity: usize,

    /// Maximum subdivision depth
    pub max_depth: u32,

    /// Factor applied when the world grows to fit an item
    pub growth_factor: f32,

    /// Interpretation of `move_entity` vectors
    pub move_mode: MoveMode,

    /// Merge emptied subtrees back into leaves
    pub collapse_empty_nodes: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: "world".to_string(),
            world_size: Vec2::new(1000.0, 1000.0),
            node_capacity: 4,
            max_depth: 16,
            growth_factor: 2.0,
            move_mode: MoveMode::Absolute,
            collapse_empty_nodes: false,
        }
    }
}

impl Config for WorldConfig {}

impl WorldConfig {
    /// Configuration with the given extents and node capacity, defaults elsewhere
    pub fn with_world(world_size: Vec2, node_capacity: usize) -> Self {
        Self {
            world_size,
            node_capacity,
            ..Self::default()
        }
    }

    /// Check that the configuration describes a usable world
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.node_capacity == 0 {
            return Err(ConfigError::InvalidCapacity(self.node_capacity));
        }
        let (width, height) = (self.world_size.x, self.world_size.y);
        if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
            return Err(ConfigError::InvalidWorldSize { width, height });
        }
        if !(self.growth_factor >= 1.0) || !self.growth_factor.is_finite() {
            return Err(ConfigError::InvalidGrowthFactor(self.growth_factor));
        }
        Ok(())
    }

    /// Initial world rectangle
    pub fn world_rect(&self) -> Rect {
        Rect::from_size(self.world_size)
    }
}

impl From<&WorldConfig> for IndexConfig {
    fn from(config: &WorldConfig) -> Self {
        Self {
            capacity: config.node_capacity,
            max_depth: config.max_depth,
            growth_factor: config.growth_factor,
            collapse_empty_nodes: config.collapse_empty_nodes,
        }
    }
}
