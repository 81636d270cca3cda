//! Sandbox configuration

use collision_engine::config::{Config, WorldConfig};
use serde::{Deserialize, Serialize};

/// Sandbox run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Number of randomly placed bodies
    pub body_count: usize,

    /// Number of simulation ticks to run
    pub ticks: u32,

    /// Seconds advanced per tick
    pub time_step: f32,

    /// Maximum body speed in world units per second
    pub max_speed: f32,

    /// Smallest body edge length
    pub min_size: f32,

    /// Largest body edge length
    pub max_size: f32,

    /// Seed for reproducible runs; random when absent
    pub seed: Option<u64>,

    /// Collision world settings
    pub world: WorldConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            body_count: 64,
            ticks: 600,
            time_step: 1.0 / 60.0,
            max_speed: 120.0,
            min_size: 4.0,
            max_size: 24.0,
            seed: None,
            world: WorldConfig {
                name: "sandbox".to_string(),
                ..WorldConfig::default()
            },
        }
    }
}

impl Config for SandboxConfig {}
