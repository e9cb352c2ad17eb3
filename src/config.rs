//! Tunables for terrain construction and the walker.
//!
//! Every field has a default, so a JSON file only needs the values it
//! overrides:
//!
//! ```json
//! { "terrain": { "grid_size": 129, "heightmap_path": "assets/heightmap.png" },
//!   "movement": { "walk_speed": 8.0 } }
//! ```

use std::f32::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::motor::MovementSettings;

/// Shape and placement of the terrain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSettings {
    /// Samples per grid edge.
    pub grid_size: usize,
    /// World meters spanned by the grid edge.
    pub world_size: f32,
    /// World meters a normalized sample of `1.0` rises to.
    pub height_scale: f32,
    pub height_offset: f32,
    /// Grayscale heightmap image; procedural terrain is used when absent or unreadable.
    pub heightmap_path: Option<PathBuf>,
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            grid_size: 101,
            world_size: 200.0,
            height_scale: 30.0,
            height_offset: -10.0,
            heightmap_path: None,
        }
    }
}

/// All walker tunables.
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalkerConfig {
    pub terrain: TerrainSettings,
    pub movement: MovementSettings,
}

impl WalkerConfig {
    /// Parses and validates a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks the invariants terrain construction and movement rely on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.terrain;
        let m = &self.movement;
        let c = &m.controller;

        let checks: [(bool, &str); 10] = [
            (t.grid_size >= 2, "terrain.grid_size must be at least 2"),
            (t.world_size.is_finite() && t.world_size > 0.0, "terrain.world_size must be positive"),
            (t.height_scale.is_finite() && t.height_scale >= 0.0, "terrain.height_scale must be non-negative"),
            (m.walk_speed > 0.0 && m.sprint_multiplier > 0.0, "movement speeds must be positive"),
            (m.gravity < 0.0, "movement.gravity must be negative"),
            (m.jump_speed >= 0.0 && m.jump_cooldown >= 0.0, "jump speed and cooldown must be non-negative"),
            (m.ground_stick_velocity <= 0.0, "movement.ground_stick_velocity must not be positive"),
            (m.pitch_limit > 0.0 && m.pitch_limit < FRAC_PI_2, "movement.pitch_limit must lie strictly inside (0, pi/2)"),
            (m.capsule.radius > 0.0 && m.capsule.half_height >= 0.0, "capsule dimensions must be positive"),
            (
                c.offset >= 0.0 && c.max_slope_climb_angle >= 0.0 && c.min_slope_slide_angle >= 0.0,
                "controller offset and angles must be non-negative",
            ),
        ];

        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, msg)) => Err(ConfigError::Invalid((*msg).to_string())),
            None => Ok(()),
        }
    }
}
