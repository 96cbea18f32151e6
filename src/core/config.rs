//! Arena configuration
//!
//! An arena bundles the navigation grid layout, obstacles and the agents to
//! spawn. Arenas are saved and loaded as RON or JSON.

use std::fs;
use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::ai::{EnemyConfig, GridConfig, PathfinderConfig};
use crate::physics::ObstacleDesc;

/// A potential target placed at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSpawn {
    #[serde(default)]
    pub name: Option<String>,
    pub position: Vec2,
    /// Constant drift applied by the demo loop
    #[serde(default)]
    pub velocity: Vec2,
}

/// An enemy placed at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpawn {
    pub name: String,
    pub position: Vec2,
    #[serde(default)]
    pub config: EnemyConfig,
}

/// Fixed-step run settings for headless playback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Seconds per tick
    pub timestep: f32,
    /// Seconds to simulate
    pub duration: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timestep: 1.0 / 60.0,
            duration: 10.0,
        }
    }
}

impl RunConfig {
    /// Number of ticks covering `duration`
    #[must_use]
    pub fn steps(&self) -> u32 {
        if self.timestep <= 0.0 {
            return 0;
        }
        (self.duration / self.timestep).ceil() as u32
    }
}

/// A complete arena description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub name: String,
    /// Format version for compatibility
    pub version: u32,
    pub grid: GridConfig,
    pub pathfinder: PathfinderConfig,
    pub obstacles: Vec<ObstacleDesc>,
    pub targets: Vec<TargetSpawn>,
    pub enemies: Vec<EnemySpawn>,
    pub run: RunConfig,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

impl ArenaConfig {
    /// Create an empty arena with default grid settings
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 1,
            grid: GridConfig::default(),
            pathfinder: PathfinderConfig::default(),
            obstacles: Vec::new(),
            targets: Vec::new(),
            enemies: Vec::new(),
            run: RunConfig::default(),
        }
    }

    /// Check values that would make the arena unusable
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.node_radius <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "node_radius must be positive, got {}",
                self.grid.node_radius
            )));
        }
        if self.grid.world_size.x <= 0.0 || self.grid.world_size.y <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "world_size must be positive, got {}",
                self.grid.world_size
            )));
        }
        if self.run.timestep <= 0.0 {
            return Err(ConfigError::Invalid("timestep must be positive".into()));
        }
        for spawn in &self.enemies {
            if spawn.config.max_health <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "enemy '{}' has non-positive max_health",
                    spawn.name
                )));
            }
        }
        Ok(())
    }

    /// Parse RON text
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the arena is invalid
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let arena: Self =
            ron::from_str(text).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        arena.validate()?;
        Ok(arena)
    }

    /// Render as pretty RON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Parse JSON text
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails or the arena is invalid
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let arena: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        arena.validate()?;
        Ok(arena)
    }

    /// Render as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails
    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Save the arena to a RON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_ron(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_ron_string()?).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Save the arena to a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or serialization fails
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json_string()?).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Load an arena, picking the format from the extension (`.json`, else RON)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_ron_str(&content)
        }
    }
}

/// Errors that can occur while loading or saving an arena
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// IO error
    Io(String),
    /// Serialization error
    Serialize(String),
    /// Deserialization error
    Deserialize(String),
    /// Parsed but unusable
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {e}"),
            ConfigError::Serialize(e) => write!(f, "Serialization error: {e}"),
            ConfigError::Deserialize(e) => write!(f, "Deserialization error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid arena: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
