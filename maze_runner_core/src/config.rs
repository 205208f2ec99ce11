use std::path::Path;

use serde::{Deserialize, Serialize};

/// Errors raised while loading or validating a [`GameConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Cell size must be a finite number greater than 2, got {0}")]
    InvalidCellSize(f64),
    #[error("Player speed must be a finite positive number, got {0}")]
    InvalidSpeed(f64),
    #[error("Player speed {speed} must be smaller than the agent radius {radius}")]
    SpeedExceedsRadius { speed: f64, radius: f64 },
}

/// Tunable simulation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Edge length of one grid cell in world units.
    pub cell_size: f64,
    /// Distance the agent travels per tick.
    pub player_speed: f64,
    /// Score awarded for each collected pickup.
    pub dot_points: u32,
}

impl GameConfig {
    pub const DEFAULT_CELL_SIZE: f64 = 16.0;
    pub const DEFAULT_PLAYER_SPEED: f64 = 0.7;
    pub const DEFAULT_DOT_POINTS: u32 = 10;

    pub fn new() -> Self {
        Self {
            cell_size: Self::DEFAULT_CELL_SIZE,
            player_speed: Self::DEFAULT_PLAYER_SPEED,
            dot_points: Self::DEFAULT_DOT_POINTS,
        }
    }

    /// Parses a JSON document. Missing fields fall back to their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Radius of the agent's circular hitbox.
    pub fn agent_radius(&self) -> f64 {
        crate::collision::default_radius(self.cell_size)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.cell_size.is_finite() || self.cell_size <= 2.0 {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        if !self.player_speed.is_finite() || self.player_speed <= 0.0 {
            return Err(ConfigError::InvalidSpeed(self.player_speed));
        }
        let radius = self.agent_radius();
        if self.player_speed >= radius {
            return Err(ConfigError::SpeedExceedsRadius {
                speed: self.player_speed,
                radius,
            });
        }
        Ok(())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
