//! World tuning
//!
//! Field size, population targets and zone layout. Loaded from JSON so
//! arenas can be re-tuned without a rebuild; missing keys fall back to the
//! defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`WorldConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Arena layout and population targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length of the square playable field
    pub world_size: f32,
    /// Target number of live hazards
    pub hazard_count: usize,
    /// Target number of live bots
    pub bot_count: usize,
    /// Side length of the central square where rare hazards spawn
    pub center_zone_size: f32,
    /// Width of each team base strip along the left/right edges
    pub base_size: f32,
    /// Idle time (ms, outside a match) before the world is cleared
    pub idle_reset_ms: f64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_size: 5000.0,
            hazard_count: 400,
            bot_count: 24,
            center_zone_size: 1200.0,
            base_size: 800.0,
            idle_reset_ms: 60_000.0,
        }
    }
}

impl WorldConfig {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file on disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded world config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the layout leaves room to spawn hazards
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_size <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "world_size must be positive, got {}",
                self.world_size
            )));
        }
        if self.base_size < 0.0 || self.base_size * 2.0 >= self.world_size {
            return Err(ConfigError::Invalid(format!(
                "base strips ({} each) leave no playable field in a {} world",
                self.base_size, self.world_size
            )));
        }
        if self.center_zone_size <= 0.0 || self.center_zone_size > self.playable_width() {
            return Err(ConfigError::Invalid(format!(
                "center zone {} does not fit the playable width {}",
                self.center_zone_size,
                self.playable_width()
            )));
        }
        Ok(())
    }

    /// Width of the field between the two base strips
    pub fn playable_width(&self) -> f32 {
        self.world_size - 2.0 * self.base_size
    }

    /// Lower corner of the center zone
    pub fn center_zone_min(&self) -> f32 {
        (self.world_size - self.center_zone_size) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.playable_width(), 3400.0);
        assert_eq!(config.center_zone_min(), 1900.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WorldConfig::from_json(r#"{ "bot_count": 4, "hazard_count": 20 }"#).unwrap();
        assert_eq!(config.bot_count, 4);
        assert_eq!(config.hazard_count, 20);
        assert_eq!(config.world_size, 5000.0);
    }

    #[test]
    fn test_rejects_bases_covering_field() {
        let err = WorldConfig::from_json(r#"{ "world_size": 1000.0, "base_size": 500.0 }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = WorldConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_roundtrip_preserves_fields() {
        let config = WorldConfig {
            bot_count: 2,
            ..Default::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(WorldConfig::from_json(&json).unwrap(), config);
    }
}
