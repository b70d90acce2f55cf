//! # Scene Configuration
//!
//! ```toml
//! name = "arena"
//! entity_capacity = 8192
//!
//! [physics]
//! pixels_per_meter = 32.0
//! sleep_interval_ms = 8
//! gravity = [0.0, 9.8]
//! ```
//!
//! Missing keys fall back to their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use tandem_physics::PhysicsConfig;

use crate::error::ConfigError;

/// Default entity slots per scene.
pub const DEFAULT_ENTITY_CAPACITY: usize = 4096;

/// Everything needed to build a [`Scene`](crate::Scene).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Scene name, used in logs.
    pub name: String,
    /// Fixed entity capacity of the store.
    pub entity_capacity: usize,
    /// Simulation thread settings.
    pub physics: PhysicsConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            entity_capacity: DEFAULT_ENTITY_CAPACITY,
            physics: PhysicsConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Config with the given name and defaults elsewhere.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`]/[`ConfigError::Physics`] for bad values.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`SceneConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks ranges.
    ///
    /// # Errors
    ///
    /// Returns the first out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity_capacity == 0 || u32::try_from(self.entity_capacity).is_err() {
            return Err(ConfigError::Invalid(format!(
                "entity_capacity must be in 1..=u32::MAX, got {}",
                self.entity_capacity
            )));
        }
        self.physics.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_partial_document_uses_defaults() {
        let config = SceneConfig::from_toml_str(
            r#"
            name = "arena"

            [physics]
            pixels_per_meter = 32.0
            gravity = [0.0, 9.8]
            "#,
        )
        .unwrap();

        assert_eq!(config.name, "arena");
        assert_eq!(config.entity_capacity, DEFAULT_ENTITY_CAPACITY);
        assert!((config.physics.pixels_per_meter - 32.0).abs() < f32::EPSILON);
        assert_eq!(config.physics.gravity, Vec2::new(0.0, 9.8));
        assert_eq!(config.physics.velocity_iterations, 8);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(SceneConfig::from_toml_str("").unwrap(), SceneConfig::default());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let err = SceneConfig::from_toml_str("entity_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_physics() {
        let err = SceneConfig::from_toml_str("[physics]\nfixed_delta = -1.0").unwrap_err();
        assert!(matches!(err, ConfigError::Physics(_)));
    }

    #[test]
    fn test_rejects_malformed_toml() {
        let err = SceneConfig::from_toml_str("name = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SceneConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
