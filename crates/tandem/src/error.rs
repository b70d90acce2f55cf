//! # Scene Error Types

use std::path::PathBuf;

use thiserror::Error;

use tandem_physics::PhysicsError;

/// Result alias for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Errors surfaced to the host driving a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    /// The simulation thread stopped on a fault; the scene cannot advance.
    #[error("physics simulation halted: {0}")]
    PhysicsHalted(PhysicsError),

    /// Starting or configuring physics failed.
    #[error(transparent)]
    Physics(#[from] PhysicsError),

    /// The scene configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while loading a [`SceneConfig`](crate::SceneConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// File that was read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for a scene config.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A scene field is out of range.
    #[error("invalid scene configuration: {0}")]
    Invalid(String),

    /// The `[physics]` table is out of range.
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}
