//! # Physics Error Types
//!
//! Everything that can stop the simulation thread or reject a request.

use thiserror::Error;

use tandem_core::EntityId;

use crate::world::BodyHandle;

/// Result alias used throughout the physics crate.
pub type PhysicsResult<T> = Result<T, PhysicsError>;

/// Errors raised by the physics world and its simulation thread.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// A body factory rejected its request.
    #[error("body factory for {entity} failed: {reason}")]
    FactoryFailed {
        /// Entity the body was meant for.
        entity: EntityId,
        /// Reason given by the factory.
        reason: String,
    },

    /// A handle no longer refers to a body in the world.
    #[error("body {0} is not present in the physics world")]
    UnknownBody(BodyHandle),

    /// A body definition or fixture carried unusable values.
    #[error("invalid body definition: {0}")]
    InvalidBody(String),

    /// The simulation loop panicked.
    #[error("simulation thread panicked: {0}")]
    Panicked(String),

    /// `start` was called while the loop was already running.
    #[error("simulation thread is already running")]
    AlreadyRunning,

    /// The OS refused to spawn the simulation thread.
    #[error("failed to spawn simulation thread: {0}")]
    Spawn(String),

    /// Invalid configuration values.
    #[error("invalid physics configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_entity() {
        let err = PhysicsError::FactoryFailed {
            entity: EntityId::new(3, 1),
            reason: "no shape".into(),
        };
        assert_eq!(
            err.to_string(),
            "body factory for Entity(3v1) failed: no shape"
        );
    }
}
