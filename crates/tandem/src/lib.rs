//! # TANDEM
//!
//! Scenes that run a frame scheduler on the main thread beside a
//! fixed-timestep physics thread.
//!
//! ## Architecture Rules
//!
//! 1. **Systems get their dependencies passed in** - every phase receives a
//!    [`SystemContext`]; there are no global singletons
//! 2. **Nothing is despawned mid-frame** - systems queue destruction and the
//!    scene drains it after the last phase
//! 3. **Physics faults stop the scene** - once the simulation thread fails,
//!    [`Scene::game_loop`] returns [`SceneError::PhysicsHalted`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use tandem::{GameClock, MovementSystem, Scene, SceneConfig};
//!
//! let mut scene = Scene::new(SceneConfig::load("scene.toml")?)?;
//! scene.logic_mut().add(MovementSystem::new());
//! scene.initialize()?;
//!
//! let mut clock = GameClock::new();
//! while running {
//!     scene.game_loop(clock.tick())?;
//! }
//! scene.shutdown()?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod collision;
pub mod components;
pub mod config;
pub mod destruction;
pub mod error;
pub mod scene;
pub mod schedule;
pub mod systems;
pub mod time;

#[cfg(test)]
mod testing;

pub use collision::{
    projectile_filter, world_object_filter, GameContactFilter, CATEGORY_DEFAULT,
    CATEGORY_PROJECTILE, CATEGORY_WORLD_OBJECT,
};
pub use components::{DestroyAfterTime, Named, Projectile, WorldObject};
pub use config::SceneConfig;
pub use destruction::DestructionQueue;
pub use error::{ConfigError, SceneError, SceneResult};
pub use scene::{FrameStats, Scene};
pub use schedule::{AsAny, Group, Phase, PhaseStats, System, SystemContext, SystemEntry, SystemTimings};
pub use systems::{
    DebugDrawSystem, DebugOverlay, DebugPrimitive, DestroyAfterTimeSystem, MovementSystem,
    TransformSystem,
};
pub use time::{GameClock, GameTime};
