//! # TANDEM Physics
//!
//! A fixed-timestep physics thread running beside the main thread, stepping
//! a rapier2d world.
//!
//! ## Architecture Rules
//!
//! 1. **The main thread never touches the world's structure** - bodies are
//!    created and destroyed through [`PhysicsQueue`] requests
//! 2. **Store before world** - every code path that needs both locks takes
//!    the entity store first
//! 3. **Fail fast** - a factory error or panic stops the loop and is kept
//!    in [`PhysicsSyncManager::fault`] for the main thread to surface
//!
//! ## Example
//!
//! ```rust,ignore
//! use tandem_physics::{BodyCreationRequest, PhysicsSyncManager, circle_body};
//!
//! let mut physics = PhysicsSyncManager::new(store, world, PhysicsConfig::default())?;
//! physics.start()?;
//! physics.queue().enqueue_body_creation(BodyCreationRequest::new(ship, |world| {
//!     circle_body(world, BodyDef::default(), 32.0, 1.0, CollisionFilter::default(), 50.0)
//! }));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod factory;
pub mod request;
pub mod sync;
pub mod world;

pub use config::PhysicsConfig;
pub use error::{PhysicsError, PhysicsResult};
pub use factory::{box_body, circle_body};
pub use request::{
    BodyCreatedFn, BodyCreationRequest, BodyDeletionRequest, BodyFactoryFn, PhysicsQueue,
};
pub use sync::{post_step_sync, pre_step_sync, PhysicsSyncManager, TickReport, TickStats};
pub use world::{
    BodyDef, BodyHandle, BodyType, CollisionFilter, Contact, ContactFilter,
    ContactListener, DebugColor, DebugDraw, DefaultContactFilter, FixtureDef, FixtureView,
    LoggingContactListener, PhysicsWorld, Shape, WorldStats,
};
