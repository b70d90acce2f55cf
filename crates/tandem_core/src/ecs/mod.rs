//! # Entity Component System
//!
//! The entity store shared by the main thread and the simulation thread.
//!
//! ## Design Philosophy
//!
//! - Entity slots are pre-allocated at store creation
//! - Entity IDs are simple indices with generation counters
//! - Component types get a mask bit on first use; queries are mask tests

mod component;
mod entity;
mod query;
mod storage;
mod world;

pub use component::{Component, Position};
pub use entity::{Entity, EntityId};
pub use query::ComponentSet;
pub use storage::ComponentStorage;
pub use world::{EntityStore, MAX_COMPONENT_TYPES};
