//! # TANDEM Core
//!
//! The entity store at the bottom of the TANDEM stack.
//!
//! ## Architecture Rules
//!
//! 1. **Handles are generational** - a despawned entity's handle never aliases its successor
//! 2. **Stale access is silent** - lookups through dead handles return `None`, never panic
//! 3. **Queries are set-based** - an entity matches when it carries every requested component
//!
//! ## Example
//!
//! ```rust,ignore
//! use tandem_core::{EntityStore, Position};
//!
//! let mut store = EntityStore::new(4096);
//! let ship = store.spawn_with(Position::zero());
//! for id in store.query::<(Position,)>() {
//!     // ...
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod ecs;

pub use ecs::{
    Component, ComponentSet, ComponentStorage, Entity, EntityId, EntityStore, Position,
    MAX_COMPONENT_TYPES,
};
