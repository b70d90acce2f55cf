//! # Gameplay Systems

pub mod debug_draw;
pub mod lifetime;
pub mod movement;
pub mod transform;

pub use debug_draw::{DebugDrawSystem, DebugOverlay, DebugPrimitive};
pub use lifetime::DestroyAfterTimeSystem;
pub use movement::MovementSystem;
pub use transform::TransformSystem;
