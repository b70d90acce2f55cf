//! # Debug Drawing
//!
//! Primitive sink for visualizing the world. Coordinates handed to the sink
//! are already converted to pixels.

use glam::Vec2;

/// RGBA color in `[0, 1]`.
pub type DebugColor = [f32; 4];

/// Static bodies.
pub const COLOR_STATIC: DebugColor = [0.5, 0.9, 0.5, 1.0];
/// Kinematic bodies.
pub const COLOR_KINEMATIC: DebugColor = [0.5, 0.5, 0.9, 1.0];
/// Awake dynamic bodies.
pub const COLOR_DYNAMIC: DebugColor = [0.9, 0.7, 0.7, 1.0];
/// Sleeping bodies.
pub const COLOR_ASLEEP: DebugColor = [0.6, 0.6, 0.6, 1.0];
/// Sensor fixtures.
pub const COLOR_SENSOR: DebugColor = [0.9, 0.9, 0.3, 0.5];
/// Velocity vectors.
pub const COLOR_VELOCITY: DebugColor = [1.0, 1.0, 1.0, 1.0];

/// Receives debug primitives from [`PhysicsWorld::debug_draw`](super::PhysicsWorld::debug_draw).
pub trait DebugDraw {
    /// Circle outline.
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: DebugColor);

    /// Closed polygon outline.
    fn draw_polygon(&mut self, vertices: &[Vec2], color: DebugColor);

    /// Line segment. Ignored unless overridden.
    fn draw_segment(&mut self, _from: Vec2, _to: Vec2, _color: DebugColor) {}
}
