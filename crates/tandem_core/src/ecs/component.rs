//! # Component System
//!
//! Components are plain data containers with no behavior of their own.
//! Systems and the physics sync passes are what give them meaning.

use glam::{Affine2, Vec2};

/// Marker trait for ECS components.
///
/// Components must be:
/// - `Send + Sync`: the simulation thread reads and writes them during sync
/// - `'static`: storage is keyed by `TypeId`
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Debug, Default)]
/// struct Health(u32);
///
/// impl Component for Health {}
/// ```
pub trait Component: Send + Sync + 'static {}

/// Spatial state of an entity in pixel space.
///
/// Movement systems write `velocity`; the physics sync passes copy
/// `velocity` into the rigid body before a step and copy the body position
/// back into `global` after it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    /// Position in world space (pixels).
    pub global: Vec2,
    /// Velocity in pixels per second.
    pub velocity: Vec2,
    /// Accumulated scale including parents.
    pub global_scale: Vec2,
    /// Local scale.
    pub scale: Vec2,
    /// Accumulated rotation including parents (degrees).
    pub global_rotation: f32,
    /// Local rotation (degrees).
    pub rotation: f32,
    /// Seconds this entity has been moving.
    pub lifetime: f32,
    /// Exponential velocity decay rate `k` in `v *= e^(-k * dt)`. Zero disables decay.
    pub velocity_decay_factor: f32,
    /// Destroy the entity once its speed drops under `min_velocity_to_destroy`.
    pub destroy_on_zero_velocity: bool,
    /// Speed below which the velocity snaps to zero.
    pub min_velocity_to_destroy: f32,
    cached_transform: Affine2,
    transform_dirty: bool,
}

impl Component for Position {}

impl Default for Position {
    fn default() -> Self {
        Self {
            global: Vec2::ZERO,
            velocity: Vec2::ZERO,
            global_scale: Vec2::ONE,
            scale: Vec2::ONE,
            global_rotation: 0.0,
            rotation: 0.0,
            lifetime: 0.0,
            velocity_decay_factor: 0.0,
            destroy_on_zero_velocity: false,
            min_velocity_to_destroy: 0.001,
            cached_transform: Affine2::IDENTITY,
            transform_dirty: true,
        }
    }
}

impl Position {
    /// Creates a position with the given location and velocity.
    #[inline]
    #[must_use]
    pub fn new(global: Vec2, velocity: Vec2) -> Self {
        Self {
            global,
            velocity,
            ..Self::default()
        }
    }

    /// Creates a position at the origin with no velocity.
    #[inline]
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// Sets the local scale.
    #[must_use]
    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self.transform_dirty = true;
        self
    }

    /// Sets the local rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.rotation = degrees;
        self.transform_dirty = true;
        self
    }

    /// Moves the entity and invalidates the cached transform.
    #[inline]
    pub fn set_global(&mut self, global: Vec2) {
        self.global = global;
        self.transform_dirty = true;
    }

    /// Invalidates the cached transform after a direct field write.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.transform_dirty = true;
    }

    /// Whether the cached transform is stale.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.transform_dirty
    }

    /// Overrides the cached transform.
    pub fn set_global_transform(&mut self, transform: Affine2) {
        self.cached_transform = transform;
        self.transform_dirty = false;
    }

    /// Scale, then rotation, then translation.
    #[must_use]
    pub fn compute_transform(&self) -> Affine2 {
        Affine2::from_scale_angle_translation(self.scale, self.rotation.to_radians(), self.global)
    }

    /// Returns the cached transform, computing it when stale.
    #[must_use]
    pub fn global_transform(&self) -> Affine2 {
        if self.transform_dirty {
            self.compute_transform()
        } else {
            self.cached_transform
        }
    }

    /// Recomputes and caches the transform.
    pub fn refresh_transform(&mut self) {
        self.cached_transform = self.compute_transform();
        self.transform_dirty = false;
    }

    /// Unit vector the entity is facing.
    #[must_use]
    pub fn forward(&self) -> Vec2 {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        Vec2::new(cos, sin)
    }

    /// Unit vector to the entity's right.
    #[must_use]
    pub fn right(&self) -> Vec2 {
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        Vec2::new(-sin, cos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_position() {
        let pos = Position::zero();
        assert_eq!(pos.global, Vec2::ZERO);
        assert_eq!(pos.scale, Vec2::ONE);
        assert!(pos.is_dirty());
        assert!((pos.min_velocity_to_destroy - 0.001).abs() < f32::EPSILON);
    }

    #[test]
    fn test_transform_cache() {
        let mut pos = Position::new(Vec2::new(10.0, 5.0), Vec2::ZERO).with_scale(Vec2::splat(2.0));
        pos.refresh_transform();
        assert!(!pos.is_dirty());

        let p = pos.global_transform().transform_point2(Vec2::new(1.0, 0.0));
        assert!((p - Vec2::new(12.0, 5.0)).length() < 1e-5);

        pos.set_global(Vec2::ZERO);
        assert!(pos.is_dirty());
        let p = pos.global_transform().transform_point2(Vec2::new(1.0, 0.0));
        assert!((p - Vec2::new(2.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_forward_right() {
        let pos = Position::zero().with_rotation(90.0);
        assert!((pos.forward() - Vec2::Y).length() < 1e-5);
        assert!((pos.right() + Vec2::X).length() < 1e-5);
    }
}
