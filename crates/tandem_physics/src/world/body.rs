//! # Bodies
//!
//! Handles and definitions, mapped onto rapier rigid bodies.

use std::fmt;

use glam::Vec2;
use rapier2d::prelude::{RigidBodyBuilder, RigidBodyHandle, RigidBodyType};

use tandem_core::Component;

use super::to_vector;

/// Generational handle to a body in a [`PhysicsWorld`](super::PhysicsWorld).
///
/// Attached to an entity as a component once its creation request has been
/// served. A handle whose body was destroyed stays stale forever, even when
/// the slot is reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

impl Component for BodyHandle {}

impl BodyHandle {
    #[inline]
    pub(crate) const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the world.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Slot generation at creation time.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl From<RigidBodyHandle> for BodyHandle {
    fn from(handle: RigidBodyHandle) -> Self {
        let (index, generation) = handle.into_raw_parts();
        Self::new(index, generation)
    }
}

impl From<BodyHandle> for RigidBodyHandle {
    fn from(handle: BodyHandle) -> Self {
        Self::from_raw_parts(handle.index, handle.generation)
    }
}

impl fmt::Display for BodyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Body({}v{})", self.index, self.generation)
    }
}

/// How a body takes part in the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BodyType {
    /// Never moves, infinite mass.
    Static,
    /// Moves by its velocity only, unaffected by contacts and gravity.
    Kinematic,
    /// Fully simulated.
    #[default]
    Dynamic,
}

impl From<RigidBodyType> for BodyType {
    fn from(body_type: RigidBodyType) -> Self {
        match body_type {
            RigidBodyType::Fixed => Self::Static,
            RigidBodyType::KinematicPositionBased | RigidBodyType::KinematicVelocityBased => {
                Self::Kinematic
            }
            RigidBodyType::Dynamic => Self::Dynamic,
        }
    }
}

/// Everything needed to create a body. Fixtures are added afterwards.
///
/// Bodies do not rotate, so box fixtures stay axis-aligned.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyDef {
    /// Simulation role.
    pub body_type: BodyType,
    /// World position (meters).
    pub position: Vec2,
    /// Initial velocity (meters per second).
    pub linear_velocity: Vec2,
    /// Velocity damping coefficient.
    pub linear_damping: f32,
    /// Multiplier on world gravity.
    pub gravity_scale: f32,
    /// Fast mover: swept against other bodies so it cannot tunnel.
    pub bullet: bool,
    /// Sleeping bodies are neither integrated nor solved.
    pub awake: bool,
    /// Opaque word owned by the caller.
    pub user_data: u64,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            linear_velocity: Vec2::ZERO,
            linear_damping: 0.0,
            gravity_scale: 1.0,
            bullet: false,
            awake: true,
            user_data: 0,
        }
    }
}

impl BodyDef {
    /// Body of the given type at `position` (meters).
    #[must_use]
    pub fn new(body_type: BodyType, position: Vec2) -> Self {
        Self {
            body_type,
            position,
            ..Self::default()
        }
    }

    /// Sets the initial velocity.
    #[must_use]
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.linear_velocity = velocity;
        self
    }

    /// Sets the damping coefficient.
    #[must_use]
    pub fn with_damping(mut self, damping: f32) -> Self {
        self.linear_damping = damping;
        self
    }

    /// Marks the body as a fast mover (continuous collision detection).
    #[must_use]
    pub fn bullet(mut self) -> Self {
        self.bullet = true;
        self
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.position.is_finite()
            && self.linear_velocity.is_finite()
            && self.linear_damping.is_finite()
            && self.linear_damping >= 0.0
            && self.gravity_scale.is_finite()
    }

    /// Rapier builder for this definition. Static bodies drop their velocity.
    pub(crate) fn builder(&self) -> RigidBodyBuilder {
        let (builder, velocity) = match self.body_type {
            BodyType::Static => (RigidBodyBuilder::fixed(), Vec2::ZERO),
            BodyType::Kinematic => (
                RigidBodyBuilder::kinematic_velocity_based(),
                self.linear_velocity,
            ),
            BodyType::Dynamic => (RigidBodyBuilder::dynamic(), self.linear_velocity),
        };

        builder
            .translation(to_vector(self.position))
            .linvel(to_vector(velocity))
            .linear_damping(self.linear_damping)
            .gravity_scale(self.gravity_scale)
            .ccd_enabled(self.bullet)
            .lock_rotations()
            .sleeping(!self.awake)
            .user_data(u128::from(self.user_data))
    }
}
