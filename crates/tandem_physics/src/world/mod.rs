//! # Rigid-Body World
//!
//! Bodies, fixtures, contact callbacks and debug drawing on top of rapier2d.

use std::borrow::Borrow;

use glam::Vec2;
use rapier2d::math::Vector;

mod body;
mod contact;
mod debug;
mod physics_world;
mod shape;

pub use body::{BodyDef, BodyHandle, BodyType};
pub use contact::{
    Contact, ContactFilter, ContactListener, DefaultContactFilter, FixtureView,
    LoggingContactListener,
};
pub use debug::{
    DebugColor, DebugDraw, COLOR_ASLEEP, COLOR_DYNAMIC, COLOR_KINEMATIC, COLOR_SENSOR,
    COLOR_STATIC, COLOR_VELOCITY,
};
pub use physics_world::{PhysicsWorld, WorldStats};
pub use shape::{CollisionFilter, FixtureDef, Shape};

#[inline]
pub(crate) fn to_vector(v: Vec2) -> Vector {
    Vector::new(v.x, v.y)
}

/// Accepts rapier vectors by value or by reference.
#[inline]
pub(crate) fn to_vec2(v: impl Borrow<Vector>) -> Vec2 {
    let v = v.borrow();
    Vec2::new(v.x, v.y)
}
