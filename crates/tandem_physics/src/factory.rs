//! # Body Factories
//!
//! Builders for the common body kinds, taking pixel-space sizes.

use glam::Vec2;

use crate::error::PhysicsResult;
use crate::world::{BodyDef, BodyHandle, BodyType, CollisionFilter, FixtureDef, PhysicsWorld, Shape};

/// Creates a dynamic circular body of `diameter_px` at `def.position`.
///
/// Friction is zeroed; `def.body_type` is overridden.
///
/// # Errors
///
/// Propagates invalid definitions or sizes from the world.
pub fn circle_body(
    world: &mut PhysicsWorld,
    mut def: BodyDef,
    diameter_px: f32,
    density: f32,
    filter: CollisionFilter,
    pixels_per_meter: f32,
) -> PhysicsResult<BodyHandle> {
    def.body_type = BodyType::Dynamic;
    let fixture = FixtureDef {
        friction: 0.0,
        ..FixtureDef::new(Shape::circle(diameter_px / 2.0 / pixels_per_meter))
    }
    .with_density(density)
    .with_filter(filter);

    let body = world.create_body(&def)?;
    if let Err(err) = world.create_fixture(body, fixture) {
        world.destroy_body(body);
        return Err(err);
    }
    Ok(body)
}

/// Creates a static box whose top-left corner sits at `position_px`.
///
/// # Errors
///
/// Propagates invalid positions or sizes from the world.
pub fn box_body(
    world: &mut PhysicsWorld,
    position_px: Vec2,
    size_px: Vec2,
    filter: CollisionFilter,
    pixels_per_meter: f32,
) -> PhysicsResult<BodyHandle> {
    let half_extents = size_px / 2.0 / pixels_per_meter;
    let fixture = FixtureDef {
        friction: 0.0,
        ..FixtureDef::new(Shape::rect(half_extents).with_offset(half_extents))
    }
    .with_filter(filter);

    let def = BodyDef::new(BodyType::Static, position_px / pixels_per_meter);
    let body = world.create_body(&def)?;
    if let Err(err) = world.create_fixture(body, fixture) {
        world.destroy_body(body);
        return Err(err);
    }
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PhysicsError;

    #[test]
    fn test_circle_body_is_dynamic() {
        let mut world = PhysicsWorld::default();
        let def = BodyDef::new(BodyType::Static, Vec2::new(2.0, 0.0));
        let body = circle_body(&mut world, def, 50.0, 1.0, CollisionFilter::default(), 50.0).unwrap();
        assert_eq!(world.body_type(body), Some(BodyType::Dynamic));
        assert_eq!(world.position(body), Some(Vec2::new(2.0, 0.0)));
    }

    #[test]
    fn test_box_body_anchored_top_left() {
        let mut world = PhysicsWorld::default();
        let body = box_body(
            &mut world,
            Vec2::new(100.0, 50.0),
            Vec2::new(100.0, 100.0),
            CollisionFilter::default(),
            50.0,
        )
        .unwrap();
        assert_eq!(world.body_type(body), Some(BodyType::Static));
        assert_eq!(world.position(body), Some(Vec2::new(2.0, 1.0)));
    }

    #[test]
    fn test_zero_diameter_leaves_no_body() {
        let mut world = PhysicsWorld::default();
        let result = circle_body(&mut world, BodyDef::default(), 0.0, 1.0, CollisionFilter::default(), 50.0);
        assert!(matches!(result, Err(PhysicsError::InvalidBody(_))));
        assert_eq!(world.body_count(), 0);
    }
}
