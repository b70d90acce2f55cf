//! # Movement
//!
//! Velocity integration for entities the physics thread does not own, plus
//! velocity decay and rest detection for every moving entity.

use tandem_core::{EntityId, Position};
use tandem_physics::BodyHandle;

use crate::schedule::{System, SystemContext};

/// Moves entities by their velocity and damps it.
///
/// Entities with a body only get their velocity updated; the physics
/// thread writes their position.
#[derive(Debug, Default)]
pub struct MovementSystem {
    scratch: Vec<EntityId>,
}

impl MovementSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Advances one entity by `dt` seconds.
///
/// Returns `true` when the entity came to rest and asked to be destroyed
/// on zero velocity.
pub fn advance(pos: &mut Position, dt: f32, integrate_position: bool) -> bool {
    if integrate_position {
        let next = pos.global + pos.velocity * dt;
        pos.set_global(next);
    }
    pos.lifetime += dt;

    if pos.velocity_decay_factor > 0.0 {
        pos.velocity *= (-pos.velocity_decay_factor * dt).exp();
    }

    let min = pos.min_velocity_to_destroy;
    if pos.velocity.length_squared() < min * min {
        pos.velocity = glam::Vec2::ZERO;
        return pos.destroy_on_zero_velocity;
    }
    false
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "MovementSystem"
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>) {
        let dt = ctx.delta();
        self.scratch.clear();
        self.scratch.extend(ctx.store.query::<(Position,)>());

        for &entity in &self.scratch {
            let bodyless = !ctx.store.has::<BodyHandle>(entity);
            let Some(pos) = ctx.store.get_mut::<Position>(entity) else {
                continue;
            };
            if advance(pos, dt, bodyless) {
                ctx.destruction.destroy(ctx.store, entity);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_integrates_position() {
        let mut pos = Position::new(Vec2::ZERO, Vec2::new(10.0, -4.0));
        assert!(!advance(&mut pos, 0.5, true));
        assert_eq!(pos.global, Vec2::new(5.0, -2.0));
        assert!((pos.lifetime - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bodied_position_untouched() {
        let mut pos = Position::new(Vec2::ONE, Vec2::new(10.0, 0.0));
        advance(&mut pos, 0.5, false);
        assert_eq!(pos.global, Vec2::ONE);
    }

    #[test]
    fn test_exponential_decay() {
        let mut pos = Position::new(Vec2::ZERO, Vec2::new(100.0, 0.0));
        pos.velocity_decay_factor = 2.0;
        advance(&mut pos, 0.5, true);
        let expected = 100.0 * (-1.0f32).exp();
        assert!((pos.velocity.x - expected).abs() < 1e-3);
    }

    #[test]
    fn test_rest_snaps_and_requests_destroy() {
        let mut pos = Position::new(Vec2::ZERO, Vec2::new(0.0005, 0.0));
        assert!(!advance(&mut pos, 0.016, true));
        assert_eq!(pos.velocity, Vec2::ZERO);

        pos.destroy_on_zero_velocity = true;
        assert!(advance(&mut pos, 0.016, true));
    }
}
