//! # Collision Rules
//!
//! Category bits tag each fixture with its gameplay role. The game filter
//! lets world objects collide with projectiles and nothing else.
//!
//! The rule reads fixture data only. It runs while the world is stepped,
//! when the entity store may be write-locked by the main thread.

use tandem_physics::{CollisionFilter, ContactFilter, DefaultContactFilter, FixtureView};

/// Untagged fixtures.
pub const CATEGORY_DEFAULT: u16 = 0x0001;
/// Level geometry.
pub const CATEGORY_WORLD_OBJECT: u16 = 0x0002;
/// Projectiles.
pub const CATEGORY_PROJECTILE: u16 = 0x0004;

/// Filter for level geometry.
#[must_use]
pub const fn world_object_filter() -> CollisionFilter {
    CollisionFilter::new(CATEGORY_WORLD_OBJECT, CATEGORY_PROJECTILE)
}

/// Filter for projectiles.
#[must_use]
pub const fn projectile_filter() -> CollisionFilter {
    CollisionFilter::new(CATEGORY_PROJECTILE, CATEGORY_WORLD_OBJECT)
}

/// World objects against projectiles, nothing else.
///
/// Bodies whose user data is unset (not yet attached to an entity) never
/// collide.
#[derive(Clone, Copy, Debug, Default)]
pub struct GameContactFilter;

impl ContactFilter for GameContactFilter {
    fn should_collide(&self, a: &FixtureView, b: &FixtureView) -> bool {
        if !DefaultContactFilter.should_collide(a, b) {
            return false;
        }
        if a.user_data == 0 || b.user_data == 0 {
            return false;
        }
        let categories = a.filter.category_bits | b.filter.category_bits;
        (categories & CATEGORY_WORLD_OBJECT) != 0 && (categories & CATEGORY_PROJECTILE) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_physics::{BodyDef, BodyType, PhysicsWorld};

    fn view(filter: CollisionFilter, user_data: u64) -> FixtureView {
        let body = PhysicsWorld::default().create_body(&BodyDef::default()).unwrap();
        FixtureView {
            body,
            body_type: BodyType::Dynamic,
            user_data,
            filter,
            is_sensor: false,
        }
    }

    #[test]
    fn test_world_object_hits_projectile() {
        let wall = view(world_object_filter(), 1);
        let shot = view(projectile_filter(), 2);
        assert!(GameContactFilter.should_collide(&wall, &shot));
    }

    #[test]
    fn test_same_role_never_collides() {
        let a = view(projectile_filter(), 1);
        let b = view(projectile_filter(), 2);
        assert!(!GameContactFilter.should_collide(&a, &b));

        let plain = CollisionFilter::default();
        assert!(!GameContactFilter.should_collide(&view(plain, 1), &view(plain, 2)));
    }

    #[test]
    fn test_unattached_body_never_collides() {
        let wall = view(world_object_filter(), 0);
        let shot = view(projectile_filter(), 2);
        assert!(!GameContactFilter.should_collide(&wall, &shot));
    }
}
