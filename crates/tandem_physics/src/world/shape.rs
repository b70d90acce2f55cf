//! # Shapes and Fixtures
//!
//! Collision geometry attached to bodies. Each fixture becomes one rapier
//! collider; its [`CollisionFilter`] rides along in the collider's user data
//! so the contact filter can read it while the world is stepped.

use glam::Vec2;
use rapier2d::prelude::{ActiveEvents, ActiveHooks, CoefficientCombineRule, ColliderBuilder};

use super::to_vector;

/// Collision geometry in body-local meters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Circle around `offset`.
    Circle {
        /// Radius.
        radius: f32,
        /// Center relative to the body origin.
        offset: Vec2,
    },
    /// Axis-aligned rectangle around `offset`.
    Rect {
        /// Half width and half height.
        half_extents: Vec2,
        /// Center relative to the body origin.
        offset: Vec2,
    },
}

impl Shape {
    /// Circle centered on the body origin.
    #[inline]
    #[must_use]
    pub const fn circle(radius: f32) -> Self {
        Self::Circle {
            radius,
            offset: Vec2::ZERO,
        }
    }

    /// Rectangle centered on the body origin.
    #[inline]
    #[must_use]
    pub const fn rect(half_extents: Vec2) -> Self {
        Self::Rect {
            half_extents,
            offset: Vec2::ZERO,
        }
    }

    /// Moves the shape relative to the body origin.
    #[must_use]
    pub fn with_offset(self, offset: Vec2) -> Self {
        match self {
            Self::Circle { radius, .. } => Self::Circle { radius, offset },
            Self::Rect { half_extents, .. } => Self::Rect {
                half_extents,
                offset,
            },
        }
    }

    /// Center relative to the body origin.
    #[inline]
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        match *self {
            Self::Circle { offset, .. } | Self::Rect { offset, .. } => offset,
        }
    }

    /// Positive, finite dimensions.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Circle { radius, offset } => radius.is_finite() && *radius > 0.0 && offset.is_finite(),
            Self::Rect {
                half_extents,
                offset,
            } => half_extents.is_finite() && half_extents.min_element() > 0.0 && offset.is_finite(),
        }
    }
}

/// Category/mask pair deciding which fixtures may touch.
///
/// Two fixtures collide when each one's category is in the other's mask.
/// A shared non-zero group index overrides that: positive always collides,
/// negative never does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CollisionFilter {
    /// Bits this fixture belongs to.
    pub category_bits: u16,
    /// Bits this fixture accepts.
    pub mask_bits: u16,
    /// Group override.
    pub group_index: i16,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            category_bits: 0x0001,
            mask_bits: 0xFFFF,
            group_index: 0,
        }
    }
}

impl CollisionFilter {
    /// Filter in `category` accepting `mask`.
    #[inline]
    #[must_use]
    pub const fn new(category_bits: u16, mask_bits: u16) -> Self {
        Self {
            category_bits,
            mask_bits,
            group_index: 0,
        }
    }

    /// Category/mask/group rule.
    #[must_use]
    pub const fn accepts(&self, other: &Self) -> bool {
        if self.group_index == other.group_index && self.group_index != 0 {
            return self.group_index > 0;
        }
        (self.mask_bits & other.category_bits) != 0 && (self.category_bits & other.mask_bits) != 0
    }

    /// Packs the filter into a collider user-data word.
    pub(crate) fn to_bits(self) -> u128 {
        let group = u16::from_ne_bytes(self.group_index.to_ne_bytes());
        u128::from(self.category_bits) | (u128::from(self.mask_bits) << 16) | (u128::from(group) << 32)
    }

    /// Inverse of [`CollisionFilter::to_bits`].
    pub(crate) fn from_bits(bits: u128) -> Self {
        let group = (bits >> 32) as u16;
        Self {
            category_bits: bits as u16,
            mask_bits: (bits >> 16) as u16,
            group_index: i16::from_ne_bytes(group.to_ne_bytes()),
        }
    }
}

/// A shape attached to a body, with its material and filter.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixtureDef {
    /// Geometry.
    pub shape: Shape,
    /// Mass per square meter.
    pub density: f32,
    /// Surface friction.
    pub friction: f32,
    /// Bounciness in `[0, 1]`; the larger of a pair wins.
    pub restitution: f32,
    /// Sensors report contacts but are never solved.
    pub is_sensor: bool,
    /// Collision filtering data.
    pub filter: CollisionFilter,
}

impl FixtureDef {
    /// Fixture with default material.
    #[must_use]
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            density: 1.0,
            friction: 0.2,
            restitution: 0.0,
            is_sensor: false,
            filter: CollisionFilter::default(),
        }
    }

    /// Sets the density.
    #[must_use]
    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    /// Sets the restitution.
    #[must_use]
    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    /// Sets the collision filter.
    #[must_use]
    pub fn with_filter(mut self, filter: CollisionFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Turns the fixture into a sensor.
    #[must_use]
    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self
    }

    pub(crate) fn is_valid(&self) -> bool {
        self.shape.is_valid()
            && self.density.is_finite()
            && self.density >= 0.0
            && self.friction.is_finite()
            && self.restitution.is_finite()
    }

    /// Rapier collider builder. Every collider asks the world's filter and
    /// reports collision events.
    pub(crate) fn builder(&self) -> ColliderBuilder {
        let builder = match self.shape {
            Shape::Circle { radius, .. } => ColliderBuilder::ball(radius),
            Shape::Rect { half_extents, .. } => {
                ColliderBuilder::cuboid(half_extents.x, half_extents.y)
            }
        };

        builder
            .translation(to_vector(self.shape.offset()))
            .density(self.density)
            .friction(self.friction)
            .restitution(self.restitution)
            .restitution_combine_rule(CoefficientCombineRule::Max)
            .sensor(self.is_sensor)
            .user_data(self.filter.to_bits())
            .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS | ActiveHooks::FILTER_INTERSECTION_PAIR)
            .active_events(ActiveEvents::COLLISION_EVENTS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_rules() {
        let world = CollisionFilter::new(0x0002, 0x0004);
        let bullet = CollisionFilter::new(0x0004, 0x0002);
        let other = CollisionFilter::new(0x0002, 0x0004);
        assert!(world.accepts(&bullet));
        assert!(!world.accepts(&other));

        let mut a = CollisionFilter::default();
        let mut b = CollisionFilter::default();
        a.group_index = -1;
        b.group_index = -1;
        assert!(!a.accepts(&b));
    }

    #[test]
    fn test_filter_survives_user_data() {
        let filter = CollisionFilter {
            category_bits: 0x0004,
            mask_bits: 0x8002,
            group_index: -3,
        };
        assert_eq!(CollisionFilter::from_bits(filter.to_bits()), filter);

        let collider = FixtureDef::new(Shape::circle(1.0)).with_filter(filter).builder().build();
        assert_eq!(CollisionFilter::from_bits(collider.user_data), filter);
    }

    #[test]
    fn test_sensor_flag_reaches_collider() {
        let collider = FixtureDef::new(Shape::rect(Vec2::ONE)).sensor().builder().build();
        assert!(collider.is_sensor());
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(!Shape::circle(0.0).is_valid());
        assert!(!Shape::rect(Vec2::new(1.0, -1.0)).is_valid());
        assert!(Shape::rect(Vec2::ONE).with_offset(Vec2::ONE).is_valid());
        assert_eq!(Shape::circle(1.0).with_offset(Vec2::X).offset(), Vec2::X);
    }
}
