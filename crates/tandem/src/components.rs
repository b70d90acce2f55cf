//! # Gameplay Components

use std::fmt;

use tandem_core::Component;

/// Destroys the entity once `elapsed` reaches `time` seconds.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DestroyAfterTime {
    /// Lifetime in seconds.
    pub time: f32,
    /// Seconds lived so far.
    pub elapsed: f32,
    /// Set once the entity has been queued for destruction.
    pub destroyed: bool,
}

impl Component for DestroyAfterTime {}

impl DestroyAfterTime {
    /// Timer expiring after `time` seconds.
    #[inline]
    #[must_use]
    pub const fn new(time: f32) -> Self {
        Self {
            time,
            elapsed: 0.0,
            destroyed: false,
        }
    }

    /// Seconds left, never negative.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> f32 {
        (self.time - self.elapsed).max(0.0)
    }
}

/// Human-readable label.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Named(pub String);

impl Component for Named {}

impl Named {
    /// Label from anything string-like.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for Named {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Static level geometry. Collides with projectiles only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldObject;

impl Component for WorldObject {}

/// Something fired. Collides with world objects only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Projectile;

impl Component for Projectile {}
