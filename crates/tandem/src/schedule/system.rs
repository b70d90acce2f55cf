//! # Systems
//!
//! A system is a unit of per-frame behavior. Every phase receives a
//! [`SystemContext`] carrying the entity store and the two deferred queues;
//! systems never reach for globals.

use std::any::Any;

use tandem_core::EntityStore;
use tandem_physics::PhysicsQueue;

use super::group::Group;
use crate::destruction::DestructionQueue;
use crate::time::GameTime;

/// Downcasting support for trait objects.
///
/// Blanket-implemented for every `'static` type. Call it through
/// `&dyn System`, never on the `Box` itself, or the box is what gets
/// downcast.
pub trait AsAny: Any {
    /// `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Everything a system may touch during a phase.
pub struct SystemContext<'a> {
    /// The scene's entity store, write-locked for the whole frame.
    pub store: &'a mut EntityStore,
    /// Deferred entity destruction, drained at the end of the frame.
    pub destruction: &'a DestructionQueue,
    /// Body creation and deletion requests for the simulation thread.
    pub physics: &'a PhysicsQueue,
    /// Frame timing.
    pub time: GameTime,
}

impl SystemContext<'_> {
    /// Seconds since the previous frame.
    #[inline]
    #[must_use]
    pub fn delta(&self) -> f32 {
        self.time.delta
    }
}

/// Per-frame behavior driven by a [`Group`].
///
/// All phases default to no-ops; implement the ones you need.
pub trait System: AsAny + Send {
    /// Display name. Defaults to the type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Runs once before the first frame.
    fn initialize(&mut self, _ctx: &mut SystemContext<'_>) {}

    /// Runs first in every frame.
    fn before_update(&mut self, _ctx: &mut SystemContext<'_>) {}

    /// Main per-frame work.
    fn update(&mut self, _ctx: &mut SystemContext<'_>) {}

    /// Runs last in every frame.
    fn after_update(&mut self, _ctx: &mut SystemContext<'_>) {}

    /// Overlay pass, run on render systems between update and after-update.
    fn render_ui(&mut self, _ctx: &mut SystemContext<'_>) {}

    /// `Some` when this system is itself a group, so lookups can descend.
    fn as_group(&self) -> Option<&Group> {
        None
    }

    /// Mutable counterpart of [`System::as_group`].
    fn as_group_mut(&mut self) -> Option<&mut Group> {
        None
    }
}

/// Last path segment of a type name, generics dropped.
pub(crate) fn short_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Idle;
    impl System for Idle {}

    #[test]
    fn test_default_name_is_type_name() {
        assert!(Idle.name().ends_with("Idle"));
        assert_eq!(short_name(Idle.name()), "Idle");
    }

    #[test]
    fn test_short_name_drops_generics() {
        assert_eq!(short_name("a::b::Thing<c::D>"), "Thing");
        assert_eq!(short_name("Plain"), "Plain");
    }

    #[test]
    fn test_downcast_through_trait_object() {
        let boxed: Box<dyn System> = Box::new(Idle);
        let system: &dyn System = boxed.as_ref();
        assert!(system.as_any().is::<Idle>());
        assert!(system.as_group().is_none());
    }
}
