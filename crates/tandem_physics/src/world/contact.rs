//! # Contact Callbacks
//!
//! The world reports touching pairs through a [`ContactListener`] and asks a
//! [`ContactFilter`] before rapier tests a collider pair.
//!
//! The filter runs inside rapier's step through [`PhysicsHooks`]; listener
//! events are collected by an [`EventHandler`] during the step and delivered
//! right after it. Both run on whichever thread steps the world, with the
//! world lock held, and cannot reach back into the world.

use parking_lot::Mutex;
use rapier2d::prelude::{
    ColliderHandle, ColliderSet, CollisionEvent, ContactPair, EventHandler,
    PairFilterContext, PhysicsHooks, RigidBodySet, SolverFlags,
};
use tracing::debug;

use super::body::{BodyHandle, BodyType};
use super::shape::CollisionFilter;

/// A touching body pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    /// First body (lower handle).
    pub body_a: BodyHandle,
    /// Second body.
    pub body_b: BodyHandle,
    /// User data of `body_a`.
    pub user_data_a: u64,
    /// User data of `body_b`.
    pub user_data_b: u64,
    /// At least one fixture is a sensor.
    pub is_sensor: bool,
}

/// Read-only view of one fixture offered to a [`ContactFilter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixtureView {
    /// Owning body.
    pub body: BodyHandle,
    /// Owning body's simulation role.
    pub body_type: BodyType,
    /// Owning body's user data.
    pub user_data: u64,
    /// The fixture's filter bits.
    pub filter: CollisionFilter,
    /// Whether the fixture is a sensor.
    pub is_sensor: bool,
}

impl FixtureView {
    /// View of a live collider and its parent body.
    pub(crate) fn of(
        bodies: &RigidBodySet,
        colliders: &ColliderSet,
        handle: ColliderHandle,
    ) -> Option<Self> {
        let collider = colliders.get(handle)?;
        let parent = collider.parent()?;
        let body = bodies.get(parent)?;
        Some(Self {
            body: parent.into(),
            body_type: body.body_type().into(),
            user_data: body.user_data as u64,
            filter: CollisionFilter::from_bits(collider.user_data),
            is_sensor: collider.is_sensor(),
        })
    }
}

/// Receives begin/end events for touching pairs.
pub trait ContactListener: Send {
    /// Two bodies started touching during a step.
    fn begin_contact(&mut self, contact: &Contact);

    /// Two bodies stopped touching, or one of them was destroyed.
    fn end_contact(&mut self, contact: &Contact);
}

/// Decides whether two fixtures may collide at all.
pub trait ContactFilter: Send + Sync {
    /// `true` lets the pair through to the narrow phase.
    fn should_collide(&self, a: &FixtureView, b: &FixtureView) -> bool;
}

/// Category/mask/group rule of [`CollisionFilter`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultContactFilter;

impl ContactFilter for DefaultContactFilter {
    fn should_collide(&self, a: &FixtureView, b: &FixtureView) -> bool {
        a.filter.accepts(&b.filter)
    }
}

/// Logs every contact event at `debug` level and counts them.
#[derive(Debug, Default)]
pub struct LoggingContactListener {
    begun: u64,
    ended: u64,
}

impl LoggingContactListener {
    /// Creates a listener with zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self { begun: 0, ended: 0 }
    }

    /// Contacts begun so far.
    #[must_use]
    pub const fn begun(&self) -> u64 {
        self.begun
    }

    /// Contacts ended so far.
    #[must_use]
    pub const fn ended(&self) -> u64 {
        self.ended
    }
}

impl ContactListener for LoggingContactListener {
    fn begin_contact(&mut self, contact: &Contact) {
        self.begun += 1;
        debug!(
            body_a = %contact.body_a,
            body_b = %contact.body_b,
            sensor = contact.is_sensor,
            "Contact began"
        );
    }

    fn end_contact(&mut self, contact: &Contact) {
        self.ended += 1;
        debug!(body_a = %contact.body_a, body_b = %contact.body_b, "Contact ended");
    }
}

/// Rapier hooks that route pair filtering through a [`ContactFilter`].
pub(crate) struct FilterHooks<'a> {
    filter: &'a dyn ContactFilter,
}

impl<'a> FilterHooks<'a> {
    pub(crate) fn new(filter: &'a dyn ContactFilter) -> Self {
        Self { filter }
    }

    fn admits(&self, context: &PairFilterContext<'_>) -> bool {
        let a = FixtureView::of(context.bodies, context.colliders, context.collider1);
        let b = FixtureView::of(context.bodies, context.colliders, context.collider2);
        match (a, b) {
            (Some(a), Some(b)) => self.filter.should_collide(&a, &b),
            _ => false,
        }
    }
}

impl PhysicsHooks for FilterHooks<'_> {
    fn filter_contact_pair(&self, context: &PairFilterContext<'_>) -> Option<SolverFlags> {
        self.admits(context).then_some(SolverFlags::COMPUTE_IMPULSES)
    }

    fn filter_intersection_pair(&self, context: &PairFilterContext<'_>) -> bool {
        self.admits(context)
    }
}

/// Buffers collision events raised during a step.
#[derive(Default)]
pub(crate) struct EventCollector {
    events: Mutex<Vec<CollisionEvent>>,
}

impl EventCollector {
    /// Everything collected since the last call.
    pub(crate) fn take(&self) -> Vec<CollisionEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventHandler for EventCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        self.events.lock().push(event);
    }

    fn handle_contact_force_event(
        &self,
        _dt: f32,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: f32,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> Contact {
        Contact {
            body_a: BodyHandle::new(0, 1),
            body_b: BodyHandle::new(1, 1),
            user_data_a: 0,
            user_data_b: 0,
            is_sensor: false,
        }
    }

    fn view(filter: CollisionFilter) -> FixtureView {
        FixtureView {
            body: BodyHandle::new(0, 1),
            body_type: BodyType::Dynamic,
            user_data: 0,
            filter,
            is_sensor: false,
        }
    }

    #[test]
    fn test_logging_listener_counts() {
        let mut listener = LoggingContactListener::new();
        listener.begin_contact(&contact());
        listener.begin_contact(&contact());
        listener.end_contact(&contact());
        assert_eq!(listener.begun(), 2);
        assert_eq!(listener.ended(), 1);
    }

    #[test]
    fn test_default_filter_uses_bits() {
        let a = view(CollisionFilter::new(0x0002, 0x0004));
        let b = view(CollisionFilter::new(0x0008, 0xFFFF));
        assert!(!DefaultContactFilter.should_collide(&a, &b));
        assert!(DefaultContactFilter.should_collide(&b, &b));
    }
}
