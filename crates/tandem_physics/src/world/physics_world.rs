//! # Physics World
//!
//! A thin wrapper over a rapier2d pipeline. It adds generational body
//! handles the entity store can carry, a caller-supplied contact filter and
//! listener, lifetime counters and debug drawing in pixels.
//!
//! ## Step order
//!
//! 1. Rapier steps the pipeline; the [`ContactFilter`] gates every pair
//! 2. Collision events gathered during the step go to the [`ContactListener`]
//!
//! Bullet bodies are swept by rapier's CCD solver, so they stop at thin
//! walls instead of passing through between two steps.

use std::collections::HashMap;

use glam::Vec2;
use rapier2d::prelude::{
    CCDSolver, ColliderHandle, ColliderSet, CollisionEvent, DefaultBroadPhase, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    RigidBody, RigidBodyHandle, RigidBodySet, RigidBodyType,
};
use tracing::trace;

use super::body::{BodyDef, BodyHandle, BodyType};
use super::contact::{
    Contact, ContactFilter, ContactListener, DefaultContactFilter, EventCollector, FilterHooks,
    FixtureView,
};
use super::debug::{
    DebugColor, DebugDraw, COLOR_ASLEEP, COLOR_DYNAMIC, COLOR_KINEMATIC, COLOR_SENSOR, COLOR_STATIC,
    COLOR_VELOCITY,
};
use super::shape::FixtureDef;
use super::{to_vec2, to_vector};
use crate::error::{PhysicsError, PhysicsResult};

/// Length of drawn velocity vectors, in seconds of travel.
const VELOCITY_DRAW_SECONDS: f32 = 0.1;

/// Lifetime counters of a world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    /// Bodies ever created.
    pub bodies_created: u64,
    /// Bodies ever destroyed.
    pub bodies_destroyed: u64,
    /// Steps taken.
    pub steps: u64,
    /// Pairs touching after the last step.
    pub active_contacts: usize,
}

type ColliderPair = (ColliderHandle, ColliderHandle);

/// The rigid-body world.
///
/// Not internally synchronized; the simulation thread shares it behind a
/// mutex and every structural change goes through that lock.
pub struct PhysicsWorld {
    gravity: Vec2,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    events: EventCollector,
    contacts: HashMap<ColliderPair, Contact>,
    listener: Option<Box<dyn ContactListener>>,
    filter: Box<dyn ContactFilter>,
    stats: WorldStats,
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl PhysicsWorld {
    /// Creates an empty world.
    #[must_use]
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            events: EventCollector::default(),
            contacts: HashMap::new(),
            listener: None,
            filter: Box::new(DefaultContactFilter),
            stats: WorldStats::default(),
        }
    }

    /// World gravity.
    #[inline]
    #[must_use]
    pub const fn gravity(&self) -> Vec2 {
        self.gravity
    }

    /// Changes world gravity.
    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.gravity = gravity;
    }

    /// Installs the contact listener, replacing any previous one.
    pub fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>) {
        self.listener = Some(listener);
    }

    /// Removes the contact listener.
    pub fn clear_contact_listener(&mut self) -> Option<Box<dyn ContactListener>> {
        self.listener.take()
    }

    /// Installs the contact filter, replacing the default category/mask rule.
    pub fn set_contact_filter(&mut self, filter: Box<dyn ContactFilter>) {
        self.filter = filter;
    }

    /// Creates a body without fixtures.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidBody`] for non-finite definitions.
    pub fn create_body(&mut self, def: &BodyDef) -> PhysicsResult<BodyHandle> {
        if !def.is_valid() {
            return Err(PhysicsError::InvalidBody(format!(
                "non-finite values in {def:?}"
            )));
        }

        let handle = BodyHandle::from(self.rigid_body_set.insert(def.builder().build()));
        self.stats.bodies_created += 1;
        trace!(body = %handle, bullet = def.bullet, "Body created");
        Ok(handle)
    }

    /// Attaches a fixture to a body.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::UnknownBody`] for a stale handle and
    /// [`PhysicsError::InvalidBody`] for degenerate shapes.
    pub fn create_fixture(&mut self, body: BodyHandle, fixture: FixtureDef) -> PhysicsResult<()> {
        if !fixture.is_valid() {
            return Err(PhysicsError::InvalidBody(format!(
                "degenerate fixture {fixture:?}"
            )));
        }
        if !self.contains(body) {
            return Err(PhysicsError::UnknownBody(body));
        }
        self.collider_set.insert_with_parent(
            fixture.builder().build(),
            RigidBodyHandle::from(body),
            &mut self.rigid_body_set,
        );
        Ok(())
    }

    /// Destroys a body and its fixtures, ending their contacts.
    ///
    /// # Returns
    ///
    /// `false` if the handle was already stale.
    pub fn destroy_body(&mut self, body: BodyHandle) -> bool {
        let handle = RigidBodyHandle::from(body);
        let Some(record) = self.rigid_body_set.get(handle) else {
            return false;
        };
        let colliders = record.colliders().to_vec();

        let ended: Vec<ColliderPair> = self
            .contacts
            .keys()
            .filter(|(a, b)| colliders.contains(a) || colliders.contains(b))
            .copied()
            .collect();
        for pair in ended {
            if let Some(contact) = self.contacts.remove(&pair) {
                if let Some(listener) = self.listener.as_deref_mut() {
                    listener.end_contact(&contact);
                }
            }
        }

        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
        self.stats.bodies_destroyed += 1;
        self.stats.active_contacts = self.contacts.len();
        trace!(body = %body, "Body destroyed");
        true
    }

    /// Whether the handle refers to a live body.
    #[inline]
    #[must_use]
    pub fn contains(&self, body: BodyHandle) -> bool {
        self.rigid_body_set.contains(body.into())
    }

    /// Number of live bodies.
    #[inline]
    #[must_use]
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Handles of every live body.
    pub fn bodies(&self) -> impl Iterator<Item = BodyHandle> + '_ {
        self.rigid_body_set.iter().map(|(handle, _)| handle.into())
    }

    /// Body position (meters).
    #[must_use]
    pub fn position(&self, body: BodyHandle) -> Option<Vec2> {
        self.body(body).map(|b| to_vec2(b.translation()))
    }

    /// Teleports a body.
    pub fn set_position(&mut self, body: BodyHandle, position: Vec2) -> bool {
        if !position.is_finite() {
            return false;
        }
        let Some(record) = self.body_mut(body) else {
            return false;
        };
        record.set_translation(to_vector(position), true);
        true
    }

    /// Body velocity (meters per second).
    #[must_use]
    pub fn linear_velocity(&self, body: BodyHandle) -> Option<Vec2> {
        self.body(body).map(|b| to_vec2(b.linvel()))
    }

    /// Sets a body's velocity, waking it when non-zero.
    ///
    /// # Returns
    ///
    /// `false` for stale handles, static bodies and non-finite values.
    pub fn set_linear_velocity(&mut self, body: BodyHandle, velocity: Vec2) -> bool {
        if !velocity.is_finite() {
            return false;
        }
        match self.body_mut(body) {
            Some(record) if record.body_type() != RigidBodyType::Fixed => {
                record.set_linvel(to_vector(velocity), velocity != Vec2::ZERO);
                true
            }
            _ => false,
        }
    }

    /// Body simulation role.
    #[must_use]
    pub fn body_type(&self, body: BodyHandle) -> Option<BodyType> {
        self.body(body).map(|b| b.body_type().into())
    }

    /// The caller-owned word stored on the body.
    #[must_use]
    pub fn user_data(&self, body: BodyHandle) -> Option<u64> {
        self.body(body).map(|b| b.user_data as u64)
    }

    /// Stores a caller-owned word on the body.
    pub fn set_user_data(&mut self, body: BodyHandle, data: u64) -> bool {
        let Some(record) = self.body_mut(body) else {
            return false;
        };
        record.user_data = u128::from(data);
        true
    }

    /// Whether the body is awake.
    #[must_use]
    pub fn is_awake(&self, body: BodyHandle) -> Option<bool> {
        self.body(body).map(|b| !b.is_sleeping())
    }

    /// Wakes or sleeps a body.
    pub fn set_awake(&mut self, body: BodyHandle, awake: bool) -> bool {
        let Some(record) = self.body_mut(body) else {
            return false;
        };
        if awake {
            record.wake_up(true);
        } else {
            record.sleep();
        }
        true
    }

    /// Contacts touching after the last step.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> + '_ {
        self.contacts.values()
    }

    /// Lifetime counters.
    #[inline]
    #[must_use]
    pub const fn stats(&self) -> WorldStats {
        self.stats
    }

    /// Advances the world by `dt` seconds.
    ///
    /// `velocity_iterations` drives rapier's solver iterations and
    /// `position_iterations` its stabilization passes. Non-positive or
    /// non-finite `dt` is ignored.
    pub fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        self.stats.steps += 1;

        let params = &mut self.integration_parameters;
        params.dt = dt;
        params.num_solver_iterations = (velocity_iterations.max(1) as usize)
            .try_into()
            .unwrap_or(params.num_solver_iterations);
        params.num_internal_stabilization_iterations = (position_iterations.max(1) as usize)
            .try_into()
            .unwrap_or(params.num_internal_stabilization_iterations);

        let hooks = FilterHooks::new(self.filter.as_ref());
        self.physics_pipeline.step(
            to_vector(self.gravity),
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &hooks,
            &self.events,
        );

        let events = self.events.take();
        self.report_contacts(events);
    }

    /// Sends every fixture (and bullet velocities) to `draw`, in pixels.
    pub fn debug_draw(&self, draw: &mut dyn DebugDraw, pixels_per_meter: f32) {
        for (_, collider) in self.collider_set.iter() {
            let Some(body) = collider.parent().and_then(|h| self.rigid_body_set.get(h)) else {
                continue;
            };
            let color = if collider.is_sensor() {
                COLOR_SENSOR
            } else {
                body_color(body)
            };
            let center = to_vec2(collider.translation());

            if let Some(ball) = collider.shape().as_ball() {
                draw.draw_circle(center * pixels_per_meter, ball.radius * pixels_per_meter, color);
            } else if let Some(cuboid) = collider.shape().as_cuboid() {
                let half = to_vec2(cuboid.half_extents);
                let (min, max) = (center - half, center + half);
                let vertices = [min, Vec2::new(max.x, min.y), max, Vec2::new(min.x, max.y)]
                    .map(|v| v * pixels_per_meter);
                draw.draw_polygon(&vertices, color);
            }
        }

        for (_, body) in self.rigid_body_set.iter() {
            let velocity = to_vec2(body.linvel());
            if body.is_ccd_enabled() && velocity != Vec2::ZERO {
                let origin = to_vec2(body.translation());
                let tip = origin + velocity * VELOCITY_DRAW_SECONDS;
                draw.draw_segment(
                    origin * pixels_per_meter,
                    tip * pixels_per_meter,
                    COLOR_VELOCITY,
                );
            }
        }
    }

    fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.rigid_body_set.get(handle.into())
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.rigid_body_set.get_mut(handle.into())
    }

    /// Contact record for a collider pair, lower body handle first.
    fn describe(&self, pair: ColliderPair, is_sensor: bool) -> Option<Contact> {
        let a = FixtureView::of(&self.rigid_body_set, &self.collider_set, pair.0)?;
        let b = FixtureView::of(&self.rigid_body_set, &self.collider_set, pair.1)?;
        let (a, b) = if a.body <= b.body { (a, b) } else { (b, a) };
        Some(Contact {
            body_a: a.body,
            body_b: b.body,
            user_data_a: a.user_data,
            user_data_b: b.user_data,
            is_sensor: is_sensor || a.is_sensor || b.is_sensor,
        })
    }

    fn report_contacts(&mut self, events: Vec<CollisionEvent>) {
        for event in events {
            let pair = ordered(event.collider1(), event.collider2());
            if event.started() {
                let Some(contact) = self.describe(pair, event.sensor()) else {
                    continue;
                };
                self.contacts.insert(pair, contact);
                if let Some(listener) = self.listener.as_deref_mut() {
                    listener.begin_contact(&contact);
                }
            } else if let Some(contact) = self.contacts.remove(&pair) {
                if let Some(listener) = self.listener.as_deref_mut() {
                    listener.end_contact(&contact);
                }
            }
        }
        self.stats.active_contacts = self.contacts.len();
    }
}

fn ordered(a: ColliderHandle, b: ColliderHandle) -> ColliderPair {
    if a.into_raw_parts() <= b.into_raw_parts() {
        (a, b)
    } else {
        (b, a)
    }
}

fn body_color(body: &RigidBody) -> DebugColor {
    match BodyType::from(body.body_type()) {
        BodyType::Static => COLOR_STATIC,
        BodyType::Kinematic => COLOR_KINEMATIC,
        BodyType::Dynamic if body.is_sleeping() => COLOR_ASLEEP,
        BodyType::Dynamic => COLOR_DYNAMIC,
    }
}
