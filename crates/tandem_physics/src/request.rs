//! # Body Requests
//!
//! Structural changes to the physics world are never made from the main
//! thread directly. They are queued here and applied by the simulation
//! thread at the start of its next iteration.

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::Sender;
use parking_lot::Mutex;
use tracing::{trace, warn};

use tandem_core::{EntityId, EntityStore};

use crate::error::PhysicsResult;
use crate::world::{BodyHandle, PhysicsWorld};

/// Builds a body inside the world.
pub type BodyFactoryFn = Box<dyn FnOnce(&mut PhysicsWorld) -> PhysicsResult<BodyHandle> + Send>;

/// Runs once the body is attached to its entity.
pub type BodyCreatedFn = Box<dyn FnOnce(BodyHandle) + Send>;

/// Ask for a body to be built and attached to `entity`.
///
/// The factory runs on the simulation thread with the entity store and the
/// world both locked; neither it nor the completion callback may try to
/// take those locks again.
pub struct BodyCreationRequest {
    /// Entity that will own the body.
    pub entity: EntityId,
    pub(crate) factory: BodyFactoryFn,
    pub(crate) on_created: Option<BodyCreatedFn>,
}

impl fmt::Debug for PhysicsQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsQueue")
            .field("pending_creations", &self.creations.len())
            .field("pending_deletions", &self.deletions.len())
            .finish_non_exhaustive()
    }
}

impl BodyCreationRequest {
    /// Request served by `factory`.
    pub fn new<F>(entity: EntityId, factory: F) -> Self
    where
        F: FnOnce(&mut PhysicsWorld) -> PhysicsResult<BodyHandle> + Send + 'static,
    {
        Self {
            entity,
            factory: Box::new(factory),
            on_created: None,
        }
    }

    /// Adds a completion callback.
    #[must_use]
    pub fn on_created<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(BodyHandle) + Send + 'static,
    {
        self.on_created = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for BodyCreationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyCreationRequest")
            .field("entity", &self.entity)
            .field("has_callback", &self.on_created.is_some())
            .finish_non_exhaustive()
    }
}

/// Ask for a body to be removed from the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BodyDeletionRequest {
    /// Entity that owned the body.
    pub entity: EntityId,
    /// Body to destroy.
    pub body: BodyHandle,
}

/// Producer side of the creation and deletion queues.
///
/// Cheap to clone; every clone feeds the same simulation thread. Creation
/// requests never block. Deletions wait for a step in progress to finish.
#[derive(Clone)]
pub struct PhysicsQueue {
    creations: Sender<BodyCreationRequest>,
    deletions: Sender<BodyDeletionRequest>,
    world: Arc<Mutex<PhysicsWorld>>,
}

impl PhysicsQueue {
    pub(crate) const fn new(
        creations: Sender<BodyCreationRequest>,
        deletions: Sender<BodyDeletionRequest>,
        world: Arc<Mutex<PhysicsWorld>>,
    ) -> Self {
        Self {
            creations,
            deletions,
            world,
        }
    }

    /// Queues a body creation.
    ///
    /// # Returns
    ///
    /// `false` if the simulation side has been dropped.
    pub fn enqueue_body_creation(&self, request: BodyCreationRequest) -> bool {
        let entity = request.entity;
        match self.creations.send(request) {
            Ok(()) => {
                trace!(%entity, "Body creation queued");
                true
            }
            Err(_) => {
                warn!(%entity, "Body creation dropped: physics side is gone");
                false
            }
        }
    }

    /// Detaches `body` from `entity` right away, then queues its destruction.
    ///
    /// After this returns the entity no longer carries a body, so the sync
    /// passes skip it even before the simulation thread catches up.
    ///
    /// The request is sent with the world locked. The simulation thread
    /// drains deletions under that same lock right before stepping, so no
    /// step starts after this returns with the body still in the world.
    /// Takes the world lock while the caller holds the store, which is the
    /// crate's lock order.
    pub fn enqueue_body_deletion(
        &self,
        store: &mut EntityStore,
        entity: EntityId,
        body: BodyHandle,
    ) -> bool {
        store.remove::<BodyHandle>(entity);
        let _world = self.world.lock();
        match self.deletions.send(BodyDeletionRequest { entity, body }) {
            Ok(()) => {
                trace!(%entity, %body, "Body deletion queued");
                true
            }
            Err(_) => {
                warn!(%entity, %body, "Body deletion dropped: physics side is gone");
                false
            }
        }
    }

    /// Creation requests not yet picked up.
    #[must_use]
    pub fn pending_creations(&self) -> usize {
        self.creations.len()
    }

    /// Deletion requests not yet picked up.
    #[must_use]
    pub fn pending_deletions(&self) -> usize {
        self.deletions.len()
    }
}
