//! # Deferred Destruction
//!
//! Systems never despawn while a frame is running. They call
//! [`DestructionQueue::destroy`]; the scene drains the queue once every
//! system has finished.

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::trace;

use tandem_core::{EntityId, EntityStore};
use tandem_physics::{BodyHandle, PhysicsQueue};

/// Entities waiting to be removed at the end of the frame.
///
/// Duplicates are allowed; the drain removes each entity once.
#[derive(Debug)]
pub struct DestructionQueue {
    tx: Sender<EntityId>,
    rx: Receiver<EntityId>,
}

impl Default for DestructionQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl DestructionQueue {
    /// Empty queue.
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    /// Marks `entity` for removal.
    ///
    /// # Returns
    ///
    /// `false` if the entity is already dead.
    pub fn destroy(&self, store: &EntityStore, entity: EntityId) -> bool {
        if !store.is_alive(entity) {
            return false;
        }
        // Both halves live in `self`, so the send cannot fail.
        self.tx.send(entity).is_ok()
    }

    /// Entities queued and not yet drained, duplicates included.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Removes every queued entity that is still alive.
    ///
    /// An entity carrying a body has its body detached and queued for
    /// deletion before it is despawned.
    ///
    /// # Returns
    ///
    /// Entities actually removed.
    pub fn drain(&self, store: &mut EntityStore, physics: &PhysicsQueue) -> usize {
        let mut removed = 0;
        for entity in self.rx.try_iter() {
            if !store.is_alive(entity) {
                continue;
            }
            if let Some(&body) = store.get::<BodyHandle>(entity) {
                physics.enqueue_body_deletion(store, entity, body);
            }
            if store.despawn(entity) {
                removed += 1;
            }
        }
        if removed > 0 {
            trace!(removed, "Destruction queue drained");
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::idle_physics;

    #[test]
    fn test_destroy_dead_entity_is_ignored() {
        let mut store = EntityStore::new(4);
        let queue = DestructionQueue::new();
        let entity = store.spawn();
        store.despawn(entity);

        assert!(!queue.destroy(&store, entity));
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_duplicates_removed_once() {
        let mut store = EntityStore::new(4);
        let queue = DestructionQueue::new();
        let manager = idle_physics();
        let entity = store.spawn();

        assert!(queue.destroy(&store, entity));
        assert!(queue.destroy(&store, entity));
        assert_eq!(queue.pending(), 2);

        assert_eq!(queue.drain(&mut store, &manager.queue()), 1);
        assert!(!store.is_alive(entity));
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_bodied_entity_queues_deletion() {
        let mut store = EntityStore::new(4);
        let queue = DestructionQueue::new();
        let manager = idle_physics();
        let physics = manager.queue();

        let body = manager
            .with_world(|world| {
                world.create_body(&tandem_physics::BodyDef::default())
            })
            .unwrap();
        let entity = store.spawn_with(body);

        queue.destroy(&store, entity);
        assert_eq!(queue.drain(&mut store, &physics), 1);
        assert_eq!(physics.pending_deletions(), 1);
    }

    #[test]
    fn test_bodied_duplicate_queues_one_deletion() {
        let mut store = EntityStore::new(4);
        let queue = DestructionQueue::new();
        let manager = idle_physics();
        let physics = manager.queue();

        let body = manager
            .with_world(|world| world.create_body(&tandem_physics::BodyDef::default()))
            .unwrap();
        let entity = store.spawn_with(body);

        assert!(queue.destroy(&store, entity));
        assert!(queue.destroy(&store, entity));
        assert_eq!(queue.drain(&mut store, &physics), 1);
        assert_eq!(physics.pending_deletions(), 1);

        let report = manager.tick().unwrap();
        assert_eq!(report.bodies_destroyed, 1);
        assert!(!manager.with_world(|world| world.contains(body)));
    }
}
