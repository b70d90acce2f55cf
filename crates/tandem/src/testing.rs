//! Shared fixtures for unit tests.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tandem_core::EntityStore;
use tandem_physics::{PhysicsConfig, PhysicsSyncManager, PhysicsWorld};

/// A manager that is never started, bound to a throwaway store.
pub(crate) fn idle_physics() -> PhysicsSyncManager {
    PhysicsSyncManager::new(
        Arc::new(RwLock::new(EntityStore::new(8))),
        Arc::new(Mutex::new(PhysicsWorld::default())),
        PhysicsConfig::default(),
    )
    .unwrap()
}
