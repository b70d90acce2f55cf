//! # Entity Store
//!
//! The central container for all entities and components.
//! Entity slots are pre-allocated at creation; component storages are
//! created lazily the first time a component type is inserted.

use std::any::TypeId;
use std::collections::HashMap;

use super::component::Component;
use super::entity::{Entity, EntityId};
use super::query::ComponentSet;
use super::storage::{ComponentStorage, ErasedStorage};

/// Maximum number of distinct component types (one mask bit each).
pub const MAX_COMPONENT_TYPES: usize = 64;

/// The entity store - container for all game state.
///
/// # Capacity
///
/// The store has a fixed entity capacity set at creation. Spawning past it
/// returns [`EntityId::NULL`].
///
/// # Stale handles
///
/// Every accessor checks liveness and generation first. Access through a
/// dead or recycled handle is a silent no-op (`None` / `false`).
///
/// # Example
///
/// ```rust,ignore
/// let mut store = EntityStore::new(1024);
///
/// let entity = store.spawn();
/// store.insert(entity, Position::zero());
/// assert!(store.has::<Position>(entity));
/// ```
pub struct EntityStore {
    /// All entity slots (pre-allocated).
    entities: Box<[Entity]>,
    /// Free list of entity indices for reuse.
    free_indices: Vec<u32>,
    /// Number of currently alive entities.
    alive_count: usize,
    /// Maximum capacity.
    capacity: usize,
    /// One storage per registered component type.
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
    /// Mask bit assigned to each registered component type.
    component_bits: HashMap<TypeId, u8>,
}

impl EntityStore {
    /// Creates a new store with the specified entity capacity.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero or exceeds `u32::MAX`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");
        assert!(
            u32::try_from(capacity).is_ok(),
            "Capacity cannot exceed u32::MAX"
        );

        let entities = (0..capacity)
            .map(|_| Entity::dead())
            .collect::<Vec<_>>()
            .into_boxed_slice();

        // Reversed so that index 0 is handed out first
        let free_indices: Vec<u32> = (0..capacity as u32).rev().collect();

        Self {
            entities,
            free_indices,
            alive_count: 0,
            capacity,
            storages: HashMap::new(),
            component_bits: HashMap::new(),
        }
    }

    /// Returns the maximum capacity of this store.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of currently alive entities.
    #[inline]
    #[must_use]
    pub const fn alive_count(&self) -> usize {
        self.alive_count
    }

    /// Spawns a new entity, returning its ID.
    ///
    /// # Returns
    ///
    /// The new entity's ID, or `EntityId::NULL` if capacity is reached.
    pub fn spawn(&mut self) -> EntityId {
        let Some(index) = self.free_indices.pop() else {
            return EntityId::NULL;
        };

        let entity = &mut self.entities[index as usize];

        // Increment generation to invalidate old references
        let generation = entity.id.generation().wrapping_add(1);
        let new_id = EntityId::new(index, generation);

        *entity = Entity::new(new_id);
        self.alive_count += 1;

        new_id
    }

    /// Spawns an entity carrying a single component.
    pub fn spawn_with<C: Component>(&mut self, component: C) -> EntityId {
        let id = self.spawn();
        if !id.is_null() {
            self.insert(id, component);
        }
        id
    }

    /// Despawns an entity, dropping its components and freeing its slot.
    ///
    /// # Returns
    ///
    /// `true` if the entity was despawned, `false` if it was already dead
    /// or the ID was invalid/stale.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if !self.is_alive(id) {
            return false;
        }

        let idx = id.index() as usize;
        let mask = self.entities[idx].component_mask;

        // Drop every attached component
        for (type_id, bit) in &self.component_bits {
            if mask & (1 << bit) != 0 {
                if let Some(storage) = self.storages.get_mut(type_id) {
                    storage.reset_slot(idx);
                }
            }
        }

        let entity = &mut self.entities[idx];
        entity.alive = false;
        entity.component_mask = 0;
        self.alive_count -= 1;

        self.free_indices.push(id.index());

        true
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        if id.is_null() {
            return false;
        }

        self.entities
            .get(id.index() as usize)
            .is_some_and(|entity| entity.alive && entity.id.generation() == id.generation())
    }

    /// Gets an entity slot by ID.
    ///
    /// Returns `None` if not found/dead/stale.
    #[inline]
    #[must_use]
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        if !self.is_alive(id) {
            return None;
        }
        Some(&self.entities[id.index() as usize])
    }

    /// Iterates over all alive entity IDs.
    pub fn iter_alive(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.iter().filter(|e| e.alive).map(|e| e.id)
    }

    /// Returns the mask bit of a component type, if registered.
    #[inline]
    #[must_use]
    pub fn component_bit<C: Component>(&self) -> Option<u8> {
        self.component_bits.get(&TypeId::of::<C>()).copied()
    }

    /// Registers a component type, creating its storage.
    ///
    /// Registering twice is a no-op that returns the existing bit.
    ///
    /// # Panics
    ///
    /// Panics if more than [`MAX_COMPONENT_TYPES`] types are registered.
    pub fn register<C: Component>(&mut self) -> u8 {
        let type_id = TypeId::of::<C>();
        if let Some(bit) = self.component_bits.get(&type_id) {
            return *bit;
        }

        let next = self.component_bits.len();
        assert!(
            next < MAX_COMPONENT_TYPES,
            "Component type limit ({MAX_COMPONENT_TYPES}) exceeded"
        );
        let bit = next as u8;

        self.component_bits.insert(type_id, bit);
        self.storages
            .insert(type_id, Box::new(ComponentStorage::<C>::new(self.capacity)));
        bit
    }

    /// Attaches (or replaces) a component on an alive entity.
    ///
    /// # Returns
    ///
    /// `false` if the entity is dead or stale.
    pub fn insert<C: Component>(&mut self, id: EntityId, component: C) -> bool {
        if !self.is_alive(id) {
            return false;
        }

        let bit = self.register::<C>();
        let idx = id.index() as usize;

        let Some(storage) = self.storage_mut::<C>() else {
            return false;
        };
        if !storage.set(idx, component) {
            return false;
        }

        self.entities[idx].add_component(bit);
        true
    }

    /// Detaches a component, returning it.
    pub fn remove<C: Component>(&mut self, id: EntityId) -> Option<C> {
        if !self.has::<C>(id) {
            return None;
        }

        let bit = self.component_bit::<C>()?;
        let idx = id.index() as usize;
        self.entities[idx].remove_component(bit);
        self.storage_mut::<C>()?.take(idx)
    }

    /// Checks if an alive entity carries a component.
    #[must_use]
    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        match (self.entity(id), self.component_bit::<C>()) {
            (Some(entity), Some(bit)) => entity.has_component(bit),
            _ => false,
        }
    }

    /// Gets a component of an alive entity.
    #[must_use]
    pub fn get<C: Component>(&self, id: EntityId) -> Option<&C> {
        if !self.is_alive(id) {
            return None;
        }
        self.storage::<C>()?.get(id.index() as usize)
    }

    /// Gets a mutable component of an alive entity.
    pub fn get_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        if !self.is_alive(id) {
            return None;
        }
        self.storage_mut::<C>()?.get_mut(id.index() as usize)
    }

    /// Returns the storage for a component type, for batch processing.
    #[must_use]
    pub fn storage<C: Component>(&self) -> Option<&ComponentStorage<C>> {
        self.storages
            .get(&TypeId::of::<C>())?
            .as_any()
            .downcast_ref::<ComponentStorage<C>>()
    }

    /// Returns the mutable storage for a component type.
    pub fn storage_mut<C: Component>(&mut self) -> Option<&mut ComponentStorage<C>> {
        self.storages
            .get_mut(&TypeId::of::<C>())?
            .as_any_mut()
            .downcast_mut::<ComponentStorage<C>>()
    }

    /// Iterates over every alive entity carrying all components of `Q`.
    ///
    /// The iterator borrows the store; collect it first when the loop body
    /// needs to mutate.
    pub fn query<Q: ComponentSet>(&self) -> impl Iterator<Item = EntityId> + '_ {
        let mask = Q::mask(self);
        self.entities
            .iter()
            .filter(move |e| e.alive && mask.is_some_and(|m| e.has_all(m)))
            .map(|e| e.id)
    }

    /// Number of alive entities carrying all components of `Q`.
    #[must_use]
    pub fn count<Q: ComponentSet>(&self) -> usize {
        self.query::<Q>().count()
    }
}
