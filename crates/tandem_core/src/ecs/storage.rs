//! # Component Storage
//!
//! Pre-allocated, sparse-by-slot component storage.
//!
//! The storage uses a slot array strategy:
//! - One slot per entity index, allocated when the storage is created
//! - Access is O(1) via entity index
//! - Iteration walks contiguous memory and skips empty slots

use std::any::Any;

use super::component::Component;

/// Pre-allocated storage for a single component type.
///
/// This storage guarantees:
/// - No allocations after initialization
/// - O(1) access by entity index
/// - Cache-friendly iteration
///
/// # Example
///
/// ```rust,ignore
/// let mut storage: ComponentStorage<Position> = ComponentStorage::new(1024);
/// storage.set(0, Position::zero());
/// ```
pub struct ComponentStorage<C: Component> {
    /// One optional component per entity slot.
    data: Box<[Option<C>]>,
    /// Number of occupied slots.
    len: usize,
}

impl<C: Component> ComponentStorage<C> {
    /// Creates new component storage with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        let data = (0..capacity).map(|_| None).collect::<Vec<_>>().into_boxed_slice();

        Self { data, len: 0 }
    }

    /// Returns the capacity of this storage.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns the number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slot is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Gets a component by entity index.
    ///
    /// Returns `None` if the index is out of bounds or the slot is empty.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&C> {
        self.data.get(index)?.as_ref()
    }

    /// Gets a mutable component by entity index.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut C> {
        self.data.get_mut(index)?.as_mut()
    }

    /// Sets a component at the specified index, overwriting any previous value.
    ///
    /// # Returns
    ///
    /// `true` if the component was set, `false` if index was out of bounds.
    #[inline]
    pub fn set(&mut self, index: usize, component: C) -> bool {
        let Some(slot) = self.data.get_mut(index) else {
            return false;
        };
        if slot.is_none() {
            self.len += 1;
        }
        *slot = Some(component);
        true
    }

    /// Removes and returns the component at the specified index.
    #[inline]
    pub fn take(&mut self, index: usize) -> Option<C> {
        let taken = self.data.get_mut(index)?.take();
        if taken.is_some() {
            self.len -= 1;
        }
        taken
    }

    /// Iterates over occupied slots with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &C)> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|c| (idx, c)))
    }

    /// Iterates mutably over occupied slots with their indices.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (usize, &mut C)> {
        self.data
            .iter_mut()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_mut().map(|c| (idx, c)))
    }

    /// Empties a slot.
    #[inline]
    pub fn reset(&mut self, index: usize) {
        drop(self.take(index));
    }

    /// Empties every slot without freeing the slot array.
    pub fn clear(&mut self) {
        for slot in self.data.iter_mut() {
            *slot = None;
        }
        self.len = 0;
    }
}

/// Type-erased view of a [`ComponentStorage`] so the store can hold one per
/// component type and still reset slots on despawn.
pub(crate) trait ErasedStorage: Send + Sync {
    /// Empties a slot.
    fn reset_slot(&mut self, index: usize);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<C: Component> ErasedStorage for ComponentStorage<C> {
    fn reset_slot(&mut self, index: usize) {
        self.reset(index);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
