//! # Entity Management
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into component arrays
//! - A generation counter for safe reuse
//!
//! A handle outlives the entity it names. Once the slot is despawned and
//! reused, the generation no longer matches and every lookup through the old
//! handle fails quietly.

use bytemuck::{Pod, Zeroable};

/// Unique identifier for an entity.
///
/// The ID is split into two parts:
/// - Lower 32 bits: Index into component arrays
/// - Upper 32 bits: Generation counter for detecting stale references
///
/// The handle is plain data so it can ride along in a rigid body's
/// user-data word (see [`EntityId::to_bits`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Pod, Zeroable)]
#[repr(transparent)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - The slot index (0 to 2^32-1)
    /// * `generation` - The generation counter (0 to 2^32-1)
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0 as u32
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }

    /// Null/invalid entity ID.
    pub const NULL: Self = Self(u64::MAX);

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == u64::MAX
    }

    /// Packs the handle into a raw 64-bit word.
    #[inline]
    #[must_use]
    pub fn to_bits(self) -> u64 {
        bytemuck::cast(self)
    }

    /// Restores a handle packed with [`EntityId::to_bits`].
    #[inline]
    #[must_use]
    pub fn from_bits(bits: u64) -> Self {
        bytemuck::cast(bits)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::NULL
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_null() {
            write!(f, "Entity(null)")
        } else {
            write!(f, "Entity({}v{})", self.index(), self.generation())
        }
    }
}

/// Entity slot with its components' validity flags.
///
/// It tracks which components are attached via a bitmask. Bits are handed
/// out by the store the first time a component type is registered.
#[derive(Clone, Copy, Debug)]
pub struct Entity {
    /// The unique identifier for this entity.
    pub id: EntityId,
    /// Bitmask of attached components (up to 64 component types).
    pub component_mask: u64,
    /// Whether this entity slot is currently alive.
    pub alive: bool,
}

impl Entity {
    /// Creates a new entity.
    #[inline]
    #[must_use]
    pub const fn new(id: EntityId) -> Self {
        Self {
            id,
            component_mask: 0,
            alive: true,
        }
    }

    /// Creates a dead/empty entity slot.
    ///
    /// The slot keeps generation zero so the first spawn hands out
    /// generation one.
    #[inline]
    #[must_use]
    pub const fn dead() -> Self {
        Self {
            id: EntityId::new(0, 0),
            component_mask: 0,
            alive: false,
        }
    }

    /// Checks if this entity has a specific component.
    ///
    /// # Arguments
    ///
    /// * `bit` - The component bit (0-63)
    #[inline]
    #[must_use]
    pub const fn has_component(self, bit: u8) -> bool {
        (self.component_mask & (1 << bit)) != 0
    }

    /// Checks if this entity carries every component in `mask`.
    #[inline]
    #[must_use]
    pub const fn has_all(self, mask: u64) -> bool {
        self.component_mask & mask == mask
    }

    /// Adds a component flag to this entity.
    #[inline]
    pub fn add_component(&mut self, bit: u8) {
        self.component_mask |= 1 << bit;
    }

    /// Removes a component flag from this entity.
    #[inline]
    pub fn remove_component(&mut self, bit: u8) {
        self.component_mask &= !(1 << bit);
    }
}

impl Default for Entity {
    fn default() -> Self {
        Self::dead()
    }
}
