//! # Set-Based Queries
//!
//! A query names a tuple of component types; it matches every alive entity
//! whose component mask contains all of them.

use super::component::Component;
use super::world::EntityStore;

/// A tuple of component types usable with [`EntityStore::query`].
///
/// # Example
///
/// ```rust,ignore
/// for id in store.query::<(Position, BodyHandle)>() {
///     // every `id` has both components
/// }
/// ```
pub trait ComponentSet {
    /// Combined component bitmask, or `None` if some member type was never
    /// registered (in which case nothing can match).
    fn mask(store: &EntityStore) -> Option<u64>;
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: Component),+> ComponentSet for ($($name,)+) {
            fn mask(store: &EntityStore) -> Option<u64> {
                let mut mask = 0u64;
                $(
                    mask |= 1u64 << store.component_bit::<$name>()?;
                )+
                Some(mask)
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
