//! # Transform Refresh

use tandem_core::{EntityId, Position};

use crate::schedule::{System, SystemContext};

/// Recomputes stale cached transforms before anything reads them.
///
/// Entities have no parents, so the global scale and rotation equal the
/// local ones.
#[derive(Debug, Default)]
pub struct TransformSystem {
    scratch: Vec<EntityId>,
    refreshed: usize,
}

impl TransformSystem {
    /// Transforms recomputed during the latest frame.
    #[must_use]
    pub const fn refreshed(&self) -> usize {
        self.refreshed
    }
}

impl System for TransformSystem {
    fn name(&self) -> &str {
        "TransformSystem"
    }

    fn before_update(&mut self, ctx: &mut SystemContext<'_>) {
        self.refreshed = 0;
        self.scratch.clear();
        self.scratch.extend(ctx.store.query::<(Position,)>());

        for &entity in &self.scratch {
            let Some(pos) = ctx.store.get_mut::<Position>(entity) else {
                continue;
            };
            if !pos.is_dirty() {
                continue;
            }
            pos.global_scale = pos.scale;
            pos.global_rotation = pos.rotation;
            pos.refresh_transform();
            self.refreshed += 1;
        }
    }
}
