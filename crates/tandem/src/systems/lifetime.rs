//! # Timed Destruction

use tandem_core::EntityId;
use tracing::trace;

use crate::components::DestroyAfterTime;
use crate::schedule::{System, SystemContext};

/// Queues entities for destruction once their [`DestroyAfterTime`] expires.
#[derive(Debug, Default)]
pub struct DestroyAfterTimeSystem {
    scratch: Vec<EntityId>,
}

impl System for DestroyAfterTimeSystem {
    fn name(&self) -> &str {
        "DestroyAfterTimeSystem"
    }

    fn update(&mut self, ctx: &mut SystemContext<'_>) {
        let dt = ctx.delta();
        self.scratch.clear();
        self.scratch.extend(ctx.store.query::<(DestroyAfterTime,)>());

        for &entity in &self.scratch {
            let Some(timer) = ctx.store.get_mut::<DestroyAfterTime>(entity) else {
                continue;
            };
            timer.elapsed += dt;
            if timer.destroyed || timer.elapsed < timer.time {
                continue;
            }
            timer.destroyed = true;
            trace!(%entity, "Lifetime expired");
            ctx.destruction.destroy(ctx.store, entity);
        }
    }
}
