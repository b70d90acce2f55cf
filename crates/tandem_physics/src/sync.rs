//! # Physics Sync Manager
//!
//! Owns the simulation thread and keeps the entity store and the physics
//! world in step with each other.
//!
//! ## One iteration
//!
//! 1. Destroy bodies whose deletion was queued
//! 2. Build bodies for queued creation requests (store + world locked)
//! 3. Copy entity velocities into their bodies
//! 4. Destroy late deletions, then step the world (world locked)
//! 5. Copy body positions back into the entities
//!
//! Deletions are sent under the world lock (see
//! [`PhysicsQueue::enqueue_body_deletion`]), so a deletion cannot slip in
//! between step 4's drain and the step itself.
//!
//! The loop then sleeps for the configured interval and repeats while the
//! running flag is set.
//!
//! ## Locking
//!
//! The store is always locked before the world. Nothing here ever waits on
//! the store while holding the world.

use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver};
use glam::Vec2;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, error, info, trace, warn};

use tandem_core::{EntityId, EntityStore, Position};

use crate::config::PhysicsConfig;
use crate::error::{PhysicsError, PhysicsResult};
use crate::request::{BodyCreationRequest, BodyDeletionRequest, PhysicsQueue};
use crate::world::{BodyHandle, PhysicsWorld};

/// Iteration timing statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickStats {
    /// Shortest iteration observed.
    pub min_tick_us: u64,
    /// Longest iteration observed.
    pub max_tick_us: u64,
    /// Average iteration (rolling).
    pub avg_tick_us: u64,
    /// Iterations that took longer than one fixed step.
    pub late_ticks: u64,
    /// Iterations measured.
    pub total_ticks: u64,
}

impl Default for TickStats {
    fn default() -> Self {
        Self {
            min_tick_us: u64::MAX,
            max_tick_us: 0,
            avg_tick_us: 0,
            late_ticks: 0,
            total_ticks: 0,
        }
    }
}

impl TickStats {
    /// Records one iteration against its time budget.
    pub fn record(&mut self, duration: Duration, budget: Duration) {
        let duration_us = duration.as_micros() as u64;

        self.min_tick_us = self.min_tick_us.min(duration_us);
        self.max_tick_us = self.max_tick_us.max(duration_us);
        self.avg_tick_us = if self.total_ticks == 0 {
            duration_us
        } else {
            (self.avg_tick_us * 15 + duration_us) / 16
        };
        self.total_ticks += 1;

        if duration > budget {
            self.late_ticks += 1;
        }
    }
}

/// What one iteration did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Bodies destroyed from the deletion queue.
    pub bodies_destroyed: usize,
    /// Bodies built and attached.
    pub bodies_created: usize,
    /// Creation requests skipped (duplicate, dead or already bodied).
    pub requests_dropped: usize,
    /// Bodies whose velocity was written before the step.
    pub velocities_synced: usize,
    /// Entities whose position was written after the step.
    pub positions_synced: usize,
}

/// State shared between the manager and its thread.
struct Shared {
    store: Arc<RwLock<EntityStore>>,
    world: Arc<Mutex<PhysicsWorld>>,
    creations: Receiver<BodyCreationRequest>,
    deletions: Receiver<BodyDeletionRequest>,
    config: PhysicsConfig,
    budget: Duration,
    running: AtomicBool,
    fault: Mutex<Option<PhysicsError>>,
    stats: Mutex<TickStats>,
}

/// Drives the physics world on its own thread.
///
/// # Example
///
/// ```rust,ignore
/// let mut manager = PhysicsSyncManager::new(store, world, PhysicsConfig::default())?;
/// let queue = manager.queue();
/// manager.start()?;
///
/// queue.enqueue_body_creation(BodyCreationRequest::new(entity, |world| {
///     circle_body(world, BodyDef::default(), 16.0, 1.0, CollisionFilter::default(), 50.0)
/// }));
/// ```
pub struct PhysicsSyncManager {
    shared: Arc<Shared>,
    queue: PhysicsQueue,
    thread: Option<JoinHandle<PhysicsResult<()>>>,
}

impl PhysicsSyncManager {
    /// Binds a manager to a store and a world. The thread is not started.
    ///
    /// # Errors
    ///
    /// Returns [`PhysicsError::InvalidConfig`] for unusable settings.
    pub fn new(
        store: Arc<RwLock<EntityStore>>,
        world: Arc<Mutex<PhysicsWorld>>,
        config: PhysicsConfig,
    ) -> PhysicsResult<Self> {
        config.validate()?;
        let budget = config.step_budget()?;

        let (creation_tx, creation_rx) = unbounded();
        let (deletion_tx, deletion_rx) = unbounded();

        let queue = PhysicsQueue::new(creation_tx, deletion_tx, Arc::clone(&world));
        Ok(Self {
            shared: Arc::new(Shared {
                store,
                world,
                creations: creation_rx,
                deletions: deletion_rx,
                config,
                budget,
                running: AtomicBool::new(false),
                fault: Mutex::new(None),
                stats: Mutex::new(TickStats::default()),
            }),
            queue,
            thread: None,
        })
    }

    /// A producer handle for body requests.
    #[must_use]
    pub fn queue(&self) -> PhysicsQueue {
        self.queue.clone()
    }

    /// The entity store the sync passes write to.
    #[must_use]
    pub fn store(&self) -> &Arc<RwLock<EntityStore>> {
        &self.shared.store
    }

    /// The world the thread steps.
    #[must_use]
    pub fn world(&self) -> &Arc<Mutex<PhysicsWorld>> {
        &self.shared.world
    }

    /// Runs `f` with the world locked.
    ///
    /// Callers holding the store lock may call this; the reverse order
    /// deadlocks.
    pub fn with_world<R>(&self, f: impl FnOnce(&mut PhysicsWorld) -> R) -> R {
        f(&mut *self.shared.world.lock())
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &PhysicsConfig {
        &self.shared.config
    }

    /// Whether the loop is (still) running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// The fault that stopped the loop, if any.
    #[must_use]
    pub fn fault(&self) -> Option<PhysicsError> {
        self.shared.fault.lock().clone()
    }

    /// Iteration timing so far.
    #[must_use]
    pub fn stats(&self) -> TickStats {
        *self.shared.stats.lock()
    }

    /// Spawns the simulation thread.
    ///
    /// # Errors
    ///
    /// - [`PhysicsError::AlreadyRunning`] if the loop is running
    /// - the recorded fault if a previous run failed
    /// - [`PhysicsError::Spawn`] if the OS refuses the thread
    pub fn start(&mut self) -> PhysicsResult<()> {
        if let Some(fault) = self.fault() {
            return Err(fault);
        }
        if self.shared.running.swap(true, Ordering::AcqRel) {
            return Err(PhysicsError::AlreadyRunning);
        }

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name("tandem-physics".into())
            .spawn(move || shared.run());

        match spawned {
            Ok(handle) => {
                self.thread = Some(handle);
                Ok(())
            }
            Err(err) => {
                self.shared.running.store(false, Ordering::Release);
                Err(PhysicsError::Spawn(err.to_string()))
            }
        }
    }

    /// Runs one iteration on the calling thread.
    ///
    /// Faults are recorded exactly as on the simulation thread; once a fault
    /// is recorded every later call returns it.
    ///
    /// # Errors
    ///
    /// Returns the fault that stopped the simulation.
    pub fn tick(&self) -> PhysicsResult<TickReport> {
        self.shared.guarded_tick()
    }

    /// Stops the loop and joins the thread.
    ///
    /// Pending deletions are applied; pending creations are discarded.
    ///
    /// # Errors
    ///
    /// Returns the fault that stopped the loop, if any, whether it was hit
    /// on the thread or in [`PhysicsSyncManager::tick`].
    pub fn shutdown(&mut self) -> PhysicsResult<()> {
        self.shared.running.store(false, Ordering::Release);

        let result = match self.thread.take() {
            Some(handle) => handle.join().unwrap_or_else(|payload| {
                Err(PhysicsError::Panicked(panic_message(payload.as_ref())))
            }),
            None => Ok(()),
        };

        self.shared.drain_on_shutdown();
        match self.fault() {
            Some(fault) => Err(fault),
            None => result,
        }
    }
}

impl Drop for PhysicsSyncManager {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            debug!(error = %err, "Physics thread had stopped with a fault");
        }
    }
}

impl Shared {
    fn run(&self) -> PhysicsResult<()> {
        info!(
            fixed_delta = self.config.fixed_delta,
            sleep_ms = self.config.sleep_interval_ms,
            "Physics thread started"
        );

        while self.running.load(Ordering::Acquire) {
            self.guarded_tick()?;
            thread::sleep(self.config.sleep_interval());
        }

        info!("Physics thread stopped");
        Ok(())
    }

    fn guarded_tick(&self) -> PhysicsResult<TickReport> {
        if let Some(fault) = self.fault.lock().clone() {
            return Err(fault);
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.tick())).unwrap_or_else(|payload| {
            Err(PhysicsError::Panicked(panic_message(payload.as_ref())))
        });

        if let Err(err) = &result {
            error!(error = %err, "Physics simulation halted");
            *self.fault.lock() = Some(err.clone());
            self.running.store(false, Ordering::Release);
        }
        result
    }

    fn tick(&self) -> PhysicsResult<TickReport> {
        let start = Instant::now();
        let ratio = self.config.pixels_per_meter;
        let mut report = TickReport::default();

        report.bodies_destroyed += self.drain_deletions(&mut *self.world.lock());

        {
            let mut store = self.store.write();
            let mut world = self.world.lock();
            self.drain_creations(&mut store, &mut world, &mut report)?;
        }

        {
            let store = self.store.read();
            let mut world = self.world.lock();
            report.velocities_synced = pre_step_sync(&store, &mut world, ratio);
        }

        {
            let mut world = self.world.lock();
            report.bodies_destroyed += self.drain_deletions(&mut world);
            world.step(
                self.config.fixed_delta,
                self.config.velocity_iterations,
                self.config.position_iterations,
            );
        }

        {
            let mut store = self.store.write();
            let world = self.world.lock();
            report.positions_synced = post_step_sync(&mut store, &world, ratio);
        }

        self.stats.lock().record(start.elapsed(), self.budget);
        trace!(?report, "Physics tick");
        Ok(report)
    }

    fn drain_deletions(&self, world: &mut PhysicsWorld) -> usize {
        let mut destroyed = 0;
        for request in self.deletions.try_iter() {
            if world.destroy_body(request.body) {
                destroyed += 1;
            } else {
                trace!(entity = %request.entity, body = %request.body, "Deletion of unknown body ignored");
            }
        }
        destroyed
    }

    fn drain_creations(
        &self,
        store: &mut EntityStore,
        world: &mut PhysicsWorld,
        report: &mut TickReport,
    ) -> PhysicsResult<()> {
        let mut seen: HashSet<EntityId> = HashSet::new();

        for request in self.creations.try_iter() {
            let BodyCreationRequest {
                entity,
                factory,
                on_created,
            } = request;

            if !seen.insert(entity) || !store.is_alive(entity) || store.has::<BodyHandle>(entity) {
                trace!(%entity, "Creation request dropped");
                report.requests_dropped += 1;
                continue;
            }

            let body = factory(world)?;
            world.set_user_data(body, entity.to_bits());
            store.insert(entity, body);
            if let Some(callback) = on_created {
                callback(body);
            }
            report.bodies_created += 1;
        }
        Ok(())
    }

    fn drain_on_shutdown(&self) {
        let destroyed = self.drain_deletions(&mut *self.world.lock());
        let discarded = self.creations.try_iter().count();
        if discarded > 0 {
            warn!(discarded, "Discarded pending body creations on shutdown");
        }
        debug!(destroyed, "Applied pending body deletions on shutdown");
    }
}

/// Writes every bodied entity's velocity into its body, in meters.
///
/// NaN components become zero. Returns the number of bodies updated.
pub fn pre_step_sync(store: &EntityStore, world: &mut PhysicsWorld, pixels_per_meter: f32) -> usize {
    let mut synced = 0;
    for id in store.query::<(Position, BodyHandle)>() {
        let (Some(position), Some(body)) = (store.get::<Position>(id), store.get::<BodyHandle>(id)) else {
            continue;
        };
        let velocity = sanitize(position.velocity) / pixels_per_meter;
        if world.set_linear_velocity(*body, velocity) {
            synced += 1;
        }
    }
    synced
}

/// Writes every bodied entity's body position back into `Position::global`,
/// in pixels. Returns the number of entities updated.
pub fn post_step_sync(store: &mut EntityStore, world: &PhysicsWorld, pixels_per_meter: f32) -> usize {
    let bodied: Vec<EntityId> = store.query::<(Position, BodyHandle)>().collect();
    let mut synced = 0;
    for id in bodied {
        let Some(body) = store.get::<BodyHandle>(id).copied() else {
            continue;
        };
        let Some(meters) = world.position(body) else {
            continue;
        };
        if let Some(position) = store.get_mut::<Position>(id) {
            position.set_global(meters * pixels_per_meter);
            synced += 1;
        }
    }
    synced
}

#[inline]
fn sanitize(velocity: Vec2) -> Vec2 {
    Vec2::new(
        if velocity.x.is_nan() { 0.0 } else { velocity.x },
        if velocity.y.is_nan() { 0.0 } else { velocity.y },
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
