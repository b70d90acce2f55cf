//! # Scene
//!
//! One scene owns an entity store, a physics world with its simulation
//! thread, two system groups and the deferred destruction queue.
//!
//! ```text
//! game_loop(time):
//!   fault recorded?  -> PhysicsHalted
//!   first call       -> wake only
//!   store.write()
//!     logic.before_update   render.before_update
//!     logic.update          render.update
//!     physics debug draw -> DebugDrawSystem
//!     render.render_ui
//!     render.after_update   logic.after_update
//!     destruction.drain
//! ```
//!
//! The store stays write-locked for the whole frame. The simulation thread
//! only needs it for its creation drain and sync passes, and takes it
//! between frames.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use tandem_core::{EntityId, EntityStore, Position};
use tandem_physics::{
    box_body, circle_body, BodyCreationRequest, BodyDef, BodyType, LoggingContactListener,
    PhysicsQueue, PhysicsSyncManager, PhysicsWorld,
};

use crate::collision::{projectile_filter, world_object_filter, GameContactFilter};
use crate::components::{DestroyAfterTime, Named, Projectile, WorldObject};
use crate::config::SceneConfig;
use crate::destruction::DestructionQueue;
use crate::error::{SceneError, SceneResult};
use crate::schedule::{Group, System, SystemContext};
use crate::systems::DebugDrawSystem;
use crate::time::GameTime;

/// Frames slower than this are logged.
pub const SLOW_FRAME: Duration = Duration::from_millis(33);

/// Seconds a projectile lives at most.
pub const PROJECTILE_LIFETIME: f32 = 5.0;
/// Velocity decay rate of projectiles.
pub const PROJECTILE_DECAY: f32 = 0.55;
/// Speed (pixels per second) under which a projectile is removed.
pub const PROJECTILE_MIN_SPEED: f32 = 100.0;

/// Timing of one [`Scene::game_loop`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Whole call in microseconds.
    pub total_us: u64,
    /// Logic group phases in microseconds.
    pub logic_us: u64,
    /// Render group phases and debug draw in microseconds.
    pub render_us: u64,
    /// Entities removed by the end-of-frame drain.
    pub entities_destroyed: usize,
    /// This call only woke the scene.
    pub woke: bool,
}

/// A running game scene.
///
/// # Example
///
/// ```rust,ignore
/// let mut scene = Scene::new(SceneConfig::named("arena"))?;
/// scene.logic_mut().add(MovementSystem::new());
/// scene.render_mut().add(DebugDrawSystem::new());
/// scene.initialize()?;
///
/// let mut clock = GameClock::new();
/// loop {
///     scene.game_loop(clock.tick())?;
/// }
/// ```
pub struct Scene {
    config: SceneConfig,
    store: Arc<RwLock<EntityStore>>,
    physics: PhysicsSyncManager,
    physics_queue: PhysicsQueue,
    destruction: DestructionQueue,
    logic: Group,
    render: Group,
    awake: bool,
    initialized: bool,
    frame: u64,
}

impl Scene {
    /// Builds the store, the world and an idle simulation thread.
    ///
    /// The world uses [`GameContactFilter`] and logs contacts.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Config`] or [`SceneError::Physics`] for an
    /// invalid configuration.
    pub fn new(config: SceneConfig) -> SceneResult<Self> {
        config.validate()?;

        let store = Arc::new(RwLock::new(EntityStore::new(config.entity_capacity)));

        let mut world = PhysicsWorld::new(config.physics.gravity);
        world.set_contact_filter(Box::new(GameContactFilter));
        world.set_contact_listener(Box::new(LoggingContactListener::new()));
        let world = Arc::new(Mutex::new(world));

        let physics = PhysicsSyncManager::new(Arc::clone(&store), world, config.physics.clone())?;
        let physics_queue = physics.queue();

        debug!(scene = %config.name, capacity = config.entity_capacity, "Scene created");

        Ok(Self {
            logic: Group::new("logic"),
            render: Group::new("render"),
            config,
            store,
            physics,
            physics_queue,
            destruction: DestructionQueue::new(),
            awake: false,
            initialized: false,
            frame: 0,
        })
    }

    /// Scene name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// The shared entity store.
    ///
    /// Do not hold a guard across [`Scene::game_loop`]; the frame takes the
    /// write lock.
    #[must_use]
    pub const fn store(&self) -> &Arc<RwLock<EntityStore>> {
        &self.store
    }

    /// The simulation thread manager.
    #[must_use]
    pub const fn physics(&self) -> &PhysicsSyncManager {
        &self.physics
    }

    /// Producer handle for body requests.
    #[must_use]
    pub const fn physics_queue(&self) -> &PhysicsQueue {
        &self.physics_queue
    }

    /// End-of-frame destruction queue.
    #[must_use]
    pub const fn destruction(&self) -> &DestructionQueue {
        &self.destruction
    }

    /// Systems that drive gameplay.
    #[must_use]
    pub const fn logic(&self) -> &Group {
        &self.logic
    }

    /// Mutable access to the logic group, for registering systems.
    pub fn logic_mut(&mut self) -> &mut Group {
        &mut self.logic
    }

    /// Systems that present the frame.
    #[must_use]
    pub const fn render(&self) -> &Group {
        &self.render
    }

    /// Mutable access to the render group, for registering systems.
    pub fn render_mut(&mut self) -> &mut Group {
        &mut self.render
    }

    /// Whether the first [`Scene::game_loop`] call has happened.
    #[must_use]
    pub const fn is_awake(&self) -> bool {
        self.awake
    }

    /// Calls to [`Scene::game_loop`] so far, the waking one included.
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Runs the initialize phase of both groups, logic first.
    pub fn initialize_systems(&mut self) {
        let mut store = self.store.write();
        let mut ctx = SystemContext {
            store: &mut *store,
            destruction: &self.destruction,
            physics: &self.physics_queue,
            time: GameTime::default(),
        };
        self.logic.initialize(&mut ctx);
        self.render.initialize(&mut ctx);
    }

    /// Starts the simulation thread.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::Physics`] if it is already running, failed
    /// earlier, or cannot be spawned.
    pub fn start_physics(&mut self) -> SceneResult<()> {
        self.physics.start()?;
        Ok(())
    }

    /// Initializes systems once, then starts the simulation thread.
    ///
    /// # Errors
    ///
    /// As [`Scene::start_physics`].
    pub fn initialize(&mut self) -> SceneResult<()> {
        if !self.initialized {
            self.initialize_systems();
            self.initialized = true;
        }
        self.start_physics()?;
        info!(
            scene = %self.config.name,
            logic = self.logic.len(),
            render = self.render.len(),
            "Scene initialized"
        );
        Ok(())
    }

    /// Stops the simulation thread.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::PhysicsHalted`] if the thread had stopped on a
    /// fault.
    pub fn shutdown(&mut self) -> SceneResult<()> {
        self.physics.shutdown().map_err(SceneError::PhysicsHalted)?;
        info!(scene = %self.config.name, frames = self.frame, "Scene shut down");
        Ok(())
    }

    /// Queues `entity` for removal at the end of the next frame.
    ///
    /// For use outside [`Scene::game_loop`]; systems go through
    /// [`SystemContext::destruction`].
    pub fn destroy(&self, entity: EntityId) -> bool {
        self.destruction.destroy(&self.store.read(), entity)
    }

    /// Spawns a named entity at `position`.
    pub fn spawn_named(&self, name: impl Into<String>, position: Vec2) -> EntityId {
        let mut store = self.store.write();
        let entity = store.spawn_with(Position::new(position, Vec2::ZERO));
        store.insert(entity, Named::new(name));
        entity
    }

    /// Spawns a static wall whose top-left corner is at `position`, and
    /// queues its body.
    pub fn spawn_wall(&self, position: Vec2, size: Vec2) -> EntityId {
        let entity = {
            let mut store = self.store.write();
            let entity = store.spawn_with(Position::new(position, Vec2::ZERO));
            store.insert(entity, WorldObject);
            store.insert(entity, Named::new("Wall"));
            entity
        };

        let ppm = self.config.physics.pixels_per_meter;
        self.physics_queue.enqueue_body_creation(BodyCreationRequest::new(entity, move |world| {
            box_body(world, position, size, world_object_filter(), ppm)
        }));
        entity
    }

    /// Spawns a decaying projectile and queues its body.
    pub fn spawn_projectile(&self, position: Vec2, velocity: Vec2, diameter: f32) -> EntityId {
        let entity = {
            let mut store = self.store.write();
            let mut motion = Position::new(position, velocity);
            motion.velocity_decay_factor = PROJECTILE_DECAY;
            motion.destroy_on_zero_velocity = true;
            motion.min_velocity_to_destroy = PROJECTILE_MIN_SPEED;
            let entity = store.spawn_with(motion);
            store.insert(entity, Projectile);
            store.insert(entity, DestroyAfterTime::new(PROJECTILE_LIFETIME));
            store.insert(entity, Named::new("Projectile"));
            entity
        };

        let ppm = self.config.physics.pixels_per_meter;
        self.physics_queue.enqueue_body_creation(BodyCreationRequest::new(entity, move |world| {
            let def = BodyDef::new(BodyType::Dynamic, position / ppm)
                .with_velocity(velocity / ppm)
                .bullet();
            circle_body(world, def, diameter, 1.0, projectile_filter(), ppm)
        }));
        entity
    }

    /// Runs one frame.
    ///
    /// The first call only wakes the scene. Every later call runs both
    /// groups phase by phase and then removes the entities queued for
    /// destruction.
    ///
    /// # Errors
    ///
    /// Returns [`SceneError::PhysicsHalted`] once the simulation thread has
    /// stopped on a fault. No system runs in that case.
    pub fn game_loop(&mut self, time: GameTime) -> SceneResult<FrameStats> {
        if let Some(fault) = self.physics.fault() {
            return Err(SceneError::PhysicsHalted(fault));
        }

        let start = Instant::now();
        self.frame += 1;

        if !self.awake {
            self.awake = true;
            info!(scene = %self.config.name, "Scene awake");
            return Ok(FrameStats {
                frame: self.frame,
                total_us: micros(start.elapsed()),
                woke: true,
                ..FrameStats::default()
            });
        }

        let mut logic = Duration::ZERO;
        let mut render = Duration::ZERO;
        let ppm = self.config.physics.pixels_per_meter;

        let mut store = self.store.write();
        let mut ctx = SystemContext {
            store: &mut *store,
            destruction: &self.destruction,
            physics: &self.physics_queue,
            time,
        };

        logic += timed(|| self.logic.before_update(&mut ctx));
        render += timed(|| self.render.before_update(&mut ctx));
        logic += timed(|| self.logic.update(&mut ctx));
        render += timed(|| self.render.update(&mut ctx));

        let physics = &self.physics;
        if let Some(debug_draw) = self.render.get_mut::<DebugDrawSystem>() {
            if debug_draw.enabled() {
                render += timed(|| physics.with_world(|world| world.debug_draw(&mut *debug_draw, ppm)));
            }
        }

        render += timed(|| self.render.render_ui(&mut ctx));
        render += timed(|| self.render.after_update(&mut ctx));
        logic += timed(|| self.logic.after_update(&mut ctx));

        let entities_destroyed = self.destruction.drain(&mut store, &self.physics_queue);
        drop(store);

        let total = start.elapsed();
        if total > SLOW_FRAME {
            warn!(
                frame = self.frame,
                total_ms = total.as_secs_f64() * 1000.0,
                "Frame exceeded budget"
            );
        }

        Ok(FrameStats {
            frame: self.frame,
            total_us: micros(total),
            logic_us: micros(logic),
            render_us: micros(render),
            entities_destroyed,
            woke: false,
        })
    }
}

fn timed(f: impl FnOnce()) -> Duration {
    let start = Instant::now();
    f();
    start.elapsed()
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}
