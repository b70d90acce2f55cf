//! Simulation thread behavior: request handling, sync passes and faults.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::Vec2;
use parking_lot::{Mutex, RwLock};

use tandem_core::{EntityId, EntityStore, Position};
use tandem_physics::{
    circle_body, post_step_sync, pre_step_sync, BodyCreationRequest, BodyDef, BodyHandle,
    BodyType, CollisionFilter, PhysicsConfig, PhysicsError, PhysicsSyncManager, PhysicsWorld,
};

struct Rig {
    store: Arc<RwLock<EntityStore>>,
    world: Arc<Mutex<PhysicsWorld>>,
    physics: PhysicsSyncManager,
}

fn rig(config: PhysicsConfig) -> Rig {
    let store = Arc::new(RwLock::new(EntityStore::new(256)));
    let world = Arc::new(Mutex::new(PhysicsWorld::default()));
    let physics = PhysicsSyncManager::new(Arc::clone(&store), Arc::clone(&world), config).unwrap();
    Rig {
        store,
        world,
        physics,
    }
}

fn ball_request(entity: EntityId, calls: &Arc<AtomicUsize>) -> BodyCreationRequest {
    let calls = Arc::clone(calls);
    BodyCreationRequest::new(entity, move |world: &mut PhysicsWorld| {
        calls.fetch_add(1, Ordering::SeqCst);
        circle_body(world, BodyDef::default(), 10.0, 1.0, CollisionFilter::default(), 50.0)
    })
}

#[test]
fn duplicate_requests_build_one_body() {
    let rig = rig(PhysicsConfig::default());
    let entity = rig.store.write().spawn_with(Position::zero());
    let calls = Arc::new(AtomicUsize::new(0));
    let callbacks = Arc::new(AtomicUsize::new(0));

    let queue = rig.physics.queue();
    for _ in 0..2 {
        let callbacks = Arc::clone(&callbacks);
        queue.enqueue_body_creation(
            ball_request(entity, &calls).on_created(move |_| {
                callbacks.fetch_add(1, Ordering::SeqCst);
            }),
        );
    }

    let report = rig.physics.tick().unwrap();
    assert_eq!(report.bodies_created, 1);
    assert_eq!(report.requests_dropped, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(callbacks.load(Ordering::SeqCst), 1);
    assert_eq!(rig.world.lock().body_count(), 1);

    let body = *rig.store.read().get::<BodyHandle>(entity).unwrap();
    assert_eq!(rig.world.lock().user_data(body), Some(entity.to_bits()));
    assert_eq!(EntityId::from_bits(entity.to_bits()), entity);
}

#[test]
fn already_bodied_entity_is_not_rebuilt() {
    let rig = rig(PhysicsConfig::default());
    let entity = rig.store.write().spawn_with(Position::zero());
    let calls = Arc::new(AtomicUsize::new(0));

    rig.physics.queue().enqueue_body_creation(ball_request(entity, &calls));
    rig.physics.tick().unwrap();
    rig.physics.queue().enqueue_body_creation(ball_request(entity, &calls));
    let report = rig.physics.tick().unwrap();

    assert_eq!(report.requests_dropped, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(rig.world.lock().body_count(), 1);
}

#[test]
fn dead_entity_request_skips_factory() {
    let rig = rig(PhysicsConfig::default());
    let entity = rig.store.write().spawn_with(Position::zero());
    let calls = Arc::new(AtomicUsize::new(0));

    rig.physics.queue().enqueue_body_creation(ball_request(entity, &calls));
    rig.store.write().despawn(entity);
    rig.physics.tick().unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(rig.world.lock().body_count(), 0);
}

#[test]
fn hundred_entities_and_a_duplicate() {
    let rig = rig(PhysicsConfig::default());
    let calls = Arc::new(AtomicUsize::new(0));
    let queue = rig.physics.queue();

    let entities: Vec<EntityId> = (0..100)
        .map(|i| {
            rig.store
                .write()
                .spawn_with(Position::new(Vec2::new(i as f32 * 20.0, 0.0), Vec2::ZERO))
        })
        .collect();
    for &entity in &entities {
        queue.enqueue_body_creation(ball_request(entity, &calls));
    }
    queue.enqueue_body_creation(ball_request(entities[0], &calls));

    let report = rig.physics.tick().unwrap();
    assert_eq!(report.bodies_created, 100);
    assert_eq!(report.requests_dropped, 1);
    assert_eq!(calls.load(Ordering::SeqCst), 100);
    assert_eq!(rig.store.read().count::<(Position, BodyHandle)>(), 100);
}

#[test]
fn deletion_destroys_body_once() {
    let rig = rig(PhysicsConfig::default());
    let entity = rig.store.write().spawn_with(Position::zero());
    let calls = Arc::new(AtomicUsize::new(0));
    rig.physics.queue().enqueue_body_creation(ball_request(entity, &calls));
    rig.physics.tick().unwrap();

    let body = *rig.store.read().get::<BodyHandle>(entity).unwrap();
    let queue = rig.physics.queue();
    {
        let mut store = rig.store.write();
        assert!(queue.enqueue_body_deletion(&mut store, entity, body));
        // Detached before the simulation side has seen the request
        assert!(!store.has::<BodyHandle>(entity));
        // A second deletion of the same body is harmless
        queue.enqueue_body_deletion(&mut store, entity, body);
    }

    let report = rig.physics.tick().unwrap();
    assert_eq!(report.bodies_destroyed, 1);
    let world = rig.world.lock();
    assert_eq!(world.stats().bodies_destroyed, 1);
    assert!(!world.contains(body));
}

#[test]
fn velocity_sync_divides_by_ratio() {
    let mut store = EntityStore::new(8);
    let mut world = PhysicsWorld::default();
    let body = world.create_body(&BodyDef::default()).unwrap();
    let entity = store.spawn_with(Position::new(Vec2::ZERO, Vec2::new(100.0, -50.0)));
    store.insert(entity, body);

    assert_eq!(pre_step_sync(&store, &mut world, 50.0), 1);
    assert_eq!(world.linear_velocity(body), Some(Vec2::new(2.0, -1.0)));

    // Idempotent
    pre_step_sync(&store, &mut world, 50.0);
    assert_eq!(world.linear_velocity(body), Some(Vec2::new(2.0, -1.0)));
}

#[test]
fn nan_velocity_components_become_zero() {
    let mut store = EntityStore::new(8);
    let mut world = PhysicsWorld::default();
    let body = world.create_body(&BodyDef::default()).unwrap();
    let entity = store.spawn_with(Position::new(Vec2::ZERO, Vec2::new(f32::NAN, 3.0)));
    store.insert(entity, body);

    pre_step_sync(&store, &mut world, 1.0);
    assert_eq!(world.linear_velocity(body), Some(Vec2::new(0.0, 3.0)));
}

#[test]
fn position_sync_multiplies_by_ratio() {
    let mut store = EntityStore::new(8);
    let mut world = PhysicsWorld::default();
    let body = world
        .create_body(&BodyDef::new(BodyType::Dynamic, Vec2::new(1.0, 2.0)))
        .unwrap();
    let entity = store.spawn_with(Position::zero());
    store.insert(entity, body);
    let bodyless = store.spawn_with(Position::new(Vec2::splat(7.0), Vec2::ZERO));

    assert_eq!(post_step_sync(&mut store, &world, 50.0), 1);
    let position = store.get::<Position>(entity).unwrap();
    assert_eq!(position.global, Vec2::new(50.0, 100.0));
    assert!(position.is_dirty());
    assert_eq!(store.get::<Position>(bodyless).unwrap().global, Vec2::splat(7.0));
}

#[test]
fn tick_moves_bodied_entity() {
    let rig = rig(PhysicsConfig::default());
    let entity = rig
        .store
        .write()
        .spawn_with(Position::new(Vec2::ZERO, Vec2::new(50.0, 0.0)));
    let calls = Arc::new(AtomicUsize::new(0));
    rig.physics.queue().enqueue_body_creation(ball_request(entity, &calls));

    let report = rig.physics.tick().unwrap();
    assert_eq!(report.velocities_synced, 1);
    assert_eq!(report.positions_synced, 1);

    let global = rig.store.read().get::<Position>(entity).unwrap().global;
    assert!((global.x - 50.0 / 60.0).abs() < 1e-3);
    assert!(global.y.abs() < 1e-6);
    assert_eq!(rig.physics.stats().total_ticks, 1);
}

#[test]
fn factory_error_halts_simulation() {
    let rig = rig(PhysicsConfig::default());
    let entity = rig.store.write().spawn();
    rig.physics
        .queue()
        .enqueue_body_creation(BodyCreationRequest::new(entity, move |_world: &mut PhysicsWorld| {
            Err(PhysicsError::FactoryFailed {
                entity,
                reason: "no sprite".into(),
            })
        }));

    let err = rig.physics.tick().unwrap_err();
    assert!(matches!(err, PhysicsError::FactoryFailed { .. }));
    assert_eq!(rig.physics.fault(), Some(err.clone()));
    // Every later iteration reports the same fault
    assert_eq!(rig.physics.tick(), Err(err));
    assert!(!rig.physics.is_running());
}

#[test]
fn factory_panic_is_recorded() {
    let rig = rig(PhysicsConfig::default());
    let entity = rig.store.write().spawn();
    rig.physics
        .queue()
        .enqueue_body_creation(BodyCreationRequest::new(entity, |_world: &mut PhysicsWorld| {
            panic!("factory exploded")
        }));

    let err = rig.physics.tick().unwrap_err();
    assert_eq!(err, PhysicsError::Panicked("factory exploded".into()));
    // Locks were released during unwinding
    assert!(rig.store.try_write().is_some());
    assert!(rig.world.try_lock().is_some());
}

#[test]
fn thread_serves_requests_until_shutdown() {
    let config = PhysicsConfig {
        sleep_interval_ms: 1,
        ..PhysicsConfig::default()
    };
    let mut rig = rig(config);
    let entity = rig.store.write().spawn_with(Position::zero());
    let calls = Arc::new(AtomicUsize::new(0));

    rig.physics.start().unwrap();
    assert!(rig.physics.is_running());
    assert_eq!(rig.physics.start(), Err(PhysicsError::AlreadyRunning));

    rig.physics.queue().enqueue_body_creation(ball_request(entity, &calls));
    let deadline = Instant::now() + Duration::from_secs(5);
    while !rig.store.read().has::<BodyHandle>(entity) {
        assert!(Instant::now() < deadline, "body was never attached");
        std::thread::sleep(Duration::from_millis(1));
    }

    rig.physics.shutdown().unwrap();
    assert!(!rig.physics.is_running());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn shutdown_applies_pending_deletions() {
    let mut rig = rig(PhysicsConfig::default());
    let entity = rig.store.write().spawn_with(Position::zero());
    let calls = Arc::new(AtomicUsize::new(0));
    rig.physics.queue().enqueue_body_creation(ball_request(entity, &calls));
    rig.physics.tick().unwrap();

    let body = *rig.store.read().get::<BodyHandle>(entity).unwrap();
    rig.physics
        .queue()
        .enqueue_body_deletion(&mut rig.store.write(), entity, body);
    let other = rig.store.write().spawn();
    rig.physics.queue().enqueue_body_creation(ball_request(other, &calls));

    rig.physics.shutdown().unwrap();
    assert_eq!(rig.world.lock().body_count(), 0);
    assert_eq!(rig.physics.queue().pending_creations(), 0);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
