//! # TANDEM Sandbox
//!
//! Headless scene runner: a wall, a volley of projectiles, and the standard
//! systems, driven for a fixed number of frames.
//!
//! ```bash
//! # 600 frames with default settings
//! sandbox 600
//!
//! # custom scene config, verbose physics logs
//! RUST_LOG=tandem_physics=debug sandbox 600 scene.toml
//! ```

use std::env;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use glam::Vec2;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use tandem::{
    DebugDrawSystem, DestroyAfterTimeSystem, GameClock, MovementSystem, Named, Scene, SceneConfig,
    SceneResult, TransformSystem,
};

const DEFAULT_FRAMES: u64 = 300;
const FRAME_PACING: Duration = Duration::from_millis(16);
const VOLLEY: usize = 50;
const PROJECTILE_SPEED: f32 = 600.0;
const PROJECTILE_DIAMETER: f32 = 8.0;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = env::args().skip(1);
    let frames = match args.next().map(|raw| raw.parse::<u64>()) {
        None => DEFAULT_FRAMES,
        Some(Ok(frames)) => frames,
        Some(Err(err)) => {
            error!(%err, "Frame count must be a non-negative integer");
            return ExitCode::FAILURE;
        }
    };

    let config = match args.next() {
        Some(path) => match SceneConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(%err, %path, "Could not load scene config");
                return ExitCode::FAILURE;
            }
        },
        None => SceneConfig::named("sandbox"),
    };

    match run(config, frames) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "Sandbox stopped");
            ExitCode::FAILURE
        }
    }
}

fn run(config: SceneConfig, frames: u64) -> SceneResult<()> {
    let mut scene = Scene::new(config)?;
    scene
        .logic_mut()
        .add(MovementSystem::new())
        .add(DestroyAfterTimeSystem::default());
    scene
        .render_mut()
        .add(TransformSystem::default())
        .add(DebugDrawSystem::new());

    scene.spawn_wall(Vec2::new(600.0, 0.0), Vec2::new(40.0, 480.0));
    let muzzle = Vec2::new(100.0, 240.0);
    for i in 0..VOLLEY {
        let spread = (i as f32 / VOLLEY as f32 - 0.5) * 0.4;
        let direction = Vec2::from_angle(spread);
        scene.spawn_projectile(muzzle, direction * PROJECTILE_SPEED, PROJECTILE_DIAMETER);
    }
    scene.spawn_named("Origin", Vec2::ZERO);

    scene.initialize()?;

    let mut clock = GameClock::new();
    let mut destroyed = 0;
    for _ in 0..frames {
        let stats = scene.game_loop(clock.tick())?;
        destroyed += stats.entities_destroyed;
        thread::sleep(FRAME_PACING);
    }

    let alive = scene.store().read().alive_count();
    let physics = scene.physics().stats();
    let overlay = scene
        .render()
        .get::<DebugDrawSystem>()
        .map(|debug_draw| *debug_draw.overlay())
        .unwrap_or_default();
    info!(
        frames = scene.frame(),
        alive,
        destroyed,
        primitives = overlay.primitives,
        physics_ticks = physics.total_ticks,
        physics_avg_us = physics.avg_tick_us,
        "Sandbox finished"
    );

    let store = scene.store().read();
    let survivors: Vec<String> = store
        .query::<(Named,)>()
        .filter_map(|entity| store.get::<Named>(entity).map(ToString::to_string))
        .collect();
    drop(store);
    info!(?survivors, "Named entities left");

    scene.shutdown()
}
