//! Quadtick Demo
//!
//! Headless run of the kernel with three content objects: a bouncing box
//! spawned at a random edge, a static box watching for the player, and a
//! round player walking a scripted pattern.

use std::time::Duration;
use anyhow::Context;
use tracing::{info, trace};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use quadtick::{
    BorderMethod, CollisionShape, Entity, Kernel, KernelConfig, Phase, Placement, RenderSink,
    World, VERSION,
};

/// How long the demo runs unless interrupted.
const RUN_FOR: Duration = Duration::from_secs(5);

/// Player speed in velocity units.
const PLAYER_SPEED: f32 = 4.0;

/// Logic ticks spent on each leg of the scripted walk.
const LEG_TICKS: u32 = 45;

/// Stand-in for a canvas object.
#[derive(Debug, Clone, Copy)]
enum Shape {
    Rect([u8; 4]),
    Circle([u8; 4]),
}

/// Logs placements instead of drawing them.
struct TraceSink;

impl RenderSink for TraceSink {
    fn present(&mut self, entity: &mut Entity, placement: Placement) {
        if let Some(shape) = entity.drawable::<Shape>() {
            trace!(
                "{} {:?} at ({:.1}, {:.1}) size {:.1}x{:.1}",
                entity.name(), shape, placement.x, placement.y, placement.width, placement.height
            );
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Quadtick demo v{}", VERSION);

    let config = KernelConfig::from_env();

    let kernel = Kernel::new(config)
        .with_sink(TraceSink)
        .register(spawn_runner)
        .register(spawn_sentry)
        .register(spawn_player)
        .start()
        .await?;

    tokio::select! {
        _ = tokio::time::sleep(RUN_FOR) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    let stats = kernel.stats();
    for phase in Phase::ALL {
        info!("{} phase: {} ticks, last {} fps", phase, stats.ticks(phase), stats.fps(phase));
    }

    kernel.shutdown().await?;
    Ok(())
}

/// Bouncing box entering from a random edge.
fn spawn_runner(world: &mut World) {
    let size = 4.0;

    let r = world.rng.get(0, 12);
    let mut edge = if r % 2 == 0 { 2 } else { 0 };
    if r % 3 == 0 || r % 4 == 0 {
        edge += 1;
    }

    let (width, height) = (world.size.width, world.size.height);
    let (mut x, mut y) = match edge {
        0 => (0.0, -height - size),
        1 => (width + size, 0.0),
        2 => (0.0, height + size),
        _ => (-width - size, 0.0),
    };

    if x == 0.0 {
        x = world.rng.get((-width + size) as i64, (width - size) as i64) as f32;
    } else if y == 0.0 {
        y = world.rng.get((-height + size) as i64, (height - size) as i64) as f32;
    }

    let handle = world.create("object", "runner", x, y, size, size, |_| {
        Box::new(Shape::Rect([255, 0, 0, 255]))
    });
    if let Some(runner) = world.objects.get_mut(&handle) {
        runner.preferred_fps = 30;
        runner.velocity.x = 3.0;
        runner.velocity.y = 3.0;
        runner.border_method = BorderMethod::Bounce;
        runner.collision_shape = CollisionShape::Box;
    }
}

/// Static box reporting whether the player touches it.
fn spawn_sentry(world: &mut World) {
    let handle = world.create("object", "sentry", -10.0, -10.0, 4.0, 4.0, |_| {
        Box::new(Shape::Rect([35, 190, 15, 255]))
    });
    let Some(sentry) = world.objects.get_mut(&handle) else {
        return;
    };
    sentry.preferred_fps = 30;
    sentry.border_method = BorderMethod::Bounce;
    sentry.collision_shape = CollisionShape::Box;

    let mut touching = false;
    sentry.on(Phase::Basic, move |ctx| {
        let now = !ctx.colliding_name("player", "player").is_empty();
        if now != touching {
            info!("sentry colliding with player: {}", now);
            touching = now;
        }
    });
}

/// Round player walking a square, standing still between laps.
fn spawn_player(world: &mut World) {
    let handle = world.create("player", "player", 0.0, 0.0, 5.0, 5.0, |_| {
        Box::new(Shape::Circle([255, 255, 255, 255]))
    });
    let Some(player) = world.objects.get_mut(&handle) else {
        return;
    };
    player.preferred_fps = 60;
    player.border_method = BorderMethod::PushLimit;
    player.collision_shape = CollisionShape::Radius;

    // (move_x, move_y) per leg, like held keys
    let legs: [(i8, i8); 5] = [(-1, 0), (0, -1), (1, 0), (0, 1), (0, 0)];
    let mut ticks = 0u32;

    player.on(Phase::Logic, move |ctx| {
        let (move_x, move_y) = legs[(ticks / LEG_TICKS) as usize % legs.len()];
        ticks = ticks.wrapping_add(1);

        if let Some(me) = ctx.entity_mut() {
            me.velocity.x = f32::from(move_x) * PLAYER_SPEED;
            me.velocity.y = f32::from(move_y) * PLAYER_SPEED;
        }
    });
}
