//! Headless driver: streams a noise-terrain world around a simulated walking observer.

use std::error::Error;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use loam_geom::{IVec3, Vec3};
use loam_runtime::{HeadlessRenderer, World, WorldError, WorldEvent, block_pos_from_hit};
use loam_world::{BlockType, WorldConfig};

#[derive(Parser, Debug)]
#[command(name = "loam", about = "Stream a voxel world around a moving observer")]
struct Args {
    /// World config (TOML). Defaults apply for missing fields.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tick budget per cycle before giving up on it.
    #[arg(long, default_value_t = 200_000)]
    ticks: u64,
    /// Observer step per move as `dx,dz` in blocks.
    #[arg(long, value_parser = parse_walk, default_value = "16,0")]
    walk: (i32, i32),
    #[arg(long, default_value_t = 4)]
    moves: u32,
    /// Override the configured drawing range.
    #[arg(long)]
    range: Option<i32>,
    /// Default log filter; RUST_LOG takes precedence.
    #[arg(long, default_value = "info")]
    log: String,
}

fn parse_walk(s: &str) -> Result<(i32, i32), String> {
    let (dx, dz) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `dx,dz`, got `{s}`"))?;
    let dx = dx.trim().parse::<i32>().map_err(|e| e.to_string())?;
    let dz = dz.trim().parse::<i32>().map_err(|e| e.to_string())?;
    Ok((dx, dz))
}

/// Ticks like a host frame loop until the world settles or the budget runs out.
fn drive(world: &mut World<HeadlessRenderer>, budget: u64) -> u64 {
    let mut ticks = 0;
    while world.is_busy() && ticks < budget {
        world.tick();
        ticks += 1;
        if world.stats().pending_sync == 0 {
            thread::sleep(Duration::from_millis(1));
        }
    }
    if world.is_busy() {
        log::warn!("cycle still running after {ticks} ticks");
    }
    ticks
}

/// Drops a stone on top of the highest solid block of the column under `at`.
fn place_marker(world: &mut World<HeadlessRenderer>, at: Vec3) -> Result<(), Box<dyn Error>> {
    let height = world.config().chunk_height;
    let (x, z) = (at.x.round() as i32, at.z.round() as i32);
    let Some(top) = (0..height)
        .rev()
        .find(|y| world.get_block(IVec3::new(x, *y, z)).is_solid())
    else {
        log::info!(target: "edit", "no ground under ({x}, {z}), skipping marker");
        return Ok(());
    };
    let hit = Vec3::new(x as f32, top as f32 + 0.5, z as f32);
    let ground = block_pos_from_hit(hit, Vec3::new(0.0, 1.0, 0.0));
    let target = ground + IVec3::Y;
    match world.set_block(target, BlockType::Stone) {
        Ok(written) => log::info!(target: "edit", "marker at {target:?} (written: {written})"),
        Err(WorldError::NoRenderer { pos }) => {
            log::warn!(target: "edit", "marker at {target:?} skipped, chunk {pos:?} not rendered")
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log))
        .format_timestamp_millis()
        .init();

    let mut config = match &args.config {
        Some(path) => WorldConfig::load_from_path(path)?,
        None => WorldConfig::default(),
    };
    if let Some(range) = args.range {
        config.drawing_range = range;
        config.validate()?;
    }

    let mut world = World::with_noise_terrain(config, HeadlessRenderer::new())?;
    let events = world.events();

    let started = Instant::now();
    world.generate_world()?;
    let ticks = drive(&mut world, args.ticks);
    log::info!("initial world: {ticks} ticks, {:?}", started.elapsed());

    let mut observer = Vec3::ZERO;
    place_marker(&mut world, observer)?;
    drive(&mut world, args.ticks);

    for step in 1..=args.moves {
        observer = observer + Vec3::new(args.walk.0 as f32, 0.0, args.walk.1 as f32);
        let t0 = Instant::now();
        world.load_additional_chunks(observer)?;
        let ticks = drive(&mut world, args.ticks);
        log::info!(
            "move {step} to ({:.0}, {:.0}): {ticks} ticks, {:?}",
            observer.x,
            observer.z,
            t0.elapsed()
        );
    }

    for event in events.try_iter() {
        match event {
            WorldEvent::WorldCreated => log::info!("event: world created"),
            WorldEvent::NewChunksGenerated => log::debug!("event: new chunks generated"),
            WorldEvent::CycleCancelled => log::warn!("event: cycle cancelled"),
        }
    }

    let stats = world.stats();
    log::info!(
        "done: {} data / {} renders resident, {} quads, {} cycles ({} cancelled)",
        stats.resident_data,
        stats.resident_renders,
        world.renderer().total_quads(),
        stats.cycles_completed,
        stats.cycles_cancelled
    );
    world.shutdown();
    Ok(())
}
