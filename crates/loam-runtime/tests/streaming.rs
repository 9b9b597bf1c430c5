mod common;

use std::sync::Arc;

use common::{FlatGenerator, GROUND, config, flat_world, wait_until};
use loam_geom::{IVec3, Vec3};
use loam_mesh::FaceMesher;
use loam_runtime::{HeadlessRenderer, RenderCall, World, WorldEvent};
use loam_world::{BlockType, ChunkPos};

#[test]
fn range_one_at_origin_renders_three_by_three_plus_layers() {
    let mut world = flat_world(1);
    world.generate_world().unwrap();
    world.run_until_idle().unwrap();

    let renders = &world.world_data().renders;
    assert_eq!(renders.len(), 27);
    assert_eq!(renders.keys().filter(|p| p.0.y == 0).count(), 9);
    assert_eq!(world.stats().resident_data, 25 + 9 * 2);
    assert_eq!(world.renderer().live_count(), 27);
    assert!(world.is_world_created());
    assert!(!world.is_busy());
}

#[test]
fn sync_commits_at_most_one_chunk_per_tick() {
    let mut world = flat_world(1);
    world.generate_world().unwrap();
    let mut prev = 0;
    let mut ticks_with_commit = 0;
    wait_until(|| {
        world.tick();
        let now = world.stats().resident_renders;
        assert!(now - prev <= 1, "{} renders committed in one tick", now - prev);
        if now > prev {
            ticks_with_commit += 1;
        }
        prev = now;
        !world.is_busy()
    });
    assert_eq!(ticks_with_commit, 27);
}

#[test]
fn nearest_chunks_are_committed_first() {
    let mut world = flat_world(1);
    world.generate_world().unwrap();
    world.run_until_idle().unwrap();
    let calls = world.renderer().calls();
    assert_eq!(calls[0], RenderCall::Render(ChunkPos::new(0, 0, 0)));
    let last = match calls[calls.len() - 1] {
        RenderCall::Render(p) => p,
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(last.0.y, -200);
    assert!(last.0.x != 0 && last.0.z != 0);
}

#[test]
fn world_created_fires_once_and_new_chunks_after_each_load() {
    let mut world = flat_world(1);
    let events = world.events();
    world.generate_world().unwrap();
    world.run_until_idle().unwrap();
    world.load_additional_chunks(Vec3::new(16.0, 0.0, 0.0)).unwrap();
    world.run_until_idle().unwrap();
    world.load_additional_chunks(Vec3::new(32.0, 0.0, 0.0)).unwrap();
    world.run_until_idle().unwrap();

    let seen: Vec<_> = events.try_iter().collect();
    assert_eq!(
        seen,
        vec![
            WorldEvent::WorldCreated,
            WorldEvent::NewChunksGenerated,
            WorldEvent::NewChunksGenerated,
        ]
    );
    assert_eq!(world.stats().cycles_completed, 3);
}

#[test]
fn moving_observer_evicts_behind_and_creates_ahead() {
    let mut world = flat_world(1);
    world.generate_world().unwrap();
    world.run_until_idle().unwrap();
    world.renderer_mut().take_calls();

    world.load_additional_chunks(Vec3::new(16.0, 0.0, 0.0)).unwrap();
    world.run_until_idle().unwrap();

    let data = world.world_data();
    assert!(!data.renders.contains_key(&ChunkPos::new(-16, 0, 0)));
    assert!(data.renders.contains_key(&ChunkPos::new(32, 0, 0)));
    assert!(!data.chunks.contains(ChunkPos::new(-32, 0, 0)));
    assert!(data.chunks.contains(ChunkPos::new(48, 0, 0)));
    assert_eq!(data.renders.len(), 27);

    let calls = world.renderer().calls();
    let removes = calls
        .iter()
        .filter(|c| matches!(c, RenderCall::Remove(_)))
        .count();
    let renders = calls
        .iter()
        .filter(|c| matches!(c, RenderCall::Render(_)))
        .count();
    // the x=-16 ground column leaves and x=32 enters; the layered columns shift by one too
    assert_eq!(removes, renders);
    // evictions happen before any new render is committed
    let first_render = calls
        .iter()
        .position(|c| matches!(c, RenderCall::Render(_)))
        .unwrap();
    assert!(calls[..first_render]
        .iter()
        .all(|c| matches!(c, RenderCall::Remove(_))));
}

#[test]
fn modified_chunks_keep_their_data_out_of_range() {
    let mut world = flat_world(1);
    world.generate_world().unwrap();
    world.run_until_idle().unwrap();
    let edit = IVec3::new(5, GROUND + 3, 5);
    world.set_block(edit, BlockType::Sand).unwrap();

    world.load_additional_chunks(Vec3::new(320.0, 0.0, 0.0)).unwrap();
    world.run_until_idle().unwrap();

    let origin = ChunkPos::new(0, 0, 0);
    let data = world.world_data();
    assert!(data.chunks.contains(origin));
    assert!(data.chunks.is_modified(origin));
    assert!(!data.renders.contains_key(&origin));
    assert!(!data.chunks.contains(ChunkPos::new(16, 0, 0)));
    assert_eq!(world.get_block(edit), BlockType::Sand);
}

#[test]
fn tree_leaves_spill_into_neighbouring_chunks() {
    let generator = FlatGenerator::with_origin_leaves(vec![
        IVec3::new(-1, 20, 0),
        IVec3::new(16, 20, 3),
        IVec3::new(4, 20, 4),
    ]);
    let mut world = World::new(
        config(1),
        Arc::new(generator),
        Arc::new(FaceMesher),
        HeadlessRenderer::new(),
    )
    .unwrap();
    world.generate_world().unwrap();
    world.run_until_idle().unwrap();

    assert_eq!(world.get_block(IVec3::new(-1, 20, 0)), BlockType::TreeLeavesSolid);
    assert_eq!(world.get_block(IVec3::new(16, 20, 3)), BlockType::TreeLeavesSolid);
    assert_eq!(world.get_block(IVec3::new(4, 20, 4)), BlockType::TreeLeavesSolid);
    assert_eq!(world.get_block(IVec3::new(4, 21, 4)), BlockType::Air);
}

#[test]
fn edited_leaves_survive_later_cycles() {
    let generator = FlatGenerator::with_origin_leaves(vec![IVec3::new(4, 20, 4)]);
    let mut world = World::new(
        config(1),
        Arc::new(generator),
        Arc::new(FaceMesher),
        HeadlessRenderer::new(),
    )
    .unwrap();
    world.generate_world().unwrap();
    world.run_until_idle().unwrap();
    let leaf = IVec3::new(4, 20, 4);
    assert_eq!(world.get_block(leaf), BlockType::TreeLeavesSolid);

    world.set_block(leaf, BlockType::Air).unwrap();
    world.load_additional_chunks(Vec3::new(16.0, 0.0, 0.0)).unwrap();
    world.run_until_idle().unwrap();

    assert_eq!(world.get_block(leaf), BlockType::Air);
}

#[test]
fn clear_releases_everything_and_allows_regeneration() {
    let mut world = flat_world(1);
    let events = world.events();
    world.generate_world().unwrap();
    world.run_until_idle().unwrap();
    world.clear();
    assert_eq!(world.stats().resident_data, 0);
    assert_eq!(world.stats().resident_renders, 0);
    assert_eq!(world.renderer().live_count(), 0);

    world.generate_world().unwrap();
    world.run_until_idle().unwrap();
    assert_eq!(world.stats().resident_renders, 27);
    let seen: Vec<_> = events.try_iter().collect();
    assert_eq!(seen, vec![WorldEvent::WorldCreated, WorldEvent::WorldCreated]);
}

#[test]
fn noise_terrain_world_streams_end_to_end() {
    let mut cfg = config(1);
    cfg.chunk_height = 64;
    let mut world = World::with_noise_terrain(cfg, HeadlessRenderer::new()).unwrap();
    world.generate_world().unwrap();
    world.run_until_idle().unwrap();
    assert_eq!(world.stats().resident_renders, 27);
    assert!(world.renderer().total_quads() > 0);
}
