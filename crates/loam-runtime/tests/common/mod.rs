#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use loam_chunk::{ChunkData, TerrainGenerator};
use loam_geom::IVec3;
use loam_mesh::{BlockSource, FaceMesher, MeshBuilder, MeshData};
use loam_runtime::{HeadlessRenderer, World};
use loam_world::{BlockPos, BlockType, ChunkPos, WorldConfig};

pub const GROUND: i32 = 10;

/// Stone below `GROUND`, air above. Counts calls.
#[derive(Default)]
pub struct FlatGenerator {
    pub calls: AtomicUsize,
    /// Chunk-local leaf positions recorded for the chunk at the origin.
    pub origin_leaves: Vec<IVec3>,
}

impl FlatGenerator {
    pub fn with_origin_leaves(leaves: Vec<IVec3>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            origin_leaves: leaves,
        }
    }
}

impl TerrainGenerator for FlatGenerator {
    fn generate_biome_points(&self, _: BlockPos, _: i32, _: i32, _: [i32; 2]) {}

    fn generate_chunk_data(&self, mut chunk: ChunkData, _: [i32; 2]) -> ChunkData {
        self.calls.fetch_add(1, Ordering::Relaxed);
        for local in chunk.positions() {
            if chunk.world_of(local).y < GROUND {
                chunk.set_local(local, BlockType::Stone);
            }
        }
        if chunk.pos == ChunkPos::new(0, 0, 0) {
            chunk.tree_data.leaves_solid = self.origin_leaves.clone();
        }
        chunk
    }
}

/// Blocks every caller until opened.
#[derive(Default)]
pub struct Gate {
    open: Mutex<bool>,
    cv: Condvar,
    pub entered: AtomicUsize,
}

impl Gate {
    pub fn closed() -> Self {
        Self::default()
    }

    pub fn pass(&self) {
        self.entered.fetch_add(1, Ordering::SeqCst);
        let mut open = self.open.lock().unwrap();
        while !*open {
            open = self.cv.wait(open).unwrap();
        }
    }

    pub fn open(&self) {
        *self.open.lock().unwrap() = true;
        self.cv.notify_all();
    }

    pub fn close(&self) {
        *self.open.lock().unwrap() = false;
        self.entered.store(0, Ordering::SeqCst);
    }

    pub fn wait_entered(&self, n: usize) {
        wait_until(|| self.entered.load(Ordering::SeqCst) >= n);
    }
}

pub struct GatedGenerator {
    pub gate: Arc<Gate>,
    pub inner: FlatGenerator,
}

impl TerrainGenerator for GatedGenerator {
    fn generate_biome_points(&self, o: BlockPos, r: i32, s: i32, seed: [i32; 2]) {
        self.inner.generate_biome_points(o, r, s, seed);
    }

    fn generate_chunk_data(&self, chunk: ChunkData, seed: [i32; 2]) -> ChunkData {
        self.gate.pass();
        self.inner.generate_chunk_data(chunk, seed)
    }
}

pub struct GatedMesher {
    pub gate: Arc<Gate>,
}

impl MeshBuilder for GatedMesher {
    fn get_mesh_data(&self, chunk: &ChunkData, blocks: &dyn BlockSource) -> MeshData {
        self.gate.pass();
        FaceMesher.get_mesh_data(chunk, blocks)
    }
}

pub fn config(range: i32) -> WorldConfig {
    WorldConfig {
        chunk_size: 16,
        chunk_height: 100,
        drawing_range: range,
        workers: 2,
        ..WorldConfig::default()
    }
}

pub fn flat_world(range: i32) -> World<HeadlessRenderer> {
    World::new(
        config(range),
        Arc::new(FlatGenerator::default()),
        Arc::new(FaceMesher),
        HeadlessRenderer::recording(),
    )
    .unwrap()
}

pub fn wait_until(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(30);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting");
        thread::sleep(Duration::from_millis(1));
    }
}

pub fn data_snapshot(world: &World<HeadlessRenderer>) -> BTreeMap<ChunkPos, ChunkData> {
    world
        .world_data()
        .chunks
        .iter()
        .map(|(p, c)| (p, c.clone()))
        .collect()
}
