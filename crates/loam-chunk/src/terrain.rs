use std::sync::RwLock;

use loam_geom::IVec3;
use loam_world::{BlockPos, BlockType, TerrainParams, TerrainSampler};

use crate::ChunkData;
use crate::tree::leaf_offsets;

/// Fills freshly allocated chunks with terrain.
///
/// Implementations are shared by every worker thread; `generate_chunk_data` is called once per
/// new chunk and may run concurrently for distinct chunks.
pub trait TerrainGenerator: Send + Sync {
    /// Refreshes any per-cycle cache read by `generate_chunk_data`. Called once per cycle on
    /// the primary thread before data generation starts.
    fn generate_biome_points(
        &self,
        observer: BlockPos,
        drawing_range: i32,
        chunk_size: i32,
        seed_offset: [i32; 2],
    );

    fn generate_chunk_data(&self, chunk: ChunkData, seed_offset: [i32; 2]) -> ChunkData;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomePoint {
    pub center: IVec3,
    /// Multiplier applied to the redistributed height noise.
    pub relief: f32,
}

const TRUNK_HEIGHT: i32 = 5;
const RELIEF_LEVELS: [f32; 3] = [0.75, 1.0, 1.3];

/// Height-map terrain with water, beaches, and trees whose leaves may spill into neighbours.
pub struct NoiseTerrainGenerator {
    sampler: TerrainSampler,
    biome_points: RwLock<Vec<BiomePoint>>,
}

impl NoiseTerrainGenerator {
    pub fn new(params: TerrainParams) -> Self {
        Self {
            sampler: TerrainSampler::new(params),
            biome_points: RwLock::new(Vec::new()),
        }
    }

    #[inline]
    pub fn params(&self) -> &TerrainParams {
        &self.sampler.params
    }

    pub fn biome_points(&self) -> Vec<BiomePoint> {
        self.biome_points
            .read()
            .map(|pts| pts.clone())
            .unwrap_or_default()
    }

    fn relief_at(&self, points: &[BiomePoint], wx: i32, wz: i32) -> f32 {
        let mut best: Option<(i64, f32)> = None;
        for p in points {
            let dx = i64::from(p.center.x - wx);
            let dz = i64::from(p.center.z - wz);
            let d = dx * dx + dz * dz;
            if best.is_none_or(|(bd, _)| d < bd) {
                best = Some((d, p.relief));
            }
        }
        best.map(|(_, r)| r).unwrap_or(1.0)
    }

    fn is_tree_column(&self, wx: i32, wz: i32, offset: [i32; 2]) -> bool {
        let n = self.sampler.tree_noise(wx, wz, offset);
        if n < self.sampler.params.tree_threshold {
            return false;
        }
        for dz in -1..=1 {
            for dx in -1..=1 {
                if (dx, dz) == (0, 0) {
                    continue;
                }
                if self.sampler.tree_noise(wx + dx, wz + dz, offset) > n {
                    return false;
                }
            }
        }
        true
    }

    fn column_block(&self, wy: i32, ground: i32) -> BlockType {
        let water = self.sampler.params.water_level;
        let shore = ground <= water + 1;
        if wy > ground {
            if wy <= water {
                BlockType::Water
            } else {
                BlockType::Air
            }
        } else if wy == ground {
            if shore {
                BlockType::Sand
            } else {
                BlockType::GrassDirt
            }
        } else if wy >= ground - 3 {
            if shore {
                BlockType::Sand
            } else {
                BlockType::Dirt
            }
        } else {
            BlockType::Stone
        }
    }

    fn place_tree(chunk: &mut ChunkData, lx: i32, lz: i32, ground_local: i32) {
        chunk.set_local(IVec3::new(lx, ground_local, lz), BlockType::Dirt);
        for dy in 1..=TRUNK_HEIGHT {
            let p = IVec3::new(lx, ground_local + dy, lz);
            if chunk.set_local(p, BlockType::TreeTrunk) {
                chunk.tree_data.trunks.push(p);
            }
        }
        let top = IVec3::new(lx, ground_local + TRUNK_HEIGHT, lz);
        chunk
            .tree_data
            .leaves_solid
            .extend(leaf_offsets().map(|o| top + o));
    }
}

impl TerrainGenerator for NoiseTerrainGenerator {
    fn generate_biome_points(
        &self,
        observer: BlockPos,
        drawing_range: i32,
        chunk_size: i32,
        seed_offset: [i32; 2],
    ) {
        let spacing = self.sampler.params.biome_spacing.max(1);
        let reach = drawing_range
            .saturating_add(1)
            .saturating_mul(chunk_size)
            .saturating_add(spacing);
        let cell_min_x = observer.x.saturating_sub(reach).div_euclid(spacing);
        let cell_max_x = observer.x.saturating_add(reach).div_euclid(spacing);
        let cell_min_z = observer.z.saturating_sub(reach).div_euclid(spacing);
        let cell_max_z = observer.z.saturating_add(reach).div_euclid(spacing);
        let mut points = Vec::new();
        for cz in cell_min_z..=cell_max_z {
            for cx in cell_min_x..=cell_max_x {
                let (jx, jz) = self
                    .sampler
                    .cell_jitter(cx.wrapping_add(seed_offset[0]), cz.wrapping_add(seed_offset[1]));
                let center = IVec3::new(
                    cx.saturating_mul(spacing).saturating_add(jx),
                    0,
                    cz.saturating_mul(spacing).saturating_add(jz),
                );
                let pick = (cx.wrapping_mul(73_856_093) ^ cz.wrapping_mul(19_349_663))
                    .rem_euclid(RELIEF_LEVELS.len() as i32) as usize;
                points.push(BiomePoint {
                    center,
                    relief: RELIEF_LEVELS[pick],
                });
            }
        }
        log::debug!(target: "stream", "biome points refreshed: {}", points.len());
        if let Ok(mut guard) = self.biome_points.write() {
            *guard = points;
        }
    }

    fn generate_chunk_data(&self, mut chunk: ChunkData, seed_offset: [i32; 2]) -> ChunkData {
        let points = self.biome_points();
        let origin = chunk.pos.origin();
        let size = chunk.size();
        let height = chunk.height();
        for lz in 0..size {
            for lx in 0..size {
                let wx = origin.x + lx;
                let wz = origin.z + lz;
                let relief = self.relief_at(&points, wx, wz);
                let ground = self
                    .sampler
                    .surface_height(wx, wz, seed_offset, relief, height);
                for ly in 0..height {
                    let block = self.column_block(origin.y + ly, ground);
                    chunk.set_local(IVec3::new(lx, ly, lz), block);
                }
                let ground_local = ground - origin.y;
                let grows_tree = (0..height).contains(&ground_local)
                    && ground > self.sampler.params.water_level + 1
                    && self.is_tree_column(wx, wz, seed_offset);
                if grows_tree {
                    Self::place_tree(&mut chunk, lx, lz, ground_local);
                }
            }
        }
        chunk
    }
}
