use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::config::TerrainParams;

/// Deterministic 2D noise sampling for surface height, biomes, and tree placement.
///
/// Shared read-only across worker threads; every method takes `&self`.
pub struct TerrainSampler {
    height: FastNoiseLite,
    trees: FastNoiseLite,
    jitter: FastNoiseLite,
    pub params: TerrainParams,
}

impl TerrainSampler {
    pub fn new(params: TerrainParams) -> Self {
        let mut height = FastNoiseLite::with_seed(params.seed);
        height.set_noise_type(Some(NoiseType::OpenSimplex2));
        height.set_frequency(Some(1.0));
        let mut trees = FastNoiseLite::with_seed(params.seed ^ 0x2F6B_1C03);
        trees.set_noise_type(Some(NoiseType::OpenSimplex2));
        trees.set_frequency(Some(0.9));
        let mut jitter = FastNoiseLite::with_seed(params.seed ^ 0x5A17_0E91);
        jitter.set_noise_type(Some(NoiseType::OpenSimplex2));
        jitter.set_frequency(Some(0.37));
        Self {
            height,
            trees,
            jitter,
            params,
        }
    }

    /// Fractal noise in `[0, 1]` at a world column, with octaves summed by hand so the
    /// persistence setting is honoured exactly.
    pub fn octave_noise(&self, wx: i32, wz: i32, offset: [i32; 2]) -> f32 {
        let p = &self.params;
        let x = (wx + offset[0]) as f32 * p.noise_zoom;
        let z = (wz + offset[1]) as f32 * p.noise_zoom;
        let mut total = 0.0f32;
        let mut frequency = 1.0f32;
        let mut amplitude = 1.0f32;
        let mut amplitude_sum = 0.0f32;
        for _ in 0..p.octaves.max(1) {
            let n = self.height.get_noise_2d(x * frequency, z * frequency) * 0.5 + 0.5;
            total += n * amplitude;
            amplitude_sum += amplitude;
            amplitude *= p.persistence;
            frequency *= 2.0;
        }
        (total / amplitude_sum).clamp(0.0, 1.0)
    }

    #[inline]
    fn redistribute(&self, n: f32) -> f32 {
        (n * self.params.redistribution_modifier)
            .max(0.0)
            .powf(self.params.exponent)
    }

    /// Surface block height for a column, in `[0, world_height)`.
    ///
    /// `biome_bias` scales the redistributed noise so neighbouring biomes differ in relief.
    pub fn surface_height(
        &self,
        wx: i32,
        wz: i32,
        offset: [i32; 2],
        biome_bias: f32,
        world_height: i32,
    ) -> i32 {
        let n = self.redistribute(self.octave_noise(wx, wz, offset)) * biome_bias;
        let h = (n.clamp(0.0, 1.0) * world_height as f32) as i32;
        h.clamp(1, world_height.max(2) - 1)
    }

    /// Tree-placement noise in `[0, 1]`.
    #[inline]
    pub fn tree_noise(&self, wx: i32, wz: i32, offset: [i32; 2]) -> f32 {
        let x = (wx + offset[0]) as f32;
        let z = (wz + offset[1]) as f32;
        (self.trees.get_noise_2d(x, z) * 0.5 + 0.5).clamp(0.0, 1.0)
    }

    /// Per-cell offset in `[-spacing/2, spacing/2]` used to jitter biome centres.
    pub fn cell_jitter(&self, cell_x: i32, cell_z: i32) -> (i32, i32) {
        let half = (self.params.biome_spacing / 2).max(1) as f32;
        let jx = self.jitter.get_noise_2d(cell_x as f32, cell_z as f32);
        let jz = self.jitter.get_noise_2d(cell_z as f32 + 71.0, cell_x as f32 - 29.0);
        ((jx * half) as i32, (jz * half) as i32)
    }
}
