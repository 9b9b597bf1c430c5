use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::coords::ChunkDims;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read world config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse world config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid world config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct WorldConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: i32,
    #[serde(default = "default_chunk_height")]
    pub chunk_height: i32,
    /// Radius, in chunks, within which chunks get renderable geometry.
    #[serde(default = "default_drawing_range")]
    pub drawing_range: i32,
    #[serde(default)]
    pub seed_offset: [i32; 2],
    /// Worker threads for data and mesh generation; 0 picks available parallelism.
    #[serde(default)]
    pub workers: usize,
    #[serde(default)]
    pub terrain: TerrainParams,
}

fn default_chunk_size() -> i32 {
    16
}
fn default_chunk_height() -> i32 {
    100
}
fn default_drawing_range() -> i32 {
    8
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_height: default_chunk_height(),
            drawing_range: default_drawing_range(),
            seed_offset: [0, 0],
            workers: 0,
            terrain: TerrainParams::default(),
        }
    }
}

impl WorldConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: WorldConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml_str(&s)?;
        log::info!(
            "world config loaded from {} (chunk {}x{}, range {})",
            path.display(),
            cfg.chunk_size,
            cfg.chunk_height,
            cfg.drawing_range
        );
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size <= 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_size",
                reason: format!("must be positive, got {}", self.chunk_size),
            });
        }
        if self.chunk_height <= 0 {
            return Err(ConfigError::Invalid {
                field: "chunk_height",
                reason: format!("must be positive, got {}", self.chunk_height),
            });
        }
        if self.drawing_range < 0 {
            return Err(ConfigError::Invalid {
                field: "drawing_range",
                reason: format!("must not be negative, got {}", self.drawing_range),
            });
        }
        // the data ring reaches one chunk past the drawing range, in blocks
        let reach = self
            .drawing_range
            .checked_add(1)
            .and_then(|r| r.checked_mul(self.chunk_size))
            .and_then(|r| r.checked_mul(2));
        if reach.is_none() {
            return Err(ConfigError::Invalid {
                field: "drawing_range",
                reason: format!(
                    "{} chunks of {} blocks overflows block coordinates",
                    self.drawing_range, self.chunk_size
                ),
            });
        }
        if self.terrain.octaves == 0 {
            return Err(ConfigError::Invalid {
                field: "terrain.octaves",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        ChunkDims::new(self.chunk_size, self.chunk_height)
    }
}

/// Height-map noise settings.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct TerrainParams {
    #[serde(default = "default_noise_zoom")]
    pub noise_zoom: f32,
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    #[serde(default = "default_persistence")]
    pub persistence: f32,
    #[serde(default = "default_redistribution")]
    pub redistribution_modifier: f32,
    #[serde(default = "default_exponent")]
    pub exponent: f32,
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_water_level")]
    pub water_level: i32,
    /// Surface noise value above which a column grows a tree.
    #[serde(default = "default_tree_threshold")]
    pub tree_threshold: f32,
    /// Distance between biome centres, in blocks.
    #[serde(default = "default_biome_spacing")]
    pub biome_spacing: i32,
}

fn default_noise_zoom() -> f32 {
    0.01
}
fn default_octaves() -> u32 {
    5
}
fn default_persistence() -> f32 {
    0.5
}
fn default_redistribution() -> f32 {
    1.2
}
fn default_exponent() -> f32 {
    1.5
}
fn default_seed() -> i32 {
    1337
}
fn default_water_level() -> i32 {
    30
}
fn default_tree_threshold() -> f32 {
    0.92
}
fn default_biome_spacing() -> i32 {
    64
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            noise_zoom: default_noise_zoom(),
            octaves: default_octaves(),
            persistence: default_persistence(),
            redistribution_modifier: default_redistribution(),
            exponent: default_exponent(),
            seed: default_seed(),
            water_level: default_water_level(),
            tree_threshold: default_tree_threshold(),
            biome_spacing: default_biome_spacing(),
        }
    }
}
