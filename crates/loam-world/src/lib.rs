//! World sizing, block types, chunk alignment, and terrain sampling parameters.
#![forbid(unsafe_code)]

pub mod block;
pub mod config;
pub mod coords;
pub mod sampler;

pub use block::BlockType;
pub use config::{ConfigError, TerrainParams, WorldConfig};
pub use coords::{BlockPos, ChunkDims, ChunkPos, WorldId};
pub use sampler::TerrainSampler;
