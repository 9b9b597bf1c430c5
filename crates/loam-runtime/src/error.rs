use loam_world::{ChunkPos, ConfigError};

use crate::cancel::Cancelled;

#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    #[error("generation cycle cancelled")]
    Cancelled,
    #[error("world configuration can only change before the first generation cycle")]
    ConfigLocked,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("no renderer resident for chunk {pos:?}")]
    NoRenderer { pos: ChunkPos },
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl From<Cancelled> for WorldError {
    fn from(_: Cancelled) -> Self {
        WorldError::Cancelled
    }
}
