//! Block access that crosses chunk boundaries through the spatial index.

use loam_chunk::ChunkData;
use loam_geom::IVec3;
use loam_mesh::BlockSource;
use loam_world::{BlockPos, BlockType, ChunkPos};

use crate::index::ChunkIndex;

impl ChunkIndex {
    /// Block at a world position; `Nothing` when the owning chunk is not resident.
    pub fn block_at_world(&self, world: BlockPos) -> BlockType {
        let owner = self.dims().align(world);
        match self.get(owner) {
            Some(chunk) => chunk
                .get_local(world - owner.origin())
                .unwrap_or(BlockType::Nothing),
            None => BlockType::Nothing,
        }
    }

    /// Reads `local` relative to `chunk`, resolving out-of-range positions in the chunk
    /// that owns them.
    #[inline]
    pub fn get_block(&self, chunk: &ChunkData, local: IVec3) -> BlockType {
        match chunk.get_local(local) {
            Some(b) => b,
            None => self.block_at_world(chunk.world_of(local)),
        }
    }

    /// Writes `local` relative to the chunk at `pos`, forwarding out-of-range positions to
    /// their owner. Returns `false` when no resident chunk owns the target.
    pub fn set_block(&mut self, pos: ChunkPos, local: IVec3, block: BlockType) -> bool {
        if self.dims().contains_local(local) {
            return match self.get_mut(pos) {
                Some(chunk) => chunk.set_local(local, block),
                None => false,
            };
        }
        self.set_world(pos.origin() + local, block)
    }

    pub fn set_world(&mut self, world: BlockPos, block: BlockType) -> bool {
        let owner = self.dims().align(world);
        match self.get_mut(owner) {
            Some(chunk) => chunk.set_local(world - owner.origin(), block),
            None => false,
        }
    }
}

impl BlockSource for ChunkIndex {
    #[inline]
    fn block_at(&self, chunk: &ChunkData, local: IVec3) -> BlockType {
        self.get_block(chunk, local)
    }
}
