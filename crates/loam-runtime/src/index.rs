//! Spatial index: chunk origin to voxel data, and chunk origin to renderable handle.

use std::sync::Arc;

use hashbrown::HashMap;
use loam_chunk::ChunkData;
use loam_world::{ChunkDims, ChunkPos};

/// Resident voxel data keyed by chunk origin.
///
/// Values are shared with in-flight mesh workers through cheap snapshots; writes on the
/// primary context go through `Arc::make_mut`, so a snapshot never observes a mutation.
#[derive(Clone, Debug)]
pub struct ChunkIndex {
    dims: ChunkDims,
    map: HashMap<ChunkPos, Arc<ChunkData>>,
}

impl ChunkIndex {
    pub fn new(dims: ChunkDims) -> Self {
        Self {
            dims,
            map: HashMap::new(),
        }
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.map.contains_key(&pos)
    }

    #[inline]
    pub fn get(&self, pos: ChunkPos) -> Option<&ChunkData> {
        self.map.get(&pos).map(Arc::as_ref)
    }

    /// Mutable access; clones the chunk first if a snapshot still holds it.
    pub fn get_mut(&mut self, pos: ChunkPos) -> Option<&mut ChunkData> {
        self.map.get_mut(&pos).map(Arc::make_mut)
    }

    pub fn insert(&mut self, chunk: ChunkData) -> Option<Arc<ChunkData>> {
        self.map.insert(chunk.pos, Arc::new(chunk))
    }

    pub fn remove(&mut self, pos: ChunkPos) -> Option<Arc<ChunkData>> {
        self.map.remove(&pos)
    }

    pub fn keys(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.map.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkPos, &ChunkData)> + '_ {
        self.map.iter().map(|(p, c)| (*p, c.as_ref()))
    }

    pub fn is_modified(&self, pos: ChunkPos) -> bool {
        self.get(pos).is_some_and(|c| c.modified)
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

/// Renderable handle bound to one resident chunk.
#[derive(Debug)]
pub struct ChunkRenderer<H> {
    pub pos: ChunkPos,
    /// Set by player edits; mirrors the flag on the chunk's data.
    pub modified: bool,
    pub handle: H,
}

/// World-wide state owned by the primary context.
#[derive(Debug)]
pub struct WorldData<H> {
    pub chunks: ChunkIndex,
    pub renders: HashMap<ChunkPos, ChunkRenderer<H>>,
}

impl<H> WorldData<H> {
    pub fn new(dims: ChunkDims) -> Self {
        Self {
            chunks: ChunkIndex::new(dims),
            renders: HashMap::new(),
        }
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.chunks.dims()
    }

    #[inline]
    pub fn has_renderer(&self, pos: ChunkPos) -> bool {
        self.renders.contains_key(&pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loam_geom::IVec3;
    use loam_world::{BlockType, WorldId};

    #[test]
    fn mutation_after_snapshot_copies_on_write() {
        let dims = ChunkDims::new(4, 4);
        let pos = ChunkPos::new(0, 0, 0);
        let mut index = ChunkIndex::new(dims);
        index.insert(ChunkData::new(dims, WorldId(7), pos));
        let snapshot = index.clone();
        if let Some(c) = index.get_mut(pos) {
            c.set_local(IVec3::new(1, 1, 1), BlockType::Stone);
        }
        assert_eq!(
            index.get(pos).and_then(|c| c.get_local(IVec3::new(1, 1, 1))),
            Some(BlockType::Stone)
        );
        assert_eq!(
            snapshot.get(pos).and_then(|c| c.get_local(IVec3::new(1, 1, 1))),
            Some(BlockType::Air)
        );
    }

    #[test]
    fn modified_flag_reads_through_the_index() {
        let dims = ChunkDims::new(4, 4);
        let pos = ChunkPos::new(4, 0, 0);
        let mut index = ChunkIndex::new(dims);
        assert!(!index.is_modified(pos));
        let mut c = ChunkData::new(dims, WorldId(1), pos);
        c.modified = true;
        index.insert(c);
        assert!(index.is_modified(pos));
    }
}
