//! Per-chunk voxel grid, tree decoration data, and terrain generation.
#![forbid(unsafe_code)]

pub mod terrain;
pub mod tree;

use loam_geom::IVec3;
use loam_world::{BlockPos, BlockType, ChunkDims, ChunkPos, WorldId};

pub use terrain::{BiomePoint, NoiseTerrainGenerator, TerrainGenerator};
pub use tree::TreeData;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChunkError {
    #[error("local position ({x}, {y}, {z}) is outside the chunk")]
    OutOfRange { x: i32, y: i32, z: i32 },
}

/// Fixed-size voxel grid for one chunk.
///
/// Linear layout is `x + size*y + size*height*z`.
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkData {
    pub pos: ChunkPos,
    pub dims: ChunkDims,
    pub blocks: Vec<BlockType>,
    pub world: WorldId,
    /// Set once an external actor (the player) has edited this chunk; such chunks are never
    /// evicted from the data index.
    pub modified: bool,
    pub tree_data: TreeData,
}

impl ChunkData {
    pub fn new(dims: ChunkDims, world: WorldId, pos: ChunkPos) -> Self {
        Self {
            pos,
            dims,
            blocks: vec![BlockType::Air; dims.volume()],
            world,
            modified: false,
            tree_data: TreeData::default(),
        }
    }

    #[inline]
    pub fn size(&self) -> i32 {
        self.dims.size
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.dims.height
    }

    /// Linear index of an in-range local position.
    #[inline]
    pub fn idx(&self, x: i32, y: i32, z: i32) -> usize {
        debug_assert!(self.dims.contains_local(IVec3::new(x, y, z)));
        let s = self.dims.size as usize;
        let h = self.dims.height as usize;
        x as usize + s * y as usize + s * h * z as usize
    }

    /// Inverse of [`ChunkData::idx`].
    #[inline]
    pub fn position(&self, index: usize) -> IVec3 {
        position_from_index(self.dims, index)
    }

    #[inline]
    pub fn contains_local(&self, local: IVec3) -> bool {
        self.dims.contains_local(local)
    }

    #[inline]
    pub fn local_of(&self, world: BlockPos) -> IVec3 {
        world - self.pos.origin()
    }

    #[inline]
    pub fn world_of(&self, local: IVec3) -> BlockPos {
        self.pos.origin() + local
    }

    #[inline]
    pub fn contains_world(&self, world: BlockPos) -> bool {
        self.contains_local(self.local_of(world))
    }

    /// Direct read; `None` when `local` is outside this chunk.
    #[inline]
    pub fn get_local(&self, local: IVec3) -> Option<BlockType> {
        if !self.contains_local(local) {
            return None;
        }
        Some(self.blocks[self.idx(local.x, local.y, local.z)])
    }

    /// Direct write. Returns `false` without touching the grid when `local` is outside this
    /// chunk, leaving forwarding to the caller that owns the spatial index.
    #[inline]
    pub fn set_local(&mut self, local: IVec3, block: BlockType) -> bool {
        if !self.contains_local(local) {
            return false;
        }
        let i = self.idx(local.x, local.y, local.z);
        self.blocks[i] = block;
        true
    }

    /// Write that treats an out-of-range position as a caller bug.
    pub fn set_local_strict(&mut self, local: IVec3, block: BlockType) -> Result<(), ChunkError> {
        if self.set_local(local, block) {
            Ok(())
        } else {
            Err(ChunkError::OutOfRange {
                x: local.x,
                y: local.y,
                z: local.z,
            })
        }
    }

    /// True when the world position lies on one of this chunk's six faces.
    #[inline]
    pub fn is_on_edge(&self, world: BlockPos) -> bool {
        self.dims.on_edge(self.local_of(world))
    }

    /// Lazily yields every local position in linear-index order.
    #[inline]
    pub fn positions(&self) -> LocalPositions {
        LocalPositions::new(self.dims)
    }

    #[inline]
    pub fn has_non_air(&self) -> bool {
        self.blocks.iter().any(|b| *b != BlockType::Air)
    }
}

#[inline]
pub fn position_from_index(dims: ChunkDims, index: usize) -> IVec3 {
    let s = dims.size as usize;
    let h = dims.height as usize;
    IVec3::new(
        (index % s) as i32,
        ((index / s) % h) as i32,
        (index / (s * h)) as i32,
    )
}

/// Finite, restartable (via `Clone`) walk over a chunk's local coordinates.
#[derive(Clone, Debug)]
pub struct LocalPositions {
    dims: ChunkDims,
    next: usize,
    len: usize,
}

impl LocalPositions {
    pub fn new(dims: ChunkDims) -> Self {
        Self {
            dims,
            next: 0,
            len: dims.volume(),
        }
    }
}

impl Iterator for LocalPositions {
    type Item = IVec3;

    fn next(&mut self) -> Option<IVec3> {
        if self.next >= self.len {
            return None;
        }
        let p = position_from_index(self.dims, self.next);
        self.next += 1;
        Some(p)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.len - self.next;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for LocalPositions {}
