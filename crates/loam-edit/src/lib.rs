//! Block-edit seam tracking and mesh rebuild bookkeeping.
#![forbid(unsafe_code)]

use std::collections::VecDeque;

use hashbrown::HashMap;
use loam_geom::Face;
use loam_world::{BlockPos, ChunkDims, ChunkPos};

/// Faces of the owning chunk that an edit at `world` touches.
pub fn touched_faces(dims: ChunkDims, world: BlockPos) -> Vec<Face> {
    let local = world - dims.align(world).origin();
    let mut faces = Vec::new();
    if local.x == 0 {
        faces.push(Face::NegX);
    }
    if local.x == dims.size - 1 {
        faces.push(Face::PosX);
    }
    if local.y == 0 {
        faces.push(Face::NegY);
    }
    if local.y == dims.height - 1 {
        faces.push(Face::PosY);
    }
    if local.z == 0 {
        faces.push(Face::NegZ);
    }
    if local.z == dims.size - 1 {
        faces.push(Face::PosZ);
    }
    faces
}

/// Chunks sharing a face with the edit at `world`, at most one per axis direction.
///
/// Size-1 axes report both directions, matching an edit that sits on two opposite faces.
pub fn edge_neighbours(dims: ChunkDims, world: BlockPos) -> Vec<ChunkPos> {
    let mut out: Vec<ChunkPos> = Vec::new();
    for face in touched_faces(dims, world) {
        let n = dims.align(world + face.delta());
        if !out.contains(&n) {
            out.push(n);
        }
    }
    out
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebuildStats {
    pub pending: usize,
    pub rev_entries: usize,
    pub built_entries: usize,
}

/// FIFO of chunks whose meshes must be rebuilt, with revision stamps so a rebuild that lands
/// after a newer request does not clear it.
#[derive(Default)]
pub struct RebuildQueue {
    order: VecDeque<ChunkPos>,
    rev: HashMap<ChunkPos, u64>,
    built: HashMap<ChunkPos, u64>,
    counter: u64,
}

impl RebuildQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> RebuildStats {
        RebuildStats {
            pending: self.order.len(),
            rev_entries: self.rev.len(),
            built_entries: self.built.len(),
        }
    }

    /// Records a rebuild request and returns its stamp. Re-requesting a queued chunk keeps its
    /// queue position.
    pub fn request(&mut self, pos: ChunkPos) -> u64 {
        self.counter = self.counter.wrapping_add(1).max(1);
        let stamp = self.counter;
        self.rev.insert(pos, stamp);
        if !self.order.contains(&pos) {
            self.order.push_back(pos);
        }
        stamp
    }

    /// Next chunk to rebuild together with the stamp it must report back to `mark_built`.
    pub fn pop(&mut self) -> Option<(ChunkPos, u64)> {
        let pos = self.order.pop_front()?;
        Some((pos, self.get_rev(pos)))
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[inline]
    pub fn is_pending(&self, pos: ChunkPos) -> bool {
        self.order.contains(&pos)
    }

    pub fn pending(&self) -> impl Iterator<Item = ChunkPos> + '_ {
        self.order.iter().copied()
    }

    pub fn get_rev(&self, pos: ChunkPos) -> u64 {
        self.rev.get(&pos).copied().unwrap_or(0)
    }

    pub fn get_built_rev(&self, pos: ChunkPos) -> u64 {
        self.built.get(&pos).copied().unwrap_or(0)
    }

    pub fn mark_built(&mut self, pos: ChunkPos, rev: u64) {
        let e = self.built.entry(pos).or_insert(0);
        if rev > *e {
            *e = rev;
        }
    }

    pub fn needs_rebuild(&self, pos: ChunkPos) -> bool {
        self.get_rev(pos) > self.get_built_rev(pos)
    }

    /// Drops all bookkeeping for a chunk whose renderer went away.
    pub fn forget(&mut self, pos: ChunkPos) {
        self.order.retain(|p| *p != pos);
        self.rev.remove(&pos);
        self.built.remove(&pos);
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.rev.clear();
        self.built.clear();
    }
}
