//! Stage jobs for one generation cycle.
//!
//! Data and mesh stages run on the world's rayon pool and report back over a channel tagged
//! with the cycle id; the primary context merges results, post-processes, and syncs renders.

use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam_channel::Sender;
use hashbrown::HashSet;
use loam_chunk::{ChunkData, TerrainGenerator};
use loam_geom::IVec3;
use loam_mesh::{MeshBuilder, MeshData};
use loam_world::{BlockType, ChunkDims, ChunkPos, WorldId};
use rayon::ThreadPool;
use rayon::prelude::*;

use crate::cancel::{CancelToken, Cancelled};
use crate::diff::WorldGenerationData;
use crate::index::ChunkIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Trigger {
    Initial,
    Additional,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Stage {
    GenerateData,
    GenerateMesh,
    Sync,
}

pub(crate) enum StageOutput {
    Data(Result<Vec<ChunkData>, Cancelled>),
    Mesh(Result<Vec<(ChunkPos, MeshData)>, Cancelled>),
}

pub(crate) struct WorkerOut {
    pub cycle: u64,
    pub output: StageOutput,
}

pub(crate) struct Cycle {
    pub id: u64,
    pub trigger: Trigger,
    pub token: CancelToken,
    pub plan: WorldGenerationData,
    pub stage: Stage,
    pub pending_sync: VecDeque<(ChunkPos, MeshData)>,
    /// Planned renders whose mesh predates an edge edit next to them.
    pub stale: HashSet<ChunkPos>,
}

pub(crate) struct DataJob {
    pub cycle: u64,
    pub positions: Vec<ChunkPos>,
    pub dims: ChunkDims,
    pub world: WorldId,
    pub seed_offset: [i32; 2],
    pub generator: Arc<dyn TerrainGenerator>,
    pub token: CancelToken,
}

pub(crate) struct MeshJob {
    pub cycle: u64,
    pub positions: Vec<ChunkPos>,
    pub snapshot: ChunkIndex,
    pub mesher: Arc<dyn MeshBuilder>,
    pub token: CancelToken,
}

pub(crate) fn spawn_data_stage(pool: &ThreadPool, job: DataJob, tx: Sender<WorkerOut>) {
    pool.spawn(move || {
        let result = job
            .positions
            .par_iter()
            .map(|pos| {
                job.token.check()?;
                let empty = ChunkData::new(job.dims, job.world, *pos);
                Ok(job.generator.generate_chunk_data(empty, job.seed_offset))
            })
            .collect::<Result<Vec<_>, Cancelled>>();
        let _ = tx.send(WorkerOut {
            cycle: job.cycle,
            output: StageOutput::Data(result),
        });
    });
}

pub(crate) fn spawn_mesh_stage(pool: &ThreadPool, job: MeshJob, tx: Sender<WorkerOut>) {
    pool.spawn(move || {
        let result = job
            .positions
            .par_iter()
            .filter_map(|pos| job.snapshot.get(*pos).map(|chunk| (*pos, chunk)))
            .map(|(pos, chunk)| {
                job.token.check()?;
                Ok((pos, job.mesher.get_mesh_data(chunk, &job.snapshot)))
            })
            .collect::<Result<Vec<_>, Cancelled>>();
        let _ = tx.send(WorkerOut {
            cycle: job.cycle,
            output: StageOutput::Mesh(result),
        });
    });
}

/// Outcome of one leaf pass.
#[derive(Debug, Default)]
pub(crate) struct LeafPass {
    pub written: usize,
    /// Chunks whose blocks changed.
    pub touched: HashSet<ChunkPos>,
}

/// Writes the recorded leaves of every resident chunk, forwarding positions that spill into
/// a neighbour. A leaf is consumed once its target chunk is resident; leaves aimed at a
/// missing neighbour stay recorded for a later pass.
pub(crate) fn apply_tree_leaves(index: &mut ChunkIndex) -> LeafPass {
    let dims = index.dims();
    let sources: Vec<ChunkPos> = index
        .iter()
        .filter(|(_, chunk)| !chunk.tree_data.leaves_solid.is_empty())
        .map(|(pos, _)| pos)
        .collect();
    let mut pass = LeafPass::default();
    for pos in sources {
        let Some(leaves) = index
            .get_mut(pos)
            .map(|c| std::mem::take(&mut c.tree_data.leaves_solid))
        else {
            continue;
        };
        let mut waiting = Vec::new();
        for local in leaves {
            let world = pos.origin() + local;
            let owner = dims.align(world);
            if !index.contains(owner) {
                waiting.push(local);
                continue;
            }
            if index.block_at_world(world) == BlockType::TreeLeavesSolid {
                continue;
            }
            if index.set_block(pos, local, BlockType::TreeLeavesSolid) {
                pass.written += 1;
                pass.touched.insert(owner);
            }
        }
        if let Some(chunk) = index.get_mut(pos) {
            chunk.tree_data.leaves_solid = waiting;
        }
    }
    pass
}
