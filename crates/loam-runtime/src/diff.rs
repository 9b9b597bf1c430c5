//! Planning: what to create and what to evict for one cycle.

use std::cmp::Ordering;

use hashbrown::HashSet;
use loam_world::{BlockPos, ChunkPos};

use crate::index::WorldData;
use crate::range::NeededPositions;

/// Per-cycle plan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldGenerationData {
    pub render_to_create: Vec<ChunkPos>,
    pub data_to_create: Vec<ChunkPos>,
    pub render_to_remove: Vec<ChunkPos>,
    pub data_to_remove: Vec<ChunkPos>,
}

impl WorldGenerationData {
    pub fn is_empty(&self) -> bool {
        self.render_to_create.is_empty()
            && self.data_to_create.is_empty()
            && self.render_to_remove.is_empty()
            && self.data_to_remove.is_empty()
    }
}

/// Needed positions that are not yet resident, nearest first. Equal distances keep their
/// enumeration order.
pub fn select_to_create(
    needed: &[ChunkPos],
    resident: impl Fn(ChunkPos) -> bool,
    observer: BlockPos,
) -> Vec<ChunkPos> {
    let mut out: Vec<ChunkPos> = needed.iter().copied().filter(|p| !resident(*p)).collect();
    out.sort_by(|a, b| {
        a.distance_to(observer)
            .partial_cmp(&b.distance_to(observer))
            .unwrap_or(Ordering::Equal)
    });
    out
}

/// Resident renders outside the needed set. Renders carry no eviction exemption.
pub fn unneeded_renders(
    resident: impl Iterator<Item = ChunkPos>,
    needed: &HashSet<ChunkPos>,
) -> Vec<ChunkPos> {
    resident.filter(|p| !needed.contains(p)).collect()
}

/// Resident data outside the needed set, except chunks the player has modified.
pub fn unneeded_data(
    resident: impl Iterator<Item = (ChunkPos, bool)>,
    needed: &HashSet<ChunkPos>,
) -> Vec<ChunkPos> {
    resident
        .filter(|(p, modified)| !*modified && !needed.contains(p))
        .map(|(p, _)| p)
        .collect()
}

pub fn plan<H>(
    world: &WorldData<H>,
    needed: &NeededPositions,
    observer: BlockPos,
) -> WorldGenerationData {
    let render_set: HashSet<ChunkPos> = needed.render.iter().copied().collect();
    let data_set: HashSet<ChunkPos> = needed.data.iter().copied().collect();
    let mut render_to_remove = unneeded_renders(world.renders.keys().copied(), &render_set);
    let mut data_to_remove = unneeded_data(
        world.chunks.iter().map(|(p, c)| (p, c.modified)),
        &data_set,
    );
    // hash order is arbitrary; keep eviction deterministic
    render_to_remove.sort_unstable();
    data_to_remove.sort_unstable();
    WorldGenerationData {
        render_to_create: select_to_create(
            &needed.render,
            |p| world.renders.contains_key(&p),
            observer,
        ),
        data_to_create: select_to_create(&needed.data, |p| world.chunks.contains(p), observer),
        render_to_remove,
        data_to_remove,
    }
}
