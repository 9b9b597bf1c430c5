//! Chunk streaming runtime: planning, cancellable parallel generation, and per-tick sync.
#![forbid(unsafe_code)]

pub mod cancel;
pub mod diff;
mod error;
mod events;
pub mod index;
mod pipeline;
pub mod range;
pub mod render;
mod resolver;

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use loam_chunk::{ChunkData, NoiseTerrainGenerator, TerrainGenerator};
use loam_edit::{RebuildQueue, edge_neighbours};
use loam_geom::Vec3;
use loam_mesh::{FaceMesher, MeshBuilder, MeshData};
use loam_world::{BlockPos, BlockType, ChunkPos, WorldConfig, WorldId};
use rayon::{ThreadPool, ThreadPoolBuilder};

pub use cancel::{CancelToken, Cancelled, CancellationController};
pub use diff::WorldGenerationData;
pub use error::WorldError;
pub use events::WorldEvent;
pub use index::{ChunkIndex, ChunkRenderer, WorldData};
pub use range::{NeededPositions, compute_needed};
pub use render::{HeadlessHandle, HeadlessRenderer, RenderCall, Renderer};

use crate::pipeline::{Cycle, DataJob, MeshJob, Stage, StageOutput, Trigger, WorkerOut};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub resident_data: usize,
    pub resident_renders: usize,
    pub cycles_completed: u64,
    pub cycles_cancelled: u64,
    pub pending_sync: usize,
    pub pending_rebuilds: usize,
}

fn build_pool(workers: usize) -> Result<ThreadPool, WorldError> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("loam-gen-{i}"))
        .build()?;
    Ok(pool)
}

/// Owns the spatial index and drives generation cycles on the calling thread.
///
/// Every mutation of the index and every renderer call happens inside methods of this type;
/// the worker pool only sees owned positions and immutable snapshots.
pub struct World<R: Renderer> {
    id: WorldId,
    config: WorldConfig,
    data: WorldData<R::Handle>,
    renderer: R,
    generator: Arc<dyn TerrainGenerator>,
    mesher: Arc<dyn MeshBuilder>,
    pool: ThreadPool,
    cancel: CancellationController,
    cycle: Option<Cycle>,
    next_cycle: u64,
    res_tx: Sender<WorkerOut>,
    res_rx: Receiver<WorkerOut>,
    events_tx: Sender<WorldEvent>,
    events_rx: Receiver<WorldEvent>,
    rebuilds: RebuildQueue,
    started: bool,
    created: bool,
    cycles_completed: u64,
    cycles_cancelled: u64,
}

impl<R: Renderer> World<R> {
    pub fn new(
        config: WorldConfig,
        generator: Arc<dyn TerrainGenerator>,
        mesher: Arc<dyn MeshBuilder>,
        renderer: R,
    ) -> Result<Self, WorldError> {
        config.validate()?;
        let pool = build_pool(config.workers)?;
        let (res_tx, res_rx) = unbounded();
        let (events_tx, events_rx) = unbounded();
        let id = WorldId::fresh();
        log::info!(
            target: "stream",
            "world {} ready: chunk {}x{}, range {}, {} workers",
            id.0,
            config.chunk_size,
            config.chunk_height,
            config.drawing_range,
            pool.current_num_threads()
        );
        Ok(Self {
            id,
            data: WorldData::new(config.dims()),
            config,
            renderer,
            generator,
            mesher,
            pool,
            cancel: CancellationController::new(),
            cycle: None,
            next_cycle: 0,
            res_tx,
            res_rx,
            events_tx,
            events_rx,
            rebuilds: RebuildQueue::new(),
            started: false,
            created: false,
            cycles_completed: 0,
            cycles_cancelled: 0,
        })
    }

    /// World using the noise terrain from `config.terrain` and the face-culling mesher.
    pub fn with_noise_terrain(config: WorldConfig, renderer: R) -> Result<Self, WorldError> {
        let generator = Arc::new(NoiseTerrainGenerator::new(config.terrain.clone()));
        Self::new(config, generator, Arc::new(FaceMesher), renderer)
    }

    #[inline]
    pub fn id(&self) -> WorldId {
        self.id
    }

    #[inline]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    #[inline]
    pub fn world_data(&self) -> &WorldData<R::Handle> {
        &self.data
    }

    #[inline]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Receiver for [`WorldEvent`]s. Events queue until read.
    pub fn events(&self) -> Receiver<WorldEvent> {
        self.events_rx.clone()
    }

    #[inline]
    pub fn is_world_created(&self) -> bool {
        self.created
    }

    /// True while a cycle is in flight or edits wait for a rebuild.
    pub fn is_busy(&self) -> bool {
        self.cycle.is_some() || !self.rebuilds.is_empty()
    }

    pub fn pending_rebuilds(&self) -> Vec<ChunkPos> {
        self.rebuilds.pending().collect()
    }

    pub fn stats(&self) -> WorldStats {
        WorldStats {
            resident_data: self.data.chunks.len(),
            resident_renders: self.data.renders.len(),
            cycles_completed: self.cycles_completed,
            cycles_cancelled: self.cycles_cancelled,
            pending_sync: self
                .cycle
                .as_ref()
                .map_or(0, |c| c.pending_sync.len()),
            pending_rebuilds: self.rebuilds.stats().pending,
        }
    }

    /// Replaces the configuration. Only allowed before the first cycle starts; terrain
    /// parameters keep whatever generator the world was built with.
    pub fn reconfigure(&mut self, config: WorldConfig) -> Result<(), WorldError> {
        if self.started {
            return Err(WorldError::ConfigLocked);
        }
        config.validate()?;
        if config.workers != self.config.workers {
            self.pool = build_pool(config.workers)?;
        }
        self.data = WorldData::new(config.dims());
        log::info!(
            target: "stream",
            "world {} reconfigured: chunk {}x{}, range {}",
            self.id.0,
            config.chunk_size,
            config.chunk_height,
            config.drawing_range
        );
        self.config = config;
        Ok(())
    }

    /// Starts the initial cycle around the world origin.
    pub fn generate_world(&mut self) -> Result<(), WorldError> {
        self.start_cycle(BlockPos::ZERO, Trigger::Initial)
    }

    /// Starts a cycle around the observer, superseding any cycle still in flight.
    pub fn load_additional_chunks(&mut self, observer: Vec3) -> Result<(), WorldError> {
        log::info!(target: "stream", "load more chunks");
        self.start_cycle(observer.round(), Trigger::Additional)
    }

    /// One host frame: collects finished stage work, commits at most one render, and runs
    /// pending edit rebuilds.
    pub fn tick(&mut self) {
        while let Ok(out) = self.res_rx.try_recv() {
            self.handle_worker_out(out);
        }
        self.sync_one();
        self.process_rebuilds();
    }

    /// Drives the active cycle to completion, blocking on the worker pool.
    pub fn run_until_idle(&mut self) -> Result<(), WorldError> {
        while let Some(stage) = self.cycle.as_ref().map(|c| c.stage) {
            match stage {
                Stage::Sync => self.sync_one(),
                Stage::GenerateData | Stage::GenerateMesh => {
                    let out = self.res_rx.recv().map_err(|_| WorldError::Cancelled)?;
                    self.handle_worker_out(out);
                }
            }
        }
        self.process_rebuilds();
        Ok(())
    }

    pub fn get_block(&self, world: BlockPos) -> BlockType {
        self.data.chunks.block_at_world(world)
    }

    /// Player edit. The owning chunk must have a resident renderer. Marks the chunk modified
    /// so it is never evicted, and queues rebuilds for it and for rendered edge neighbours.
    pub fn set_block(&mut self, world: BlockPos, block: BlockType) -> Result<bool, WorldError> {
        let dims = self.data.dims();
        let owner = dims.align(world);
        let Some(render) = self.data.renders.get_mut(&owner) else {
            return Err(WorldError::NoRenderer { pos: owner });
        };
        render.modified = true;
        let written = self.data.chunks.set_world(world, block);
        if let Some(chunk) = self.data.chunks.get_mut(owner) {
            chunk.modified = true;
        }
        log::debug!(target: "edit", "set {block:?} at {world:?} (chunk {:?})", owner.origin());

        self.rebuilds.request(owner);
        if dims.on_edge(world - owner.origin()) {
            for n in edge_neighbours(dims, world) {
                if self.data.has_renderer(n) {
                    self.rebuilds.request(n);
                    log::debug!(target: "edit", "edge rebuild scheduled for {:?}", n.origin());
                } else if let Some(cycle) = self.cycle.as_mut() {
                    // meshed from a snapshot taken before this edit; rebuilt once committed
                    if cycle.plan.render_to_create.contains(&n) {
                        cycle.stale.insert(n);
                    }
                }
            }
        }
        Ok(written)
    }

    /// Cancels the active cycle and refuses new ones.
    pub fn shutdown(&mut self) {
        self.cancel.shutdown();
        if let Some(cycle) = self.cycle.take() {
            self.abandon(cycle, "shutdown");
        }
        log::info!(target: "stream", "world {} shut down", self.id.0);
    }

    /// Drops every resident chunk and renderer so the world can be generated again.
    pub fn clear(&mut self) {
        if let Some(cycle) = self.cycle.take() {
            self.abandon(cycle, "cleared");
        }
        for (_, render) in self.data.renders.drain() {
            self.renderer.remove_chunk(render.handle);
        }
        self.data.chunks.clear();
        self.rebuilds.clear();
        self.started = false;
        self.created = false;
        log::info!(target: "stream", "world {} cleared", self.id.0);
    }

    fn emit(&self, event: WorldEvent) {
        let _ = self.events_tx.send(event);
    }

    fn start_cycle(&mut self, observer: BlockPos, trigger: Trigger) -> Result<(), WorldError> {
        if self.cancel.is_shut_down() {
            return Err(WorldError::Cancelled);
        }
        if let Some(old) = self.cycle.take() {
            self.abandon(old, "superseded");
        }
        let token = self.cancel.begin_cycle();
        self.started = true;
        self.next_cycle += 1;
        let id = self.next_cycle;

        let dims = self.data.dims();
        let range = self.config.drawing_range;
        let seed_offset = self.config.seed_offset;
        self.generator
            .generate_biome_points(observer, range, dims.size, seed_offset);
        let needed = compute_needed(dims, range, observer);
        let plan = diff::plan(&self.data, &needed, observer);
        log::info!(
            target: "stream",
            "cycle {id} ({trigger:?}) at {observer:?}: create {} renders / {} data, remove {} renders / {} data",
            plan.render_to_create.len(),
            plan.data_to_create.len(),
            plan.render_to_remove.len(),
            plan.data_to_remove.len()
        );

        self.evict(&plan);

        log::debug!(target: "stream", "cycle {id}: generating {} chunks", plan.data_to_create.len());
        pipeline::spawn_data_stage(
            &self.pool,
            DataJob {
                cycle: id,
                positions: plan.data_to_create.clone(),
                dims,
                world: self.id,
                seed_offset,
                generator: Arc::clone(&self.generator),
                token: token.clone(),
            },
            self.res_tx.clone(),
        );
        self.cycle = Some(Cycle {
            id,
            trigger,
            token,
            plan,
            stage: Stage::GenerateData,
            pending_sync: Default::default(),
            stale: Default::default(),
        });
        Ok(())
    }

    fn evict(&mut self, plan: &WorldGenerationData) {
        // renders first so none outlives its data
        for pos in &plan.render_to_remove {
            if let Some(render) = self.data.renders.remove(pos) {
                self.renderer.remove_chunk(render.handle);
                self.rebuilds.forget(*pos);
            }
        }
        for pos in &plan.data_to_remove {
            self.data.chunks.remove(*pos);
        }
    }

    fn abandon(&mut self, cycle: Cycle, reason: &str) {
        cycle.token.cancel();
        self.cycles_cancelled += 1;
        log::info!(
            target: "stream",
            "generation cycle cancelled (cycle {}, {reason}, {} unsynced)",
            cycle.id,
            cycle.pending_sync.len()
        );
        self.emit(WorldEvent::CycleCancelled);
    }

    fn handle_worker_out(&mut self, out: WorkerOut) {
        // tokens are only cancelled after their cycle is dropped, so a cancelled stage
        // always reports for a stale cycle
        if self.cycle.as_ref().is_none_or(|c| c.id != out.cycle) {
            log::trace!(target: "stream", "dropping result of stale cycle {}", out.cycle);
            return;
        }
        match out.output {
            StageOutput::Data(Ok(chunks)) => self.merge_and_mesh(chunks),
            StageOutput::Mesh(Ok(meshes)) => self.enter_sync(meshes),
            StageOutput::Data(Err(Cancelled)) | StageOutput::Mesh(Err(Cancelled)) => {
                log::warn!(target: "stream", "live cycle {} reported cancellation", out.cycle);
            }
        }
    }

    fn merge_and_mesh(&mut self, chunks: Vec<ChunkData>) {
        let merged = chunks.len();
        for chunk in chunks {
            self.data.chunks.insert(chunk);
        }
        let leaves = pipeline::apply_tree_leaves(&mut self.data.chunks);
        // spills into chunks already on screen need a fresh mesh
        for pos in leaves.touched {
            if self.data.has_renderer(pos) {
                self.rebuilds.request(pos);
            }
        }
        let Some(cycle) = self.cycle.as_mut() else {
            return;
        };
        log::debug!(
            target: "stream",
            "cycle {}: merged {merged} chunks, placed {} leaves",
            cycle.id,
            leaves.written
        );

        let positions: Vec<ChunkPos> = cycle
            .plan
            .render_to_create
            .iter()
            .copied()
            .filter(|p| self.data.chunks.contains(*p))
            .collect();
        log::debug!(target: "stream", "cycle {}: meshing {} chunks", cycle.id, positions.len());
        cycle.stage = Stage::GenerateMesh;
        pipeline::spawn_mesh_stage(
            &self.pool,
            MeshJob {
                cycle: cycle.id,
                positions,
                snapshot: self.data.chunks.clone(),
                mesher: Arc::clone(&self.mesher),
                token: cycle.token.clone(),
            },
            self.res_tx.clone(),
        );
    }

    fn enter_sync(&mut self, meshes: Vec<(ChunkPos, MeshData)>) {
        if let Some(cycle) = self.cycle.as_mut() {
            log::debug!(target: "stream", "cycle {}: syncing {} renders", cycle.id, meshes.len());
            cycle.pending_sync = meshes.into();
            cycle.stage = Stage::Sync;
        }
    }

    fn sync_one(&mut self) {
        let next = match self.cycle.as_mut() {
            Some(c) if c.stage == Stage::Sync => c.pending_sync.pop_front(),
            _ => return,
        };
        if let Some((pos, mesh)) = next {
            self.commit_render(pos, mesh);
        }
        let drained = self
            .cycle
            .as_ref()
            .is_some_and(|c| c.pending_sync.is_empty());
        if drained {
            if let Some(cycle) = self.cycle.take() {
                self.finish(cycle);
            }
        }
    }

    fn commit_render(&mut self, pos: ChunkPos, mesh: MeshData) {
        if !self.data.chunks.contains(pos) {
            log::debug!(target: "stream", "skipping render for non-resident chunk {:?}", pos.origin());
            return;
        }
        match self.data.renders.get_mut(&pos) {
            Some(existing) => self.renderer.update_chunk(&mut existing.handle, mesh),
            None => {
                let modified = self.data.chunks.is_modified(pos);
                let handle = self.renderer.render_chunk(pos, mesh);
                self.data.renders.insert(
                    pos,
                    ChunkRenderer {
                        pos,
                        modified,
                        handle,
                    },
                );
            }
        }
        if self.cycle.as_mut().is_some_and(|c| c.stale.remove(&pos)) {
            log::debug!(target: "edit", "edge rebuild scheduled for {:?}", pos.origin());
            self.rebuilds.request(pos);
        }
    }

    fn finish(&mut self, cycle: Cycle) {
        self.cycles_completed += 1;
        log::info!(
            target: "stream",
            "cycle {} synced: {} data / {} renders resident",
            cycle.id,
            self.data.chunks.len(),
            self.data.renders.len()
        );
        if !self.created {
            self.created = true;
            log::info!(target: "stream", "world created");
            self.emit(WorldEvent::WorldCreated);
        }
        if cycle.trigger == Trigger::Additional {
            self.emit(WorldEvent::NewChunksGenerated);
        }
    }

    fn process_rebuilds(&mut self) {
        while let Some((pos, rev)) = self.rebuilds.pop() {
            let Some(chunk) = self.data.chunks.get(pos) else {
                self.rebuilds.forget(pos);
                continue;
            };
            let Some(render) = self.data.renders.get_mut(&pos) else {
                self.rebuilds.forget(pos);
                continue;
            };
            let mesh = self.mesher.get_mesh_data(chunk, &self.data.chunks);
            self.renderer.update_chunk(&mut render.handle, mesh);
            self.rebuilds.mark_built(pos, rev);
            log::debug!(target: "edit", "rebuilt chunk {:?} (rev {rev})", pos.origin());
        }
    }
}

/// Block a raycast hit belongs to. Hits exactly on a face boundary step back half the
/// normal so they land inside the hit block.
pub fn block_pos_from_hit(point: Vec3, normal: Vec3) -> BlockPos {
    fn axis(p: f32, n: f32) -> f32 {
        if (p % 1.0).abs() == 0.5 { p - n / 2.0 } else { p }
    }
    Vec3::new(
        axis(point.x, normal.x),
        axis(point.y, normal.y),
        axis(point.z, normal.z),
    )
    .round()
}
