//! Seam to the display layer.

use hashbrown::HashMap;
use loam_mesh::MeshData;
use loam_world::ChunkPos;

/// Display-side collaborator. Every call happens on the primary context.
pub trait Renderer {
    type Handle;

    /// Uploads geometry for a newly resident chunk.
    fn render_chunk(&mut self, pos: ChunkPos, mesh: MeshData) -> Self::Handle;

    /// Replaces the geometry behind an existing handle after an edit.
    fn update_chunk(&mut self, handle: &mut Self::Handle, mesh: MeshData);

    /// Releases the display resource.
    fn remove_chunk(&mut self, handle: Self::Handle);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderCall {
    Render(ChunkPos),
    Update(ChunkPos),
    Remove(ChunkPos),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HeadlessHandle {
    pub id: u64,
    pub pos: ChunkPos,
}

/// Renderer without a display: keeps quad counts per live handle and a call log.
#[derive(Debug, Default)]
pub struct HeadlessRenderer {
    next_id: u64,
    live: HashMap<u64, (ChunkPos, usize)>,
    calls: Vec<RenderCall>,
    record_calls: bool,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also keeps every call in order, for tests.
    pub fn recording() -> Self {
        Self {
            record_calls: true,
            ..Self::default()
        }
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn total_quads(&self) -> usize {
        self.live.values().map(|(_, q)| *q).sum()
    }

    pub fn quads_at(&self, pos: ChunkPos) -> Option<usize> {
        self.live.values().find(|(p, _)| *p == pos).map(|(_, q)| *q)
    }

    pub fn calls(&self) -> &[RenderCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<RenderCall> {
        std::mem::take(&mut self.calls)
    }

    fn log(&mut self, call: RenderCall) {
        if self.record_calls {
            self.calls.push(call);
        }
    }
}

impl Renderer for HeadlessRenderer {
    type Handle = HeadlessHandle;

    fn render_chunk(&mut self, pos: ChunkPos, mesh: MeshData) -> HeadlessHandle {
        self.next_id += 1;
        let id = self.next_id;
        self.live.insert(id, (pos, mesh.quad_count()));
        self.log(RenderCall::Render(pos));
        HeadlessHandle { id, pos }
    }

    fn update_chunk(&mut self, handle: &mut HeadlessHandle, mesh: MeshData) {
        self.live.insert(handle.id, (handle.pos, mesh.quad_count()));
        self.log(RenderCall::Update(handle.pos));
    }

    fn remove_chunk(&mut self, handle: HeadlessHandle) {
        self.live.remove(&handle.id);
        self.log(RenderCall::Remove(handle.pos));
    }
}
