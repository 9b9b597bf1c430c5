use loam_geom::IVec3;

/// Integer world-space block coordinate.
pub type BlockPos = IVec3;

/// World-space origin of a chunk: always a multiple of the chunk size on X/Z and of the chunk
/// height on Y.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkPos(pub IVec3);

impl ChunkPos {
    #[inline]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self(IVec3::new(x, y, z))
    }

    #[inline]
    pub fn origin(self) -> BlockPos {
        self.0
    }

    #[inline]
    pub fn distance_to(self, p: BlockPos) -> f64 {
        self.0.distance(p)
    }
}

impl From<ChunkPos> for IVec3 {
    #[inline]
    fn from(value: ChunkPos) -> Self {
        value.0
    }
}

/// Horizontal size and vertical height of every chunk in a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkDims {
    pub size: i32,
    pub height: i32,
}

impl ChunkDims {
    #[inline]
    pub const fn new(size: i32, height: i32) -> Self {
        Self { size, height }
    }

    /// Number of voxels in one chunk.
    #[inline]
    pub fn volume(self) -> usize {
        (self.size as usize) * (self.size as usize) * (self.height as usize)
    }

    /// Floor-aligns a world coordinate to the origin of the chunk that owns it.
    #[inline]
    pub fn align(self, p: BlockPos) -> ChunkPos {
        ChunkPos(IVec3::new(
            p.x.div_euclid(self.size) * self.size,
            p.y.div_euclid(self.height) * self.height,
            p.z.div_euclid(self.size) * self.size,
        ))
    }

    /// True when `local` lies inside `[0,size) x [0,height) x [0,size)`.
    #[inline]
    pub fn contains_local(self, local: IVec3) -> bool {
        (0..self.size).contains(&local.x)
            && (0..self.height).contains(&local.y)
            && (0..self.size).contains(&local.z)
    }

    /// True when `local` sits on any face of the chunk.
    #[inline]
    pub fn on_edge(self, local: IVec3) -> bool {
        local.x == 0
            || local.x == self.size - 1
            || local.y == 0
            || local.y == self.height - 1
            || local.z == 0
            || local.z == self.size - 1
    }
}

/// Non-owning handle naming the world a chunk belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorldId(pub u64);

impl WorldId {
    /// Allocates a process-unique id.
    pub fn fresh() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static NEXT: AtomicU64 = AtomicU64::new(1);
        WorldId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}
