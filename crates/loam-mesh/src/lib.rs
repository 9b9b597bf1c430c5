//! CPU mesh buffers and the face-culling chunk mesher.
#![forbid(unsafe_code)]

mod mesh_data;
mod tiles;

use loam_chunk::ChunkData;
use loam_geom::{Face, IVec3, Vec3};
use loam_world::BlockType;

pub use mesh_data::MeshData;

/// Neighbour-aware block lookup used while meshing.
///
/// `local` is relative to `chunk` and may leave its bounds; implementations resolve such
/// positions in the owning chunk and return `BlockType::Nothing` when it is not resident.
pub trait BlockSource: Sync {
    fn block_at(&self, chunk: &ChunkData, local: IVec3) -> BlockType;
}

/// Source that only sees the chunk being meshed.
pub struct Isolated;

impl BlockSource for Isolated {
    #[inline]
    fn block_at(&self, chunk: &ChunkData, local: IVec3) -> BlockType {
        chunk.get_local(local).unwrap_or(BlockType::Nothing)
    }
}

/// Turns a populated chunk into geometry. Must be safe to call concurrently for distinct chunks.
pub trait MeshBuilder: Send + Sync {
    fn get_mesh_data(&self, chunk: &ChunkData, blocks: &dyn BlockSource) -> MeshData;
}

/// Emits one quad per block face that borders a see-through neighbour.
#[derive(Clone, Copy, Debug, Default)]
pub struct FaceMesher;

impl FaceMesher {
    #[inline]
    fn face_visible(block: BlockType, face: Face, neighbour: BlockType) -> bool {
        if block == BlockType::Water {
            return face == Face::PosY && neighbour == BlockType::Air;
        }
        neighbour.is_transparent() && neighbour != block
    }
}

impl MeshBuilder for FaceMesher {
    fn get_mesh_data(&self, chunk: &ChunkData, blocks: &dyn BlockSource) -> MeshData {
        let mut mesh = MeshData::default();
        for local in chunk.positions() {
            let block = chunk.blocks[chunk.idx(local.x, local.y, local.z)];
            if matches!(block, BlockType::Air | BlockType::Nothing) {
                continue;
            }
            for face in Face::ALL {
                let neighbour = blocks.block_at(chunk, local + face.delta());
                if !Self::face_visible(block, face, neighbour) {
                    continue;
                }
                let tile = tiles::tile_for(block, face);
                mesh.add_face(face, Vec3::from(local), tile, block.is_solid());
            }
        }
        log::trace!(
            "meshed chunk {:?}: {} quads",
            chunk.pos.origin(),
            mesh.quad_count()
        );
        mesh
    }
}
