use loam_geom::Face;
use loam_world::BlockType;

/// Atlas tile (column, row) for one face of a block.
pub(crate) fn tile_for(block: BlockType, face: Face) -> (u8, u8) {
    match (block, face) {
        (BlockType::GrassDirt, Face::PosY) => (0, 0),
        (BlockType::GrassDirt, Face::NegY) => (2, 0),
        (BlockType::GrassDirt, _) => (3, 0),
        (BlockType::Dirt, _) => (2, 0),
        (BlockType::GrassStone, Face::PosY) => (0, 0),
        (BlockType::GrassStone, Face::NegY) => (1, 0),
        (BlockType::GrassStone, _) => (4, 0),
        (BlockType::Stone, _) => (1, 0),
        (BlockType::TreeTrunk, Face::PosY | Face::NegY) => (5, 1),
        (BlockType::TreeTrunk, _) => (4, 1),
        (BlockType::TreeLeavesTransparent, _) => (4, 3),
        (BlockType::TreeLeavesSolid, _) => (5, 3),
        (BlockType::Water, _) => (13, 12),
        (BlockType::Sand, _) => (2, 1),
        (BlockType::Air | BlockType::Nothing, _) => (15, 15),
    }
}
