use loam_chunk::ChunkData;
use loam_geom::IVec3;
use loam_runtime::ChunkIndex;
use loam_world::{BlockType, ChunkDims, ChunkPos, WorldId};
use proptest::prelude::*;

const DIMS: ChunkDims = ChunkDims::new(4, 6);
const KINDS: [BlockType; 4] = [
    BlockType::Air,
    BlockType::Stone,
    BlockType::Water,
    BlockType::TreeLeavesSolid,
];

/// 3x2x3 chunks with origins from (-4, -6, -4) to (4, 0, 4).
fn grid(fill: &[u8]) -> ChunkIndex {
    let mut index = ChunkIndex::new(DIMS);
    let mut i = 0;
    for cx in -1..=1 {
        for cy in -1..=0 {
            for cz in -1..=1 {
                let pos = ChunkPos::new(cx * DIMS.size, cy * DIMS.height, cz * DIMS.size);
                let mut chunk = ChunkData::new(DIMS, WorldId(3), pos);
                for b in chunk.blocks.iter_mut() {
                    *b = KINDS[(fill[i % fill.len()] % 4) as usize];
                    i += 1;
                }
                index.insert(chunk);
            }
        }
    }
    index
}

proptest! {
    #[test]
    fn reads_agree_across_frames(
        fill in prop::collection::vec(any::<u8>(), 1..64),
        world in (-8i32..12, -12i32..12, -8i32..12).prop_map(|(x, y, z)| IVec3::new(x, y, z)),
        frame in (-1i32..=1, -1i32..=0, -1i32..=1),
    ) {
        let index = grid(&fill);
        let direct = index.block_at_world(world);

        let owner = DIMS.align(world);
        if let Some(chunk) = index.get(owner) {
            prop_assert_eq!(chunk.get_local(world - owner.origin()), Some(direct));
        } else {
            prop_assert_eq!(direct, BlockType::Nothing);
        }

        let frame_pos = ChunkPos::new(frame.0 * DIMS.size, frame.1 * DIMS.height, frame.2 * DIMS.size);
        let reference = index.get(frame_pos).cloned().unwrap();
        let via = index.get_block(&reference, world - frame_pos.origin());
        prop_assert_eq!(via, direct);
    }

    #[test]
    fn forwarded_write_is_visible_from_every_frame(
        world in (-8i32..12, -12i32..12, -8i32..12).prop_map(|(x, y, z)| IVec3::new(x, y, z)),
        frame in (-1i32..=1, -1i32..=0, -1i32..=1),
    ) {
        let mut index = grid(&[0]);
        let frame_pos = ChunkPos::new(frame.0 * DIMS.size, frame.1 * DIMS.height, frame.2 * DIMS.size);
        let resident = index.get(DIMS.align(world)).is_some();
        let written = index.set_block(frame_pos, world - frame_pos.origin(), BlockType::Sand);
        prop_assert_eq!(written, resident);
        let expected = if resident { BlockType::Sand } else { BlockType::Nothing };
        prop_assert_eq!(index.block_at_world(world), expected);
    }
}
