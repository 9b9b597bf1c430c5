use loam_chunk::ChunkData;
use loam_geom::IVec3;
use loam_world::{BlockType, ChunkDims, ChunkPos, WorldId};
use proptest::prelude::*;

fn dims() -> impl Strategy<Value = ChunkDims> {
    (1i32..=8, 1i32..=12).prop_map(|(s, h)| ChunkDims::new(s, h))
}

fn origin(d: ChunkDims) -> impl Strategy<Value = ChunkPos> {
    (-1000i32..=1000, -10i32..=10, -1000i32..=1000)
        .prop_map(move |(x, y, z)| ChunkPos::new(x * d.size, y * d.height, z * d.size))
}

fn chunk() -> impl Strategy<Value = ChunkData> {
    dims().prop_flat_map(|d| origin(d).prop_map(move |p| ChunkData::new(d, WorldId(1), p)))
}

proptest! {
    // idx maps each (x,y,z) within bounds to a unique in-range index and position inverts it
    #[test]
    fn idx_is_a_bijection(c in chunk()) {
        let expect = c.blocks.len();
        let mut seen = vec![false; expect];
        for z in 0..c.size() { for y in 0..c.height() { for x in 0..c.size() {
            let i = c.idx(x, y, z);
            prop_assert!(i < expect);
            prop_assert!(!seen[i]);
            seen[i] = true;
            prop_assert_eq!(c.position(i), IVec3::new(x, y, z));
        }}}
        prop_assert!(seen.into_iter().all(|b| b));
    }

    // the lazy walk visits exactly the linear order
    #[test]
    fn positions_follow_linear_order(c in chunk()) {
        let walk: Vec<_> = c.positions().collect();
        prop_assert_eq!(walk.len(), c.blocks.len());
        for (i, p) in walk.into_iter().enumerate() {
            prop_assert_eq!(c.idx(p.x, p.y, p.z), i);
        }
    }

    // contains_world matches the local-range predicate and get/set agree
    #[test]
    fn set_then_get_local(c in chunk(), x in -2i32..10, y in -2i32..14, z in -2i32..10) {
        let mut c = c;
        let local = IVec3::new(x, y, z);
        let inside = x >= 0 && x < c.size() && y >= 0 && y < c.height() && z >= 0 && z < c.size();
        prop_assert_eq!(c.contains_world(c.world_of(local)), inside);
        prop_assert_eq!(c.set_local(local, BlockType::Sand), inside);
        if inside {
            prop_assert_eq!(c.get_local(local), Some(BlockType::Sand));
        } else {
            prop_assert_eq!(c.get_local(local), None);
            prop_assert!(!c.has_non_air());
        }
    }
}
