use loam_edit::{edge_neighbours, touched_faces};
use loam_geom::IVec3;
use loam_world::ChunkDims;
use proptest::prelude::*;

proptest! {
    #[test]
    fn neighbours_are_face_adjacent_and_distinct(
        x in -64i32..64, y in -200i32..200, z in -64i32..64,
        size in 2i32..20, height in 2i32..120,
    ) {
        let dims = ChunkDims::new(size, height);
        let world = IVec3::new(x, y, z);
        let owner = dims.align(world);
        let faces = touched_faces(dims, world);
        let neighbours = edge_neighbours(dims, world);

        prop_assert_eq!(neighbours.len(), faces.len());
        prop_assert_eq!(faces.is_empty(), !dims.on_edge(world - owner.origin()));
        for n in &neighbours {
            prop_assert_ne!(*n, owner);
            let d = n.origin() - owner.origin();
            let steps = [d.x.abs() / size, d.y.abs() / height, d.z.abs() / size];
            prop_assert_eq!(steps.iter().sum::<i32>(), 1);
        }
    }
}
