use loam_geom::IVec3;

/// Decoration byproducts recorded while generating a chunk.
///
/// Positions are chunk-local and may fall outside the chunk; the post-process pass forwards
/// those writes into the neighbouring chunk that owns them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TreeData {
    pub trunks: Vec<IVec3>,
    pub leaves_solid: Vec<IVec3>,
}

impl TreeData {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trunks.is_empty() && self.leaves_solid.is_empty()
    }
}

/// Leaf offsets relative to the top trunk block.
pub(crate) fn leaf_offsets() -> impl Iterator<Item = IVec3> {
    let wide = (-1..=0).flat_map(|dy| {
        (-2..=2).flat_map(move |dx| {
            (-2..=2).filter_map(move |dz| {
                let corner = dx * dx == 4 && dz * dz == 4;
                let trunk = dx == 0 && dz == 0;
                (!corner && !trunk).then_some(IVec3::new(dx, dy, dz))
            })
        })
    });
    let narrow = (-1..=1).flat_map(|dx| (-1..=1).map(move |dz| IVec3::new(dx, 1, dz)));
    let cap = [
        IVec3::new(0, 2, 0),
        IVec3::new(1, 2, 0),
        IVec3::new(-1, 2, 0),
        IVec3::new(0, 2, 1),
        IVec3::new(0, 2, -1),
    ];
    wide.chain(narrow).chain(cap)
}
