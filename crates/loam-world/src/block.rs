/// Block-type value stored per voxel.
///
/// `Nothing` is the sentinel returned when a lookup lands in a chunk that is not resident;
/// it is never written into a generated chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlockType {
    Nothing,
    #[default]
    Air,
    GrassDirt,
    Dirt,
    GrassStone,
    Stone,
    TreeTrunk,
    TreeLeavesTransparent,
    TreeLeavesSolid,
    Water,
    Sand,
}

impl BlockType {
    #[inline]
    pub fn is_solid(self) -> bool {
        !matches!(
            self,
            BlockType::Nothing | BlockType::Air | BlockType::Water
        )
    }

    /// True when a solid neighbour must still draw the face it shares with this block.
    #[inline]
    pub fn is_transparent(self) -> bool {
        matches!(
            self,
            BlockType::Nothing
                | BlockType::Air
                | BlockType::Water
                | BlockType::TreeLeavesTransparent
        )
    }
}
