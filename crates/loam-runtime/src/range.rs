//! Which chunk positions must exist around an observer.

use hashbrown::HashSet;
use loam_geom::IVec3;
use loam_world::{BlockPos, ChunkDims, ChunkPos};

/// Positions an observer requires, in enumeration order without duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeededPositions {
    pub render: Vec<ChunkPos>,
    pub data: Vec<ChunkPos>,
}

/// Renders within `drawing_range` chunks of the observer; data one ring wider.
pub fn compute_needed(dims: ChunkDims, drawing_range: i32, observer: BlockPos) -> NeededPositions {
    NeededPositions {
        render: positions_around(dims, drawing_range, observer),
        data: positions_around(dims, drawing_range.saturating_add(1), observer),
    }
}

/// Walks X/Z in `size` steps from `observer - radius*size` to `observer + radius*size`,
/// aligning each candidate. Columns whose candidate lies within one chunk of the observer
/// also get layers from one chunk height below zero down to two chunk heights below the
/// observer. Candidates outside block coordinates are skipped.
pub fn positions_around(dims: ChunkDims, radius: i32, observer: BlockPos) -> Vec<ChunkPos> {
    let size = i64::from(dims.size);
    let height = i64::from(dims.height);
    let (ox, oy, oz) = (
        i64::from(observer.x),
        i64::from(observer.y),
        i64::from(observer.z),
    );
    let reach = i64::from(radius) * size;

    let mut seen: HashSet<ChunkPos> = HashSet::new();
    let mut out = Vec::new();
    let mut push = |x: i64, y: i64, z: i64| {
        let (Ok(x), Ok(y), Ok(z)) = (i32::try_from(x), i32::try_from(y), i32::try_from(z)) else {
            return;
        };
        let p = dims.align(IVec3::new(x, y, z));
        if seen.insert(p) {
            out.push(p);
        }
    };

    let mut x = ox - reach;
    while x <= ox + reach {
        let mut z = oz - reach;
        while z <= oz + reach {
            push(x, 0, z);
            let near = (ox - size..=ox + size).contains(&x) && (oz - size..=oz + size).contains(&z);
            if near {
                let mut y = -height;
                while y >= oy - 2 * height {
                    push(x, y, z);
                    y -= height;
                }
            }
            z += size;
        }
        x += size;
    }
    out
}
