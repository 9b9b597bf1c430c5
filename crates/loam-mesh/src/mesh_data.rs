use loam_geom::{Face, Vec3};

/// Geometry produced for one chunk: render buffers plus the collision subset.
///
/// Positions are chunk-local.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<[f32; 2]>,
    pub triangles: Vec<u32>,
    pub collider_vertices: Vec<Vec3>,
    pub collider_triangles: Vec<u32>,
}

/// Atlas tiles per row.
pub(crate) const ATLAS_TILES: f32 = 16.0;
const UV_INSET: f32 = 0.001;

impl MeshData {
    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Appends the quad covering `face` of the unit cube centred on `center`.
    pub fn add_face(&mut self, face: Face, center: Vec3, tile: (u8, u8), collider: bool) {
        let corners = face_corners(face, center);
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&corners);
        self.triangles
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        self.uvs.extend_from_slice(&tile_uvs(tile));
        if collider {
            let cbase = self.collider_vertices.len() as u32;
            self.collider_vertices.extend_from_slice(&corners);
            self.collider_triangles.extend_from_slice(&[
                cbase,
                cbase + 1,
                cbase + 2,
                cbase,
                cbase + 2,
                cbase + 3,
            ]);
        }
    }
}

/// Corners in counter-clockwise order seen from outside the cube.
fn face_corners(face: Face, c: Vec3) -> [Vec3; 4] {
    let v = |x: f32, y: f32, z: f32| c + Vec3::new(x, y, z);
    match face {
        Face::PosY => [
            v(-0.5, 0.5, 0.5),
            v(0.5, 0.5, 0.5),
            v(0.5, 0.5, -0.5),
            v(-0.5, 0.5, -0.5),
        ],
        Face::NegY => [
            v(-0.5, -0.5, -0.5),
            v(0.5, -0.5, -0.5),
            v(0.5, -0.5, 0.5),
            v(-0.5, -0.5, 0.5),
        ],
        Face::PosX => [
            v(0.5, -0.5, -0.5),
            v(0.5, 0.5, -0.5),
            v(0.5, 0.5, 0.5),
            v(0.5, -0.5, 0.5),
        ],
        Face::NegX => [
            v(-0.5, -0.5, 0.5),
            v(-0.5, 0.5, 0.5),
            v(-0.5, 0.5, -0.5),
            v(-0.5, -0.5, -0.5),
        ],
        Face::PosZ => [
            v(0.5, -0.5, 0.5),
            v(0.5, 0.5, 0.5),
            v(-0.5, 0.5, 0.5),
            v(-0.5, -0.5, 0.5),
        ],
        Face::NegZ => [
            v(-0.5, -0.5, -0.5),
            v(-0.5, 0.5, -0.5),
            v(0.5, 0.5, -0.5),
            v(0.5, -0.5, -0.5),
        ],
    }
}

fn tile_uvs((tx, ty): (u8, u8)) -> [[f32; 2]; 4] {
    let step = 1.0 / ATLAS_TILES;
    let u0 = f32::from(tx) * step + UV_INSET;
    let v0 = f32::from(ty) * step + UV_INSET;
    let u1 = (f32::from(tx) + 1.0) * step - UV_INSET;
    let v1 = (f32::from(ty) + 1.0) * step - UV_INSET;
    [[u0, v0], [u0, v1], [u1, v1], [u1, v0]]
}
