use glam::Vec3;

/// Highest subdivision level accepted by the builders.
pub const MAX_DETAIL: u32 = 64;

/// Errors raised while building or importing base meshes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("radius must be positive and finite, got {0}")]
    InvalidRadius(f32),
    #[error("subdivision detail {detail} exceeds maximum {max}")]
    DetailTooHigh { detail: u32, max: u32 },
    #[error("flat position buffer length {0} is not a multiple of 3")]
    RaggedBuffer(usize),
}

/// Non-indexed triangle mesh with per-vertex normals.
#[derive(Debug, Clone, PartialEq)]
pub struct PolyMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
}

impl PolyMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Number of vertices produced by [`icosahedron`] at a given detail.
pub fn vertex_count(detail: u32) -> usize {
    let segments = detail as usize + 1;
    20 * segments * segments * 3
}

const ICOSAHEDRON_FACES: [[usize; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

fn icosahedron_vertices() -> [Vec3; 12] {
    let t = (1.0 + 5.0_f32.sqrt()) * 0.5;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
}

/// Build an icosahedron of `radius` whose faces are each split into
/// `(detail + 1)^2` triangles, then projected onto the sphere.
///
/// Winding is counter-clockwise seen from outside.
pub fn icosahedron(radius: f32, detail: u32) -> Result<PolyMesh, GeometryError> {
    if !(radius.is_finite() && radius > 0.0) {
        return Err(GeometryError::InvalidRadius(radius));
    }
    if detail > MAX_DETAIL {
        return Err(GeometryError::DetailTooHigh {
            detail,
            max: MAX_DETAIL,
        });
    }

    let verts = icosahedron_vertices();
    let mut positions = Vec::with_capacity(vertex_count(detail));
    for face in &ICOSAHEDRON_FACES {
        subdivide_face(
            verts[face[0]],
            verts[face[1]],
            verts[face[2]],
            detail,
            &mut positions,
        );
    }

    // Project onto the sphere
    for p in &mut positions {
        *p = p.normalize() * radius;
    }
    let normals = positions.iter().map(|p| p.normalize()).collect();

    tracing::debug!(
        radius,
        detail,
        vertices = positions.len(),
        "built icosahedron"
    );

    Ok(PolyMesh { positions, normals })
}

/// Split triangle `abc` into a grid of `(detail + 1)^2` flat triangles.
fn subdivide_face(a: Vec3, b: Vec3, c: Vec3, detail: u32, out: &mut Vec<Vec3>) {
    let cols = detail as usize + 1;

    // rows[i][j]: row i runs from the a-c edge to the b-c edge, shrinking toward c
    let mut rows: Vec<Vec<Vec3>> = Vec::with_capacity(cols + 1);
    for i in 0..=cols {
        let s = i as f32 / cols as f32;
        let aj = a.lerp(c, s);
        let bj = b.lerp(c, s);
        let len = cols - i;
        let row = (0..=len)
            .map(|j| {
                if len == 0 {
                    aj
                } else {
                    aj.lerp(bj, j as f32 / len as f32)
                }
            })
            .collect();
        rows.push(row);
    }

    for i in 0..cols {
        for j in 0..2 * (cols - i) - 1 {
            let k = j / 2;
            if j % 2 == 0 {
                out.push(rows[i][k + 1]);
                out.push(rows[i + 1][k]);
                out.push(rows[i][k]);
            } else {
                out.push(rows[i][k + 1]);
                out.push(rows[i + 1][k + 1]);
                out.push(rows[i + 1][k]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_zero_is_plain_icosahedron() {
        let mesh = icosahedron(1.0, 0).unwrap();
        assert_eq!(mesh.vertex_count(), 60);
        assert_eq!(mesh.triangle_count(), 20);
    }

    #[test]
    fn detail_four_vertex_count() {
        let mesh = icosahedron(1.0, 4).unwrap();
        assert_eq!(mesh.vertex_count(), 1500);
        assert_eq!(mesh.vertex_count(), vertex_count(4));
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[test]
    fn vertices_lie_on_sphere() {
        let mesh = icosahedron(2.5, 3).unwrap();
        for p in &mesh.positions {
            assert!((p.length() - 2.5).abs() < 1e-5);
        }
    }

    #[test]
    fn normals_are_radial_units() {
        let mesh = icosahedron(1.0, 2).unwrap();
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            assert!((n.length() - 1.0).abs() < 1e-5);
            assert!(p.normalize().dot(*n) > 0.9999);
        }
    }

    #[test]
    fn winding_faces_outward() {
        let mesh = icosahedron(1.0, 4).unwrap();
        for tri in mesh.positions.chunks_exact(3) {
            let n = (tri[1] - tri[0]).cross(tri[2] - tri[0]);
            let centroid = (tri[0] + tri[1] + tri[2]) / 3.0;
            assert!(n.dot(centroid) > 0.0);
        }
    }

    #[test]
    fn rejects_bad_radius() {
        assert_eq!(
            icosahedron(0.0, 1),
            Err(GeometryError::InvalidRadius(0.0))
        );
        assert!(icosahedron(f32::NAN, 1).is_err());
        assert!(icosahedron(-1.0, 1).is_err());
    }

    #[test]
    fn rejects_excessive_detail() {
        let err = icosahedron(1.0, MAX_DETAIL + 1).unwrap_err();
        assert!(matches!(err, GeometryError::DetailTooHigh { .. }));
        assert!(err.to_string().contains("exceeds"));
    }
}
