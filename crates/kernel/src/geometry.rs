use glam::Vec3;
use melt_geometry::{GeometryError, PolyMesh};

/// Immutable snapshot of the undeformed mesh, captured once at startup.
///
/// Vertex count and order never change after construction; there are no
/// mutable accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseGeometry {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
}

impl BaseGeometry {
    /// Capture a position list. Normals default to the radial direction.
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        let normals = positions.iter().map(|p| p.normalize_or_zero()).collect();
        Self { positions, normals }
    }

    /// Capture a flat `x0, y0, z0, x1, ...` buffer.
    pub fn from_flat(flat: &[f32]) -> Result<Self, GeometryError> {
        if flat.len() % 3 != 0 {
            return Err(GeometryError::RaggedBuffer(flat.len()));
        }
        let positions = flat
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect();
        Ok(Self::from_positions(positions))
    }

    /// Capture a built polyhedron, keeping its normals.
    pub fn from_mesh(mesh: PolyMesh) -> Self {
        Self {
            positions: mesh.positions,
            normals: mesh.normals,
        }
    }

    /// Subdivided icosahedron, the default base mesh.
    pub fn icosphere(radius: f32, detail: u32) -> Result<Self, GeometryError> {
        melt_geometry::icosahedron(radius, detail).map(Self::from_mesh)
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Per-frame deformed copy of a [`BaseGeometry`].
///
/// Holds no state across frames beyond the buffer allocation: every engine
/// pass rewrites all positions from the base. Length always matches the base
/// it was created from.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveGeometry {
    positions: Vec<Vec3>,
    needs_upload: bool,
}

impl LiveGeometry {
    pub fn from_base(base: &BaseGeometry) -> Self {
        Self {
            positions: base.positions.clone(),
            needs_upload: true,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True when positions changed since the consumer last called
    /// [`mark_uploaded`](Self::mark_uploaded).
    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    pub fn mark_uploaded(&mut self) {
        self.needs_upload = false;
    }

    /// Per-triangle normals of the deformed surface, repeated for each corner.
    ///
    /// Degenerate triangles and trailing vertices fall back to the radial
    /// direction.
    pub fn flat_normals(&self) -> Vec<Vec3> {
        let mut out = Vec::with_capacity(self.positions.len());
        self.flat_normals_into(&mut out);
        out
    }

    /// Same as [`flat_normals`](Self::flat_normals), reusing `out`.
    pub fn flat_normals_into(&self, out: &mut Vec<Vec3>) {
        out.clear();
        let mut tris = self.positions.chunks_exact(3);
        for tri in &mut tris {
            let n = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
            for p in tri {
                out.push(if n == Vec3::ZERO { p.normalize_or_zero() } else { n });
            }
        }
        out.extend(tris.remainder().iter().map(|p| p.normalize_or_zero()));
    }

    pub(crate) fn sync_len(&mut self, base: &BaseGeometry) {
        if self.positions.len() != base.len() {
            tracing::warn!(
                live = self.positions.len(),
                base = base.len(),
                "live geometry length drifted from base, resizing"
            );
            self.positions.clone_from(&base.positions);
        }
    }

    pub(crate) fn positions_mut(&mut self) -> &mut [Vec3] {
        &mut self.positions
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.needs_upload = true;
    }
}
