//! Polyhedron builders: the base meshes the displacement kernel deforms.
//!
//! # Invariants
//! - Output is a non-indexed triangle list: vertices `3k..3k+3` form triangle `k`.
//! - Every vertex lies on the sphere of the requested radius.
//! - Normals are the radial directions of their vertices.

mod polyhedron;

pub use polyhedron::{GeometryError, MAX_DETAIL, PolyMesh, icosahedron, vertex_count};

pub fn crate_info() -> &'static str {
    "melt-geometry v0.1.0"
}
