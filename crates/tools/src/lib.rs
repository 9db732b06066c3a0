//! Developer Tooling: geometry inspector and frame timing.
//!
//! # Invariants
//! - Tools are read-only with respect to the meshes they inspect.

mod inspector;
mod timer;

pub use inspector::{GeometryInspector, MeshSummary, VertexInfo};
pub use timer::{FrameTimer, TimingReport};

pub fn crate_info() -> &'static str {
    "melt-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
