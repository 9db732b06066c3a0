//! wgpu render backend for the melt scene.
//!
//! Draws the deforming mesh with a standard metal/rough material lit by an
//! ambient term and point lights. The camera orbits its target with damped
//! drag rotation and panning, and scroll zoom.
//!
//! # Invariants
//! - The vertex buffer is rewritten only when the live mesh is flagged for
//!   upload, and the flag is cleared right after.
//! - Camera motion is outside the displacement kernel.
//! - Uniform layout here and in the WGSL source match field for field.

mod camera;
mod gpu;
mod shaders;

pub use camera::OrbitCamera;
pub use gpu::{MAX_LIGHTS, WgpuRenderer};

pub fn crate_info() -> &'static str {
    "melt-render-wgpu v0.1.0"
}
