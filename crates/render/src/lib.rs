//! Rendering Adapter: renderer-agnostic scene description and presenters.
//!
//! # Invariants
//! - Renderers never write vertex positions; they only consume the live mesh
//!   and clear its upload flag.
//! - The scene description is fixed at startup; only the viewport changes.
//!
//! The wgpu backend lives in `melt-render-wgpu`. This crate carries what every
//! backend agrees on plus a debug text renderer for headless runs and tests.

mod renderer;
mod scene;

pub use renderer::{DebugTextRenderer, Presenter, Renderer};
pub use scene::{
    AmbientLight, CameraDesc, MaterialDesc, PointLight, SceneDescription, Shading, Viewport,
};

pub fn crate_info() -> &'static str {
    "melt-render v0.1.0"
}
