//! Melt kernel: noise-driven radial displacement of a base mesh and the frame
//! driver that animates it.
//!
//! # Invariants
//! - The base mesh is captured once and never mutated.
//! - Every frame recomputes the live mesh entirely from the base mesh and the
//!   elapsed time; nothing accumulates across frames.
//! - Live and base meshes always have the same vertex count.
//! - All time-dependent behavior uses elapsed time, never frame count.
//! - A vertex at the exact center is never displaced.

pub mod clock;
pub mod displace;
pub mod driver;
pub mod field;
pub mod geometry;
pub mod params;

pub use clock::{Clock, ManualClock, WallClock};
pub use displace::{DisplacementEngine, DisplacementSample};
pub use driver::{
    DriverError, DriverState, FrameDriver, FrameHost, FrameSink, FrameStats, FrameView,
    ROTATION_RATE, SimulatedHost,
};
pub use field::{NoiseSource, SimplexNoise};
pub use geometry::{BaseGeometry, LiveGeometry};
pub use melt_geometry::GeometryError;
pub use params::{AnimationParameters, ParamError};

/// Subdivision level of the default base mesh.
pub const DEFAULT_DETAIL: u32 = 4;
/// Radius of the default base mesh.
pub const DEFAULT_RADIUS: f32 = 1.0;

pub fn crate_info() -> &'static str {
    "melt-kernel v0.1.0"
}
