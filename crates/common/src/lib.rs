//! Shared types used by the kernel, the render adapters and the apps.
//!
//! # Invariants
//! - Types here carry no behavior tied to a particular backend.

mod types;

pub use types::{Rgb, Transform};

pub fn crate_info() -> &'static str {
    "melt-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
