//! Input mapping: pointer gestures become camera actions.
//!
//! # Invariants
//! - Consumers see [`Action`]s, never raw window events.
//! - Input only moves the camera; it never touches the mesh or its animation.

pub mod action;
pub mod pointer;

pub use action::Action;
pub use pointer::{PointerButton, PointerMapper};

pub fn crate_info() -> &'static str {
    "melt-input v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("input"));
    }
}
