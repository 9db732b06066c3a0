/// A high-level camera action produced from user input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Orbit around the target by a pointer delta in pixels.
    Orbit { dx: f32, dy: f32 },
    /// Slide the orbit target in the view plane by a pointer delta in pixels.
    Pan { dx: f32, dy: f32 },
    /// Zoom by scroll units; positive moves closer.
    Zoom(f32),
    /// Return the camera to its startup pose.
    ResetCamera,
    /// No-op (input that is not bound to anything).
    Noop,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orbit_is_constructible() {
        let a = Action::Orbit { dx: 1.0, dy: -2.0 };
        assert!(matches!(a, Action::Orbit { dx, .. } if dx == 1.0));
        assert_ne!(a, Action::Pan { dx: 1.0, dy: -2.0 });
    }
}
