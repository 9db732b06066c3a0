use crate::action::Action;

/// Mouse buttons the mapper cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Lines scrolled per pixel of trackpad scroll.
const PIXELS_PER_LINE: f32 = 40.0;

/// Stateful mapping from pointer events to [`Action`]s.
///
/// Primary drag orbits, secondary drag pans, scrolling zooms and a middle
/// press resets the camera. Only one drag is active at a time; the button
/// that started it ends it.
#[derive(Debug, Default)]
pub struct PointerMapper {
    drag: Option<PointerButton>,
    last_cursor: Option<(f64, f64)>,
}

impl PointerMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn button(&mut self, button: PointerButton, pressed: bool) -> Action {
        match button {
            PointerButton::Primary | PointerButton::Secondary => {
                if pressed && self.drag.is_none() {
                    self.drag = Some(button);
                } else if !pressed && self.drag == Some(button) {
                    self.drag = None;
                }
                tracing::trace!(?button, pressed, "drag");
                Action::Noop
            }
            PointerButton::Middle if pressed => Action::ResetCamera,
            PointerButton::Middle => Action::Noop,
        }
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) -> Action {
        let Some((px, py)) = self.last_cursor.replace((x, y)) else {
            return Action::Noop;
        };
        let (dx, dy) = ((x - px) as f32, (y - py) as f32);
        match self.drag {
            Some(PointerButton::Primary) => Action::Orbit { dx, dy },
            Some(PointerButton::Secondary) => Action::Pan { dx, dy },
            _ => Action::Noop,
        }
    }

    /// Pointer left the window; the next move must not produce a jump.
    pub fn cursor_left(&mut self) {
        self.last_cursor = None;
    }

    /// Wheel notches. Positive scrolls away from the user and zooms in.
    pub fn scroll_lines(&mut self, lines: f32) -> Action {
        if lines == 0.0 {
            Action::Noop
        } else {
            Action::Zoom(lines)
        }
    }

    /// Trackpad scroll in pixels.
    pub fn scroll_pixels(&mut self, pixels: f64) -> Action {
        self.scroll_lines(pixels as f32 / PIXELS_PER_LINE)
    }
}
