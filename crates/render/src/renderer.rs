use melt_kernel::{FrameSink, FrameView};

use crate::scene::SceneDescription;

/// Renderer-agnostic interface. Backends consume the scene description and
/// the current frame and produce some output.
///
/// A renderer that consumes the live vertex buffer must clear its upload flag.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&mut self, scene: &SceneDescription, frame: &mut FrameView<'_>) -> Self::Output;
}

/// Debug text renderer for headless runs.
///
/// Produces a human-readable description of the frame instead of pixels.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, scene: &SceneDescription, frame: &mut FrameView<'_>) -> String {
        let positions = frame.geometry.positions();
        let (min_r, max_r) = positions
            .iter()
            .map(|p| p.length())
            .fold((f32::INFINITY, 0.0_f32), |(lo, hi), r| (lo.min(r), hi.max(r)));
        let (min_r, max_r) = if positions.is_empty() {
            (0.0, 0.0)
        } else {
            (min_r, max_r)
        };

        let mut out = String::new();
        out.push_str(&format!(
            "=== Frame {} (t={:.3}s, dt={:.3}s) ===\n",
            frame.index, frame.elapsed, frame.delta
        ));
        out.push_str(&format!(
            "Vertices: {}{}\n",
            positions.len(),
            if frame.geometry.needs_upload() {
                " (updated)"
            } else {
                ""
            }
        ));
        let (axis, angle) = frame.transform.rotation.to_axis_angle();
        out.push_str(&format!(
            "Rotation: {:.3} rad about ({:.1}, {:.1}, {:.1})\n",
            angle, axis.x, axis.y, axis.z
        ));
        out.push_str(&format!("Radius: min={min_r:.3} max={max_r:.3}\n"));
        let cam = &scene.camera;
        out.push_str(&format!(
            "Camera: eye=({:.1}, {:.1}, {:.1}) fov={:.0} shading={:?}\n",
            cam.eye.x, cam.eye.y, cam.eye.z, cam.fov_degrees, scene.shading
        ));

        frame.geometry.mark_uploaded();
        out
    }
}

/// Adapts a [`Renderer`] plus a fixed scene into a [`FrameSink`] the frame
/// driver can call. Keeps the output of the most recent frame.
pub struct Presenter<R: Renderer> {
    scene: SceneDescription,
    renderer: R,
    last: Option<R::Output>,
    presented: u64,
}

impl<R: Renderer> Presenter<R> {
    pub fn new(scene: SceneDescription, renderer: R) -> Self {
        Self {
            scene,
            renderer,
            last: None,
            presented: 0,
        }
    }

    pub fn scene(&self) -> &SceneDescription {
        &self.scene
    }

    pub fn last_output(&self) -> Option<&R::Output> {
        self.last.as_ref()
    }

    pub fn take_output(&mut self) -> Option<R::Output> {
        self.last.take()
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl<R: Renderer> FrameSink for Presenter<R> {
    fn present(&mut self, frame: &mut FrameView<'_>) {
        self.last = Some(self.renderer.render(&self.scene, frame));
        self.presented += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Shading;
    use melt_kernel::{
        AnimationParameters, BaseGeometry, DisplacementEngine, FrameDriver, ManualClock,
        SimplexNoise, SimulatedHost,
    };

    fn driver() -> FrameDriver<SimplexNoise, ManualClock> {
        let engine =
            DisplacementEngine::new(AnimationParameters::default(), SimplexNoise::new(0)).unwrap();
        let base = BaseGeometry::icosphere(1.0, 2).unwrap();
        FrameDriver::new(engine, base, ManualClock::new())
    }

    #[test]
    fn debug_renderer_describes_frame() {
        let mut d = driver();
        let mut presenter = Presenter::new(SceneDescription::default(), DebugTextRenderer::new());
        d.start();
        d.tick(&mut presenter).unwrap();

        let output = presenter.last_output().unwrap();
        assert!(output.contains("Frame 0"));
        assert!(output.contains("Vertices: 540 (updated)"));
        assert!(output.contains("fov=75"));
        assert!(!d.live().needs_upload());
    }

    #[test]
    fn presenter_counts_frames() {
        let mut d = driver();
        let mut presenter = Presenter::new(
            SceneDescription::default().with_shading(Shading::Flat),
            DebugTextRenderer::new(),
        );
        d.run(&mut SimulatedHost::fixed_rate(3, 30.0), &mut presenter)
            .unwrap();
        assert_eq!(presenter.presented(), 3);
        let last = presenter.take_output().unwrap();
        assert!(last.contains("Frame 2"));
        assert!(last.contains("Flat"));
        assert!(presenter.last_output().is_none());
    }

    #[test]
    fn scene_is_kept() {
        let presenter = Presenter::new(SceneDescription::default(), DebugTextRenderer::new());
        assert_eq!(presenter.scene().camera.fov_degrees, 75.0);
        assert_eq!(presenter.presented(), 0);
    }
}
