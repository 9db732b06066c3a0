use glam::{Mat4, Vec3};
use melt_render::CameraDesc;

/// Keeps the camera off the poles, where the up vector degenerates.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.017;

/// Camera orbiting a target point, with damped rotation and panning.
///
/// Drag input accumulates into a pending motion; each [`update`](Self::update)
/// applies a `damping` fraction of it and decays the rest, so motion eases
/// out after the pointer is released.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub target: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Radians per pixel of drag.
    pub rotate_speed: f32,
    /// Zoom exponent per scroll unit.
    pub zoom_speed: f32,
    /// Fraction of pending rotation applied per update, in `(0, 1]`.
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pending_yaw: f32,
    pending_pitch: f32,
    pending_pan: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::from_desc(&CameraDesc::default(), 16.0 / 9.0)
    }
}

impl OrbitCamera {
    /// Place the camera at `desc.eye`, orbiting `desc.target`.
    pub fn from_desc(desc: &CameraDesc, aspect: f32) -> Self {
        let offset = desc.eye - desc.target;
        let distance = offset.length().max(1e-3);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.z.atan2(offset.x);
        Self {
            target: desc.target,
            yaw,
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            distance,
            fov: desc.fov_degrees.to_radians(),
            aspect,
            near: desc.near,
            far: desc.far,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            damping: 0.05,
            min_distance: 1.5,
            max_distance: 50.0,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
            pending_pan: Vec3::ZERO,
        }
    }

    /// Queue a rotation from a pointer drag of `(dx, dy)` pixels.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.pending_yaw += dx * self.rotate_speed;
        self.pending_pitch += dy * self.rotate_speed;
    }

    /// Queue a pan from a drag of `(dx, dy)` pixels on a viewport
    /// `viewport_height` pixels tall. The target moves in the view plane so
    /// that the point under the cursor at the target's depth follows it.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: u32) {
        let forward = (self.target - self.eye()).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(forward);
        let world_per_pixel =
            2.0 * self.distance * (self.fov * 0.5).tan() / viewport_height.max(1) as f32;
        self.pending_pan += (up * dy - right * dx) * world_per_pixel;
    }

    /// Zoom by `scroll` units; positive moves closer.
    pub fn zoom(&mut self, scroll: f32) {
        let factor = (-scroll * self.zoom_speed).exp();
        self.distance = (self.distance * factor).clamp(self.min_distance, self.max_distance);
    }

    /// Advance damping by one frame.
    pub fn update(&mut self) {
        let k = self.damping.clamp(f32::EPSILON, 1.0);
        self.yaw += self.pending_yaw * k;
        self.pitch = (self.pitch + self.pending_pitch * k).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.target += self.pending_pan * k;
        self.pending_yaw *= 1.0 - k;
        self.pending_pitch *= 1.0 - k;
        self.pending_pan *= 1.0 - k;
    }

    pub fn eye(&self) -> Vec3 {
        self.target
            + self.distance
                * Vec3::new(
                    self.yaw.cos() * self.pitch.cos(),
                    self.pitch.sin(),
                    self.yaw.sin() * self.pitch.cos(),
                )
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect.max(1e-3), self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera_sits_on_positive_z() {
        let cam = OrbitCamera::default();
        assert!((cam.eye() - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-5);
        assert!((cam.fov - 75.0_f32.to_radians()).abs() < 1e-6);
        let vp = cam.view_projection();
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let cam = OrbitCamera::default();
        let clip = cam.view_projection() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5 && ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn rotation_is_damped() {
        let mut cam = OrbitCamera::default();
        let start = cam.yaw;
        cam.rotate(100.0, 0.0);
        cam.update();
        let first = cam.yaw - start;
        assert!((first - 100.0 * 0.005 * 0.05).abs() < 1e-6);
        cam.update();
        let second = cam.yaw - start - first;
        assert!(second < first && second > 0.0);

        for _ in 0..1000 {
            cam.update();
        }
        assert!((cam.yaw - start - 0.5).abs() < 1e-3);
        let settled = cam.yaw;
        cam.update();
        assert!((cam.yaw - settled).abs() < 1e-6);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut cam = OrbitCamera::default();
        cam.damping = 1.0;
        cam.rotate(0.0, 10_000.0);
        cam.update();
        assert!(cam.pitch <= PITCH_LIMIT);
        assert!(cam.eye().is_finite());
    }

    #[test]
    fn pan_moves_target_in_view_plane() {
        let mut cam = OrbitCamera::default();
        cam.damping = 1.0;
        let height = 720;
        cam.pan(100.0, 0.0, height);
        cam.update();
        // Eye on +Z looking at the origin: right is +X, dragging right moves the target left
        assert!(cam.target.x < 0.0);
        assert!(cam.target.y.abs() < 1e-5 && cam.target.z.abs() < 1e-5);
        let expected = 100.0 * 2.0 * 5.0 * (cam.fov * 0.5).tan() / height as f32;
        assert!((cam.target.x + expected).abs() < 1e-4);
        assert!((cam.eye() - cam.target - Vec3::new(0.0, 0.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn pan_is_damped() {
        let mut cam = OrbitCamera::default();
        cam.pan(0.0, 50.0, 500);
        cam.update();
        let first = cam.target.y;
        assert!(first > 0.0);
        for _ in 0..1000 {
            cam.update();
        }
        assert!(cam.target.y > first * 10.0);
    }

    #[test]
    fn zoom_respects_limits() {
        let mut cam = OrbitCamera::default();
        cam.zoom(1.0);
        assert!(cam.distance < 5.0);
        cam.zoom(1000.0);
        assert_eq!(cam.distance, cam.min_distance);
        cam.zoom(-1000.0);
        assert_eq!(cam.distance, cam.max_distance);
    }
}
