use glam::Vec3;
use melt_common::Rgb;
use serde::{Deserialize, Serialize};

/// Standard (metal/rough) surface material.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialDesc {
    pub color: Rgb,
    pub metalness: f32,
    pub roughness: f32,
    pub emissive: Rgb,
    pub emissive_intensity: f32,
}

impl Default for MaterialDesc {
    fn default() -> Self {
        Self {
            color: Rgb::from_hex(0x00aaff),
            metalness: 0.5,
            roughness: 0.2,
            emissive: Rgb::from_hex(0x004466),
            emissive_intensity: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f32,
}

/// Point light with linear falloff to zero at `range`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub color: Rgb,
    pub intensity: f32,
    pub range: f32,
    pub position: Vec3,
}

impl PointLight {
    /// Intensity reaching a point `distance` away.
    pub fn attenuation(&self, distance: f32) -> f32 {
        if self.range <= 0.0 {
            return self.intensity;
        }
        self.intensity * (1.0 - distance / self.range).clamp(0.0, 1.0)
    }
}

/// Perspective camera settings. Angles in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraDesc {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: Vec3,
    pub target: Vec3,
}

impl Default for CameraDesc {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            eye: Vec3::new(0.0, 0.0, 5.0),
            target: Vec3::ZERO,
        }
    }
}

/// Which normals the mesh is shaded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Shading {
    /// Radial normals of the undeformed mesh.
    #[default]
    Smooth,
    /// Per-triangle normals of the deformed mesh, recomputed each upload.
    Flat,
}

/// Everything about the scene that is not the vertex buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDescription {
    pub background: Rgb,
    pub material: MaterialDesc,
    pub ambient: AmbientLight,
    pub point_lights: Vec<PointLight>,
    pub camera: CameraDesc,
    pub shading: Shading,
}

impl Default for SceneDescription {
    fn default() -> Self {
        Self {
            background: Rgb::BLACK,
            material: MaterialDesc::default(),
            ambient: AmbientLight {
                color: Rgb::from_hex(0x404040),
                intensity: 1.0,
            },
            point_lights: vec![
                PointLight {
                    color: Rgb::from_hex(0xff0066),
                    intensity: 1.0,
                    range: 100.0,
                    position: Vec3::new(5.0, 3.0, 5.0),
                },
                PointLight {
                    color: Rgb::from_hex(0x0066ff),
                    intensity: 1.0,
                    range: 100.0,
                    position: Vec3::new(-5.0, -3.0, 5.0),
                },
            ],
            camera: CameraDesc::default(),
            shading: Shading::Smooth,
        }
    }
}

impl SceneDescription {
    pub fn with_shading(mut self, shading: Shading) -> Self {
        self.shading = shading;
        self
    }
}

/// Output surface size in physical pixels plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32, scale_factor: f64) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            scale_factor,
        }
    }

    /// Apply a host resize. Zero dimensions are clamped to one pixel.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        tracing::debug!(width = self.width, height = self.height, "viewport resized");
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280, 720, 1.0)
    }
}
