use crate::camera::OrbitCamera;
use crate::shaders;
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use melt_kernel::FrameView;
use melt_render::{SceneDescription, Shading};
use wgpu::util::DeviceExt;

/// Point lights beyond this count are ignored. Must match the WGSL constant.
pub const MAX_LIGHTS: usize = 4;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    base_color: [f32; 4],
    emissive: [f32; 4],
    ambient: [f32; 4],
    light_pos: [[f32; 4]; MAX_LIGHTS],
    light_color: [[f32; 4]; MAX_LIGHTS],
}

impl Uniforms {
    /// Scene-constant part; camera and model are filled per frame.
    fn from_scene(scene: &SceneDescription) -> Self {
        let m = &scene.material;
        let [r, g, b] = m.color.to_linear();
        let [er, eg, eb] = m.emissive.scaled(m.emissive_intensity);
        let [ar, ag, ab] = scene.ambient.color.scaled(scene.ambient.intensity);

        let lights = &scene.point_lights[..scene.point_lights.len().min(MAX_LIGHTS)];
        if lights.len() < scene.point_lights.len() {
            tracing::warn!(
                requested = scene.point_lights.len(),
                max = MAX_LIGHTS,
                "too many point lights, extra lights ignored"
            );
        }
        let mut light_pos = [[0.0; 4]; MAX_LIGHTS];
        let mut light_color = [[0.0; 4]; MAX_LIGHTS];
        for (i, light) in lights.iter().enumerate() {
            let p = light.position;
            light_pos[i] = [p.x, p.y, p.z, light.range];
            let [lr, lg, lb] = light.color.scaled(light.intensity);
            light_color[i] = [lr, lg, lb, 0.0];
        }

        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            model: Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: [0.0, 0.0, 0.0, 1.0],
            base_color: [r, g, b, m.metalness],
            emissive: [er, eg, eb, m.roughness],
            ambient: [ar, ag, ab, lights.len() as f32],
            light_pos,
            light_color,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct MeshVertex {
    position: [f32; 3],
    normal: [f32; 3],
}

/// wgpu renderer for the deforming mesh.
pub struct WgpuRenderer {
    pipeline: wgpu::RenderPipeline,
    uniforms: Uniforms,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    vertex_count: u32,
    depth_texture: wgpu::TextureView,
    clear_color: wgpu::Color,
    shading: Shading,
    // Reused across uploads
    staging: Vec<MeshVertex>,
    normals: Vec<Vec3>,
}

impl WgpuRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        scene: &SceneDescription,
        vertex_capacity: usize,
    ) -> Self {
        let uniforms = Uniforms::from_scene(scene);
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("uniform_buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::MESH_SHADER.into()),
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mesh_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<MeshVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x3,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = Self::create_vertex_buffer(device, vertex_capacity);
        let depth_texture = Self::create_depth_texture(device, width, height);

        let [r, g, b] = scene.background.to_linear();
        let clear_color = wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        };

        tracing::debug!(
            vertex_capacity,
            lights = scene.point_lights.len(),
            shading = ?scene.shading,
            "mesh renderer created"
        );

        Self {
            pipeline,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            vertex_capacity,
            vertex_count: 0,
            depth_texture,
            clear_color,
            shading: scene.shading,
            staging: Vec::with_capacity(vertex_capacity),
            normals: Vec::new(),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    /// Render one frame: upload the live mesh if it changed, then draw it.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        frame: &mut FrameView<'_>,
    ) {
        if frame.geometry.needs_upload() {
            self.upload(device, queue, frame);
        }

        let eye = camera.eye();
        self.uniforms.view_proj = camera.view_projection().to_cols_array_2d();
        self.uniforms.model = frame.transform.matrix().to_cols_array_2d();
        self.uniforms.camera_pos = [eye.x, eye.y, eye.z, 1.0];
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if self.vertex_count > 0 {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
                pass.draw(0..self.vertex_count, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    /// Interleave positions with the normals for the current shading mode and
    /// write them to the vertex buffer, growing it if needed.
    fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: &mut FrameView<'_>) {
        let positions = frame.geometry.positions();
        let normals: &[Vec3] = match self.shading {
            Shading::Smooth => frame.base.normals(),
            Shading::Flat => {
                frame.geometry.flat_normals_into(&mut self.normals);
                &self.normals
            }
        };

        self.staging.clear();
        self.staging
            .extend(positions.iter().zip(normals).map(|(p, n)| MeshVertex {
                position: p.to_array(),
                normal: n.to_array(),
            }));

        if self.staging.len() > self.vertex_capacity {
            tracing::debug!(
                old = self.vertex_capacity,
                new = self.staging.len(),
                "growing vertex buffer"
            );
            self.vertex_capacity = self.staging.len();
            self.vertex_buffer = Self::create_vertex_buffer(device, self.vertex_capacity);
        }
        if !self.staging.is_empty() {
            queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&self.staging));
        }
        self.vertex_count = self.staging.len() as u32;

        frame.geometry.mark_uploaded();
    }

    fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("mesh_vertex_buffer"),
            size: (capacity.max(1) * std::mem::size_of::<MeshVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_layout_is_std140_friendly() {
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
        assert_eq!(std::mem::size_of::<Uniforms>(), 64 * 2 + 16 * 4 + 16 * 2 * MAX_LIGHTS);
        assert_eq!(std::mem::size_of::<MeshVertex>(), 24);
    }

    #[test]
    fn uniforms_pack_scene_constants() {
        let scene = SceneDescription::default();
        let u = Uniforms::from_scene(&scene);
        assert_eq!(u.base_color[3], 0.5);
        assert_eq!(u.emissive[3], 0.2);
        assert_eq!(u.ambient[3], 2.0);
        assert_eq!(u.light_pos[0], [5.0, 3.0, 5.0, 100.0]);
        assert_eq!(u.light_pos[1], [-5.0, -3.0, 5.0, 100.0]);
        assert_eq!(u.light_pos[2], [0.0; 4]);
        // 0xff0066 has a full red channel
        assert!((u.light_color[0][0] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn extra_lights_are_dropped() {
        let mut scene = SceneDescription::default();
        let light = scene.point_lights[0];
        scene.point_lights = vec![light; MAX_LIGHTS + 2];
        let u = Uniforms::from_scene(&scene);
        assert_eq!(u.ambient[3], MAX_LIGHTS as f32);
    }

    #[test]
    fn shader_declares_matching_light_count() {
        assert!(shaders::MESH_SHADER.contains(&format!("MAX_LIGHTS: u32 = {MAX_LIGHTS}u")));
        assert!(shaders::MESH_SHADER.contains("fn vs_main"));
        assert!(shaders::MESH_SHADER.contains("fn fs_main"));
    }
}
