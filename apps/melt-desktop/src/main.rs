use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use melt_input::{Action, PointerButton, PointerMapper};
use melt_kernel::{
    AnimationParameters, BaseGeometry, DEFAULT_DETAIL, DEFAULT_RADIUS, DisplacementEngine,
    FrameDriver, FrameSink, FrameView, SimplexNoise, WallClock,
};
use melt_render::{SceneDescription, Shading, Viewport};
use melt_render_wgpu::{OrbitCamera, WgpuRenderer};
use melt_tools::{FrameTimer, GeometryInspector, VertexInfo};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const REPORT_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "melt-desktop", about = "Melting sphere desktop viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width in physical pixels
    #[arg(long, default_value = "1280")]
    width: u32,

    /// Initial window height in physical pixels
    #[arg(long, default_value = "720")]
    height: u32,

    /// Noise seed
    #[arg(long, default_value = "0")]
    seed: u32,

    /// Shade with per-triangle normals of the deformed mesh
    #[arg(long)]
    flat: bool,
}

/// Application state.
struct AppState {
    driver: FrameDriver<SimplexNoise, WallClock>,
    camera: OrbitCamera,
    scene: SceneDescription,
    pointer: PointerMapper,
    timer: FrameTimer,
    viewport: Viewport,
    last_report: Instant,
    /// Base vertex with the smallest y, where melting shows first.
    lowest_vertex: usize,
}

impl AppState {
    fn new(cli: &Cli) -> Result<Self> {
        let engine =
            DisplacementEngine::new(AnimationParameters::default(), SimplexNoise::new(cli.seed))?;
        let base = BaseGeometry::icosphere(DEFAULT_RADIUS, DEFAULT_DETAIL)?;
        let shading = if cli.flat {
            Shading::Flat
        } else {
            Shading::Smooth
        };
        let scene = SceneDescription::default().with_shading(shading);
        let viewport = Viewport::new(cli.width, cli.height, 1.0);
        let camera = OrbitCamera::from_desc(&scene.camera, viewport.aspect());
        let lowest_vertex = base
            .positions()
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.y.total_cmp(&b.1.y))
            .map_or(0, |(i, _)| i);

        tracing::info!(
            vertices = base.len(),
            seed = cli.seed,
            ?shading,
            "scene created"
        );

        Ok(Self {
            driver: FrameDriver::new(engine, base, WallClock::new()),
            camera,
            scene,
            pointer: PointerMapper::new(),
            timer: FrameTimer::new(120),
            viewport,
            last_report: Instant::now(),
            lowest_vertex,
        })
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Orbit { dx, dy } => self.camera.rotate(dx, dy),
            Action::Pan { dx, dy } => self.camera.pan(dx, dy, self.viewport.height),
            Action::Zoom(amount) => self.camera.zoom(amount),
            Action::ResetCamera => {
                self.camera = OrbitCamera::from_desc(&self.scene.camera, self.viewport.aspect());
                tracing::debug!("camera reset");
            }
            Action::Noop => {}
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport.resize(width, height);
        self.camera.aspect = self.viewport.aspect();
    }

    fn report(&mut self) {
        if self.last_report.elapsed() < REPORT_INTERVAL {
            return;
        }
        self.last_report = Instant::now();
        let summary = GeometryInspector::summary(self.driver.base(), self.driver.live());
        let params = self.driver.engine().params();
        tracing::debug!(
            amplitude = params.amplitude,
            melt_factor = params.melt_factor,
            "{summary}"
        );
        if let Some(vertex) = self.lowest_vertex_info() {
            tracing::debug!("lowest {vertex}");
        }
        tracing::debug!("{}", self.timer.report());
    }

    fn lowest_vertex_info(&self) -> Option<VertexInfo> {
        GeometryInspector::inspect_vertex(
            self.driver.base(),
            self.driver.live(),
            self.lowest_vertex,
        )
    }
}

/// Advance camera damping for a frame that is about to be drawn.
fn frame_camera(camera: &mut OrbitCamera) -> &OrbitCamera {
    camera.update();
    camera
}

/// Hands each frame to the GPU renderer.
struct GpuFrame<'a> {
    renderer: &'a mut WgpuRenderer,
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    view: &'a wgpu::TextureView,
    camera: &'a mut OrbitCamera,
}

impl FrameSink for GpuFrame<'_> {
    fn present(&mut self, frame: &mut FrameView<'_>) {
        let camera = frame_camera(self.camera);
        self.renderer
            .render(self.device, self.queue, self.view, camera, frame);
    }
}

struct Gpu {
    renderer: WgpuRenderer,
    config: wgpu::SurfaceConfiguration,
    queue: wgpu::Queue,
    device: wgpu::Device,
    surface: wgpu::Surface<'static>,
    window: Arc<Window>,
}

impl Gpu {
    fn init(event_loop: &ActiveEventLoop, state: &mut AppState) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Melting Sphere")
            .with_inner_size(PhysicalSize::new(
                state.viewport.width,
                state.viewport.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("melt_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        state.viewport.scale_factor = window.scale_factor();
        state.resize(config.width, config.height);

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            &state.scene,
            state.driver.base().len(),
        );

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            renderer,
            config,
            queue,
            device,
            surface,
            window,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self { state, gpu: None }
    }

    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                gpu.window.request_redraw();
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                gpu.window.request_redraw();
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut sink = GpuFrame {
            renderer: &mut gpu.renderer,
            device: &gpu.device,
            queue: &gpu.queue,
            view: &view,
            camera: &mut self.state.camera,
        };
        match self.state.driver.tick(&mut sink) {
            Ok(stats) => self.state.timer.record(&stats),
            Err(e) => tracing::error!("frame skipped: {e}"),
        }

        output.present();
        self.state.report();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }

        match Gpu::init(event_loop, &mut self.state) {
            Ok(gpu) => {
                self.state.driver.start();
                gpu.window.request_redraw();
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!(
                    frames = self.state.driver.frame_index(),
                    "window closed"
                );
                self.gpu = None;
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                    self.state.resize(gpu.config.width, gpu.config.height);
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.state.viewport.scale_factor = scale_factor;
                tracing::debug!(scale_factor, "scale factor changed");
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return,
                };
                let action = self
                    .state
                    .pointer
                    .button(button, state == ElementState::Pressed);
                self.state.apply(action);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self.state.pointer.cursor_moved(position.x, position.y);
                self.state.apply(action);
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.pointer.cursor_left();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let action = match delta {
                    MouseScrollDelta::LineDelta(_, y) => self.state.pointer.scroll_lines(y),
                    MouseScrollDelta::PixelDelta(p) => self.state.pointer.scroll_pixels(p.y),
                };
                self.state.apply(action);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("melt-desktop starting ({})", melt_render_wgpu::crate_info());

    let state = AppState::new(&cli)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> AppState {
        AppState::new(&Cli::parse_from(["melt-desktop"])).unwrap()
    }

    #[test]
    fn camera_advances_only_when_a_frame_is_drawn() {
        let mut state = state();
        let yaw = state.camera.yaw;
        state.apply(Action::Orbit { dx: 100.0, dy: 0.0 });
        assert_eq!(state.camera.yaw, yaw);

        let after_one = frame_camera(&mut state.camera).yaw;
        assert!(after_one > yaw);
        let after_two = frame_camera(&mut state.camera).yaw;
        assert!(after_two > after_one);
    }

    #[test]
    fn secondary_drag_pans_the_camera() {
        let mut state = state();
        let target = state.camera.target;
        state.pointer.cursor_moved(100.0, 100.0);
        let press = state.pointer.button(PointerButton::Secondary, true);
        state.apply(press);
        let action = state.pointer.cursor_moved(160.0, 100.0);
        assert_eq!(action, Action::Pan { dx: 60.0, dy: 0.0 });
        state.apply(action);
        frame_camera(&mut state.camera);
        assert_ne!(state.camera.target, target);
        assert_eq!(state.camera.target.y, target.y);
    }

    #[test]
    fn lowest_vertex_is_at_the_bottom() {
        let state = state();
        let base = state.driver.base();
        let lowest = base.positions()[state.lowest_vertex].y;
        assert!(base.positions().iter().all(|p| p.y >= lowest));
        assert!(lowest < 0.0);

        let info = state.lowest_vertex_info().unwrap();
        assert_eq!(info.index, state.lowest_vertex);
    }
}
