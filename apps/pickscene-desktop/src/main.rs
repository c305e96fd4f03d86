use anyhow::{anyhow, Result};
use clap::Parser;
use egui::Context as EguiContext;
use pickscene_assets::{LoadStatus, ModelLoader};
use pickscene_common::Color;
use pickscene_input::{Action, ActionMap, PointerState, Viewport};
use pickscene_pick::{FrameReport, HoverEdge, PickingSession};
use pickscene_render::OrbitCamera;
use pickscene_render_wgpu::WgpuRenderer;
use pickscene_scene::{ModelHighlight, Scene, SceneConfig};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "pickscene-desktop", about = "Hover and click pickable objects")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene configuration (YAML); the built-in demo when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
enum ModelStatus {
    Disabled,
    Loading,
    Installed,
    Failed(String),
}

/// Application state.
struct AppState {
    scene: Scene,
    session: PickingSession,
    actions: ActionMap,
    camera: OrbitCamera,
    pointer: PointerState,
    viewport: Viewport,
    loader: Option<ModelLoader>,
    model_status: ModelStatus,
    /// Set when a model was installed but not yet uploaded to the GPU.
    model_dirty: bool,
    report: FrameReport,
    last_action: Option<Action>,
    show_panel: bool,
    paused: bool,
    clock: f32,
    last_frame: Instant,
    // Orbit drag
    dragging: bool,
    last_cursor: Option<PhysicalPosition<f64>>,
}

impl AppState {
    fn new(config: &SceneConfig) -> Result<Self> {
        let scene = Scene::from_config(config)?;
        let actions: ActionMap = config.click_bindings().collect();
        let (loader, model_status) = match &config.model {
            Some(model) => (Some(ModelLoader::spawn(model.clone())), ModelStatus::Loading),
            None => (None, ModelStatus::Disabled),
        };
        tracing::info!(
            objects = scene.object_count(),
            bindings = actions.len(),
            "scene ready"
        );

        Ok(Self {
            scene,
            session: PickingSession::new(config.picking),
            actions,
            camera: OrbitCamera::from_config(&config.camera),
            pointer: PointerState::new(),
            viewport: Viewport::default(),
            loader,
            model_status,
            model_dirty: false,
            report: FrameReport::default(),
            last_action: None,
            show_panel: true,
            paused: false,
            clock: 0.0,
            last_frame: Instant::now(),
            dragging: false,
            last_cursor: None,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.viewport = Viewport::new(width, height);
        self.camera.set_viewport(self.viewport.width, self.viewport.height);
    }

    fn poll_model(&mut self) {
        let Some(loader) = &mut self.loader else {
            return;
        };
        match loader.poll() {
            LoadStatus::Pending | LoadStatus::Finished => {}
            LoadStatus::Ready(model) => match self.scene.install_model(model) {
                Ok(()) => {
                    self.model_status = ModelStatus::Installed;
                    self.model_dirty = true;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not install model");
                    self.model_status = ModelStatus::Failed(e.to_string());
                }
            },
            // Already logged by the loader.
            LoadStatus::Failed(e) => self.model_status = ModelStatus::Failed(e.to_string()),
        }
        if loader.is_finished() {
            self.loader = None;
        }
    }

    /// One frame: model hand-off, animation, camera damping, picking.
    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;

        self.poll_model();
        if !self.paused {
            self.clock += dt;
        }
        self.scene.animate(self.clock);
        self.camera.update();

        let ray = self.camera.pick_ray(self.pointer.ndc());
        self.report = self.session.frame(&mut self.scene, &ray);
    }

    fn cursor_moved(&mut self, position: PhysicalPosition<f64>) {
        if self.dragging {
            if let Some(last) = self.last_cursor {
                self.camera
                    .orbit((position.x - last.x) as f32, (position.y - last.y) as f32);
            }
        }
        self.last_cursor = Some(position);
        self.pointer
            .set_from_pixels(position.x, position.y, self.viewport);
    }

    fn click(&mut self) {
        let action = self.actions.dispatch(self.session.clicked_tag());
        self.last_action = Some(action);
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::F1 => self.show_panel = !self.show_panel,
            KeyCode::Space => {
                self.paused = !self.paused;
                tracing::info!(paused = self.paused, "animation toggled");
            }
            _ => {}
        }
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_panel {
            return;
        }

        egui::SidePanel::left("debug")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Pickscene");
                ui.separator();
                let ndc = self.pointer.ndc();
                ui.label(format!("Frame: {}", self.session.frames()));
                ui.label(format!("Pointer: ({:.2}, {:.2})", ndc.x, ndc.y));
                let eye = self.camera.eye();
                ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", eye.x, eye.y, eye.z));
                ui.checkbox(&mut self.paused, "Pause animation (Space)");
                ui.separator();

                ui.heading("Hover");
                match self.session.current_primary() {
                    Some(hit) => ui.label(format!("{}  d={:.2}", hit.tag, hit.distance)),
                    None => ui.label("nothing"),
                };
                ui.label(format!("Primary hits: {}", self.report.primary_hits.len()));
                for event in &self.report.events {
                    let verb = match event.edge {
                        HoverEdge::Enter(_) => "enter",
                        HoverEdge::Leave(_) => "leave",
                    };
                    ui.small(format!("{} {verb}: {}", event.group, event.edge.hit().tag));
                }
                if let Some(action) = &self.last_action {
                    ui.label(format!("Last click: {action}"));
                }
                ui.separator();

                ui.heading("Objects");
                for object in self.scene.objects() {
                    ui.horizontal(|ui| {
                        ui.colored_label(swatch(object.color), "⏺");
                        ui.label(object.name.as_str());
                    });
                }
                ui.separator();

                ui.heading("Model");
                let status = match &self.model_status {
                    ModelStatus::Disabled => "disabled".to_string(),
                    ModelStatus::Loading => "loading...".to_string(),
                    ModelStatus::Installed => match self.scene.model() {
                        Some(model) => format!("{} ({} parts)", model.name, model.part_count()),
                        None => "installed".to_string(),
                    },
                    ModelStatus::Failed(e) => format!("failed: {e}"),
                };
                ui.label(status);
                if let Some(hit) = self.session.current_model() {
                    ui.label(format!("Hover: {}  d={:.2}", hit.tag, hit.distance));
                }

                let mut config = *self.session.config();
                egui::ComboBox::from_label("Highlight")
                    .selected_text(format!("{:?}", config.model_highlight))
                    .show_ui(ui, |ui| {
                        ui.selectable_value(&mut config.model_highlight, ModelHighlight::Off, "Off");
                        ui.selectable_value(&mut config.model_highlight, ModelHighlight::Part, "Part");
                        ui.selectable_value(&mut config.model_highlight, ModelHighlight::Whole, "Whole");
                    });
                if config != *self.session.config() {
                    self.session.set_config(config);
                }

                ui.separator();
                ui.small("F1: Toggle panel | LMB: Click | RMB drag: Orbit | Wheel: Zoom");
            });
    }
}

fn swatch(color: Color) -> egui::Color32 {
    let [r, g, b, _] = color.to_array().map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    egui::Color32::from_rgb(r, g, b)
}

/// Window and GPU resources, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Pickscene")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("pickscene_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

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

        let renderer = WgpuRenderer::new(&device, surface_format, config.width, config.height);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            "GPU initialized"
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    fn render(&mut self, state: &mut AppState, egui_ctx: &EguiContext) {
        if state.model_dirty {
            if let Some(model) = state.scene.model() {
                self.renderer.upload_model(&self.device, model);
            }
            state.model_dirty = false;
        }

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.renderer
            .render(&self.device, &self.queue, &view, &state.camera, &state.scene);

        let raw_input = self.egui_winit.take_egui_input(&self.window);
        let full_output = egui_ctx.run(raw_input, |ctx| {
            state.draw_ui(ctx);
        });

        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        output.present();
        self.window.request_redraw();
    }
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => {
                self.state.resize(gpu.config.width, gpu.config.height);
                self.gpu = Some(gpu);
            }
            Err(e) => {
                tracing::error!("failed to initialize GPU: {e:#}");
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
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };
        // The pointer keeps tracking under the panel; clicks and scrolls
        // the panel consumed are not forwarded.
        let consumed = gpu.egui_winit.on_window_event(&gpu.window, &event).consumed;

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.resize(new_size);
                self.state.resize(gpu.config.width, gpu.config.height);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.cursor_moved(position);
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.last_cursor = None;
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } if !consumed => {
                self.state.click();
            }
            WindowEvent::MouseInput {
                button: MouseButton::Right,
                state: btn_state,
                ..
            } => {
                self.state.dragging = btn_state == ElementState::Pressed && !consumed;
            }
            WindowEvent::MouseWheel { delta, .. } if !consumed => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                self.state.camera.zoom(lines);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } if !consumed => {
                self.state.handle_key(key);
            }
            WindowEvent::RedrawRequested => {
                self.state.update();
                gpu.render(&mut self.state, &self.egui_ctx);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("pickscene-desktop starting");

    let config = SceneConfig::load_or_default(cli.config.as_deref())?;
    let state = AppState::new(&config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(state);
    event_loop.run_app(&mut app)?;

    Ok(())
}
