// src/app.rs

use std::sync::Arc;

use anyhow::Context;
use glam::Vec3;
use rand::{rngs::StdRng, SeedableRng};
use winit::{event::WindowEvent, window::Window};

use portal_fx::engine_lib::assets::{TextureSlot, FLAT_NORMAL_RGBA};
use portal_fx::engine_lib::camera::Camera;
use portal_fx::engine_lib::clock::FrameTime;
use portal_fx::engine_lib::main_loop::FrameHandler;
use portal_fx::engine_lib::params::ParameterSet;
use portal_fx::engine_lib::viewport::Viewport;
use portal_fx::rendering_lib::compositor::Compositor;
use portal_fx::rendering_lib::effects;
use portal_fx::rendering_lib::gpu::{clear_view, GpuResources, SceneFrame, SurfaceOutput, WgpuPassEncoder};
use portal_fx::rendering_lib::noise::NoiseShading;
use portal_fx::rendering_lib::particles::ParticleField;
use portal_fx::rendering_lib::pass::UniformValue;

use crate::demo_scene;
use crate::settings::{DemoConfig, Tunables};
use crate::ui::build_ui;

/// Offscreen buffers keep HDR values until the gamma pass.
const OFFSCREEN_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
const NORMAL_MAP_SIZE: u32 = 256;

pub struct DemoApp {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    resources: GpuResources,
    compositor: Compositor,
    camera: Camera,
    shading: NoiseShading,
    fireflies: ParticleField,
    params: ParameterSet,
    normal_map: TextureSlot,
    #[cfg(not(target_arch = "wasm32"))]
    normal_map_load: Option<tokio::sync::oneshot::Receiver<portal_fx::engine_lib::assets::AssetResult>>,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl DemoApp {
    pub async fn new(window: Arc<Window>, settings: &DemoConfig) -> anyhow::Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no suitable GPU adapter")?;
        log::info!("using adapter {:?}", adapter.get_info().name);
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    label: None,
                },
                None,
            )
            .await
            .context("failed to create device")?;

        // Gamma is a pass of its own, so the surface must not encode again.
        let surface_caps = surface.get_capabilities(&adapter);
        let first_format = surface_caps
            .formats
            .first()
            .copied()
            .context("surface reports no formats")?;
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(first_format.remove_srgb_suffix());
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
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!("surface configured as {surface_format:?}");

        let viewport = Viewport::from_physical(size.width, size.height, window.scale_factor());
        let mut resources = GpuResources::new(&device, &adapter, OFFSCREEN_FORMAT);
        let normal_map = TextureSlot::pending(FLAT_NORMAL_RGBA);
        let compositor = settings
            .build_compositor(
                viewport,
                OFFSCREEN_FORMAT,
                normal_map.clone(),
                resources.targets.multisample_supported(),
            )
            .context("failed to build the pass chain")?;
        let params = settings.parameters(&compositor);

        let scene = demo_scene::create_portal_scene();
        resources.scene.upload_scene(&device, &scene);

        let mut fireflies = ParticleField::new(settings.firefly_count, &mut StdRng::from_entropy());
        fireflies.set_base_size(settings.firefly_size);
        fireflies.set_pixel_ratio(viewport.pixel_ratio);
        resources.scene.upload_fireflies(&device, &fireflies);

        let mut camera = Camera::new(45.0, 0.1, 100.0).looking_at(Vec3::new(4.0, 2.0, 4.0), Vec3::ZERO);
        camera.set_viewport_size(viewport.width, viewport.height);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, None, 1);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            resources,
            compositor,
            camera,
            shading: settings.shading(),
            fireflies,
            params,
            normal_map,
            #[cfg(not(target_arch = "wasm32"))]
            normal_map_load: Some(demo_scene::spawn_normal_map_load(NORMAL_MAP_SIZE)),
            egui_ctx,
            egui_state,
            egui_renderer,
        })
    }

    pub fn size(&self) -> winit::dpi::PhysicalSize<u32> {
        self.size
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        let viewport = Viewport::from_physical(new_size.width, new_size.height, self.window.scale_factor());
        if new_size.width == 0 || new_size.height == 0 || viewport.is_degenerate() {
            log::debug!("ignoring degenerate resize to {}x{}", new_size.width, new_size.height);
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);

        self.camera.set_viewport_size(viewport.width, viewport.height);
        self.fireflies.set_pixel_ratio(viewport.pixel_ratio);
        let reallocated = self.compositor.set_size(viewport);
        if reallocated > 0 {
            self.resources.sync_targets(self.compositor.pool());
        }
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui_state.on_window_event(&self.window, event).consumed
    }

    fn set_normal_map(&mut self, slot: TextureSlot) {
        self.normal_map = slot;
        if let Err(e) = self.compositor.set_uniform(
            effects::DISPLACEMENT,
            "normal_map",
            UniformValue::Texture(self.normal_map.clone()),
        ) {
            log::warn!("{e}");
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn poll_assets(&mut self) {
        use tokio::sync::oneshot::error::TryRecvError;

        let Some(load) = self.normal_map_load.as_mut() else {
            return;
        };
        let result = match load.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Closed) => Err("normal map loader stopped".to_string()),
        };
        self.normal_map_load = None;
        let mut slot = self.normal_map.clone();
        slot.resolve(result);
        self.set_normal_map(slot);
    }

    #[cfg(target_arch = "wasm32")]
    fn poll_assets(&mut self) {
        if matches!(self.normal_map, TextureSlot::Pending { .. }) {
            let mut slot = self.normal_map.clone();
            slot.resolve(demo_scene::normal_map(NORMAL_MAP_SIZE));
            self.set_normal_map(slot);
        }
    }

    fn draw_ui(&mut self, encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView) {
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let params = &mut self.params;
        let full_output = self.egui_ctx.run(raw_input, |ctx| build_ui(ctx, params));
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);
        let tris = self
            .egui_ctx
            .tessellate(full_output.shapes, self.egui_ctx.pixels_per_point());
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };
        self.egui_renderer
            .update_buffers(&self.device, &self.queue, encoder, &tris, &screen_descriptor);
        {
            let mut gui_render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("GUI Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            self.egui_renderer
                .render(&mut gui_render_pass, &tris, &screen_descriptor);
        }
        for tex_id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(tex_id);
        }
    }
}

impl FrameHandler for DemoApp {
    type Error = wgpu::SurfaceError;

    fn update(&mut self, frame: &FrameTime) {
        self.poll_assets();
        Tunables {
            compositor: &mut self.compositor,
            shading: &mut self.shading,
            fireflies: &mut self.fireflies,
        }
        .apply_pending(&mut self.params);

        self.shading.set_time(frame.elapsed);
        self.fireflies.set_time(frame.elapsed);
        self.compositor.set_time(frame.elapsed);
    }

    fn render(&mut self, frame: &FrameTime) -> Result<(), wgpu::SurfaceError> {
        let output_texture = self.surface.get_current_texture()?;
        let view = output_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Main Command Encoder"),
            });

        self.resources.scene.prepare(&SceneFrame {
            time: frame.elapsed,
            camera: &self.camera,
            shading: &self.shading,
            fireflies: &self.fireflies,
        });
        let steps = {
            let mut pass_encoder = WgpuPassEncoder {
                device: &self.device,
                queue: &self.queue,
                encoder: &mut encoder,
                surface: SurfaceOutput {
                    view: &view,
                    format: self.config.format,
                    size: (self.config.width, self.config.height),
                },
                resources: &mut self.resources,
            };
            self.compositor.render(&mut pass_encoder)
        };
        if steps.is_empty() {
            clear_view(&mut encoder, &view, wgpu::Color::BLACK);
        }

        self.draw_ui(&mut encoder, &view);

        self.queue.submit(std::iter::once(encoder.finish()));
        output_texture.present();
        Ok(())
    }
}
