// src/rendering_lib/gpu/encoder.rs

use crate::rendering_lib::pass::{BloomSettings, PassEncoder, ScenePass, ShaderPass, UniformMap};
use crate::rendering_lib::render_target::{RenderTarget, RenderTargetPool};

use super::bloom::BloomChain;
use super::fullscreen::{DrawTarget, FullscreenPipelines};
use super::renderer::{SceneRenderer, SceneTarget};
use super::targets::TargetCache;
use super::textures::TextureCache;

/// GPU state that outlives a frame.
pub struct GpuResources {
    pub targets: TargetCache,
    pub textures: TextureCache,
    pub fullscreen: FullscreenPipelines,
    pub bloom: BloomChain,
    pub scene: SceneRenderer,
}

impl GpuResources {
    pub fn new(device: &wgpu::Device, adapter: &wgpu::Adapter, offscreen_format: wgpu::TextureFormat) -> Self {
        Self {
            targets: TargetCache::new(adapter, offscreen_format),
            textures: TextureCache::new(),
            fullscreen: FullscreenPipelines::new(device),
            bloom: BloomChain::new(),
            scene: SceneRenderer::new(device),
        }
    }

    /// Releases textures of targets the pool no longer holds.
    pub fn sync_targets(&mut self, pool: &RenderTargetPool) {
        self.targets.retain(pool.targets());
    }
}

/// The frame's swapchain image.
pub struct SurfaceOutput<'a> {
    pub view: &'a wgpu::TextureView,
    pub format: wgpu::TextureFormat,
    pub size: (u32, u32),
}

/// Clears `view` without drawing anything.
pub fn clear_view(encoder: &mut wgpu::CommandEncoder, view: &wgpu::TextureView, color: wgpu::Color) {
    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("Clear Pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(color),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    });
}

/// Records compositor passes into a wgpu command encoder.
pub struct WgpuPassEncoder<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub surface: SurfaceOutput<'a>,
    pub resources: &'a mut GpuResources,
}

impl WgpuPassEncoder<'_> {
    fn realize(&mut self, target: Option<&RenderTarget>) {
        if let Some(target) = target {
            self.resources.targets.realize(self.device, target);
        }
    }
}

impl PassEncoder for WgpuPassEncoder<'_> {
    fn scene(&mut self, name: &str, pass: &ScenePass, output: Option<&RenderTarget>) {
        self.realize(output);
        let GpuResources { targets, scene, .. } = &mut *self.resources;

        let target = match output {
            None => SceneTarget {
                view: self.surface.view,
                resolve_target: None,
                format: self.surface.format,
                samples: 1,
                size: self.surface.size,
            },
            Some(output) => {
                let Some(realized) = targets.get(output.id) else {
                    log::error!("pass '{name}': output target was not realized");
                    return;
                };
                match &realized.msaa_view {
                    Some(msaa_view) => SceneTarget {
                        view: msaa_view,
                        resolve_target: Some(&realized.color_view),
                        format: realized.format,
                        samples: realized.samples,
                        size: (realized.width, realized.height),
                    },
                    None => SceneTarget {
                        view: &realized.color_view,
                        resolve_target: None,
                        format: realized.format,
                        samples: 1,
                        size: (realized.width, realized.height),
                    },
                }
            }
        };
        scene.draw(self.device, self.queue, self.encoder, target, pass.clear_color);
    }

    fn shader(
        &mut self,
        name: &str,
        pass: &ShaderPass,
        uniforms: &UniformMap,
        input: Option<&RenderTarget>,
        output: Option<&RenderTarget>,
    ) {
        self.realize(input);
        self.realize(output);
        self.resources.textures.prepare_blank(self.device, self.queue);
        for (_, slot) in uniforms.textures() {
            self.resources.textures.prepare(self.device, self.queue, slot);
        }

        let GpuResources {
            targets,
            textures,
            fullscreen,
            ..
        } = &mut *self.resources;

        let input_view = match input {
            Some(input) => targets.get(input.id).map(|t| &t.color_view),
            None => textures.blank_view(),
        };
        let Some(input_view) = input_view else {
            log::error!("pass '{name}': input texture unavailable, skipped");
            return;
        };
        let aux: Option<Vec<&wgpu::TextureView>> = uniforms.textures().map(|(_, slot)| textures.view(slot)).collect();
        let Some(aux) = aux else {
            log::error!("pass '{name}': auxiliary texture unavailable, skipped");
            return;
        };
        let target = match output {
            None => DrawTarget {
                view: self.surface.view,
                format: self.surface.format,
            },
            Some(output) => {
                let Some(realized) = targets.get(output.id) else {
                    log::error!("pass '{name}': output target was not realized");
                    return;
                };
                DrawTarget {
                    view: &realized.color_view,
                    format: realized.format,
                }
            }
        };

        fullscreen.draw(
            self.device,
            self.encoder,
            &pass.program,
            &uniforms.pack(),
            input_view,
            &aux,
            target,
        );
    }

    fn bloom(&mut self, name: &str, settings: BloomSettings, input: Option<&RenderTarget>, output: Option<&RenderTarget>) {
        self.realize(input);
        self.realize(output);
        self.resources.textures.prepare_blank(self.device, self.queue);

        let GpuResources {
            targets,
            textures,
            fullscreen,
            bloom,
            ..
        } = &mut *self.resources;

        let source = match input {
            Some(input) => targets
                .get(input.id)
                .map(|t| (&t.color_view, (t.width, t.height))),
            None => textures.blank_view().map(|view| (view, self.surface.size)),
        };
        let Some((input_view, input_size)) = source else {
            log::error!("pass '{name}': input texture unavailable, skipped");
            return;
        };
        let target = match output {
            None => DrawTarget {
                view: self.surface.view,
                format: self.surface.format,
            },
            Some(output) => {
                let Some(realized) = targets.get(output.id) else {
                    log::error!("pass '{name}': output target was not realized");
                    return;
                };
                DrawTarget {
                    view: &realized.color_view,
                    format: realized.format,
                }
            }
        };

        bloom.render(
            self.device,
            self.encoder,
            fullscreen,
            settings,
            input_view,
            input_size,
            target,
        );
    }
}
