// src/rendering_lib/gpu/bloom.rs

use crate::rendering_lib::pass::BloomSettings;
use crate::rendering_lib::shader::{
    ShaderProgram, BLOOM_BLUR_FRAGMENT, BLOOM_COMPOSITE_FRAGMENT, BLOOM_THRESHOLD_FRAGMENT,
};

use super::fullscreen::{DrawTarget, FullscreenPipelines};

const BLOOM_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

pub fn half_size(width: u32, height: u32) -> (u32, u32) {
    ((width / 2).max(1), (height / 2).max(1))
}

/// Per-tap uv step of one blur direction on a `size` buffer.
pub fn blur_step(settings: &BloomSettings, size: (u32, u32), horizontal: bool) -> [f32; 4] {
    let spacing = settings.tap_spacing();
    if horizontal {
        [spacing / size.0 as f32, 0.0, 0.0, 0.0]
    } else {
        [0.0, spacing / size.1 as f32, 0.0, 0.0]
    }
}

fn scratch_target(view: &wgpu::TextureView) -> DrawTarget<'_> {
    DrawTarget {
        view,
        format: BLOOM_FORMAT,
    }
}

struct Scratch {
    size: (u32, u32),
    _textures: [wgpu::Texture; 2],
    views: [wgpu::TextureView; 2],
}

/// Threshold, separable blur and additive composite on a half-resolution
/// pair of scratch buffers.
pub struct BloomChain {
    threshold: ShaderProgram,
    blur: ShaderProgram,
    composite: ShaderProgram,
    scratch: Option<Scratch>,
}

impl BloomChain {
    pub fn new() -> Self {
        Self {
            threshold: ShaderProgram::fullscreen("bloom_threshold", BLOOM_THRESHOLD_FRAGMENT),
            blur: ShaderProgram::fullscreen("bloom_blur", BLOOM_BLUR_FRAGMENT),
            composite: ShaderProgram::fullscreen("bloom_composite", BLOOM_COMPOSITE_FRAGMENT),
            scratch: None,
        }
    }

    fn ensure_scratch(&mut self, device: &wgpu::Device, size: (u32, u32)) {
        if self.scratch.as_ref().is_some_and(|s| s.size == size) {
            return;
        }
        let make = |label: &str| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: size.0,
                    height: size.1,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: BLOOM_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
        };
        let textures = [make("Bloom Scratch A"), make("Bloom Scratch B")];
        let views = [
            textures[0].create_view(&wgpu::TextureViewDescriptor::default()),
            textures[1].create_view(&wgpu::TextureViewDescriptor::default()),
        ];
        log::debug!("bloom scratch buffers resized to {}x{}", size.0, size.1);
        self.scratch = Some(Scratch {
            size,
            _textures: textures,
            views,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        pipelines: &mut FullscreenPipelines,
        settings: BloomSettings,
        input: &wgpu::TextureView,
        input_size: (u32, u32),
        output: DrawTarget<'_>,
    ) {
        let size = half_size(input_size.0, input_size.1);
        self.ensure_scratch(device, size);
        let Some(scratch) = &self.scratch else {
            return;
        };
        let [a, b] = &scratch.views;

        pipelines.draw(
            device,
            encoder,
            &self.threshold,
            &[[settings.threshold, 0.0, 0.0, 0.0]],
            input,
            &[],
            scratch_target(a),
        );
        pipelines.draw(
            device,
            encoder,
            &self.blur,
            &[blur_step(&settings, size, true)],
            a,
            &[],
            scratch_target(b),
        );
        pipelines.draw(
            device,
            encoder,
            &self.blur,
            &[blur_step(&settings, size, false)],
            b,
            &[],
            scratch_target(a),
        );
        pipelines.draw(
            device,
            encoder,
            &self.composite,
            &[[settings.strength, 0.0, 0.0, 0.0]],
            input,
            &[a],
            output,
        );
    }
}

impl Default for BloomChain {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_size_never_reaches_zero() {
        assert_eq!(half_size(100, 100), (50, 50));
        assert_eq!(half_size(1, 3), (1, 1));
    }

    #[test]
    fn blur_step_grows_with_radius() {
        let narrow = BloomSettings::new(0.3, 0.0, 0.05);
        let wide = BloomSettings::new(0.3, 1.0, 0.05);
        assert_eq!(blur_step(&narrow, (50, 25), true), [1.0 / 50.0, 0.0, 0.0, 0.0]);
        assert_eq!(blur_step(&wide, (50, 25), false), [0.0, 4.0 / 25.0, 0.0, 0.0]);
    }
}
