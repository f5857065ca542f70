// src/rendering_lib/gpu/targets.rs

use std::collections::HashMap;

use crate::rendering_lib::render_target::{RenderTarget, TargetId};

/// Maps a requested sample count onto one the format supports: the request
/// itself, else 4, else single-sampled.
pub fn resolve_sample_count(requested: u32, supported: impl Fn(u32) -> bool) -> u32 {
    if requested <= 1 {
        1
    } else if supported(requested) {
        requested
    } else if supported(4) {
        4
    } else {
        1
    }
}

pub struct RealizedTarget {
    pub id: TargetId,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    /// Effective sample count of `msaa_view`, 1 when there is none.
    pub samples: u32,
    _color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    _msaa: Option<wgpu::Texture>,
    pub msaa_view: Option<wgpu::TextureView>,
}

/// GPU textures for the pool's targets, keyed by allocation id.
pub struct TargetCache {
    supported_samples: Vec<u32>,
    targets: HashMap<TargetId, RealizedTarget>,
}

impl TargetCache {
    pub fn new(adapter: &wgpu::Adapter, format: wgpu::TextureFormat) -> Self {
        let flags = adapter.get_texture_format_features(format).flags;
        let supported_samples: Vec<u32> = [2, 4, 8, 16]
            .into_iter()
            .filter(|&n| flags.sample_count_supported(n))
            .collect();
        log::info!("offscreen format {format:?} supports sample counts {supported_samples:?}");
        Self {
            supported_samples,
            targets: HashMap::new(),
        }
    }

    pub fn multisample_supported(&self) -> bool {
        !self.supported_samples.is_empty()
    }

    pub fn effective_sample_count(&self, requested: u32) -> u32 {
        resolve_sample_count(requested, |n| self.supported_samples.contains(&n))
    }

    /// Creates the textures for `target` unless they already exist.
    pub fn realize(&mut self, device: &wgpu::Device, target: &RenderTarget) {
        if self.targets.contains_key(&target.id) {
            return;
        }
        let samples = self.effective_sample_count(target.sample_count);
        let size = wgpu::Extent3d {
            width: target.width,
            height: target.height,
            depth_or_array_layers: 1,
        };
        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Render Target Color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: target.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let msaa = (samples > 1).then(|| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("Render Target MSAA"),
                size,
                mip_level_count: 1,
                sample_count: samples,
                dimension: wgpu::TextureDimension::D2,
                format: target.format,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        });
        let msaa_view = msaa
            .as_ref()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()));

        log::debug!(
            "realized render target {} at {}x{} with {} samples",
            target.id.raw(),
            target.width,
            target.height,
            samples
        );
        self.targets.insert(
            target.id,
            RealizedTarget {
                id: target.id,
                width: target.width,
                height: target.height,
                format: target.format,
                samples,
                _color: color,
                color_view,
                _msaa: msaa,
                msaa_view,
            },
        );
    }

    pub fn get(&self, id: TargetId) -> Option<&RealizedTarget> {
        self.targets.get(&id)
    }

    /// Drops textures of targets the pool has since reallocated.
    pub fn retain<'a>(&mut self, live: impl IntoIterator<Item = &'a RenderTarget>) {
        let live: Vec<TargetId> = live.into_iter().map(|t| t.id).collect();
        self.targets.retain(|id, _| live.contains(id));
    }
}
