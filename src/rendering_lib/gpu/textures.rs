// src/rendering_lib/gpu/textures.rs

use std::collections::HashMap;

use crate::engine_lib::assets::TextureSlot;

/// Transparent black, sampled by a full-screen pass that has no prior stage.
pub const BLANK_RGBA: [u8; 4] = [0, 0, 0, 0];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TextureKey {
    Data(u64),
    Pixel([u8; 4]),
}

impl TextureKey {
    pub fn for_slot(slot: &TextureSlot) -> Self {
        match slot {
            TextureSlot::Ready(data) => TextureKey::Data(data.key()),
            TextureSlot::Pending { fallback } | TextureSlot::Failed { fallback, .. } => TextureKey::Pixel(*fallback),
        }
    }
}

/// Uploaded copies of texture slots. A slot that resolves to real data
/// changes key, so the swap is picked up on the next frame.
#[derive(Default)]
pub struct TextureCache {
    uploads: HashMap<TextureKey, (wgpu::Texture, wgpu::TextureView)>,
}

impl TextureCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, slot: &TextureSlot) {
        let key = TextureKey::for_slot(slot);
        if self.uploads.contains_key(&key) {
            return;
        }
        let upload = match slot {
            TextureSlot::Ready(data) => upload(device, queue, &data.label, data.width, data.height, &data.rgba),
            TextureSlot::Pending { fallback } | TextureSlot::Failed { fallback, .. } => {
                upload(device, queue, "Placeholder Texture", 1, 1, fallback)
            }
        };
        self.uploads.insert(key, upload);
    }

    pub fn prepare_blank(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) {
        self.prepare(device, queue, &TextureSlot::pending(BLANK_RGBA));
    }

    pub fn view(&self, slot: &TextureSlot) -> Option<&wgpu::TextureView> {
        self.uploads.get(&TextureKey::for_slot(slot)).map(|(_, view)| view)
    }

    pub fn blank_view(&self) -> Option<&wgpu::TextureView> {
        self.uploads.get(&TextureKey::Pixel(BLANK_RGBA)).map(|(_, view)| view)
    }
}

fn upload(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> (wgpu::Texture, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        // Normal maps hold vectors, not colours.
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_lib::assets::{TextureData, FLAT_NORMAL_RGBA};

    #[test]
    fn resolving_a_slot_changes_its_key() {
        let mut slot = TextureSlot::pending(FLAT_NORMAL_RGBA);
        assert_eq!(TextureKey::for_slot(&slot), TextureKey::Pixel(FLAT_NORMAL_RGBA));
        let data = TextureData::solid("normal", [1, 2, 3, 4]);
        let key = data.key();
        slot.resolve(Ok(data));
        assert_eq!(TextureKey::for_slot(&slot), TextureKey::Data(key));
    }
}
