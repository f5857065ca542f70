// src/engine_lib/assets.rs

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_TEXTURE_KEY: AtomicU64 = AtomicU64::new(1);

/// Decoded RGBA8 pixels handed over by the asset loader.
#[derive(Debug)]
pub struct TextureData {
    key: u64,
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureData {
    /// Returns `None` when `rgba` does not hold exactly `width * height` pixels.
    pub fn new(label: &str, width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 || rgba.len() != (width as usize) * (height as usize) * 4 {
            return None;
        }
        Some(Self {
            key: NEXT_TEXTURE_KEY.fetch_add(1, Ordering::Relaxed),
            label: label.to_string(),
            width,
            height,
            rgba,
        })
    }

    pub fn solid(label: &str, rgba: [u8; 4]) -> Self {
        Self {
            key: NEXT_TEXTURE_KEY.fetch_add(1, Ordering::Relaxed),
            label: label.to_string(),
            width: 1,
            height: 1,
            rgba: rgba.to_vec(),
        }
    }

    /// Identity of this upload; GPU caches key on it.
    pub fn key(&self) -> u64 {
        self.key
    }
}

/// Outcome of an asset request as delivered by the loader.
pub type AssetResult = Result<TextureData, String>;

/// Texture reference bound as a uniform.
///
/// Until the loader resolves, the slot renders with a 1x1 `fallback` pixel so
/// a pass that samples it never faults.
#[derive(Debug, Clone)]
pub enum TextureSlot {
    Pending { fallback: [u8; 4] },
    Ready(Arc<TextureData>),
    Failed { fallback: [u8; 4], reason: String },
}

impl TextureSlot {
    pub fn pending(fallback: [u8; 4]) -> Self {
        TextureSlot::Pending { fallback }
    }

    pub fn ready(data: TextureData) -> Self {
        TextureSlot::Ready(Arc::new(data))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, TextureSlot::Ready(_))
    }

    pub fn fallback(&self) -> Option<[u8; 4]> {
        match self {
            TextureSlot::Pending { fallback } | TextureSlot::Failed { fallback, .. } => Some(*fallback),
            TextureSlot::Ready(_) => None,
        }
    }

    /// Swaps in the loader's result. A failure keeps the placeholder pixel.
    pub fn resolve(&mut self, result: AssetResult) {
        let fallback = self.fallback().unwrap_or([0, 0, 0, 255]);
        *self = match result {
            Ok(data) => {
                log::info!("texture '{}' resolved ({}x{})", data.label, data.width, data.height);
                TextureSlot::Ready(Arc::new(data))
            }
            Err(reason) => {
                log::warn!("texture load failed, keeping placeholder: {reason}");
                TextureSlot::Failed { fallback, reason }
            }
        };
    }
}

/// Flat tangent-space normal (0, 0, 1) encoded to [0, 255].
pub const FLAT_NORMAL_RGBA: [u8; 4] = [128, 128, 255, 255];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_data_validates_pixel_count() {
        assert!(TextureData::new("bad", 2, 2, vec![0; 15]).is_none());
        assert!(TextureData::new("empty", 0, 2, vec![]).is_none());
        let data = TextureData::new("ok", 2, 2, vec![0; 16]).unwrap();
        let other = TextureData::solid("other", [1, 2, 3, 4]);
        assert_ne!(data.key(), other.key());
    }

    #[test]
    fn pending_slot_resolves_to_ready() {
        let mut slot = TextureSlot::pending(FLAT_NORMAL_RGBA);
        assert_eq!(slot.fallback(), Some(FLAT_NORMAL_RGBA));
        slot.resolve(Ok(TextureData::solid("normal", [10, 20, 30, 255])));
        assert!(slot.is_ready());
        assert_eq!(slot.fallback(), None);
    }

    #[test]
    fn failed_load_keeps_placeholder() {
        let mut slot = TextureSlot::pending(FLAT_NORMAL_RGBA);
        slot.resolve(Err("404".to_string()));
        match slot {
            TextureSlot::Failed { fallback, ref reason } => {
                assert_eq!(fallback, FLAT_NORMAL_RGBA);
                assert_eq!(reason, "404");
            }
            other => panic!("unexpected slot {other:?}"),
        }
    }
}
