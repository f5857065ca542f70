// src/rendering_lib/render_target.rs

use crate::engine_lib::viewport::Viewport;

/// Identity of one allocation. A resize that reallocates hands out a new id,
/// so GPU caches can tell stale textures apart by comparing ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(u64);

impl TargetId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Index of a target slot owned by a [`RenderTargetPool`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TargetHandle(usize);

/// Description of an off-screen colour buffer. The pool owns it, the GPU
/// layer realises it as textures keyed by `id`.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderTarget {
    pub id: TargetId,
    pub width: u32,
    pub height: u32,
    pub format: wgpu::TextureFormat,
    /// 0 means single-sampled.
    pub sample_count: u32,
}

impl RenderTarget {
    pub fn is_multisampled(&self) -> bool {
        self.sample_count > 1
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SamplePolicy {
    Fixed(u32),
    FromPixelRatio,
}

/// Sample count used for off-screen targets.
///
/// At a pixel ratio of exactly 1 the display compositor no longer
/// antialiases for us, so 2x MSAA is requested; at higher ratios the extra
/// device pixels already smooth edges and multisampling is skipped.
pub fn sample_count_for_pixel_ratio(pixel_ratio: f32) -> u32 {
    if pixel_ratio == 1.0 {
        2
    } else {
        0
    }
}

/// Allocates and resizes the off-screen colour buffers.
#[derive(Debug)]
pub struct RenderTargetPool {
    format: wgpu::TextureFormat,
    pixel_ratio: f32,
    slots: Vec<(RenderTarget, SamplePolicy)>,
    next_id: u64,
    allocations: u64,
}

impl RenderTargetPool {
    pub fn new(format: wgpu::TextureFormat, pixel_ratio: f32) -> Self {
        Self {
            format,
            pixel_ratio,
            slots: Vec::new(),
            next_id: 1,
            allocations: 0,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Total allocations made so far, including reallocations on resize.
    pub fn allocation_count(&self) -> u64 {
        self.allocations
    }

    /// Allocates a target with an explicit sample count that resizes keep.
    pub fn acquire(&mut self, width: u32, height: u32, sample_count: u32) -> TargetHandle {
        self.push(width, height, SamplePolicy::Fixed(sample_count))
    }

    /// Allocates a target sized to the viewport's drawing buffer whose sample
    /// count follows [`sample_count_for_pixel_ratio`].
    pub fn acquire_for_viewport(&mut self, viewport: &Viewport) -> TargetHandle {
        self.pixel_ratio = viewport.pixel_ratio;
        let (width, height) = viewport.buffer_size();
        self.push(width, height, SamplePolicy::FromPixelRatio)
    }

    pub fn get(&self, handle: TargetHandle) -> &RenderTarget {
        &self.slots[handle.0].0
    }

    pub fn targets(&self) -> impl Iterator<Item = &RenderTarget> {
        self.slots.iter().map(|(target, _)| target)
    }

    /// Updates the pixel ratio used by pixel-ratio-driven targets. Takes
    /// effect on their next `resize`.
    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        self.pixel_ratio = pixel_ratio;
    }

    /// Resizes a target, reallocating only when its size or sample count
    /// actually changes. A zero dimension is deferred: the current target is
    /// kept until a non-degenerate size arrives. Returns whether the target
    /// was reallocated.
    pub fn resize(&mut self, handle: TargetHandle, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            log::debug!("deferring render target resize to {width}x{height}");
            return false;
        }

        let (current, policy) = &self.slots[handle.0];
        let sample_count = self.sample_count_for(*policy);
        if current.width == width && current.height == height && current.sample_count == sample_count {
            return false;
        }

        log::debug!(
            "reallocating render target {}: {}x{} ({} samples) -> {}x{} ({} samples)",
            current.id.raw(),
            current.width,
            current.height,
            current.sample_count,
            width,
            height,
            sample_count
        );
        let replacement = self.allocate(width, height, sample_count);
        self.slots[handle.0].0 = replacement;
        true
    }

    /// Applies a viewport to every pixel-ratio-driven target.
    pub fn resize_all(&mut self, viewport: &Viewport) -> usize {
        if viewport.is_degenerate() {
            log::debug!("deferring resize for degenerate viewport {}x{}", viewport.width, viewport.height);
            return 0;
        }
        self.pixel_ratio = viewport.pixel_ratio;
        let (width, height) = viewport.buffer_size();
        let mut reallocated = 0;
        for index in 0..self.slots.len() {
            if self.slots[index].1 == SamplePolicy::FromPixelRatio
                && self.resize(TargetHandle(index), width, height)
            {
                reallocated += 1;
            }
        }
        reallocated
    }

    fn sample_count_for(&self, policy: SamplePolicy) -> u32 {
        match policy {
            SamplePolicy::Fixed(count) => count,
            SamplePolicy::FromPixelRatio => sample_count_for_pixel_ratio(self.pixel_ratio),
        }
    }

    fn push(&mut self, width: u32, height: u32, policy: SamplePolicy) -> TargetHandle {
        let sample_count = self.sample_count_for(policy);
        let target = self.allocate(width.max(1), height.max(1), sample_count);
        self.slots.push((target, policy));
        TargetHandle(self.slots.len() - 1)
    }

    fn allocate(&mut self, width: u32, height: u32, sample_count: u32) -> RenderTarget {
        let id = TargetId(self.next_id);
        self.next_id += 1;
        self.allocations += 1;
        RenderTarget {
            id,
            width,
            height,
            format: self.format,
            sample_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

    #[test]
    fn sample_policy_follows_pixel_ratio() {
        assert_eq!(sample_count_for_pixel_ratio(1.0), 2);
        assert_eq!(sample_count_for_pixel_ratio(2.0), 0);
        assert_eq!(sample_count_for_pixel_ratio(1.5), 0);
    }

    #[test]
    fn resize_with_same_size_keeps_identity() {
        let mut pool = RenderTargetPool::new(FORMAT, 1.0);
        let handle = pool.acquire_for_viewport(&Viewport::new(100, 100, 1.0));
        let id = pool.get(handle).id;
        assert!(!pool.resize(handle, 100, 100));
        assert!(!pool.resize(handle, 100, 100));
        assert_eq!(pool.get(handle).id, id);
        assert_eq!(pool.allocation_count(), 1);
    }

    #[test]
    fn resize_reallocates_with_new_identity() {
        let mut pool = RenderTargetPool::new(FORMAT, 1.0);
        let handle = pool.acquire_for_viewport(&Viewport::new(100, 100, 1.0));
        let id = pool.get(handle).id;
        assert!(pool.resize(handle, 200, 50));
        let target = pool.get(handle);
        assert_ne!(target.id, id);
        assert_eq!((target.width, target.height), (200, 50));
        assert_eq!(target.sample_count, 2);
    }

    #[test]
    fn pixel_ratio_change_reapplies_sample_policy() {
        let mut pool = RenderTargetPool::new(FORMAT, 1.0);
        let handle = pool.acquire_for_viewport(&Viewport::new(100, 100, 1.0));
        assert_eq!(pool.get(handle).sample_count, 2);
        assert_eq!(pool.resize_all(&Viewport::new(100, 100, 2.0)), 1);
        let target = pool.get(handle);
        assert_eq!(target.sample_count, 0);
        assert_eq!((target.width, target.height), (200, 200));
    }

    #[test]
    fn fixed_sample_count_survives_resize() {
        let mut pool = RenderTargetPool::new(FORMAT, 1.0);
        let handle = pool.acquire(64, 64, 4);
        pool.set_pixel_ratio(2.0);
        assert!(pool.resize(handle, 32, 32));
        assert_eq!(pool.get(handle).sample_count, 4);
    }

    #[test]
    fn degenerate_resize_is_deferred() {
        let mut pool = RenderTargetPool::new(FORMAT, 1.0);
        let handle = pool.acquire_for_viewport(&Viewport::new(100, 80, 1.0));
        let before = pool.get(handle).clone();
        assert!(!pool.resize(handle, 0, 80));
        assert_eq!(pool.resize_all(&Viewport::new(0, 0, 1.0)), 0);
        assert_eq!(pool.get(handle), &before);
    }
}
