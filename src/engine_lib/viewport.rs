// src/engine_lib/viewport.rs

/// Upper bound applied to the device pixel ratio. Beyond 2x the extra pixels
/// cost far more than they are worth for full-screen passes.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

/// Size of the presentation surface as reported by the host window.
///
/// `width`/`height` are logical units; the drawing buffer is
/// `logical * pixel_ratio` physical pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: clamp_pixel_ratio(device_pixel_ratio),
        }
    }

    /// Builds a viewport from a physical size and the window scale factor.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = if scale_factor.is_finite() && scale_factor > 0.0 { scale_factor } else { 1.0 };
        let logical_w = (width as f64 / scale).round() as u32;
        let logical_h = (height as f64 / scale).round() as u32;
        Self::new(logical_w, logical_h, scale as f32)
    }

    /// A minimised window reports a zero dimension.
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Drawing-buffer size in physical pixels, never smaller than 1x1.
    pub fn buffer_size(&self) -> (u32, u32) {
        (
            scale_dimension(self.width, self.pixel_ratio),
            scale_dimension(self.height, self.pixel_ratio),
        )
    }

    /// Aspect ratio with both sides clamped to at least 1.
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

pub fn clamp_pixel_ratio(device_pixel_ratio: f32) -> f32 {
    if !device_pixel_ratio.is_finite() || device_pixel_ratio <= 0.0 {
        return 1.0;
    }
    device_pixel_ratio.min(MAX_PIXEL_RATIO)
}

fn scale_dimension(logical: u32, pixel_ratio: f32) -> u32 {
    ((logical as f32 * pixel_ratio).round() as u32).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_ratio_is_clamped_to_two() {
        assert_eq!(Viewport::new(10, 10, 3.0).pixel_ratio, 2.0);
        assert_eq!(Viewport::new(10, 10, 1.5).pixel_ratio, 1.5);
        assert_eq!(Viewport::new(10, 10, 0.0).pixel_ratio, 1.0);
    }

    #[test]
    fn buffer_size_scales_with_pixel_ratio() {
        assert_eq!(Viewport::new(100, 50, 1.0).buffer_size(), (100, 50));
        assert_eq!(Viewport::new(100, 50, 2.0).buffer_size(), (200, 100));
    }

    #[test]
    fn degenerate_sizes_clamp_to_one() {
        let viewport = Viewport::new(0, 0, 1.0);
        assert!(viewport.is_degenerate());
        assert_eq!(viewport.buffer_size(), (1, 1));
        assert_eq!(viewport.aspect(), 1.0);
    }

    #[test]
    fn physical_sizes_round_trip_through_scale() {
        let viewport = Viewport::from_physical(2048, 1536, 2.0);
        assert_eq!((viewport.width, viewport.height), (1024, 768));
        assert_eq!(viewport.buffer_size(), (2048, 1536));
    }
}
