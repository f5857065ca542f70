// src/engine_lib/clock.rs

/// Frame timing snapshot. Every time-dependent uniform of a frame is fed from
/// the same `FrameTime`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds since the clock started.
    pub elapsed: f32,
    /// Seconds since the previous tick, clamped to `max_delta`.
    pub delta: f32,
    pub frame_index: u64,
}

/// Monotonic frame clock.
///
/// The clock is advanced explicitly with the wall-clock delta measured by the
/// host loop, so tests can drive it deterministically. Negative or non-finite
/// deltas are treated as zero; `elapsed` never goes backwards.
#[derive(Debug, Clone)]
pub struct Clock {
    elapsed: f64,
    last_delta: f32,
    max_delta: f32,
    frame_index: u64,
}

impl Clock {
    /// Largest delta handed to consumers. Keeps animations stable after the
    /// window was minimised or the process stalled.
    pub const DEFAULT_MAX_DELTA: f32 = 0.25;

    pub fn new() -> Self {
        Self::with_max_delta(Self::DEFAULT_MAX_DELTA)
    }

    pub fn with_max_delta(max_delta: f32) -> Self {
        debug_assert!(max_delta > 0.0);
        Self {
            elapsed: 0.0,
            last_delta: 0.0,
            max_delta,
            frame_index: 0,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed as f32
    }

    pub fn last_delta(&self) -> f32 {
        self.last_delta
    }

    /// Advances the clock by `dt` seconds and returns the snapshot for this frame.
    pub fn advance(&mut self, dt: f32) -> FrameTime {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        // Elapsed tracks real time, only the reported delta is clamped.
        self.elapsed += dt as f64;
        self.last_delta = dt.min(self.max_delta);

        let frame = FrameTime {
            elapsed: self.elapsed as f32,
            delta: self.last_delta,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        frame
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
