// src/lib.rs

pub mod engine_lib;
pub mod rendering_lib;

// Re-export the types a host loop touches every frame.
pub use engine_lib::{Clock, FrameTime, MainLoop, ParameterSet, Viewport};
pub use rendering_lib::{Compositor, Pass, PassEncoder, RenderTarget, RenderTargetPool};
