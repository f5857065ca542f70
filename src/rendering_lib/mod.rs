// src/rendering_lib/mod.rs

pub mod compositor;
pub mod effects;
pub mod gpu;
pub mod noise;
pub mod particles;
pub mod pass;
pub mod render_target;
pub mod shader;
pub mod vertex;

pub use compositor::{Compositor, CompositorError, FrameStep, TargetSlot};
pub use noise::NoiseShading;
pub use particles::{Particle, ParticleField};
pub use pass::{BloomSettings, Pass, PassEncoder, PassKind, UniformError, UniformMap, UniformValue};
pub use render_target::{RenderTarget, RenderTargetPool, TargetHandle, TargetId};
pub use shader::{ShaderError, ShaderProgram};
pub use vertex::{ParticleInstance, Vertex};
