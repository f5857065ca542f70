// src/rendering_lib/gpu/mod.rs

pub mod bloom;
pub mod encoder;
pub mod fullscreen;
pub mod renderer;
pub mod targets;
pub mod textures;

pub use encoder::{clear_view, GpuResources, SurfaceOutput, WgpuPassEncoder};
pub use renderer::{SceneFrame, SceneRenderer};
