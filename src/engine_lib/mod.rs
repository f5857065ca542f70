// src/engine_lib/mod.rs
pub mod assets;
pub mod camera;
pub mod clock;
pub mod main_loop;
pub mod params;
pub mod scene_types;
pub mod viewport;

pub use assets::{AssetResult, TextureData, TextureSlot};
pub use camera::Camera;
pub use clock::{Clock, FrameTime};
pub use main_loop::{FrameHandler, MainLoop, StopHandle};
pub use params::{ParamChange, ParamError, ParamRange, ParamValue, ParameterSet};
pub use scene_types::{Material, Mesh, Scene};
pub use viewport::Viewport;
