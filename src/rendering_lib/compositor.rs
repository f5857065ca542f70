// src/rendering_lib/compositor.rs

use std::fmt;

use crate::engine_lib::viewport::Viewport;

use super::pass::{Pass, PassEncoder, UniformError, UniformValue};
use super::render_target::{RenderTarget, RenderTargetPool, TargetHandle};
use super::shader::ShaderError;

#[derive(Debug, Clone, PartialEq)]
pub enum CompositorError {
    ShaderCompile(ShaderError),
    DuplicatePass(String),
    UnknownPass(String),
    Uniform { pass: String, error: UniformError },
}

impl fmt::Display for CompositorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompositorError::ShaderCompile(e) => write!(f, "{e}"),
            CompositorError::DuplicatePass(name) => write!(f, "a pass named '{name}' is already registered"),
            CompositorError::UnknownPass(name) => write!(f, "no pass named '{name}'"),
            CompositorError::Uniform { pass, error } => write!(f, "pass '{pass}': {error}"),
        }
    }
}

impl std::error::Error for CompositorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompositorError::ShaderCompile(e) => Some(e),
            CompositorError::Uniform { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// One of the two ping-pong buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetSlot {
    A,
    B,
}

/// Routing of one enabled pass for the current frame. `None` input means
/// the pass is first; `None` output means the display surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameStep {
    pub pass_index: usize,
    pub input: Option<TargetSlot>,
    pub output: Option<TargetSlot>,
}

/// Owns the pass chain and the two off-screen buffers it alternates between.
///
/// Routing is recomputed every frame from the enabled flags, so toggling a
/// pass only changes the number of buffer hops and never leaves a pass
/// reading a stale buffer.
#[derive(Debug)]
pub struct Compositor {
    pool: RenderTargetPool,
    targets: [TargetHandle; 2],
    passes: Vec<Pass>,
    viewport: Viewport,
}

impl Compositor {
    pub fn new(viewport: Viewport, format: wgpu::TextureFormat) -> Self {
        let mut pool = RenderTargetPool::new(format, viewport.pixel_ratio);
        let a = pool.acquire_for_viewport(&viewport);
        let b = pool.acquire_for_viewport(&viewport);
        Self {
            pool,
            targets: [a, b],
            passes: Vec::new(),
            viewport,
        }
    }

    /// Appends a pass after compiling its programs. A pass whose programs
    /// fail to compile is refused.
    pub fn add_pass(&mut self, pass: Pass) -> Result<(), CompositorError> {
        if self.pass(pass.name()).is_some() {
            log::error!("refusing pass '{}': name already registered", pass.name());
            return Err(CompositorError::DuplicatePass(pass.name().to_string()));
        }
        for program in pass.programs() {
            if let Err(e) = program.validate() {
                log::error!("refusing pass '{}': {}", pass.name(), e);
                return Err(CompositorError::ShaderCompile(e));
            }
        }
        log::info!(
            "registered pass '{}' at position {} ({})",
            pass.name(),
            self.passes.len(),
            if pass.is_enabled() { "enabled" } else { "disabled" }
        );
        self.passes.push(pass);
        Ok(())
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn pass(&self, name: &str) -> Option<&Pass> {
        self.passes.iter().find(|p| p.name() == name)
    }

    pub fn pass_mut(&mut self, name: &str) -> Option<&mut Pass> {
        self.passes.iter_mut().find(|p| p.name() == name)
    }

    fn require_pass(&mut self, name: &str) -> Result<&mut Pass, CompositorError> {
        self.pass_mut(name)
            .ok_or_else(|| CompositorError::UnknownPass(name.to_string()))
    }

    pub fn set_enabled(&mut self, name: &str, enabled: bool) -> Result<(), CompositorError> {
        let pass = self.require_pass(name)?;
        if pass.is_enabled() != enabled {
            log::debug!("pass '{name}' {}", if enabled { "enabled" } else { "disabled" });
        }
        pass.set_enabled(enabled);
        Ok(())
    }

    pub fn set_uniform(&mut self, pass: &str, uniform: &str, value: UniformValue) -> Result<(), CompositorError> {
        self.require_pass(pass)?
            .uniforms
            .set(uniform, value)
            .map_err(|error| CompositorError::Uniform {
                pass: pass.to_string(),
                error,
            })
    }

    /// Feeds the frame timestamp to every pass declaring a `time` uniform.
    pub fn set_time(&mut self, time: f32) {
        for pass in &mut self.passes {
            if pass.uniforms.get_float("time").is_some() {
                pass.uniforms.declare("time", UniformValue::Float(time));
            }
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resizes both buffers to the viewport's drawing-buffer size. Returns
    /// how many were reallocated; a degenerate viewport reallocates nothing.
    pub fn set_size(&mut self, viewport: Viewport) -> usize {
        self.viewport = viewport;
        self.pool.resize_all(&viewport)
    }

    pub fn pool(&self) -> &RenderTargetPool {
        &self.pool
    }

    pub fn target(&self, slot: TargetSlot) -> &RenderTarget {
        match slot {
            TargetSlot::A => self.pool.get(self.targets[0]),
            TargetSlot::B => self.pool.get(self.targets[1]),
        }
    }

    /// Routing for the current enabled flags. Empty when every pass is
    /// disabled, which renders a blank frame.
    pub fn plan(&self) -> Vec<FrameStep> {
        let enabled: Vec<usize> = self
            .passes
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_enabled())
            .map(|(i, _)| i)
            .collect();

        let last = enabled.len().saturating_sub(1);
        let mut steps: Vec<FrameStep> = Vec::with_capacity(enabled.len());
        for (i, &pass_index) in enabled.iter().enumerate() {
            let input = steps.last().and_then(|prev| prev.output);
            let output = if i == last {
                None
            } else if i % 2 == 0 {
                Some(TargetSlot::B)
            } else {
                Some(TargetSlot::A)
            };
            steps.push(FrameStep {
                pass_index,
                input,
                output,
            });
        }
        steps
    }

    /// Runs every enabled pass in order through `encoder` and returns the
    /// routing that was used.
    pub fn render<E: PassEncoder + ?Sized>(&self, encoder: &mut E) -> Vec<FrameStep> {
        let steps = self.plan();
        for step in &steps {
            let input = step.input.map(|slot| self.target(slot));
            let output = step.output.map(|slot| self.target(slot));
            self.passes[step.pass_index].render(encoder, input, output);
        }
        steps
    }
}
