// src/rendering_lib/pass.rs

use std::fmt;

use crate::engine_lib::assets::TextureSlot;

use super::render_target::RenderTarget;
use super::shader::{
    ShaderProgram, BLOOM_BLUR_FRAGMENT, BLOOM_COMPOSITE_FRAGMENT, BLOOM_THRESHOLD_FRAGMENT,
};

#[derive(Debug, Clone)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Texture(TextureSlot),
}

impl UniformValue {
    pub fn kind(&self) -> &'static str {
        match self {
            UniformValue::Float(_) => "float",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
            UniformValue::Vec4(_) => "vec4",
            UniformValue::Texture(_) => "texture",
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            UniformValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Widened to one std140 slot; textures occupy no slot.
    fn to_slot(&self) -> Option<[f32; 4]> {
        match self {
            UniformValue::Float(v) => Some([*v, 0.0, 0.0, 0.0]),
            UniformValue::Vec2([x, y]) => Some([*x, *y, 0.0, 0.0]),
            UniformValue::Vec3([x, y, z]) => Some([*x, *y, *z, 0.0]),
            UniformValue::Vec4(v) => Some(*v),
            UniformValue::Texture(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UniformError {
    Unknown(String),
    TypeMismatch {
        uniform: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl fmt::Display for UniformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniformError::Unknown(name) => write!(f, "unknown uniform '{name}'"),
            UniformError::TypeMismatch { uniform, expected, found } => {
                write!(f, "uniform '{uniform}' is a {expected}, got a {found}")
            }
        }
    }
}

impl std::error::Error for UniformError {}

/// Uniforms of a pass in declaration order. The order is the layout of the
/// program's `Params` block: one `vec4<f32>` per non-texture uniform,
/// auxiliary textures bound from binding 3 on.
#[derive(Debug, Clone, Default)]
pub struct UniformMap {
    entries: Vec<(String, UniformValue)>,
}

impl UniformMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: UniformValue) -> Self {
        self.declare(name, value);
        self
    }

    /// Adds a uniform, or replaces it regardless of type if already declared.
    pub fn declare(&mut self, name: &str, value: UniformValue) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((name.to_string(), value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&UniformValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn get_float(&self, name: &str) -> Option<f32> {
        self.get(name).and_then(UniformValue::as_float)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Updates a declared uniform; the new value must have the same type.
    pub fn set(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        let (_, slot) = self
            .entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .ok_or_else(|| UniformError::Unknown(name.to_string()))?;
        if std::mem::discriminant(slot) != std::mem::discriminant(&value) {
            return Err(UniformError::TypeMismatch {
                uniform: name.to_string(),
                expected: slot.kind(),
                found: value.kind(),
            });
        }
        *slot = value;
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &UniformValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn textures(&self) -> impl Iterator<Item = (&str, &TextureSlot)> {
        self.entries.iter().filter_map(|(n, v)| match v {
            UniformValue::Texture(slot) => Some((n.as_str(), slot)),
            _ => None,
        })
    }

    /// Uniform block contents. Never empty, so the binding is always valid.
    pub fn pack(&self) -> Vec<[f32; 4]> {
        let mut slots: Vec<[f32; 4]> = self.entries.iter().filter_map(|(_, v)| v.to_slot()).collect();
        if slots.is_empty() {
            slots.push([0.0; 4]);
        }
        slots
    }
}

/// Renders the live scene. Ignores its input.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenePass {
    pub clear_color: [f32; 4],
}

/// Runs a full-screen fragment program over the input texture.
#[derive(Debug, Clone)]
pub struct ShaderPass {
    pub program: ShaderProgram,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomSettings {
    pub strength: f32,
    pub radius: f32,
    pub threshold: f32,
}

impl BloomSettings {
    pub fn new(strength: f32, radius: f32, threshold: f32) -> Self {
        Self {
            strength: strength.clamp(0.0, 2.0),
            radius: radius.clamp(0.0, 1.0),
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn from_uniforms(uniforms: &UniformMap) -> Self {
        Self::new(
            uniforms.get_float("strength").unwrap_or(0.0),
            uniforms.get_float("radius").unwrap_or(0.0),
            uniforms.get_float("threshold").unwrap_or(1.0),
        )
    }

    pub fn uniforms(&self) -> UniformMap {
        UniformMap::new()
            .with("strength", UniformValue::Float(self.strength))
            .with("radius", UniformValue::Float(self.radius))
            .with("threshold", UniformValue::Float(self.threshold))
    }

    /// Distance between blur taps in half-resolution texels.
    pub fn tap_spacing(&self) -> f32 {
        1.0 + 3.0 * self.radius
    }
}

/// Passes that run more than one program internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositePass {
    Bloom,
}

impl CompositePass {
    pub fn programs(&self) -> Vec<ShaderProgram> {
        match self {
            CompositePass::Bloom => vec![
                ShaderProgram::fullscreen("bloom_threshold", BLOOM_THRESHOLD_FRAGMENT),
                ShaderProgram::fullscreen("bloom_blur", BLOOM_BLUR_FRAGMENT),
                ShaderProgram::fullscreen("bloom_composite", BLOOM_COMPOSITE_FRAGMENT),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub enum PassKind {
    Scene(ScenePass),
    Shader(ShaderPass),
    Composite(CompositePass),
}

/// Records the GPU work of one pass. `None` as input means there is no prior
/// stage; `None` as output means the display surface.
pub trait PassEncoder {
    fn scene(&mut self, name: &str, pass: &ScenePass, output: Option<&RenderTarget>);

    fn shader(
        &mut self,
        name: &str,
        pass: &ShaderPass,
        uniforms: &UniformMap,
        input: Option<&RenderTarget>,
        output: Option<&RenderTarget>,
    );

    fn bloom(&mut self, name: &str, settings: BloomSettings, input: Option<&RenderTarget>, output: Option<&RenderTarget>);
}

/// One step of the compositor chain.
#[derive(Debug, Clone)]
pub struct Pass {
    name: String,
    enabled: bool,
    pub uniforms: UniformMap,
    kind: PassKind,
}

impl Pass {
    pub fn new(name: &str, kind: PassKind, uniforms: UniformMap) -> Self {
        Self {
            name: name.to_string(),
            enabled: true,
            uniforms,
            kind,
        }
    }

    pub fn scene(name: &str, clear_color: [f32; 4]) -> Self {
        Self::new(name, PassKind::Scene(ScenePass { clear_color }), UniformMap::new())
    }

    pub fn shader(name: &str, program: ShaderProgram, uniforms: UniformMap) -> Self {
        Self::new(name, PassKind::Shader(ShaderPass { program }), uniforms)
    }

    pub fn bloom(name: &str, settings: BloomSettings) -> Self {
        Self::new(name, PassKind::Composite(CompositePass::Bloom), settings.uniforms())
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &PassKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut PassKind {
        &mut self.kind
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Programs that must compile before the pass can join a chain.
    pub fn programs(&self) -> Vec<ShaderProgram> {
        match &self.kind {
            PassKind::Scene(_) => vec![ShaderProgram::scene()],
            PassKind::Shader(shader) => vec![shader.program.clone()],
            PassKind::Composite(composite) => composite.programs(),
        }
    }

    pub fn render<E: PassEncoder + ?Sized>(
        &self,
        encoder: &mut E,
        input: Option<&RenderTarget>,
        output: Option<&RenderTarget>,
    ) {
        match &self.kind {
            PassKind::Scene(scene) => encoder.scene(&self.name, scene, output),
            PassKind::Shader(shader) => encoder.shader(&self.name, shader, &self.uniforms, input, output),
            PassKind::Composite(CompositePass::Bloom) => {
                encoder.bloom(&self.name, BloomSettings::from_uniforms(&self.uniforms), input, output)
            }
        }
    }
}
