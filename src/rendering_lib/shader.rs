// src/rendering_lib/shader.rs

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Shared vertex stage and bindings of every full-screen program.
///
/// Binding convention:
/// - 0: input texture (previous stage output)
/// - 1: filtering sampler
/// - 2: `Params` uniform block, one `vec4<f32>` per uniform in declaration order
/// - 3..: auxiliary textures in declaration order
pub const FULLSCREEN_VERTEX: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@group(0) @binding(0)
var t_input: texture_2d<f32>;
@group(0) @binding(1)
var s_input: sampler;

// One oversized triangle covering the screen, uv (0,0) at the top-left.
@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    var out: VertexOutput;
    let x = f32((index << 1u) & 2u);
    let y = f32(index & 2u);
    out.clip_position = vec4<f32>(x * 2.0 - 1.0, 1.0 - y * 2.0, 0.0, 1.0);
    out.uv = vec2<f32>(x, y);
    return out;
}
"#;

pub const TINT_FRAGMENT: &str = r#"
struct Params {
    tint: vec4<f32>,
}

@group(0) @binding(2)
var<uniform> params: Params;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(t_input, s_input, in.uv);
    return vec4<f32>(color.rgb + params.tint.xyz, color.a);
}
"#;

pub const DISPLACEMENT_FRAGMENT: &str = r#"
@group(0) @binding(3)
var t_normal: texture_2d<f32>;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // [0, 1] -> [-1, 1]
    let normal_color = textureSample(t_normal, s_input, in.uv).xyz * 2.0 - vec3<f32>(1.0);
    let new_uv = in.uv + normal_color.xy * 0.1;
    let color = textureSample(t_input, s_input, new_uv);

    let light_direction = normalize(vec3<f32>(-1.0, 1.0, 0.0));
    let lightness = clamp(dot(normal_color, light_direction), 0.0, 1.0);
    return color + vec4<f32>(lightness * 2.0);
}
"#;

pub const GAMMA_FRAGMENT: &str = r#"
fn linear_to_srgb(c: vec3<f32>) -> vec3<f32> {
    let low = c * 12.92;
    let high = pow(max(c, vec3<f32>(0.0)), vec3<f32>(0.41666)) * 1.055 - vec3<f32>(0.055);
    return select(high, low, c <= vec3<f32>(0.0031308));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(t_input, s_input, in.uv);
    return vec4<f32>(linear_to_srgb(color.rgb), color.a);
}
"#;

pub const RGB_SHIFT_FRAGMENT: &str = r#"
struct Params {
    amount: vec4<f32>,
    angle: vec4<f32>,
}

@group(0) @binding(2)
var<uniform> params: Params;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let offset = params.amount.x * vec2<f32>(cos(params.angle.x), sin(params.angle.x));
    let cr = textureSample(t_input, s_input, in.uv + offset);
    let cga = textureSample(t_input, s_input, in.uv);
    let cb = textureSample(t_input, s_input, in.uv - offset);
    return vec4<f32>(cr.r, cga.g, cb.b, cga.a);
}
"#;

pub const DOT_SCREEN_FRAGMENT: &str = r#"
struct Params {
    center: vec4<f32>,
    angle: vec4<f32>,
    scale: vec4<f32>,
    size: vec4<f32>,
}

@group(0) @binding(2)
var<uniform> params: Params;

fn pattern(uv: vec2<f32>) -> f32 {
    let s = sin(params.angle.x);
    let c = cos(params.angle.x);
    let tex = uv * params.size.xy - params.center.xy;
    let point = vec2<f32>(c * tex.x - s * tex.y, s * tex.x + c * tex.y) * params.scale.x;
    return (sin(point.x) * sin(point.y)) * 4.0;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(t_input, s_input, in.uv);
    let average = (color.r + color.g + color.b) / 3.0;
    return vec4<f32>(vec3<f32>(average * 10.0 - 5.0 + pattern(in.uv)), color.a);
}
"#;

pub const FXAA_FRAGMENT: &str = r#"
const FXAA_REDUCE_MIN: f32 = 0.0078125;
const FXAA_REDUCE_MUL: f32 = 0.125;
const FXAA_SPAN_MAX: f32 = 8.0;

fn luma(rgb: vec3<f32>) -> f32 {
    return dot(rgb, vec3<f32>(0.299, 0.587, 0.114));
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = 1.0 / vec2<f32>(textureDimensions(t_input));
    let center = textureSample(t_input, s_input, in.uv);
    let luma_nw = luma(textureSample(t_input, s_input, in.uv + vec2<f32>(-1.0, -1.0) * texel).rgb);
    let luma_ne = luma(textureSample(t_input, s_input, in.uv + vec2<f32>(1.0, -1.0) * texel).rgb);
    let luma_sw = luma(textureSample(t_input, s_input, in.uv + vec2<f32>(-1.0, 1.0) * texel).rgb);
    let luma_se = luma(textureSample(t_input, s_input, in.uv + vec2<f32>(1.0, 1.0) * texel).rgb);
    let luma_m = luma(center.rgb);

    let luma_min = min(luma_m, min(min(luma_nw, luma_ne), min(luma_sw, luma_se)));
    let luma_max = max(luma_m, max(max(luma_nw, luma_ne), max(luma_sw, luma_se)));

    var dir = vec2<f32>(
        -((luma_nw + luma_ne) - (luma_sw + luma_se)),
        (luma_nw + luma_sw) - (luma_ne + luma_se),
    );
    let dir_reduce = max((luma_nw + luma_ne + luma_sw + luma_se) * (0.25 * FXAA_REDUCE_MUL), FXAA_REDUCE_MIN);
    let rcp_dir_min = 1.0 / (min(abs(dir.x), abs(dir.y)) + dir_reduce);
    dir = clamp(dir * rcp_dir_min, vec2<f32>(-FXAA_SPAN_MAX), vec2<f32>(FXAA_SPAN_MAX)) * texel;

    let rgb_a = 0.5 * (
        textureSample(t_input, s_input, in.uv + dir * (1.0 / 3.0 - 0.5)).rgb +
        textureSample(t_input, s_input, in.uv + dir * (2.0 / 3.0 - 0.5)).rgb);
    let rgb_b = rgb_a * 0.5 + 0.25 * (
        textureSample(t_input, s_input, in.uv + dir * -0.5).rgb +
        textureSample(t_input, s_input, in.uv + dir * 0.5).rgb);
    let luma_b = luma(rgb_b);
    let outside = luma_b < luma_min || luma_b > luma_max;
    return vec4<f32>(select(rgb_b, rgb_a, outside), center.a);
}
"#;

pub const BLOOM_THRESHOLD_FRAGMENT: &str = r#"
struct Params {
    threshold: vec4<f32>,
}

@group(0) @binding(2)
var<uniform> params: Params;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let color = textureSample(t_input, s_input, in.uv);
    let luma = dot(color.rgb, vec3<f32>(0.299, 0.587, 0.114));
    let alpha = smoothstep(params.threshold.x, params.threshold.x + 0.01, luma);
    return mix(vec4<f32>(0.0), color, vec4<f32>(alpha));
}
"#;

pub const BLOOM_BLUR_FRAGMENT: &str = r#"
struct Params {
    // xy: step between taps in uv units
    direction: vec4<f32>,
}

@group(0) @binding(2)
var<uniform> params: Params;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    var weights = array<f32, 5>(0.2270270270, 0.1945945946, 0.1216216216, 0.0540540541, 0.0162162162);
    let step = params.direction.xy;
    var result = textureSample(t_input, s_input, in.uv).rgb * weights[0];
    for (var i = 1; i < 5; i = i + 1) {
        let offset = step * f32(i);
        result = result + textureSample(t_input, s_input, in.uv + offset).rgb * weights[i];
        result = result + textureSample(t_input, s_input, in.uv - offset).rgb * weights[i];
    }
    return vec4<f32>(result, 1.0);
}
"#;

pub const BLOOM_COMPOSITE_FRAGMENT: &str = r#"
struct Params {
    strength: vec4<f32>,
}

@group(0) @binding(2)
var<uniform> params: Params;
@group(0) @binding(3)
var t_bloom: texture_2d<f32>;

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = textureSample(t_input, s_input, in.uv);
    let bloom = textureSample(t_bloom, s_input, in.uv);
    return vec4<f32>(base.rgb + bloom.rgb * params.strength.x, base.a);
}
"#;

/// Classic 3D gradient noise on a lattice that repeats every 289 cells.
/// Mirrors `rendering_lib::noise::noise3`.
pub const NOISE_WGSL: &str = r#"
fn mod289_3(x: vec3<f32>) -> vec3<f32> {
    return x - floor(x / 289.0) * 289.0;
}

fn mod289_4(x: vec4<f32>) -> vec4<f32> {
    return x - floor(x / 289.0) * 289.0;
}

fn permute(x: vec4<f32>) -> vec4<f32> {
    return mod289_4(((x * 34.0) + 1.0) * x);
}

fn taylor_inv_sqrt(r: vec4<f32>) -> vec4<f32> {
    return 1.79284291400159 - 0.85373472095314 * r;
}

fn fade(t: vec3<f32>) -> vec3<f32> {
    return t * t * t * (t * (t * 6.0 - 15.0) + 10.0);
}

fn cnoise(p: vec3<f32>) -> f32 {
    let pi0 = mod289_3(floor(p));
    let pi1 = mod289_3(floor(p) + vec3<f32>(1.0));
    let pf0 = fract(p);
    let pf1 = pf0 - vec3<f32>(1.0);
    let ix = vec4<f32>(pi0.x, pi1.x, pi0.x, pi1.x);
    let iy = vec4<f32>(pi0.y, pi0.y, pi1.y, pi1.y);
    let iz0 = vec4<f32>(pi0.z);
    let iz1 = vec4<f32>(pi1.z);

    let ixy = permute(permute(ix) + iy);
    let ixy0 = permute(ixy + iz0);
    let ixy1 = permute(ixy + iz1);

    var gx0 = ixy0 / 7.0;
    var gy0 = fract(floor(gx0) / 7.0) - 0.5;
    gx0 = fract(gx0);
    let gz0 = vec4<f32>(0.5) - abs(gx0) - abs(gy0);
    let sz0 = step(gz0, vec4<f32>(0.0));
    gx0 = gx0 - sz0 * (step(vec4<f32>(0.0), gx0) - 0.5);
    gy0 = gy0 - sz0 * (step(vec4<f32>(0.0), gy0) - 0.5);

    var gx1 = ixy1 / 7.0;
    var gy1 = fract(floor(gx1) / 7.0) - 0.5;
    gx1 = fract(gx1);
    let gz1 = vec4<f32>(0.5) - abs(gx1) - abs(gy1);
    let sz1 = step(gz1, vec4<f32>(0.0));
    gx1 = gx1 - sz1 * (step(vec4<f32>(0.0), gx1) - 0.5);
    gy1 = gy1 - sz1 * (step(vec4<f32>(0.0), gy1) - 0.5);

    var g000 = vec3<f32>(gx0.x, gy0.x, gz0.x);
    var g100 = vec3<f32>(gx0.y, gy0.y, gz0.y);
    var g010 = vec3<f32>(gx0.z, gy0.z, gz0.z);
    var g110 = vec3<f32>(gx0.w, gy0.w, gz0.w);
    var g001 = vec3<f32>(gx1.x, gy1.x, gz1.x);
    var g101 = vec3<f32>(gx1.y, gy1.y, gz1.y);
    var g011 = vec3<f32>(gx1.z, gy1.z, gz1.z);
    var g111 = vec3<f32>(gx1.w, gy1.w, gz1.w);

    let norm0 = taylor_inv_sqrt(vec4<f32>(dot(g000, g000), dot(g010, g010), dot(g100, g100), dot(g110, g110)));
    g000 = g000 * norm0.x;
    g010 = g010 * norm0.y;
    g100 = g100 * norm0.z;
    g110 = g110 * norm0.w;
    let norm1 = taylor_inv_sqrt(vec4<f32>(dot(g001, g001), dot(g011, g011), dot(g101, g101), dot(g111, g111)));
    g001 = g001 * norm1.x;
    g011 = g011 * norm1.y;
    g101 = g101 * norm1.z;
    g111 = g111 * norm1.w;

    let n000 = dot(g000, pf0);
    let n100 = dot(g100, vec3<f32>(pf1.x, pf0.y, pf0.z));
    let n010 = dot(g010, vec3<f32>(pf0.x, pf1.y, pf0.z));
    let n110 = dot(g110, vec3<f32>(pf1.x, pf1.y, pf0.z));
    let n001 = dot(g001, vec3<f32>(pf0.x, pf0.y, pf1.z));
    let n101 = dot(g101, vec3<f32>(pf1.x, pf0.y, pf1.z));
    let n011 = dot(g011, vec3<f32>(pf0.x, pf1.y, pf1.z));
    let n111 = dot(g111, pf1);

    let fade_xyz = fade(pf0);
    let n_z = mix(vec4<f32>(n000, n100, n010, n110), vec4<f32>(n001, n101, n011, n111), vec4<f32>(fade_xyz.z));
    let n_yz = mix(n_z.xy, n_z.zw, vec2<f32>(fade_xyz.y));
    let n_xyz = mix(n_yz.x, n_yz.y, fade_xyz.x);
    return 2.2 * n_xyz;
}
"#;

/// Mesh, portal and firefly stages of the scene pass.
pub const SCENE_WGSL: &str = r#"
struct SceneUniforms {
    projection: mat4x4<f32>,
    view: mat4x4<f32>,
    color_start: vec4<f32>,
    color_end: vec4<f32>,
    // x: time, y: pixel ratio, z: firefly base size, w: noise frequency
    params: vec4<f32>,
    // xy: render target size in physical pixels
    resolution: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> scene: SceneUniforms;

struct MeshInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) color: vec4<f32>,
}

struct MeshOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec4<f32>,
}

@vertex
fn vs_mesh(model: MeshInput) -> MeshOutput {
    var out: MeshOutput;
    out.clip_position = scene.projection * scene.view * vec4<f32>(model.position, 1.0);
    out.uv = model.uv;
    out.color = model.color;
    return out;
}

@fragment
fn fs_baked(in: MeshOutput) -> @location(0) vec4<f32> {
    return in.color;
}

@fragment
fn fs_portal(in: MeshOutput) -> @location(0) vec4<f32> {
    let time = scene.params.x;
    let frequency = scene.params.w;

    // Displace the UV
    let displaced_uv = in.uv + vec2<f32>(cnoise(vec3<f32>(in.uv * frequency, time)));
    var strength = cnoise(vec3<f32>(displaced_uv * frequency, time * 0.2));

    // Outer glow
    let outer_glow = distance(in.uv, vec2<f32>(0.5)) * 5.0 - 1.4;
    strength = strength + outer_glow;

    // Hard step, gives the banded edge
    strength = strength + step(-0.2, strength) * 0.8;
    strength = clamp(strength, 0.0, 1.0);

    let color = mix(scene.color_start.rgb, scene.color_end.rgb, vec3<f32>(strength));
    return vec4<f32>(color, 1.0);
}

struct FireflyInput {
    @location(0) position: vec3<f32>,
    @location(1) scale: f32,
}

struct FireflyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) point_coord: vec2<f32>,
    @location(1) alpha: f32,
}

@vertex
fn vs_firefly(@builtin(vertex_index) index: u32, firefly: FireflyInput) -> FireflyOutput {
    var corners = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0), vec2<f32>(1.0, -1.0), vec2<f32>(1.0, 1.0),
        vec2<f32>(-1.0, -1.0), vec2<f32>(1.0, 1.0), vec2<f32>(-1.0, 1.0),
    );
    let corner = corners[index];
    let time = scene.params.x;

    var model_position = vec4<f32>(firefly.position, 1.0);
    model_position.y = model_position.y + sin(time + model_position.x * 2.0) * firefly.scale * 0.2;
    model_position.x = model_position.x + cos(time + model_position.z * 2.0) * firefly.scale * 0.2;

    let view_position = scene.view * model_position;
    let clip = scene.projection * view_position;

    var point_size = scene.params.z * scene.params.y * firefly.scale * 5.0;
    point_size = point_size * (1.0 / -view_position.z);

    // Half the sprite in NDC is point_size / resolution.
    let ndc_offset = corner * point_size / scene.resolution.xy;

    var out: FireflyOutput;
    out.clip_position = clip + vec4<f32>(ndc_offset * clip.w, 0.0, 0.0);
    out.point_coord = corner * 0.5 + vec2<f32>(0.5);
    out.alpha = clamp(2.0 * firefly.scale - abs(sin(time + firefly.scale)), 0.0, 1.0);
    return out;
}

@fragment
fn fs_firefly(in: FireflyOutput) -> @location(0) vec4<f32> {
    let distance_to_center = length(in.point_coord - vec2<f32>(0.5));
    let strength = pow(1.0 - distance_to_center, 10.0);
    if strength < 0.1 {
        discard;
    }
    return vec4<f32>(1.0, 1.0, 1.0, strength * in.alpha);
}
"#;

/// A compiled WGSL program failed to parse or validate.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderError {
    pub program: String,
    pub message: String,
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader program '{}' failed to compile: {}", self.program, self.message)
    }
}

impl std::error::Error for ShaderError {}

/// WGSL source plus the entry points the pipeline will use.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderProgram {
    name: String,
    source: String,
    vertex_entries: Vec<&'static str>,
    fragment_entries: Vec<&'static str>,
}

impl ShaderProgram {
    pub fn new(
        name: &str,
        source: impl Into<String>,
        vertex_entries: &[&'static str],
        fragment_entries: &[&'static str],
    ) -> Self {
        Self {
            name: name.to_string(),
            source: source.into(),
            vertex_entries: vertex_entries.to_vec(),
            fragment_entries: fragment_entries.to_vec(),
        }
    }

    /// Full-screen program: the shared vertex stage followed by `fragment`,
    /// which must define `fs_main`.
    pub fn fullscreen(name: &str, fragment: &str) -> Self {
        Self::new(name, format!("{FULLSCREEN_VERTEX}{fragment}"), &["vs_main"], &["fs_main"])
    }

    pub fn scene() -> Self {
        Self::new(
            "scene",
            format!("{NOISE_WGSL}{SCENE_WGSL}"),
            &["vs_mesh", "vs_firefly"],
            &["fs_baked", "fs_portal", "fs_firefly"],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Identifies the compiled program: two programs sharing a name but not
    /// a source or entry points get different keys.
    pub fn cache_key(&self) -> (String, u64) {
        let mut hasher = DefaultHasher::new();
        self.source.hash(&mut hasher);
        self.vertex_entries.hash(&mut hasher);
        self.fragment_entries.hash(&mut hasher);
        (self.name.clone(), hasher.finish())
    }

    pub fn vertex_entry(&self) -> &'static str {
        self.vertex_entries.first().copied().unwrap_or("vs_main")
    }

    pub fn fragment_entry(&self) -> &'static str {
        self.fragment_entries.first().copied().unwrap_or("fs_main")
    }

    /// Parses and validates the WGSL, then checks the declared entry points
    /// exist for the right stage.
    pub fn validate(&self) -> Result<(), ShaderError> {
        let module = naga::front::wgsl::parse_str(&self.source).map_err(|e| ShaderError {
            program: self.name.clone(),
            message: e.emit_to_string(&self.source),
        })?;

        naga::valid::Validator::new(naga::valid::ValidationFlags::all(), naga::valid::Capabilities::all())
            .validate(&module)
            .map_err(|e| ShaderError {
                program: self.name.clone(),
                message: format!("{e:?}"),
            })?;

        let has_entry = |name: &str, stage: naga::ShaderStage| {
            module.entry_points.iter().any(|ep| ep.name == name && ep.stage == stage)
        };
        for entry in &self.vertex_entries {
            if !has_entry(entry, naga::ShaderStage::Vertex) {
                return Err(self.missing_entry(entry, "vertex"));
            }
        }
        for entry in &self.fragment_entries {
            if !has_entry(entry, naga::ShaderStage::Fragment) {
                return Err(self.missing_entry(entry, "fragment"));
            }
        }
        Ok(())
    }

    fn missing_entry(&self, entry: &str, stage: &str) -> ShaderError {
        ShaderError {
            program: self.name.clone(),
            message: format!("missing {stage} entry point '{entry}'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_fullscreen_programs_validate() {
        let programs = [
            ("tint", TINT_FRAGMENT),
            ("displacement", DISPLACEMENT_FRAGMENT),
            ("gamma", GAMMA_FRAGMENT),
            ("rgb_shift", RGB_SHIFT_FRAGMENT),
            ("dot_screen", DOT_SCREEN_FRAGMENT),
            ("fxaa", FXAA_FRAGMENT),
            ("bloom_threshold", BLOOM_THRESHOLD_FRAGMENT),
            ("bloom_blur", BLOOM_BLUR_FRAGMENT),
            ("bloom_composite", BLOOM_COMPOSITE_FRAGMENT),
        ];
        for (name, fragment) in programs {
            let program = ShaderProgram::fullscreen(name, fragment);
            if let Err(e) = program.validate() {
                panic!("{e}");
            }
        }
    }

    #[test]
    fn scene_program_validates() {
        ShaderProgram::scene().validate().unwrap();
    }

    #[test]
    fn every_scene_vertex_entry_is_checked() {
        let renamed = SCENE_WGSL.replace("fn vs_firefly(", "fn vs_sprite(");
        let program = ShaderProgram::new(
            "scene",
            format!("{NOISE_WGSL}{renamed}"),
            &["vs_mesh", "vs_firefly"],
            &["fs_baked", "fs_portal", "fs_firefly"],
        );
        let err = program.validate().unwrap_err();
        assert!(err.message.contains("vertex entry point 'vs_firefly'"), "{}", err.message);
    }

    #[test]
    fn cache_key_follows_source_not_just_name() {
        let bloom = ShaderProgram::fullscreen("bloom_threshold", BLOOM_THRESHOLD_FRAGMENT);
        let impostor = ShaderProgram::fullscreen("bloom_threshold", TINT_FRAGMENT);
        assert_ne!(bloom.cache_key(), impostor.cache_key());
        assert_eq!(
            bloom.cache_key(),
            ShaderProgram::fullscreen("bloom_threshold", BLOOM_THRESHOLD_FRAGMENT).cache_key()
        );
    }

    #[test]
    fn syntax_errors_name_the_program() {
        let program = ShaderProgram::fullscreen("broken", "@fragment fn fs_main( -> {");
        let err = program.validate().unwrap_err();
        assert_eq!(err.program, "broken");
        assert!(!err.message.is_empty());
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn missing_fragment_entry_is_reported() {
        let program = ShaderProgram::fullscreen(
            "no_fragment",
            "@fragment fn fs_other(in: VertexOutput) -> @location(0) vec4<f32> { return vec4<f32>(in.uv, 0.0, 1.0); }",
        );
        let err = program.validate().unwrap_err();
        assert!(err.message.contains("fs_main"), "{}", err.message);
    }
}
