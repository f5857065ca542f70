// src/rendering_lib/effects.rs
//
// Preset passes for the post-processing chain.

use glam::{Vec2, Vec3, Vec4};

use crate::engine_lib::assets::TextureSlot;

use super::pass::{BloomSettings, Pass, UniformMap, UniformValue};
use super::render_target::sample_count_for_pixel_ratio;
use super::shader::{
    ShaderProgram, DISPLACEMENT_FRAGMENT, DOT_SCREEN_FRAGMENT, FXAA_FRAGMENT, GAMMA_FRAGMENT, RGB_SHIFT_FRAGMENT,
    TINT_FRAGMENT,
};

pub const SCENE: &str = "scene";
pub const TINT: &str = "tint";
pub const DISPLACEMENT: &str = "displacement";
pub const DOT_SCREEN: &str = "dot_screen";
pub const RGB_SHIFT: &str = "rgb_shift";
pub const BLOOM: &str = "bloom";
pub const GAMMA: &str = "gamma";
pub const FXAA: &str = "fxaa";

/// UV offset per unit of decoded normal in the displacement pass.
pub const DISPLACEMENT_UV_SCALE: f32 = 0.1;
/// Added brightness when the normal faces the light head on.
pub const DISPLACEMENT_LIGHT_GAIN: f32 = 2.0;

pub fn scene_pass(clear_color: [f32; 4]) -> Pass {
    Pass::scene(SCENE, clear_color)
}

/// Adds `tint` to every pixel's rgb.
pub fn tint_pass(tint: [f32; 3]) -> Pass {
    let uniforms = UniformMap::new().with("tint", UniformValue::Vec3(tint));
    Pass::shader(TINT, ShaderProgram::fullscreen(TINT, TINT_FRAGMENT), uniforms)
}

/// Fake relief lighting from a normal map, see `DISPLACEMENT_FRAGMENT`.
pub fn displacement_pass(normal_map: TextureSlot) -> Pass {
    let uniforms = UniformMap::new().with("normal_map", UniformValue::Texture(normal_map));
    Pass::shader(DISPLACEMENT, ShaderProgram::fullscreen(DISPLACEMENT, DISPLACEMENT_FRAGMENT), uniforms)
}

pub fn dot_screen_pass(center: [f32; 2], angle: f32, scale: f32) -> Pass {
    let uniforms = UniformMap::new()
        .with("center", UniformValue::Vec2(center))
        .with("angle", UniformValue::Float(angle))
        .with("scale", UniformValue::Float(scale))
        .with("size", UniformValue::Vec2([256.0, 256.0]));
    Pass::shader(DOT_SCREEN, ShaderProgram::fullscreen(DOT_SCREEN, DOT_SCREEN_FRAGMENT), uniforms)
}

pub fn rgb_shift_pass(amount: f32, angle: f32) -> Pass {
    let uniforms = UniformMap::new()
        .with("amount", UniformValue::Float(amount))
        .with("angle", UniformValue::Float(angle));
    Pass::shader(RGB_SHIFT, ShaderProgram::fullscreen(RGB_SHIFT, RGB_SHIFT_FRAGMENT), uniforms)
}

pub fn bloom_pass(settings: BloomSettings) -> Pass {
    Pass::bloom(BLOOM, settings)
}

/// Linear to sRGB. Belongs after every colour-compositing pass.
pub fn gamma_pass() -> Pass {
    Pass::shader(GAMMA, ShaderProgram::fullscreen(GAMMA, GAMMA_FRAGMENT), UniformMap::new())
}

pub fn fxaa_pass() -> Pass {
    Pass::shader(FXAA, ShaderProgram::fullscreen(FXAA, FXAA_FRAGMENT), UniformMap::new())
}

/// Whether the chain needs the FXAA pass: multisampling was wanted for this
/// pixel ratio but the offscreen format cannot provide it. When this is
/// false the pass is not added at all.
pub fn needs_antialias_fallback(pixel_ratio: f32, multisample_supported: bool) -> bool {
    sample_count_for_pixel_ratio(pixel_ratio) > 1 && !multisample_supported
}

/// sRGB OETF, the CPU side of the gamma pass.
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// CPU side of `TINT_FRAGMENT`.
pub fn tint(color: Vec4, tint: Vec3) -> Vec4 {
    (color.truncate() + tint).extend(color.w)
}

/// CPU side of `DISPLACEMENT_FRAGMENT` for one fragment. `normal_rgb` is the
/// normal-map texel in [0, 1]. Returns the uv the input is sampled at and the
/// brightness added to every channel.
pub fn displacement(uv: Vec2, normal_rgb: Vec3) -> (Vec2, f32) {
    let normal = normal_rgb * 2.0 - Vec3::ONE;
    let sample_uv = uv + normal.truncate() * DISPLACEMENT_UV_SCALE;
    let light_direction = Vec3::new(-1.0, 1.0, 0.0).normalize();
    let lightness = normal.dot(light_direction).clamp(0.0, 1.0);
    (sample_uv, lightness * DISPLACEMENT_LIGHT_GAIN)
}

/// sRGB EOTF, the inverse of `linear_to_srgb`.
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_lib::assets::FLAT_NORMAL_RGBA;

    #[test]
    fn presets_compile() {
        let passes = [
            scene_pass([0.0; 4]),
            tint_pass([0.1, 0.0, 0.0]),
            displacement_pass(TextureSlot::pending(FLAT_NORMAL_RGBA)),
            dot_screen_pass([0.5, 0.5], 1.57, 1.0),
            rgb_shift_pass(0.005, 0.0),
            bloom_pass(BloomSettings::new(0.3, 1.0, 0.05)),
            gamma_pass(),
            fxaa_pass(),
        ];
        for pass in &passes {
            for program in pass.programs() {
                if let Err(e) = program.validate() {
                    panic!("{}: {e}", pass.name());
                }
            }
        }
    }

    #[test]
    fn fallback_only_when_msaa_wanted_but_missing() {
        assert!(needs_antialias_fallback(1.0, false));
        assert!(!needs_antialias_fallback(1.0, true));
        assert!(!needs_antialias_fallback(2.0, false));
        assert!(!needs_antialias_fallback(1.5, true));
    }

    #[test]
    fn tint_adds_to_rgb_only() {
        let out = tint(Vec4::new(0.2, 0.4, 0.6, 0.5), Vec3::new(0.1, -0.4, 0.0));
        assert!((out - Vec4::new(0.3, 0.0, 0.6, 0.5)).abs().max_element() < 1e-6);
    }

    #[test]
    fn flat_normal_leaves_the_frame_alone() {
        let uv = Vec2::new(0.25, 0.75);
        let (sample_uv, lightness) = displacement(uv, Vec3::new(0.5, 0.5, 1.0));
        assert_eq!(sample_uv, uv);
        assert_eq!(lightness, 0.0);
    }

    #[test]
    fn tilted_normals_shift_and_light() {
        let uv = Vec2::splat(0.5);

        // facing the light: (-1, 1, 0)
        let (sample_uv, lightness) = displacement(uv, Vec3::new(0.0, 1.0, 0.5));
        assert!((sample_uv - Vec2::new(0.4, 0.6)).length() < 1e-6);
        assert_eq!(lightness, 2.0);

        // facing away: (1, 0, 0) only moves the sample
        let (sample_uv, lightness) = displacement(uv, Vec3::new(1.0, 0.5, 0.5));
        assert!((sample_uv - Vec2::new(0.6, 0.5)).length() < 1e-6);
        assert_eq!(lightness, 0.0);

        // half tilted toward +y: dot = 0.5 / sqrt(2)
        let (_, lightness) = displacement(uv, Vec3::new(0.5, 0.75, 0.5));
        assert!((lightness - 2.0 * 0.5 / 2f32.sqrt()).abs() < 1e-6);
    }

    #[test]
    fn srgb_curve() {
        assert_eq!(linear_to_srgb(0.0), 0.0);
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-6);
        assert!((linear_to_srgb(0.002) - 0.02584).abs() < 1e-5);
        assert!((linear_to_srgb(0.5) - 0.735357).abs() < 1e-5);
        for byte in [0u8, 2, 10, 128, 255] {
            let c = byte as f32 / 255.0;
            assert!((linear_to_srgb(srgb_to_linear(c)) - c).abs() < 1e-5);
        }
    }
}
