// src/settings.rs

use glam::Vec3;

use portal_fx::engine_lib::assets::TextureSlot;
use portal_fx::engine_lib::params::{color_from_hex, ParamChange, ParamRange, ParamValue, ParameterSet};
use portal_fx::engine_lib::viewport::Viewport;
use portal_fx::rendering_lib::compositor::{Compositor, CompositorError};
use portal_fx::rendering_lib::effects;
use portal_fx::rendering_lib::noise::NoiseShading;
use portal_fx::rendering_lib::particles::{ParticleField, DEFAULT_BASE_SIZE, DEFAULT_COUNT};
use portal_fx::rendering_lib::pass::{BloomSettings, Pass, PassKind, UniformValue};

pub const CLEAR_COLOR: &str = "clear_color";
pub const FIREFLIES_SIZE: &str = "fireflies_size";
pub const PORTAL_COLOR_START: &str = "portal_color_start";
pub const PORTAL_COLOR_END: &str = "portal_color_end";
pub const TINT_ENABLED: &str = "tint_enabled";
pub const TINT_RED: &str = "tint_red";
pub const TINT_GREEN: &str = "tint_green";
pub const TINT_BLUE: &str = "tint_blue";
pub const BLOOM_ENABLED: &str = "bloom_enabled";
pub const BLOOM_STRENGTH: &str = "bloom_strength";
pub const BLOOM_RADIUS: &str = "bloom_radius";
pub const BLOOM_THRESHOLD: &str = "bloom_threshold";
pub const DOT_SCREEN_ENABLED: &str = "dot_screen_enabled";
pub const RGB_SHIFT_ENABLED: &str = "rgb_shift_enabled";

const FINE_STEP: f32 = 0.001;

/// Startup settings of the demo.
#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub title: String,
    pub logical_size: (u32, u32),
    pub firefly_count: usize,
    pub firefly_size: f32,
    pub clear_color: [f32; 3],
    pub portal_color_start: [f32; 3],
    pub portal_color_end: [f32; 3],
    pub tint: [f32; 3],
    pub bloom: BloomSettings,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            title: "Portal FX".to_string(),
            logical_size: (1024, 768),
            firefly_count: DEFAULT_COUNT,
            firefly_size: DEFAULT_BASE_SIZE,
            clear_color: color_from_hex("#020202").unwrap_or([0.0; 3]),
            portal_color_start: color_from_hex("#ff0000").unwrap_or([1.0, 0.0, 0.0]),
            portal_color_end: color_from_hex("#0000ff").unwrap_or([0.0, 0.0, 1.0]),
            tint: [0.1, 0.0, 0.0],
            bloom: BloomSettings::new(0.3, 1.0, 0.05),
        }
    }
}

impl DemoConfig {
    pub fn clear_color_rgba(&self) -> [f32; 4] {
        let [r, g, b] = self.clear_color;
        [r, g, b, 1.0]
    }

    pub fn shading(&self) -> NoiseShading {
        NoiseShading::new(Vec3::from(self.portal_color_start), Vec3::from(self.portal_color_end))
    }

    /// The post-processing chain in render order. FXAA joins only when
    /// multisampling was wanted but the offscreen format cannot do it.
    pub fn build_compositor(
        &self,
        viewport: Viewport,
        format: wgpu::TextureFormat,
        normal_map: TextureSlot,
        multisample_supported: bool,
    ) -> Result<Compositor, CompositorError> {
        let mut compositor = Compositor::new(viewport, format);
        let mut passes: Vec<Pass> = vec![
            effects::scene_pass(self.clear_color_rgba()),
            effects::tint_pass(self.tint).with_enabled(false),
            effects::displacement_pass(normal_map),
            effects::dot_screen_pass([0.5, 0.5], 1.57, 1.0).with_enabled(false),
            effects::rgb_shift_pass(0.005, 0.0).with_enabled(false),
            effects::bloom_pass(self.bloom),
            effects::gamma_pass(),
        ];
        if effects::needs_antialias_fallback(viewport.pixel_ratio, multisample_supported) {
            log::info!("multisampling unavailable, adding FXAA fallback");
            passes.push(effects::fxaa_pass());
        }
        for pass in passes {
            compositor.add_pass(pass)?;
        }
        Ok(compositor)
    }

    /// Tunables shown in the parameter panel, seeded from this config and
    /// the compositor's current pass state.
    pub fn parameters(&self, compositor: &Compositor) -> ParameterSet {
        let enabled = |name: &str| compositor.pass(name).is_some_and(Pass::is_enabled);
        let [r, g, b] = self.tint;
        ParameterSet::new()
            .color(CLEAR_COLOR, "Clear color", self.clear_color)
            .float(FIREFLIES_SIZE, "Fireflies size", self.firefly_size, ParamRange::new(0.0, 500.0, 1.0))
            .color(PORTAL_COLOR_START, "Portal color start", self.portal_color_start)
            .color(PORTAL_COLOR_END, "Portal color end", self.portal_color_end)
            .toggle(TINT_ENABLED, "Tint", enabled(effects::TINT))
            .float(TINT_RED, "Tint red", r, ParamRange::new(-1.0, 1.0, FINE_STEP))
            .float(TINT_GREEN, "Tint green", g, ParamRange::new(-1.0, 1.0, FINE_STEP))
            .float(TINT_BLUE, "Tint blue", b, ParamRange::new(-1.0, 1.0, FINE_STEP))
            .toggle(BLOOM_ENABLED, "Unreal bloom", enabled(effects::BLOOM))
            .float(BLOOM_STRENGTH, "Bloom strength", self.bloom.strength, ParamRange::new(0.0, 2.0, FINE_STEP))
            .float(BLOOM_RADIUS, "Bloom radius", self.bloom.radius, ParamRange::new(0.0, 1.0, FINE_STEP))
            .float(
                BLOOM_THRESHOLD,
                "Bloom threshold",
                self.bloom.threshold,
                ParamRange::new(0.0, 1.0, FINE_STEP),
            )
            .toggle(DOT_SCREEN_ENABLED, "Dot screen", enabled(effects::DOT_SCREEN))
            .toggle(RGB_SHIFT_ENABLED, "RGB shift", enabled(effects::RGB_SHIFT))
    }
}

/// Everything a parameter change can reach.
pub struct Tunables<'a> {
    pub compositor: &'a mut Compositor,
    pub shading: &'a mut NoiseShading,
    pub fireflies: &'a mut ParticleField,
}

impl Tunables<'_> {
    pub fn apply(&mut self, params: &ParameterSet, change: &ParamChange) -> Result<(), CompositorError> {
        let float = |name: &str| params.get(name).and_then(|v| v.as_float()).unwrap_or(0.0);

        match (change.name.as_str(), change.value) {
            (CLEAR_COLOR, ParamValue::Color([r, g, b])) => {
                if let Some(PassKind::Scene(scene)) = self.compositor.pass_mut(effects::SCENE).map(Pass::kind_mut) {
                    scene.clear_color = [r, g, b, 1.0];
                }
            }
            (FIREFLIES_SIZE, ParamValue::Float(size)) => self.fireflies.set_base_size(size),
            (PORTAL_COLOR_START, ParamValue::Color(c)) => self.shading.color_start = Vec3::from(c),
            (PORTAL_COLOR_END, ParamValue::Color(c)) => self.shading.color_end = Vec3::from(c),
            (TINT_ENABLED, ParamValue::Bool(on)) => self.compositor.set_enabled(effects::TINT, on)?,
            (TINT_RED | TINT_GREEN | TINT_BLUE, ParamValue::Float(_)) => {
                let tint = [float(TINT_RED), float(TINT_GREEN), float(TINT_BLUE)];
                self.compositor
                    .set_uniform(effects::TINT, "tint", UniformValue::Vec3(tint))?;
            }
            (BLOOM_ENABLED, ParamValue::Bool(on)) => self.compositor.set_enabled(effects::BLOOM, on)?,
            (BLOOM_STRENGTH, ParamValue::Float(v)) => {
                self.compositor
                    .set_uniform(effects::BLOOM, "strength", UniformValue::Float(v))?
            }
            (BLOOM_RADIUS, ParamValue::Float(v)) => {
                self.compositor
                    .set_uniform(effects::BLOOM, "radius", UniformValue::Float(v))?
            }
            (BLOOM_THRESHOLD, ParamValue::Float(v)) => {
                self.compositor
                    .set_uniform(effects::BLOOM, "threshold", UniformValue::Float(v))?
            }
            (DOT_SCREEN_ENABLED, ParamValue::Bool(on)) => self.compositor.set_enabled(effects::DOT_SCREEN, on)?,
            (RGB_SHIFT_ENABLED, ParamValue::Bool(on)) => self.compositor.set_enabled(effects::RGB_SHIFT, on)?,
            (name, value) => log::debug!("parameter '{name}' = {value:?} has no binding"),
        }
        Ok(())
    }

    /// Applies every queued change in write order. A change that fails is
    /// logged and skipped.
    pub fn apply_pending(&mut self, params: &mut ParameterSet) {
        for change in params.take_changes() {
            if let Err(e) = self.apply(params, &change) {
                log::warn!("could not apply '{}': {e}", change.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_fx::engine_lib::assets::FLAT_NORMAL_RGBA;
    use rand::{rngs::StdRng, SeedableRng};

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

    fn setup() -> (DemoConfig, Compositor, NoiseShading, ParticleField) {
        let config = DemoConfig::default();
        let compositor = config
            .build_compositor(
                Viewport::new(100, 100, 2.0),
                FORMAT,
                TextureSlot::pending(FLAT_NORMAL_RGBA),
                true,
            )
            .unwrap();
        let fireflies = ParticleField::new(config.firefly_count, &mut StdRng::seed_from_u64(7));
        (config.clone(), compositor, config.shading(), fireflies)
    }

    #[test]
    fn default_chain_order() {
        let (_, compositor, _, _) = setup();
        let names: Vec<&str> = compositor.passes().iter().map(Pass::name).collect();
        assert_eq!(
            names,
            vec!["scene", "tint", "displacement", "dot_screen", "rgb_shift", "bloom", "gamma"]
        );
        let enabled: Vec<bool> = compositor.passes().iter().map(Pass::is_enabled).collect();
        assert_eq!(enabled, vec![true, false, true, false, false, true, true]);
    }

    #[test]
    fn tint_starts_off_and_can_be_toggled() {
        let (config, mut compositor, mut shading, mut fireflies) = setup();
        let mut params = config.parameters(&compositor);
        assert_eq!(params.get(TINT_ENABLED), Some(ParamValue::Bool(false)));

        params.set(TINT_ENABLED, ParamValue::Bool(true)).unwrap();
        Tunables {
            compositor: &mut compositor,
            shading: &mut shading,
            fireflies: &mut fireflies,
        }
        .apply_pending(&mut params);
        assert!(compositor.pass(effects::TINT).is_some_and(Pass::is_enabled));
    }

    #[test]
    fn fxaa_joins_only_as_a_fallback() {
        let config = DemoConfig::default();
        let slot = || TextureSlot::pending(FLAT_NORMAL_RGBA);
        let with_msaa = config
            .build_compositor(Viewport::new(100, 100, 1.0), FORMAT, slot(), true)
            .unwrap();
        assert!(with_msaa.pass(effects::FXAA).is_none());
        let without = config
            .build_compositor(Viewport::new(100, 100, 1.0), FORMAT, slot(), false)
            .unwrap();
        assert_eq!(without.passes().last().map(Pass::name), Some(effects::FXAA));
    }

    #[test]
    fn tint_changes_reach_the_tint_pass() {
        let (config, mut compositor, mut shading, mut fireflies) = setup();
        let mut params = config.parameters(&compositor);
        params.set(TINT_GREEN, ParamValue::Float(0.5)).unwrap();
        params.set(TINT_BLUE, ParamValue::Float(-3.0)).unwrap();
        Tunables {
            compositor: &mut compositor,
            shading: &mut shading,
            fireflies: &mut fireflies,
        }
        .apply_pending(&mut params);

        let tint = compositor.pass(effects::TINT).and_then(|p| p.uniforms.get("tint")).cloned();
        assert!(matches!(tint, Some(UniformValue::Vec3([r, g, b])) if r == 0.1 && g == 0.5 && b == -1.0));
    }

    #[test]
    fn bloom_toggle_and_strength() {
        let (config, mut compositor, mut shading, mut fireflies) = setup();
        let mut params = config.parameters(&compositor);
        assert_eq!(params.get(BLOOM_ENABLED), Some(ParamValue::Bool(true)));
        assert_eq!(params.get(DOT_SCREEN_ENABLED), Some(ParamValue::Bool(false)));

        params.set(BLOOM_ENABLED, ParamValue::Bool(false)).unwrap();
        params.set(BLOOM_STRENGTH, ParamValue::Float(1.5)).unwrap();
        let mut tunables = Tunables {
            compositor: &mut compositor,
            shading: &mut shading,
            fireflies: &mut fireflies,
        };
        tunables.apply_pending(&mut params);

        let bloom = compositor.pass(effects::BLOOM).unwrap();
        assert!(!bloom.is_enabled());
        assert_eq!(bloom.uniforms.get_float("strength"), Some(1.5));
    }

    #[test]
    fn scene_side_parameters() {
        let (config, mut compositor, mut shading, mut fireflies) = setup();
        let mut params = config.parameters(&compositor);
        params.set(FIREFLIES_SIZE, ParamValue::Float(120.0)).unwrap();
        params.set(PORTAL_COLOR_END, ParamValue::Color([0.0, 1.0, 0.0])).unwrap();
        params.set(CLEAR_COLOR, ParamValue::Color([0.5, 0.5, 0.5])).unwrap();
        Tunables {
            compositor: &mut compositor,
            shading: &mut shading,
            fireflies: &mut fireflies,
        }
        .apply_pending(&mut params);

        assert_eq!(fireflies.base_size(), 120.0);
        assert_eq!(shading.color_end, Vec3::new(0.0, 1.0, 0.0));
        match compositor.pass(effects::SCENE).map(Pass::kind) {
            Some(PassKind::Scene(scene)) => assert_eq!(scene.clear_color, [0.5, 0.5, 0.5, 1.0]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
