// tests/compositor.rs
//
// Frame routing scenarios driven through a recording encoder; no GPU needed.

use portal_fx::engine_lib::viewport::Viewport;
use portal_fx::rendering_lib::compositor::{Compositor, TargetSlot};
use portal_fx::rendering_lib::effects;
use portal_fx::rendering_lib::pass::{BloomSettings, PassEncoder, ScenePass, ShaderPass, UniformMap};
use portal_fx::rendering_lib::render_target::{RenderTarget, TargetId};

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Scene {
        name: String,
        output: Option<TargetId>,
    },
    Shader {
        name: String,
        params: Vec<[f32; 4]>,
        input: Option<TargetId>,
        output: Option<TargetId>,
    },
    Bloom {
        name: String,
        settings: BloomSettings,
        input: Option<TargetId>,
        output: Option<TargetId>,
    },
}

#[derive(Default)]
struct Recorder {
    calls: Vec<Call>,
}

fn id(target: Option<&RenderTarget>) -> Option<TargetId> {
    target.map(|t| t.id)
}

impl PassEncoder for Recorder {
    fn scene(&mut self, name: &str, _pass: &ScenePass, output: Option<&RenderTarget>) {
        self.calls.push(Call::Scene {
            name: name.to_string(),
            output: id(output),
        });
    }

    fn shader(
        &mut self,
        name: &str,
        _pass: &ShaderPass,
        uniforms: &UniformMap,
        input: Option<&RenderTarget>,
        output: Option<&RenderTarget>,
    ) {
        self.calls.push(Call::Shader {
            name: name.to_string(),
            params: uniforms.pack(),
            input: id(input),
            output: id(output),
        });
    }

    fn bloom(&mut self, name: &str, settings: BloomSettings, input: Option<&RenderTarget>, output: Option<&RenderTarget>) {
        self.calls.push(Call::Bloom {
            name: name.to_string(),
            settings,
            input: id(input),
            output: id(output),
        });
    }
}

fn record(compositor: &Compositor) -> Vec<Call> {
    let mut recorder = Recorder::default();
    compositor.render(&mut recorder);
    recorder.calls
}

fn chain(viewport: Viewport) -> Compositor {
    let mut compositor = Compositor::new(viewport, FORMAT);
    compositor.add_pass(effects::scene_pass([0.0, 0.0, 0.0, 1.0])).unwrap();
    compositor
        .add_pass(effects::tint_pass([0.1, 0.0, 0.0]).with_enabled(false))
        .unwrap();
    compositor
        .add_pass(effects::bloom_pass(BloomSettings::new(0.3, 1.0, 0.05)))
        .unwrap();
    compositor.add_pass(effects::gamma_pass()).unwrap();
    compositor
}

#[test]
fn disabled_tint_is_skipped_and_gamma_reaches_the_screen() {
    let compositor = chain(Viewport::new(100, 100, 1.0));
    let a = compositor.target(TargetSlot::A).id;
    let b = compositor.target(TargetSlot::B).id;

    assert_eq!(
        record(&compositor),
        vec![
            Call::Scene {
                name: "scene".to_string(),
                output: Some(b),
            },
            Call::Bloom {
                name: "bloom".to_string(),
                settings: BloomSettings::new(0.3, 1.0, 0.05),
                input: Some(b),
                output: Some(a),
            },
            Call::Shader {
                name: "gamma".to_string(),
                params: vec![[0.0; 4]],
                input: Some(a),
                output: None,
            },
        ]
    );
}

#[test]
fn reenabling_a_pass_restores_the_original_frame() {
    let mut compositor = chain(Viewport::new(100, 100, 1.0));
    compositor.set_enabled(effects::TINT, true).unwrap();
    let never_disabled = record(&compositor);

    compositor.set_enabled(effects::TINT, false).unwrap();
    let without_tint = record(&compositor);
    assert_eq!(without_tint.len(), never_disabled.len() - 1);

    compositor.set_enabled(effects::TINT, true).unwrap();
    assert_eq!(record(&compositor), never_disabled);
}

#[test]
fn toggling_only_changes_topology() {
    let mut compositor = chain(Viewport::new(100, 100, 1.0));
    let before: Vec<u64> = compositor.pool().targets().map(|t| t.id.raw()).collect();
    for enabled in [true, false, true] {
        compositor.set_enabled(effects::TINT, enabled).unwrap();
        record(&compositor);
    }
    let after: Vec<u64> = compositor.pool().targets().map(|t| t.id.raw()).collect();
    assert_eq!(before, after);
}

#[test]
fn resize_produces_exact_buffer_sizes_and_is_idempotent() {
    let mut compositor = chain(Viewport::new(100, 100, 1.0));
    for (w, h) in [(1, 1), (640, 480), (7, 1301)] {
        compositor.set_size(Viewport::new(w, h, 1.0));
        for slot in [TargetSlot::A, TargetSlot::B] {
            let target = compositor.target(slot);
            assert_eq!((target.width, target.height), (w, h));
            assert_eq!(target.sample_count, 2);
        }

        let ids = (compositor.target(TargetSlot::A).id, compositor.target(TargetSlot::B).id);
        assert_eq!(compositor.set_size(Viewport::new(w, h, 1.0)), 0);
        assert_eq!(
            (compositor.target(TargetSlot::A).id, compositor.target(TargetSlot::B).id),
            ids
        );
    }
}

#[test]
fn minimised_window_keeps_the_last_buffers() {
    let mut compositor = chain(Viewport::new(100, 100, 1.0));
    let id = compositor.target(TargetSlot::A).id;
    assert_eq!(compositor.set_size(Viewport::new(0, 0, 1.0)), 0);
    assert_eq!(compositor.target(TargetSlot::A).id, id);
    assert_eq!(compositor.viewport().aspect(), 1.0);
}

#[test]
fn high_pixel_ratio_scales_buffers_without_multisampling() {
    let mut compositor = chain(Viewport::new(100, 100, 1.0));
    assert_eq!(compositor.set_size(Viewport::new(100, 50, 3.0)), 2);
    let target = compositor.target(TargetSlot::B);
    assert_eq!((target.width, target.height), (200, 100));
    assert!(!target.is_multisampled());
}

#[test]
fn every_pass_disabled_renders_nothing() {
    let mut compositor = chain(Viewport::new(100, 100, 1.0));
    for name in [effects::SCENE, effects::BLOOM, effects::GAMMA] {
        compositor.set_enabled(name, false).unwrap();
    }
    assert!(record(&compositor).is_empty());
}

#[test]
fn first_pass_without_scene_has_no_input() {
    let mut compositor = chain(Viewport::new(100, 100, 1.0));
    compositor.set_enabled(effects::SCENE, false).unwrap();
    match record(&compositor).first() {
        Some(Call::Bloom { input, .. }) => assert_eq!(*input, None),
        other => panic!("unexpected first call {other:?}"),
    }
}
