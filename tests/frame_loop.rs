// tests/frame_loop.rs

use glam::Vec2;
use rand::{rngs::StdRng, SeedableRng};

use portal_fx::engine_lib::clock::FrameTime;
use portal_fx::engine_lib::main_loop::{FrameHandler, MainLoop};
use portal_fx::engine_lib::viewport::Viewport;
use portal_fx::rendering_lib::compositor::Compositor;
use portal_fx::rendering_lib::effects;
use portal_fx::rendering_lib::noise::NoiseShading;
use portal_fx::rendering_lib::particles::ParticleField;
use portal_fx::rendering_lib::pass::{BloomSettings, PassEncoder, ScenePass, ShaderPass, UniformMap};
use portal_fx::rendering_lib::render_target::RenderTarget;

#[derive(Default)]
struct CountingEncoder {
    passes: usize,
}

impl PassEncoder for CountingEncoder {
    fn scene(&mut self, _: &str, _: &ScenePass, _: Option<&RenderTarget>) {
        self.passes += 1;
    }

    fn shader(&mut self, _: &str, _: &ShaderPass, _: &UniformMap, _: Option<&RenderTarget>, _: Option<&RenderTarget>) {
        self.passes += 1;
    }

    fn bloom(&mut self, _: &str, _: BloomSettings, _: Option<&RenderTarget>, _: Option<&RenderTarget>) {
        self.passes += 1;
    }
}

struct Demo {
    compositor: Compositor,
    shading: NoiseShading,
    fireflies: ParticleField,
    encoder: CountingEncoder,
    // (elapsed, shading time, firefly time) seen by each render
    renders: Vec<(f32, f32, f32)>,
}

impl Demo {
    fn new() -> Self {
        let mut compositor = Compositor::new(Viewport::new(100, 100, 1.0), wgpu::TextureFormat::Rgba16Float);
        compositor.add_pass(effects::scene_pass([0.0; 4])).unwrap();
        compositor.add_pass(effects::gamma_pass()).unwrap();
        Self {
            compositor,
            shading: NoiseShading::default(),
            fireflies: ParticleField::new(30, &mut StdRng::seed_from_u64(1)),
            encoder: CountingEncoder::default(),
            renders: Vec::new(),
        }
    }
}

impl FrameHandler for Demo {
    type Error = String;

    fn update(&mut self, frame: &FrameTime) {
        self.shading.set_time(frame.elapsed);
        self.fireflies.set_time(frame.elapsed);
        self.compositor.set_time(frame.elapsed);
    }

    fn render(&mut self, frame: &FrameTime) -> Result<(), String> {
        self.compositor.render(&mut self.encoder);
        self.renders
            .push((frame.elapsed, self.shading.time, self.fireflies.time()));
        Ok(())
    }
}

#[test]
fn every_consumer_sees_the_frame_timestamp() {
    let mut main_loop = MainLoop::new();
    let mut demo = Demo::new();
    main_loop.start();
    for dt in [0.016, 0.017, 0.5] {
        main_loop.tick(dt, &mut demo).unwrap();
    }
    assert_eq!(demo.renders.len(), 3);
    for (elapsed, shading_time, firefly_time) in &demo.renders {
        assert_eq!(elapsed, shading_time);
        assert_eq!(elapsed, firefly_time);
    }
    assert_eq!(demo.encoder.passes, 6);
}

#[test]
fn stopping_tears_the_loop_down() {
    let mut main_loop = MainLoop::new();
    let mut demo = Demo::new();
    main_loop.start();
    main_loop.tick(0.016, &mut demo).unwrap();
    main_loop.stop();
    assert_eq!(main_loop.tick(0.016, &mut demo), Ok(None));
    assert_eq!(demo.encoder.passes, 2);
}

#[test]
fn portal_centre_sits_in_the_glow_minimum() {
    let shading = NoiseShading::default();
    let centre = Vec2::splat(0.5);
    assert!(shading.raw_strength_at(centre) < -1.4 + 1.0);
    assert_eq!(shading.strength_at(centre), 0.0);
    assert_eq!(shading.color_at(centre), shading.color_start);
}
