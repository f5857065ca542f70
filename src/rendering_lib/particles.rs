// src/rendering_lib/particles.rs

use glam::{Mat4, Vec2, Vec3};
use rand::Rng;

use super::vertex::ParticleInstance;

pub const DEFAULT_COUNT: usize = 30;
pub const DEFAULT_BASE_SIZE: f32 = 20.0;

const BOB_AMPLITUDE: f32 = 0.2;
const SIZE_FACTOR: f32 = 5.0;
const FALLOFF_EXPONENT: i32 = 10;
const ALPHA_CUTOFF: f32 = 0.1;

/// One firefly. Position and scale are sampled once and never change; only
/// the rendered offset and alpha vary with time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    position: Vec3,
    scale: f32,
}

impl Particle {
    pub fn new(position: Vec3, scale: f32) -> Self {
        Self { position, scale }
    }

    /// x and z in [-1, 1], y in [0, 1.5], scale in [0, 1].
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let position = Vec3::new(
            (rng.gen::<f32>() - 0.5) * 2.0,
            rng.gen::<f32>() * 1.5,
            (rng.gen::<f32>() - 0.5) * 2.0,
        );
        Self::new(position, rng.gen::<f32>())
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Where the firefly is drawn at `time`. The y bob is applied before the
    /// x sway, which then reads the original z.
    pub fn animated_position(&self, time: f32) -> Vec3 {
        let mut p = self.position;
        p.y += (time + p.x * 2.0).sin() * self.scale * BOB_AMPLITUDE;
        p.x += (time + p.z * 2.0).cos() * self.scale * BOB_AMPLITUDE;
        p
    }

    pub fn flicker(&self, time: f32) -> f32 {
        (2.0 * self.scale - (time + self.scale).sin().abs()).clamp(0.0, 1.0)
    }

    /// Sprite edge length in physical pixels. `view_z` is the view-space
    /// depth of the animated position, negative in front of the camera.
    pub fn sprite_size(&self, base_size: f32, pixel_ratio: f32, view_z: f32) -> f32 {
        base_size * pixel_ratio * self.scale * SIZE_FACTOR * (1.0 / -view_z)
    }

    pub fn instance(&self) -> ParticleInstance {
        ParticleInstance {
            position: self.position.to_array(),
            scale: self.scale,
        }
    }
}

/// Alpha of a sprite fragment at `point_coord` (in [0,1]², centre at 0.5).
/// `None` means the fragment is discarded.
pub fn fragment_alpha(point_coord: Vec2, flicker: f32) -> Option<f32> {
    let distance_to_center = point_coord.distance(Vec2::splat(0.5));
    let strength = (1.0 - distance_to_center).powi(FALLOFF_EXPONENT);
    if strength < ALPHA_CUTOFF {
        return None;
    }
    Some(strength * flicker)
}

/// Distance from the sprite centre beyond which every fragment is discarded.
pub fn cutoff_radius() -> f32 {
    1.0 - ALPHA_CUTOFF.powf(1.0 / FALLOFF_EXPONENT as f32)
}

#[derive(Clone, Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    base_size: f32,
    pixel_ratio: f32,
    time: f32,
}

impl ParticleField {
    pub fn new<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let particles = (0..count).map(|_| Particle::sample(rng)).collect();
        Self::from_particles(particles)
    }

    pub fn from_particles(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            base_size: DEFAULT_BASE_SIZE,
            pixel_ratio: 1.0,
            time: 0.0,
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    pub fn base_size(&self) -> f32 {
        self.base_size
    }

    pub fn set_base_size(&mut self, base_size: f32) {
        self.base_size = base_size.max(0.0);
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) {
        self.pixel_ratio = pixel_ratio;
    }

    /// Static per-instance data; animation happens in the vertex shader.
    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.particles.iter().map(Particle::instance).collect()
    }

    /// Sprite size of `particle` as the vertex shader computes it this frame.
    pub fn sprite_size_for(&self, particle: &Particle, view: &Mat4) -> f32 {
        let view_position = view.transform_point3(particle.animated_position(self.time));
        particle.sprite_size(self.base_size, self.pixel_ratio, view_position.z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn sampled_particles_stay_in_the_box() {
        let mut rng = StdRng::seed_from_u64(3);
        let field = ParticleField::new(500, &mut rng);
        assert_eq!(field.len(), 500);
        for p in field.particles() {
            let pos = p.position();
            assert!((-1.0..=1.0).contains(&pos.x));
            assert!((0.0..=1.5).contains(&pos.y));
            assert!((-1.0..=1.0).contains(&pos.z));
            assert!((0.0..=1.0).contains(&p.scale()));
        }
    }

    #[test]
    fn time_does_not_touch_stored_particles() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut field = ParticleField::new(DEFAULT_COUNT, &mut rng);
        let before = field.instances();
        field.set_time(12.5);
        assert_eq!(field.instances(), before);
    }

    #[test]
    fn animated_offset_bobs_then_sways() {
        let p = Particle::new(Vec3::new(0.25, 1.0, -0.5), 0.5);
        let t = 1.3_f32;
        let animated = p.animated_position(t);
        let y = 1.0 + (t + 0.5).sin() * 0.5 * 0.2;
        let x = 0.25 + (t - 1.0).cos() * 0.5 * 0.2;
        assert!((animated.y - y).abs() < 1e-6);
        assert!((animated.x - x).abs() < 1e-6);
        assert_eq!(animated.z, -0.5);

        let still = Particle::new(Vec3::new(0.25, 1.0, -0.5), 0.0);
        assert_eq!(still.animated_position(t), still.position());
    }

    #[test]
    fn fragments_past_cutoff_are_discarded_for_every_scale() {
        let radius = cutoff_radius();
        assert!((radius - 0.2057).abs() < 1e-3);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..200 {
            let flicker = rng.gen::<f32>();
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let d = rng.gen_range(radius + 1e-3..0.71);
            let coord = Vec2::splat(0.5) + Vec2::from_angle(angle) * d;
            assert_eq!(fragment_alpha(coord, flicker), None);
        }
        assert_eq!(fragment_alpha(Vec2::new(0.5 + 0.69, 0.5), 1.0), None);
    }

    #[test]
    fn sprite_centre_is_fully_opaque() {
        assert_eq!(fragment_alpha(Vec2::splat(0.5), 1.0), Some(1.0));
        assert_eq!(fragment_alpha(Vec2::splat(0.5), 0.25), Some(0.25));
    }

    #[test]
    fn flicker_is_clamped() {
        assert_eq!(Particle::new(Vec3::ZERO, 1.0).flicker(-1.0), 1.0);
        assert_eq!(Particle::new(Vec3::ZERO, 0.0).flicker(1.0), 0.0);
        let p = Particle::new(Vec3::ZERO, 0.4);
        let expected = (0.8 - (2.0_f32 + 0.4).sin().abs()).clamp(0.0, 1.0);
        assert!((p.flicker(2.0) - expected).abs() < 1e-6);
    }

    #[test]
    fn sprite_size_shrinks_with_depth() {
        let p = Particle::new(Vec3::ZERO, 0.5);
        assert!((p.sprite_size(20.0, 2.0, -1.0) - 100.0).abs() < 1e-4);
        assert!((p.sprite_size(20.0, 2.0, -4.0) - 25.0).abs() < 1e-4);

        let mut field = ParticleField::from_particles(vec![p]);
        field.set_pixel_ratio(2.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::Y);
        let size = field.sprite_size_for(&field.particles()[0], &view);
        // The sway only moves x, so depth stays at the camera distance.
        assert!((size - p.sprite_size(DEFAULT_BASE_SIZE, 2.0, -2.0)).abs() < 1e-4);
    }
}
