// src/rendering_lib/noise.rs
//
// CPU twin of the WGSL `cnoise` and `fs_portal` in `shader.rs`. Kept in step
// with the shader so shading can be tested and tuned without a GPU.

use glam::{Vec2, Vec3, Vec4};

/// The hash lattice repeats every `PERIOD` cells on each axis.
pub const PERIOD: f32 = 289.0;
/// Output scale of the raw gradient noise.
pub const NOISE_GAIN: f32 = 2.2;

/// Spatial frequency applied to the UV before both noise lookups.
pub const UV_FREQUENCY: f32 = 5.0;
/// The second lookup evolves slower than the warp.
pub const TIME_SCALE: f32 = 0.2;
pub const GLOW_SCALE: f32 = 5.0;
pub const GLOW_OFFSET: f32 = 1.4;
/// Raw strengths at or above this edge get `STEP_BOOST` added.
pub const STEP_EDGE: f32 = -0.2;
pub const STEP_BOOST: f32 = 0.8;

const CENTER: Vec2 = Vec2::new(0.5, 0.5);

fn mod289_3(x: Vec3) -> Vec3 {
    x - (x / PERIOD).floor() * PERIOD
}

fn mod289_4(x: Vec4) -> Vec4 {
    x - (x / PERIOD).floor() * PERIOD
}

fn permute(x: Vec4) -> Vec4 {
    mod289_4((x * 34.0 + Vec4::ONE) * x)
}

fn taylor_inv_sqrt(r: Vec4) -> Vec4 {
    Vec4::splat(1.792_842_9) - r * 0.853_734_7
}

fn fade(t: Vec3) -> Vec3 {
    t * t * t * (t * (t * 6.0 - Vec3::splat(15.0)) + Vec3::splat(10.0))
}

// GLSL fract, x - floor(x), also for negative inputs.
fn fract4(x: Vec4) -> Vec4 {
    x - x.floor()
}

// GLSL step(edge, x)
fn step4(edge: Vec4, x: Vec4) -> Vec4 {
    Vec4::select(edge.cmple(x), Vec4::ONE, Vec4::ZERO)
}

fn gradients(ixy: Vec4) -> [Vec3; 4] {
    let gx = ixy / 7.0;
    let gy = fract4(gx.floor() / 7.0) - Vec4::splat(0.5);
    let gx = fract4(gx);
    let gz = Vec4::splat(0.5) - gx.abs() - gy.abs();
    let sz = step4(gz, Vec4::ZERO);
    let gx = gx - sz * (step4(Vec4::ZERO, gx) - Vec4::splat(0.5));
    let gy = gy - sz * (step4(Vec4::ZERO, gy) - Vec4::splat(0.5));

    let g = [
        Vec3::new(gx.x, gy.x, gz.x),
        Vec3::new(gx.y, gy.y, gz.y),
        Vec3::new(gx.z, gy.z, gz.z),
        Vec3::new(gx.w, gy.w, gz.w),
    ];
    let norm = taylor_inv_sqrt(Vec4::new(g[0].dot(g[0]), g[1].dot(g[1]), g[2].dot(g[2]), g[3].dot(g[3])));
    [g[0] * norm.x, g[1] * norm.y, g[2] * norm.z, g[3] * norm.w]
}

/// Classic 3D gradient noise, roughly in [-1, 1]. Zero on every lattice
/// point, continuous everywhere, periodic with period 289 on each axis.
pub fn noise3(p: Vec3) -> f32 {
    let pi0 = mod289_3(p.floor());
    let pi1 = mod289_3(p.floor() + Vec3::ONE);
    let pf0 = p - p.floor();
    let pf1 = pf0 - Vec3::ONE;

    let ix = Vec4::new(pi0.x, pi1.x, pi0.x, pi1.x);
    let iy = Vec4::new(pi0.y, pi0.y, pi1.y, pi1.y);

    let ixy = permute(permute(ix) + iy);
    let [g000, g100, g010, g110] = gradients(permute(ixy + Vec4::splat(pi0.z)));
    let [g001, g101, g011, g111] = gradients(permute(ixy + Vec4::splat(pi1.z)));

    let n000 = g000.dot(pf0);
    let n100 = g100.dot(Vec3::new(pf1.x, pf0.y, pf0.z));
    let n010 = g010.dot(Vec3::new(pf0.x, pf1.y, pf0.z));
    let n110 = g110.dot(Vec3::new(pf1.x, pf1.y, pf0.z));
    let n001 = g001.dot(Vec3::new(pf0.x, pf0.y, pf1.z));
    let n101 = g101.dot(Vec3::new(pf1.x, pf0.y, pf1.z));
    let n011 = g011.dot(Vec3::new(pf0.x, pf1.y, pf1.z));
    let n111 = g111.dot(pf1);

    let f = fade(pf0);
    let n_z = Vec4::new(n000, n100, n010, n110).lerp(Vec4::new(n001, n101, n011, n111), f.z);
    let n_yz = Vec2::new(n_z.x, n_z.y).lerp(Vec2::new(n_z.z, n_z.w), f.y);
    let n_xyz = n_yz.x + (n_yz.y - n_yz.x) * f.x;
    NOISE_GAIN * n_xyz
}

/// The banding step applied to raw portal strength, then clamped to [0, 1].
/// Non-decreasing in `raw`; the result is either 0 or at least 0.6.
pub fn threshold(raw: f32) -> f32 {
    let boosted = if raw >= STEP_EDGE { raw + STEP_BOOST } else { raw };
    boosted.clamp(0.0, 1.0)
}

/// Portal material parameters: two end colours, time and spatial frequency.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NoiseShading {
    pub color_start: Vec3,
    pub color_end: Vec3,
    pub time: f32,
    pub frequency: f32,
}

impl Default for NoiseShading {
    fn default() -> Self {
        Self {
            color_start: Vec3::new(1.0, 0.0, 0.0),
            color_end: Vec3::new(0.0, 0.0, 1.0),
            time: 0.0,
            frequency: UV_FREQUENCY,
        }
    }
}

impl NoiseShading {
    pub fn new(color_start: Vec3, color_end: Vec3) -> Self {
        Self {
            color_start,
            color_end,
            ..Self::default()
        }
    }

    pub fn set_time(&mut self, time: f32) {
        self.time = time;
    }

    /// Strength before the banding step: warped noise plus the radial glow.
    pub fn raw_strength_at(&self, uv: Vec2) -> f32 {
        let warp = noise3((uv * self.frequency).extend(self.time));
        let displaced = uv + Vec2::splat(warp);
        let strength = noise3((displaced * self.frequency).extend(self.time * TIME_SCALE));
        let outer_glow = uv.distance(CENTER) * GLOW_SCALE - GLOW_OFFSET;
        strength + outer_glow
    }

    pub fn strength_at(&self, uv: Vec2) -> f32 {
        threshold(self.raw_strength_at(uv))
    }

    pub fn color_at(&self, uv: Vec2) -> Vec3 {
        self.color_start.lerp(self.color_end, self.strength_at(uv))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const EPS: f32 = 1e-3;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < EPS
    }

    #[test]
    fn noise_vanishes_on_lattice_points() {
        assert_eq!(noise3(Vec3::ZERO), 0.0);
        assert_eq!(noise3(Vec3::new(1.0, 2.0, 3.0)), 0.0);
        assert_eq!(noise3(Vec3::new(-7.0, 0.0, 12.0)), 0.0);
    }

    #[test]
    fn noise_matches_reference_values() {
        let cases = [
            (Vec3::new(2.5, 2.5, 0.0), -0.43365),
            (Vec3::new(0.3, 0.7, 1.1), -0.288460),
            (Vec3::new(-0.5, -0.5, -0.5), 0.359695),
            (Vec3::new(-4.2, 10.5, 3.3), 0.003045),
            (Vec3::new(288.5, 0.25, 0.75), 0.291565),
        ];
        for (p, expected) in cases {
            let n = noise3(p);
            assert!(close(n, expected), "noise3({p}) = {n}, expected {expected}");
        }
    }

    #[test]
    fn noise_is_periodic() {
        let a = noise3(Vec3::new(0.3, 0.7, 1.1));
        let b = noise3(Vec3::new(289.3, 0.7, 1.1));
        assert!(close(a, b), "{a} vs {b}");
    }

    #[test]
    fn noise_is_continuous_and_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2000 {
            let p = Vec3::new(
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
                rng.gen_range(-50.0..50.0),
            );
            let n = noise3(p);
            assert!(n.abs() <= 1.1, "noise3({p}) = {n}");
            let nudged = noise3(p + Vec3::splat(1e-4));
            assert!((n - nudged).abs() < 5e-3, "jump at {p}: {n} -> {nudged}");
        }
    }

    #[test]
    fn threshold_is_monotonic_and_banded() {
        let mut previous = threshold(-3.0);
        let mut raw = -3.0;
        while raw <= 3.0 {
            let s = threshold(raw);
            assert!(s >= previous, "threshold decreased at {raw}");
            assert!(s == 0.0 || s >= 0.6 - 1e-6, "unexpected strength {s} at {raw}");
            previous = s;
            raw += 0.001;
        }
        assert!(close(threshold(STEP_EDGE), 0.6));
        assert_eq!(threshold(STEP_EDGE - 0.001), 0.0);
    }

    #[test]
    fn portal_center_sits_in_glow_minimum() {
        let shading = NoiseShading::default();
        let raw = shading.raw_strength_at(Vec2::new(0.5, 0.5));
        assert!((raw - -1.9136).abs() < 1e-3, "raw = {raw}");
        assert_eq!(shading.strength_at(Vec2::new(0.5, 0.5)), 0.0);
        assert_eq!(shading.color_at(Vec2::new(0.5, 0.5)), shading.color_start);
    }

    #[test]
    fn portal_reference_points() {
        let mut shading = NoiseShading::default();
        shading.set_time(2.0);
        let s = shading.strength_at(Vec2::new(0.5, 0.2));
        assert!(close(s, 0.61488), "strength = {s}");

        shading.set_time(1.0);
        assert_eq!(shading.strength_at(Vec2::new(0.1, 0.9)), 1.0);
        assert_eq!(shading.color_at(Vec2::new(0.1, 0.9)), shading.color_end);
    }

    #[test]
    fn portal_strength_stays_in_unit_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut shading = NoiseShading::default();
        for _ in 0..500 {
            shading.set_time(rng.gen_range(0.0..100.0));
            let uv = Vec2::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
            let s = shading.strength_at(uv);
            assert!((0.0..=1.0).contains(&s));
        }
    }
}
