// src/engine_lib/camera.rs

use glam::{Mat4, Vec3};

/// Perspective camera supplied by the scene provider. Orbit controls are the
/// host's business; the core only reads the matrices and updates the aspect.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub fov_y_rad: f32,
    pub znear: f32,
    pub zfar: f32,
    aspect: f32,
}

impl Camera {
    pub fn new(fov_y_deg: f32, znear: f32, zfar: f32) -> Self {
        Self {
            position: Vec3::new(4.0, 2.0, 4.0),
            target: Vec3::ZERO,
            fov_y_rad: fov_y_deg.to_radians(),
            znear,
            zfar,
            aspect: 1.0,
        }
    }

    pub fn looking_at(mut self, position: Vec3, target: Vec3) -> Self {
        self.position = position;
        self.target = target;
        self
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Zero-sized windows are clamped to 1x1 so the projection stays finite.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.aspect = width.max(1) as f32 / height.max(1) as f32;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    // wgpu clip space has z in [0, 1], which is what perspective_rh produces.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_rad, self.aspect, self.znear, self.zfar)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
