// src/engine_lib/scene_types.rs
use glam::{Mat4, Vec3};

use crate::rendering_lib::vertex::Vertex;

/// How a mesh is shaded by the scene pass.
#[derive(Clone, Debug, PartialEq)]
pub enum Material {
    /// Unlit, per-vertex colour (baked lighting).
    Baked,
    /// Unlit flat colour.
    Solid { color: [f32; 4] },
    /// Domain-warped noise glow driven by the portal shading parameters.
    Portal,
}

#[derive(Clone, Debug)]
pub struct Mesh {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u16>,
    pub material: Material,
    pub transform: Mat4,
}

impl Mesh {
    pub fn new(name: &str, vertices: Vec<Vertex>, indices: Vec<u16>, material: Material) -> Self {
        Self {
            name: name.to_string(),
            vertices,
            indices,
            material,
            transform: Mat4::IDENTITY,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    /// Vertices with `transform` applied to positions.
    pub fn world_vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.vertices.iter().map(move |v| {
            let p = self.transform.transform_point3(Vec3::from(v.position));
            Vertex { position: p.to_array(), ..*v }
        })
    }
}

/// Output of the scene provider: what the scene pass draws.
#[derive(Debug, Default)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
}

impl Scene {
    pub fn add(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    pub fn find(&self, name: &str) -> Option<&Mesh> {
        self.meshes.iter().find(|m| m.name == name)
    }

    /// Re-applies `material` to every mesh whose name matches, like a
    /// post-load traversal assigning shared materials.
    pub fn assign_material(&mut self, name: &str, material: Material) -> usize {
        let mut count = 0;
        for mesh in self.meshes.iter_mut().filter(|m| m.name == name) {
            mesh.material = material.clone();
            count += 1;
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_vertices_apply_transform() {
        let mesh = Mesh::new(
            "quad",
            vec![Vertex::new([1.0, 0.0, 0.0], [0.0, 0.0], [1.0; 4])],
            vec![0],
            Material::Baked,
        )
        .with_transform(Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)));
        let v: Vec<Vertex> = mesh.world_vertices().collect();
        assert_eq!(v[0].position, [1.0, 2.0, 0.0]);
    }

    #[test]
    fn assign_material_targets_named_meshes() {
        let mut scene = Scene::default();
        scene.add(Mesh::new("poleLightA", vec![], vec![], Material::Baked));
        scene.add(Mesh::new("portalLight", vec![], vec![], Material::Baked));
        assert_eq!(scene.assign_material("portalLight", Material::Portal), 1);
        assert_eq!(scene.find("portalLight").map(|m| &m.material), Some(&Material::Portal));
        assert_eq!(scene.find("poleLightA").map(|m| &m.material), Some(&Material::Baked));
    }
}
