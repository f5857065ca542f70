// src/demo_scene.rs

use glam::{Mat4, Vec3};

use portal_fx::engine_lib::assets::{AssetResult, TextureData};
use portal_fx::engine_lib::scene_types::{Material, Mesh, Scene};
use portal_fx::rendering_lib::vertex::Vertex;

pub const PORTAL_MESH: &str = "portalLight";
const PORTAL_SEGMENTS: u16 = 48;
const POLE_LIGHT_COLOR: [f32; 4] = [1.0, 1.0, 0.898, 1.0];
const POLE_COLOR: [f32; 4] = [0.08, 0.06, 0.05, 1.0];

fn ground(half_size: f32) -> Mesh {
    // Darker towards the edges, like baked ambient occlusion.
    let inner = [0.10, 0.12, 0.08, 1.0];
    let outer = [0.02, 0.03, 0.02, 1.0];
    let mut vertices = vec![Vertex::new([0.0, 0.0, 0.0], [0.5, 0.5], inner)];
    for (x, z) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
        vertices.push(Vertex::new(
            [x * half_size, 0.0, z * half_size],
            [(x + 1.0) * 0.5, (z + 1.0) * 0.5],
            outer,
        ));
    }
    let indices = vec![0, 2, 1, 0, 3, 2, 0, 4, 3, 0, 1, 4];
    Mesh::new("ground", vertices, indices, Material::Baked)
}

fn cuboid(name: &str, center: Vec3, half: Vec3, material: Material) -> Mesh {
    let corners = [
        [-1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0],
        [1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, 1.0],
        [-1.0, 1.0, 1.0],
    ];
    let vertices = corners
        .iter()
        .map(|&c| Vertex::new((Vec3::from(c) * half).to_array(), [0.0, 0.0], [1.0; 4]))
        .collect();
    let indices = vec![
        0, 2, 1, 0, 3, 2, // back
        4, 5, 6, 4, 6, 7, // front
        0, 4, 7, 0, 7, 3, // left
        1, 2, 6, 1, 6, 5, // right
        3, 7, 6, 3, 6, 2, // top
        0, 1, 5, 0, 5, 4, // bottom
    ];
    Mesh::new(name, vertices, indices, material).with_transform(Mat4::from_translation(center))
}

/// Unit disc in the xy plane, uv spanning [0, 1] across its diameter.
fn disc(name: &str, radius: f32) -> Mesh {
    let mut vertices = vec![Vertex::new([0.0, 0.0, 0.0], [0.5, 0.5], [1.0; 4])];
    for i in 0..PORTAL_SEGMENTS {
        let angle = i as f32 / PORTAL_SEGMENTS as f32 * std::f32::consts::TAU;
        let (s, c) = angle.sin_cos();
        vertices.push(Vertex::new(
            [c * radius, s * radius, 0.0],
            [0.5 + c * 0.5, 0.5 - s * 0.5],
            [1.0; 4],
        ));
    }
    let indices = (0..PORTAL_SEGMENTS)
        .flat_map(|i| [0, 1 + i, 1 + (i + 1) % PORTAL_SEGMENTS])
        .collect();
    Mesh::new(name, vertices, indices, Material::Baked)
}

/// Stand-in for the loaded portal scene: ground, two pole lights and the
/// portal disc between them.
pub fn create_portal_scene() -> Scene {
    let mut scene = Scene::default();
    scene.add(ground(2.5));
    for (suffix, x) in [("A", -0.9), ("B", 0.9)] {
        scene.add(cuboid(
            &format!("pole{suffix}"),
            Vec3::new(x, 0.5, -0.6),
            Vec3::new(0.04, 0.5, 0.04),
            Material::Solid { color: POLE_COLOR },
        ));
        scene.add(cuboid(
            &format!("poleLight{suffix}"),
            Vec3::new(x, 1.05, -0.6),
            Vec3::splat(0.07),
            Material::Solid { color: POLE_LIGHT_COLOR },
        ));
    }
    scene.add(disc(PORTAL_MESH, 0.75).with_transform(Mat4::from_translation(Vec3::new(0.0, 0.8, -1.2))));

    // Shared materials are applied after loading, by mesh name.
    let assigned = scene.assign_material(PORTAL_MESH, Material::Portal);
    log::debug!("portal material assigned to {assigned} mesh(es)");
    scene
}

/// Ripple height field encoded as a tangent-space normal map.
pub fn normal_map(size: u32) -> AssetResult {
    let frequency = std::f32::consts::TAU * 6.0 / size.max(1) as f32;
    let mut rgba = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let (fx, fy) = (x as f32 * frequency, y as f32 * frequency);
            let dx = fx.cos() * fy.sin();
            let dy = fx.sin() * fy.cos();
            let n = Vec3::new(-dx * 0.5, -dy * 0.5, 1.0).normalize();
            let encode = |c: f32| ((c * 0.5 + 0.5) * 255.0).round() as u8;
            rgba.extend_from_slice(&[encode(n.x), encode(n.y), encode(n.z), 255]);
        }
    }
    TextureData::new("ripple_normal_map", size, size, rgba).ok_or_else(|| format!("bad normal map size {size}"))
}

/// Generates the normal map off the render thread.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_normal_map_load(size: u32) -> tokio::sync::oneshot::Receiver<AssetResult> {
    let (tx, rx) = tokio::sync::oneshot::channel();
    tokio::task::spawn_blocking(move || {
        // The receiver is gone if the app shut down first.
        let _ = tx.send(normal_map(size));
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portal_disc_gets_the_portal_material() {
        let scene = create_portal_scene();
        let portal = scene.find(PORTAL_MESH).unwrap();
        assert_eq!(portal.material, Material::Portal);
        assert_eq!(portal.indices.len(), PORTAL_SEGMENTS as usize * 3);
        assert!(portal.indices.iter().all(|&i| (i as usize) < portal.vertices.len()));
        assert!(matches!(scene.find("poleLightA").map(|m| &m.material), Some(Material::Solid { .. })));
    }

    #[test]
    fn disc_uvs_span_the_unit_square() {
        let mesh = disc("d", 1.0);
        for v in &mesh.vertices {
            assert!(v.uv.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn normal_map_is_mostly_facing_out() {
        let data = normal_map(32).unwrap();
        assert_eq!((data.width, data.height), (32, 32));
        assert!(data.rgba.chunks(4).all(|px| px[2] > 200 && px[3] == 255));
    }
}
