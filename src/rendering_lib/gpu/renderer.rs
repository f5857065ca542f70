// src/rendering_lib/gpu/renderer.rs

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::engine_lib::camera::Camera;
use crate::engine_lib::scene_types::{Material, Scene};
use crate::rendering_lib::noise::NoiseShading;
use crate::rendering_lib::particles::ParticleField;
use crate::rendering_lib::shader::ShaderProgram;
use crate::rendering_lib::vertex::{ParticleInstance, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct SceneUniforms {
    projection: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    color_start: [f32; 4],
    color_end: [f32; 4],
    // time, pixel ratio, firefly size, noise frequency
    params: [f32; 4],
    resolution: [f32; 4],
}

/// Per-frame inputs of the scene pass, all sampled at the same timestamp.
pub struct SceneFrame<'a> {
    pub time: f32,
    pub camera: &'a Camera,
    pub shading: &'a NoiseShading,
    pub fireflies: &'a ParticleField,
}

/// Colour attachment the scene is drawn into.
pub struct SceneTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub resolve_target: Option<&'a wgpu::TextureView>,
    pub format: wgpu::TextureFormat,
    pub samples: u32,
    pub size: (u32, u32),
}

struct MeshBatch {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct ScenePipelines {
    baked: wgpu::RenderPipeline,
    portal: wgpu::RenderPipeline,
    firefly: wgpu::RenderPipeline,
}

struct DepthBuffer {
    size: (u32, u32),
    samples: u32,
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

pub struct SceneRenderer {
    module: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    uniforms: SceneUniforms,
    pipelines: HashMap<(wgpu::TextureFormat, u32), ScenePipelines>,
    depth: Option<DepthBuffer>,

    baked: Option<MeshBatch>,
    portal: Option<MeshBatch>,
    fireflies: Option<(wgpu::Buffer, u32)>,

    frame_vertices: Vec<Vertex>,
    frame_indices: Vec<u16>,
}

impl SceneRenderer {
    pub fn new(device: &wgpu::Device) -> Self {
        let program = ShaderProgram::scene();
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader Module"),
            source: wgpu::ShaderSource::Wgsl(program.source().into()),
        });

        let uniforms = SceneUniforms::zeroed();
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Scene Uniform Buffer"),
            contents: bytemuck::bytes_of(&uniforms),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("scene_bind_group_layout"),
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("scene_bind_group"),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        Self {
            module,
            pipeline_layout,
            uniform_buffer,
            bind_group,
            uniforms,
            pipelines: HashMap::new(),
            depth: None,
            baked: None,
            portal: None,
            fireflies: None,
            frame_vertices: Vec::new(),
            frame_indices: Vec::new(),
        }
    }

    fn create_pipeline(
        &self,
        device: &wgpu::Device,
        label: &str,
        vertex: (&str, wgpu::VertexBufferLayout<'_>),
        fragment_entry: &str,
        format: wgpu::TextureFormat,
        samples: u32,
        additive: bool,
    ) -> wgpu::RenderPipeline {
        let blend = if additive {
            let additive = wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            };
            Some(wgpu::BlendState {
                color: additive,
                alpha: additive,
            })
        } else {
            Some(wgpu::BlendState::REPLACE)
        };
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.module,
                entry_point: vertex.0,
                buffers: &[vertex.1],
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.module,
                entry_point: fragment_entry,
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // Fireflies test depth but never write it.
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: !additive,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: samples,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        })
    }

    fn ensure_pipelines(&mut self, device: &wgpu::Device, format: wgpu::TextureFormat, samples: u32) {
        if self.pipelines.contains_key(&(format, samples)) {
            return;
        }
        let pipelines = ScenePipelines {
            baked: self.create_pipeline(
                device,
                "Scene Baked Pipeline",
                ("vs_mesh", Vertex::desc()),
                "fs_baked",
                format,
                samples,
                false,
            ),
            portal: self.create_pipeline(
                device,
                "Scene Portal Pipeline",
                ("vs_mesh", Vertex::desc()),
                "fs_portal",
                format,
                samples,
                false,
            ),
            firefly: self.create_pipeline(
                device,
                "Scene Firefly Pipeline",
                ("vs_firefly", ParticleInstance::desc()),
                "fs_firefly",
                format,
                samples,
                true,
            ),
        };
        log::debug!("created scene pipelines for {format:?} with {samples} samples");
        self.pipelines.insert((format, samples), pipelines);
    }

    fn ensure_depth(&mut self, device: &wgpu::Device, size: (u32, u32), samples: u32) {
        if self
            .depth
            .as_ref()
            .is_some_and(|d| d.size == size && d.samples == samples)
        {
            return;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Depth Texture"),
            size: wgpu::Extent3d {
                width: size.0,
                height: size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: samples,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.depth = Some(DepthBuffer {
            size,
            samples,
            _texture: texture,
            view,
        });
    }

    fn add_mesh_to_frame(&mut self, vertices: impl Iterator<Item = Vertex>, indices: &[u16]) -> bool {
        let start_vertex_index = self.frame_vertices.len();
        self.frame_vertices.extend(vertices);
        if self.frame_vertices.len() > u16::MAX as usize {
            log::warn!("scene batch exceeds u16 index range, mesh skipped");
            self.frame_vertices.truncate(start_vertex_index);
            return false;
        }
        let base = start_vertex_index as u16;
        self.frame_indices.extend(indices.iter().map(|i| base + i));
        true
    }

    fn take_batch(&mut self, device: &wgpu::Device, label: &str) -> Option<MeshBatch> {
        if self.frame_vertices.is_empty() || self.frame_indices.is_empty() {
            self.frame_vertices.clear();
            self.frame_indices.clear();
            return None;
        }
        // create_buffer_init pads the upload to COPY_BUFFER_ALIGNMENT.
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&self.frame_vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&self.frame_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let batch = MeshBatch {
            vertex_buffer,
            index_buffer,
            index_count: self.frame_indices.len() as u32,
        };
        self.frame_vertices.clear();
        self.frame_indices.clear();
        Some(batch)
    }

    /// Bakes mesh transforms and materials into two static batches: unlit
    /// colour and portal.
    pub fn upload_scene(&mut self, device: &wgpu::Device, scene: &Scene) {
        self.frame_vertices.clear();
        self.frame_indices.clear();
        for mesh in scene.meshes.iter().filter(|m| m.material != Material::Portal) {
            let override_color = match &mesh.material {
                Material::Solid { color } => Some(*color),
                _ => None,
            };
            let vertices = mesh.world_vertices().map(|v| Vertex {
                color: override_color.unwrap_or(v.color),
                ..v
            });
            self.add_mesh_to_frame(vertices, &mesh.indices);
        }
        self.baked = self.take_batch(device, "Scene Baked Batch");

        for mesh in scene.meshes.iter().filter(|m| m.material == Material::Portal) {
            self.add_mesh_to_frame(mesh.world_vertices(), &mesh.indices);
        }
        self.portal = self.take_batch(device, "Scene Portal Batch");
        log::info!(
            "uploaded scene: {} baked indices, {} portal indices",
            self.baked.as_ref().map_or(0, |b| b.index_count),
            self.portal.as_ref().map_or(0, |b| b.index_count)
        );
    }

    pub fn upload_fireflies(&mut self, device: &wgpu::Device, field: &ParticleField) {
        if field.is_empty() {
            self.fireflies = None;
            return;
        }
        let instances = field.instances();
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Firefly Instance Buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX,
        });
        self.fireflies = Some((buffer, instances.len() as u32));
    }

    pub fn prepare(&mut self, frame: &SceneFrame<'_>) {
        let shading = frame.shading;
        self.uniforms.projection = frame.camera.projection_matrix().to_cols_array_2d();
        self.uniforms.view = frame.camera.view_matrix().to_cols_array_2d();
        self.uniforms.color_start = shading.color_start.extend(1.0).to_array();
        self.uniforms.color_end = shading.color_end.extend(1.0).to_array();
        self.uniforms.params = [
            frame.time,
            frame.fireflies.pixel_ratio(),
            frame.fireflies.base_size(),
            shading.frequency,
        ];
    }

    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        target: SceneTarget<'_>,
        clear_color: [f32; 4],
    ) {
        self.uniforms.resolution = [target.size.0 as f32, target.size.1 as f32, 0.0, 0.0];
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&self.uniforms));

        self.ensure_pipelines(device, target.format, target.samples);
        self.ensure_depth(device, target.size, target.samples);
        let (Some(pipelines), Some(depth)) = (self.pipelines.get(&(target.format, target.samples)), self.depth.as_ref())
        else {
            return;
        };

        let [r, g, b, a] = clear_color.map(f64::from);
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view,
                resolve_target: target.resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_bind_group(0, &self.bind_group, &[]);

        for (pipeline, batch) in [(&pipelines.baked, &self.baked), (&pipelines.portal, &self.portal)] {
            if let Some(batch) = batch {
                render_pass.set_pipeline(pipeline);
                render_pass.set_vertex_buffer(0, batch.vertex_buffer.slice(..));
                render_pass.set_index_buffer(batch.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                render_pass.draw_indexed(0..batch.index_count, 0, 0..1);
            }
        }

        if let Some((instances, count)) = &self.fireflies {
            render_pass.set_pipeline(&pipelines.firefly);
            render_pass.set_vertex_buffer(0, instances.slice(..));
            // Six corners per sprite quad.
            render_pass.draw(0..6, 0..*count);
        }
    }
}
