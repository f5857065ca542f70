// src/rendering_lib/gpu/fullscreen.rs

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::rendering_lib::shader::ShaderProgram;

/// Where a full-screen draw writes.
pub struct DrawTarget<'a> {
    pub view: &'a wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

/// Pipelines for full-screen programs, created on first use and cached by
/// `ShaderProgram::cache_key` and output format. Bind groups follow the
/// layout documented on `shader::FULLSCREEN_VERTEX`.
pub struct FullscreenPipelines {
    sampler: wgpu::Sampler,
    // keyed by number of auxiliary textures
    layouts: HashMap<usize, wgpu::BindGroupLayout>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

type PipelineKey = ((String, u64), wgpu::TextureFormat);

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

impl FullscreenPipelines {
    pub fn new(device: &wgpu::Device) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Fullscreen Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });
        Self {
            sampler,
            layouts: HashMap::new(),
            pipelines: HashMap::new(),
        }
    }

    fn ensure_pipeline(
        &mut self,
        device: &wgpu::Device,
        program: &ShaderProgram,
        key: &PipelineKey,
        aux_textures: usize,
    ) {
        let format = key.1;
        let layout = &*self.layouts.entry(aux_textures).or_insert_with(|| {
            let mut entries = vec![
                texture_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ];
            entries.extend((0..aux_textures).map(|i| texture_entry(3 + i as u32)));
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("fullscreen_bind_group_layout"),
                entries: &entries,
            })
        });

        if self.pipelines.contains_key(key) {
            return;
        }

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(program.name()),
            source: wgpu::ShaderSource::Wgsl(program.source().into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Fullscreen Pipeline Layout"),
            bind_group_layouts: &[layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(program.name()),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &module,
                entry_point: program.vertex_entry(),
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &module,
                entry_point: program.fragment_entry(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: None,
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
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });
        log::debug!("created fullscreen pipeline '{}' for {:?}", program.name(), format);
        self.pipelines.insert(key.clone(), pipeline);
    }

    /// Draws `program` over the whole of `target`, replacing its contents.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        device: &wgpu::Device,
        encoder: &mut wgpu::CommandEncoder,
        program: &ShaderProgram,
        params: &[[f32; 4]],
        input: &wgpu::TextureView,
        aux: &[&wgpu::TextureView],
        target: DrawTarget<'_>,
    ) {
        let key = (program.cache_key(), target.format);
        self.ensure_pipeline(device, program, &key, aux.len());
        let (Some(layout), Some(pipeline)) = (
            self.layouts.get(&aux.len()),
            self.pipelines.get(&key),
        ) else {
            log::error!("no pipeline for program '{}'", program.name());
            return;
        };

        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Fullscreen Params Buffer"),
            contents: bytemuck::cast_slice(params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let mut entries = vec![
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(input),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: params_buffer.as_entire_binding(),
            },
        ];
        entries.extend(aux.iter().enumerate().map(|(i, view)| wgpu::BindGroupEntry {
            binding: 3 + i as u32,
            resource: wgpu::BindingResource::TextureView(view),
        }));
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("fullscreen_bind_group"),
            layout,
            entries: &entries,
        });

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(program.name()),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        render_pass.set_pipeline(pipeline);
        render_pass.set_bind_group(0, &bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}
