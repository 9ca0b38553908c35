use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::Zeroable;
use log::{debug, info};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::loaders::{ModelData, TextureData};
use crate::overlay::FpsOverlay;
use crate::scene::lights::globals_uniform;
use crate::scene::orbit::card_geometry;
use crate::scene::{DrawState, DrawTarget, SceneState};
use crate::types::{GlobalsUniform, ObjectUniform, Vertex};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
pub const MSAA_SAMPLES: u32 = 4;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Uniform buffer plus the bind group that exposes it with a texture
struct GpuObject {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

struct GpuModel {
    /// Scene model generation these buffers were built from
    generation: u64,
    meshes: Vec<GpuMesh>,
    objects: Vec<GpuObject>,
    _textures: Vec<wgpu::Texture>,
}

/// Forward renderer for the pivot model and the card ring
pub struct SceneRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    sample_count: u32,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    pipelines: HashMap<DrawState, wgpu::RenderPipeline>,
    sampler: wgpu::Sampler,
    _white_texture: wgpu::Texture,
    white_view: wgpu::TextureView,
    card_mesh: GpuMesh,
    card_objects: Vec<GpuObject>,
    model: Option<GpuModel>,
    overlay: Option<FpsOverlay>,
}

impl SceneRenderer {
    pub async fn new(window: Arc<Window>, show_fps: bool) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let config = Self::create_surface_config(&surface, &adapter, size);
        surface.configure(&device, &config);

        let sample_count = Self::pick_sample_count(&adapter, config.format);
        info!(
            "Surface {:?} {}x{}, alpha {:?}, {}x MSAA",
            config.format, config.width, config.height, config.alpha_mode, sample_count
        );

        let depth_view = Self::create_depth_view(&device, &config, sample_count);
        let msaa_view = Self::create_msaa_view(&device, &config, sample_count);

        let globals_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Globals Buffer"),
            contents: bytemuck::cast_slice(&[GlobalsUniform::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
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
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&globals_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white = TextureData {
            width: 1,
            height: 1,
            data: vec![255; 4],
        };
        let white_texture = Self::upload_texture(&device, &queue, &white, "White Texture");
        let white_view = white_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let (card_vertices, card_indices) = card_geometry();
        let card_mesh = Self::upload_mesh(&device, &card_vertices, &card_indices, "Card");

        let overlay = show_fps.then(|| FpsOverlay::new(&device, config.format, &window));

        Ok(Self {
            device,
            queue,
            surface,
            config,
            sample_count,
            depth_view,
            msaa_view,
            globals_buffer,
            globals_bind_group,
            object_layout,
            pipeline_layout,
            shader,
            pipelines: HashMap::new(),
            sampler,
            _white_texture: white_texture,
            white_view,
            card_mesh,
            card_objects: Vec::new(),
            model: None,
            overlay,
        })
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| "Failed to find appropriate adapter".into())
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| e.into())
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        size: winit::dpi::PhysicalSize<u32>,
    ) -> wgpu::SurfaceConfiguration {
        let surface_caps = surface.get_capabilities(adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: pick_alpha_mode(&surface_caps.alpha_modes),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        }
    }

    fn pick_sample_count(adapter: &wgpu::Adapter, format: wgpu::TextureFormat) -> u32 {
        let supports = |f: wgpu::TextureFormat| {
            adapter
                .get_texture_format_features(f)
                .flags
                .sample_count_supported(MSAA_SAMPLES)
        };
        if supports(format) && supports(DEPTH_FORMAT) {
            MSAA_SAMPLES
        } else {
            1
        }
    }

    fn create_depth_view(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_msaa_view(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> Option<wgpu::TextureView> {
        if sample_count <= 1 {
            return None;
        }
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("MSAA Color Texture"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        Some(texture.create_view(&wgpu::TextureViewDescriptor::default()))
    }

    fn upload_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &TextureData,
        label: &str,
    ) -> wgpu::Texture {
        let size = wgpu::Extent3d {
            width: texture.width,
            height: texture.height,
            depth_or_array_layers: 1,
        };
        let gpu_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &gpu_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &texture.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * texture.width),
                rows_per_image: Some(texture.height),
            },
            size,
        );

        gpu_texture
    }

    fn upload_mesh(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32], label: &str) -> GpuMesh {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", label)),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    fn create_object(&self, texture_view: &wgpu::TextureView, label: &str) -> GpuObject {
        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<ObjectUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.object_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(texture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        GpuObject {
            uniform_buffer,
            bind_group,
        }
    }

    fn upload_model(&self, data: &ModelData, generation: u64) -> GpuModel {
        let textures: Vec<wgpu::Texture> = data
            .textures
            .iter()
            .enumerate()
            .map(|(i, t)| Self::upload_texture(&self.device, &self.queue, t, &format!("Model Texture {}", i)))
            .collect();
        let views: Vec<wgpu::TextureView> = textures
            .iter()
            .map(|t| t.create_view(&wgpu::TextureViewDescriptor::default()))
            .collect();

        let mut meshes = Vec::with_capacity(data.meshes.len());
        let mut objects = Vec::with_capacity(data.meshes.len());
        for (i, mesh) in data.meshes.iter().enumerate() {
            let label = mesh.name.clone().unwrap_or_else(|| format!("Mesh {}", i));
            meshes.push(Self::upload_mesh(&self.device, &mesh.vertices, &mesh.indices, &label));

            let view = mesh
                .material
                .texture
                .and_then(|t| views.get(t))
                .unwrap_or(&self.white_view);
            objects.push(self.create_object(view, &label));
        }

        info!(
            "Uploaded model: {} meshes, {} textures",
            meshes.len(),
            textures.len()
        );

        GpuModel {
            generation,
            meshes,
            objects,
            _textures: textures,
        }
    }

    fn ensure_pipeline(&mut self, state: DrawState) {
        if !self.pipelines.contains_key(&state) {
            debug!("Creating pipeline for {:?}", state);
            let pipeline = self.create_pipeline(state);
            self.pipelines.insert(state, pipeline);
        }
    }

    fn create_pipeline(&self, state: DrawState) -> wgpu::RenderPipeline {
        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.config.format,
                    blend: Some(blend_state(state)),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: cull_mode(state),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(depth_stencil_state(state)),
            multisample: wgpu::MultisampleState {
                count: self.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.device, &self.config, self.sample_count);
        self.msaa_view = Self::create_msaa_view(&self.device, &self.config, self.sample_count);
    }

    /// Reapply the current configuration after the surface was lost
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Bring GPU resources in line with the scene and write this frame's uniforms
    fn sync(&mut self, scene: &SceneState) {
        if let Some(pivot) = &scene.pivot {
            let generation = scene.model_generation();
            if model_is_stale(self.model.as_ref().map(|m| m.generation), generation) {
                self.model = Some(self.upload_model(&pivot.model().data, generation));
            }
        }

        while self.card_objects.len() < scene.cards.len() {
            let label = format!("Card {}", self.card_objects.len());
            let object = self.create_object(&self.white_view, &label);
            self.card_objects.push(object);
        }

        let globals = globals_uniform(&scene.camera, &scene.lights);
        self.queue
            .write_buffer(&self.globals_buffer, 0, bytemuck::cast_slice(&[globals]));

        if let (Some(pivot), Some(model)) = (&scene.pivot, &self.model) {
            let matrix = pivot.model_matrix();
            for (mesh, object) in pivot.model().data.meshes.iter().zip(&model.objects) {
                let [r, g, b, a] = mesh.material.base_color;
                let uniform = ObjectUniform::new(matrix, [r, g, b], a);
                self.queue
                    .write_buffer(&object.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
            }
        }

        for (card, object) in scene.cards.iter().zip(&self.card_objects) {
            let uniform = ObjectUniform::new(card.model_matrix(), card.material.color, card.material.opacity);
            self.queue
                .write_buffer(&object.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));
        }
    }

    pub fn render(
        &mut self,
        scene: &SceneState,
        window: &Window,
        fps: f32,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        self.sync(scene);

        let draw_list = scene.draw_list();
        for item in &draw_list {
            self.ensure_pipeline(item.state);
        }

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let (target, resolve_target) = match &self.msaa_view {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_bind_group(0, &self.globals_bind_group, &[]);

            for item in &draw_list {
                let (mesh, object) = match item.target {
                    DrawTarget::Card(i) => match self.card_objects.get(i) {
                        Some(object) => (&self.card_mesh, object),
                        None => continue,
                    },
                    DrawTarget::Mesh(i) => {
                        let Some(model) = &self.model else { continue };
                        match (model.meshes.get(i), model.objects.get(i)) {
                            (Some(mesh), Some(object)) => (mesh, object),
                            _ => continue,
                        }
                    }
                };
                if mesh.index_count == 0 {
                    continue;
                }

                render_pass.set_pipeline(&self.pipelines[&item.state]);
                render_pass.set_bind_group(1, &object.bind_group, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        if let Some(overlay) = &mut self.overlay {
            overlay.render(
                &self.device,
                &self.queue,
                &mut encoder,
                &view,
                window,
                fps,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    /// Returns true when the overlay consumed the event
    pub fn handle_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        match &mut self.overlay {
            Some(overlay) => overlay.handle_event(window, event),
            None => false,
        }
    }
}

/// Prefer a compositing alpha mode so the cleared background stays see-through
pub fn pick_alpha_mode(modes: &[wgpu::CompositeAlphaMode]) -> wgpu::CompositeAlphaMode {
    [
        wgpu::CompositeAlphaMode::PreMultiplied,
        wgpu::CompositeAlphaMode::PostMultiplied,
    ]
    .into_iter()
    .find(|m| modes.contains(m))
    .or_else(|| modes.first().copied())
    .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

pub fn blend_state(state: DrawState) -> wgpu::BlendState {
    if state.blend {
        wgpu::BlendState::ALPHA_BLENDING
    } else {
        wgpu::BlendState::REPLACE
    }
}

pub fn cull_mode(state: DrawState) -> Option<wgpu::Face> {
    if state.double_sided {
        None
    } else {
        Some(wgpu::Face::Back)
    }
}

/// GPU buffers need rebuilding when they were made from an older model, or none
pub fn model_is_stale(uploaded: Option<u64>, generation: u64) -> bool {
    uploaded != Some(generation)
}

/// Depth testing off means the draw always passes, whatever is already in the buffer
pub fn depth_stencil_state(state: DrawState) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: state.depth_write,
        depth_compare: if state.depth_test {
            wgpu::CompareFunction::Less
        } else {
            wgpu::CompareFunction::Always
        },
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    }
}
