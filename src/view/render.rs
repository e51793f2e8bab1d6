use glam::Mat4;
use wgpu::*;
use wgpu::util::DeviceExt;

use crate::controller::{CameraUniform, LightingUniform, MaterialUniform, ObjectUniform};
use crate::error::RenderError;
use crate::model::{Material, MaterialId, Marker, TextureKey};
use crate::view::gpu_init::surface_config;
use crate::view::mesh::{Mesh, MeshBuffer, Vertex};
use crate::view::texture::{DecodedImage, TextureLibrary};

pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

const SPHERE_SEGMENTS: u32 = 64;
const GROUND_SIZE: f32 = 20.0;
const GROUND_SEGMENTS: u32 = 128;

// Shared graphics setup used by native and web
pub struct FrameResources {
    pub camera_buffer: wgpu::Buffer,
    pub lighting_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub bind_group: wgpu::BindGroup,
}

/// Model matrix of one draw
pub struct DrawTransform {
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

/// Uniforms and bound textures of one material
pub struct GpuMaterial {
    pub uniform_buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

fn uniform_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Buffer {
            ty: BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn texture_entry(binding: u32, visibility: ShaderStages) -> BindGroupLayoutEntry {
    BindGroupLayoutEntry {
        binding,
        visibility,
        ty: BindingType::Texture {
            sample_type: TextureSampleType::Float { filterable: true },
            view_dimension: TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub fn create_frame_resources(device: &wgpu::Device) -> FrameResources {
    let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("camera_buffer"),
        size: std::mem::size_of::<CameraUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let lighting_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("lighting_buffer"),
        size: std::mem::size_of::<LightingUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("frame_bind_group_layout"),
        entries: &[
            uniform_entry(0, ShaderStages::VERTEX | ShaderStages::FRAGMENT),
            uniform_entry(1, ShaderStages::FRAGMENT),
        ],
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("frame_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
        ],
    });

    FrameResources { camera_buffer, lighting_buffer, bind_group_layout, bind_group }
}

pub fn create_transform_layout(device: &wgpu::Device) -> BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("transform_bind_group_layout"),
        entries: &[uniform_entry(0, ShaderStages::VERTEX)],
    })
}

pub fn create_material_layout(device: &wgpu::Device) -> BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("material_bind_group_layout"),
        entries: &[
            uniform_entry(0, ShaderStages::VERTEX | ShaderStages::FRAGMENT),
            texture_entry(1, ShaderStages::FRAGMENT),
            texture_entry(2, ShaderStages::FRAGMENT),
            texture_entry(3, ShaderStages::FRAGMENT),
            // Displacement is sampled while moving vertices
            texture_entry(4, ShaderStages::VERTEX | ShaderStages::FRAGMENT),
            BindGroupLayoutEntry {
                binding: 5,
                visibility: ShaderStages::VERTEX | ShaderStages::FRAGMENT,
                ty: BindingType::Sampler(SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

impl DrawTransform {
    pub fn new(device: &Device, layout: &BindGroupLayout, model: Mat4, label: &str) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(&ObjectUniform::new(model)),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: buffer.as_entire_binding() }],
        });
        Self { buffer, bind_group }
    }

    pub fn write(&self, queue: &Queue, model: Mat4) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&ObjectUniform::new(model)));
    }
}

impl GpuMaterial {
    /// Bind the material's maps. Slots whose image has not arrived yet get the
    /// white fallback and their flag stays off.
    pub fn new(
        device: &Device,
        queue: &Queue,
        layout: &BindGroupLayout,
        textures: &TextureLibrary,
        material: &Material,
        label: &str,
    ) -> Self {
        let (color_view, has_color) = textures.view_for(material.color_map);
        let (bump_view, has_bump) = textures.view_for(material.slots.bump);
        let (normal_view, has_normal) = textures.view_for(material.slots.normal);
        let (displacement_view, has_displacement) = textures.view_for(material.slots.displacement);

        let mut flags = 0;
        for (present, flag) in [
            (has_color, MaterialUniform::COLOR_MAP),
            (has_bump, MaterialUniform::BUMP_MAP),
            (has_normal, MaterialUniform::NORMAL_MAP),
            (has_displacement, MaterialUniform::DISPLACEMENT_MAP),
        ] {
            if present {
                flags |= flag;
            }
        }

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: std::mem::size_of::<MaterialUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&uniform_buffer, 0, bytemuck::bytes_of(&MaterialUniform::new(material, flags)));

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: uniform_buffer.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: BindingResource::TextureView(color_view) },
                wgpu::BindGroupEntry { binding: 2, resource: BindingResource::TextureView(bump_view) },
                wgpu::BindGroupEntry { binding: 3, resource: BindingResource::TextureView(normal_view) },
                wgpu::BindGroupEntry { binding: 4, resource: BindingResource::TextureView(displacement_view) },
                wgpu::BindGroupEntry { binding: 5, resource: BindingResource::Sampler(&textures.sampler) },
            ],
        });

        Self { uniform_buffer, bind_group }
    }
}

pub fn create_scene_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
) -> RenderPipeline {
    let shader_src = include_str!("shaders/scene.wgsl");
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: wgpu::ShaderSource::Wgsl(shader_src.into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pipeline_layout"),
        bind_group_layouts,
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState { format, blend: Some(wgpu::BlendState::REPLACE), write_mask: wgpu::ColorWrites::ALL })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // The ground is seen from both sides once the camera dips below it
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

///////////////////////////////////////////////////////////////////////////////

/// Consolidated render state to avoid parameter explosion
pub struct RenderState {
    // wgpu resources
    pub format: TextureFormat,
    pub alpha_mode: CompositeAlphaMode,
    pub width: u32,
    pub height: u32,
    depth_view: TextureView,

    pub pipeline: RenderPipeline,
    pub frame: FrameResources,
    material_layout: BindGroupLayout,
    pub textures: TextureLibrary,

    // Meshes
    sphere: MeshBuffer,
    ground: MeshBuffer,
    marker_box: MeshBuffer,

    // Per-draw state
    object_transform: DrawTransform,
    ground_transform: DrawTransform,
    marker_transforms: Vec<DrawTransform>,
    object_material: GpuMaterial,
    ground_material: GpuMaterial,
    marker_material: GpuMaterial,

    // UI
    pub egui_renderer: egui_wgpu::Renderer,
    pub egui_primitives: Option<Vec<egui::ClippedPrimitive>>,
    pub egui_full_output: Option<egui::FullOutput>,
    pub egui_dpr: f32,
}

impl RenderState {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &Device,
        queue: &Queue,
        format: TextureFormat,
        alpha_mode: CompositeAlphaMode,
        width: u32,
        height: u32,
        object: &Material,
        ground: &Material,
        markers: &[Marker],
    ) -> Self {
        let (_, depth_view) = create_depth_texture(device, width, height);
        let frame = create_frame_resources(device);
        let transform_layout = create_transform_layout(device);
        let material_layout = create_material_layout(device);
        let pipeline = create_scene_pipeline(
            device,
            format,
            &[&frame.bind_group_layout, &transform_layout, &material_layout],
        );
        let textures = TextureLibrary::new(device, queue);

        let sphere = Mesh::uv_sphere(1.0, SPHERE_SEGMENTS, SPHERE_SEGMENTS).upload(device, "sphere");
        let ground_mesh = Mesh::plane(GROUND_SIZE, GROUND_SIZE, GROUND_SEGMENTS).upload(device, "ground");
        let marker_box = Mesh::cube(Marker::SIZE).upload(device, "marker");

        let object_transform = DrawTransform::new(device, &transform_layout, Mat4::IDENTITY, "object_transform");
        let ground_transform = DrawTransform::new(device, &transform_layout, Mat4::IDENTITY, "ground_transform");
        // Marker boxes never move
        let marker_transforms = markers
            .iter()
            .map(|m| DrawTransform::new(device, &transform_layout, Mat4::from_translation(m.position), "marker_transform"))
            .collect();

        let object_material = GpuMaterial::new(device, queue, &material_layout, &textures, object, "object_material");
        let ground_material = GpuMaterial::new(device, queue, &material_layout, &textures, ground, "ground_material");
        let marker_material = GpuMaterial::new(
            device,
            queue,
            &material_layout,
            &textures,
            &Material::solid(Marker::COLOR),
            "marker_material",
        );

        let egui_renderer = egui_wgpu::Renderer::new(device, format, egui_wgpu::RendererOptions::default());

        Self {
            format,
            alpha_mode,
            width,
            height,
            depth_view,
            pipeline,
            frame,
            material_layout,
            textures,
            sphere,
            ground: ground_mesh,
            marker_box,
            object_transform,
            ground_transform,
            marker_transforms,
            object_material,
            ground_material,
            marker_material,
            egui_renderer,
            egui_primitives: None,
            egui_full_output: None,
            egui_dpr: 1.0,
        }
    }

    /// Reconfigure the surface and recreate the depth texture
    pub fn resize(&mut self, device: &Device, surface: &Surface, width: u32, height: u32) {
        if width == 0 || height == 0 || (width == self.width && height == self.height) {
            return;
        }
        self.width = width;
        self.height = height;
        surface.configure(device, &surface_config(self.format, self.alpha_mode, width, height));
        let (_, depth_view) = create_depth_texture(device, width, height);
        self.depth_view = depth_view;
    }

    pub fn insert_texture(&mut self, device: &Device, queue: &Queue, key: TextureKey, image: &DecodedImage) {
        self.textures.insert(device, queue, key, image);
    }

    /// Rebuild a material's bind group from its current slots
    pub fn update_material(&mut self, device: &Device, queue: &Queue, id: MaterialId, material: &Material) {
        let (label, slot) = match id {
            MaterialId::Object => ("object_material", &mut self.object_material),
            MaterialId::Ground => ("ground_material", &mut self.ground_material),
        };
        *slot = GpuMaterial::new(device, queue, &self.material_layout, &self.textures, material, label);
    }

    pub fn write_frame_uniforms(&self, queue: &Queue, camera: &CameraUniform, lighting: &LightingUniform) {
        queue.write_buffer(&self.frame.camera_buffer, 0, bytemuck::bytes_of(camera));
        queue.write_buffer(&self.frame.lighting_buffer, 0, bytemuck::bytes_of(lighting));
    }

    pub fn write_object_transform(&self, queue: &Queue, model: Mat4) {
        self.object_transform.write(queue, model);
    }

    fn acquire_frame(&self, device: &Device, surface: &Surface) -> Result<Option<SurfaceTexture>, RenderError> {
        match surface.get_current_texture() {
            Ok(frame) => Ok(Some(frame)),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                tracing::debug!("surface lost, reconfiguring");
                surface.configure(device, &surface_config(self.format, self.alpha_mode, self.width, self.height));
                Ok(Some(surface.get_current_texture()?))
            }
            Err(SurfaceError::Timeout) => {
                tracing::debug!("surface timeout, skipping frame");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn draw_frame(&mut self, device: &Device, queue: &Queue, surface: &Surface) -> Result<(), RenderError> {
        let Some(frame) = self.acquire_frame(device, surface)? else {
            return Ok(());
        };

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("encoder"),
        });

        {
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color::WHITE),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.frame.bind_group, &[]);

            let mut draw = |mesh: &MeshBuffer, transform: &DrawTransform, material: &GpuMaterial| {
                if mesh.index_count == 0 {
                    return;
                }
                rp.set_bind_group(1, &transform.bind_group, &[]);
                rp.set_bind_group(2, &material.bind_group, &[]);
                rp.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                rp.set_index_buffer(mesh.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..mesh.index_count, 0, 0..1);
            };

            draw(&self.ground, &self.ground_transform, &self.ground_material);
            draw(&self.sphere, &self.object_transform, &self.object_material);
            for transform in &self.marker_transforms {
                draw(&self.marker_box, transform, &self.marker_material);
            }
        }

        if let (Some(egui_primitives), Some(egui_full_output)) = (self.egui_primitives.take(), self.egui_full_output.take()) {
            let screen_descriptor = egui_wgpu::ScreenDescriptor {
                size_in_pixels: [self.width, self.height],
                pixels_per_point: self.egui_dpr,
            };

            // Upload egui textures
            for (id, image_delta) in &egui_full_output.textures_delta.set {
                self.egui_renderer
                    .update_texture(device, queue, *id, image_delta);
            }

            // Update egui buffers
            self.egui_renderer
                .update_buffers(device, queue, &mut encoder, &egui_primitives, &screen_descriptor);

            // Render egui overlay
            {
                let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                    label: Some("egui_render_pass"),
                    color_attachments: &[Some(RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: Operations {
                            load: LoadOp::Load,
                            store: StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });

                self.egui_renderer
                    .render(&mut egui_pass.forget_lifetime(), &egui_primitives, &screen_descriptor);
            }

            // Free egui textures
            for id in &egui_full_output.textures_delta.free {
                self.egui_renderer.free_texture(id);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
