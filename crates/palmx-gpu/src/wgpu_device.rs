use std::{borrow::Cow, collections::HashMap, sync::mpsc};

use anyhow::{anyhow, Result};
use bytemuck::{Pod, Zeroable};
use futures::executor::block_on;
use glam::{Mat4, Vec2, Vec4};
use wgpu::util::DeviceExt;

use crate::{
    handle::HandleAllocator,
    mips::{generate_mip_chain, MipLevel},
    DrawCommand, Frame, GpuDevice, GpuError, ProgramDesc, ProgramHandle, RenderTargetConfig,
    SamplerDesc, ShaderError, ShaderLanguage, ShaderSource, ShaderStage, TextureDesc,
    TextureFormat, TextureHandle, Vertex, VertexArrayDesc, VertexArrayHandle,
};

pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[derive(Pod, Clone, Copy, Zeroable)]
#[repr(C)]
struct DrawUniforms {
    model: Mat4,
    view: Mat4,
    projection: Mat4,
    color: Vec4,
    target_size: Vec2,
    _padding: Vec2,
}

const DRAW_UNIFORMS_SIZE: u64 = std::mem::size_of::<DrawUniforms>() as u64;

/// Distance between two draws' uniforms in the shared buffer.
fn uniform_stride(min_offset_alignment: u32) -> u64 {
    wgpu::util::align_to(DRAW_UNIFORMS_SIZE, min_offset_alignment.max(1) as u64)
}

/// One uniform slot per draw, bound with a dynamic offset. Grows when a frame
/// has more draws than slots.
struct DrawUniformBuffer {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    stride: u64,
    capacity: usize,
}

impl DrawUniformBuffer {
    fn new(device: &wgpu::Device, layout: &wgpu::BindGroupLayout, capacity: usize) -> Self {
        let stride = uniform_stride(device.limits().min_uniform_buffer_offset_alignment);
        let capacity = capacity.max(1);

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("palmx-gpu::draw uniforms"),
            size: stride * capacity as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("palmx-gpu::draw uniforms"),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(DRAW_UNIFORMS_SIZE),
                }),
            }],
        });

        Self {
            buffer,
            bind_group,
            stride,
            capacity,
        }
    }
}

struct GpuVertexArray {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
}

struct RenderTarget {
    config: RenderTargetConfig,
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

impl RenderTarget {
    fn new(device: &wgpu::Device, config: RenderTargetConfig) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("palmx-gpu::render_target color"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("palmx-gpu::render_target depth"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        Self {
            config,
            color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
            depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
            color,
        }
    }
}

/// [`GpuDevice`] backed by wgpu, rendering into a low-resolution offscreen
/// target.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    handles: HandleAllocator,
    vertex_arrays: HashMap<VertexArrayHandle, GpuVertexArray>,
    textures: HashMap<TextureHandle, GpuTexture>,
    programs: HashMap<ProgramHandle, wgpu::RenderPipeline>,
    uniforms_layout: wgpu::BindGroupLayout,
    draw_uniforms: DrawUniformBuffer,
    material_layout: wgpu::BindGroupLayout,
    /// Keyed by (albedo, normal), with unknown handles mapped to invalid.
    material_bind_groups: HashMap<(TextureHandle, TextureHandle), wgpu::BindGroup>,
    pipeline_layout: wgpu::PipelineLayout,
    fallback_albedo: GpuTexture,
    fallback_normal: GpuTexture,
    render_target: RenderTarget,
}

impl WgpuDevice {
    /// Creates a device without a surface.
    pub fn new_headless(config: RenderTargetConfig) -> Result<Self> {
        block_on(Self::new_headless_async(config))
    }

    async fn new_headless_async(config: RenderTargetConfig) -> Result<Self> {
        palmx_profiling::profile_function!();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: None,
            })
            .await
            .ok_or_else(|| anyhow!("No suitable GPU adapter found"))?;

        let info = adapter.get_info();
        log::info!("Using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("palmx-gpu::device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;

        Ok(Self::from_device(device, queue, config))
    }

    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue, config: RenderTargetConfig) -> Self {
        device.on_uncaptured_error(Box::new(|error| {
            log::error!("Uncaptured GPU error: {}", error);
        }));

        let uniforms_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("palmx-gpu::uniforms"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(DRAW_UNIFORMS_SIZE),
                },
                count: None,
            }],
        });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let sampler_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        };
        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("palmx-gpu::material"),
            entries: &[
                texture_entry(0),
                sampler_entry(1),
                texture_entry(2),
                sampler_entry(3),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("palmx-gpu::program"),
            bind_group_layouts: &[&uniforms_layout, &material_layout],
            push_constant_ranges: &[],
        });

        let fallback_albedo =
            upload_solid_color(&device, &queue, "palmx-gpu::fallback albedo", [255; 4]);
        let fallback_normal = upload_solid_color(
            &device,
            &queue,
            "palmx-gpu::fallback normal",
            [128, 128, 255, 255],
        );
        let render_target = RenderTarget::new(&device, config);
        let draw_uniforms = DrawUniformBuffer::new(&device, &uniforms_layout, 64);

        Self {
            device,
            queue,
            handles: HandleAllocator::default(),
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            programs: HashMap::new(),
            uniforms_layout,
            draw_uniforms,
            material_layout,
            material_bind_groups: HashMap::new(),
            pipeline_layout,
            fallback_albedo,
            fallback_normal,
            render_target,
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn render_target_config(&self) -> RenderTargetConfig {
        self.render_target.config
    }

    /// The low-resolution color target, for blitting to a surface.
    pub fn render_target_view(&self) -> &wgpu::TextureView {
        &self.render_target.color_view
    }

    /// Copies the render target back to the CPU as tightly packed RGBA rows.
    pub fn read_render_target(&self) -> Result<Vec<u8>> {
        palmx_profiling::profile_function!();

        let size = self.render_target.color.size();
        let unpadded_bytes_per_row = size.width * 4;
        let padded_bytes_per_row = unpadded_bytes_per_row
            .div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("palmx-gpu::render_target readback"),
            size: padded_bytes_per_row as u64 * size.height as u64,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("palmx-gpu::render_target readback"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.render_target.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(size.height),
                },
            },
            size,
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = buffer.slice(..);
        let (sender, receiver) = mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        self.device.poll(wgpu::Maintain::Wait);
        receiver.recv()??;

        let mut pixels = Vec::with_capacity((unpadded_bytes_per_row * size.height) as usize);
        {
            let mapped = slice.get_mapped_range();
            for row in mapped.chunks(padded_bytes_per_row as usize) {
                pixels.extend_from_slice(&row[..unpadded_bytes_per_row as usize]);
            }
        }
        buffer.unmap();

        Ok(pixels)
    }

    fn create_shader_module(
        &self,
        label: &str,
        source: &ShaderSource<'_>,
        stage: ShaderStage,
    ) -> Result<wgpu::ShaderModule, ShaderError> {
        palmx_profiling::profile_function!();

        let source = match source.language {
            ShaderLanguage::Wgsl => wgpu::ShaderSource::Wgsl(Cow::Borrowed(source.code)),
            ShaderLanguage::Glsl => wgpu::ShaderSource::Glsl {
                shader: Cow::Borrowed(source.code),
                stage: stage.into(),
                defines: Default::default(),
            },
        };

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source,
            });

        match block_on(self.device.pop_error_scope()) {
            Some(error) => Err(ShaderError::Compile {
                stage,
                log: error.to_string(),
            }),
            None => Ok(module),
        }
    }

    fn is_drawable(&self, draw: &DrawCommand) -> bool {
        draw.index_count > 0
            && self.programs.contains_key(&draw.program)
            && self
                .vertex_arrays
                .get(&draw.vertex_array)
                .is_some_and(|vertex_array| vertex_array.index_count > 0)
    }

    fn material_key(&self, draw: &DrawCommand) -> (TextureHandle, TextureHandle) {
        let known = |handle: TextureHandle| {
            if self.textures.contains_key(&handle) {
                handle
            } else {
                TextureHandle::INVALID
            }
        };
        (known(draw.albedo), known(draw.normal))
    }

    /// Writes every draw's uniforms into its slot of the shared buffer.
    fn write_draw_uniforms(&mut self, frame: &Frame, draws: &[&DrawCommand]) {
        if draws.len() > self.draw_uniforms.capacity {
            self.draw_uniforms = DrawUniformBuffer::new(
                &self.device,
                &self.uniforms_layout,
                draws.len().next_power_of_two(),
            );
        }

        let config = self.render_target.config;
        let target_size = Vec2::new(config.width as f32, config.height as f32);
        let stride = self.draw_uniforms.stride as usize;

        let mut data = vec![0u8; stride * draws.len()];
        for (slot, draw) in data.chunks_exact_mut(stride).zip(draws) {
            let uniforms = DrawUniforms {
                model: draw.model,
                view: frame.view,
                projection: frame.projection,
                color: draw.color,
                target_size,
                _padding: Vec2::ZERO,
            };
            slot[..DRAW_UNIFORMS_SIZE as usize].copy_from_slice(bytemuck::bytes_of(&uniforms));
        }

        if !data.is_empty() {
            self.queue.write_buffer(&self.draw_uniforms.buffer, 0, &data);
        }
    }

    fn cache_material_bind_group(&mut self, key: (TextureHandle, TextureHandle)) {
        let textures = &self.textures;
        let albedo = textures.get(&key.0).unwrap_or(&self.fallback_albedo);
        let normal = textures.get(&key.1).unwrap_or(&self.fallback_normal);

        self.material_bind_groups.entry(key).or_insert_with(|| {
            log::trace!("Creating material bind group for {:?}", key);
            create_material_bind_group(&self.device, &self.material_layout, albedo, normal)
        });
    }
}

impl GpuDevice for WgpuDevice {
    fn create_vertex_array(&mut self, desc: &VertexArrayDesc<'_>) -> VertexArrayHandle {
        palmx_profiling::profile_function!();

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(desc.label),
                contents: desc.vertex_data,
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(desc.label),
                contents: bytemuck::cast_slice(desc.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let handle = VertexArrayHandle::from_raw(self.handles.allocate());
        self.vertex_arrays.insert(
            handle,
            GpuVertexArray {
                vertex_buffer,
                index_buffer,
                index_count: desc.indices.len() as u32,
            },
        );
        handle
    }

    fn create_texture(&mut self, desc: &TextureDesc<'_>) -> Result<TextureHandle, GpuError> {
        palmx_profiling::profile_function!();

        desc.validate()?;

        // wgpu has no three channel format
        let (format, pixels) = match desc.format {
            TextureFormat::R8 => (TextureFormat::R8, Cow::Borrowed(desc.pixels)),
            TextureFormat::Rgb8 => (TextureFormat::Rgba8, Cow::Owned(rgb_to_rgba(desc.pixels))),
            TextureFormat::Rgba8 => (TextureFormat::Rgba8, Cow::Borrowed(desc.pixels)),
        };

        let levels = if desc.sampler.generate_mipmaps {
            generate_mip_chain(desc.width, desc.height, format, &pixels).ok_or_else(|| {
                GpuError::TextureDataSize {
                    label: desc.label.to_owned(),
                    expected: desc.width as usize * desc.height as usize * format.num_channels(),
                    actual: pixels.len(),
                }
            })?
        } else {
            vec![MipLevel {
                width: desc.width,
                height: desc.height,
                pixels: pixels.into_owned(),
            }]
        };

        let texture = upload_levels(&self.device, &self.queue, desc.label, format, &levels);
        let handle = TextureHandle::from_raw(self.handles.allocate());
        self.textures.insert(
            handle,
            GpuTexture {
                view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
                sampler: create_sampler(&self.device, desc.label, &desc.sampler),
                _texture: texture,
            },
        );
        Ok(handle)
    }

    fn create_program(&mut self, desc: &ProgramDesc<'_>) -> Result<ProgramHandle, ShaderError> {
        palmx_profiling::profile_function!();

        let vertex_module = self.create_shader_module(desc.label, &desc.vertex, ShaderStage::Vertex)?;
        let fragment_module =
            self.create_shader_module(desc.label, &desc.fragment, ShaderStage::Fragment)?;

        let attributes = Vertex::LAYOUT.wgpu_attributes();
        let vertex_buffers = [wgpu::VertexBufferLayout {
            array_stride: Vertex::LAYOUT.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        }];

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline = self
            .device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(desc.label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex_module,
                    entry_point: None,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    buffers: &vertex_buffers,
                },
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                fragment: Some(wgpu::FragmentState {
                    module: &fragment_module,
                    entry_point: None,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: COLOR_FORMAT,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                multiview: None,
                cache: None,
            });

        if let Some(error) = block_on(self.device.pop_error_scope()) {
            return Err(ShaderError::Link {
                log: error.to_string(),
            });
        }

        let handle = ProgramHandle::from_raw(self.handles.allocate());
        self.programs.insert(handle, pipeline);
        Ok(handle)
    }

    fn submit(&mut self, frame: &Frame) {
        palmx_profiling::profile_function!();

        let draws = frame
            .draws()
            .iter()
            .filter(|draw| {
                let drawable = self.is_drawable(draw);
                if !drawable {
                    log::trace!("Skipping draw of {:?} with {:?}", draw.vertex_array, draw.program);
                }
                drawable
            })
            .collect::<Vec<_>>();

        self.write_draw_uniforms(frame, &draws);

        let material_keys = draws
            .iter()
            .map(|draw| self.material_key(draw))
            .collect::<Vec<_>>();
        for &key in &material_keys {
            self.cache_material_bind_group(key);
        }

        let [r, g, b, a] = frame.clear_color.map(f64::from);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("palmx-gpu::frame"),
            });
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("palmx-gpu::scene"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.render_target.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.render_target.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let stride = self.draw_uniforms.stride;
            for (slot, (draw, key)) in draws.iter().zip(&material_keys).enumerate() {
                let (Some(pipeline), Some(vertex_array), Some(material)) = (
                    self.programs.get(&draw.program),
                    self.vertex_arrays.get(&draw.vertex_array),
                    self.material_bind_groups.get(key),
                ) else {
                    continue;
                };

                rpass.set_pipeline(pipeline);
                rpass.set_bind_group(0, &self.draw_uniforms.bind_group, &[(slot as u64 * stride) as u32]);
                rpass.set_bind_group(1, material, &[]);
                rpass.set_vertex_buffer(0, vertex_array.vertex_buffer.slice(..));
                rpass.set_index_buffer(vertex_array.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..draw.index_count.min(vertex_array.index_count), 0, 0..1);
            }
        }

        self.queue.submit(Some(encoder.finish()));
    }
}

fn rgb_to_rgba(pixels: &[u8]) -> Vec<u8> {
    pixels
        .chunks_exact(3)
        .flat_map(|rgb| [rgb[0], rgb[1], rgb[2], 255])
        .collect()
}

fn upload_levels(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    format: TextureFormat,
    levels: &[MipLevel],
) -> wgpu::Texture {
    let (width, height) = levels
        .first()
        .map(|level| (level.width, level.height))
        .unwrap_or((1, 1));

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: levels.len().max(1) as u32,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: match format {
            TextureFormat::R8 => wgpu::TextureFormat::R8Unorm,
            TextureFormat::Rgb8 | TextureFormat::Rgba8 => wgpu::TextureFormat::Rgba8Unorm,
        },
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    for (mip_level, level) in levels.iter().enumerate() {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: mip_level as u32,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &level.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(level.width * format.num_channels() as u32),
                rows_per_image: Some(level.height),
            },
            wgpu::Extent3d {
                width: level.width,
                height: level.height,
                depth_or_array_layers: 1,
            },
        );
    }

    texture
}

fn create_sampler(device: &wgpu::Device, label: &str, desc: &SamplerDesc) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: desc.wrap.into(),
        address_mode_v: desc.wrap.into(),
        address_mode_w: desc.wrap.into(),
        mag_filter: desc.mag_filter.into(),
        min_filter: desc.min_filter.into(),
        mipmap_filter: desc.mipmap_filter.into(),
        ..Default::default()
    })
}

fn create_material_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    albedo: &GpuTexture,
    normal: &GpuTexture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("palmx-gpu::material"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&albedo.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&albedo.sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::TextureView(&normal.view),
            },
            wgpu::BindGroupEntry {
                binding: 3,
                resource: wgpu::BindingResource::Sampler(&normal.sampler),
            },
        ],
    })
}

fn upload_solid_color(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    color: [u8; 4],
) -> GpuTexture {
    let levels = [MipLevel {
        width: 1,
        height: 1,
        pixels: color.to_vec(),
    }];
    let texture = upload_levels(device, queue, label, TextureFormat::Rgba8, &levels);
    let sampler = SamplerDesc {
        generate_mipmaps: false,
        ..SamplerDesc::REPEAT_TRILINEAR
    };

    GpuTexture {
        view: texture.create_view(&wgpu::TextureViewDescriptor::default()),
        sampler: create_sampler(device, label, &sampler),
        _texture: texture,
    }
}
