use std::iter::once;
use std::mem::size_of;

use anyhow::{bail, Context, Result};
use bytemuck::{bytes_of, cast_slice};
use bytemuck_derive::{Pod, Zeroable};
use log::{debug, warn};
use nalgebra::{point, Point2, Point3};
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use wgpu::{BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, Buffer, BufferUsages, ColorTargetState, ColorWrites, CommandEncoderDescriptor, DeviceDescriptor, Extent3d, FragmentState, ImageCopyTexture, ImageDataLayout, include_wgsl, InstanceDescriptor, LoadOp, Operations, Origin3d, PipelineLayoutDescriptor, PrimitiveState, PrimitiveTopology, RenderPassColorAttachment, RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, RequestAdapterOptions, SamplerBindingType, ShaderStages, Surface, SurfaceConfiguration, SurfaceError, TextureAspect, TextureDescriptor, TextureDimension, TextureFormat, TextureSampleType, TextureUsages, TextureViewDescriptor, TextureViewDimension, vertex_attr_array, VertexBufferLayout, VertexState, VertexStepMode};
use wgpu::util::{BufferInitDescriptor, DeviceExt};
use whitted::{Picture, RGBA8};

#[derive(Default, Copy, Clone, Pod, Zeroable)]
#[repr(C)]
struct Vertex {
    position: Point3<f32>,
    tex: Point2<f32>,
}

// full-screen quad; texture row 0 lands at the bottom of the window
const VERTEX_DATA: [Vertex; 4] = [
    Vertex {
        position: point![-1.0, 1.0, 0.0],
        tex: point![0.0, 1.0],
    },
    Vertex {
        position: point![-1.0, -1.0, 0.0],
        tex: point![0.0, 0.0],
    },
    Vertex {
        position: point![1.0, 1.0, 0.0],
        tex: point![1.0, 1.0],
    },
    Vertex {
        position: point![1.0, -1.0, 0.0],
        tex: point![1.0, 0.0],
    },
];

const FRAME_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Shows one finished picture stretched over the whole window surface.
pub struct Presenter {
    gpu: Gpu,
    surface: Surface,
    surface_config: SurfaceConfiguration,
    vertex_buffer: Buffer,
    pipeline: RenderPipeline,
    bind_group: BindGroup,
}

impl Presenter {
    pub fn new(gpu: Gpu, surface: Surface, size: (u32, u32), picture: &Picture<RGBA8>) -> Result<Self> {
        check_picture_size(picture, gpu.device.limits().max_texture_dimension_2d)?;

        let (width, height) = size;
        let mut surface_config = surface.get_default_config(&gpu.adapter, width.max(1), height.max(1))
            .context("window surface is not supported by the adapter")?;
        // the picture is already display-ready, keep the swapchain from re-encoding it
        surface_config.format = surface_config.format.remove_srgb_suffix();
        surface.configure(&gpu.device, &surface_config);
        debug!(target: "app", "Surface: {:?}", surface_config);

        let vertex_buffer = gpu.device.create_buffer_init(&BufferInitDescriptor {
            label: None,
            usage: BufferUsages::VERTEX,
            contents: bytes_of(&VERTEX_DATA),
        });

        let frame = upload_picture(&gpu, picture);
        let sampler = gpu.device.create_sampler(&Default::default());

        let texture_bind_group_layout = gpu.device.create_bind_group_layout(&BindGroupLayoutDescriptor {
            label: None,
            entries: &[
                BindGroupLayoutEntry {
                    count: None,
                    binding: 0,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Texture {
                        multisampled: false,
                        sample_type: TextureSampleType::Float { filterable: false },
                        view_dimension: TextureViewDimension::D2,
                    },
                },
                BindGroupLayoutEntry {
                    count: None,
                    binding: 1,
                    visibility: ShaderStages::FRAGMENT,
                    ty: BindingType::Sampler(SamplerBindingType::NonFiltering),
                },
            ],
        });

        let module = gpu.device.create_shader_module(include_wgsl!("shader.wgsl"));
        let pipeline_layout = gpu.device.create_pipeline_layout(&PipelineLayoutDescriptor {
            label: None,
            bind_group_layouts: &[&texture_bind_group_layout],
            push_constant_ranges: &[],
        });
        let pipeline = gpu.device.create_render_pipeline(&RenderPipelineDescriptor {
            label: None,
            layout: Some(&pipeline_layout),
            vertex: VertexState {
                module: &module,
                entry_point: "vertex_main",
                buffers: &[
                    VertexBufferLayout {
                        array_stride: size_of::<Vertex>() as _,
                        attributes: &vertex_attr_array![0 => Float32x3, 1 => Float32x2],
                        step_mode: VertexStepMode::Vertex,
                    },
                ],
            },
            primitive: PrimitiveState {
                topology: PrimitiveTopology::TriangleStrip,

                ..Default::default()
            },

            depth_stencil: None,
            multisample: Default::default(),
            fragment: Some(FragmentState {
                module: &module,
                entry_point: "fragment_main",
                targets: &[Some(ColorTargetState {
                    format: surface_config.format,
                    blend: None,
                    write_mask: ColorWrites::COLOR,
                })],
            }),
            multiview: None,
        });

        let frame_view = frame.create_view(&TextureViewDescriptor::default());
        let bind_group = gpu.device.create_bind_group(&BindGroupDescriptor {
            label: None,
            layout: &texture_bind_group_layout,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&frame_view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&sampler),
                },
            ],
        });

        Ok(Presenter {
            gpu,
            surface,
            surface_config,
            vertex_buffer,
            pipeline,
            bind_group,
        })
    }

    /// Follows the window size. The picture keeps its resolution and is stretched.
    pub fn resize(&mut self, size: (u32, u32)) {
        let (width, height) = size;
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.gpu.device, &self.surface_config);
    }

    pub fn render(&mut self) {
        let target = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(SurfaceError::Timeout) => return,
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                self.surface.configure(&self.gpu.device, &self.surface_config);
                return;
            }
            Err(err) => {
                warn!(target: "app", "Could not acquire surface texture: {}", err);
                return;
            }
        };
        let target_view = target.texture.create_view(&TextureViewDescriptor::default());

        let mut encoder = self.gpu.device.create_command_encoder(&CommandEncoderDescriptor::default());

        {
            let mut render_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: None,
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &target_view,
                    ops: Operations {
                        load: LoadOp::Clear(wgpu::Color::BLACK),
                        store: true,
                    },
                    resolve_target: None,
                })],
                depth_stencil_attachment: None,
            });
            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, &self.bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.draw(0..4, 0..1);
        }

        self.gpu.queue.submit(once(encoder.finish()));
        target.present();
    }
}

/// The picture is uploaded as a single texture, so neither side may exceed the device limit.
fn check_picture_size<P>(picture: &Picture<P>, max_dimension: u32) -> Result<()> {
    if picture.width() > max_dimension || picture.height() > max_dimension {
        bail!("{}x{} picture exceeds the largest texture this device supports ({}x{})",
            picture.width(), picture.height(), max_dimension, max_dimension);
    }
    Ok(())
}

fn upload_picture(gpu: &Gpu, picture: &Picture<RGBA8>) -> wgpu::Texture {
    let size = Extent3d {
        width: picture.width(),
        height: picture.height(),
        depth_or_array_layers: 1,
    };
    let texture = gpu.device.create_texture(&TextureDescriptor {
        label: Some("picture"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: FRAME_FORMAT,
        usage: TextureUsages::COPY_DST | TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });

    let bytes: &[u8] = cast_slice(picture.buffer());
    debug!(target: "app", "Uploading picture. {}x{}, {} bytes", picture.width(), picture.height(), bytes.len());
    gpu.queue.write_texture(
        ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            aspect: TextureAspect::All,
            origin: Origin3d::ZERO,
        },
        bytes,
        ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(size_of::<RGBA8>() as u32 * picture.width()),
            rows_per_image: Some(picture.height()),
        },
        size,
    );
    texture
}

pub struct Gpu {
    instance: wgpu::Instance,
    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl Gpu {
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(InstanceDescriptor::default());
        let adapter = instance.request_adapter(&RequestAdapterOptions::default())
            .await
            .context("no wgpu adapter available")?;
        let (device, queue) = adapter.request_device(&DeviceDescriptor::default(), None).await
            .context("requesting wgpu device")?;

        Ok(Gpu { instance, adapter, device, queue })
    }

    pub fn surface<R>(&self, raw: &R) -> Result<Surface>
        where R: HasRawWindowHandle + HasRawDisplayHandle {
        // SAFETY: the caller keeps the window alive for as long as the surface.
        unsafe { self.instance.create_surface(raw) }
            .context("creating window surface")
    }
}
