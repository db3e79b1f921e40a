//! GPU side: one pipeline per hologram kind, fed from the [`Scene`].

use std::{mem, slice};

use glam::Mat4;
use log::{debug, info};
use shared::{CameraUniforms, HologramUniforms, ParticleUniforms, ParticleVertex};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::RenderError;
use crate::hologram::{Hologram, HybridFrame};
use crate::scene::Scene;

const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const FRAME_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

struct ParticleVertices {
    buffer: wgpu::Buffer,
    count: u32,
}

/// The hybrid frame currently on the GPU.
struct FrameTexture {
    texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    point_count: u32,
    index: usize,
}

pub struct Renderer {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,

    particle_pipeline: wgpu::RenderPipeline,
    particle_uniforms: wgpu::Buffer,
    particle_bind_group: wgpu::BindGroup,
    particle_vertices: Option<ParticleVertices>,

    hologram_pipeline: wgpu::RenderPipeline,
    hologram_layout: wgpu::BindGroupLayout,
    hologram_uniforms: wgpu::Buffer,
    frame: Option<FrameTexture>,

    generation: u64,
}

impl Renderer {
    pub fn new(window: &Window) -> Result<Self, RenderError> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());
        let surface = unsafe { instance.create_surface(window)? };
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        }))
        .ok_or(RenderError::NoAdapter)?;
        info!("Using adapter {:?}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                features: wgpu::Features::empty(),
                limits: wgpu::Limits::default(),
                label: None,
            },
            None,
        ))?;

        let size = window.inner_size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: FORMAT,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: wgpu::CompositeAlphaMode::Opaque,
            view_formats: vec![],
        };
        surface.configure(&device, &config);
        let depth_view = create_depth_view(&device, config.width, config.height);

        // CAMERA
        let camera_buffer = uniform_buffer(&device, mem::size_of::<CameraUniforms>());
        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0)],
            label: None,
        });
        let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
            label: None,
        });

        // PARTICLES
        let particle_uniforms = uniform_buffer(&device, mem::size_of::<ParticleUniforms>());
        let particle_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[uniform_entry(0)],
            label: None,
        });
        let particle_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &particle_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: particle_uniforms.as_entire_binding(),
            }],
            label: None,
        });

        // HOLOGRAM
        let hologram_uniforms = uniform_buffer(&device, mem::size_of::<HologramUniforms>());
        let hologram_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                uniform_entry(0),
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
            ],
            label: None,
        });

        // SHADERS
        let shader = device.create_shader_module(wgpu::include_spirv!(env!("shaders.spv")));

        let particle_attributes =
            wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32, 3 => Float32];
        let particle_pipeline = create_pipeline(
            &device,
            &shader,
            &[&camera_layout, &particle_layout],
            ("particles_vs", "particles_fs"),
            &[wgpu::VertexBufferLayout {
                array_stride: mem::size_of::<ParticleVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &particle_attributes,
            }],
        );
        let hologram_pipeline = create_pipeline(
            &device,
            &shader,
            &[&camera_layout, &hologram_layout],
            ("hologram_vs", "hologram_fs"),
            &[],
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            camera_buffer,
            camera_bind_group,
            particle_pipeline,
            particle_uniforms,
            particle_bind_group,
            particle_vertices: None,
            hologram_pipeline,
            hologram_layout,
            hologram_uniforms,
            frame: None,
            generation: 0,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_view(&self.device, width, height);
    }

    /// Brings GPU resources up to date with `scene`.
    ///
    /// Geometry is only re-uploaded when the scene's generation moved, frames
    /// only when playback reached a new one.
    pub fn sync(&mut self, scene: &Scene, view: Mat4, projection: Mat4) {
        let camera = CameraUniforms {
            model_view: view * scene.placement().matrix(),
            projection,
        };
        self.queue
            .write_buffer(&self.camera_buffer, 0, cast_slice(&[camera]));

        if scene.generation() != self.generation {
            self.generation = scene.generation();
            self.particle_vertices = scene.point_cloud().map(|cloud| {
                let vertices = cloud.point_set().vertices();
                debug!("Uploading {} particle vertices", vertices.len());
                ParticleVertices {
                    buffer: self
                        .device
                        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            contents: cast_slice(&vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                            label: None,
                        }),
                    count: vertices.len() as u32,
                }
            });
            self.frame = scene.hologram().map(|hologram| self.create_frame(hologram));
        }

        if let Some(uniforms) = scene.particle_uniforms() {
            self.queue
                .write_buffer(&self.particle_uniforms, 0, cast_slice(&[uniforms]));
        }

        if let (Some(hologram), Some(frame)) = (scene.hologram(), &mut self.frame) {
            self.queue
                .write_buffer(&self.hologram_uniforms, 0, cast_slice(&[hologram.uniforms()]));
            if frame.index != hologram.current_index() {
                frame.index = hologram.current_index();
                write_frame(&self.queue, &frame.texture, hologram.current_frame());
            }
        }
    }

    fn create_frame(&self, hologram: &Hologram) -> FrameTexture {
        let current = hologram.current_frame();
        let size = current.size();
        debug!("Creating {}x{} frame texture", size.x, size.y);

        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: None,
            size: wgpu::Extent3d {
                width: size.x,
                height: size.y,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: FRAME_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_frame(&self.queue, &texture, current);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.hologram_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.hologram_uniforms.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
            ],
            label: None,
        });

        FrameTexture {
            texture,
            bind_group,
            point_count: hologram.point_count(),
            index: hologram.current_index(),
        }
    }

    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let surface = match self.surface.get_current_texture() {
            Ok(surface) => surface,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        let surface_view = surface
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor::default());

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: true,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: true,
                }),
                stencil_ops: None,
            }),
            label: None,
        });

        if let Some(vertices) = &self.particle_vertices {
            render_pass.set_pipeline(&self.particle_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_bind_group(1, &self.particle_bind_group, &[]);
            render_pass.set_vertex_buffer(0, vertices.buffer.slice(..));
            render_pass.draw(0..vertices.count, 0..1);
        }

        if let Some(frame) = &self.frame {
            render_pass.set_pipeline(&self.hologram_pipeline);
            render_pass.set_bind_group(0, &self.camera_bind_group, &[]);
            render_pass.set_bind_group(1, &frame.bind_group, &[]);
            render_pass.draw(0..frame.point_count, 0..1);
        }

        drop(render_pass);
        self.queue.submit([encoder.finish()]);
        surface.present();
        Ok(())
    }
}

fn create_pipeline(
    device: &wgpu::Device,
    shader: &wgpu::ShaderModule,
    bind_group_layouts: &[&wgpu::BindGroupLayout],
    (vs, fs): (&str, &str),
    buffers: &[wgpu::VertexBufferLayout],
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        bind_group_layouts,
        push_constant_ranges: &[],
        label: None,
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: vs,
            buffers,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: fs,
            targets: &[Some(wgpu::ColorTargetState {
                format: FORMAT,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::PointList,
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
        multiview: None,
        label: Some(vs),
    })
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: None,
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    depth_texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn uniform_buffer(device: &wgpu::Device, size: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        size: size as wgpu::BufferAddress,
        mapped_at_creation: false,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        label: None,
    })
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn write_frame(queue: &wgpu::Queue, texture: &wgpu::Texture, frame: &HybridFrame) {
    let size = frame.size();
    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        frame.pixels(),
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(4 * size.x),
            rows_per_image: Some(size.y),
        },
        wgpu::Extent3d {
            width: size.x,
            height: size.y,
            depth_or_array_layers: 1,
        },
    );
}

fn cast_slice<T>(fake: &[T]) -> &[u8] {
    unsafe { slice::from_raw_parts(fake.as_ptr() as _, mem::size_of_val(fake)) }
}
