//! The render collaborator: draws the particle snapshot once per frame.
//!
//! Rendering never mutates simulation state. Each redraw the runner hands the
//! current particle slice over; this module mirrors it into an instance
//! buffer and draws one quad per particle. The vertex stage applies the
//! particle's axis-angle rotation to the quad for the 3D-look spin, the
//! fragment stage carves the quad into the particle's shape.
//!
//! Paint order is collection order: index 0 (the newest particle) is drawn
//! first and therefore sits beneath older pieces.

use std::sync::Arc;

use glam::Vec3;
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::error::GpuError;
use crate::particle::Particle;

/// Initial instance-buffer capacity; grows geometrically beyond this.
const INITIAL_CAPACITY: usize = 512;

/// Per-particle data mirrored to the GPU each frame.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ParticleInstance {
    /// Center position in canvas pixels.
    pub position: [f32; 2],
    /// Bounding box in pixels.
    pub size: [f32; 2],
    /// RGB color, 0.0-1.0.
    pub color: [f32; 3],
    /// Rotation angle in degrees.
    pub rotation: f32,
    /// Rotation axis (not necessarily normalized; the shader guards).
    pub axis: [f32; 3],
    /// Shape id, see `ShapeKind::index`.
    pub shape: u32,
}

impl From<&Particle> for ParticleInstance {
    fn from(particle: &Particle) -> Self {
        Self {
            position: particle.position.to_array(),
            size: particle.size.to_array(),
            color: particle.color.to_array(),
            rotation: particle.rotation,
            axis: particle.rotation_axis.to_array(),
            shape: particle.shape.index(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    canvas: [f32; 2],
    _padding: [f32; 2],
}

/// The render shader: canvas-space quads, axis-angle rotation in the vertex
/// stage, per-shape coverage tests in the fragment stage.
pub const SHADER_SOURCE: &str = r#"
struct Uniforms {
    canvas: vec2<f32>,
    _padding: vec2<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) half_size: vec2<f32>,
    @location(3) @interpolate(flat) shape: u32,
};

fn rotation_matrix(raw_axis: vec3<f32>, degrees: f32) -> mat3x3<f32> {
    let len = length(raw_axis);
    if len < 1e-5 {
        return mat3x3<f32>(
            vec3<f32>(1.0, 0.0, 0.0),
            vec3<f32>(0.0, 1.0, 0.0),
            vec3<f32>(0.0, 0.0, 1.0),
        );
    }
    let axis = raw_axis / len;
    let angle = radians(degrees);
    let c = cos(angle);
    let s = sin(angle);
    let t = 1.0 - c;
    return mat3x3<f32>(
        vec3<f32>(
            t * axis.x * axis.x + c,
            t * axis.x * axis.y + s * axis.z,
            t * axis.x * axis.z - s * axis.y,
        ),
        vec3<f32>(
            t * axis.x * axis.y - s * axis.z,
            t * axis.y * axis.y + c,
            t * axis.y * axis.z + s * axis.x,
        ),
        vec3<f32>(
            t * axis.x * axis.z + s * axis.y,
            t * axis.y * axis.z - s * axis.x,
            t * axis.z * axis.z + c,
        ),
    );
}

@vertex
fn vs_main(
    @builtin(vertex_index) vertex_index: u32,
    @location(0) particle_pos: vec2<f32>,
    @location(1) particle_size: vec2<f32>,
    @location(2) particle_color: vec3<f32>,
    @location(3) rotation_degrees: f32,
    @location(4) rotation_axis: vec3<f32>,
    @location(5) shape: u32,
) -> VertexOutput {
    var quad_vertices = array<vec2<f32>, 6>(
        vec2<f32>(-1.0, -1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>(-1.0,  1.0),
        vec2<f32>( 1.0, -1.0),
        vec2<f32>( 1.0,  1.0),
    );

    let quad_pos = quad_vertices[vertex_index];
    let half_size = particle_size * 0.5;
    let rotated = rotation_matrix(rotation_axis, rotation_degrees)
        * vec3<f32>(quad_pos * half_size, 0.0);
    let world = particle_pos + rotated.xy;

    var out: VertexOutput;
    out.clip_position = vec4<f32>(
        world.x / uniforms.canvas.x * 2.0 - 1.0,
        1.0 - world.y / uniforms.canvas.y * 2.0,
        0.0,
        1.0,
    );
    out.color = particle_color;
    out.uv = quad_pos;
    out.half_size = half_size;
    out.shape = shape;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    // uv is the unrotated quad coordinate, (-1,-1) at the top-left of the
    // particle in canvas orientation.
    switch in.shape {
        case 0u: {
            // Circle inscribed in the shorter side of the box.
            let radius = min(in.half_size.x, in.half_size.y);
            if length(in.uv * in.half_size) > radius {
                discard;
            }
        }
        case 1u: {
            // Ellipse filling the whole box.
            if length(in.uv) > 1.0 {
                discard;
            }
        }
        case 2u: {
            // Rectangle: the whole quad.
        }
        default: {
            // Apex-up triangle: apex at the top edge center, base along the
            // bottom edge.
            if abs(in.uv.x) > (in.uv.y + 1.0) * 0.5 {
                discard;
            }
        }
    }
    return vec4<f32>(in.color, 1.0);
}
"#;

/// GPU state for the windowed runner.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    background: wgpu::Color,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, background: Vec3) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (INITIAL_CAPACITY * std::mem::size_of::<ParticleInstance>())
                as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniforms = Uniforms {
            canvas: [config.width as f32, config.height as f32],
            _padding: [0.0; 2],
        };
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Confetti Shader"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<ParticleInstance>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &[
                        wgpu::VertexAttribute {
                            offset: 0,
                            shader_location: 0,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 8,
                            shader_location: 1,
                            format: wgpu::VertexFormat::Float32x2,
                        },
                        wgpu::VertexAttribute {
                            offset: 16,
                            shader_location: 2,
                            format: wgpu::VertexFormat::Float32x3,
                        },
                        wgpu::VertexAttribute {
                            offset: 28,
                            shader_location: 3,
                            format: wgpu::VertexFormat::Float32,
                        },
                        wgpu::VertexAttribute {
                            offset: 32,
                            shader_location: 4,
                            format: wgpu::VertexFormat::Float32x3,
                        },
                        wgpu::VertexAttribute {
                            offset: 44,
                            shader_location: 5,
                            format: wgpu::VertexFormat::Uint32,
                        },
                    ],
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
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
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            instance_buffer,
            instance_capacity: INITIAL_CAPACITY,
            uniform_buffer,
            uniform_bind_group,
            background: wgpu::Color {
                r: background.x as f64,
                g: background.y as f64,
                b: background.z as f64,
                a: 1.0,
            },
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Ensure the instance buffer can hold `needed` particles.
    fn reserve(&mut self, needed: usize) {
        if needed <= self.instance_capacity {
            return;
        }
        let capacity = needed.next_power_of_two();
        self.instance_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (capacity * std::mem::size_of::<ParticleInstance>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        self.instance_capacity = capacity;
    }

    /// Draw one frame of the given particle snapshot.
    pub fn render(&mut self, particles: &[Particle]) -> Result<(), wgpu::SurfaceError> {
        let instances: Vec<ParticleInstance> =
            particles.iter().map(ParticleInstance::from).collect();
        self.reserve(instances.len());
        self.queue
            .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));

        let uniforms = Uniforms {
            canvas: [self.config.width as f32, self.config.height as f32],
            _padding: [0.0; 2],
        };
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
            render_pass.draw(0..6, 0..instances.len() as u32);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::visuals::ShapeKind;
    use glam::Vec2;

    #[test]
    fn test_instance_mirrors_particle() {
        let particle = Particle {
            position: Vec2::new(10.0, 20.0),
            size: Vec2::new(6.0, 12.0),
            shape: ShapeKind::Triangle,
            color: Vec3::new(1.0, 0.8, 0.0),
            rotation: 42.0,
            rotation_axis: Vec3::new(0.3, 0.6, 0.9),
            ..Particle::default()
        };
        let instance = ParticleInstance::from(&particle);

        assert_eq!(instance.position, [10.0, 20.0]);
        assert_eq!(instance.size, [6.0, 12.0]);
        assert_eq!(instance.color, [1.0, 0.8, 0.0]);
        assert_eq!(instance.rotation, 42.0);
        assert_eq!(instance.shape, ShapeKind::Triangle.index());
    }

    #[test]
    fn test_instance_layout_matches_vertex_attributes() {
        // The vertex attribute offsets in the pipeline description are
        // hand-written; pin the struct layout they assume.
        assert_eq!(std::mem::size_of::<ParticleInstance>(), 48);
        assert_eq!(std::mem::offset_of!(ParticleInstance, size), 8);
        assert_eq!(std::mem::offset_of!(ParticleInstance, color), 16);
        assert_eq!(std::mem::offset_of!(ParticleInstance, rotation), 28);
        assert_eq!(std::mem::offset_of!(ParticleInstance, axis), 32);
        assert_eq!(std::mem::offset_of!(ParticleInstance, shape), 44);
    }
}
