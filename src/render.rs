//! Particle draw passes: the main lit point-sprite pass and the shadow
//! distance pass.
//!
//! Both passes share one invariant: for any given frame they read the same
//! front state texture. The per-orientation bind groups are built once at
//! init and selected by the pair's front index, so the two passes can never
//! disagree about which texture is current.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::state::StateTexture;
use crate::{shaders, spawn};

/// Depth format shared with the host render pass.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Format of the light-space distance map.
pub const SHADOW_MAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::R32Float;

/// Point-sprite appearance.
#[derive(Debug, Clone, Copy)]
pub struct SpriteStyle {
    /// Half-size of the billboard in clip-space units.
    pub point_size: f32,
    /// Base sprite color.
    pub color: Vec3,
    /// Sprite opacity before additive accumulation.
    pub opacity: f32,
    /// Ambient light floor in [0, 1].
    pub ambient: f32,
}

impl Default for SpriteStyle {
    fn default() -> Self {
        Self {
            point_size: 0.004,
            color: Vec3::ONE,
            opacity: 0.8,
            ambient: 0.2,
        }
    }
}

/// Shadow-casting light configuration.
#[derive(Debug, Clone, Copy)]
pub struct ShadowConfig {
    /// World-space position of the point light.
    pub light_position: Vec3,
    /// Distance mapped to 0 in the shadow map.
    pub near: f32,
    /// Distance mapped to 1 in the shadow map.
    pub far: f32,
    /// Comparison bias to avoid self-shadow acne.
    pub bias: f32,
    /// Shadow map resolution (square).
    pub map_size: u32,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            light_position: Vec3::new(0.0, 0.0, 100.0),
            near: 1.0,
            far: 1000.0,
            bias: 0.005,
            map_size: 2048,
        }
    }
}

impl ShadowConfig {
    /// View-projection from the light toward the scene origin.
    pub fn view_proj(&self) -> Mat4 {
        let dir = (Vec3::ZERO - self.light_position).normalize_or_zero();
        let up = if dir.cross(Vec3::Y).length_squared() < 1e-6 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let view = Mat4::look_at_rh(self.light_position, Vec3::ZERO, up);
        let proj =
            Mat4::perspective_rh(std::f32::consts::FRAC_PI_2, 1.0, self.near, self.far);
        proj * view
    }

    /// Packed `[near, far, bias, map_size]` as consumed by the shaders.
    pub fn params(&self) -> [f32; 4] {
        [self.near, self.far, self.bias, self.map_size as f32]
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SceneUniforms {
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    light_position: [f32; 3],
    point_size: f32,
    color: [f32; 3],
    ambient: f32,
    shadow_params: [f32; 4],
    opacity: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct ShadowUniforms {
    light_view_proj: [[f32; 4]; 4],
    light_position: [f32; 3],
    point_size: f32,
    near_distance: f32,
    far_distance: f32,
    _pad: [f32; 2],
}

/// Additive accumulation: overlapping sprites brighten each other and draw
/// order does not matter.
const ADDITIVE_BLEND: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

/// Pipelines, buffers and the shadow map for drawing the particle set.
pub struct ParticleRenderer {
    amount: u32,
    instance_buffer: wgpu::Buffer,
    style: SpriteStyle,
    shadow: ShadowConfig,

    scene_uniform_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
    particle_pipeline: wgpu::RenderPipeline,
    /// Per-orientation state + shadow-map bindings for the main pass.
    particle_state_bind_groups: [wgpu::BindGroup; 2],

    shadow_bind_group: wgpu::BindGroup,
    shadow_pipeline: wgpu::RenderPipeline,
    /// Per-orientation state bindings for the shadow pass.
    shadow_state_bind_groups: [wgpu::BindGroup; 2],
    shadow_map_view: wgpu::TextureView,
    shadow_depth_view: wgpu::TextureView,
}

impl ParticleRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        state_a: &StateTexture,
        state_b: &StateTexture,
        width: u32,
        height: u32,
        surface_format: wgpu::TextureFormat,
        style: SpriteStyle,
        shadow: ShadowConfig,
    ) -> Self {
        let amount = width * height;

        // The only CPU-resident per-particle data: the texel address.
        let addresses = spawn::texel_addresses(width, height);
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Texel Address Buffer"),
            contents: bytemuck::cast_slice(&addresses),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let (shadow_map_view, shadow_depth_view) = create_shadow_targets(device, shadow.map_size);

        let scene_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniform Buffer"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // The light is fixed at build time; its uniforms are written once.
        let light_view_proj = shadow.view_proj().to_cols_array_2d();
        let shadow_uniforms = ShadowUniforms {
            light_view_proj,
            light_position: shadow.light_position.to_array(),
            point_size: style.point_size,
            near_distance: shadow.near,
            far_distance: shadow.far,
            _pad: [0.0; 2],
        };
        let shadow_uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Shadow Uniform Buffer"),
            contents: bytemuck::bytes_of(&shadow_uniforms),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let uniform_layout_entry = |visibility| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let texture_layout_entry = |binding, visibility| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        // Main pass: group 0 = scene uniforms, group 1 = state + shadow map.
        let scene_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[uniform_layout_entry(
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            )],
        });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout: &scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_uniform_buffer.as_entire_binding(),
            }],
        });

        let particle_state_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Particle State Bind Group Layout"),
                entries: &[
                    texture_layout_entry(0, wgpu::ShaderStages::VERTEX),
                    texture_layout_entry(1, wgpu::ShaderStages::FRAGMENT),
                ],
            });

        let make_particle_state_group = |label: &str, state: &StateTexture| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &particle_state_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&state.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&shadow_map_view),
                    },
                ],
            })
        };

        let particle_state_bind_groups = [
            make_particle_state_group("Particle State Bind Group (A)", state_a),
            make_particle_state_group("Particle State Bind Group (B)", state_b),
        ];

        // Shadow pass: group 0 = light uniforms, group 1 = state texture.
        let shadow_scene_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow Uniform Bind Group Layout"),
                entries: &[uniform_layout_entry(
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
            });

        let shadow_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Shadow Uniform Bind Group"),
            layout: &shadow_scene_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: shadow_uniform_buffer.as_entire_binding(),
            }],
        });

        let shadow_state_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Shadow State Bind Group Layout"),
                entries: &[texture_layout_entry(0, wgpu::ShaderStages::VERTEX)],
            });

        let make_shadow_state_group = |label: &str, state: &StateTexture| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &shadow_state_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&state.view),
                }],
            })
        };

        let shadow_state_bind_groups = [
            make_shadow_state_group("Shadow State Bind Group (A)", state_a),
            make_shadow_state_group("Shadow State Bind Group (B)", state_b),
        ];

        let instance_attributes = [wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Uint32x2,
        }];
        let instance_layout = wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[u32; 2]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &instance_attributes,
        };

        let particle_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::PARTICLES_WGSL.into()),
        });

        let particle_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Particle Pipeline Layout"),
                bind_group_layouts: &[&scene_layout, &particle_state_layout],
                push_constant_ranges: &[],
            });

        let particle_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Particle Pipeline"),
            layout: Some(&particle_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &particle_shader,
                entry_point: Some("vs_main"),
                buffers: &[instance_layout.clone()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &particle_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(ADDITIVE_BLEND),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                // Additive sprites test against scene depth but do not
                // occlude each other.
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shadow Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHADOW_WGSL.into()),
        });

        let shadow_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Shadow Pipeline Layout"),
                bind_group_layouts: &[&shadow_scene_layout, &shadow_state_layout],
                push_constant_ranges: &[],
            });

        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Shadow Pipeline"),
            layout: Some(&shadow_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_main"),
                buffers: &[instance_layout],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shadow_shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: SHADOW_MAP_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let renderer = Self {
            amount,
            instance_buffer,
            style,
            shadow,
            scene_uniform_buffer,
            scene_bind_group,
            particle_pipeline,
            particle_state_bind_groups,
            shadow_bind_group,
            shadow_pipeline,
            shadow_state_bind_groups,
            shadow_map_view,
            shadow_depth_view,
        };
        renderer.write_scene_uniforms(queue, Mat4::IDENTITY);
        renderer
    }

    fn write_scene_uniforms(&self, queue: &wgpu::Queue, view_proj: Mat4) {
        let uniforms = SceneUniforms {
            view_proj: view_proj.to_cols_array_2d(),
            light_view_proj: self.shadow.view_proj().to_cols_array_2d(),
            light_position: self.shadow.light_position.to_array(),
            point_size: self.style.point_size,
            color: self.style.color.to_array(),
            ambient: self.style.ambient,
            shadow_params: self.shadow.params(),
            opacity: self.style.opacity,
            _pad: [0.0; 3],
        };
        queue.write_buffer(&self.scene_uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Upload the camera matrix for this frame.
    pub fn update_view(&self, queue: &wgpu::Queue, view_proj: Mat4) {
        self.write_scene_uniforms(queue, view_proj);
    }

    /// Encode the light-space distance pass into the shadow map.
    pub fn encode_shadow_pass(&self, encoder: &mut wgpu::CommandEncoder, front_index: usize) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Distance Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &self.shadow_map_view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    // Clear to maximum distance: everything lit by default.
                    load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.shadow_depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        pass.set_pipeline(&self.shadow_pipeline);
        pass.set_bind_group(0, &self.shadow_bind_group, &[]);
        pass.set_bind_group(1, &self.shadow_state_bind_groups[front_index], &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..6, 0..self.amount);
    }

    /// Record the main particle draw into an already-open render pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>, front_index: usize) {
        pass.set_pipeline(&self.particle_pipeline);
        pass.set_bind_group(0, &self.scene_bind_group, &[]);
        pass.set_bind_group(1, &self.particle_state_bind_groups[front_index], &[]);
        pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        pass.draw(0..6, 0..self.amount);
    }

    /// The light-space distance map, for scene geometry that receives
    /// particle shadows.
    pub fn shadow_map_view(&self) -> &wgpu::TextureView {
        &self.shadow_map_view
    }

    pub fn shadow_config(&self) -> &ShadowConfig {
        &self.shadow
    }

    pub fn style(&self) -> &SpriteStyle {
        &self.style
    }
}

fn create_shadow_targets(
    device: &wgpu::Device,
    map_size: u32,
) -> (wgpu::TextureView, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width: map_size,
        height: map_size,
        depth_or_array_layers: 1,
    };

    let map = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Shadow Distance Map"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: SHADOW_MAP_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });

    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Shadow Depth Buffer"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });

    (
        map.create_view(&wgpu::TextureViewDescriptor::default()),
        depth.create_view(&wgpu::TextureViewDescriptor::default()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadow_params_packing() {
        let shadow = ShadowConfig::default();
        let p = shadow.params();
        assert_eq!(p[0], shadow.near);
        assert_eq!(p[1], shadow.far);
        assert_eq!(p[3], shadow.map_size as f32);
    }

    #[test]
    fn test_light_view_proj_is_finite() {
        let shadow = ShadowConfig {
            light_position: Vec3::new(0.0, 120.0, 0.0),
            ..Default::default()
        };
        let m = shadow.view_proj();
        assert!(m.to_cols_array().iter().all(|v| v.is_finite()));
    }
}
