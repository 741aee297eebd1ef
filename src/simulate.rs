//! The GPU position-simulation pass.
//!
//! A full-screen pass over the state texture: every fragment advances one
//! particle. The pass reads the back state texture plus the two morph
//! targets and writes into the front state texture, so reads and writes
//! never alias within a frame.

use bytemuck::{Pod, Zeroable};

use crate::shaders;
use crate::state::{MorphTargets, StateTexture, STATE_FORMAT};

/// Ramp-up rate of the intro animation, per second of wall-clock time.
/// Saturation after four seconds.
const RAMP_RATE: f32 = 0.25;

/// Monotone 0 to 1 fade-in applied to the simulation blend rate.
///
/// Prevents particles from snapping onto their targets on the first frames.
/// Never decreases, never exceeds 1.
#[derive(Debug, Clone, Copy)]
pub struct IntroRamp {
    value: f32,
}

impl IntroRamp {
    pub fn new() -> Self {
        Self { value: 0.0 }
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn advance(&mut self, dt: f32) -> f32 {
        debug_assert!(dt.is_finite() && dt >= 0.0, "negative or non-finite dt");
        self.value = (self.value + dt * RAMP_RATE).min(1.0);
        self.value
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }
}

impl Default for IntroRamp {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame uniform snapshot consumed by the simulation kernel.
///
/// Written once at the top of each update; every pass in the frame sees the
/// same values, so a host mutating parameters mid-frame cannot tear.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct SimUniforms {
    pub speed: f32,
    pub morph: f32,
    pub motion: f32,
    pub curl_size: f32,
    pub motion_amplitude: f32,
    pub intro: f32,
    pub time: f32,
    pub _pad: f32,
}

/// Pipelines and bindings for simulating and seeding the state pair.
pub struct SimulationPass {
    pipeline: wgpu::RenderPipeline,
    copy_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    /// Indexed by the pair's front index; entry `i` binds the texture that
    /// is the back buffer while `i` is front.
    bind_groups: [wgpu::BindGroup; 2],
    /// Copy-pass input fixed to morph target A (the starting shape).
    seed_bind_group: wgpu::BindGroup,
}

impl SimulationPass {
    pub fn new(
        device: &wgpu::Device,
        state_a: &StateTexture,
        state_b: &StateTexture,
        morphs: &MorphTargets,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Simulation Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::simulation_wgsl().into()),
        });

        let copy_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Copy Shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::COPY_WGSL.into()),
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Simulation Uniform Buffer"),
            size: std::mem::size_of::<SimUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let state_texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Simulation Bind Group Layout"),
            entries: &[
                state_texture_entry(0),
                state_texture_entry(1),
                state_texture_entry(2),
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        // One bind group per pair orientation. Entry i reads the texture
        // that plays the back role while texture i is front.
        let make_bind_group = |label: &str, back: &StateTexture| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&back.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(&morphs.a_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(&morphs.b_view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 3,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                ],
            })
        };

        let bind_groups = [
            make_bind_group("Simulation Bind Group (read B)", state_b),
            make_bind_group("Simulation Bind Group (read A)", state_a),
        ];

        let copy_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Copy Bind Group Layout"),
                entries: &[state_texture_entry(0)],
            });

        let seed_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Seed Bind Group"),
            layout: &copy_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&morphs.a_view),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Simulation Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let copy_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Copy Pipeline Layout"),
            bind_group_layouts: &[&copy_bind_group_layout],
            push_constant_ranges: &[],
        });

        let make_pipeline = |label: &str, layout, module: &wgpu::ShaderModule| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_main"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: STATE_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };

        let pipeline = make_pipeline("Simulation Pipeline", &pipeline_layout, &shader);
        let copy_pipeline = make_pipeline("Copy Pipeline", &copy_pipeline_layout, &copy_shader);

        Self {
            pipeline,
            copy_pipeline,
            uniform_buffer,
            bind_groups,
            seed_bind_group,
        }
    }

    /// Upload this frame's parameter snapshot.
    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &SimUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Seed both state textures with morph target A.
    ///
    /// Runs the copy pipeline as a real render pass so the seed path goes
    /// through exactly the same attachment state as steady-state simulation.
    pub fn encode_seed(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        state_a: &StateTexture,
        state_b: &StateTexture,
    ) {
        for state in [state_a, state_b] {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Seed Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &state.view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.copy_pipeline);
            pass.set_bind_group(0, &self.seed_bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
    }

    /// Encode one simulation tick into the current front texture.
    ///
    /// `front_index` selects the pre-built bind group that reads the back
    /// texture of the current orientation. Uniforms must already be written
    /// for this frame.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        front: &StateTexture,
        front_index: usize,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Simulation Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &front.view,
                resolve_target: None,
                depth_slice: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_groups[front_index], &[]);
        pass.draw(0..3, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_monotone_and_saturating() {
        let mut ramp = IntroRamp::new();
        let mut last = 0.0;
        for _ in 0..600 {
            let v = ramp.advance(0.016);
            assert!(v >= last);
            assert!(v <= 1.0);
            last = v;
        }
        assert_eq!(ramp.value(), 1.0);
    }

    #[test]
    fn test_ramp_rate_matches_wall_clock() {
        let mut ramp = IntroRamp::new();
        ramp.advance(2.0);
        assert!((ramp.value() - 0.5).abs() < 1e-6);
        ramp.advance(10.0);
        assert_eq!(ramp.value(), 1.0);
    }
}
