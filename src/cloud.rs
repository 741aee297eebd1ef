//! The morphing particle cloud: public API over the state textures, the
//! simulation pass and the draw passes.
//!
//! Per-frame protocol (strictly ordered, single-threaded):
//!
//! 1. [`MorphCloud::update`]: swap the state pair, snapshot parameters,
//!    encode the simulation pass into the new front texture.
//! 2. [`MorphCloud::encode_shadow_pass`]: render the particle set into the
//!    light-space distance map.
//! 3. [`MorphCloud::draw`]: draw the particles into the host's render pass.
//!
//! Both draw passes read the texture written in step 1.

use glam::{Mat4, Vec3};

use crate::error::InitError;
use crate::gpu::GpuContext;
use crate::render::{ParticleRenderer, ShadowConfig, SpriteStyle};
use crate::simulate::{IntroRamp, SimUniforms, SimulationPass};
use crate::spawn::ShapeDistribution;
use crate::state::{MorphTargets, PingPong, StateTexture, STATE_FORMAT};

/// Live simulation parameters.
///
/// A host may mutate these at any time (for example from a UI); each
/// [`MorphCloud::update`] reads them exactly once into a uniform snapshot,
/// so all passes within a frame agree. Out-of-range `morph` and `motion`
/// values are clamped in the kernel, never an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudParams {
    /// Per-tick blend rate toward the target shape.
    pub speed: f32,
    /// Blend factor between morph target A (0) and B (1).
    pub morph: f32,
    /// Strength of the curl-noise motion offset.
    pub motion: f32,
}

impl Default for CloudParams {
    fn default() -> Self {
        Self {
            speed: 0.1,
            morph: 1.0,
            motion: 0.0,
        }
    }
}

/// Builder for [`MorphCloud`]. Use method chaining, then [`build`](Self::build).
pub struct MorphCloudBuilder {
    width: u32,
    height: u32,
    shape_a: ShapeDistribution,
    shape_b: ShapeDistribution,
    curl_size: f32,
    motion_amplitude: f32,
    style: SpriteStyle,
    shadow: ShadowConfig,
}

impl MorphCloudBuilder {
    fn new() -> Self {
        Self {
            width: 300,
            height: 300,
            shape_a: ShapeDistribution::CubeVolume { size: 200.0 },
            shape_b: ShapeDistribution::DualSphere { outer: 50.0, inner: 20.0 },
            curl_size: 0.005,
            motion_amplitude: 10.0,
            style: SpriteStyle::default(),
            shadow: ShadowConfig::default(),
        }
    }

    /// Set the state texture footprint. Particle count = `width * height`.
    pub fn with_state_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set morph target A (also the starting distribution).
    pub fn with_shape_a(mut self, shape: ShapeDistribution) -> Self {
        self.shape_a = shape;
        self
    }

    /// Set morph target B.
    pub fn with_shape_b(mut self, shape: ShapeDistribution) -> Self {
        self.shape_b = shape;
        self
    }

    /// Spatial frequency of the curl-noise field.
    pub fn with_curl_size(mut self, curl_size: f32) -> Self {
        self.curl_size = curl_size;
        self
    }

    /// World-space amplitude of the motion offset at `motion = 1`.
    pub fn with_motion_amplitude(mut self, amplitude: f32) -> Self {
        self.motion_amplitude = amplitude;
        self
    }

    /// Sprite appearance.
    pub fn with_style(mut self, style: SpriteStyle) -> Self {
        self.style = style;
        self
    }

    /// Shadow-casting light configuration.
    pub fn with_shadow(mut self, shadow: ShadowConfig) -> Self {
        self.shadow = shadow;
        self
    }

    /// Allocate all GPU resources, seed the starting distribution and return
    /// a ready cloud.
    ///
    /// Fails if the adapter cannot render into floating-point textures or if
    /// the requested footprint is empty; no partial state is retained.
    pub fn build(
        self,
        ctx: &GpuContext,
        surface_format: wgpu::TextureFormat,
    ) -> Result<MorphCloud, InitError> {
        if self.width == 0 || self.height == 0 {
            return Err(InitError::EmptyStateTexture);
        }
        if !ctx.supports_render_target(STATE_FORMAT) {
            return Err(InitError::FloatTargetUnsupported);
        }

        let amount = self.width * self.height;
        tracing::info!(
            width = self.width,
            height = self.height,
            particles = amount,
            "building morph cloud"
        );

        let data_a = self.shape_a.fill(amount);
        let data_b = self.shape_b.fill(amount);
        let morphs = MorphTargets::new(
            &ctx.device,
            &ctx.queue,
            self.width,
            self.height,
            &data_a,
            &data_b,
        );

        let state_a = StateTexture::new(&ctx.device, "State Texture A", self.width, self.height);
        let state_b = StateTexture::new(&ctx.device, "State Texture B", self.width, self.height);

        let sim = SimulationPass::new(&ctx.device, &state_a, &state_b, &morphs);
        let renderer = ParticleRenderer::new(
            &ctx.device,
            &ctx.queue,
            &state_a,
            &state_b,
            self.width,
            self.height,
            surface_format,
            self.style,
            self.shadow,
        );

        // The first simulation tick must read a valid copy of the starting
        // distribution, so seed both textures before steady state.
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Seed Encoder"),
            });
        sim.encode_seed(&mut encoder, &state_a, &state_b);
        ctx.queue.submit(std::iter::once(encoder.finish()));

        Ok(MorphCloud {
            params: CloudParams::default(),
            curl_size: self.curl_size,
            motion_amplitude: self.motion_amplitude,
            state: PingPong::new(state_a, state_b),
            _morphs: morphs,
            sim,
            renderer,
            ramp: IntroRamp::new(),
            elapsed: 0.0,
            amount,
        })
    }
}

/// A GPU-simulated, shadow-casting particle cloud morphing between two
/// procedural shapes.
pub struct MorphCloud {
    params: CloudParams,
    curl_size: f32,
    motion_amplitude: f32,
    state: PingPong<StateTexture>,
    // Read by pre-built bind groups; kept alive for the cloud's lifetime.
    _morphs: MorphTargets,
    sim: SimulationPass,
    renderer: ParticleRenderer,
    ramp: IntroRamp,
    elapsed: f32,
    amount: u32,
}

impl MorphCloud {
    /// Start configuring a cloud.
    pub fn builder() -> MorphCloudBuilder {
        MorphCloudBuilder::new()
    }

    /// Number of simulated particles.
    pub fn particle_count(&self) -> u32 {
        self.amount
    }

    /// The live parameter surface.
    pub fn params(&mut self) -> &mut CloudParams {
        &mut self.params
    }

    /// Current parameter values.
    pub fn current_params(&self) -> CloudParams {
        self.params
    }

    /// Advance the simulation by one tick.
    ///
    /// Must be called exactly once per rendered frame, after any parameter
    /// changes for that frame. Swaps the state pair, advances the intro ramp
    /// by `dt` seconds of wall-clock time, snapshots the parameters and
    /// encodes the simulation pass.
    pub fn update(&mut self, queue: &wgpu::Queue, encoder: &mut wgpu::CommandEncoder, dt: f32) {
        debug_assert!(dt.is_finite() && dt >= 0.0, "update called with invalid dt");

        self.state.swap();
        let intro = self.ramp.advance(dt);
        self.elapsed += dt;

        let snapshot = self.params;
        self.sim.write_uniforms(
            queue,
            &SimUniforms {
                speed: snapshot.speed,
                morph: snapshot.morph,
                motion: snapshot.motion,
                curl_size: self.curl_size,
                motion_amplitude: self.motion_amplitude,
                intro,
                time: self.elapsed,
                _pad: 0.0,
            },
        );

        self.sim
            .encode(encoder, self.state.front(), self.state.front_index());
    }

    /// Upload this frame's camera matrix.
    pub fn update_view(&self, queue: &wgpu::Queue, view_proj: Mat4) {
        self.renderer.update_view(queue, view_proj);
    }

    /// Render the particle set into the light-space distance map.
    ///
    /// Reads the same front texture as [`draw`](Self::draw) for this frame.
    pub fn encode_shadow_pass(&self, encoder: &mut wgpu::CommandEncoder) {
        self.renderer
            .encode_shadow_pass(encoder, self.state.front_index());
    }

    /// Draw the particles into the host's render pass. The pass must have a
    /// [`crate::render::DEPTH_FORMAT`] depth attachment.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.renderer.draw(pass, self.state.front_index());
    }

    /// The shadow map, for scene geometry that receives particle shadows.
    pub fn shadow_map_view(&self) -> &wgpu::TextureView {
        self.renderer.shadow_map_view()
    }

    pub fn shadow_config(&self) -> &ShadowConfig {
        self.renderer.shadow_config()
    }

    /// Light position driving both shading and shadows.
    pub fn light_position(&self) -> Vec3 {
        self.renderer.shadow_config().light_position
    }
}
