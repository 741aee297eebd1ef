//! # morphcloud
//!
//! A GPU-driven morphing particle cloud: positions live in floating-point
//! textures, a fragment-shader pass advances them every frame through a
//! ping-pong render-target pair, and the particles are drawn as
//! shadow-casting point sprites whose positions are resolved on the GPU.
//!
//! ## Quick start
//!
//! ```ignore
//! use morphcloud::{GpuContext, MorphCloud, ShapeDistribution};
//!
//! let cloud = MorphCloud::builder()
//!     .with_state_size(300, 300) // 90_000 particles
//!     .with_shape_a(ShapeDistribution::CubeVolume { size: 200.0 })
//!     .with_shape_b(ShapeDistribution::DualSphere { outer: 50.0, inner: 20.0 })
//!     .build(&ctx, surface_format)?;
//!
//! // each frame, in order:
//! cloud.update(&ctx.queue, &mut encoder, dt);      // swap + simulate
//! cloud.encode_shadow_pass(&mut encoder);          // light-space distances
//! cloud.draw(&mut render_pass);                    // composite
//! ```
//!
//! ## How it works
//!
//! Every particle owns one texel of an `Rgba32Float` state texture (xyz =
//! position, w = per-particle scalar). Two such textures alternate front and
//! back roles each frame, so the simulation pass reads last frame's output
//! while writing this frame's, and reads and writes never alias. The blend
//! target is a mix of two immutable morph-target shapes, optionally
//! perturbed by a divergence-free curl-noise offset, faded in by a monotone
//! intro ramp.
//!
//! The draw passes receive only a texel address per particle; world
//! positions are looked up in the vertex stage with `textureLoad`. A second
//! pass re-draws the set from the light's point of view into a distance map,
//! which both the particles and any scene geometry use as their shadow term.

pub mod cloud;
pub mod error;
pub mod gpu;
pub mod render;
pub mod shaders;
pub mod simulate;
pub mod spawn;
pub mod state;
pub mod time;
pub mod window;

pub use cloud::{CloudParams, MorphCloud, MorphCloudBuilder};
pub use error::{GpuError, InitError};
pub use glam::{Vec2, Vec3, Vec4};
pub use gpu::{Camera, GpuContext};
pub use render::{ShadowConfig, SpriteStyle};
pub use simulate::IntroRamp;
pub use spawn::ShapeDistribution;
pub use state::PingPong;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::cloud::{CloudParams, MorphCloud, MorphCloudBuilder};
    pub use crate::error::{GpuError, InitError};
    pub use crate::gpu::{Camera, GpuContext};
    pub use crate::render::{ShadowConfig, SpriteStyle};
    pub use crate::spawn::ShapeDistribution;
    pub use crate::time::Time;
    pub use crate::{Vec2, Vec3, Vec4};
}
