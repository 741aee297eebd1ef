//! Procedural shape distributions for seeding particle state textures.
//!
//! Every particle owns exactly one texel of a floating-point state texture.
//! The encoders here produce the initial texel data: channels 0-2 hold a 3D
//! position, channel 3 holds a per-particle random scalar that the
//! simulation passes through untouched.
//!
//! # Example
//!
//! ```ignore
//! use morphcloud::ShapeDistribution;
//!
//! let cube = ShapeDistribution::CubeVolume { size: 200.0 };
//! let data = cube.fill(300 * 300); // 300*300 texels, 4 floats each
//! assert_eq!(data.len(), 300 * 300 * 4);
//! ```

use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Attempts at unit-ball rejection sampling before falling back to a fixed
/// axis. At 64 tries the failure probability is astronomically small; the
/// bound exists so pathological RNG output cannot hang the encoder.
const MAX_REJECTION_TRIES: u32 = 64;

/// A procedural point distribution used as a morph target shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeDistribution {
    /// Uniform fill of an axis-aligned cube volume centered at the origin.
    ///
    /// Each coordinate is sampled independently in `[-size/2, size/2]`.
    CubeVolume {
        /// Full edge length of the cube.
        size: f32,
    },
    /// Uniform fill of a sphere surface centered at the origin.
    SphereSurface {
        /// Sphere radius.
        radius: f32,
    },
    /// Two concentric sphere surfaces: the first half of the particle range
    /// lands on `outer`, the second half on `inner`.
    DualSphere {
        /// Radius for particles in the first half of the range.
        outer: f32,
        /// Radius for particles in the second half.
        inner: f32,
    },
}

impl ShapeDistribution {
    /// Produce texel data for `count` particles: `count * 4` floats,
    /// row-major, one `[x, y, z, seed]` quadruple per particle.
    ///
    /// The RNG is seeded from entropy; two invocations never produce the
    /// same cloud.
    pub fn fill(&self, count: u32) -> Vec<f32> {
        self.fill_with(&mut SmallRng::from_entropy(), count)
    }

    /// As [`fill`](Self::fill), with a caller-supplied RNG.
    pub fn fill_with(&self, rng: &mut SmallRng, count: u32) -> Vec<f32> {
        let mut data = Vec::with_capacity(count as usize * 4);
        match *self {
            ShapeDistribution::CubeVolume { size } => {
                for _ in 0..count {
                    push_texel(&mut data, cube_point(rng, size), rng.gen());
                }
            }
            ShapeDistribution::SphereSurface { radius } => {
                for _ in 0..count {
                    push_texel(&mut data, sphere_point(rng, radius), rng.gen());
                }
            }
            ShapeDistribution::DualSphere { outer, inner } => {
                let half = count / 2;
                for i in 0..count {
                    let radius = if i < half { outer } else { inner };
                    push_texel(&mut data, sphere_point(rng, radius), rng.gen());
                }
            }
        }
        data
    }
}

fn push_texel(data: &mut Vec<f32>, p: Vec3, seed: f32) {
    data.extend_from_slice(&[p.x, p.y, p.z, seed]);
}

/// Uniform point in a cube of edge `size` centered at the origin.
fn cube_point(rng: &mut SmallRng, size: f32) -> Vec3 {
    Vec3::new(
        (rng.gen::<f32>() - 0.5) * size,
        (rng.gen::<f32>() - 0.5) * size,
        (rng.gen::<f32>() - 0.5) * size,
    )
}

/// Uniform point on a sphere surface of the given radius.
///
/// Rejection-samples the unit ball, then projects onto the surface. The loop
/// is bounded; see [`MAX_REJECTION_TRIES`].
fn sphere_point(rng: &mut SmallRng, radius: f32) -> Vec3 {
    for _ in 0..MAX_REJECTION_TRIES {
        let v = Vec3::new(
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
            rng.gen::<f32>() * 2.0 - 1.0,
        );
        let len_sq = v.length_squared();
        if len_sq > 1.0 || len_sq < 1e-12 {
            continue;
        }
        return v / len_sq.sqrt() * radius;
    }
    Vec3::new(0.0, radius, 0.0)
}

/// Per-instance texel addresses for a `width * height` state texture.
///
/// Address `i` maps to texel `(i % width, i / width)`. This is the only
/// CPU-resident per-particle attribute: the vertex stage resolves the actual
/// position by loading the state texture at this address.
pub fn texel_addresses(width: u32, height: u32) -> Vec<[u32; 2]> {
    let mut addresses = Vec::with_capacity((width * height) as usize);
    for i in 0..width * height {
        addresses.push([i % width, i / width]);
    }
    addresses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rng() -> SmallRng {
        SmallRng::from_entropy()
    }

    #[test]
    fn test_fill_length() {
        let data = ShapeDistribution::CubeVolume { size: 200.0 }.fill(100);
        assert_eq!(data.len(), 400);
    }

    #[test]
    fn test_cube_volume_bounds() {
        let data = ShapeDistribution::CubeVolume { size: 200.0 }.fill_with(&mut rng(), 500);
        for texel in data.chunks_exact(4) {
            for c in &texel[..3] {
                assert!(c.abs() <= 100.0);
            }
            assert!((0.0..=1.0).contains(&texel[3]));
        }
    }

    #[test]
    fn test_sphere_surface_radius() {
        let data = ShapeDistribution::SphereSurface { radius: 50.0 }.fill_with(&mut rng(), 500);
        for texel in data.chunks_exact(4) {
            let r = Vec3::new(texel[0], texel[1], texel[2]).length();
            assert!((r - 50.0).abs() < 50.0 * 1e-4, "off-surface radius {}", r);
        }
    }

    #[test]
    fn test_dual_sphere_split() {
        let data =
            ShapeDistribution::DualSphere { outer: 50.0, inner: 20.0 }.fill_with(&mut rng(), 200);
        for (i, texel) in data.chunks_exact(4).enumerate() {
            let r = Vec3::new(texel[0], texel[1], texel[2]).length();
            let expected = if i < 100 { 50.0 } else { 20.0 };
            assert!((r - expected).abs() < expected * 1e-4);
        }
    }

    #[test]
    fn test_texel_addresses_unique() {
        let addresses = texel_addresses(30, 20);
        assert_eq!(addresses.len(), 600);
        let mut seen = std::collections::HashSet::new();
        for a in &addresses {
            assert!(a[0] < 30 && a[1] < 20);
            assert!(seen.insert(*a), "duplicate texel address {:?}", a);
        }
    }
}
