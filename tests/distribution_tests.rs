//! Integration tests for the texture state encoder.
//!
//! Every particle maps 1:1 to a texel; the distributions must respect exact
//! count sizing, surface radii and the dual-sphere half split.

use morphcloud::spawn::texel_addresses;
use morphcloud::{ShapeDistribution, Vec3};

fn positions(data: &[f32]) -> Vec<Vec3> {
    data.chunks_exact(4)
        .map(|t| Vec3::new(t[0], t[1], t[2]))
        .collect()
}

// ============================================================================
// Particle count / texel address invariants
// ============================================================================

#[test]
fn test_particle_count_matches_footprint() {
    for (w, h) in [(1, 1), (10, 10), (300, 300), (64, 16)] {
        let addresses = texel_addresses(w, h);
        assert_eq!(addresses.len() as u32, w * h);
    }
}

#[test]
fn test_texel_addresses_unique_and_stable() {
    let first = texel_addresses(50, 40);
    let second = texel_addresses(50, 40);
    // Stable: the mapping is a pure function of the footprint.
    assert_eq!(first, second);

    let mut seen = std::collections::HashSet::new();
    for a in &first {
        assert!(a[0] < 50 && a[1] < 40, "address out of bounds: {:?}", a);
        assert!(seen.insert(*a), "duplicate texel address: {:?}", a);
    }
}

#[test]
fn test_fill_produces_one_texel_per_particle() {
    for count in [1u32, 100, 4096] {
        let data = ShapeDistribution::SphereSurface { radius: 50.0 }.fill(count);
        assert_eq!(data.len() as u32, count * 4);
    }
}

// ============================================================================
// Distribution shape properties
// ============================================================================

#[test]
fn test_surface_fill_distance() {
    let radius = 50.0;
    let data = ShapeDistribution::SphereSurface { radius }.fill(2000);
    for p in positions(&data) {
        let r = p.length();
        assert!(
            (r - radius).abs() < radius * 1e-4,
            "particle off surface: |p| = {r}"
        );
    }
}

#[test]
fn test_dual_surface_split() {
    let n = 1000;
    let data = ShapeDistribution::DualSphere { outer: 50.0, inner: 20.0 }.fill(n);
    let pos = positions(&data);
    for (i, p) in pos.iter().enumerate() {
        let expected = if (i as u32) < n / 2 { 50.0 } else { 20.0 };
        let r = p.length();
        assert!(
            (r - expected).abs() < expected * 1e-4,
            "particle {i}: |p| = {r}, expected {expected}"
        );
    }
}

#[test]
fn test_cube_volume_bounds_and_scalar_channel() {
    let data = ShapeDistribution::CubeVolume { size: 200.0 }.fill(2000);
    for texel in data.chunks_exact(4) {
        assert!(texel[..3].iter().all(|c| c.abs() <= 100.0));
        assert!((0.0..=1.0).contains(&texel[3]));
    }
}

#[test]
fn test_fills_are_finite() {
    let shapes = [
        ShapeDistribution::CubeVolume { size: 200.0 },
        ShapeDistribution::SphereSurface { radius: 50.0 },
        ShapeDistribution::DualSphere { outer: 50.0, inner: 20.0 },
    ];
    for shape in shapes {
        let data = shape.fill(500);
        assert!(data.iter().all(|v| v.is_finite()));
    }
}

#[test]
fn test_fills_are_not_reproducible() {
    // No fixed seed: two invocations must not produce identical clouds.
    let a = ShapeDistribution::SphereSurface { radius: 50.0 }.fill(100);
    let b = ShapeDistribution::SphereSurface { radius: 50.0 }.fill(100);
    assert_ne!(a, b);
}
