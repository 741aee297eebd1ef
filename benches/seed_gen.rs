//! Benchmarks for CPU-side state texture encoding.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use morphcloud::ShapeDistribution;

fn bench_shape_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("shape_fill");

    for &count in &[10_000u32, 90_000] {
        group.bench_with_input(BenchmarkId::new("cube_volume", count), &count, |b, &count| {
            let shape = ShapeDistribution::CubeVolume { size: 200.0 };
            b.iter(|| black_box(shape.fill(count)))
        });

        group.bench_with_input(
            BenchmarkId::new("sphere_surface", count),
            &count,
            |b, &count| {
                let shape = ShapeDistribution::SphereSurface { radius: 50.0 };
                b.iter(|| black_box(shape.fill(count)))
            },
        );

        group.bench_with_input(BenchmarkId::new("dual_sphere", count), &count, |b, &count| {
            let shape = ShapeDistribution::DualSphere { outer: 50.0, inner: 20.0 };
            b.iter(|| black_box(shape.fill(count)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_shape_fill);
criterion_main!(benches);
