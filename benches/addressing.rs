//! Addressing Benchmarks
//!
//! Benchmarks for the voxel addressing hot paths:
//! - scalar id ↔ index ↔ coordinate conversions
//! - batched conversions, serial vs parallel backend
//! - on-the-fly gradient convolution
//!
//! Run with: `cargo bench`
//! View HTML reports in: `target/criterion/`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use jyoti_map::{BatchBackend, GradientEngine, GridSpec, Point3, VisibilityField, VoxelId};

/// Detector-sized grid used by all benches.
fn benchmark_spec() -> GridSpec {
    GridSpec::from_ranges([64, 64, 32], [(-100.0, 100.0), (-100.0, 100.0), (0.0, 50.0)]).unwrap()
}

fn benchmark_field(num_sensors: usize) -> VisibilityField {
    let spec = benchmark_spec();
    let vis: Vec<f32> = (0..spec.num_voxels() * num_sensors)
        .map(|i| (i % 97) as f32 / 97.0)
        .collect();
    VisibilityField::new(spec, vis, num_sensors).unwrap()
}

fn bench_scalar_conversions(c: &mut Criterion) {
    let spec = benchmark_spec();

    c.bench_function("voxel_to_index", |b| {
        b.iter(|| spec.voxel_to_index(black_box(54321)))
    });

    c.bench_function("voxel_to_coord", |b| {
        b.iter(|| spec.voxel_to_coord(black_box(54321)))
    });

    c.bench_function("coord_to_voxel", |b| {
        b.iter(|| spec.coord_to_voxel(black_box(Point3::new(12.5, -40.0, 33.0))))
    });
}

fn bench_batched_conversions(c: &mut Criterion) {
    let spec = benchmark_spec();
    let ids: Vec<VoxelId> = (0..spec.num_voxels()).step_by(3).collect();

    let mut group = c.benchmark_group("batched_voxels_to_coords");
    group.throughput(Throughput::Elements(ids.len() as u64));
    group.bench_function("serial", |b| {
        b.iter(|| spec.voxels_to_coords(black_box(&ids), BatchBackend::Serial))
    });
    group.bench_function("parallel", |b| {
        b.iter(|| spec.voxels_to_coords(black_box(&ids), BatchBackend::Parallel))
    });
    group.finish();
}

fn bench_gradient(c: &mut Criterion) {
    let field = benchmark_field(8);
    let engine = GradientEngine::new(&field);

    c.bench_function("gradient_on_the_fly", |b| {
        b.iter(|| engine.on_the_fly(black_box(100_000)))
    });
}

criterion_group!(
    benches,
    bench_scalar_conversions,
    bench_batched_conversions,
    bench_gradient
);
criterion_main!(benches);
