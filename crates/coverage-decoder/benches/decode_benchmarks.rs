//! Benchmarks for the CoverageJSON decode pipeline.
//!
//! Run with: cargo bench --package coverage-decoder
//! Or: cargo bench --package coverage-decoder --bench decode_benchmarks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use coverage_decoder::{CoverageJsonReader, DecoderConfig, RangeDecoder};
use test_utils::{grid_coverage, track, trajectory_collection, trajectory_member};

// =============================================================================
// DOCUMENT PARSING BENCHMARKS
// =============================================================================

fn bench_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");

    for size in [64usize, 256] {
        let json = serde_json::to_string(&grid_coverage(size, size, 4)).unwrap();
        group.throughput(Throughput::Bytes(json.len() as u64));
        group.bench_with_input(BenchmarkId::new("grid", size), &json, |b, json| {
            b.iter(|| CoverageJsonReader::from_str(black_box(json)).unwrap())
        });
    }

    group.finish();
}

// =============================================================================
// RANGE RESHAPING BENCHMARKS
// =============================================================================

fn bench_range_reshape(c: &mut Criterion) {
    let mut group = c.benchmark_group("range_reshape");

    let doc = grid_coverage(256, 256, 8);
    let range = &doc.ranges.as_ref().unwrap()["temp"];
    group.throughput(Throughput::Elements(range.values.len() as u64));
    group.bench_function("decode_grid_256x256x8", |b| {
        b.iter(|| RangeDecoder::new("temp", black_box(range)).decode_grid().unwrap())
    });

    group.finish();
}

// =============================================================================
// RASTER EXPORT BENCHMARKS
// =============================================================================

fn bench_raster_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("raster_export");
    let config = DecoderConfig::default();

    for steps in [1usize, 12] {
        let reader = CoverageJsonReader::new(grid_coverage(128, 128, steps)).unwrap();
        group.throughput(Throughput::Elements(steps as u64));
        group.bench_with_input(BenchmarkId::new("slices", steps), &reader, |b, reader| {
            b.iter(|| reader.decode(black_box(&config)))
        });
    }

    group.finish();
}

// =============================================================================
// COLLECTION BENCHMARKS
// =============================================================================

fn bench_collection(c: &mut Criterion) {
    let mut group = c.benchmark_group("collection");

    let members = (0..200)
        .map(|i| trajectory_member(track([0.0, i as f64 * 0.01], 50), i as f64))
        .collect();
    let reader = CoverageJsonReader::new(trajectory_collection(members)).unwrap();

    let merged = DecoderConfig::default();
    group.bench_function("merge_200_trajectories", |b| {
        b.iter(|| reader.decode(black_box(&merged)))
    });

    let independent = DecoderConfig {
        mergeable_domain_types: Vec::new(),
        ..Default::default()
    };
    group.bench_function("independent_parallel", |b| {
        let config = independent.clone().with_parallel(true);
        b.iter(|| reader.decode(black_box(&config)))
    });
    group.bench_function("independent_sequential", |b| {
        let config = independent.clone().with_parallel(false);
        b.iter(|| reader.decode(black_box(&config)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parsing,
    bench_range_reshape,
    bench_raster_export,
    bench_collection,
);
criterion_main!(benches);
