//! Layout comparison benchmarks.
//!
//! Scores the same random ensemble with every representation:
//! - linked trees (descent)
//! - compact pre-order arrays (descent)
//! - flat buffer, batch widths 1 through 32

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use flatforest::builder::build_ensemble;
use flatforest::config::{BatchSize, Layout};
use flatforest::inference::{Engine, SUPPORTED_BATCH_SIZES};
use flatforest::testing::{random_features, RandomEnsemble};

const N_TREES: usize = 200;
const N_FEATURES: usize = 32;
const MAX_DEPTH: usize = 8;

fn engine(layout: Layout, batch_size: BatchSize) -> Engine {
    let records = RandomEnsemble::new(N_TREES, N_FEATURES)
        .max_depth(MAX_DEPTH)
        .generate(42);
    let ensemble = build_ensemble(&records, RandomEnsemble::max_leaves_for(MAX_DEPTH))
        .expect("generated ensemble builds");
    Engine::new(ensemble, layout, batch_size).expect("depth within range")
}

// =============================================================================
// Layout Comparison Benchmarks
// =============================================================================

fn bench_layouts(c: &mut Criterion) {
    let mut engines = vec![
        ("linked".to_string(), engine(Layout::Linked, BatchSize::default())),
        ("compact".to_string(), engine(Layout::Compact, BatchSize::default())),
    ];
    for size in SUPPORTED_BATCH_SIZES {
        let batch_size = BatchSize::try_from(size).expect("supported batch size");
        engines.push((format!("flat_v{size}"), engine(Layout::Flat, batch_size)));
    }

    let mut group = c.benchmark_group("layouts/depth8");

    for n_rows in [1_000, 10_000] {
        let matrix = random_features(n_rows, N_FEATURES, 7);
        group.throughput(Throughput::Elements(n_rows as u64));

        for (name, engine) in &engines {
            let scorer = engine.scorer().expect("routines resolve");
            group.bench_with_input(BenchmarkId::new(name.as_str(), n_rows), &matrix, |b, matrix| {
                b.iter(|| black_box(scorer.predict(black_box(matrix))))
            });
        }
    }

    group.finish();
}

/// Cost of building each representation from the record stream.
fn bench_encoding(c: &mut Criterion) {
    let records = RandomEnsemble::new(N_TREES, N_FEATURES)
        .max_depth(MAX_DEPTH)
        .generate(42);
    let max_leaves = RandomEnsemble::max_leaves_for(MAX_DEPTH);

    let mut group = c.benchmark_group("encoding/depth8");
    for layout in [Layout::Linked, Layout::Compact, Layout::Flat] {
        group.bench_function(layout.to_string(), |b| {
            b.iter(|| {
                let ensemble = build_ensemble(black_box(&records), max_leaves).expect("builds");
                black_box(Engine::new(ensemble, layout, BatchSize::default()).expect("encodes"))
            })
        });
    }
    group.finish();
}

// =============================================================================
// Criterion Configuration
// =============================================================================

criterion_group!(benches, bench_layouts, bench_encoding);

criterion_main!(benches);
