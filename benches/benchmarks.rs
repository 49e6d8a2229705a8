//! Benchmarks for streamstats algorithms
//!
//! Run with: cargo bench

// Require the algorithm families for benchmarks
#[cfg(not(all(feature = "statistics", feature = "outliers", feature = "isolation")))]
compile_error!("Benchmarks require the default features. Run: cargo bench");

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use streamstats::outliers::{
    detect_outliers, AnomalyDetector, IsolationForest, OutlierConfig, OutlierMethod,
};
use streamstats::statistics::{comprehensive_stats, StatsConfig, StreamingAggregator};

/// Deterministic noisy series with a few spikes
fn series(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let base = (i as f64 * 0.618).sin() * 10.0 + 50.0;
            if i % 97 == 0 {
                base * 8.0
            } else {
                base
            }
        })
        .collect()
}

// ============================================================================
// Streaming Aggregator Benchmarks
// ============================================================================

fn bench_aggregator(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregator");
    group.throughput(Throughput::Elements(1));

    group.bench_function("add", |b| {
        let mut agg = StreamingAggregator::new();
        let mut x = 0.0f64;
        b.iter(|| {
            agg.add(black_box(x));
            x += 0.5;
        });
    });

    group.bench_function("merge", |b| {
        let left: StreamingAggregator = series(10_000).into_iter().collect();
        let right: StreamingAggregator = series(5_000).into_iter().collect();
        b.iter(|| {
            let mut merged = left.clone();
            merged.merge(black_box(&right));
            black_box(merged.variance())
        });
    });

    let data = series(100_000);
    group.throughput(Throughput::Elements(data.len() as u64));
    group.bench_function("add_batch_100k", |b| {
        b.iter(|| {
            let mut agg = StreamingAggregator::new();
            agg.add_batch(black_box(&data));
            black_box(agg.get_stats())
        });
    });

    group.finish();
}

// ============================================================================
// Outlier Detection Benchmarks
// ============================================================================

fn bench_outliers(c: &mut Criterion) {
    let mut group = c.benchmark_group("outliers");

    for n in [100, 1_000, 10_000] {
        let data = series(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("default_methods", n), &data, |b, data| {
            let config = OutlierConfig::default();
            b.iter(|| black_box(detect_outliers(data, &config)));
        });
    }

    let data = series(1_000);
    group.bench_function("all_methods_1000", |b| {
        let config = OutlierConfig::default().with_methods(OutlierMethod::ALL);
        b.iter(|| black_box(detect_outliers(&data, &config)));
    });

    group.bench_function("isolation_forest_1000", |b| {
        let forest = IsolationForest::default();
        b.iter(|| black_box(forest.fit_predict(&data)));
    });

    group.finish();
}

// ============================================================================
// Comprehensive Statistics Benchmarks
// ============================================================================

fn bench_comprehensive(c: &mut Criterion) {
    let mut group = c.benchmark_group("comprehensive");

    for n in [100, 1_000, 5_000] {
        let data = series(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("with_tests", n), &data, |b, data| {
            let config = StatsConfig::default();
            b.iter(|| black_box(comprehensive_stats(data, &config)));
        });
    }

    let data = series(5_000);
    group.bench_function("without_tests_5000", |b| {
        let config = StatsConfig::default().with_distribution_tests(false);
        b.iter(|| black_box(comprehensive_stats(&data, &config)));
    });

    group.finish();
}

criterion_group!(benches, bench_aggregator, bench_outliers, bench_comprehensive);
criterion_main!(benches);
