//! Benchmarks for the per-tick indicator computation.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use quoter_core::traits::Indicator;
use quoter_core::types::Bar;
use quoter_indicators::{IndicatorConfig, IndicatorEngine, StdDev};

fn generate_window(size: usize) -> Vec<Bar> {
    (0..size)
        .map(|i| Bar::flat(i as i64 * 60_000, 100.0 + (i as f64 * 0.1).sin() * 10.0))
        .collect()
}

fn benchmark_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("IndicatorEngine");

    for size in [11, 200, 1000].iter() {
        let window = generate_window(*size);
        let engine = IndicatorEngine::new(IndicatorConfig::default()).unwrap();

        group.bench_with_input(BenchmarkId::new("compute", size), &window, |b, window| {
            b.iter(|| engine.compute(black_box(window)))
        });
    }

    group.finish();
}

fn benchmark_std_dev(c: &mut Criterion) {
    let data: Vec<f64> = generate_window(1000).iter().map(|b| b.close).collect();
    let std_dev = StdDev::new(10);

    c.bench_function("StdDev/rolling_1000", |b| {
        b.iter(|| std_dev.calculate(black_box(&data)))
    });
}

criterion_group!(benches, benchmark_engine, benchmark_std_dev);
criterion_main!(benches);
