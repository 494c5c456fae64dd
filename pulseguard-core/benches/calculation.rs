//! Batch pipeline and per-frame path timings
//!
//! `calculate` runs once per session on the capture thread, so a 60 s
//! detailed window (1800 samples) is the case that matters.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use pulseguard_core::{
    sampler::ChannelStats, sampler::Sampler, CalculationEngine, DetectionConfig, DetectionMode,
    Sample,
};

fn pulse_window(seconds: f64) -> Vec<Sample> {
    let n = (seconds * 30.0) as usize;
    (0..n)
        .map(|i| {
            let t = i as f64 / 30.0;
            let v = 3.0 * (2.0 * std::f64::consts::PI * 1.2 * t).sin()
                + 0.3 * (2.0 * std::f64::consts::PI * 7.0 * t).sin();
            Sample { timestamp: t, raw_value: 180.0, filtered_value: v as f32 }
        })
        .collect()
}

fn benchmark_calculate(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate");
    let engine = CalculationEngine::new(DetectionConfig::default(), DetectionMode::Detailed, 1);

    for seconds in [20.0, 60.0] {
        let samples = pulse_window(seconds);
        group.bench_with_input(BenchmarkId::from_parameter(seconds as u32), &samples, |b, samples| {
            b.iter(|| black_box(engine.calculate(black_box(samples), seconds)));
        });
    }
    group.finish();
}

fn benchmark_sampler(c: &mut Criterion) {
    let config = DetectionConfig::default();
    let mut sampler = Sampler::new(&config);
    let mut t = 0.0;

    c.bench_function("sampler_ingest_stats", |b| {
        b.iter(|| {
            t += 1.0 / 30.0;
            let stats = ChannelStats { red: 180.0, green: 20.0, blue: 15.0, pixels: 1024 };
            black_box(sampler.ingest_stats(t, &stats))
        });
    });
}

criterion_group!(benches, benchmark_calculate, benchmark_sampler);
criterion_main!(benches);
