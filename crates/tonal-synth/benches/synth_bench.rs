//! Criterion benchmarks for tonal-synth
//!
//! Run with: cargo bench -p tonal-synth

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use tonal_synth::{SynthesisCache, SynthesisParams, apply_envelope, render, synthesize_raw};

const DURATIONS: &[f64] = &[0.1, 0.5, 2.0];

fn bench_raw(c: &mut Criterion) {
    let mut group = c.benchmark_group("synthesize_raw");

    for &secs in DURATIONS {
        group.bench_with_input(BenchmarkId::new("Sine", secs), &secs, |b, &secs| {
            b.iter(|| black_box(synthesize_raw(440.0, secs, 8000, None, 1.0)))
        });
        group.bench_with_input(BenchmarkId::new("Modulated", secs), &secs, |b, &secs| {
            b.iter(|| black_box(synthesize_raw(440.0, secs, 8000, Some(1.0), 1.0)))
        });
    }

    group.finish();
}

fn bench_envelope(c: &mut Criterion) {
    let raw = synthesize_raw(440.0, 2.0, 8000, None, 1.0).unwrap_or_default();
    c.bench_function("apply_envelope_2s", |b| {
        b.iter(|| black_box(apply_envelope(&raw, 8000, 0.2, 0.01)))
    });
}

fn bench_cache(c: &mut Criterion) {
    let params = SynthesisParams::new(440.0, 0.5);
    let cache = SynthesisCache::new();
    let _ = cache.get_or_create(&params);

    let mut group = c.benchmark_group("cache");
    group.bench_function("hit", |b| b.iter(|| black_box(cache.get_or_create(&params))));
    group.bench_function("uncached_render", |b| b.iter(|| black_box(render(&params))));
    group.finish();
}

criterion_group!(benches, bench_raw, bench_envelope, bench_cache);
criterion_main!(benches);
