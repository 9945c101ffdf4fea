//! Benchmarks for the ladder low-pass filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use spaceage::dsp::filter::LadderFilter;

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        let mut filter = LadderFilter::new(1_000.0, 0.6);
        group.bench_with_input(BenchmarkId::new("lowpass", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        // Near self-oscillation the soft clip does real work
        let mut filter = LadderFilter::new(2_000.0, 1.0);
        group.bench_with_input(BenchmarkId::new("resonant", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });

        // Coefficients are recomputed on every cutoff change
        let mut filter = LadderFilter::new(1_000.0, 0.6);
        let mut cutoff = 500.0f32;
        group.bench_with_input(BenchmarkId::new("swept", size), &size, |b, _| {
            b.iter(|| {
                cutoff = if cutoff > 5_000.0 { 500.0 } else { cutoff * 1.01 };
                filter.set_cutoff(black_box(cutoff));
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
