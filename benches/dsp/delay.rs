//! Benchmarks for the feedback delay line.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use spaceage::dsp::delay::DelayLine;
use spaceage::SAMPLE_RATE;

use crate::BLOCK_SIZES;

pub fn bench_delay(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/delay");

    let lengths: &[usize] = &[
        SAMPLE_RATE as usize / 100, // 10ms
        SAMPLE_RATE as usize / 4,   // 250ms, the voice default
        SAMPLE_RATE as usize,       // 1 second
    ];

    for &size in BLOCK_SIZES {
        let input: Vec<f32> = (0..size).map(|i| (i as f32 * 0.1).sin()).collect();
        let mut buffer = input.clone();

        for &length in lengths {
            let mut delay = DelayLine::new(length, 0.3);
            let name = format!("len_{length}");
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    delay.render(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
