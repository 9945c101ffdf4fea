//! Benchmarks for the exponential gate.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use spaceage::dsp::envelope::{ExpEnvelope, FACTOR_HARD};

use crate::BLOCK_SIZES;

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let input = vec![0.5f32; size];
        let mut buffer = input.clone();

        // Gate held open: attenuation sits near its target
        let mut env = ExpEnvelope::new(FACTOR_HARD);
        env.trigger();
        group.bench_with_input(BenchmarkId::new("gated", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                env.apply_to(black_box(&mut buffer));
            })
        });

        // Alternating trigger and damp keeps the curve moving
        let mut env = ExpEnvelope::new(FACTOR_HARD);
        let mut gate = false;
        group.bench_with_input(BenchmarkId::new("toggling", size), &size, |b, _| {
            b.iter(|| {
                gate = !gate;
                if gate {
                    env.trigger();
                } else {
                    env.damp();
                }
                buffer.copy_from_slice(&input);
                env.apply_to(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
