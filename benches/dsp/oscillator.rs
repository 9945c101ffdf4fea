//! Benchmarks for wavetable playback.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use spaceage::dsp::oscillator::{Wavetable, Waveform, WavetableOsc};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    let waveforms = [
        ("sine", Waveform::Sine),
        ("saw", Waveform::Saw),
        ("pulse", Waveform::Pulse { duty: 0.25 }),
    ];

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Table lookup cost does not depend on the shape; the spread here
        // should stay flat.
        for (name, waveform) in waveforms {
            let mut osc = WavetableOsc::new(Wavetable::from_waveform(waveform));
            osc.set_frequency(440.0);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.fill(0.0);
                    osc.render_add(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
