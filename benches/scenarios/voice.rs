//! Benchmarks for the voice graph.
//!
//! Renders through `Graph::render` exactly as the render thread does, so
//! the numbers include the pull recursion and per-node parameter sync.

use std::hint::black_box;

use criterion::Criterion;
use spaceage::{Voice, VoiceConfig, BLOCK_SIZE};

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    // === FULL CHAIN ===
    // two oscillators -> envelope -> filter -> delay, gate held open
    let voice = Voice::new(VoiceConfig::default());
    voice.trigger();
    let (mut graph, root) = voice.build_graph().expect("voice graph wires");
    let mut buffer = vec![0.0f32; BLOCK_SIZE];
    group.bench_function("render_block", |b| {
        b.iter(|| {
            buffer.fill(0.0);
            black_box(graph.render(root, black_box(&mut buffer)));
        })
    });

    // === IDLE ===
    // closed gate: the envelope cuts the pull short
    let idle = Voice::new(VoiceConfig::default());
    let (mut graph, root) = idle.build_graph().expect("voice graph wires");
    group.bench_function("idle_block", |b| {
        b.iter(|| {
            black_box(graph.render(root, black_box(&mut buffer)));
        })
    });

    // === TICK ===
    // render plus PCM conversion plus device write
    let voice = Voice::new(VoiceConfig::default());
    voice.trigger();
    let mut driver = voice.driver(BlockSink).expect("voice graph wires");
    group.bench_function("tick", |b| {
        b.iter(|| {
            let _ = black_box(driver.tick());
        })
    });

    group.finish();
}

/// Accepts blocks and throws them away.
struct BlockSink;

impl spaceage::io::AudioDevice for BlockSink {
    fn open(&mut self) -> Result<(), spaceage::EngineError> {
        Ok(())
    }

    fn write(&mut self, block: &[i16]) -> Result<(), spaceage::EngineError> {
        black_box(block);
        Ok(())
    }

    fn close(&mut self) -> Result<(), spaceage::EngineError> {
        Ok(())
    }
}
