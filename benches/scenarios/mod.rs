//! Whole-graph benchmarks.

mod voice;

pub use voice::bench_voice;
