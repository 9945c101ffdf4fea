//! A monophonic synth voice rendered by a pull-based unit-generator graph.
//!
//! Two wavetable oscillators feed an exponential envelope, then a four-pole
//! ladder low-pass filter, then a feedback delay, then the output device. A
//! dedicated render thread ticks the graph one block at a time while any
//! other thread changes pitch, cutoff, gain or the envelope gate through
//! [`Voice`].

pub mod dsp; // Signal primitives (tables, envelope, filter, delay)
pub mod error;
pub mod graph; // Pull-based render graph
pub mod io; // Output devices and sample conversion
pub mod synth; // Voice composition and render loop

pub use error::{EngineError, GraphError};
pub use synth::{
    config::{VoiceConfig, Waveform},
    voice::Voice,
};

/// Engine-wide sample rate in Hz.
pub const SAMPLE_RATE: u32 = 22_050;
/// Samples rendered and written per tick.
pub const BLOCK_SIZE: usize = 256;
/// Level below which a decaying signal counts as silent.
pub(crate) const SILENCE_THRESHOLD: f32 = 1.0e-4;
