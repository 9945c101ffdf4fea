//! Low-level DSP primitives used by the graph nodes.
//!
//! These components are allocation-free once constructed and know nothing
//! about threads: every setter takes `&mut self`. The graph layer wraps them
//! with the shared parameter cells that let control threads reach in.

/// Feedback delay line.
pub mod delay;
/// Exponential gate envelope.
pub mod envelope;
/// Four-pole ladder low-pass filter.
pub mod filter;
/// Wavetables and the phase-accumulating oscillator that reads them.
pub mod oscillator;
/// Lock-free scalar parameter cell.
pub mod param;

pub use envelope::{EnvelopeSettings, FACTOR_HARD, FACTOR_SOFT};
pub use filter::LadderSettings;
pub use oscillator::{Wavetable, Waveform};
pub use param::AtomicF32;
