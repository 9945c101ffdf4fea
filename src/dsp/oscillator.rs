#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f32::consts::TAU;

use crate::SAMPLE_RATE;

/*
Wavetable Oscillator
====================

A wavetable holds exactly one cycle of a waveform. The oscillator walks a
phase accumulator through that cycle and reads the table at the current
phase, so any pitch can be produced from the same small table.

    phase      Position inside the cycle, always in [0, 1).
    increment  How far the phase moves per sample: frequency / sample_rate.
    table      TABLE_SIZE samples of one cycle. TABLE_SIZE is a power of two
               so wrapping an index is a single mask.

Reading Between Entries
-----------------------

The phase rarely lands exactly on an entry. We blend the two neighbours:

    scaled   = phase * TABLE_SIZE
    index    = floor(scaled)
    fraction = scaled - index
    out      = (1 - fraction) * table[index] + fraction * table[index + 1]

The second read wraps back to entry 0 at the end of the table, which keeps
the waveform continuous across the cycle boundary.

Table Shapes
------------

  Sine      sin(2 pi i / N)
  HardSine  sin(2 pi i / N) ^ exponent (odd exponents keep the sign and
            narrow the peaks, which brightens the tone)
  Square    +1 for the first half, -1 for the second
  Pulse     +1 for the first `duty * N` entries, -1 afterwards
  Saw       linear ramp from +1 down toward -1
  Silence   all zeros
*/

/// log2 of the table length.
pub const TABLE_BITS: u32 = 7;
/// Entries in one wavetable cycle.
pub const TABLE_SIZE: usize = 1 << TABLE_BITS;
const TABLE_MASK: usize = TABLE_SIZE - 1;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Waveform {
    Sine,
    HardSine { exponent: u32 },
    Square,
    Pulse { duty: f32 },
    Saw,
    Silence,
}

/// One cycle of a waveform, filled once and never modified afterwards.
#[derive(Clone)]
pub struct Wavetable {
    samples: [f32; TABLE_SIZE],
}

impl Wavetable {
    fn from_fn(f: impl Fn(usize) -> f32) -> Self {
        let mut samples = [0.0; TABLE_SIZE];
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample = f(i);
        }
        Self { samples }
    }

    pub fn sine() -> Self {
        let dt = TAU / TABLE_SIZE as f32;
        Self::from_fn(|i| (i as f32 * dt).sin())
    }

    pub fn hard_sine(exponent: u32) -> Self {
        let dt = TAU / TABLE_SIZE as f32;
        let exponent = exponent.min(i32::MAX as u32) as i32;
        Self::from_fn(|i| (i as f32 * dt).sin().powi(exponent))
    }

    pub fn square() -> Self {
        Self::from_fn(|i| if i < TABLE_SIZE / 2 { 1.0 } else { -1.0 })
    }

    /// Square wave whose high portion covers `duty` of the cycle.
    pub fn pulse(duty: f32) -> Self {
        let high = (duty.clamp(0.0, 1.0) * TABLE_SIZE as f32) as usize;
        Self::from_fn(|i| if i < high { 1.0 } else { -1.0 })
    }

    pub fn saw() -> Self {
        let dt = 2.0 / TABLE_SIZE as f32;
        Self::from_fn(|i| 1.0 - i as f32 * dt)
    }

    pub fn silence() -> Self {
        Self {
            samples: [0.0; TABLE_SIZE],
        }
    }

    pub fn from_waveform(waveform: Waveform) -> Self {
        match waveform {
            Waveform::Sine => Self::sine(),
            Waveform::HardSine { exponent } => Self::hard_sine(exponent),
            Waveform::Square => Self::square(),
            Waveform::Pulse { duty } => Self::pulse(duty),
            Waveform::Saw => Self::saw(),
            Waveform::Silence => Self::silence(),
        }
    }

    /// Linearly interpolated read at `phase` in [0, 1).
    #[inline]
    pub fn lookup(&self, phase: f32) -> f32 {
        let scaled = phase * TABLE_SIZE as f32;
        let index = scaled as usize;
        let fraction = scaled - index as f32;
        (1.0 - fraction) * self.samples[index & TABLE_MASK]
            + fraction * self.samples[(index + 1) & TABLE_MASK]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }
}

impl From<Waveform> for Wavetable {
    fn from(waveform: Waveform) -> Self {
        Self::from_waveform(waveform)
    }
}

pub struct WavetableOsc {
    table: Wavetable,
    phase: f32,
    increment: f32,
}

impl WavetableOsc {
    pub fn new(table: Wavetable) -> Self {
        Self {
            table,
            phase: 0.0,
            increment: 0.0,
        }
    }

    /// Non-finite values are ignored; the phase could never recover from them.
    pub fn set_frequency(&mut self, freq_hz: f32) {
        if freq_hz.is_finite() {
            self.increment = freq_hz / SAMPLE_RATE as f32;
        }
    }

    pub fn frequency(&self) -> f32 {
        self.increment * SAMPLE_RATE as f32
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset_phase(&mut self) {
        self.phase = 0.0;
    }

    #[inline]
    pub fn next_sample(&mut self) -> f32 {
        let out = self.table.lookup(self.phase);
        self.phase += self.increment;
        // floor() also folds negative increments back into [0, 1)
        self.phase -= self.phase.floor();
        out
    }

    /// Add one block of the waveform on top of `buffer`.
    pub fn render_add(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample += self.next_sample();
        }
    }
}
