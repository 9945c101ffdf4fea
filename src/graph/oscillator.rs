use std::sync::Arc;

use crate::dsp::{
    oscillator::{Wavetable, Waveform, WavetableOsc},
    param::AtomicF32,
};
use crate::graph::node::UGen;

/// Control-side handle to an oscillator's frequency.
#[derive(Clone, Debug)]
pub struct OscHandle {
    frequency: Arc<AtomicF32>,
}

impl OscHandle {
    pub fn new(freq_hz: f32) -> Self {
        let freq_hz = if freq_hz.is_finite() { freq_hz } else { 0.0 };
        Self {
            frequency: Arc::new(AtomicF32::new(freq_hz)),
        }
    }

    /// Set the oscillator pitch. No clamping: out-of-band values alias.
    /// NaN and infinite values are ignored.
    pub fn set_frequency(&self, freq_hz: f32) {
        if freq_hz.is_finite() {
            self.frequency.store(freq_hz);
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency.load()
    }
}

/// Wavetable oscillator node. Adds its waveform on top of the buffer.
pub struct OscNode {
    osc: WavetableOsc,
    frequency: Arc<AtomicF32>,
}

impl OscNode {
    pub fn new(table: Wavetable, handle: &OscHandle) -> Self {
        let mut osc = WavetableOsc::new(table);
        osc.set_frequency(handle.frequency());
        Self {
            osc,
            frequency: Arc::clone(&handle.frequency),
        }
    }

    /// Build a node together with a fresh handle.
    pub fn shared(waveform: Waveform, freq_hz: f32) -> (Self, OscHandle) {
        let handle = OscHandle::new(freq_hz);
        let node = Self::new(Wavetable::from_waveform(waveform), &handle);
        (node, handle)
    }

    pub fn phase(&self) -> f32 {
        self.osc.phase()
    }
}

impl UGen for OscNode {
    fn sync(&mut self) {
        self.osc.set_frequency(self.frequency.load());
    }

    fn process(&mut self, buffer: &mut [f32], _inputs_rendered: bool) -> bool {
        self.osc.render_add(buffer);
        true
    }
}
