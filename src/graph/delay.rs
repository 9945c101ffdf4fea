use std::sync::Arc;

use crate::dsp::{delay::DelayLine, param::AtomicF32};
use crate::graph::node::UGen;

/// Control-side handle to a delay's wet mix.
#[derive(Clone, Debug)]
pub struct DelayHandle {
    wet: Arc<AtomicF32>,
}

impl DelayHandle {
    pub fn new(wet: f32) -> Self {
        let handle = Self {
            wet: Arc::new(AtomicF32::new(0.0)),
        };
        handle.set_wet(wet);
        handle
    }

    /// Wet mix in [0, 1]; dry follows as 1 - wet.
    pub fn set_wet(&self, wet: f32) {
        let wet = if wet.is_nan() { 0.0 } else { wet.clamp(0.0, 1.0) };
        self.wet.store(wet);
    }

    pub fn wet(&self) -> f32 {
        self.wet.load()
    }
}

/// Feedback delay node.
///
/// With live input it echoes the buffer in place. Once upstream goes quiet
/// it keeps rendering its tail over silence until the echoes fall below the
/// silence threshold, then reports silence itself.
pub struct DelayNode {
    delay: DelayLine,
    wet: Arc<AtomicF32>,
}

impl DelayNode {
    pub fn new(length: usize, handle: &DelayHandle) -> Self {
        Self {
            delay: DelayLine::new(length, handle.wet()),
            wet: Arc::clone(&handle.wet),
        }
    }

    pub fn shared(length: usize, wet: f32) -> (Self, DelayHandle) {
        let handle = DelayHandle::new(wet);
        (Self::new(length, &handle), handle)
    }

    pub fn len(&self) -> usize {
        self.delay.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delay.is_empty()
    }
}

impl UGen for DelayNode {
    fn sync(&mut self) {
        self.delay.set_wet(self.wet.load());
    }

    fn process(&mut self, buffer: &mut [f32], inputs_rendered: bool) -> bool {
        if !inputs_rendered {
            if !self.delay.is_ringing() {
                return false;
            }
            buffer.fill(0.0);
        }
        self.delay.render(buffer);
        true
    }
}
