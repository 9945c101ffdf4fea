use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::dsp::envelope::{EnvelopeSettings, ExpEnvelope};
use crate::graph::node::UGen;

/// Control-side handle to an envelope.
///
/// Gate, gain and speed travel together as one [`EnvelopeSettings`]
/// snapshot, so the render thread never sees a gate from one call paired
/// with a target from another.
#[derive(Clone)]
pub struct EnvelopeHandle {
    shared: Arc<ArcSwap<EnvelopeSettings>>,
}

impl EnvelopeHandle {
    pub fn new(settings: EnvelopeSettings) -> Self {
        Self {
            shared: Arc::new(ArcSwap::from_pointee(settings)),
        }
    }

    /// Open the gate.
    pub fn trigger(&self) {
        self.shared.rcu(|settings| (**settings).triggered());
    }

    /// Close the gate; the signal fades out at the envelope's speed.
    pub fn damp(&self) {
        self.shared.rcu(|settings| (**settings).damped());
    }

    /// Peak level for the next trigger, as a fraction of full level.
    pub fn set_gain(&self, gain: f32) {
        self.shared.rcu(|settings| (**settings).with_gain(gain));
    }

    pub fn set_factor(&self, factor: f32) {
        self.shared.rcu(|settings| (**settings).with_factor(factor));
    }

    pub fn settings(&self) -> EnvelopeSettings {
        **self.shared.load()
    }
}

/// Envelope node: gates and shapes everything upstream of it.
///
/// While closed it never pulls its inputs, so an idle voice costs one check
/// per block.
pub struct EnvNode {
    env: ExpEnvelope,
    shared: Arc<ArcSwap<EnvelopeSettings>>,
}

impl EnvNode {
    pub fn new(handle: &EnvelopeHandle) -> Self {
        Self {
            env: ExpEnvelope::with_settings(handle.settings()),
            shared: Arc::clone(&handle.shared),
        }
    }

    pub fn shared(settings: EnvelopeSettings) -> (Self, EnvelopeHandle) {
        let handle = EnvelopeHandle::new(settings);
        (Self::new(&handle), handle)
    }

    pub fn attenuation(&self) -> f32 {
        self.env.attenuation()
    }
}

impl UGen for EnvNode {
    fn sync(&mut self) {
        self.env.apply(**self.shared.load());
    }

    fn is_open(&self) -> bool {
        !self.env.is_closed()
    }

    fn process(&mut self, buffer: &mut [f32], inputs_rendered: bool) -> bool {
        if !inputs_rendered {
            return false;
        }
        self.env.apply_to(buffer);
        true
    }
}
