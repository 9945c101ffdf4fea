use crate::SILENCE_THRESHOLD;

/*
Exponential Gate Envelope
=========================

This envelope has no stages. It only knows whether its gate is open and
glides its attenuation toward a target on every sample:

    target      = gate ? level : 0
    attenuation += (target - attenuation) * factor

That one-pole glide gives an exponential attack while the gate is high and
an exponential release once it drops. `factor` sets how fast:

    FACTOR_HARD  0.005    ~ 200 samples time constant (percussive)
    FACTOR_SOFT  0.00005  ~ 20000 samples time constant (slow swell)

Vocabulary
----------

  gate         Note on/off. trigger() raises it, damp() lowers it.
  level        The peak the next trigger aims for: gain * NOMINAL_LEVEL.
  target       The level latched by the most recent trigger.
  attenuation  The multiplier applied to the signal right now.

A gain change only moves `level`; the running note keeps its target until
the next trigger latches the new one.

Closed means the gate is low and the attenuation has fallen below the
silence threshold. A closed envelope is a guaranteed zero, so the graph
stops pulling anything upstream of it.
*/

/// Fast time constant for percussive attacks and releases.
pub const FACTOR_HARD: f32 = 0.005;
/// Slow time constant for swells.
pub const FACTOR_SOFT: f32 = 0.00005;
/// Peak attenuation reached at full gain.
pub const NOMINAL_LEVEL: f32 = 0.25;

/// Everything a control thread may change about an envelope, as one value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvelopeSettings {
    pub gate: bool,
    pub level: f32,
    pub target: f32,
    pub factor: f32,
}

impl EnvelopeSettings {
    pub fn new(factor: f32) -> Self {
        Self {
            gate: false,
            level: NOMINAL_LEVEL,
            target: NOMINAL_LEVEL,
            factor: factor.clamp(0.0, 1.0),
        }
    }

    /// Raise the gate and latch the pending level as the target.
    pub fn triggered(self) -> Self {
        Self {
            gate: true,
            target: self.level,
            ..self
        }
    }

    pub fn damped(self) -> Self {
        Self {
            gate: false,
            ..self
        }
    }

    pub fn with_gain(self, gain: f32) -> Self {
        Self {
            level: gain.clamp(0.0, 1.0) * NOMINAL_LEVEL,
            ..self
        }
    }

    pub fn with_factor(self, factor: f32) -> Self {
        Self {
            factor: factor.clamp(0.0, 1.0),
            ..self
        }
    }
}

impl Default for EnvelopeSettings {
    fn default() -> Self {
        Self::new(FACTOR_SOFT)
    }
}

pub struct ExpEnvelope {
    settings: EnvelopeSettings,
    attenuation: f32,
}

impl ExpEnvelope {
    pub fn new(factor: f32) -> Self {
        Self::with_settings(EnvelopeSettings::new(factor))
    }

    pub fn with_settings(settings: EnvelopeSettings) -> Self {
        Self {
            settings,
            attenuation: 0.0,
        }
    }

    pub fn trigger(&mut self) {
        self.settings = self.settings.triggered();
    }

    pub fn damp(&mut self) {
        self.settings = self.settings.damped();
    }

    pub fn set_gain(&mut self, gain: f32) {
        self.settings = self.settings.with_gain(gain);
    }

    pub fn set_factor(&mut self, factor: f32) {
        self.settings = self.settings.with_factor(factor);
    }

    /// Replace all control settings at once. Attenuation carries over.
    pub fn apply(&mut self, settings: EnvelopeSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> EnvelopeSettings {
        self.settings
    }

    pub fn attenuation(&self) -> f32 {
        self.attenuation
    }

    pub fn is_closed(&self) -> bool {
        !self.settings.gate && self.attenuation < SILENCE_THRESHOLD
    }

    /// Current attenuation, then advance one sample toward the target.
    #[inline]
    pub fn next_gain(&mut self) -> f32 {
        let gain = self.attenuation;
        let target = if self.settings.gate {
            self.settings.target
        } else {
            0.0
        };
        self.attenuation += (target - self.attenuation) * self.settings.factor;
        gain
    }

    /// Scale `buffer` in place by the attenuation trajectory.
    pub fn apply_to(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample *= self.next_gain();
        }
    }

    pub fn reset(&mut self) {
        self.attenuation = 0.0;
        self.settings = self.settings.damped();
    }
}
