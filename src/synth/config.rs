#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::envelope::{FACTOR_HARD, NOMINAL_LEVEL};
use crate::SAMPLE_RATE;

pub use crate::dsp::oscillator::Waveform;

/// Initial settings for a [`Voice`](crate::Voice).
///
/// Every field except the waveforms and the delay length can be changed
/// later through the voice's setters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", serde(default))]
pub struct VoiceConfig {
    pub waveform1: Waveform,
    pub waveform2: Waveform,
    pub frequency1: f32,
    pub frequency2: f32,
    /// Envelope level in [0, 1], relative to the nominal level.
    pub gain: f32,
    pub envelope_factor: f32,
    pub cutoff_hz: f32,
    pub resonance: f32,
    /// Delay line length in samples.
    pub delay_samples: usize,
    pub wet: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            waveform1: Waveform::Saw,
            waveform2: Waveform::Square,
            frequency1: 100.0,
            frequency2: 100.0,
            gain: 1.0,
            envelope_factor: FACTOR_HARD,
            cutoff_hz: 1_000.0,
            resonance: 0.6,
            delay_samples: SAMPLE_RATE as usize / 4,
            wet: 0.3,
        }
    }
}

impl VoiceConfig {
    pub fn with_waveforms(mut self, first: Waveform, second: Waveform) -> Self {
        self.waveform1 = first;
        self.waveform2 = second;
        self
    }

    pub fn with_frequencies(mut self, first_hz: f32, second_hz: f32) -> Self {
        self.frequency1 = first_hz;
        self.frequency2 = second_hz;
        self
    }

    pub fn with_gain(mut self, gain: f32) -> Self {
        self.gain = gain;
        self
    }

    pub fn with_envelope_factor(mut self, factor: f32) -> Self {
        self.envelope_factor = factor;
        self
    }

    pub fn with_filter(mut self, cutoff_hz: f32, resonance: f32) -> Self {
        self.cutoff_hz = cutoff_hz;
        self.resonance = resonance;
        self
    }

    pub fn with_delay(mut self, samples: usize, wet: f32) -> Self {
        self.delay_samples = samples;
        self.wet = wet;
        self
    }

    /// Peak envelope level this config asks for.
    pub fn level(&self) -> f32 {
        self.gain.clamp(0.0, 1.0) * NOMINAL_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_patch() {
        let config = VoiceConfig::default();
        assert_eq!(config.waveform1, Waveform::Saw);
        assert_eq!(config.waveform2, Waveform::Square);
        assert_eq!(config.frequency1, 100.0);
        assert_eq!(config.envelope_factor, FACTOR_HARD);
        assert_eq!(config.delay_samples, 5_512);
        assert_eq!(config.level(), NOMINAL_LEVEL);
    }

    #[test]
    fn builders_override_fields() {
        let config = VoiceConfig::default()
            .with_waveforms(Waveform::Sine, Waveform::Pulse { duty: 0.25 })
            .with_filter(800.0, 0.2)
            .with_delay(100, 0.5)
            .with_gain(0.5);
        assert_eq!(config.waveform2, Waveform::Pulse { duty: 0.25 });
        assert_eq!(config.cutoff_hz, 800.0);
        assert_eq!(config.delay_samples, 100);
        assert_eq!(config.level(), 0.5 * NOMINAL_LEVEL);
    }
}
