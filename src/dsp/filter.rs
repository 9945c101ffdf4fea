use std::f32::consts::SQRT_2;

use crate::SAMPLE_RATE;

/*
Four-Pole Ladder Low-Pass
=========================

A digital take on the transistor ladder found in classic analog synths:
four identical one-pole low-pass stages in series, with the last stage fed
back (inverted) into the first to create resonance.

    input ──(−)──► [stage 1] ─► [stage 2] ─► [stage 3] ─► [stage 4] ─┬─► soft clip ─► out
             ▲                                                        │
             └──────────────────────── r × ◄──────────────────────────┘

Coefficients
------------

Cutoff and resonance are mapped to three coefficients once per parameter
change, never per sample:

    f  = 2 * cutoff / sample_rate          normalised cutoff, 0..1
    p  = f * (1.8 - 0.8 * f)               stage gain (warped for tuning)
    k  = 2p - 1                            stage pole
    t  = (1 - p) * 1.386249
    t2 = 12 + t^2
    r  = resonance * (t2 + 6t) / (t2 - 6t) feedback amount

Each stage averages its current and previous input (a trapezoidal step):

    y[n] = p * (x[n] + x[n-1]) - k * y[n-1]

Saturation
----------

The last stage passes through a cubic soft clip, y - y^3 / 6, which rounds
off peaks like the saturating transistors of the real circuit. The cubic
only rises up to y = sqrt(2); past that it would turn around and feed the
resonance loop a growing value. Clamping its input to ±sqrt(2) keeps the
output within ±0.943 so the feedback loop stays bounded for every cutoff
and resonance.
*/

/// Lowest cutoff accepted by the setters.
pub const MIN_CUTOFF_HZ: f32 = 20.0;
/// Highest cutoff accepted by the setters, safely below Nyquist.
pub const MAX_CUTOFF_HZ: f32 = SAMPLE_RATE as f32 * 0.45;

const CLIP_KNEE: f32 = SQRT_2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderCoefficients {
    pub p: f32,
    pub k: f32,
    pub r: f32,
}

impl LadderCoefficients {
    pub fn compute(cutoff_hz: f32, resonance: f32) -> Self {
        let f = (cutoff_hz + cutoff_hz) / SAMPLE_RATE as f32;
        let p = f * (1.8 - 0.8 * f);
        let k = p + p - 1.0;

        let t = (1.0 - p) * 1.386249;
        let t2 = 12.0 + t * t;
        let r = resonance * (t2 + 6.0 * t) / (t2 - 6.0 * t);

        Self { p, k, r }
    }
}

/// Cutoff, resonance and the coefficients derived from them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LadderSettings {
    pub cutoff_hz: f32,
    pub resonance: f32,
    pub coefficients: LadderCoefficients,
}

impl LadderSettings {
    pub fn new(cutoff_hz: f32, resonance: f32) -> Self {
        let cutoff_hz = clamp_cutoff(cutoff_hz);
        let resonance = clamp_resonance(resonance);
        Self {
            cutoff_hz,
            resonance,
            coefficients: LadderCoefficients::compute(cutoff_hz, resonance),
        }
    }

    pub fn with_cutoff(self, cutoff_hz: f32) -> Self {
        Self::new(cutoff_hz, self.resonance)
    }

    pub fn with_resonance(self, resonance: f32) -> Self {
        Self::new(self.cutoff_hz, resonance)
    }
}

fn clamp_cutoff(cutoff_hz: f32) -> f32 {
    if cutoff_hz.is_nan() {
        return MIN_CUTOFF_HZ;
    }
    cutoff_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
}

fn clamp_resonance(resonance: f32) -> f32 {
    if resonance.is_nan() {
        return 0.0;
    }
    resonance.clamp(0.0, 1.0)
}

pub struct LadderFilter {
    settings: LadderSettings,

    x_prev: f32,
    stages: [f32; 4],
    stages_prev: [f32; 3],
}

impl LadderFilter {
    pub fn new(cutoff_hz: f32, resonance: f32) -> Self {
        Self::with_settings(LadderSettings::new(cutoff_hz, resonance))
    }

    pub fn with_settings(settings: LadderSettings) -> Self {
        Self {
            settings,
            x_prev: 0.0,
            stages: [0.0; 4],
            stages_prev: [0.0; 3],
        }
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.settings = self.settings.with_cutoff(cutoff_hz);
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.settings = self.settings.with_resonance(resonance);
    }

    pub fn apply(&mut self, settings: LadderSettings) {
        self.settings = settings;
    }

    pub fn settings(&self) -> LadderSettings {
        self.settings
    }

    #[inline]
    pub fn next_sample(&mut self, input: f32) -> f32 {
        let LadderCoefficients { p, k, r } = self.settings.coefficients;
        let [y1, y2, y3, y4] = &mut self.stages;
        let [old1, old2, old3] = self.stages_prev;

        let x = input - r * *y4;

        *y1 = x * p + self.x_prev * p - k * *y1;
        *y2 = *y1 * p + old1 * p - k * *y2;
        *y3 = *y2 * p + old2 * p - k * *y3;
        *y4 = *y3 * p + old3 * p - k * *y4;

        let clipped = (*y4).clamp(-CLIP_KNEE, CLIP_KNEE);
        *y4 = clipped - (clipped * clipped * clipped) / 6.0;

        self.x_prev = x;
        self.stages_prev = [*y1, *y2, *y3];
        *y4
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    pub fn reset(&mut self) {
        self.x_prev = 0.0;
        self.stages = [0.0; 4];
        self.stages_prev = [0.0; 3];
    }
}
