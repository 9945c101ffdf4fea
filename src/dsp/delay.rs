use crate::SILENCE_THRESHOLD;

/*
Feedback Delay
==============

A circular buffer as long as the echo time. Every sample reads the value
written one full lap ago, mixes it against the dry input, and writes the
result back so each echo feeds the next:

    out          = dry * in - wet * line[pos]
    line[pos]    = out
    pos          = (pos + 1) % len

with dry = 1 - wet. The minus sign flips the polarity of each echo, so a
single impulse comes back as -wet, +wet^2, -wet^3 ... one lap apart.

The line also remembers the loudest value written during the current lap
and the previous one. Once both fall below the silence threshold the tail
has died out and the delay can report silence.
*/

pub struct DelayLine {
    line: Vec<f32>,
    pos: usize,
    wet: f32,
    lap_peak: f32,
    last_lap_peak: f32,
}

impl DelayLine {
    /// `length` is the echo time in samples (at least one).
    pub fn new(length: usize, wet: f32) -> Self {
        Self {
            line: vec![0.0; length.max(1)],
            pos: 0,
            wet: clamp_wet(wet),
            lap_peak: 0.0,
            last_lap_peak: 0.0,
        }
    }

    pub fn set_wet(&mut self, wet: f32) {
        self.wet = clamp_wet(wet);
    }

    pub fn wet(&self) -> f32 {
        self.wet
    }

    pub fn len(&self) -> usize {
        self.line.len()
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_empty()
    }

    #[inline]
    pub fn next_sample(&mut self, input: f32) -> f32 {
        let out = (1.0 - self.wet) * input - self.wet * self.line[self.pos];
        self.line[self.pos] = out;
        self.lap_peak = self.lap_peak.max(out.abs());

        self.pos += 1;
        if self.pos == self.line.len() {
            self.pos = 0;
            self.last_lap_peak = self.lap_peak;
            self.lap_peak = 0.0;
        }
        out
    }

    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    /// True while echoes written in the last lap are still audible.
    pub fn is_ringing(&self) -> bool {
        self.lap_peak.max(self.last_lap_peak) >= SILENCE_THRESHOLD
    }

    pub fn reset(&mut self) {
        self.line.fill(0.0);
        self.pos = 0;
        self.lap_peak = 0.0;
        self.last_lap_peak = 0.0;
    }
}

fn clamp_wet(wet: f32) -> f32 {
    if wet.is_nan() {
        return 0.0;
    }
    wet.clamp(0.0, 1.0)
}
