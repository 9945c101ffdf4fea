/// Full-scale factor between float samples and signed 16-bit PCM.
const PCM16_SCALE: f32 = 32_768.0;

/// Convert one float sample in [-1, 1] to signed 16-bit PCM.
///
/// Scales and truncates toward zero without dithering. Values past full
/// scale saturate at the `i16` limits.
#[inline]
pub fn to_pcm16(sample: f32) -> i16 {
    (PCM16_SCALE * sample) as i16
}

pub fn convert_block(source: &[f32], target: &mut [i16]) {
    for (out, &sample) in target.iter_mut().zip(source) {
        *out = to_pcm16(sample);
    }
}
