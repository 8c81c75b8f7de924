/*
Fade Envelope
=============

Every clip starts and ends with a short logarithmic ramp so playback does not
click at the edges.

  gain
   1.0 ┤      ___________________________
       │   .-'                           '-.
       │  /                                 \
       │ /                                   \
   0.0 ┼/─────────────────────────────────────\──→ sample
       0    c                          len-c   len

The ramp over the first c samples is

    gain(i) = k · ln(7 · i/c + 1),   k = (1/3) / ln 2

With this k, gain(c) = k · ln 8 = 1, so the ramp rises from 0 and meets full
volume exactly where the flat section begins. The tail mirrors the head:
gain(len-1-i) = gain(i).

c is the fade length in samples: min(len, floor(sample_rate · fade_fraction)).
When 2c > len the head and tail ramps overlap; each overlapping sample takes
the larger of the two gains, which keeps the curve symmetric. c = 0 disables
shaping.

After shaping, samples are scaled by volume · 32767, rounded, and clamped to
the i16 range.
*/

use core::f64::consts::LN_2;

use crate::PcmBuffer;

/// Scale that makes the ramp reach exactly 1 at `i = c`.
const RAMP_SCALE: f64 = (1.0 / 3.0) / LN_2;

/// Full-scale value for 16-bit output.
const FULL_SCALE: f64 = 32767.0;

/// Number of fade samples at each edge for a buffer of `len` samples.
pub fn fade_samples(len: usize, sample_rate: u32, fade_fraction: f64) -> usize {
    let wanted = (f64::from(sample_rate) * fade_fraction).floor();
    if wanted <= 0.0 {
        return 0;
    }
    len.min(wanted as usize)
}

/// Ramp gain at position `i` of a `cutoff`-sample fade.
#[inline]
pub fn ramp_gain(i: usize, cutoff: usize) -> f64 {
    RAMP_SCALE * (7.0 * (i as f64 / cutoff as f64) + 1.0).ln()
}

/// Gain applied to sample `i` of a `len`-sample buffer with `cutoff` fade samples.
#[inline]
pub fn envelope_gain(i: usize, len: usize, cutoff: usize) -> f64 {
    if cutoff == 0 {
        return 1.0;
    }
    let from_end = len - 1 - i;
    match (i < cutoff, from_end < cutoff) {
        (true, true) => ramp_gain(i, cutoff).max(ramp_gain(from_end, cutoff)),
        (true, false) => ramp_gain(i, cutoff),
        (false, true) => ramp_gain(from_end, cutoff),
        (false, false) => 1.0,
    }
}

/// The full gain curve for a `len`-sample buffer.
pub fn envelope_curve(len: usize, cutoff: usize) -> Vec<f64> {
    (0..len).map(|i| envelope_gain(i, len, cutoff)).collect()
}

/// Shape normalized samples and quantize them to 16-bit PCM.
///
/// # Example
///
/// ```rust
/// use tonal_synth::{apply_envelope, synthesize_raw};
///
/// let raw = synthesize_raw(440.0, 0.5, 8000, None, 1.0).unwrap();
/// let pcm = apply_envelope(&raw, 8000, 0.2, 0.01);
/// assert_eq!(pcm.len(), 4000);
/// assert_eq!(pcm.samples()[0], 0);
/// ```
pub fn apply_envelope(samples: &[f64], sample_rate: u32, volume: f64, fade_fraction: f64) -> PcmBuffer {
    let len = samples.len();
    let cutoff = fade_samples(len, sample_rate, fade_fraction);
    let pcm = samples
        .iter()
        .enumerate()
        .map(|(i, &s)| quantize(s * volume * envelope_gain(i, len, cutoff)))
        .collect();
    PcmBuffer::from_samples(pcm, sample_rate)
}

#[inline]
fn quantize(x: f64) -> i16 {
    (x * FULL_SCALE)
        .round()
        .clamp(f64::from(i16::MIN), f64::from(i16::MAX)) as i16
}
