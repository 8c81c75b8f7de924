//! Raw waveform generation.
//!
//! Produces peak-normalized `f64` samples for a plain sine or for the
//! phase-modulated "instrument" tone.
//!
//! ## Modulated tone
//!
//! With an instrument frequency `m`, tone frequency `f` and strength `k`:
//!
//! ```text
//! s[i] = cos(2π·i·m/sr + k·sin(2π·i·f/sr))
//! ```
//!
//! The instrument frequency drives the carrier phase and the tone frequency
//! drives the modulator. This is the reverse of the plain path (where `f`
//! is the audible sine) and gives the organ-like timbre existing banks were
//! rendered with, so it is kept as is.

use core::f64::consts::TAU;

use crate::params::{sample_count, validate_core};
use crate::{Error, Result, SynthesisParams};

/// Generate peak-normalized samples.
///
/// The output has `floor(duration_secs * sample_rate)` samples and its
/// largest absolute sample is exactly 1.0 (unless every sample is zero).
///
/// # Example
///
/// ```rust
/// use tonal_synth::synthesize_raw;
///
/// let samples = synthesize_raw(440.0, 1.0, 8000, None, 1.0).unwrap();
/// assert_eq!(samples.len(), 8000);
/// assert_eq!(samples[0], 0.0);
/// ```
pub fn synthesize_raw(
    frequency_hz: f64,
    duration_secs: f64,
    sample_rate: u32,
    modulation: Option<f64>,
    modulation_strength: f64,
) -> Result<Vec<f64>> {
    validate_core(frequency_hz, duration_secs, sample_rate)?;
    if let Some(m) = modulation
        && !m.is_finite()
    {
        return Err(Error::invalid("modulation", format!("must be finite, got {m}")));
    }
    if !modulation_strength.is_finite() {
        return Err(Error::invalid(
            "modulation_strength",
            format!("must be finite, got {modulation_strength}"),
        ));
    }
    Ok(render(
        frequency_hz,
        sample_count(duration_secs, sample_rate),
        sample_rate,
        modulation,
        modulation_strength,
    ))
}

/// Generate the raw samples described by `params`.
pub fn synthesize_params(params: &SynthesisParams) -> Result<Vec<f64>> {
    params.validate()?;
    Ok(render_params(params))
}

/// Render already-validated parameters.
pub(crate) fn render_params(params: &SynthesisParams) -> Vec<f64> {
    render(
        params.frequency_hz,
        params.sample_count(),
        params.sample_rate,
        params.modulation,
        params.modulation_strength,
    )
}

fn render(
    frequency_hz: f64,
    len: usize,
    sample_rate: u32,
    modulation: Option<f64>,
    modulation_strength: f64,
) -> Vec<f64> {
    let sr = f64::from(sample_rate);
    let mut samples: Vec<f64> = match modulation {
        None => (0..len)
            .map(|i| (TAU * frequency_hz * i as f64 / sr).sin())
            .collect(),
        Some(carrier_hz) => (0..len)
            .map(|i| {
                let t = i as f64;
                let carrier = TAU * t * carrier_hz / sr;
                let modulator = modulation_strength * (TAU * t * frequency_hz / sr).sin();
                (carrier + modulator).cos()
            })
            .collect(),
    };
    normalize_peak(&mut samples);
    samples
}

/// Divide every sample by the peak magnitude. All-zero input is left as is.
pub fn normalize_peak(samples: &mut [f64]) {
    let peak = samples.iter().fold(0.0f64, |acc, s| acc.max(s.abs()));
    let peak = if peak == 0.0 { 1.0 } else { peak };
    for s in samples.iter_mut() {
        *s /= peak;
    }
}
