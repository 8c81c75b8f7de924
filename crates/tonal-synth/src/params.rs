//! Synthesis parameters: the complete description of one rendered clip.

use std::fmt;

use crate::{Error, ModulationSpec, Pitch, Result};

/// Default playback sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 8000;
/// Default output volume (0-1).
pub const DEFAULT_VOLUME: f64 = 0.2;
/// Default fraction of a second used for the fade-in/fade-out ramps.
pub const DEFAULT_FADE_FRACTION: f64 = 0.01;
/// Default modulation strength.
pub const DEFAULT_MODULATION_STRENGTH: f64 = 1.0;

/// Everything needed to render a PCM buffer.
///
/// Two equal parameter sets always render byte-identical buffers, which is
/// what lets [`SynthesisCache`](crate::SynthesisCache) key on them. Equality
/// for caching is bit-exact on every float field (see [`CacheKey`]).
///
/// # Example
///
/// ```rust
/// use tonal_synth::SynthesisParams;
///
/// let params = SynthesisParams::for_note("E4", 0.5)
///     .unwrap()
///     .with_volume(0.5)
///     .with_modulation(Some(1.0));
/// assert!(params.validate().is_ok());
/// assert_eq!(params.sample_count(), 4000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    /// Tone frequency in Hz (> 0).
    pub frequency_hz: f64,
    /// Clip length in seconds (> 0).
    pub duration_secs: f64,
    /// Output volume in [0, 1].
    pub volume: f64,
    /// Sample rate in Hz (> 0).
    pub sample_rate: u32,
    /// Resolved instrument frequency, `None` for a plain sine.
    pub modulation: Option<f64>,
    /// Modulation index applied to the secondary sine.
    pub modulation_strength: f64,
    /// Fade ramp length as a fraction of one second, in [0, 1).
    pub fade_fraction: f64,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            frequency_hz: 440.0,
            duration_secs: 1.0,
            volume: DEFAULT_VOLUME,
            sample_rate: DEFAULT_SAMPLE_RATE,
            modulation: None,
            modulation_strength: DEFAULT_MODULATION_STRENGTH,
            fade_fraction: DEFAULT_FADE_FRACTION,
        }
    }
}

impl SynthesisParams {
    /// Parameters for a plain tone with default volume, rate and fade.
    pub fn new(frequency_hz: f64, duration_secs: f64) -> Self {
        Self {
            frequency_hz,
            duration_secs,
            ..Self::default()
        }
    }

    /// Parameters for a pitch given in Hz or as a note name.
    pub fn for_pitch(pitch: impl Into<Pitch>, duration_secs: f64) -> Result<Self> {
        Ok(Self::new(pitch.into().resolve()?, duration_secs))
    }

    /// Parameters for a named note.
    pub fn for_note(name: &str, duration_secs: f64) -> Result<Self> {
        Self::for_pitch(name, duration_secs)
    }

    /// Set the volume.
    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Set the sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set an already-resolved instrument frequency.
    pub fn with_modulation(mut self, modulation: Option<f64>) -> Self {
        self.modulation = modulation;
        self
    }

    /// Resolve and set an instrument descriptor.
    pub fn with_instrument(mut self, instrument: impl Into<ModulationSpec>) -> Result<Self> {
        self.modulation = instrument.into().resolve()?;
        Ok(self)
    }

    /// Set the modulation strength.
    pub fn with_modulation_strength(mut self, strength: f64) -> Self {
        self.modulation_strength = strength;
        self
    }

    /// Set the fade fraction.
    pub fn with_fade_fraction(mut self, fade_fraction: f64) -> Self {
        self.fade_fraction = fade_fraction;
        self
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        validate_core(self.frequency_hz, self.duration_secs, self.sample_rate)?;
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(Error::invalid(
                "volume",
                format!("must be in [0, 1], got {}", self.volume),
            ));
        }
        if let Some(m) = self.modulation
            && !(m.is_finite() && m >= 0.0)
        {
            return Err(Error::invalid(
                "instrument",
                format!("must be a finite non-negative frequency, got {m}"),
            ));
        }
        if !self.modulation_strength.is_finite() {
            return Err(Error::invalid(
                "instrument_strength",
                format!("must be finite, got {}", self.modulation_strength),
            ));
        }
        if !(0.0..1.0).contains(&self.fade_fraction) {
            return Err(Error::invalid(
                "fade_fraction",
                format!("must be in [0, 1), got {}", self.fade_fraction),
            ));
        }
        Ok(())
    }

    /// Number of samples the rendered buffer holds: `floor(duration * rate)`.
    pub fn sample_count(&self) -> usize {
        sample_count(self.duration_secs, self.sample_rate)
    }

    /// Bit-exact cache key for these parameters.
    pub fn cache_key(&self) -> CacheKey {
        CacheKey {
            frequency_hz: self.frequency_hz.to_bits(),
            duration_secs: self.duration_secs.to_bits(),
            volume: self.volume.to_bits(),
            sample_rate: self.sample_rate,
            modulation: self.modulation.map(f64::to_bits),
            modulation_strength: self.modulation_strength.to_bits(),
            fade_fraction: self.fade_fraction.to_bits(),
        }
    }
}

impl fmt::Display for SynthesisParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(freq={}, s={}, v={}, rate={}, mod=",
            self.frequency_hz, self.duration_secs, self.volume, self.sample_rate
        )?;
        match self.modulation {
            Some(m) => write!(f, "{m}")?,
            None => f.write_str("none")?,
        }
        write!(
            f,
            ", k={}, fade={})",
            self.modulation_strength, self.fade_fraction
        )
    }
}

/// Hashable, bit-exact identity of a [`SynthesisParams`].
///
/// `0.0` and `-0.0` are distinct keys, as are differently-encoded NaNs
/// (which never validate anyway).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    frequency_hz: u64,
    duration_secs: u64,
    volume: u64,
    sample_rate: u32,
    modulation: Option<u64>,
    modulation_strength: u64,
    fade_fraction: u64,
}

/// Shared range checks for the raw synthesis entry points.
pub(crate) fn validate_core(frequency_hz: f64, duration_secs: f64, sample_rate: u32) -> Result<()> {
    if !(frequency_hz.is_finite() && frequency_hz > 0.0) {
        return Err(Error::invalid(
            "frequency",
            format!("must be a positive frequency, got {frequency_hz}"),
        ));
    }
    if !(duration_secs.is_finite() && duration_secs > 0.0) {
        return Err(Error::invalid(
            "duration",
            format!("must be positive, got {duration_secs}"),
        ));
    }
    if sample_rate == 0 {
        return Err(Error::invalid("sample_rate", "must be positive, got 0"));
    }
    Ok(())
}

pub(crate) fn sample_count(duration_secs: f64, sample_rate: u32) -> usize {
    (duration_secs * f64::from(sample_rate)).floor() as usize
}
