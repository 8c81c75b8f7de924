//! Tonal Synth - synthesis core for the tonal sound engine
//!
//! This crate turns a pitch, duration and modulation description into a
//! mono 16-bit PCM buffer. Everything here is pure, synchronous computation;
//! playback lives in `tonal-io`.
//!
//! # Pipeline
//!
//! ```text
//! note name ──► pitch::resolve ──► SynthesisParams
//!                                      │
//!                     ┌────────────────┴───────────────┐
//!                     ▼                                ▼
//!              SynthesisCache ──(miss)──► synthesize_raw ──► apply_envelope ──► PcmBuffer
//! ```
//!
//! - [`pitch`] - the fixed note-name → Hz table and its canonical ordering
//! - [`synthesize_raw`] - peak-normalized sine or phase-modulated samples
//! - [`apply_envelope`] - logarithmic fade in/out and 16-bit quantization
//! - [`SynthesisCache`] - single-flight memoization keyed on exact parameters
//!
//! # Example
//!
//! ```rust
//! use tonal_synth::{SynthesisParams, render};
//!
//! let params = SynthesisParams::for_note("A4", 0.5)
//!     .unwrap()
//!     .with_instrument(1.0)
//!     .unwrap();
//! let pcm = render(&params).unwrap();
//! assert_eq!(pcm.len(), 4000);
//! assert_eq!(pcm.sample_rate(), 8000);
//! ```

mod cache;
mod error;
mod modulation;
mod params;
mod pcm;

/// Fade envelope shaping and quantization.
pub mod envelope;
/// Note-name frequency table.
pub mod pitch;
/// Raw waveform generation.
pub mod waveform;

pub use cache::{CacheStats, SynthesisCache};
pub use envelope::apply_envelope;
pub use error::{Error, Result};
pub use modulation::ModulationSpec;
pub use params::{
    CacheKey, DEFAULT_FADE_FRACTION, DEFAULT_MODULATION_STRENGTH, DEFAULT_SAMPLE_RATE,
    DEFAULT_VOLUME, SynthesisParams,
};
pub use pcm::PcmBuffer;
pub use pitch::{Note, Pitch};
pub use waveform::synthesize_raw;

/// Render `params` to PCM without caching.
pub fn render(params: &SynthesisParams) -> Result<PcmBuffer> {
    params.validate()?;
    Ok(render_validated(params))
}

pub(crate) fn render_validated(params: &SynthesisParams) -> PcmBuffer {
    let raw = waveform::render_params(params);
    apply_envelope(&raw, params.sample_rate, params.volume, params.fade_fraction)
}
