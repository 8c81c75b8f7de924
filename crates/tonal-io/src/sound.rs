//! A single playable clip.
//!
//! A [`Sound`] owns its parameters, the buffer rendered from them, and at
//! most one live playback. Every setter re-renders synchronously, so the
//! buffer always matches the parameters once the setter returns.
//!
//! ## Transport
//!
//! ```text
//!            play()                 stop() / finished / wait_done()
//!   Idle ───────────────► Playing ─────────────────────────────────► Idle
//!    ▲                      │
//!    └──── play() again ────┘  (previous submission stopped first)
//! ```

use std::fmt;

use tonal_synth::{ModulationSpec, PcmBuffer, Pitch, SynthesisParams};

use crate::backend::{PlaybackHandle, StopToken};
use crate::{Result, SoundEngine};

/// At most one live playback for a sound or sequence.
#[derive(Debug, Default)]
pub(crate) struct Player {
    handle: Option<PlaybackHandle>,
}

impl Player {
    pub(crate) fn start(&mut self, engine: &SoundEngine, buffer: &PcmBuffer) -> Result<()> {
        self.stop();
        self.handle = Some(engine.submit(buffer)?);
        Ok(())
    }

    pub(crate) fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.stop();
        }
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.handle.as_ref().is_some_and(PlaybackHandle::is_playing)
    }

    pub(crate) fn wait_done(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.wait_done();
        }
    }

    pub(crate) fn stop_token(&self) -> Option<StopToken> {
        self.handle.as_ref().map(PlaybackHandle::stopper)
    }
}

/// Synthesis parameters, their rendered buffer, and a transport.
///
/// Cloning yields an idle copy with its own buffer. Dropping a sound stops
/// its playback.
///
/// # Example
///
/// ```rust
/// use tonal_io::{Sound, SoundEngine};
///
/// let engine = SoundEngine::simulated(100.0);
/// let mut sound = Sound::note(&engine, "A4", 0.25).unwrap();
/// assert_eq!(sound.len(), 2000);
///
/// sound.set_instrument("A3").unwrap();
/// sound.play();
/// sound.wait_done();
/// assert!(!sound.is_playing());
/// ```
pub struct Sound {
    engine: SoundEngine,
    params: SynthesisParams,
    buffer: PcmBuffer,
    player: Player,
}

impl Sound {
    /// Render `params` and wrap the result.
    pub fn new(engine: &SoundEngine, params: SynthesisParams) -> Result<Self> {
        let buffer = engine.render(&params)?;
        Ok(Self {
            engine: engine.clone(),
            params,
            buffer,
            player: Player::default(),
        })
    }

    /// A default-volume, unmodulated sound for a note name.
    pub fn note(engine: &SoundEngine, name: &str, duration_secs: f64) -> Result<Self> {
        Self::new(engine, SynthesisParams::for_note(name, duration_secs)?)
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    /// Start playback and return immediately.
    ///
    /// A sound that is already playing is stopped first. Backend failures
    /// are logged and leave the sound idle; use [`try_play`](Self::try_play)
    /// to observe them.
    pub fn play(&mut self) {
        if let Err(err) = self.try_play() {
            tracing::warn!(error = %err, params = %self.params, "playback failed");
        }
    }

    /// Start playback, reporting backend failures.
    pub fn try_play(&mut self) -> Result<()> {
        self.player.start(&self.engine, &self.buffer)
    }

    /// Stop playback. Does nothing when idle.
    pub fn stop(&mut self) {
        self.player.stop();
    }

    /// Whether audio is currently being produced.
    pub fn is_playing(&self) -> bool {
        self.player.is_playing()
    }

    /// Block until playback finishes or is stopped through a
    /// [`StopToken`]. Returns immediately when idle.
    pub fn wait_done(&mut self) {
        self.player.wait_done();
    }

    /// A token for stopping the current playback from another thread.
    pub fn stop_token(&self) -> Option<StopToken> {
        self.player.stop_token()
    }

    // -----------------------------------------------------------------------
    // Setters
    // -----------------------------------------------------------------------

    /// Change the pitch (Hz or note name).
    pub fn set_pitch(&mut self, pitch: impl Into<Pitch>) -> Result<()> {
        let frequency_hz = pitch.into().resolve()?;
        self.update(SynthesisParams {
            frequency_hz,
            ..self.params
        })
    }

    /// Change the volume, in `[0, 1]`.
    pub fn set_volume(&mut self, volume: f64) -> Result<()> {
        self.update(self.params.with_volume(volume))
    }

    /// Change the modulating instrument (none, Hz or note name).
    pub fn set_instrument(&mut self, instrument: impl Into<ModulationSpec>) -> Result<()> {
        let params = self.params.with_instrument(instrument)?;
        self.update(params)
    }

    /// Change the modulation strength.
    pub fn set_instrument_strength(&mut self, strength: f64) -> Result<()> {
        self.update(self.params.with_modulation_strength(strength))
    }

    /// Change the fraction of a second used for each fade ramp.
    pub fn set_fade_fraction(&mut self, fade_fraction: f64) -> Result<()> {
        self.update(self.params.with_fade_fraction(fade_fraction))
    }

    /// Change the duration and optionally the sample rate.
    pub fn set_duration(&mut self, duration_secs: f64, sample_rate: Option<u32>) -> Result<()> {
        self.update(SynthesisParams {
            duration_secs,
            sample_rate: sample_rate.unwrap_or(self.params.sample_rate),
            ..self.params
        })
    }

    /// Stop playback and re-render the buffer from the current parameters.
    pub fn rebuild(&mut self) -> Result<()> {
        self.stop();
        self.buffer = self.engine.render(&self.params)?;
        Ok(())
    }

    /// Validate and render first so a rejected change leaves the sound as it was.
    fn update(&mut self, params: SynthesisParams) -> Result<()> {
        let buffer = self.engine.render(&params)?;
        self.stop();
        self.params = params;
        self.buffer = buffer;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Current parameters.
    pub fn params(&self) -> &SynthesisParams {
        &self.params
    }

    /// Current buffer.
    pub fn buffer(&self) -> &PcmBuffer {
        &self.buffer
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Requested duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.params.duration_secs
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.params.sample_rate
    }

    /// The engine this sound renders and plays through.
    pub fn engine(&self) -> &SoundEngine {
        &self.engine
    }
}

impl Clone for Sound {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            params: self.params,
            buffer: self.buffer.clone(),
            player: Player::default(),
        }
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.params, f)
    }
}

impl fmt::Debug for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sound")
            .field("params", &self.params)
            .field("samples", &self.buffer.len())
            .field("playing", &self.is_playing())
            .finish()
    }
}
