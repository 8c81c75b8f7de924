//! Concatenated sounds with a shared transport.
//!
//! A [`SoundSequence`] holds idle copies of its member sounds and one buffer
//! made of their buffers back to back. Appending rebuilds the whole buffer;
//! sequences are short, human-scale compositions.
//!
//! [`concat`] and [`repeat`] build new sequences from anything
//! [`Composable`]. Results are always flat: concatenating two sequences
//! yields one sequence of their members, never a sequence of sequences, so
//! `concat(concat(a, b), c)` and `concat(a, concat(b, c))` are identical.

use std::fmt;

use tonal_synth::PcmBuffer;

use crate::backend::StopToken;
use crate::sound::Player;
use crate::{Error, Result, Sound, SoundEngine};

/// Something that can be flattened into sequence members.
pub trait Composable {
    /// Sample rate every member shares.
    fn sample_rate(&self) -> u32;

    /// Engine new sequences are created on.
    fn engine(&self) -> &SoundEngine;

    /// The member sounds in playback order.
    fn members(&self) -> &[Sound];
}

impl Composable for Sound {
    fn sample_rate(&self) -> u32 {
        Sound::sample_rate(self)
    }

    fn engine(&self) -> &SoundEngine {
        Sound::engine(self)
    }

    fn members(&self) -> &[Sound] {
        std::slice::from_ref(self)
    }
}

impl Composable for SoundSequence {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn engine(&self) -> &SoundEngine {
        &self.engine
    }

    fn members(&self) -> &[Sound] {
        &self.sounds
    }
}

/// `a` followed by `b`, flattened.
///
/// # Errors
///
/// [`Error::SampleRateMismatch`] when the two sides use different rates.
///
/// # Example
///
/// ```rust
/// use tonal_io::{Sound, SoundEngine, concat, repeat};
///
/// let engine = SoundEngine::simulated(100.0);
/// let a = Sound::note(&engine, "C4", 0.25).unwrap();
/// let b = Sound::note(&engine, "E4", 0.25).unwrap();
///
/// let ab = concat(&a, &b).unwrap();
/// let abab = repeat(&ab, 2).unwrap();
/// assert_eq!(abab.sounds().len(), 4);
/// assert_eq!(abab.len(), 4 * 2000);
/// ```
pub fn concat<A, B>(a: &A, b: &B) -> Result<SoundSequence>
where
    A: Composable + ?Sized,
    B: Composable + ?Sized,
{
    if a.sample_rate() != b.sample_rate() {
        return Err(Error::SampleRateMismatch {
            expected: a.sample_rate(),
            found: b.sample_rate(),
        });
    }
    Ok(SoundSequence::assemble(
        a.engine(),
        a.sample_rate(),
        a.members().iter().chain(b.members()).cloned().collect(),
    ))
}

/// `x` played `times` times in a row. Zero times gives an empty sequence.
///
/// # Errors
///
/// [`Error::RepeatOverflow`] when the member or sample count of the result
/// overflows `usize`.
pub fn repeat<X: Composable + ?Sized>(x: &X, times: usize) -> Result<SoundSequence> {
    let members = x.members();
    if members.is_empty() || times == 0 {
        return Ok(SoundSequence::new(x.engine(), x.sample_rate()));
    }

    let overflow = || Error::RepeatOverflow {
        members: members.len(),
        times,
    };
    let count = members.len().checked_mul(times).ok_or_else(overflow)?;
    members
        .iter()
        .map(Sound::len)
        .sum::<usize>()
        .checked_mul(times)
        .ok_or_else(overflow)?;

    let mut sounds = Vec::with_capacity(count);
    for _ in 0..times {
        sounds.extend(members.iter().cloned());
    }
    Ok(SoundSequence::assemble(x.engine(), x.sample_rate(), sounds))
}

/// Sounds played back to back as one buffer.
///
/// # Example
///
/// ```rust
/// use tonal_io::{Sound, SoundEngine, SoundSequence};
///
/// let engine = SoundEngine::simulated(100.0);
/// let mut seq = SoundSequence::new(&engine, 8000);
/// seq.append(&Sound::note(&engine, "D3", 0.5).unwrap()).unwrap();
/// seq.append(&Sound::note(&engine, "A3", 0.5).unwrap()).unwrap();
/// assert_eq!(seq.duration_secs(), 1.0);
/// assert_eq!(seq.len(), 8000);
///
/// seq.play();
/// seq.wait_done();
/// ```
pub struct SoundSequence {
    engine: SoundEngine,
    sample_rate: u32,
    sounds: Vec<Sound>,
    buffer: PcmBuffer,
    player: Player,
}

impl SoundSequence {
    /// An empty sequence at `sample_rate`.
    pub fn new(engine: &SoundEngine, sample_rate: u32) -> Self {
        Self::assemble(engine, sample_rate, Vec::new())
    }

    /// A sequence of copies of `sounds`.
    ///
    /// # Errors
    ///
    /// [`Error::SampleRateMismatch`] for the first sound whose rate is not
    /// `sample_rate`.
    pub fn from_sounds<'a>(
        engine: &SoundEngine,
        sounds: impl IntoIterator<Item = &'a Sound>,
        sample_rate: u32,
    ) -> Result<Self> {
        let mut members = Vec::new();
        for sound in sounds {
            check_rate(sample_rate, sound)?;
            members.push(sound.clone());
        }
        Ok(Self::assemble(engine, sample_rate, members))
    }

    fn assemble(engine: &SoundEngine, sample_rate: u32, sounds: Vec<Sound>) -> Self {
        let buffer = concat_buffers(&sounds, sample_rate);
        Self {
            engine: engine.clone(),
            sample_rate,
            sounds,
            buffer,
            player: Player::default(),
        }
    }

    /// Add a copy of `sound` at the end and rebuild the buffer.
    ///
    /// # Errors
    ///
    /// [`Error::SampleRateMismatch`] leaves the sequence unchanged.
    pub fn append(&mut self, sound: &Sound) -> Result<()> {
        check_rate(self.sample_rate, sound)?;
        self.sounds.push(sound.clone());
        self.rebuild();
        Ok(())
    }

    /// Stop playback and recompute the concatenated buffer.
    pub fn rebuild(&mut self) {
        self.stop();
        self.buffer = concat_buffers(&self.sounds, self.sample_rate);
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    /// Start playback and return immediately. Empty sequences do nothing.
    ///
    /// Backend failures are logged and leave the sequence idle.
    pub fn play(&mut self) {
        if let Err(err) = self.try_play() {
            tracing::warn!(
                error = %err,
                sounds = self.sounds.len(),
                "sequence playback failed"
            );
        }
    }

    /// Start playback, reporting backend failures.
    pub fn try_play(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            self.stop();
            return Ok(());
        }
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

    /// Block until playback finishes or is stopped. Returns immediately when idle.
    pub fn wait_done(&mut self) {
        self.player.wait_done();
    }

    /// A token for stopping the current playback from another thread.
    pub fn stop_token(&self) -> Option<StopToken> {
        self.player.stop_token()
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Member sounds in order.
    pub fn sounds(&self) -> &[Sound] {
        &self.sounds
    }

    /// The concatenated buffer.
    pub fn buffer(&self) -> &PcmBuffer {
        &self.buffer
    }

    /// Total number of samples.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the sequence has no samples.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Sum of member durations in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.sounds.iter().map(Sound::duration_secs).sum()
    }

    /// Sample rate shared by every member.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

fn check_rate(expected: u32, sound: &Sound) -> Result<()> {
    if sound.sample_rate() == expected {
        Ok(())
    } else {
        Err(Error::SampleRateMismatch {
            expected,
            found: sound.sample_rate(),
        })
    }
}

fn concat_buffers(sounds: &[Sound], sample_rate: u32) -> PcmBuffer {
    PcmBuffer::concat(sounds.iter().map(Sound::buffer), sample_rate)
}

impl Clone for SoundSequence {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
            sample_rate: self.sample_rate,
            sounds: self.sounds.clone(),
            buffer: self.buffer.clone(),
            player: Player::default(),
        }
    }
}

impl fmt::Display for SoundSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, sound) in self.sounds.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{sound}")?;
        }
        f.write_str("]")
    }
}

impl fmt::Debug for SoundSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoundSequence")
            .field("sample_rate", &self.sample_rate)
            .field("sounds", &self.sounds.len())
            .field("samples", &self.buffer.len())
            .field("playing", &self.is_playing())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimulatedBackend;
    use std::sync::Arc;
    use tonal_synth::SynthesisParams;

    fn engine() -> SoundEngine {
        SoundEngine::simulated(20.0)
    }

    fn note(engine: &SoundEngine, name: &str, secs: f64) -> Sound {
        Sound::note(engine, name, secs).unwrap()
    }

    #[test]
    fn buffer_is_member_concatenation() {
        let engine = engine();
        let a = note(&engine, "D3", 0.5);
        let b = note(&engine, "A3", 0.25);
        let seq = SoundSequence::from_sounds(&engine, [&a, &b], 8000).unwrap();
        assert_eq!(seq.len(), 6000);
        assert_eq!(seq.duration_secs(), 0.75);
        assert_eq!(&seq.buffer().samples()[..4000], a.buffer().samples());
        assert_eq!(&seq.buffer().samples()[4000..], b.buffer().samples());
    }

    #[test]
    fn mismatched_rate_is_rejected_unchanged() {
        let engine = engine();
        let mut seq = SoundSequence::new(&engine, 11025);
        let ok = Sound::new(
            &engine,
            SynthesisParams::new(440.0, 0.5).with_sample_rate(11025),
        )
        .unwrap();
        seq.append(&ok).unwrap();
        let before = (seq.len(), seq.duration_secs(), seq.sounds().len());

        let err = seq.append(&note(&engine, "A4", 0.5)).unwrap_err();
        assert!(matches!(
            err,
            Error::SampleRateMismatch {
                expected: 11025,
                found: 8000
            }
        ));
        assert_eq!((seq.len(), seq.duration_secs(), seq.sounds().len()), before);
    }

    #[test]
    fn members_are_copies() {
        let engine = engine();
        let mut a = note(&engine, "C4", 0.25);
        let seq = SoundSequence::from_sounds(&engine, [&a], 8000).unwrap();
        a.set_pitch("C5").unwrap();
        assert_eq!(seq.sounds()[0].params().frequency_hz, 261.63);
    }

    #[test]
    fn concat_flattens_and_is_associative() {
        let engine = engine();
        let a = note(&engine, "C4", 0.1);
        let b = note(&engine, "E4", 0.2);
        let c = note(&engine, "G4", 0.3);

        let left = concat(&concat(&a, &b).unwrap(), &c).unwrap();
        let right = concat(&a, &concat(&b, &c).unwrap()).unwrap();
        assert_eq!(left.sounds().len(), 3);
        assert_eq!(left.buffer(), right.buffer());
        assert_eq!(left.to_string(), right.to_string());
    }

    #[test]
    fn concat_checks_rates() {
        let engine = engine();
        let a = note(&engine, "C4", 0.1);
        let b = Sound::new(
            &engine,
            SynthesisParams::new(440.0, 0.1).with_sample_rate(11025),
        )
        .unwrap();
        assert!(matches!(
            concat(&a, &b),
            Err(Error::SampleRateMismatch { .. })
        ));
    }

    #[test]
    fn repeat_counts() {
        let engine = engine();
        let a = note(&engine, "C4", 0.1);
        assert_eq!(repeat(&a, 3).unwrap().len(), 3 * a.len());
        let empty = repeat(&a, 0).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.sample_rate(), 8000);
    }

    #[test]
    fn repeat_rejects_overflowing_counts() {
        let engine = engine();
        let a = note(&engine, "C4", 0.1);
        let ab = concat(&a, &a).unwrap();
        assert!(matches!(
            repeat(&ab, usize::MAX),
            Err(Error::RepeatOverflow { members: 2, .. })
        ));
        assert!(matches!(
            repeat(&a, usize::MAX / 2),
            Err(Error::RepeatOverflow { members: 1, .. })
        ));
        assert!(repeat(&SoundSequence::new(&engine, 8000), usize::MAX).unwrap().is_empty());
    }

    #[test]
    fn empty_sequence_play_is_a_noop() {
        let backend = Arc::new(SimulatedBackend::new());
        let engine = SoundEngine::new(backend.clone());
        let mut seq = SoundSequence::new(&engine, 8000);
        seq.play();
        assert!(!seq.is_playing());
        seq.wait_done();
        assert_eq!(backend.submission_count(), 0);
    }

    #[test]
    fn append_stops_playback() {
        let engine = engine();
        let a = note(&engine, "C4", 3.0);
        let mut seq = SoundSequence::from_sounds(&engine, [&a], 8000).unwrap();
        seq.play();
        assert!(seq.is_playing());
        seq.append(&a).unwrap();
        assert!(!seq.is_playing());
        assert_eq!(seq.len(), 48_000);
    }

    #[test]
    fn plays_to_completion() {
        let engine = SoundEngine::simulated(50.0);
        let a = note(&engine, "C4", 0.2);
        let mut seq = repeat(&a, 2).unwrap();
        seq.play();
        seq.wait_done();
        assert!(!seq.is_playing());
    }
}
