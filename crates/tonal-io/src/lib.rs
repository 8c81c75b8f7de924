//! Playback and composition layer for the tonal sound engine.
//!
//! This crate provides:
//!
//! - **Sounds**: [`Sound`] pairs synthesis parameters with their rendered
//!   buffer and a transport (play / stop / wait)
//! - **Sequences**: [`SoundSequence`] concatenates sounds, with [`concat`]
//!   and [`repeat`] building flat compositions
//! - **Playback devices**: the [`PlaybackDevice`] trait with a cpal backend
//!   and a deterministic [`SimulatedBackend`]
//! - **WAV export**: [`write_wav`] and [`read_wav`] for mono 16-bit files
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tonal_io::{Sound, SoundEngine};
//!
//! let engine = SoundEngine::cpal_default();
//! let mut sound = Sound::note(&engine, "A4", 0.5)?;
//! sound.play();
//! sound.wait_done();
//!
//! sound.set_instrument("A3")?;
//! sound.play();
//! sound.wait_done();
//! ```

pub mod backend;
pub mod cpal_backend;
mod devices;
mod engine;
mod sequence;
mod simulated;
mod sound;
mod wav;

pub use backend::{
    PcmCursor, PlaybackDevice, PlaybackHandle, StopToken, Transport, release_when_done,
};
pub use cpal_backend::CpalBackend;
pub use devices::{OutputDevice, default_output_device, list_output_devices};
pub use engine::SoundEngine;
pub use sequence::{Composable, SoundSequence, concat, repeat};
pub use simulated::{SimulatedBackend, Submission};
pub use sound::Sound;
pub use wav::{read_wav, write_wav};

/// Error types for playback and export.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Synthesis rejected the parameters.
    #[error(transparent)]
    Synth(#[from] tonal_synth::Error),

    /// A repeat count whose result cannot be represented.
    #[error("Cannot repeat {members} sound(s) {times} times")]
    RepeatOverflow {
        /// Member sounds in the repeated item.
        members: usize,
        /// Requested repeat count.
        times: usize,
    },

    /// A sound's sample rate differs from the sequence it is added to.
    #[error("Sample rate mismatch: sequence is {expected} Hz, sound is {found} Hz")]
    SampleRateMismatch {
        /// Rate of the sequence.
        expected: u32,
        /// Rate of the rejected sound.
        found: u32,
    },

    /// The playback backend failed to accept or run a buffer.
    #[error("Playback backend error: {0}")]
    Backend(String),

    /// No audio output device available on the system.
    #[error("No audio output device available")]
    NoDevice,

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// The WAV file is not mono 16-bit PCM.
    #[error("Unsupported WAV format: {0}")]
    UnsupportedFormat(String),

    /// WAV file read/write error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for playback operations.
pub type Result<T> = std::result::Result<T, Error>;
