//! Playback device abstraction.
//!
//! This module defines the [`PlaybackDevice`] trait, which decouples sounds
//! and sequences from any specific platform audio API. A device accepts one
//! finished [`PcmBuffer`] per call and returns a [`PlaybackHandle`] bound to
//! that single submission.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────┐
//! │      Sound / SoundSequence       │
//! │   play / stop / wait_done        │
//! └──────────────┬───────────────────┘
//!                │ submit(&PcmBuffer)
//!                ▼
//! ┌──────────────────────────────────┐
//! │      PlaybackDevice trait        │
//! └──────────────┬───────────────────┘
//!        ┌───────┴──────────┐
//!        ▼                  ▼
//! ┌─────────────┐  ┌──────────────────┐
//! │ CpalBackend │  │ SimulatedBackend │
//! └──────┬──────┘  └────────┬─────────┘
//!        └───── PcmCursor ──┘
//!                │ writes position / finished
//!                ▼
//!            Transport  ◄── PlaybackHandle, StopToken
//! ```
//!
//! The audio side and the caller side share nothing but a [`Transport`],
//! a handful of atomics. The callback never allocates or locks; the caller
//! polls the transport.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tonal_synth::PcmBuffer;

use crate::{Error, Result};

/// How often [`PlaybackHandle::wait_done`] re-checks the transport.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Scale from i16 samples to the f32 range used by output streams.
const I16_SCALE: f32 = 32768.0;

/// State shared between a playback submission and its owner.
#[derive(Debug, Default)]
pub struct Transport {
    position: AtomicUsize,
    stopped: AtomicBool,
    finished: AtomicBool,
}

impl Transport {
    /// A fresh transport at position 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request that playback stop. Idempotent.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    /// Mark the end of the buffer as reached.
    pub fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    /// Whether [`stop`](Self::stop) was called.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Whether the whole buffer has been played.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Neither stopped nor finished.
    pub fn is_active(&self) -> bool {
        !self.is_stopped() && !self.is_finished()
    }

    /// Source frames consumed so far.
    pub fn position(&self) -> usize {
        self.position.load(Ordering::SeqCst)
    }

    fn set_position(&self, frame: usize) {
        self.position.store(frame, Ordering::SeqCst);
    }
}

/// Cloneable handle that can stop a playback from another thread.
///
/// Used to cancel a blocked [`PlaybackHandle::wait_done`].
#[derive(Debug, Clone)]
pub struct StopToken {
    transport: Arc<Transport>,
}

impl StopToken {
    /// Stop the playback this token was taken from.
    pub fn stop(&self) {
        self.transport.stop();
    }

    /// Whether the playback is stopped.
    pub fn is_stopped(&self) -> bool {
        self.transport.is_stopped()
    }
}

/// Callback-side reader over one submitted buffer.
///
/// Converts samples to f32 once at construction, then fills interleaved
/// output blocks: each mono sample is copied to every channel, and the read
/// position advances by `source_rate / device_rate` per output frame with
/// linear interpolation between neighbours. When the buffer is exhausted the
/// remaining output is silence and the transport is marked finished.
#[derive(Debug)]
pub struct PcmCursor {
    samples: Vec<f32>,
    channels: usize,
    step: f64,
    position: f64,
    transport: Arc<Transport>,
}

impl PcmCursor {
    /// Prepare `buffer` for a device running at `device_rate` with `channels` outputs.
    ///
    /// # Errors
    ///
    /// [`Error::Backend`] for a non-empty buffer at 0 Hz, which could never
    /// advance.
    pub fn new(
        buffer: &PcmBuffer,
        device_rate: u32,
        channels: u16,
        transport: Arc<Transport>,
    ) -> Result<Self> {
        if buffer.sample_rate() == 0 && !buffer.is_empty() {
            return Err(Error::Backend(format!(
                "cannot play {} samples at 0 Hz",
                buffer.len()
            )));
        }
        let samples: Vec<f32> = buffer
            .samples()
            .iter()
            .map(|&s| f32::from(s) / I16_SCALE)
            .collect();
        if samples.is_empty() {
            transport.finish();
        }
        let step = if device_rate == 0 {
            1.0
        } else {
            f64::from(buffer.sample_rate()) / f64::from(device_rate)
        };
        Ok(Self {
            samples,
            channels: usize::from(channels.max(1)),
            step,
            position: 0.0,
            transport,
        })
    }

    /// Source frames advanced per output frame.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Fill one interleaved output block. Returns the number of frames that
    /// carried audio.
    pub fn fill(&mut self, out: &mut [f32]) -> usize {
        if self.transport.is_stopped() {
            out.fill(0.0);
            return 0;
        }

        let len = self.samples.len();
        let mut written = 0;
        for frame in out.chunks_mut(self.channels) {
            let index = self.position as usize;
            if index >= len {
                frame.fill(0.0);
                continue;
            }
            let frac = (self.position - index as f64) as f32;
            let current = self.samples[index];
            let next = self.samples.get(index + 1).copied().unwrap_or(current);
            frame.fill(current + (next - current) * frac);
            self.position += self.step;
            written += 1;
        }

        let consumed = (self.position as usize).min(len);
        self.transport.set_position(consumed);
        if consumed >= len {
            self.transport.finish();
        }
        written
    }
}

/// Keep `stream` alive on a watcher thread until `transport` is no longer
/// active, then drop it.
///
/// Backends whose stream keeps the device open (and its callback running)
/// hand the returned `JoinHandle` to [`PlaybackHandle::new`] instead of the
/// stream itself, so a finished playback releases the device even while its
/// handle is still held.
pub fn release_when_done<T: Send + 'static>(
    transport: Arc<Transport>,
    stream: T,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("tonal-stream".to_string())
        .spawn(move || {
            while transport.is_active() {
                thread::sleep(POLL_INTERVAL);
            }
            drop(stream);
        })
}

/// Token bound to exactly one buffer submission.
///
/// Keeps the backend-specific stream alive while it exists; dropping the
/// handle stops playback. The stream is held as `Box<dyn Send>` so backend
/// types stay out of application code.
pub struct PlaybackHandle {
    transport: Arc<Transport>,
    _stream: Box<dyn Send>,
}

impl PlaybackHandle {
    /// Wrap a backend stream object together with its transport.
    pub fn new<T: Send + 'static>(transport: Arc<Transport>, stream: T) -> Self {
        Self {
            transport,
            _stream: Box::new(stream),
        }
    }

    /// Stop playback. Idempotent.
    pub fn stop(&self) {
        self.transport.stop();
    }

    /// Whether audio is still being produced.
    pub fn is_playing(&self) -> bool {
        self.transport.is_active()
    }

    /// Source frames played so far.
    pub fn position(&self) -> usize {
        self.transport.position()
    }

    /// Block until the buffer finishes or the playback is stopped.
    pub fn wait_done(&self) {
        while self.transport.is_active() {
            thread::sleep(POLL_INTERVAL);
        }
    }

    /// A token that can stop this playback from elsewhere.
    pub fn stopper(&self) -> StopToken {
        StopToken {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl Drop for PlaybackHandle {
    fn drop(&mut self) {
        self.transport.stop();
    }
}

impl std::fmt::Debug for PlaybackHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackHandle")
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}

/// Platform audio output that plays finished PCM buffers.
///
/// ## Implementing a Custom Device
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use tonal_io::backend::{PcmCursor, PlaybackDevice, PlaybackHandle, Transport};
/// use tonal_synth::PcmBuffer;
///
/// struct MyDevice;
///
/// impl PlaybackDevice for MyDevice {
///     fn name(&self) -> &str { "my-device" }
///
///     fn submit(&self, buffer: &PcmBuffer) -> tonal_io::Result<PlaybackHandle> {
///         let transport = Arc::new(Transport::new());
///         let cursor = PcmCursor::new(buffer, 48000, 2, Arc::clone(&transport))?;
///         let stream = start_platform_stream(cursor)?;
///         Ok(PlaybackHandle::new(transport, stream))
///     }
/// }
/// ```
pub trait PlaybackDevice: Send + Sync {
    /// Human-readable name of this device (e.g., "cpal", "simulated").
    fn name(&self) -> &str;

    /// Start playing `buffer` and return the handle for this submission.
    ///
    /// Must return quickly; playback proceeds on the backend's own thread.
    fn submit(&self, buffer: &PcmBuffer) -> Result<PlaybackHandle>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(samples: Vec<i16>, source_rate: u32, device_rate: u32, channels: u16) -> (PcmCursor, Arc<Transport>) {
        let transport = Arc::new(Transport::new());
        let buffer = PcmBuffer::from_samples(samples, source_rate);
        let cursor = PcmCursor::new(&buffer, device_rate, channels, Arc::clone(&transport)).unwrap();
        (cursor, transport)
    }

    #[test]
    fn same_rate_copies_samples() {
        let (mut c, transport) = cursor(vec![0, 16384, -16384, 32767], 8000, 8000, 1);
        let mut out = [9.0f32; 2];
        assert_eq!(c.fill(&mut out), 2);
        assert_eq!(out, [0.0, 0.5]);
        assert_eq!(transport.position(), 2);
        assert!(transport.is_active());
    }

    #[test]
    fn mono_is_duplicated_across_channels() {
        let (mut c, _) = cursor(vec![16384, -16384], 8000, 8000, 2);
        let mut out = [0.0f32; 4];
        c.fill(&mut out);
        assert_eq!(out, [0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    fn end_of_buffer_pads_with_silence_and_finishes() {
        let (mut c, transport) = cursor(vec![16384; 3], 8000, 8000, 1);
        let mut out = [1.0f32; 5];
        assert_eq!(c.fill(&mut out), 3);
        assert_eq!(out, [0.5, 0.5, 0.5, 0.0, 0.0]);
        assert!(transport.is_finished());
        assert_eq!(transport.position(), 3);
    }

    #[test]
    fn downsampling_skips_frames() {
        let (mut c, _) = cursor(vec![0, 8192, 16384, 24576], 8000, 4000, 1);
        assert_eq!(c.step(), 2.0);
        let mut out = [0.0f32; 2];
        c.fill(&mut out);
        assert_eq!(out, [0.0, 0.5]);
    }

    #[test]
    fn upsampling_interpolates() {
        let (mut c, _) = cursor(vec![0, 16384], 8000, 16000, 1);
        let mut out = [0.0f32; 4];
        assert_eq!(c.fill(&mut out), 4);
        assert_eq!(out, [0.0, 0.25, 0.5, 0.5]);
    }

    #[test]
    fn stopped_cursor_is_silent() {
        let (mut c, transport) = cursor(vec![16384; 8], 8000, 8000, 1);
        transport.stop();
        let mut out = [1.0f32; 4];
        assert_eq!(c.fill(&mut out), 0);
        assert!(out.iter().all(|&s| s == 0.0));
        assert!(!transport.is_finished());
    }

    #[test]
    fn empty_buffer_is_finished_immediately() {
        let (_, transport) = cursor(Vec::new(), 8000, 8000, 1);
        assert!(transport.is_finished());
    }

    #[test]
    fn zero_rate_buffer_is_rejected() {
        let transport = Arc::new(Transport::new());
        let buffer = PcmBuffer::from_samples(vec![1000; 16], 0);
        let err = PcmCursor::new(&buffer, 48000, 2, Arc::clone(&transport)).unwrap_err();
        assert!(matches!(err, Error::Backend(_)));

        let empty = PcmBuffer::empty(0);
        assert!(PcmCursor::new(&empty, 48000, 2, transport).is_ok());
    }

    struct DropFlag(Arc<AtomicBool>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[test]
    fn finished_stream_is_released_while_handle_lives() {
        let transport = Arc::new(Transport::new());
        let dropped = Arc::new(AtomicBool::new(false));
        let owner = release_when_done(Arc::clone(&transport), DropFlag(Arc::clone(&dropped))).unwrap();
        let handle = PlaybackHandle::new(Arc::clone(&transport), ());

        assert!(!dropped.load(Ordering::SeqCst));
        transport.finish();
        owner.join().unwrap();

        assert!(dropped.load(Ordering::SeqCst));
        assert!(!handle.is_playing());
    }

    #[test]
    fn stopped_stream_is_released() {
        let transport = Arc::new(Transport::new());
        let dropped = Arc::new(AtomicBool::new(false));
        let owner = release_when_done(Arc::clone(&transport), DropFlag(Arc::clone(&dropped))).unwrap();
        let handle = PlaybackHandle::new(Arc::clone(&transport), owner);
        drop(handle);

        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while !dropped.load(Ordering::SeqCst) && std::time::Instant::now() < deadline {
            thread::sleep(POLL_INTERVAL);
        }
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[test]
    fn dropping_handle_stops_transport() {
        let transport = Arc::new(Transport::new());
        let handle = PlaybackHandle::new(Arc::clone(&transport), ());
        assert!(handle.is_playing());
        drop(handle);
        assert!(transport.is_stopped());
    }

    #[test]
    fn stop_token_releases_waiter() {
        let transport = Arc::new(Transport::new());
        let handle = PlaybackHandle::new(Arc::clone(&transport), ());
        let token = handle.stopper();
        let waker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            token.stop();
        });
        handle.wait_done();
        assert!(!handle.is_playing());
        waker.join().unwrap();
    }

    #[test]
    fn handle_debug() {
        let handle = PlaybackHandle::new(Arc::new(Transport::new()), 42u32);
        assert!(format!("{handle:?}").contains("PlaybackHandle"));
    }
}
