//! Deterministic in-process playback device.
//!
//! [`SimulatedBackend`] drives the same [`PcmCursor`] a real stream would,
//! from a clock thread instead of an audio callback. Nothing is audible.
//! It backs the test suites and the CLI `--dry-run` flag.
//!
//! The clock ticks every [`TICK`] and consumes `rate · TICK · speed` frames
//! per tick, so a speed of 1.0 plays in real time and larger speeds finish
//! proportionally sooner.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use tonal_synth::PcmBuffer;

use crate::backend::{PcmCursor, PlaybackDevice, PlaybackHandle, Transport};
use crate::{Error, Result};

/// Clock period of the simulated stream.
pub const TICK: Duration = Duration::from_millis(2);

/// One buffer accepted by a [`SimulatedBackend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    /// Number of samples in the submitted buffer.
    pub samples: usize,
    /// Sample rate of the submitted buffer.
    pub sample_rate: u32,
}

/// Playback device that plays into nothing on a clock thread.
#[derive(Debug)]
pub struct SimulatedBackend {
    speed: f64,
    channels: u16,
    device_rate: Option<u32>,
    failing: AtomicBool,
    submissions: Mutex<Vec<Submission>>,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedBackend {
    /// Real-time mono device at each buffer's own rate.
    pub fn new() -> Self {
        Self {
            speed: 1.0,
            channels: 1,
            device_rate: None,
            failing: AtomicBool::new(false),
            submissions: Mutex::new(Vec::new()),
        }
    }

    /// Play `speed` times faster than real time. Non-positive or non-finite
    /// values are treated as 1.0.
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = if speed.is_finite() && speed > 0.0 {
            speed
        } else {
            1.0
        };
        self
    }

    /// Number of interleaved output channels.
    pub fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels.max(1);
        self
    }

    /// Run the simulated device at a fixed rate, resampling every buffer.
    pub fn with_device_rate(mut self, rate: u32) -> Self {
        self.device_rate = Some(rate);
        self
    }

    /// Make every following [`submit`](PlaybackDevice::submit) fail (or
    /// succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Every buffer accepted so far, in order.
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// How many buffers were accepted.
    pub fn submission_count(&self) -> usize {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn frames_per_tick(&self, rate: u32) -> usize {
        let frames = (f64::from(rate) * TICK.as_secs_f64() * self.speed).ceil();
        (frames as usize).max(1)
    }
}

impl PlaybackDevice for SimulatedBackend {
    fn name(&self) -> &str {
        "simulated"
    }

    fn submit(&self, buffer: &PcmBuffer) -> Result<PlaybackHandle> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Backend("simulated device failure".to_string()));
        }

        let device_rate = self.device_rate.unwrap_or(buffer.sample_rate());
        let transport = Arc::new(Transport::new());
        let mut cursor = PcmCursor::new(buffer, device_rate, self.channels, Arc::clone(&transport))?;
        let mut block = vec![0.0f32; self.frames_per_tick(device_rate) * usize::from(self.channels)];

        let clock = Arc::clone(&transport);
        let worker = thread::Builder::new()
            .name("tonal-sim".to_string())
            .spawn(move || {
                while clock.is_active() {
                    cursor.fill(&mut block);
                    thread::sleep(TICK);
                }
            })?;

        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Submission {
                samples: buffer.len(),
                sample_rate: buffer.sample_rate(),
            });
        tracing::debug!(
            samples = buffer.len(),
            sample_rate = buffer.sample_rate(),
            speed = self.speed,
            "simulated playback started"
        );

        Ok(PlaybackHandle::new(transport, worker))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn tone(secs: f64) -> PcmBuffer {
        let len = (secs * 8000.0) as usize;
        PcmBuffer::from_samples(vec![1000; len], 8000)
    }

    #[test]
    fn plays_to_completion() {
        let backend = SimulatedBackend::new().with_speed(50.0);
        let handle = backend.submit(&tone(1.0)).unwrap();
        assert!(handle.is_playing());
        handle.wait_done();
        assert!(!handle.is_playing());
        assert_eq!(handle.position(), 8000);
    }

    #[test]
    fn speed_shortens_wall_time() {
        let backend = SimulatedBackend::new().with_speed(100.0);
        let start = Instant::now();
        backend.submit(&tone(2.0)).unwrap().wait_done();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn stop_interrupts() {
        let backend = SimulatedBackend::new();
        let handle = backend.submit(&tone(10.0)).unwrap();
        handle.stop();
        handle.wait_done();
        assert!(!handle.is_playing());
        assert!(handle.position() < 80_000);
    }

    #[test]
    fn failure_injection() {
        let backend = SimulatedBackend::new();
        backend.set_failing(true);
        assert!(matches!(backend.submit(&tone(0.1)), Err(Error::Backend(_))));
        assert_eq!(backend.submission_count(), 0);
        backend.set_failing(false);
        assert!(backend.submit(&tone(0.1)).is_ok());
        assert_eq!(
            backend.submissions(),
            vec![Submission {
                samples: 800,
                sample_rate: 8000
            }]
        );
    }

    #[test]
    fn resampling_device_still_finishes() {
        let backend = SimulatedBackend::new()
            .with_speed(50.0)
            .with_device_rate(44100)
            .with_channels(2);
        let handle = backend.submit(&tone(0.5)).unwrap();
        handle.wait_done();
        assert_eq!(handle.position(), 4000);
    }

    #[test]
    fn zero_rate_buffer_is_refused() {
        let backend = SimulatedBackend::new();
        let err = backend
            .submit(&PcmBuffer::from_samples(vec![1000; 8], 0))
            .unwrap_err();
        assert!(matches!(err, Error::Backend(_)));
        assert_eq!(backend.submission_count(), 0);
    }

    #[test]
    fn invalid_speed_falls_back() {
        assert_eq!(SimulatedBackend::new().with_speed(-3.0).speed, 1.0);
        assert_eq!(SimulatedBackend::new().with_speed(f64::NAN).speed, 1.0);
    }
}
