//! cpal-based playback device.
//!
//! [`CpalBackend`] is the default [`PlaybackDevice`]. Each submission opens
//! an f32 output stream on the selected device and drives it with a
//! [`PcmCursor`]. The stream is owned by a watcher thread that drops it once
//! playback finishes or is stopped.
//!
//! ## Config selection
//!
//! Devices rarely run at 8000 Hz. The backend first looks for an f32 config
//! range that contains the buffer's rate (fewest channels wins) and plays
//! the samples unchanged. Otherwise it falls back to the device default
//! config and the cursor resamples.
//!
//! ```rust,ignore
//! use tonal_io::{CpalBackend, PlaybackDevice};
//! use tonal_synth::{SynthesisParams, render};
//!
//! let backend = CpalBackend::new();
//! let pcm = render(&SynthesisParams::for_note("A4", 0.5)?)?;
//! let handle = backend.submit(&pcm)?;
//! handle.wait_done();
//! ```

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tonal_synth::PcmBuffer;

use crate::backend::{PcmCursor, PlaybackDevice, PlaybackHandle, Transport, release_when_done};
use crate::devices::find_output_device;
use crate::{Error, Result};

/// cpal-based playback device.
///
/// Holds only the device selector; the host and device are resolved on
/// every submission, so a device plugged in after startup is picked up.
#[derive(Debug, Clone, Default)]
pub struct CpalBackend {
    device_name: Option<String>,
}

impl CpalBackend {
    /// Play through the host's default output device.
    pub fn new() -> Self {
        tracing::info!(
            host = cpal::default_host().id().name(),
            "cpal backend initialized"
        );
        Self { device_name: None }
    }

    /// Play through the first output device whose name contains `name`
    /// (case-insensitive).
    pub fn with_device(name: impl Into<String>) -> Self {
        let device_name = name.into();
        tracing::info!(
            host = cpal::default_host().id().name(),
            device = %device_name,
            "cpal backend initialized"
        );
        Self {
            device_name: Some(device_name),
        }
    }

    /// The configured device selector, if any.
    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }
}

/// Pick an output config for a buffer at `rate`.
fn choose_config(device: &cpal::Device, rate: u32) -> Result<cpal::StreamConfig> {
    let exact = device
        .supported_output_configs()
        .map_err(|e| Error::Backend(e.to_string()))?
        .filter(|range| range.sample_format() == cpal::SampleFormat::F32)
        .filter(|range| range.min_sample_rate() <= rate && rate <= range.max_sample_rate())
        .min_by_key(cpal::SupportedStreamConfigRange::channels);

    if let Some(range) = exact {
        return Ok(range.with_sample_rate(rate).config());
    }

    let fallback = device
        .default_output_config()
        .map_err(|e| Error::Backend(e.to_string()))?;
    tracing::debug!(
        requested = rate,
        device_rate = fallback.sample_rate(),
        "no native config for buffer rate; resampling"
    );
    Ok(fallback.config())
}

impl PlaybackDevice for CpalBackend {
    fn name(&self) -> &str {
        "cpal"
    }

    fn submit(&self, buffer: &PcmBuffer) -> Result<PlaybackHandle> {
        let host = cpal::default_host();
        let device = find_output_device(&host, self.device_name.as_deref())?;
        let config = choose_config(&device, buffer.sample_rate())?;

        let transport = Arc::new(Transport::new());
        let mut cursor = PcmCursor::new(
            buffer,
            config.sample_rate,
            config.channels,
            Arc::clone(&transport),
        )?;
        let error_transport = Arc::clone(&transport);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    cursor.fill(data);
                },
                move |err| {
                    tracing::warn!(error = %err, "output stream error");
                    error_transport.stop();
                },
                None,
            )
            .map_err(|e| Error::Backend(e.to_string()))?;

        stream.play().map_err(|e| Error::Backend(e.to_string()))?;
        tracing::debug!(
            channels = config.channels,
            sample_rate = config.sample_rate,
            samples = buffer.len(),
            "output stream started"
        );

        // the device stays open until the stream is dropped
        let owner = release_when_done(Arc::clone(&transport), stream)?;
        Ok(PlaybackHandle::new(transport, owner))
    }
}
