//! WAV export of rendered buffers.
//!
//! Files are always mono 16-bit integer PCM, the same format the playback
//! path uses, so a written file reads back sample-for-sample.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavWriter};
use tonal_synth::PcmBuffer;

use crate::{Error, Result};

fn spec_for(sample_rate: u32) -> hound::WavSpec {
    hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Write a buffer as a mono 16-bit WAV file.
///
/// # Example
/// ```ignore
/// let pcm = tonal_synth::render(&SynthesisParams::for_note("A4", 1.0)?)?;
/// write_wav("a4.wav", &pcm)?;
/// ```
pub fn write_wav<P: AsRef<Path>>(path: P, buffer: &PcmBuffer) -> Result<()> {
    let mut writer = WavWriter::create(path, spec_for(buffer.sample_rate()))?;
    for &sample in buffer.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;
    tracing::debug!(
        samples = buffer.len(),
        sample_rate = buffer.sample_rate(),
        "wav written"
    );
    Ok(())
}

/// Read a mono 16-bit WAV file.
///
/// Other layouts are rejected with [`Error::UnsupportedFormat`] rather than
/// converted.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<PcmBuffer> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.bits_per_sample != 16 || spec.sample_format != SampleFormat::Int {
        return Err(Error::UnsupportedFormat(format!(
            "{} channel(s), {}-bit {:?}; expected mono 16-bit PCM",
            spec.channels, spec.bits_per_sample, spec.sample_format
        )));
    }
    let samples = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(PcmBuffer::from_samples(samples, spec.sample_rate))
}
