//! Mono 16-bit PCM buffers.

/// Immutable mono 16-bit signed PCM audio at a fixed sample rate.
///
/// Samples are stored as native `i16`; [`to_le_bytes`](Self::to_le_bytes)
/// produces the little-endian byte stream handed to audio backends.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PcmBuffer {
    samples: Vec<i16>,
    sample_rate: u32,
}

impl PcmBuffer {
    /// Wrap existing samples.
    pub fn from_samples(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// An empty buffer at the given rate.
    pub fn empty(sample_rate: u32) -> Self {
        Self::from_samples(Vec::new(), sample_rate)
    }

    /// Decode little-endian bytes. A trailing odd byte is ignored.
    pub fn from_le_bytes(bytes: &[u8], sample_rate: u32) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Self::from_samples(samples, sample_rate)
    }

    /// Concatenate buffers that share `sample_rate`.
    ///
    /// Callers are responsible for rate agreement; the rate of the parts is
    /// not inspected.
    pub fn concat<'a>(parts: impl IntoIterator<Item = &'a PcmBuffer>, sample_rate: u32) -> Self {
        let parts: Vec<&PcmBuffer> = parts.into_iter().collect();
        let total = parts.iter().map(|p| p.len()).sum();
        let mut samples = Vec::with_capacity(total);
        for part in parts {
            samples.extend_from_slice(&part.samples);
        }
        Self::from_samples(samples, sample_rate)
    }

    /// Sample values.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the buffer holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Little-endian byte encoding (2 bytes per sample).
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    /// Consume the buffer, returning its samples.
    pub fn into_samples(self) -> Vec<i16> {
        self.samples
    }
}
