//! Shared synthesis cache plus playback device.

use std::sync::Arc;

use tonal_synth::{PcmBuffer, SynthesisCache, SynthesisParams};

use crate::backend::{PlaybackDevice, PlaybackHandle};
use crate::cpal_backend::CpalBackend;
use crate::simulated::SimulatedBackend;
use crate::Result;

/// Context every [`Sound`](crate::Sound) and
/// [`SoundSequence`](crate::SoundSequence) is created from.
///
/// Cloning is cheap: clones share the same cache and device.
#[derive(Clone)]
pub struct SoundEngine {
    cache: Arc<SynthesisCache>,
    device: Arc<dyn PlaybackDevice>,
}

impl SoundEngine {
    /// Engine with a fresh cache playing through `device`.
    pub fn new(device: Arc<dyn PlaybackDevice>) -> Self {
        Self::with_cache(Arc::new(SynthesisCache::new()), device)
    }

    /// Engine sharing an existing cache.
    pub fn with_cache(cache: Arc<SynthesisCache>, device: Arc<dyn PlaybackDevice>) -> Self {
        Self { cache, device }
    }

    /// Engine playing through the default cpal output.
    pub fn cpal_default() -> Self {
        Self::new(Arc::new(CpalBackend::new()))
    }

    /// Engine with a [`SimulatedBackend`] running at `speed` times real time.
    pub fn simulated(speed: f64) -> Self {
        Self::new(Arc::new(SimulatedBackend::new().with_speed(speed)))
    }

    /// The shared synthesis cache.
    pub fn cache(&self) -> &Arc<SynthesisCache> {
        &self.cache
    }

    /// The playback device.
    pub fn device(&self) -> &Arc<dyn PlaybackDevice> {
        &self.device
    }

    /// An owned copy of the buffer for `params`, rendered through the cache.
    pub fn render(&self, params: &SynthesisParams) -> Result<PcmBuffer> {
        let shared = self.cache.get_or_create(params)?;
        Ok(PcmBuffer::clone(&shared))
    }

    /// Submit a buffer to the device.
    pub fn submit(&self, buffer: &PcmBuffer) -> Result<PlaybackHandle> {
        self.device.submit(buffer)
    }
}

impl std::fmt::Debug for SoundEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundEngine")
            .field("device", &self.device.name())
            .field("cache", &self.cache.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_goes_through_cache() {
        let engine = SoundEngine::simulated(10.0);
        let params = SynthesisParams::for_note("A4", 0.1).unwrap();
        let a = engine.render(&params).unwrap();
        let b = engine.render(&params).unwrap();
        assert_eq!(a, b);
        assert_eq!(engine.cache().stats().misses, 1);
        assert_eq!(engine.cache().stats().hits, 1);
    }

    #[test]
    fn clones_share_state() {
        let engine = SoundEngine::simulated(10.0);
        let other = engine.clone();
        other
            .render(&SynthesisParams::for_note("C4", 0.1).unwrap())
            .unwrap();
        assert_eq!(engine.cache().len(), 1);
        assert!(Arc::ptr_eq(engine.device(), other.device()));
    }

    #[test]
    fn debug_names_device() {
        let engine = SoundEngine::simulated(1.0);
        assert!(format!("{engine:?}").contains("simulated"));
    }
}
