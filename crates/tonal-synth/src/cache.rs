//! Memoizing PCM cache.
//!
//! [`SynthesisCache`] maps a bit-exact [`CacheKey`] to a rendered buffer.
//! It is unbounded: the set of notes and durations an application uses is
//! small and known up front, and [`warm_up`](SynthesisCache::warm_up) is the
//! intended way to fill it at startup.
//!
//! ## Single flight
//!
//! Each key owns an `OnceLock`. The map lock is held only long enough to
//! fetch or insert that cell; rendering happens outside it, inside
//! `OnceLock::get_or_init`. Threads asking for the same key while it is
//! being rendered block on the cell and receive the one result, so each
//! distinct key is rendered at most once. Threads asking for different keys
//! render in parallel.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::{CacheKey, Error, PcmBuffer, Result, SynthesisParams};

type Slot = Arc<OnceLock<Arc<PcmBuffer>>>;

/// Hit/miss counters for a [`SynthesisCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Lookups answered from an existing entry.
    pub hits: u64,
    /// Lookups that rendered a new buffer.
    pub misses: u64,
    /// Number of stored buffers.
    pub entries: usize,
}

/// Thread-safe read-through cache of rendered buffers.
///
/// Returned buffers are shared: treat them as immutable and copy before
/// handing one to an owner that needs its own.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tonal_synth::{SynthesisCache, SynthesisParams};
///
/// let cache = SynthesisCache::new();
/// let params = SynthesisParams::for_note("A4", 0.25).unwrap();
/// let a = cache.get_or_create(&params).unwrap();
/// let b = cache.get_or_create(&params).unwrap();
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(cache.stats().misses, 1);
/// ```
#[derive(Debug, Default)]
pub struct SynthesisCache {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SynthesisCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the buffer for `params`, rendering it on first use.
    ///
    /// Parameters are validated before any entry is created, so invalid
    /// requests never occupy a slot.
    pub fn get_or_create(&self, params: &SynthesisParams) -> Result<Arc<PcmBuffer>> {
        params.validate()?;
        let slot = self.slot(params.cache_key());

        let mut rendered = false;
        let buffer = slot.get_or_init(|| {
            rendered = true;
            Arc::new(crate::render_validated(params))
        });

        if rendered {
            self.misses.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(params = %params, samples = buffer.len(), "synthesis cache miss");
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        Ok(Arc::clone(buffer))
    }

    /// Store an externally produced buffer (e.g. loaded from disk).
    ///
    /// Returns `Ok(false)` when an entry already exists; the existing
    /// buffer is kept. The buffer must have the sample count and rate the
    /// parameters imply.
    pub fn prime(&self, params: &SynthesisParams, buffer: PcmBuffer) -> Result<bool> {
        params.validate()?;
        if buffer.len() != params.sample_count() {
            return Err(Error::invalid(
                "buffer",
                format!(
                    "expected {} samples, got {}",
                    params.sample_count(),
                    buffer.len()
                ),
            ));
        }
        if buffer.sample_rate() != params.sample_rate {
            return Err(Error::invalid(
                "buffer",
                format!(
                    "expected {} Hz, got {} Hz",
                    params.sample_rate,
                    buffer.sample_rate()
                ),
            ));
        }
        let slot = self.slot(params.cache_key());
        Ok(slot.set(Arc::new(buffer)).is_ok())
    }

    /// Render every parameter set that is not cached yet.
    ///
    /// Returns how many buffers were newly rendered.
    pub fn warm_up<'a>(&self, params: impl IntoIterator<Item = &'a SynthesisParams>) -> Result<usize> {
        let before = self.misses.load(Ordering::Relaxed);
        for p in params {
            self.get_or_create(p)?;
        }
        let rendered = self.misses.load(Ordering::Relaxed) - before;
        tracing::info!(rendered, entries = self.len(), "synthesis cache warmed");
        Ok(rendered as usize)
    }

    /// Whether a buffer for `params` is already stored.
    pub fn contains(&self, params: &SynthesisParams) -> bool {
        self.lock()
            .get(&params.cache_key())
            .is_some_and(|slot| slot.get().is_some())
    }

    /// Number of stored buffers.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.get().is_some()).count()
    }

    /// Whether no buffers are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        self.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Current counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    fn slot(&self, key: CacheKey) -> Slot {
        Arc::clone(self.lock().entry(key).or_default())
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
