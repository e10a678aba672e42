//! Weak String Cache
//!
//! Maps string hash codes to weak handles. One handle per hash code: when
//! two different strings collide, the most recently stored one owns the
//! slot and the other is simply re-added on its next lookup.
//!
//! Entries whose string has been dropped stay in the map until the next
//! scavenge. A scavenge runs when the entry count reaches a threshold, and
//! the threshold is then reset to twice the surviving entry count, so the
//! sweep cost is amortized over the growth of the live set.

mod concurrent;
mod locking;

pub use concurrent::ConcurrentWeakStringCache;
pub use locking::LockingWeakStringCache;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::config::{CacheBackend, InternerConfig};
use crate::handle::StringWeakHandle;
use crate::internable::InternableString;

/// Handle counts gathered by walking the cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatistics {
    /// Handles whose string is still alive
    pub live_string_count: usize,
    /// Handles whose string has been dropped but not yet scavenged
    pub collected_string_count: usize,
}

impl CacheStatistics {
    pub fn total(&self) -> usize {
        self.live_string_count + self.collected_string_count
    }
}

/// Hash-bucketed weak string cache
pub trait WeakStringCache: Send + Sync {
    /// Return a live string equal to `candidate`, storing a new one on a
    /// miss. The flag is true on a cache hit.
    fn get_or_create(&self, candidate: &InternableString<'_>) -> (Arc<str>, bool) {
        self.get_or_create_with_hash(candidate, candidate.hash_code())
    }

    /// [`get_or_create`](Self::get_or_create) with a precomputed hash code.
    ///
    /// Content is always compared, so a poor hash only costs hit rate.
    fn get_or_create_with_hash(&self, candidate: &InternableString<'_>, hash: u32) -> (Arc<str>, bool);

    /// Free the handles of every dropped string
    fn scavenge(&self);

    /// Number of hash codes with a handle
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Count live and collected handles
    fn statistics(&self) -> CacheStatistics;

    /// Free every handle and empty the map
    fn clear(&self);

    /// Free every handle and consume the cache
    fn dispose(self: Box<Self>) {
        self.clear();
    }
}

/// Build the cache selected by `config`
pub fn new_cache(config: &InternerConfig) -> Box<dyn WeakStringCache> {
    match config.backend {
        CacheBackend::Concurrent => Box::new(ConcurrentWeakStringCache::with_scavenge_threshold(
            config.initial_scavenge_threshold,
        )),
        CacheBackend::Locking => Box::new(LockingWeakStringCache::with_scavenge_threshold(
            config.initial_scavenge_threshold,
        )),
    }
}

/// Every critical section leaves its data valid, so a poisoned lock is
/// still safe to use.
#[inline]
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tally one handle into `stats`
pub(crate) fn count_handle(stats: &mut CacheStatistics, handle: &StringWeakHandle) {
    if handle.is_used() {
        stats.live_string_count += 1;
    } else if handle.is_allocated() {
        stats.collected_string_count += 1;
    }
}
