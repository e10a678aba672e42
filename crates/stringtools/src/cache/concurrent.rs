//! Concurrent cache backend
//!
//! Sharded map from hash code to a shared, individually locked handle.
//! Lookups for different hash codes never contend beyond the shard lock,
//! and no shard lock is held while a handle is locked, except when a
//! scavenger reinserts a handle it still holds.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rustc_hash::FxBuildHasher;

use super::{CacheStatistics, WeakStringCache, count_handle, lock};
use crate::config::DEFAULT_SCAVENGE_THRESHOLD;
use crate::handle::StringWeakHandle;
use crate::internable::InternableString;

type SharedHandle = Arc<Mutex<StringWeakHandle>>;

/// Threshold value while a scavenge is running; unreachable by the count
const SCAVENGING: usize = usize::MAX;

/// Weak string cache backed by a concurrent map
pub struct ConcurrentWeakStringCache {
    strings_by_hash: DashMap<u32, SharedHandle, FxBuildHasher>,
    /// Number of keys in the map
    entry_count: AtomicUsize,
    /// Entry count that triggers the next scavenge
    scavenge_threshold: AtomicUsize,
    initial_threshold: usize,
}

impl ConcurrentWeakStringCache {
    pub fn new() -> Self {
        Self::with_scavenge_threshold(DEFAULT_SCAVENGE_THRESHOLD)
    }

    pub fn with_scavenge_threshold(threshold: usize) -> Self {
        let threshold = threshold.clamp(1, SCAVENGING - 1);
        Self {
            strings_by_hash: DashMap::with_hasher(FxBuildHasher),
            entry_count: AtomicUsize::new(0),
            scavenge_threshold: AtomicUsize::new(threshold),
            initial_threshold: threshold,
        }
    }

    /// Entry count that triggers the next scavenge
    pub fn scavenge_threshold(&self) -> usize {
        self.scavenge_threshold.load(Ordering::Acquire)
    }

    /// Run a scavenge if the threshold is reached and no other thread is
    /// already scavenging. Losers of the race skip instead of waiting.
    fn maybe_scavenge(&self) {
        let threshold = self.scavenge_threshold.load(Ordering::Acquire);
        if self.entry_count.load(Ordering::Relaxed) < threshold {
            return;
        }

        if self
            .scavenge_threshold
            .compare_exchange(threshold, SCAVENGING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let _reset = ThresholdReset { cache: self };
        self.scavenge();
    }

    fn next_threshold(&self) -> usize {
        self.entry_count
            .load(Ordering::Relaxed)
            .saturating_mul(2)
            .max(self.initial_threshold)
            .min(SCAVENGING - 1)
    }

    /// Insert `handle` under `hash` unless another thread got there first
    fn try_insert(&self, hash: u32, handle: SharedHandle) -> bool {
        match self.strings_by_hash.entry(hash) {
            Entry::Vacant(slot) => {
                // Counted while the shard is still locked, so a remover can
                // never decrement an entry before it was counted
                self.entry_count.fetch_add(1, Ordering::Relaxed);
                slot.insert(handle);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    fn snapshot(&self) -> Vec<(u32, SharedHandle)> {
        self.strings_by_hash
            .iter()
            .map(|entry| (*entry.key(), Arc::clone(entry.value())))
            .collect()
    }
}

impl Default for ConcurrentWeakStringCache {
    fn default() -> Self {
        Self::new()
    }
}

impl WeakStringCache for ConcurrentWeakStringCache {
    fn get_or_create_with_hash(&self, candidate: &InternableString<'_>, hash: u32) -> (Arc<str>, bool) {
        let existing = self
            .strings_by_hash
            .get(&hash)
            .map(|entry| Arc::clone(entry.value()));

        if let Some(handle) = existing {
            // The lock keeps a scavenger from freeing the handle mid-read
            let mut handle = lock(&handle);
            if let Some(found) = handle.get_matching_string(candidate) {
                return (found, true);
            }

            let value = candidate.to_arc();
            handle.set_string(&value);
            return (value, false);
        }

        let value = candidate.to_arc();
        let handle = Arc::new(Mutex::new(StringWeakHandle::with_string(&value)));
        if self.try_insert(hash, handle) {
            self.maybe_scavenge();
        }

        (value, false)
    }

    fn scavenge(&self) {
        let before = self.entry_count.load(Ordering::Relaxed);
        let mut freed = 0usize;

        for (hash, handle) in self.snapshot() {
            if lock(&handle).is_used() {
                continue;
            }

            let Some((_, removed)) = self.strings_by_hash.remove(&hash) else {
                continue;
            };
            self.entry_count.fetch_sub(1, Ordering::Relaxed);

            // `removed` may be newer than the handle inspected above, or may
            // have been repointed since. Put live handles back.
            let mut guard = lock(&removed);
            if guard.is_used() && self.try_insert(hash, Arc::clone(&removed)) {
                tracing::trace!("Scavenge kept revived handle for hash {:#010x}", hash);
                continue;
            }

            guard.free();
            freed += 1;
        }

        tracing::debug!(
            "Scavenged weak string cache: {} entries, {} freed, {} remain",
            before,
            freed,
            self.entry_count.load(Ordering::Relaxed)
        );
    }

    fn len(&self) -> usize {
        self.entry_count.load(Ordering::Relaxed)
    }

    fn statistics(&self) -> CacheStatistics {
        let mut stats = CacheStatistics::default();
        for (_, handle) in self.snapshot() {
            count_handle(&mut stats, &lock(&handle));
        }
        stats
    }

    fn clear(&self) {
        for (hash, _) in self.snapshot() {
            if let Some((_, removed)) = self.strings_by_hash.remove(&hash) {
                self.entry_count.fetch_sub(1, Ordering::Relaxed);
                lock(&removed).free();
            }
        }
    }
}

/// Restores the scavenge threshold when a scavenge ends, even by unwinding
struct ThresholdReset<'a> {
    cache: &'a ConcurrentWeakStringCache,
}

impl Drop for ThresholdReset<'_> {
    fn drop(&mut self) {
        let next = self.cache.next_threshold();
        self.cache.scavenge_threshold.store(next, Ordering::Release);
        tracing::debug!("Next weak string cache scavenge at {} entries", next);
    }
}
