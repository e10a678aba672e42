//! Single-lock cache backend
//!
//! Same semantics as the concurrent backend with one mutex around the map
//! and the threshold. Simpler to reason about; serializes every lookup.

use std::sync::{Arc, Mutex};

use rustc_hash::FxHashMap;

use super::{CacheStatistics, WeakStringCache, count_handle, lock};
use crate::config::DEFAULT_SCAVENGE_THRESHOLD;
use crate::handle::StringWeakHandle;
use crate::internable::InternableString;

struct LockingState {
    strings_by_hash: FxHashMap<u32, StringWeakHandle>,
    scavenge_threshold: usize,
}

impl LockingState {
    /// Drop every unused handle, returning how many were freed
    fn scavenge(&mut self) -> usize {
        let before = self.strings_by_hash.len();
        self.strings_by_hash.retain(|_, handle| handle.is_used());
        before - self.strings_by_hash.len()
    }
}

/// Weak string cache behind a single mutex
pub struct LockingWeakStringCache {
    state: Mutex<LockingState>,
    initial_threshold: usize,
}

impl LockingWeakStringCache {
    pub fn new() -> Self {
        Self::with_scavenge_threshold(DEFAULT_SCAVENGE_THRESHOLD)
    }

    pub fn with_scavenge_threshold(threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            state: Mutex::new(LockingState {
                strings_by_hash: FxHashMap::default(),
                scavenge_threshold: threshold,
            }),
            initial_threshold: threshold,
        }
    }

    pub fn scavenge_threshold(&self) -> usize {
        lock(&self.state).scavenge_threshold
    }
}

impl Default for LockingWeakStringCache {
    fn default() -> Self {
        Self::new()
    }
}

impl WeakStringCache for LockingWeakStringCache {
    fn get_or_create_with_hash(&self, candidate: &InternableString<'_>, hash: u32) -> (Arc<str>, bool) {
        let mut state = lock(&self.state);

        if let Some(handle) = state.strings_by_hash.get_mut(&hash) {
            if let Some(found) = handle.get_matching_string(candidate) {
                return (found, true);
            }

            let value = candidate.to_arc();
            handle.set_string(&value);
            return (value, false);
        }

        let value = candidate.to_arc();
        state
            .strings_by_hash
            .insert(hash, StringWeakHandle::with_string(&value));

        if state.strings_by_hash.len() >= state.scavenge_threshold {
            let freed = state.scavenge();
            let remaining = state.strings_by_hash.len();
            state.scavenge_threshold = remaining.saturating_mul(2).max(self.initial_threshold);
            tracing::debug!(
                "Scavenged locking string cache: {} freed, {} remain, next at {}",
                freed,
                remaining,
                state.scavenge_threshold
            );
        }

        (value, false)
    }

    fn scavenge(&self) {
        let mut state = lock(&self.state);
        let freed = state.scavenge();
        tracing::debug!(
            "Scavenged locking string cache: {} freed, {} remain",
            freed,
            state.strings_by_hash.len()
        );
    }

    fn len(&self) -> usize {
        lock(&self.state).strings_by_hash.len()
    }

    fn statistics(&self) -> CacheStatistics {
        let state = lock(&self.state);
        let mut stats = CacheStatistics::default();
        for handle in state.strings_by_hash.values() {
            count_handle(&mut stats, handle);
        }
        stats
    }

    fn clear(&self) {
        lock(&self.state).strings_by_hash.clear();
    }
}
