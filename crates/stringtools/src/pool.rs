//! Span Storage Pooling
//!
//! Each thread keeps at most one spare span vector for the next builder.
//! Returning a vector overwrites whatever the slot held (last writer wins),
//! and a vector's capacity survives the round trip.

use std::cell::RefCell;

/// Per-thread pool counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Builders that started from pooled storage
    pub reused: u64,
    /// Storage vectors handed back to the slot
    pub returned: u64,
    /// Capacity of the vector currently in the slot
    pub pooled_capacity: usize,
}

#[derive(Default)]
struct SpanPool {
    slot: Option<Vec<&'static str>>,
    stats: PoolStats,
}

thread_local! {
    static SPAN_POOL: RefCell<SpanPool> = RefCell::new(SpanPool::default());
}

/// Take the pooled span vector, or a fresh one if the slot is empty
pub(crate) fn take_spans() -> Vec<&'static str> {
    SPAN_POOL
        .try_with(|pool| {
            let mut pool = pool.borrow_mut();
            let spans = pool.slot.take()?;
            pool.stats.reused += 1;
            pool.stats.pooled_capacity = 0;
            Some(spans)
        })
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Clear `spans` and park it in this thread's slot
pub(crate) fn give_back(spans: Vec<&str>) {
    if spans.capacity() == 0 {
        return;
    }

    let spans = recycle(spans);
    // The slot is gone during thread teardown; the vector is simply freed.
    let _ = SPAN_POOL.try_with(|pool| {
        if let Ok(mut pool) = pool.try_borrow_mut() {
            pool.stats.returned += 1;
            pool.stats.pooled_capacity = spans.capacity();
            pool.slot = Some(spans);
        }
    });
}

/// Reuse the allocation of an emptied vector under a new lifetime
fn recycle(mut spans: Vec<&str>) -> Vec<&'static str> {
    // Keeping the allocation relies on std's in-place collect for same-layout
    // items, which std does not guarantee; test_round_trip_keeps_capacity
    // catches a change.
    spans.clear();
    spans.into_iter().map(|_| "").collect()
}

/// Get this thread's pool counters
pub fn pool_stats() -> PoolStats {
    SPAN_POOL
        .try_with(|pool| pool.borrow().stats)
        .unwrap_or_default()
}
