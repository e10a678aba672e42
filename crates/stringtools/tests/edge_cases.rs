//! Edge case and stress tests for stringtools
//!
//! These tests cover hash collisions, concurrent interning, scavenging under
//! load, and span layout independence.

use std::sync::{Arc, Barrier};
use std::thread;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use stringtools::{
    CacheBackend, ConcurrentWeakStringCache, InternableString, InternerConfig,
    LockingWeakStringCache, WeakStringCache, WeakStringCacheInterner,
};

fn caches() -> Vec<Box<dyn WeakStringCache>> {
    vec![
        Box::new(ConcurrentWeakStringCache::with_scavenge_threshold(64)),
        Box::new(LockingWeakStringCache::with_scavenge_threshold(64)),
    ]
}

/// Split `text` at the given byte fractions, snapped to char boundaries
fn split_spans(text: &str, cuts: &[usize]) -> Vec<String> {
    let mut points: Vec<usize> = cuts
        .iter()
        .map(|cut| {
            let mut index = cut % (text.len() + 1);
            while !text.is_char_boundary(index) {
                index -= 1;
            }
            index
        })
        .collect();
    points.push(0);
    points.push(text.len());
    points.sort_unstable();
    points.dedup();

    points.windows(2).map(|w| text[w[0]..w[1]].to_string()).collect()
}

// ============================================================================
// HASH COLLISION EDGE CASES
// ============================================================================

#[test]
fn test_real_hash_collision() {
    // "bC" and "cb" share a djb2-xor hash code
    assert_eq!(
        InternableString::new("bC").hash_code(),
        InternableString::new("cb").hash_code()
    );

    for backend in [CacheBackend::Concurrent, CacheBackend::Locking] {
        let interner = WeakStringCacheInterner::new(InternerConfig::default().with_backend(backend));
        let first = interner.intern_str("bC");
        let second = interner.intern_str("cb");
        assert_eq!(&*first, "bC");
        assert_eq!(&*second, "cb");

        // The newer string owns the slot
        assert!(Arc::ptr_eq(&second, &interner.intern_str("cb")));
        assert_eq!(&*interner.intern_str("bC"), "bC");
        assert_eq!(interner.cache().len(), 1);
    }
}

#[test]
fn test_ten_thousand_crafted_collisions() {
    for cache in caches() {
        let mut held = Vec::with_capacity(10_000);
        for i in 0..10_000 {
            let text = format!("collision-{}", i);
            let (value, hit) = cache.get_or_create_with_hash(&InternableString::new(&text), 42);
            assert!(!hit);
            assert_eq!(&*value, text);
            held.push(value);
        }
        assert_eq!(cache.len(), 1);

        // Only the last string is still reachable through the slot
        let (last, hit) = cache.get_or_create_with_hash(&InternableString::new("collision-9999"), 42);
        assert!(hit);
        assert!(Arc::ptr_eq(&last, &held[9_999]));

        let (first, hit) = cache.get_or_create_with_hash(&InternableString::new("collision-0"), 42);
        assert!(!hit);
        assert_eq!(&*first, "collision-0");
    }
}

#[test]
fn test_collisions_from_many_threads() {
    let cache: Arc<dyn WeakStringCache> = Arc::new(ConcurrentWeakStringCache::new());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..500 {
                    let text = format!("thread-{}-collision-{}", t, i);
                    let (value, _) = cache.get_or_create_with_hash(&InternableString::new(&text), 7);
                    assert_eq!(&*value, text);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(cache.len() <= 1);
}

// ============================================================================
// CONCURRENCY STRESS TESTS
// ============================================================================

#[test]
fn test_concurrent_random_pool() {
    const THREADS: u64 = 8;
    const ROUNDS: usize = 5_000;

    let pool: Arc<Vec<String>> = Arc::new((0..200).map(|i| format!("pooled-string-{:03}", i)).collect());

    for backend in [CacheBackend::Concurrent, CacheBackend::Locking] {
        let interner = Arc::new(WeakStringCacheInterner::new(
            InternerConfig::default()
                .with_backend(backend)
                .with_scavenge_threshold(16)
                .with_statistics(true),
        ));
        let barrier = Arc::new(Barrier::new(THREADS as usize));

        let handles: Vec<_> = (0..THREADS)
            .map(|seed| {
                let interner = Arc::clone(&interner);
                let pool = Arc::clone(&pool);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    let mut kept: Vec<Arc<str>> = Vec::new();
                    barrier.wait();

                    for _ in 0..ROUNDS {
                        let text = &pool[rng.gen_range(0..pool.len())];
                        let cut = rng.gen_range(0..=text.len());
                        let value = interner.intern_spans(&[&text[..cut], &text[cut..]]);
                        assert_eq!(&*value, text.as_str());

                        // Keep roughly a quarter alive so the cache sees both
                        if rng.gen_bool(0.25) {
                            kept.push(value);
                        }
                        if kept.len() > 64 {
                            kept.drain(..32);
                        }
                    }
                    kept.len()
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let stats = interner.statistics().unwrap();
        assert_eq!(stats.hits + stats.misses, THREADS * ROUNDS as u64);
        assert!(stats.distinct_strings <= pool.len());
    }
}

#[test]
fn test_scavenge_during_intern_keeps_live_strings() {
    const WORKERS: usize = 4;
    const PER_WORKER: usize = 250;

    for cache in caches() {
        let cache: Arc<dyn WeakStringCache> = Arc::from(cache);
        let barrier = Arc::new(Barrier::new(WORKERS + 1));

        let scavenger = {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..200 {
                    cache.scavenge();
                    thread::yield_now();
                }
            })
        };

        let workers: Vec<_> = (0..WORKERS)
            .map(|t| {
                let cache = Arc::clone(&cache);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    let mut held = Vec::with_capacity(PER_WORKER);
                    for i in 0..PER_WORKER {
                        let text = format!("worker-{}-string-{}", t, i);
                        let (value, _) = cache.get_or_create(&InternableString::new(&text));
                        held.push(value);
                        // Transient strings give the scavenger work
                        drop(cache.get_or_create(&InternableString::new(&format!("transient-{}-{}", t, i))));
                    }
                    held
                })
            })
            .collect();

        let held: Vec<Arc<str>> = workers
            .into_iter()
            .flat_map(|worker| worker.join().unwrap())
            .collect();
        scavenger.join().unwrap();

        // Every held string is still the cached one
        for value in &held {
            let (again, hit) = cache.get_or_create(&InternableString::from_arc(value));
            assert!(hit, "live string {:?} was lost", value);
            assert!(Arc::ptr_eq(value, &again));
        }

        drop(held);
        cache.scavenge();
        cache.scavenge();
        assert_eq!(cache.statistics().collected_string_count, 0);
        assert!(cache.is_empty());
    }
}

#[test]
fn test_entry_count_survives_clear_and_scavenge_races() {
    let cache = Arc::new(ConcurrentWeakStringCache::with_scavenge_threshold(32));
    let barrier = Arc::new(Barrier::new(6));

    let workers: Vec<_> = (0..4u64)
        .map(|seed| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let mut rng = StdRng::seed_from_u64(seed);
                let mut kept: Vec<Arc<str>> = Vec::new();
                barrier.wait();
                for i in 0..2_000 {
                    let text = format!("race-{}-{}", seed, rng.gen_range(0..i + 1));
                    let (value, _) = cache.get_or_create(&InternableString::new(&text));
                    assert_eq!(&*value, text);
                    if rng.gen_bool(0.1) {
                        kept.push(value);
                    }
                }
            })
        })
        .collect();

    let sweepers: Vec<_> = [true, false]
        .into_iter()
        .map(|clearing| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for _ in 0..300 {
                    if clearing {
                        cache.clear();
                    } else {
                        cache.scavenge();
                    }
                    thread::yield_now();
                }
            })
        })
        .collect();

    for handle in workers.into_iter().chain(sweepers) {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), cache.statistics().total());
    assert!(cache.scavenge_threshold() < usize::MAX);

    cache.scavenge();
    assert!(cache.is_empty());
    assert_eq!(cache.len(), cache.statistics().total());
}

#[test]
fn test_same_string_from_many_threads() {
    let interner = Arc::new(WeakStringCacheInterner::default());
    let anchor = interner.intern_str("contended");

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let interner = Arc::clone(&interner);
            thread::spawn(move || {
                (0..1_000)
                    .map(|_| interner.intern_spans(&["cont", "ended"]))
                    .last()
            })
        })
        .collect();

    // While `anchor` is alive every thread gets the same allocation
    for handle in handles {
        let value = handle.join().unwrap().unwrap();
        assert!(Arc::ptr_eq(&value, &anchor));
    }
}

// ============================================================================
// SPAN LAYOUT PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn hash_is_independent_of_span_layout(text in ".{0,48}", cuts in prop::collection::vec(any::<usize>(), 0..6)) {
        let pieces = split_spans(&text, &cuts);
        let spans: Vec<&str> = pieces.iter().map(String::as_str).collect();

        let whole = InternableString::new(&text);
        let split = InternableString::from_spans(&spans);
        prop_assert_eq!(whole.hash_code(), split.hash_code());
        prop_assert_eq!(split.len(), text.len());
        prop_assert!(split.content_equals(&text));
    }

    #[test]
    fn intern_is_independent_of_span_layout(text in ".{1,48}", cuts in prop::collection::vec(any::<usize>(), 1..6)) {
        let interner = WeakStringCacheInterner::default();
        let pieces = split_spans(&text, &cuts);
        let spans: Vec<&str> = pieces.iter().map(String::as_str).collect();

        let whole = interner.intern_str(&text);
        let split = interner.intern_spans(&spans);
        prop_assert!(Arc::ptr_eq(&whole, &split));
    }

    #[test]
    fn different_content_never_matches(a in "[a-z]{1,16}", b in "[a-z]{1,16}") {
        prop_assume!(a != b);
        let interner = WeakStringCacheInterner::default();
        let first = interner.intern_str(&a);
        let second = interner.intern_str(&b);
        prop_assert_eq!(&*first, a.as_str());
        prop_assert_eq!(&*second, b.as_str());
    }
}
