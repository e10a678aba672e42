//! Weak String Interner
//!
//! Front end over a [`WeakStringCache`]. Adds the empty-string shortcut,
//! optional usage statistics and the optional verification pass. With
//! statistics off, an intern call is one cache lookup and a branch.

use std::fmt::Write;
use std::sync::{Arc, Mutex};

use once_cell::sync::{Lazy, OnceCell};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::cache::{self, CacheStatistics, WeakStringCache};
use crate::config::InternerConfig;
use crate::error::StringToolsError;
use crate::internable::InternableString;
use crate::consistency_panic;

/// Shared empty string, never stored in a cache
pub(crate) static EMPTY: Lazy<Arc<str>> = Lazy::new(|| Arc::from(""));

const REPORT_TITLE: &str = "Weak String Interning";

/// Raw counters, guarded by the interner's statistics lock
#[derive(Default)]
struct InternStatistics {
    hits: u64,
    misses: u64,
    eliminated_strings: u64,
    eliminated_bytes: u64,
    /// Owned copies, so counting never keeps an interned string alive
    call_counts: FxHashMap<Box<str>, u64>,
}

impl InternStatistics {
    fn record(&mut self, candidate: &InternableString<'_>, value: &Arc<str>, hit: bool) {
        if hit {
            self.hits += 1;
            if !candidate.reference_equals(value) {
                self.eliminated_strings += 1;
                self.eliminated_bytes += value.len() as u64;
            }
        } else {
            self.misses += 1;
        }

        match self.call_counts.get_mut(&**value) {
            Some(count) => *count += 1,
            None => {
                self.call_counts.insert(Box::from(&**value), 1);
            }
        }
    }

    /// Strings interned more than once, by total bytes passed in
    fn top_strings(&self, limit: usize) -> Vec<TopString> {
        let mut repeated: Vec<TopString> = self
            .call_counts
            .iter()
            .filter(|(_, count)| **count > 1)
            .map(|(value, count)| TopString {
                value: value.to_string(),
                count: *count,
                total_bytes: *count * value.len() as u64,
            })
            .collect();

        repeated.sort_by(|a, b| {
            b.total_bytes
                .cmp(&a.total_bytes)
                .then_with(|| a.value.cmp(&b.value))
        });
        repeated.truncate(limit);
        repeated
    }
}

/// One entry of the top-strings ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopString {
    pub value: String,
    /// Intern calls that produced this string
    pub count: u64,
    /// `count * len`
    pub total_bytes: u64,
}

/// Point-in-time copy of the interner statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InternStatisticsSnapshot {
    pub hits: u64,
    pub misses: u64,
    /// Hits whose candidate was a different allocation than the result
    pub eliminated_strings: u64,
    pub eliminated_bytes: u64,
    pub distinct_strings: usize,
    pub top_strings: Vec<TopString>,
    pub cache: CacheStatistics,
}

/// Interner backed by a weak string cache
pub struct WeakStringCacheInterner {
    cache: Box<dyn WeakStringCache>,
    statistics: OnceCell<Mutex<InternStatistics>>,
    top_strings: usize,
    verify: bool,
}

impl WeakStringCacheInterner {
    pub fn new(config: InternerConfig) -> Self {
        tracing::info!(
            "Creating weak string interner: {:?} cache, first scavenge at {} entries",
            config.backend,
            config.initial_scavenge_threshold
        );

        let interner = Self {
            cache: cache::new_cache(&config),
            statistics: OnceCell::new(),
            top_strings: config.top_strings,
            verify: config.verify,
        };
        if config.statistics {
            interner.enable_statistics();
        }
        interner
    }

    /// Canonical string equal to `candidate`
    pub fn intern(&self, candidate: &InternableString<'_>) -> Arc<str> {
        if candidate.is_empty() {
            return Arc::clone(&EMPTY);
        }

        let (value, hit) = self.cache.get_or_create(candidate);

        if self.verify {
            verify_interned(candidate, &value);
        }

        if let Some(statistics) = self.statistics.get() {
            cache::lock(statistics).record(candidate, &value, hit);
        }

        value
    }

    pub fn intern_str(&self, value: &str) -> Arc<str> {
        self.intern(&InternableString::new(value))
    }

    /// Returns `value` itself unless an equal string is already cached
    pub fn intern_arc(&self, value: &Arc<str>) -> Arc<str> {
        self.intern(&InternableString::from_arc(value))
    }

    pub fn intern_spans(&self, spans: &[&str]) -> Arc<str> {
        self.intern(&InternableString::from_spans(spans))
    }

    /// Start gathering statistics. Calls made earlier are not counted.
    pub fn enable_statistics(&self) {
        self.statistics.get_or_init(|| {
            tracing::info!("Weak string interning statistics enabled");
            Mutex::new(InternStatistics::default())
        });
    }

    pub fn statistics_enabled(&self) -> bool {
        self.statistics.get().is_some()
    }

    /// Current statistics, or `None` if they were never enabled
    pub fn statistics(&self) -> Option<InternStatisticsSnapshot> {
        let statistics = self.statistics.get()?;
        let cache_statistics = self.cache.statistics();
        let statistics = cache::lock(statistics);

        Some(InternStatisticsSnapshot {
            hits: statistics.hits,
            misses: statistics.misses,
            eliminated_strings: statistics.eliminated_strings,
            eliminated_bytes: statistics.eliminated_bytes,
            distinct_strings: statistics.call_counts.len(),
            top_strings: statistics.top_strings(self.top_strings),
            cache: cache_statistics,
        })
    }

    /// Human-readable statistics report
    pub fn format_statistics(&self) -> String {
        match self.statistics() {
            Some(snapshot) => format_report(&snapshot),
            None => format!("{} statistics are not enabled\n", REPORT_TITLE),
        }
    }

    pub fn cache_statistics(&self) -> CacheStatistics {
        self.cache.statistics()
    }

    pub fn scavenge(&self) {
        self.cache.scavenge();
    }

    pub fn cache(&self) -> &dyn WeakStringCache {
        self.cache.as_ref()
    }
}

impl Default for WeakStringCacheInterner {
    fn default() -> Self {
        Self::new(InternerConfig::default())
    }
}

fn verify_interned(candidate: &InternableString<'_>, value: &Arc<str>) {
    let expected = candidate.to_owned_string();
    if *expected != **value {
        consistency_panic(StringToolsError::InternMismatch {
            interned: value.to_string(),
            expected,
        });
    }
}

fn format_report(snapshot: &InternStatisticsSnapshot) -> String {
    let mut out = String::new();
    let padding = "=".repeat(41usize.saturating_sub(REPORT_TITLE.len() / 2));

    // Writing into a String cannot fail
    let _ = writeln!(out, "{}{}{}", padding, REPORT_TITLE, padding);
    write_row(&mut out, "WeakStringCache Hits", snapshot.hits, "hits");
    write_row(&mut out, "WeakStringCache Misses", snapshot.misses, "misses");
    write_row(&mut out, "Eliminated Strings*", snapshot.eliminated_strings, "strings");
    write_row(&mut out, "Eliminated Bytes", snapshot.eliminated_bytes, "bytes");
    let _ = writeln!(out, "Elimination assumes that strings provided were unique objects.");
    let _ = writeln!(out, "|{}|", "-".repeat(81));

    let top: Vec<String> = snapshot
        .top_strings
        .iter()
        .map(|top| format!("({} instances x each {} bytes)\n{}", top.count, top.value.len(), top.value))
        .collect();
    let _ = writeln!(out, "{}", top.join("\n==============\n"));

    let cache = &snapshot.cache;
    let _ = writeln!(out, "WeakStringCache statistics:");
    let _ = writeln!(
        out,
        "String count live/collected/total = {}/{}/{}",
        cache.live_string_count,
        cache.collected_string_count,
        cache.total()
    );
    out
}

fn write_row(out: &mut String, label: &str, value: u64, unit: &str) {
    let _ = writeln!(out, "||{:>50}|{:>20}|{:>8}|", label, group_thousands(value), unit);
}

/// `1234567` -> `1,234,567`
fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    out
}
