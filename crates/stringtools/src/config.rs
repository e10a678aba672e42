//! Interner Configuration

use serde::{Deserialize, Serialize};

/// Default number of cache entries before the first scavenge
pub const DEFAULT_SCAVENGE_THRESHOLD: usize = 2048;

/// Default number of strings listed in the diagnostic report
pub const DEFAULT_TOP_STRINGS: usize = 15;

/// Storage backend of the weak string cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Sharded concurrent map, per-handle locks
    #[default]
    Concurrent,
    /// One lock around the whole map
    Locking,
}

impl CacheBackend {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "concurrent" => Some(Self::Concurrent),
            "locking" => Some(Self::Locking),
            _ => None,
        }
    }
}

/// Interner configuration options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InternerConfig {
    /// Which cache implementation to use
    pub backend: CacheBackend,

    /// Entry count that triggers the first scavenge; later thresholds
    /// never drop below it
    pub initial_scavenge_threshold: usize,

    /// Gather hit/miss statistics from the start
    pub statistics: bool,

    /// Number of top strings in the diagnostic report
    pub top_strings: usize,

    /// Re-materialize every candidate and compare with the interned result
    pub verify: bool,
}

impl Default for InternerConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Concurrent,
            initial_scavenge_threshold: DEFAULT_SCAVENGE_THRESHOLD,
            statistics: false,
            top_strings: DEFAULT_TOP_STRINGS,
            verify: cfg!(feature = "verify"),
        }
    }
}

impl InternerConfig {
    /// Defaults overlaid with `STRINGTOOLS_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`. Unparsable values are
    /// logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("STRINGTOOLS_CACHE_BACKEND") {
            match CacheBackend::parse(&value) {
                Some(backend) => config.backend = backend,
                None => tracing::warn!("Ignoring STRINGTOOLS_CACHE_BACKEND={}", value),
            }
        }

        if let Some(value) = lookup("STRINGTOOLS_SCAVENGE_THRESHOLD") {
            match value.trim().parse::<usize>() {
                Ok(threshold) if threshold > 0 => config.initial_scavenge_threshold = threshold,
                _ => tracing::warn!("Ignoring STRINGTOOLS_SCAVENGE_THRESHOLD={}", value),
            }
        }

        if let Some(value) = lookup("STRINGTOOLS_DIAGNOSTICS") {
            match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" => config.statistics = true,
                "0" | "false" => config.statistics = false,
                _ => tracing::warn!("Ignoring STRINGTOOLS_DIAGNOSTICS={}", value),
            }
        }

        if let Some(value) = lookup("STRINGTOOLS_TOP_STRINGS") {
            match value.trim().parse::<usize>() {
                Ok(count) => config.top_strings = count,
                Err(_) => tracing::warn!("Ignoring STRINGTOOLS_TOP_STRINGS={}", value),
            }
        }

        config
    }

    pub fn with_backend(mut self, backend: CacheBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_scavenge_threshold(mut self, threshold: usize) -> Self {
        self.initial_scavenge_threshold = threshold.max(1);
        self
    }

    pub fn with_statistics(mut self, enabled: bool) -> Self {
        self.statistics = enabled;
        self
    }

    pub fn with_verify(mut self, enabled: bool) -> Self {
        self.verify = enabled;
        self
    }
}
