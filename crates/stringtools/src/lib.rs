//! stringtools
//!
//! Weak string interning for build tools and other processes that see the
//! same strings over and over.
//!
//! # Goals
//! - One allocation per distinct live string
//! - No strong roots: interned strings are freed when their last user drops them
//! - Build keys from borrowed pieces without concatenating on a cache hit
//!
//! # Features
//! - `verify`: re-check every interned result against its candidate
//! - `mimalloc`: use mimalloc as the global allocator
//!
//! # Example
//! ```rust
//! use std::sync::Arc;
//! use stringtools::strings;
//!
//! let line = String::from("Configuration=Debug");
//! let mut builder = strings::get_span_based_builder();
//! builder.append_substring(&line, 0, 13).unwrap();
//!
//! let key = builder.intern();
//! assert!(Arc::ptr_eq(&key, &strings::weak_intern("Configuration")));
//! ```

mod builder;
mod config;
mod error;
mod handle;
mod internable;
mod interner;
mod pool;
pub mod cache;
pub mod cold;
pub mod strings;

pub use builder::SpanBasedStringBuilder;
pub use cache::{
    CacheStatistics, ConcurrentWeakStringCache, LockingWeakStringCache, WeakStringCache, new_cache,
};
pub use cold::{cold_path, consistency_panic};
pub use config::{CacheBackend, DEFAULT_SCAVENGE_THRESHOLD, DEFAULT_TOP_STRINGS, InternerConfig};
pub use error::{Result, StringToolsError};
pub use handle::StringWeakHandle;
pub use internable::{Chars, InternableString};
pub use interner::{InternStatisticsSnapshot, TopString, WeakStringCacheInterner};
pub use pool::{PoolStats, pool_stats};

// Stable fingerprints
pub use stringtools_hash::{
    HashError, combine64, compute_hash32, compute_hash64, compute_hash64_fast, hash32_bytes,
    hash64_bytes,
};

#[cfg(feature = "mimalloc")]
use mimalloc::MiMalloc;

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
