//! Process-wide interning entry points
//!
//! The global interner is created on first use from
//! [`InternerConfig::from_env`].

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::builder::SpanBasedStringBuilder;
use crate::config::InternerConfig;
use crate::interner::{EMPTY, WeakStringCacheInterner};

static INTERNER: Lazy<WeakStringCacheInterner> =
    Lazy::new(|| WeakStringCacheInterner::new(InternerConfig::from_env()));

/// The interner behind the functions in this module
pub fn global_interner() -> &'static WeakStringCacheInterner {
    &INTERNER
}

/// Canonical copy of `value`
pub fn weak_intern(value: &str) -> Arc<str> {
    INTERNER.intern_str(value)
}

/// Canonical copy of `value`; `value` itself becomes canonical on a miss
pub fn weak_intern_arc(value: &Arc<str>) -> Arc<str> {
    INTERNER.intern_arc(value)
}

/// Canonical copy of the concatenation of `spans`
pub fn weak_intern_spans(spans: &[&str]) -> Arc<str> {
    INTERNER.intern_spans(spans)
}

/// Builder backed by this thread's pooled span storage
pub fn get_span_based_builder<'a>() -> SpanBasedStringBuilder<'a> {
    SpanBasedStringBuilder::new()
}

/// Return a builder's storage to this thread's pool.
///
/// Equivalent to dropping it.
pub fn return_span_based_builder(builder: SpanBasedStringBuilder<'_>) {
    drop(builder);
}

pub fn enable_diagnostics() {
    INTERNER.enable_statistics();
}

pub fn create_diagnostic_report() -> String {
    INTERNER.format_statistics()
}

/// The shared empty string
pub fn empty() -> Arc<str> {
    Arc::clone(&EMPTY)
}
