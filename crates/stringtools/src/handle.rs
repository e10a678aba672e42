//! Weak String Handle
//!
//! One weak reference slot. The slot is repointed in place when the cache
//! stores a different string under the same hash code.
//!
//! A dead `Weak<str>` still keeps its allocation (the string bytes) around
//! until the weak reference itself is dropped, which is why the cache frees
//! unused handles when it scavenges.

use std::sync::{Arc, Weak};

use crate::internable::InternableString;

/// Weak reference to an interned string
#[derive(Debug, Default)]
pub struct StringWeakHandle {
    weak: Option<Weak<str>>,
}

impl StringWeakHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle pointing at `value`
    pub fn with_string(value: &Arc<str>) -> Self {
        Self { weak: Some(Arc::downgrade(value)) }
    }

    /// True once a string has been stored and until the handle is freed
    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.weak.is_some()
    }

    /// True iff the referenced string is still alive
    #[inline]
    pub fn is_used(&self) -> bool {
        self.weak.as_ref().is_some_and(|weak| weak.strong_count() > 0)
    }

    /// The referenced string, if it is alive and spells `candidate`.
    ///
    /// Dead and different are both reported as `None`.
    pub fn get_matching_string(&self, candidate: &InternableString<'_>) -> Option<Arc<str>> {
        let target = self.weak.as_ref()?.upgrade()?;
        if candidate.content_equals(&target) {
            Some(target)
        } else {
            None
        }
    }

    /// Point the handle at `value`, replacing any previous target
    pub fn set_string(&mut self, value: &Arc<str>) {
        match &mut self.weak {
            Some(weak) => *weak = Arc::downgrade(value),
            None => self.weak = Some(Arc::downgrade(value)),
        }
    }

    /// Length of the referenced string, if it is alive
    pub fn target_len(&self) -> Option<usize> {
        self.weak.as_ref()?.upgrade().map(|target| target.len())
    }

    /// Release the weak reference
    pub fn free(&mut self) {
        self.weak = None;
    }
}
