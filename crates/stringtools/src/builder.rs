//! Span-Based String Builder
//!
//! A rope of borrowed `&str` spans. Appending and trimming never copy
//! characters; the builder cannot outlive the text it points into. The
//! builder's string form is the interned string, so building a key from
//! pieces that already exist costs no allocation on a cache hit.
//!
//! # Example
//! ```rust
//! use stringtools::SpanBasedStringBuilder;
//!
//! let line = String::from("  Configuration=Debug  ");
//! let mut builder = SpanBasedStringBuilder::new();
//! builder.append(&line);
//! builder.trim();
//! assert_eq!(builder.len(), "Configuration=Debug".len());
//! assert!(builder == *"Configuration=Debug");
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::error::{Result, StringToolsError};
use crate::internable::{Chars, InternableString};
use crate::{cold_path, pool};

/// Rope of borrowed spans, pooled per thread
pub struct SpanBasedStringBuilder<'a> {
    spans: Vec<&'a str>,
    /// Sum of span lengths in bytes
    len: usize,
}

impl<'a> SpanBasedStringBuilder<'a> {
    /// Create an empty builder, reusing this thread's pooled storage
    pub fn new() -> Self {
        Self { spans: pool::take_spans(), len: 0 }
    }

    /// Create an empty builder able to hold `capacity` spans
    pub fn with_capacity(capacity: usize) -> Self {
        let mut builder = Self::new();
        builder.spans.reserve(capacity);
        builder
    }

    /// Append a whole string as one span. Empty strings are ignored.
    pub fn append(&mut self, value: &'a str) -> &mut Self {
        if !value.is_empty() {
            self.spans.push(value);
            self.len += value.len();
        }
        self
    }

    /// Append `count` bytes of `value` starting at byte `start`
    pub fn append_substring(&mut self, value: &'a str, start: usize, count: usize) -> Result<&mut Self> {
        let end = match start.checked_add(count) {
            Some(end) if end <= value.len() => end,
            _ => {
                return cold_path(|| {
                    Err(StringToolsError::InvalidRange { start, count, len: value.len() })
                });
            }
        };

        for index in [start, end] {
            if !value.is_char_boundary(index) {
                return cold_path(|| Err(StringToolsError::NotCharBoundary { index }));
            }
        }

        Ok(self.append(&value[start..end]))
    }

    /// Drop leading whitespace, removing spans that become empty
    pub fn trim_start(&mut self) -> &mut Self {
        let mut emptied = 0;
        for span in self.spans.iter_mut() {
            let current: &'a str = *span;
            let trimmed = current.trim_start();
            self.len -= current.len() - trimmed.len();
            *span = trimmed;
            if !trimmed.is_empty() {
                break;
            }
            emptied += 1;
        }
        self.spans.drain(..emptied);
        self
    }

    /// Drop trailing whitespace, removing spans that become empty
    pub fn trim_end(&mut self) -> &mut Self {
        while let Some(last) = self.spans.last_mut() {
            let current: &'a str = *last;
            let trimmed = current.trim_end();
            self.len -= current.len() - trimmed.len();
            if trimmed.is_empty() {
                self.spans.pop();
            } else {
                *last = trimmed;
                break;
            }
        }
        self
    }

    pub fn trim(&mut self) -> &mut Self {
        self.trim_start().trim_end()
    }

    /// Length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of spans that fit without reallocating
    pub fn capacity(&self) -> usize {
        self.spans.capacity()
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    pub fn spans(&self) -> &[&'a str] {
        &self.spans
    }

    /// Characters across all spans
    pub fn chars(&self) -> Chars<'_> {
        Chars::over(&self.spans)
    }

    pub fn content_equals(&self, other: &str) -> bool {
        self.as_internable().content_equals(other)
    }

    pub fn hash_code(&self) -> u32 {
        self.as_internable().hash_code()
    }

    /// View the current content as an interning candidate
    pub fn as_internable(&self) -> InternableString<'_> {
        InternableString::from_spans_with_len(&self.spans, self.len)
    }

    /// Contiguous form; borrows when there is at most one span
    pub fn materialize(&self) -> Cow<'a, str> {
        match self.spans.as_slice() {
            [] => Cow::Borrowed(""),
            [single] => Cow::Borrowed(*single),
            spans => Cow::Owned(spans.concat()),
        }
    }

    /// Intern the content through the process-wide interner
    pub fn intern(&self) -> Arc<str> {
        crate::strings::global_interner().intern(&self.as_internable())
    }

    /// Remove all spans, keeping capacity
    pub fn clear(&mut self) {
        self.spans.clear();
        self.len = 0;
    }
}

impl Default for SpanBasedStringBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SpanBasedStringBuilder<'_> {
    fn drop(&mut self) {
        pool::give_back(std::mem::take(&mut self.spans));
    }
}

impl<'a> From<&'a str> for SpanBasedStringBuilder<'a> {
    fn from(value: &'a str) -> Self {
        let mut builder = Self::new();
        builder.append(value);
        builder
    }
}

impl<'a> Extend<&'a str> for SpanBasedStringBuilder<'a> {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for span in iter {
            self.append(span);
        }
    }
}

impl PartialEq<str> for SpanBasedStringBuilder<'_> {
    fn eq(&self, other: &str) -> bool {
        self.content_equals(other)
    }
}

impl fmt::Display for SpanBasedStringBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.spans.iter().try_for_each(|span| f.write_str(span))
    }
}

impl fmt::Debug for SpanBasedStringBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpanBasedStringBuilder")
            .field("spans", &self.spans)
            .field("len", &self.len)
            .finish()
    }
}
