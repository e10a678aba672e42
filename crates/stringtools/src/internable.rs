//! Interning Candidates
//!
//! A borrowed view of a string that may not exist as one contiguous
//! allocation yet. Length, hashing and equality work span by span, so a
//! cache hit never concatenates anything.

use std::fmt;
use std::sync::Arc;

/// djb2 seed
const HASH_SEED: u32 = 5381;

#[derive(Clone, Copy)]
enum Source<'a> {
    /// Existing shared string, can be returned as-is
    Shared(&'a Arc<str>),
    /// Single contiguous borrow
    Borrowed(&'a str),
    /// Ordered spans, not yet concatenated
    Spans(&'a [&'a str]),
}

/// A string candidate for interning
#[derive(Clone, Copy)]
pub struct InternableString<'a> {
    source: Source<'a>,
    /// Total length in bytes
    len: usize,
}

impl<'a> InternableString<'a> {
    /// Wrap an existing shared string (zero-copy on a cache miss)
    pub fn from_arc(value: &'a Arc<str>) -> Self {
        Self { source: Source::Shared(value), len: value.len() }
    }

    /// Wrap a borrowed string
    pub fn new(value: &'a str) -> Self {
        Self { source: Source::Borrowed(value), len: value.len() }
    }

    /// Wrap a sequence of spans
    pub fn from_spans(spans: &'a [&'a str]) -> Self {
        let len = spans.iter().map(|s| s.len()).sum();
        Self { source: Source::Spans(spans), len }
    }

    /// Spans whose total length is already known to the caller
    pub(crate) fn from_spans_with_len(spans: &'a [&'a str], len: usize) -> Self {
        debug_assert_eq!(len, spans.iter().map(|s| s.len()).sum::<usize>());
        Self { source: Source::Spans(spans), len }
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

    /// Characters of every span, in order
    pub fn chars(&self) -> Chars<'a> {
        match self.source {
            Source::Shared(value) => Chars { current: value.chars(), rest: &[] },
            Source::Borrowed(value) => Chars { current: value.chars(), rest: &[] },
            Source::Spans(spans) => Chars::over(spans),
        }
    }

    /// Iterate the underlying spans
    fn for_each_span<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&str) -> bool,
    {
        match self.source {
            Source::Shared(value) => f(&**value),
            Source::Borrowed(value) => f(value),
            Source::Spans(spans) => spans.iter().all(|span| f(span)),
        }
    }

    /// True iff the candidate spells exactly `other`
    pub fn content_equals(&self, other: &str) -> bool {
        if self.len != other.len() {
            return false;
        }

        let other = other.as_bytes();
        let mut offset = 0;
        self.for_each_span(|span| {
            let end = offset + span.len();
            let matches = other[offset..end] == *span.as_bytes();
            offset = end;
            matches
        })
    }

    /// True iff this candidate wraps exactly the allocation behind `value`
    pub fn reference_equals(&self, value: &Arc<str>) -> bool {
        let view: &str = match self.source {
            Source::Shared(shared) => &**shared,
            Source::Borrowed(borrowed) => borrowed,
            Source::Spans([single]) => *single,
            Source::Spans(_) => return false,
        };
        std::ptr::eq(view.as_ptr(), value.as_ptr()) && view.len() == value.len()
    }

    /// djb2-xor hash over characters, independent of the span layout
    pub fn hash_code(&self) -> u32 {
        self.chars()
            .fold(HASH_SEED, |hash, ch| hash.wrapping_mul(33) ^ ch as u32)
    }

    /// Materialize into a shared string. The only allocating operation;
    /// a wrapped `Arc<str>` is returned without copying.
    pub fn to_arc(&self) -> Arc<str> {
        match self.source {
            Source::Shared(value) => Arc::clone(value),
            Source::Borrowed(value) => Arc::from(value),
            Source::Spans([single]) => Arc::from(*single),
            Source::Spans(_) => Arc::from(self.to_owned_string()),
        }
    }

    /// Independent owned copy of the content
    pub fn to_owned_string(&self) -> String {
        let mut out = String::with_capacity(self.len);
        self.for_each_span(|span| {
            out.push_str(span);
            true
        });
        out
    }
}

impl<'a> From<&'a str> for InternableString<'a> {
    fn from(value: &'a str) -> Self {
        Self::new(value)
    }
}

impl<'a> From<&'a Arc<str>> for InternableString<'a> {
    fn from(value: &'a Arc<str>) -> Self {
        Self::from_arc(value)
    }
}

impl PartialEq<str> for InternableString<'_> {
    fn eq(&self, other: &str) -> bool {
        self.content_equals(other)
    }
}

impl fmt::Display for InternableString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut result = Ok(());
        self.for_each_span(|span| {
            result = f.write_str(span);
            result.is_ok()
        });
        result
    }
}

impl fmt::Debug for InternableString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InternableString({:?})", self.to_owned_string())
    }
}

/// Forward-only character iterator across spans
#[derive(Clone)]
pub struct Chars<'a> {
    current: std::str::Chars<'a>,
    rest: &'a [&'a str],
}

impl<'a> Chars<'a> {
    pub(crate) fn over(spans: &'a [&'a str]) -> Self {
        match spans.split_first() {
            Some((first, rest)) => Chars { current: first.chars(), rest },
            None => Chars { current: "".chars(), rest: &[] },
        }
    }
}

impl Iterator for Chars<'_> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        loop {
            if let Some(ch) = self.current.next() {
                return Some(ch);
            }
            let (next, rest) = self.rest.split_first()?;
            self.current = next.chars();
            self.rest = rest;
        }
    }
}

impl std::iter::FusedIterator for Chars<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_is_sum_of_spans() {
        let spans = ["foo", "", "bar"];
        let candidate = InternableString::from_spans(&spans);
        assert_eq!(candidate.len(), 6);
        assert!(!candidate.is_empty());
    }

    #[test]
    fn test_chars_cross_spans() {
        let spans = ["", "ab", "", "c", ""];
        let candidate = InternableString::from_spans(&spans);
        assert_eq!(candidate.chars().collect::<String>(), "abc");
        // Fresh iterator each call
        assert_eq!(candidate.chars().count(), 3);
    }

    #[test]
    fn test_content_equals() {
        let spans = ["hel", "lo"];
        let candidate = InternableString::from_spans(&spans);
        assert!(candidate.content_equals("hello"));
        assert!(!candidate.content_equals("hellO"));
        assert!(!candidate.content_equals("hell"));
        assert!(candidate == *"hello");
    }

    #[test]
    fn test_hash_independent_of_layout() {
        let whole = InternableString::new("foobar");
        let spans = ["f", "oob", "ar"];
        let split = InternableString::from_spans(&spans);
        assert_eq!(whole.hash_code(), split.hash_code());
    }

    #[test]
    fn test_known_hash_values() {
        assert_eq!(InternableString::new("").hash_code(), 5381);
        assert_eq!(InternableString::new("ab").hash_code(), 5_860_902);
        assert_eq!(InternableString::new("hello").hash_code(), 0x0A9C_EDE7);
    }

    #[test]
    fn test_shared_materialize_is_zero_copy() {
        let value: Arc<str> = Arc::from("shared");
        let candidate = InternableString::from_arc(&value);
        let out = candidate.to_arc();
        assert!(Arc::ptr_eq(&value, &out));
        assert!(candidate.reference_equals(&value));
    }

    #[test]
    fn test_spans_materialize() {
        let spans = ["a", "b", "c"];
        let candidate = InternableString::from_spans(&spans);
        assert_eq!(&*candidate.to_arc(), "abc");
        assert_eq!(candidate.to_string(), "abc");
        assert!(!candidate.reference_equals(&candidate.to_arc()));
    }

    #[test]
    fn test_reference_equals_by_bytes() {
        let value: Arc<str> = Arc::from("canonical");
        let copy = String::from("canonical");

        assert!(InternableString::new(&value).reference_equals(&value));
        let single = [&*value];
        assert!(InternableString::from_spans(&single).reference_equals(&value));

        assert!(!InternableString::new(&copy).reference_equals(&value));
        // Same start, shorter view
        assert!(!InternableString::new(&value[..5]).reference_equals(&value));
        let split = [&value[..5], &value[5..]];
        assert!(!InternableString::from_spans(&split).reference_equals(&value));
    }

    #[test]
    fn test_multibyte_spans() {
        let spans = ["日本", "語"];
        let candidate = InternableString::from_spans(&spans);
        assert!(candidate.content_equals("日本語"));
        assert_eq!(
            candidate.hash_code(),
            InternableString::new("日本語").hash_code()
        );
    }
}
