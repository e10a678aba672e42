//! Error types

/// Errors surfaced by builders and the interner
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StringToolsError {
    #[error("Range {start}..{start}+{count} is outside a string of length {len}")]
    InvalidRange { start: usize, count: usize, len: usize },

    #[error("Index {index} is not on a UTF-8 character boundary")]
    NotCharBoundary { index: usize },

    #[error("Interned string {interned:?} does not match candidate {expected:?}")]
    InternMismatch { interned: String, expected: String },
}

/// Result alias for stringtools operations
pub type Result<T> = std::result::Result<T, StringToolsError>;
