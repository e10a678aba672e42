//! Cold path helpers.
//!
//! Error construction and consistency failures are kept out of line so the
//! interning hot path stays small.

/// Mark a closure as cold (rarely executed).
///
/// # Example
/// ```rust
/// use stringtools::cold_path;
///
/// fn validate(value: i32) -> Result<i32, &'static str> {
///     if value < 0 {
///         cold_path(|| Err("negative value"))
///     } else {
///         Ok(value)
///     }
/// }
/// # assert!(validate(-1).is_err());
/// ```
#[inline(always)]
#[cold]
pub fn cold_path<F: FnOnce() -> R, R>(f: F) -> R {
    f()
}

/// Abort the current operation on an internal consistency failure.
///
/// # Panics
/// Always panics with the error's message.
#[inline(never)]
#[cold]
pub fn consistency_panic(error: crate::StringToolsError) -> ! {
    panic!("internal consistency error: {}", error)
}
