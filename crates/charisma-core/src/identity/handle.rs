//! Sequential handle formatting.

/// Formats a handle as `prefix` followed by `counter` zero-padded to `width`.
///
/// Counters wider than `width` are printed in full rather than truncated, so
/// two distinct counters never produce the same handle.
///
/// # Example
///
/// ```
/// use charisma_core::identity::format_handle;
///
/// assert_eq!(format_handle("user_", 1, 7), "user_0000001");
/// ```
pub fn format_handle(prefix: &str, counter: u64, width: usize) -> String {
    format!("{prefix}{counter:0width$}")
}
