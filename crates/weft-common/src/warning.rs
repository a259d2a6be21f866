//! De-duplicated parser diagnostics.
//!
//! Malformed markup is never fatal, so the tokenizer and tree builder report
//! recoverable conditions here. Each distinct message is forwarded to
//! [`log::warn!`] once per process; repeats are dropped.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Log target used for every forwarded warning.
pub const TARGET: &str = "weft";

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

fn warned() -> MutexGuard<'static, Option<HashSet<String>>> {
    // A panic while holding the lock leaves the set intact, so keep using it.
    WARNED.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Report a recoverable condition (logged once per unique message).
///
/// # Example
/// ```
/// weft_common::warning::warn_once("HTML Tokenizer", "duplicate-attribute");
/// ```
pub fn warn_once(component: &str, message: &str) {
    let key = format!("[{component}] {message}");
    let first_time = warned().get_or_insert_with(HashSet::new).insert(key);

    if first_time {
        log::warn!(target: TARGET, "[{component}] {message}");
    }
}

/// Whether `message` has already been reported for `component`.
#[must_use]
pub fn has_warned(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    warned().as_ref().is_some_and(|set| set.contains(&key))
}

/// Clear all recorded warnings (call before parsing an unrelated document)
pub fn clear_warnings() {
    if let Some(set) = warned().as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test only: the warning set is process-global.
    #[test]
    fn test_warn_once_deduplicates_until_cleared() {
        clear_warnings();
        assert!(!has_warned("Test", "first"));

        warn_once("Test", "first");
        warn_once("Test", "first");
        assert!(has_warned("Test", "first"));
        assert!(!has_warned("Other", "first"));

        clear_warnings();
        assert!(!has_warned("Test", "first"));
    }
}
