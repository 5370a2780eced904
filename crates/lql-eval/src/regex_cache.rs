//! Process-wide cache of compiled regex patterns.
//!
//! `~` filters carry their pattern as source text; compilation happens lazily
//! on first use and the compiled form is shared across all routes and worker
//! threads. The cache is bounded: at capacity it is flushed wholesale, which
//! keeps memory O(capacity) while the working set re-warms on the next few
//! events.

use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use regex::Regex;

/// Upper bound on distinct cached patterns.
const MAX_CACHED_PATTERNS: usize = 1024;

static PATTERNS: LazyLock<DashMap<String, Arc<Regex>>> = LazyLock::new(DashMap::new);

/// Compile a pattern through the cache.
///
/// Returns `None` for patterns that fail to compile; invalid patterns are
/// never cached (the parser rejects them at rule creation, so this only
/// happens for rules hand-written into external storage).
pub fn cached_regex(pattern: &str) -> Option<Arc<Regex>> {
    if let Some(entry) = PATTERNS.get(pattern) {
        return Some(entry.value().clone());
    }

    let compiled = Arc::new(Regex::new(pattern).ok()?);
    if PATTERNS.len() >= MAX_CACHED_PATTERNS {
        PATTERNS.clear();
    }
    PATTERNS.insert(pattern.to_string(), compiled.clone());
    Some(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_returns_same_compiled_pattern() {
        let a = cached_regex(r"cache_hit_\d+").unwrap();
        let b = cached_regex(r"cache_hit_\d+").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_invalid_pattern_is_not_cached() {
        assert!(cached_regex("[unclosed").is_none());
        assert!(cached_regex("[unclosed").is_none());
    }

    #[test]
    fn test_cached_pattern_matches() {
        let re = cached_regex(r"^\d{3}$").unwrap();
        assert!(re.is_match("113"));
        assert!(!re.is_match("11z"));
    }
}
