use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Mutex;

/// Deduplicates diagnostics so a given key is logged at most once per registry.
pub struct WarnOnce<K> {
    seen: Mutex<HashSet<K>>,
}

impl<K: Eq + Hash> WarnOnce<K> {
    pub fn new() -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
        }
    }

    /// Record `key`; returns `true` only the first time the key is seen.
    pub fn first(&self, key: K) -> bool {
        match self.seen.lock() {
            Ok(mut seen) => seen.insert(key),
            // A poisoned set still holds valid keys.
            Err(poisoned) => poisoned.into_inner().insert(key),
        }
    }

    /// Number of distinct keys that have been warned about.
    #[cfg(test)]
    pub fn emitted(&self) -> usize {
        match self.seen.lock() {
            Ok(seen) => seen.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

impl<K: Eq + Hash> Default for WarnOnce<K> {
    fn default() -> Self {
        Self::new()
    }
}
