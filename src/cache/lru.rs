//! LRU Policy Module
//!
//! Implements Least Recently Used tracking for cache eviction.

use std::collections::{HashMap, VecDeque};

use crate::cache::{CacheEntry, EvictionPolicy, EvictionStrategy};

// == LRU Policy ==
/// Tracks access order for LRU eviction.
///
/// Keys are stored in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug, Default)]
pub struct LruPolicy {
    /// Order of keys by access time
    order: VecDeque<String>,
}

impl LruPolicy {
    // == Constructor ==
    /// Creates a new empty LRU policy.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Touch ==
    /// Marks a key as recently used (moves to front).
    fn touch(&mut self, key: &str) {
        self.remove(key);
        self.order.push_front(key.to_string());
    }

    // == Remove ==
    /// Removes a key from the tracker.
    fn remove(&mut self, key: &str) {
        if let Some(pos) = self.order.iter().position(|k| k == key) {
            self.order.remove(pos);
        }
    }

}

impl EvictionPolicy for LruPolicy {
    fn strategy(&self) -> EvictionStrategy {
        EvictionStrategy::Lru
    }

    fn on_insert(&mut self, key: &str) {
        self.touch(key);
    }

    fn on_update(&mut self, key: &str) {
        self.touch(key);
    }

    fn on_access(&mut self, key: &str) {
        self.touch(key);
    }

    fn on_remove(&mut self, key: &str) {
        self.remove(key);
    }

    fn choose_eviction_candidates(
        &self,
        n: usize,
        entries: &HashMap<String, CacheEntry>,
    ) -> Vec<String> {
        self.order
            .iter()
            .rev()
            .filter(|key| entries.contains_key(key.as_str()))
            .take(n)
            .cloned()
            .collect()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StoredValue;
    use serde_json::json;

    fn entries_for(keys: &[&str]) -> HashMap<String, CacheEntry> {
        keys.iter()
            .map(|k| {
                (
                    k.to_string(),
                    CacheEntry::new(StoredValue::Plain(json!(k)), None),
                )
            })
            .collect()
    }

    #[test]
    fn test_lru_new() {
        let lru = LruPolicy::new();
        assert!(lru.order.is_empty());
        assert!(lru
            .choose_eviction_candidates(1, &HashMap::new())
            .is_empty());
    }

    #[test]
    fn test_lru_touch_existing_key() {
        let mut lru = LruPolicy::new();
        let entries = entries_for(&["key1", "key2", "key3"]);

        lru.on_insert("key1");
        lru.on_insert("key2");
        lru.on_insert("key3");

        // Access key1 again - should move to front
        lru.on_access("key1");

        assert_eq!(lru.order.len(), 3);
        assert_eq!(lru.choose_eviction_candidates(1, &entries), vec!["key2"]);
    }

    #[test]
    fn test_lru_candidates_oldest_first() {
        let mut lru = LruPolicy::new();
        let entries = entries_for(&["a", "b", "c"]);

        lru.on_insert("a");
        lru.on_insert("b");
        lru.on_insert("c");
        lru.on_access("a");

        assert_eq!(
            lru.choose_eviction_candidates(2, &entries),
            vec!["b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn test_lru_candidates_capped_by_len() {
        let mut lru = LruPolicy::new();
        let entries = entries_for(&["a"]);
        lru.on_insert("a");

        assert_eq!(lru.choose_eviction_candidates(5, &entries).len(), 1);
        assert!(lru
            .choose_eviction_candidates(0, &entries)
            .is_empty());
    }

    #[test]
    fn test_lru_update_moves_to_front() {
        let mut lru = LruPolicy::new();
        let entries = entries_for(&["a", "b"]);

        lru.on_insert("a");
        lru.on_insert("b");
        lru.on_update("a");

        assert_eq!(lru.choose_eviction_candidates(2, &entries), vec!["b", "a"]);
    }

    #[test]
    fn test_lru_remove() {
        let mut lru = LruPolicy::new();
        let entries = entries_for(&["key1", "key2"]);

        lru.on_insert("key1");
        lru.on_insert("key2");
        lru.on_remove("key1");
        lru.on_remove("nonexistent");

        assert_eq!(lru.order.len(), 1);
        assert_eq!(lru.choose_eviction_candidates(2, &entries), vec!["key2"]);
    }

    #[test]
    fn test_lru_touch_same_key_multiple_times() {
        let mut lru = LruPolicy::new();

        lru.touch("key1");
        lru.touch("key1");
        lru.touch("key1");

        assert_eq!(lru.order.len(), 1);
    }
}
