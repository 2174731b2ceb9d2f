//! TTL Policy Module
//!
//! Evicts expired entries first, then the oldest by creation time. Needs no
//! bookkeeping of its own; everything is read from entry metadata.

use std::collections::HashMap;

use crate::cache::{CacheEntry, EvictionPolicy, EvictionStrategy};

#[derive(Debug, Default, Clone, Copy)]
pub struct TtlPolicy;

impl EvictionPolicy for TtlPolicy {
    fn strategy(&self) -> EvictionStrategy {
        EvictionStrategy::Ttl
    }

    fn on_insert(&mut self, _key: &str) {}

    fn on_access(&mut self, _key: &str) {}

    fn on_remove(&mut self, _key: &str) {}

    fn choose_eviction_candidates(
        &self,
        n: usize,
        entries: &HashMap<String, CacheEntry>,
    ) -> Vec<String> {
        let mut by_age: Vec<(&String, &CacheEntry)> = entries.iter().collect();
        by_age.sort_by_key(|(_, entry)| entry.created_at);

        // Stable partition: expired (oldest first), then live (oldest first)
        let (expired, live): (Vec<_>, Vec<_>) =
            by_age.into_iter().partition(|(_, entry)| entry.is_expired());

        expired
            .into_iter()
            .chain(live)
            .take(n)
            .map(|(key, _)| key.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StoredValue;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    fn entry(ttl: Option<Duration>) -> CacheEntry {
        CacheEntry::new(StoredValue::Plain(json!(1)), ttl)
    }

    #[test]
    fn test_ttl_prefers_expired_entries() {
        let mut entries = HashMap::new();
        entries.insert("old_live".to_string(), entry(None));
        sleep(Duration::from_millis(2));
        entries.insert(
            "short".to_string(),
            entry(Some(Duration::from_millis(5))),
        );
        sleep(Duration::from_millis(15));
        entries.insert("new_live".to_string(), entry(None));

        let victims = TtlPolicy.choose_eviction_candidates(1, &entries);
        assert_eq!(victims, vec!["short"]);
    }

    #[test]
    fn test_ttl_falls_back_to_oldest_created() {
        let mut entries = HashMap::new();
        entries.insert("first".to_string(), entry(None));
        sleep(Duration::from_millis(2));
        entries.insert("second".to_string(), entry(None));
        sleep(Duration::from_millis(2));
        entries.insert("third".to_string(), entry(None));

        let victims = TtlPolicy.choose_eviction_candidates(2, &entries);
        assert_eq!(victims, vec!["first", "second"]);
    }

    #[test]
    fn test_ttl_expired_then_oldest() {
        let mut entries = HashMap::new();
        entries.insert("a".to_string(), entry(None));
        sleep(Duration::from_millis(2));
        entries.insert("b".to_string(), entry(Some(Duration::from_millis(5))));
        sleep(Duration::from_millis(2));
        entries.insert("c".to_string(), entry(None));
        sleep(Duration::from_millis(10));

        let victims = TtlPolicy.choose_eviction_candidates(2, &entries);
        assert_eq!(victims, vec!["b", "a"]);
    }
}
