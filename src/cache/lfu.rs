//! LFU Policy Module
//!
//! Implements Least Frequently Used tracking for cache eviction.

use std::collections::HashMap;

use crate::cache::{CacheEntry, EvictionPolicy, EvictionStrategy};

// == LFU Policy ==
/// Tracks access frequency per key.
///
/// Ties on frequency are broken by insertion order, oldest first.
#[derive(Debug, Default)]
pub struct LfuPolicy {
    /// key -> (frequency, insertion sequence)
    counters: HashMap<String, (u64, u64)>,
    next_seq: u64,
}

impl LfuPolicy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EvictionPolicy for LfuPolicy {
    fn strategy(&self) -> EvictionStrategy {
        EvictionStrategy::Lfu
    }

    fn on_insert(&mut self, key: &str) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.counters.insert(key.to_string(), (1, seq));
    }

    // Overwrites keep the accumulated frequency.

    fn on_access(&mut self, key: &str) {
        if let Some((freq, _)) = self.counters.get_mut(key) {
            *freq += 1;
        }
    }

    fn on_remove(&mut self, key: &str) {
        self.counters.remove(key);
    }

    fn choose_eviction_candidates(
        &self,
        n: usize,
        entries: &HashMap<String, CacheEntry>,
    ) -> Vec<String> {
        let mut ranked: Vec<(&String, &(u64, u64))> = self
            .counters
            .iter()
            .filter(|(key, _)| entries.contains_key(key.as_str()))
            .collect();
        ranked.sort_by_key(|(_, (freq, seq))| (*freq, *seq));

        ranked
            .into_iter()
            .take(n)
            .map(|(key, _)| key.clone())
            .collect()
    }
}
