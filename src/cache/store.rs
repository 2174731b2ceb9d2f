//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with a pluggable eviction
//! policy, TTL expiration and transparent compression.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::stats::format_bytes;
use crate::cache::{
    compression, CacheCounters, CacheEntry, CacheStats, EvictionPolicy, EvictionStrategy,
    MAX_KEY_LENGTH,
};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Main cache storage with strategy-driven eviction and TTL support.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Eviction bookkeeping for the configured strategy
    policy: Box<dyn EvictionPolicy>,
    /// Performance counters
    counters: CacheCounters,
    /// Maximum number of entries allowed
    capacity: usize,
    /// TTL applied to entries stored without an explicit one
    default_ttl: Option<Duration>,
    /// Whether large values are compressed
    compression: bool,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a new LRU CacheStore with compression enabled.
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of entries (at least 1)
    /// * `default_ttl` - TTL for entries stored without an explicit TTL
    pub fn new(capacity: usize, default_ttl: Option<Duration>) -> Self {
        Self {
            entries: HashMap::new(),
            policy: EvictionStrategy::Lru.build_policy(),
            counters: CacheCounters::new(),
            capacity: capacity.max(1),
            default_ttl,
            compression: true,
        }
    }

    /// Switches the eviction strategy. Intended for construction time.
    pub fn with_strategy(mut self, strategy: EvictionStrategy) -> Self {
        let mut policy = strategy.build_policy();
        for key in self.entries.keys() {
            policy.on_insert(key);
        }
        self.policy = policy;
        self
    }

    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compression = enabled;
        self
    }

    // == Set ==
    /// Stores a value with optional TTL.
    ///
    /// Overwriting an existing key never evicts. Inserting a new key into a
    /// full store evicts exactly one entry first, chosen by the strategy.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (uses the store default if None)
    pub fn set(&mut self, key: impl Into<String>, value: Value, ttl: Option<Duration>) -> Result<()> {
        let key = key.into();
        validate_key(&key)?;

        // Encode first so a failing value never costs an eviction
        let (stored, compressed) = compression::encode(value, self.compression)?;

        let is_overwrite = self.entries.contains_key(&key);
        if !is_overwrite && self.entries.len() >= self.capacity {
            self.evict(1);
        }

        if compressed {
            self.counters.record_compression();
        }

        let effective_ttl = ttl.or(self.default_ttl);
        self.entries
            .insert(key.clone(), CacheEntry::new(stored, effective_ttl));

        if is_overwrite {
            self.policy.on_update(&key);
        } else {
            self.policy.on_insert(&key);
        }

        debug!(key = %key, ttl = ?effective_ttl, compressed, "Cache set");
        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None if the key is unknown or expired; expired entries are
    /// removed. A payload that cannot be decoded is dropped and treated as a
    /// miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.counters.record_miss();
                debug!(key = %key, "Cache miss");
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.counters.record_miss();
            debug!(key = %key, "Cache expired");
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.touch();

        match compression::decode(&entry.value) {
            Ok(value) => {
                self.policy.on_access(key);
                self.counters.record_hit();
                debug!(key = %key, "Cache hit");
                Some(value)
            }
            Err(err) => {
                warn!(key = %key, error = %err, "Dropping undecodable cache entry");
                self.remove_entry(key);
                self.counters.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        if removed {
            debug!(key = %key, "Cache delete");
        }
        removed
    }

    // == Evict ==
    /// Removes up to `n` entries chosen by the eviction strategy.
    ///
    /// Returns the number of entries evicted.
    pub fn evict(&mut self, n: usize) -> usize {
        let victims = self.policy.choose_eviction_candidates(n, &self.entries);
        let mut evicted = 0;

        for key in victims {
            if self.remove_entry(&key) {
                self.counters.record_eviction();
                evicted += 1;
                debug!(key = %key, strategy = %self.policy.strategy(), "Cache evict");
            }
        }

        evicted
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.remove_entry(&key);
        }

        count
    }

    // == Stats ==
    /// Returns a snapshot of cache statistics.
    pub fn stats(&self) -> CacheStats {
        let payload_bytes: usize = self
            .entries
            .values()
            .map(|entry| entry.value.stored_size())
            .sum();

        CacheStats {
            size: self.entries.len(),
            capacity: self.capacity,
            hits: self.counters.hits,
            misses: self.counters.misses,
            hit_rate: self.counters.hit_rate(),
            evictions: self.counters.evictions,
            compressions: self.counters.compressions,
            strategy: self.policy.strategy(),
            estimated_memory: format_bytes(payload_bytes),
        }
    }

    /// Returns true if a live or expired entry exists, without touching it.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn strategy(&self) -> EvictionStrategy {
        self.policy.strategy()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.policy.on_remove(key);
            true
        } else {
            false
        }
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidKey(format!(
            "key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
