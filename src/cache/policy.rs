//! Eviction Policy Module
//!
//! Strategy interface used by the store to pick eviction victims. Each
//! policy owns whatever bookkeeping it needs (recency order, frequencies).

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::{CacheEntry, LfuPolicy, LruPolicy, TtlPolicy};

// == Eviction Strategy ==
/// Eviction strategy selected at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EvictionStrategy {
    /// Least recently used
    #[default]
    Lru,
    /// Least frequently used
    Lfu,
    /// Expired first, then oldest by creation time
    Ttl,
}

impl EvictionStrategy {
    /// Builds the policy implementing this strategy.
    pub fn build_policy(self) -> Box<dyn EvictionPolicy> {
        match self {
            EvictionStrategy::Lru => Box::new(LruPolicy::new()),
            EvictionStrategy::Lfu => Box::new(LfuPolicy::new()),
            EvictionStrategy::Ttl => Box::new(TtlPolicy),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionStrategy::Lru => "lru",
            EvictionStrategy::Lfu => "lfu",
            EvictionStrategy::Ttl => "ttl",
        }
    }
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvictionStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionStrategy::Lru),
            "lfu" => Ok(EvictionStrategy::Lfu),
            "ttl" => Ok(EvictionStrategy::Ttl),
            other => Err(format!("unknown eviction strategy '{}'", other)),
        }
    }
}

// == Eviction Policy ==
/// Bookkeeping hooks and victim selection for one eviction strategy.
///
/// The store calls the hooks on every insert, read and removal so the
/// policy's auxiliary structures always mirror the set of stored keys.
pub trait EvictionPolicy: fmt::Debug + Send + Sync {
    /// Strategy this policy implements.
    fn strategy(&self) -> EvictionStrategy;

    /// A new key was stored.
    fn on_insert(&mut self, key: &str);

    /// An existing key was overwritten.
    fn on_update(&mut self, _key: &str) {}

    /// A stored key was read.
    fn on_access(&mut self, key: &str);

    /// A key left the store (delete, expiry or eviction).
    fn on_remove(&mut self, key: &str);

    /// Picks up to `n` keys to evict, best victim first.
    fn choose_eviction_candidates(
        &self,
        n: usize,
        entries: &HashMap<String, CacheEntry>,
    ) -> Vec<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!("lru".parse::<EvictionStrategy>(), Ok(EvictionStrategy::Lru));
        assert_eq!(" LFU ".parse::<EvictionStrategy>(), Ok(EvictionStrategy::Lfu));
        assert_eq!("ttl".parse::<EvictionStrategy>(), Ok(EvictionStrategy::Ttl));
        assert!("write_behind".parse::<EvictionStrategy>().is_err());
    }

    #[test]
    fn test_strategy_serializes_lowercase() {
        let json = serde_json::to_string(&EvictionStrategy::Lfu).unwrap();
        assert_eq!(json, "\"lfu\"");
    }

    #[test]
    fn test_build_policy_matches_strategy() {
        for strategy in [
            EvictionStrategy::Lru,
            EvictionStrategy::Lfu,
            EvictionStrategy::Ttl,
        ] {
            assert_eq!(strategy.build_policy().strategy(), strategy);
        }
    }
}
