//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! compressions.

use serde::Serialize;

use crate::cache::EvictionStrategy;

// == Cache Counters ==
/// Running counters owned by the store.
#[derive(Debug, Clone, Default)]
pub struct CacheCounters {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries removed to make room
    pub evictions: u64,
    /// Number of values stored compressed
    pub compressions: u64,
}

impl CacheCounters {
    // == Constructor ==
    /// Creates new counters with everything at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Hit rate as a percentage rounded to two decimals.
    ///
    /// Returns 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            let pct = self.hits as f64 / total as f64 * 100.0;
            (pct * 100.0).round() / 100.0
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_compression(&mut self) {
        self.compressions += 1;
    }
}

// == Cache Stats ==
/// Point-in-time snapshot returned by `CacheStore::stats`.
///
/// Serialized verbatim by the `/cache/stats` endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Current number of entries
    pub size: usize,
    /// Maximum number of entries
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    /// Percentage of lookups that were hits
    pub hit_rate: f64,
    pub evictions: u64,
    pub compressions: u64,
    /// Active eviction strategy
    pub strategy: EvictionStrategy,
    /// Human-readable estimate of payload memory
    pub estimated_memory: String,
}

// == Format Bytes ==
/// Renders a byte count as `B`, `KB` or `MB`.
pub fn format_bytes(total: usize) -> String {
    if total < 1024 {
        format!("{} B", total)
    } else if total < 1024 * 1024 {
        format!("{:.1} KB", total as f64 / 1024.0)
    } else {
        format!("{:.1} MB", total as f64 / (1024.0 * 1024.0))
    }
}
