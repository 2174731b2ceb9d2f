//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with access metadata
//! and optional TTL.

use std::time::{Duration, Instant};

use serde_json::Value;

// == Stored Value ==
/// Payload as held by the store.
///
/// Large values are kept gzip-compressed; callers only ever see the
/// logical `Value`.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// Uncompressed value
    Plain(Value),
    /// Gzip-compressed JSON encoding of the value
    Compressed {
        data: Vec<u8>,
        original_size: usize,
    },
}

impl StoredValue {
    /// Approximate number of bytes held for this payload.
    pub fn stored_size(&self) -> usize {
        match self {
            StoredValue::Plain(value) => serde_json::to_vec(value).map(|v| v.len()).unwrap_or(1024),
            StoredValue::Compressed { data, .. } => data.len(),
        }
    }
}

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload
    pub value: StoredValue,
    /// Creation time
    pub created_at: Instant,
    /// Last read or write time
    pub accessed_at: Instant,
    /// Number of accesses, starting at 1 on insert
    pub access_count: u64,
    /// Time to live, None = no expiration
    pub ttl: Option<Duration>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The payload to store
    /// * `ttl` - Optional time to live
    pub fn new(value: StoredValue, ttl: Option<Duration>) -> Self {
        let now = Instant::now();

        Self {
            value,
            created_at: now,
            accessed_at: now,
            access_count: 1,
            ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once strictly more than `ttl` has elapsed since
    /// creation. Reads do not extend the lifetime.
    pub fn is_expired(&self) -> bool {
        match self.ttl {
            Some(ttl) => self.created_at.elapsed() > ttl,
            None => false,
        }
    }

    // == Touch ==
    /// Records a read access.
    pub fn touch(&mut self) {
        self.accessed_at = Instant::now();
        self.access_count += 1;
    }
}
