//! Cache Module
//!
//! Provides in-memory caching with TTL expiration, pluggable eviction
//! (LRU, LFU, TTL) and transparent compression of large values.

mod adapter;
pub mod compression;
mod entry;
mod lfu;
mod lru;
mod policy;
mod stats;
mod store;
mod ttl;


use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use adapter::CachedFn;
pub use entry::{CacheEntry, StoredValue};
pub use lfu::LfuPolicy;
pub use lru::LruPolicy;
pub use policy::{EvictionPolicy, EvictionStrategy};
pub use stats::{CacheCounters, CacheStats};
pub use store::CacheStore;
pub use ttl::TtlPolicy;

/// Cache store shared between handlers and background tasks.
///
/// Every operation with side effects, `get` included, takes the write lock.
pub type SharedCache = Arc<RwLock<CacheStore>>;

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
