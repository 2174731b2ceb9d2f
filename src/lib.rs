//! Catalog Resilience - caching and fault tolerance for a library catalog
//!
//! Provides an adaptive in-memory cache (LRU/LFU/TTL eviction, compression),
//! sliding-window circuit breakers, and a resilient fan-out that enriches
//! book records from several external APIs.

pub mod api;
pub mod cache;
pub mod config;
pub mod enrichment;
pub mod error;
pub mod models;
pub mod resilience;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
