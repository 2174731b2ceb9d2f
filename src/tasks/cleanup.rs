//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task sleeps for `interval` between runs and holds the write lock only
/// for the sweep itself.
///
/// # Arguments
/// * `cache` - Shared handle to the cache store
/// * `interval` - Time between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_cleanup_task(cache: SharedCache, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = interval.as_secs_f64(),
            "Starting TTL cleanup task"
        );

        loop {
            tokio::time::sleep(interval).await;

            let (removed, remaining) = {
                let mut cache_guard = cache.write().await;
                let removed = cache_guard.cleanup_expired();
                (removed, cache_guard.len())
            };

            if removed > 0 {
                info!(removed, remaining, "TTL cleanup removed expired entries");
            } else {
                debug!(remaining, "TTL cleanup: no expired entries found");
            }
        }
    })
}
