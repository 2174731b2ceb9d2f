//! Cached Call Adapter
//!
//! Wraps an async fetch function with read-through caching. The cache key
//! is derived from the call arguments by an explicit key function.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::cache::SharedCache;

type KeyFn<A> = Arc<dyn Fn(&A) -> String + Send + Sync>;
type FetchFn<A, T, E> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;
type SkipFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

// == Cached Fn ==
/// An async function whose results are cached in a shared store.
///
/// Cache problems never reach the caller: an unreadable cached value is a
/// miss and a failed write is only logged.
pub struct CachedFn<A, T, E> {
    cache: SharedCache,
    key_fn: KeyFn<A>,
    fetch: FetchFn<A, T, E>,
    ttl: Option<Duration>,
    skip_if: Option<SkipFn<T>>,
}

impl<A, T, E> Clone for CachedFn<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            key_fn: self.key_fn.clone(),
            fetch: self.fetch.clone(),
            ttl: self.ttl,
            skip_if: self.skip_if.clone(),
        }
    }
}

impl<A, T, E> CachedFn<A, T, E>
where
    T: Serialize + DeserializeOwned,
{
    // == Constructor ==
    /// Creates a cached wrapper around `fetch`.
    ///
    /// # Arguments
    /// * `cache` - Shared cache handle
    /// * `key_fn` - Derives the cache key from the call arguments
    /// * `fetch` - The function to call on a miss
    pub fn new<K, F, Fut>(cache: SharedCache, key_fn: K, fetch: F) -> Self
    where
        K: Fn(&A) -> String + Send + Sync + 'static,
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            cache,
            key_fn: Arc::new(key_fn),
            fetch: Arc::new(move |args| Box::pin(fetch(args))),
            ttl: None,
            skip_if: None,
        }
    }

    /// TTL for cached results; the store default applies otherwise.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Results matching `predicate` are returned but not cached.
    pub fn skip_caching_if<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.skip_if = Some(Arc::new(predicate));
        self
    }

    // == Call ==
    /// Returns the cached result for `args`, fetching and storing it on a miss.
    ///
    /// Fetch errors are returned unchanged and never cached.
    pub async fn call(&self, args: A) -> Result<T, E> {
        let key = (self.key_fn)(&args);

        if let Some(hit) = self.lookup(&key).await {
            return Ok(hit);
        }

        let result = (self.fetch)(args).await?;

        let skip = self.skip_if.as_ref().is_some_and(|skip| skip(&result));
        if skip {
            debug!(key = %key, "Result not cached");
        } else {
            self.store(&key, &result).await;
        }

        Ok(result)
    }

    async fn lookup(&self, key: &str) -> Option<T> {
        let cached = self.cache.write().await.get(key)?;
        match serde_json::from_value(cached) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key = %key, error = %err, "Cached value has unexpected shape, refetching");
                self.cache.write().await.delete(key);
                None
            }
        }
    }

    async fn store(&self, key: &str, result: &T) {
        let value = match serde_json::to_value(result) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %key, error = %err, "Result is not serializable, not cached");
                return;
            }
        };

        if let Err(err) = self.cache.write().await.set(key, value, self.ttl) {
            warn!(key = %key, error = %err, "Cache write failed");
        }
    }
}
