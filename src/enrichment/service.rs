//! Cached book enrichment.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CachedFn, SharedCache};
use crate::enrichment::{EnrichmentOrchestrator, EnrichmentOutcome, EnrichmentRecord};
use crate::resilience::CircuitBreakerStats;

/// Default TTL for cached enrichment results (2 hours).
pub const DEFAULT_ENRICHMENT_TTL: Duration = Duration::from_secs(7200);

/// Cache key for the enrichment of one ISBN.
pub fn enrichment_key(isbn: &str) -> String {
    format!("enrichment:{}", isbn)
}

// == Enrichment Service ==
/// Read-through cache in front of the orchestrator.
///
/// Only merges backed by at least one live upstream answer are cached.
/// Empty merges and merges built from fallbacks or simulated data alone are
/// returned but not cached, so the book is retried on the next request.
#[derive(Clone)]
pub struct EnrichmentService {
    orchestrator: Arc<EnrichmentOrchestrator>,
    cached: CachedFn<String, EnrichmentOutcome, Infallible>,
}

impl EnrichmentService {
    pub fn new(cache: SharedCache, orchestrator: EnrichmentOrchestrator, ttl: Duration) -> Self {
        let orchestrator = Arc::new(orchestrator);
        let fetcher = orchestrator.clone();

        let cached = CachedFn::new(
            cache,
            |isbn: &String| enrichment_key(isbn),
            move |isbn: String| {
                let orchestrator = fetcher.clone();
                async move { Ok::<_, Infallible>(orchestrator.enrich(&isbn).await) }
            },
        )
        .with_ttl(ttl)
        .skip_caching_if(|outcome: &EnrichmentOutcome| {
            outcome.is_degraded() || outcome.record.is_empty()
        });

        Self {
            orchestrator,
            cached,
        }
    }

    pub fn orchestrator(&self) -> &EnrichmentOrchestrator {
        &self.orchestrator
    }

    /// Merged enrichment for `isbn`, served from cache when available.
    pub async fn enrich(&self, isbn: &str) -> EnrichmentRecord {
        match self.cached.call(isbn.to_string()).await {
            Ok(outcome) => outcome.record,
            Err(never) => match never {},
        }
    }

    pub async fn breaker_stats(&self) -> BTreeMap<String, CircuitBreakerStats> {
        self.orchestrator.breaker_stats().await
    }
}

impl std::fmt::Debug for EnrichmentService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnrichmentService")
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::enrichment::sources::RatingsSource;
    use crate::enrichment::{EnrichmentSource, ProtectedSource};
    use crate::error::UpstreamError;
    use crate::resilience::{CircuitBreakerConfig, CircuitState};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    struct CountingSource {
        calls: Arc<AtomicUsize>,
        empty: bool,
    }

    #[async_trait]
    impl EnrichmentSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch(&self, key: &str) -> Result<EnrichmentRecord, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut record = EnrichmentRecord::new();
            if !self.empty {
                record.insert("title".into(), json!(format!("Title {}", key)));
            }
            Ok(record)
        }
    }

    struct FlakySource {
        down: Arc<AtomicBool>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl EnrichmentSource for FlakySource {
        fn name(&self) -> &str {
            "catalog"
        }

        async fn fetch(&self, _key: &str) -> Result<EnrichmentRecord, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.down.load(Ordering::SeqCst) {
                return Err(UpstreamError::Unavailable("connection refused".into()));
            }
            let mut record = EnrichmentRecord::new();
            record.insert("title".into(), json!("Dune"));
            Ok(record)
        }

        fn has_fallback(&self) -> bool {
            true
        }

        async fn fallback(&self, _key: &str) -> Result<EnrichmentRecord, UpstreamError> {
            let mut record = EnrichmentRecord::new();
            record.insert("summary".into(), json!("Summary temporarily unavailable"));
            record.insert("source".into(), json!("fallback_catalog"));
            Ok(record)
        }
    }

    fn service(empty: bool) -> (EnrichmentService, SharedCache, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache: SharedCache = Arc::new(RwLock::new(CacheStore::new(100, None)));
        let orchestrator = EnrichmentOrchestrator::default().with_source(ProtectedSource::new(
            Arc::new(CountingSource {
                calls: calls.clone(),
                empty,
            }),
            CircuitBreakerConfig::default(),
        ));

        let service = EnrichmentService::new(cache.clone(), orchestrator, DEFAULT_ENRICHMENT_TTL);
        (service, cache, calls)
    }

    #[tokio::test]
    async fn test_second_call_served_from_cache() {
        let (service, cache, calls) = service(false);

        let first = service.enrich("123").await;
        let second = service.enrich("123").await;

        assert_eq!(first, second);
        assert_eq!(first["title"], "Title 123");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.read().await.contains_key("enrichment:123"));
    }

    #[tokio::test]
    async fn test_empty_result_not_cached() {
        let (service, cache, calls) = service(true);

        assert!(service.enrich("123").await.is_empty());
        assert!(service.enrich("123").await.is_empty());

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_outage_results_not_cached_until_recovery() {
        let down = Arc::new(AtomicBool::new(true));
        let calls = Arc::new(AtomicUsize::new(0));
        let cache: SharedCache = Arc::new(RwLock::new(CacheStore::new(100, None)));
        let breaker =
            CircuitBreakerConfig::new(1, Duration::from_millis(50), 1, Duration::from_secs(1));
        let orchestrator = EnrichmentOrchestrator::default()
            .with_source(ProtectedSource::new(
                Arc::new(FlakySource {
                    down: down.clone(),
                    calls: calls.clone(),
                }),
                breaker.clone(),
            ))
            .with_source(ProtectedSource::new(Arc::new(RatingsSource), breaker));
        let service = EnrichmentService::new(cache.clone(), orchestrator, DEFAULT_ENRICHMENT_TTL);

        // Upstream error: only simulated ratings come back
        let record = service.enrich("9780441013593").await;
        assert!(record.contains_key("rating"));
        assert!(!record.contains_key("title"));
        assert!(!cache.read().await.contains_key("enrichment:9780441013593"));

        // Breaker open: fallback plus ratings, still not cached
        let breakers = service.breaker_stats().await;
        assert_eq!(breakers["catalog"].state, CircuitState::Open);
        let record = service.enrich("9780441013593").await;
        assert_eq!(record["source"], "fallback_catalog");
        assert!(!cache.read().await.contains_key("enrichment:9780441013593"));

        // Recovery: the half-open probe succeeds and the live result is cached
        down.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(80)).await;

        let record = service.enrich("9780441013593").await;
        assert_eq!(record["title"], "Dune");
        assert!(record.contains_key("rating"));
        assert!(cache.read().await.contains_key("enrichment:9780441013593"));

        let calls_after_recovery = calls.load(Ordering::SeqCst);
        assert_eq!(service.enrich("9780441013593").await, record);
        assert_eq!(calls.load(Ordering::SeqCst), calls_after_recovery);
    }

    #[tokio::test]
    async fn test_stats_exposed() {
        let (service, _, _) = service(false);
        service.enrich("1").await;

        let stats = service.breaker_stats().await;
        assert_eq!(stats["counting"].total_requests, 1);
        assert_eq!(service.orchestrator().sources().len(), 1);
    }

    #[test]
    fn test_enrichment_key() {
        assert_eq!(enrichment_key("9780441013593"), "enrichment:9780441013593");
    }
}
