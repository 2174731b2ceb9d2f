//! Enrichment source interface and its circuit-breaker wrapper.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::enrichment::EnrichmentRecord;
use crate::error::UpstreamError;
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitBreakerStats};

// == Provenance ==
/// Where a source's answer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Live answer from the external API
    Upstream,
    /// Degraded answer served while the breaker was open
    Fallback,
    /// Derived locally, no external API involved
    Simulated,
}

/// One source's answer, tagged with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceReply {
    pub record: EnrichmentRecord,
    pub provenance: Provenance,
}

// == Enrichment Source ==
/// An external API that can add fields to a catalog record.
#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    /// Stable name, also used for the source's circuit breaker.
    fn name(&self) -> &str;

    /// Fetches fields for the given key (an ISBN for book sources).
    ///
    /// "Nothing known" is an empty record, not an error.
    async fn fetch(&self, key: &str) -> Result<EnrichmentRecord, UpstreamError>;

    /// Provenance of records returned by `fetch`.
    fn provenance(&self) -> Provenance {
        Provenance::Upstream
    }

    /// Whether `fallback` should be used while the breaker is open.
    fn has_fallback(&self) -> bool {
        false
    }

    /// Degraded answer served while the source is unavailable.
    async fn fallback(&self, _key: &str) -> Result<EnrichmentRecord, UpstreamError> {
        Err(UpstreamError::Unavailable(format!(
            "{} has no fallback",
            self.name()
        )))
    }
}

// == Protected Source ==
/// A source paired with its dedicated circuit breaker.
#[derive(Clone)]
pub struct ProtectedSource {
    source: Arc<dyn EnrichmentSource>,
    breaker: Arc<CircuitBreaker>,
}

impl ProtectedSource {
    /// Wraps `source` in a new breaker named after it.
    pub fn new(source: Arc<dyn EnrichmentSource>, config: CircuitBreakerConfig) -> Self {
        let breaker = Arc::new(CircuitBreaker::new(source.name(), config));
        Self { source, breaker }
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Fetches through the breaker, falling back if the source supports it.
    pub async fn fetch(
        &self,
        key: &str,
    ) -> Result<SourceReply, CircuitBreakerError<UpstreamError>> {
        let source = &self.source;
        let live = || async move {
            source.fetch(key).await.map(|record| SourceReply {
                record,
                provenance: source.provenance(),
            })
        };

        if source.has_fallback() {
            let fallback = || async move {
                source.fallback(key).await.map(|record| SourceReply {
                    record,
                    provenance: Provenance::Fallback,
                })
            };
            self.breaker.call_with_fallback(live, fallback).await
        } else {
            self.breaker.call(live).await
        }
    }

    pub async fn stats(&self) -> CircuitBreakerStats {
        self.breaker.get_stats().await
    }
}

impl std::fmt::Debug for ProtectedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtectedSource")
            .field("name", &self.source.name())
            .field("breaker", &self.breaker)
            .finish()
    }
}
