//! Resilient fan-out over several circuit-broken enrichment sources.

use std::collections::BTreeMap;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::enrichment::{merge_records, EnrichmentRecord, ProtectedSource, Provenance, SourceReply};
use crate::resilience::CircuitBreakerStats;

/// Default bound on a whole enrichment fan-out.
pub const DEFAULT_ENRICHMENT_TIMEOUT: Duration = Duration::from_secs(30);

// == Enrichment Outcome ==
/// Merged record plus which sources answered and how.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentOutcome {
    pub record: EnrichmentRecord,
    /// Source name -> provenance, for sources that answered in time
    pub contributors: BTreeMap<String, Provenance>,
}

impl EnrichmentOutcome {
    /// True when no source answered from its live upstream.
    pub fn is_degraded(&self) -> bool {
        !self
            .contributors
            .values()
            .any(|provenance| *provenance == Provenance::Upstream)
    }
}

// == Enrichment Orchestrator ==
/// Queries every registered source concurrently and merges what comes back.
///
/// Sources are kept in priority order: the first registered source wins
/// field conflicts.
#[derive(Debug)]
pub struct EnrichmentOrchestrator {
    sources: Vec<ProtectedSource>,
    timeout: Duration,
}

impl EnrichmentOrchestrator {
    pub fn new(timeout: Duration) -> Self {
        Self {
            sources: Vec::new(),
            timeout,
        }
    }

    /// Appends a source at the lowest priority so far.
    pub fn with_source(mut self, source: ProtectedSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn sources(&self) -> &[ProtectedSource] {
        &self.sources
    }

    pub fn source(&self, name: &str) -> Option<&ProtectedSource> {
        self.sources.iter().find(|s| s.name() == name)
    }

    // == Enrich ==
    /// Fetches from all sources and merges the results.
    ///
    /// Never fails: failing sources (open circuit, timeout, upstream error)
    /// are logged and left out. If the global timeout expires, whatever has
    /// completed so far is merged and the stragglers are dropped.
    pub async fn enrich(&self, key: &str) -> EnrichmentOutcome {
        let deadline = tokio::time::Instant::now() + self.timeout;

        let mut pending: FuturesUnordered<_> = self
            .sources
            .iter()
            .enumerate()
            .map(|(idx, source)| async move { (idx, source.fetch(key).await) })
            .collect();

        let mut completed: Vec<Option<SourceReply>> = vec![None; self.sources.len()];

        loop {
            match tokio::time::timeout_at(deadline, pending.next()).await {
                Ok(Some((idx, Ok(reply)))) => {
                    debug!(
                        source = %self.sources[idx].name(),
                        fields = reply.record.len(),
                        provenance = ?reply.provenance,
                        "Source answered"
                    );
                    completed[idx] = Some(reply);
                }
                Ok(Some((idx, Err(err)))) => {
                    let source = self.sources[idx].name();
                    if err.is_unavailable() {
                        warn!(source = %source, error = %err, "Source unavailable - skipping");
                    } else {
                        error!(source = %source, error = %err, "Source call failed");
                    }
                }
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        key = %key,
                        stragglers = pending.len(),
                        timeout_secs = self.timeout.as_secs_f64(),
                        "Enrichment timed out, merging partial results"
                    );
                    break;
                }
            }
        }

        let mut contributors = BTreeMap::new();
        let mut records = Vec::new();
        for (source, reply) in self.sources.iter().zip(completed) {
            if let Some(reply) = reply {
                contributors.insert(source.name().to_string(), reply.provenance);
                records.push(reply.record);
            }
        }

        EnrichmentOutcome {
            record: merge_records(records),
            contributors,
        }
    }

    /// Breaker statistics for every source, keyed by source name.
    pub async fn breaker_stats(&self) -> BTreeMap<String, CircuitBreakerStats> {
        let mut stats = BTreeMap::new();
        for source in &self.sources {
            stats.insert(source.name().to_string(), source.stats().await);
        }
        stats
    }
}

impl Default for EnrichmentOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_ENRICHMENT_TIMEOUT)
    }
}
