//! Response DTOs for the catalog resilience API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::enrichment::EnrichmentRecord;
use crate::resilience::{CircuitBreakerStats, CircuitState};

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: now(),
        }
    }
}

/// Response body for a manual sweep (POST /cache/cleanup)
#[derive(Debug, Clone, Serialize)]
pub struct CleanupResponse {
    pub message: String,
    /// Number of expired entries removed
    pub removed: usize,
}

impl CleanupResponse {
    pub fn new(removed: usize) -> Self {
        Self {
            message: format!("Removed {} expired entries", removed),
            removed,
        }
    }
}

/// Response body for GET /health/circuit-breakers
///
/// Status is "healthy" only while every breaker is closed.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerHealthResponse {
    pub status: String,
    pub circuit_breakers: BTreeMap<String, CircuitBreakerStats>,
    pub timestamp: String,
}

impl BreakerHealthResponse {
    pub fn new(circuit_breakers: BTreeMap<String, CircuitBreakerStats>) -> Self {
        let all_closed = circuit_breakers
            .values()
            .all(|stats| stats.state == CircuitState::Closed);

        Self {
            status: if all_closed { "healthy" } else { "degraded" }.to_string(),
            circuit_breakers,
            timestamp: now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Response body for GET /books/:isbn/enrichment
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentResponse {
    pub isbn: String,
    /// Merged fields; empty when no source could answer
    pub data: EnrichmentRecord,
}

impl EnrichmentResponse {
    pub fn new(isbn: impl Into<String>, data: EnrichmentRecord) -> Self {
        Self {
            isbn: isbn.into(),
            data,
        }
    }
}
