//! API Handlers
//!
//! HTTP request handlers for the cache, breaker health and enrichment
//! endpoints.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{Path, State},
    Json,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::{CacheStats, CacheStore, SharedCache};
use crate::config::Config;
use crate::enrichment::sources::{GoogleBooksSource, OpenLibrarySource, RatingsSource};
use crate::enrichment::{EnrichmentOrchestrator, EnrichmentService, ProtectedSource};
use crate::error::ApiError;
use crate::models::{BreakerHealthResponse, CleanupResponse, EnrichmentResponse, HealthResponse};

/// Application state shared across all handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Shared cache store, also swept by the cleanup task
    pub cache: SharedCache,
    /// Cached enrichment over the circuit-broken sources
    pub enrichment: EnrichmentService,
}

impl AppState {
    /// Creates a new AppState around `cache`, caching enrichment results for
    /// `enrichment_ttl`.
    pub fn new(
        cache: CacheStore,
        orchestrator: EnrichmentOrchestrator,
        enrichment_ttl: Duration,
    ) -> Self {
        let cache: SharedCache = Arc::new(RwLock::new(cache));
        let enrichment = EnrichmentService::new(cache.clone(), orchestrator, enrichment_ttl);
        Self { cache, enrichment }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds the cache store and registers the enrichment sources in
    /// priority order: Google Books, OpenLibrary, ratings.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let cache = CacheStore::new(config.cache_capacity, config.default_ttl())
            .with_strategy(config.cache_strategy)
            .with_compression(config.cache_compression);

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        let orchestrator = EnrichmentOrchestrator::new(config.enrichment_timeout())
            .with_source(ProtectedSource::new(
                Arc::new(GoogleBooksSource::new(
                    client.clone(),
                    config.google_books_api_key.clone(),
                )),
                config.google_books_breaker.to_breaker_config(),
            ))
            .with_source(ProtectedSource::new(
                Arc::new(OpenLibrarySource::new(client)),
                config.openlibrary_breaker.to_breaker_config(),
            ))
            .with_source(ProtectedSource::new(
                Arc::new(RatingsSource),
                config.ratings_breaker.to_breaker_config(),
            ));

        Ok(Self::new(cache, orchestrator, config.enrichment_ttl()))
    }
}

/// Strips hyphens and spaces and checks the ISBN-10/ISBN-13 shape.
///
/// Check digits are not verified.
pub fn normalize_isbn(raw: &str) -> Result<String, ApiError> {
    let isbn: String = raw
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let valid = match isbn.len() {
        13 => isbn.chars().all(|c| c.is_ascii_digit()),
        10 => {
            let (body, check) = isbn.split_at(9);
            body.chars().all(|c| c.is_ascii_digit())
                && check.chars().all(|c| c.is_ascii_digit() || c == 'X')
        }
        _ => false,
    };

    if valid {
        Ok(isbn)
    } else {
        Err(ApiError::InvalidRequest(format!("'{}' is not a valid ISBN", raw)))
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStats> {
    let cache = state.cache.read().await;
    Json(cache.stats())
}

/// Handler for POST /cache/cleanup
///
/// Sweeps expired entries immediately instead of waiting for the
/// background task.
pub async fn cache_cleanup_handler(State(state): State<AppState>) -> Json<CleanupResponse> {
    let removed = state.cache.write().await.cleanup_expired();
    info!(removed, "Manual cache cleanup");

    Json(CleanupResponse::new(removed))
}

/// Handler for GET /health/circuit-breakers
pub async fn breaker_health_handler(State(state): State<AppState>) -> Json<BreakerHealthResponse> {
    let stats = state.enrichment.breaker_stats().await;
    Json(BreakerHealthResponse::new(stats))
}

/// Handler for GET /books/:isbn/enrichment
///
/// Always answers 200 for a well-formed ISBN; `data` is empty when no
/// source could contribute.
pub async fn book_enrichment_handler(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> Result<Json<EnrichmentResponse>, ApiError> {
    let isbn = normalize_isbn(&isbn)?;
    let data = state.enrichment.enrich(&isbn).await;

    Ok(Json(EnrichmentResponse::new(isbn, data)))
}
