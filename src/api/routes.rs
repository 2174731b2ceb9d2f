//! API Routes
//!
//! Configures the Axum router with all service endpoints.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    book_enrichment_handler, breaker_health_handler, cache_cleanup_handler, cache_stats_handler,
    health_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Liveness check
/// - `GET /cache/stats` - Cache statistics
/// - `POST /cache/cleanup` - Remove expired entries now
/// - `GET /health/circuit-breakers` - Breaker states and statistics
/// - `GET /books/:isbn/enrichment` - Merged external metadata for a book
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/health/circuit-breakers", get(breaker_health_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/cache/cleanup", post(cache_cleanup_handler))
        .route("/books/:isbn/enrichment", get(book_enrichment_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::enrichment::EnrichmentOrchestrator;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState::new(
            CacheStore::new(100, None),
            EnrichmentOrchestrator::default(),
            Duration::from_secs(60),
        );
        create_router(state)
    }

    async fn status_of(method: &str, uri: &str) -> StatusCode {
        create_test_app()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        assert_eq!(status_of("GET", "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cache_endpoints() {
        assert_eq!(status_of("GET", "/cache/stats").await, StatusCode::OK);
        assert_eq!(status_of("POST", "/cache/cleanup").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_cleanup_requires_post() {
        assert_eq!(
            status_of("GET", "/cache/cleanup").await,
            StatusCode::METHOD_NOT_ALLOWED
        );
    }

    #[tokio::test]
    async fn test_enrichment_bad_isbn() {
        assert_eq!(
            status_of("GET", "/books/nope/enrichment").await,
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_unknown_route() {
        assert_eq!(status_of("GET", "/get/key").await, StatusCode::NOT_FOUND);
    }
}
