//! Error types for the catalog resilience layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::resilience::CircuitBreakerError;

// == Cache Error Enum ==
/// Errors raised by the cache store.
///
/// A missing or expired key is not an error; `get` returns `None` for it.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is empty or exceeds the maximum length
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Value could not be serialized or deserialized
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Gzip encoding or decoding failed
    #[error("Compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

// == Upstream Error Enum ==
/// Errors reported by external enrichment sources.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Transport-level failure (connect, read, timeout inside the client)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream {source_name} returned status {status}")]
    Status { source_name: String, status: u16 },

    /// Response body did not have the expected shape
    #[error("Unexpected response from {source_name}: {message}")]
    Decode {
        source_name: String,
        message: String,
    },

    /// Source cannot serve the request at all
    #[error("Source unavailable: {0}")]
    Unavailable(String),
}

impl UpstreamError {
    /// Returns true for errors that indicate the dependency itself is unhealthy.
    ///
    /// Client-side status codes (4xx) say nothing about upstream health.
    pub fn is_dependency_failure(&self) -> bool {
        match self {
            UpstreamError::Http(_) | UpstreamError::Unavailable(_) => true,
            UpstreamError::Status { status, .. } => *status >= 500,
            UpstreamError::Decode { .. } => false,
        }
    }
}

// == API Error Enum ==
/// Error type surfaced by HTTP handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Dependency is temporarily unavailable (open circuit or timeout)
    #[error("Temporarily unavailable: {0}")]
    Unavailable(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Lets handlers that call a single breaker-protected dependency directly
/// answer with `?`. Open circuits and timeouts become 503, anything else 500.
impl<E: std::fmt::Display> From<CircuitBreakerError<E>> for ApiError {
    fn from(err: CircuitBreakerError<E>) -> Self {
        if err.is_unavailable() {
            return ApiError::Unavailable(format!("{}, try again later", err));
        }
        match err {
            CircuitBreakerError::Upstream(e) => ApiError::Internal(e.to_string()),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_open_circuit_maps_to_unavailable() {
        let err: CircuitBreakerError<UpstreamError> = CircuitBreakerError::Open {
            name: "google_books".to_string(),
        };
        let api: ApiError = err.into();
        assert!(matches!(api, ApiError::Unavailable(_)));
        assert_eq!(
            api.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_timeout_maps_to_unavailable() {
        let err: CircuitBreakerError<UpstreamError> = CircuitBreakerError::Timeout {
            name: "openlibrary".to_string(),
            timeout: Duration::from_secs(1),
        };
        let api: ApiError = err.into();
        assert!(matches!(api, ApiError::Unavailable(_)));
    }

    #[test]
    fn test_upstream_error_maps_to_internal() {
        let err = CircuitBreakerError::Upstream(UpstreamError::Unavailable("down".into()));
        let api: ApiError = err.into();
        assert_eq!(
            api.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_dependency_failure_classification() {
        let server = UpstreamError::Status {
            source_name: "x".into(),
            status: 503,
        };
        let client = UpstreamError::Status {
            source_name: "x".into(),
            status: 404,
        };
        assert!(server.is_dependency_failure());
        assert!(!client.is_dependency_failure());
        assert!(UpstreamError::Unavailable("x".into()).is_dependency_failure());
    }
}
