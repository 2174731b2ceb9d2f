//! API Module
//!
//! HTTP handlers and routing for the catalog resilience REST API.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /cache/stats` - Cache statistics
//! - `POST /cache/cleanup` - Sweep expired cache entries
//! - `GET /health/circuit-breakers` - Circuit breaker health
//! - `GET /books/:isbn/enrichment` - Book enrichment

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
