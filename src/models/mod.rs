//! Response models for the catalog resilience API
//!
//! DTOs serialized into HTTP response bodies.

pub mod responses;

// Re-export commonly used types
pub use responses::{BreakerHealthResponse, CleanupResponse, EnrichmentResponse, HealthResponse};
