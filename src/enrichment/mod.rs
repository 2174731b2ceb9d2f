//! Enrichment Module
//!
//! Fans a lookup out to several external book APIs, each behind its own
//! circuit breaker, and merges the answers by source priority.

mod orchestrator;
mod record;
mod service;
mod source;
pub mod sources;

pub use orchestrator::{EnrichmentOrchestrator, EnrichmentOutcome, DEFAULT_ENRICHMENT_TIMEOUT};
pub use record::{is_empty_value, merge_records, EnrichmentRecord};
pub use service::{enrichment_key, EnrichmentService, DEFAULT_ENRICHMENT_TTL};
pub use source::{EnrichmentSource, Provenance, ProtectedSource, SourceReply};
