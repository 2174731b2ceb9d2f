//! Reader ratings.
//!
//! The ratings provider requires partner credentials, so values are derived
//! deterministically from the key. Same key, same numbers.

use async_trait::async_trait;
use serde_json::json;

use crate::enrichment::{EnrichmentRecord, EnrichmentSource, Provenance};
use crate::error::UpstreamError;

const NAME: &str = "ratings";

#[derive(Debug, Clone, Copy, Default)]
pub struct RatingsSource;

/// 64-bit FNV-1a.
fn fingerprint(key: &str) -> u64 {
    key.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

pub fn simulated_ratings(key: &str) -> EnrichmentRecord {
    let hash = fingerprint(key);
    let rating = 3.0 + (hash % 50) as f64 / 10.0;

    let mut record = EnrichmentRecord::new();
    record.insert("rating".to_string(), json!((rating * 10.0).round() / 10.0));
    record.insert("reviews_count".to_string(), json!(hash % 10_000));
    record.insert("popularity_score".to_string(), json!(hash % 100));
    record
}

#[async_trait]
impl EnrichmentSource for RatingsSource {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch(&self, key: &str) -> Result<EnrichmentRecord, UpstreamError> {
        Ok(simulated_ratings(key))
    }

    fn provenance(&self) -> Provenance {
        Provenance::Simulated
    }
}
