//! Configuration Module
//!
//! Handles loading service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::EvictionStrategy;
use crate::error::UpstreamError;
use crate::resilience::CircuitBreakerConfig;

/// Reads and parses an environment variable, falling back to `default` when
/// it is unset or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// == Breaker Settings ==
/// Circuit breaker tuning for one upstream source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSettings {
    pub failure_threshold: u32,
    /// Seconds spent OPEN before probing
    pub recovery_timeout: u64,
    pub success_threshold: u32,
    /// Per-call timeout in seconds
    pub call_timeout: u64,
}

impl BreakerSettings {
    pub const fn new(failure_threshold: u32, recovery_timeout: u64, call_timeout: u64) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            success_threshold: 3,
            call_timeout,
        }
    }

    /// Builds the breaker config. Only dependency failures (transport errors,
    /// 5xx, unavailability) count against the breaker; malformed payloads and
    /// 4xx answers propagate without tripping it.
    pub fn to_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig::new(
            self.failure_threshold,
            Duration::from_secs(self.recovery_timeout),
            self.success_threshold,
            Duration::from_secs(self.call_timeout),
        )
        .with_failure_predicate(|err| {
            err.downcast_ref::<UpstreamError>()
                .map_or(true, UpstreamError::is_dependency_failure)
        })
    }
}

pub const GOOGLE_BOOKS_BREAKER: BreakerSettings = BreakerSettings::new(3, 30, 10);
pub const OPENLIBRARY_BREAKER: BreakerSettings = BreakerSettings::new(5, 60, 15);
pub const RATINGS_BREAKER: BreakerSettings = BreakerSettings::new(5, 60, 5);

// == Config ==
/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub cache_capacity: usize,
    /// Default TTL in seconds for entries without explicit TTL
    pub cache_default_ttl: u64,
    /// Eviction strategy used when the cache is full
    pub cache_strategy: EvictionStrategy,
    /// Whether large values are gzip-compressed
    pub cache_compression: bool,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// TTL in seconds for cached enrichment results
    pub enrichment_ttl: u64,
    /// Bound in seconds on a whole enrichment fan-out
    pub enrichment_timeout: u64,
    /// Timeout in seconds for a single outbound HTTP request
    pub request_timeout: u64,
    pub google_books_api_key: Option<String>,
    pub google_books_breaker: BreakerSettings,
    pub openlibrary_breaker: BreakerSettings,
    pub ratings_breaker: BreakerSettings,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 5000)
    /// - `CACHE_DEFAULT_TTL` - Default TTL in seconds (default: 3600)
    /// - `CACHE_STRATEGY` - `lru`, `lfu` or `ttl` (default: lru)
    /// - `CACHE_COMPRESSION` - Compress large values (default: true)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `ENRICHMENT_TTL` - Enrichment cache TTL in seconds (default: 7200)
    /// - `ENRICHMENT_TIMEOUT` - Enrichment fan-out timeout in seconds (default: 30)
    /// - `REQUEST_TIMEOUT` - Outbound HTTP timeout in seconds (default: 30)
    /// - `GOOGLE_BOOKS_API_KEY` - Optional Google Books API key
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cache_capacity: env_or("CACHE_CAPACITY", defaults.cache_capacity),
            cache_default_ttl: env_or("CACHE_DEFAULT_TTL", defaults.cache_default_ttl),
            cache_strategy: env_or("CACHE_STRATEGY", defaults.cache_strategy),
            cache_compression: env_or("CACHE_COMPRESSION", defaults.cache_compression),
            cleanup_interval: env_or("CLEANUP_INTERVAL", defaults.cleanup_interval),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            enrichment_ttl: env_or("ENRICHMENT_TTL", defaults.enrichment_ttl),
            enrichment_timeout: env_or("ENRICHMENT_TIMEOUT", defaults.enrichment_timeout),
            request_timeout: env_or("REQUEST_TIMEOUT", defaults.request_timeout),
            google_books_api_key: env::var("GOOGLE_BOOKS_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            ..defaults
        }
    }

    /// Default TTL for cache entries; 0 disables expiry.
    pub fn default_ttl(&self) -> Option<Duration> {
        (self.cache_default_ttl > 0).then(|| Duration::from_secs(self.cache_default_ttl))
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }

    pub fn enrichment_ttl(&self) -> Duration {
        Duration::from_secs(self.enrichment_ttl)
    }

    pub fn enrichment_timeout(&self) -> Duration {
        Duration::from_secs(self.enrichment_timeout)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_capacity: 5000,
            cache_default_ttl: 3600,
            cache_strategy: EvictionStrategy::Lru,
            cache_compression: true,
            cleanup_interval: 60,
            server_port: 3000,
            enrichment_ttl: 7200,
            enrichment_timeout: 30,
            request_timeout: 30,
            google_books_api_key: None,
            google_books_breaker: GOOGLE_BOOKS_BREAKER,
            openlibrary_breaker: OPENLIBRARY_BREAKER,
            ratings_breaker: RATINGS_BREAKER,
        }
    }
}
