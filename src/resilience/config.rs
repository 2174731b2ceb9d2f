//! Circuit Breaker Configuration

use std::error::Error;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::resilience::window::DEFAULT_WINDOW_SIZE;

/// Decides whether an operation error counts as a breaker failure.
pub type FailurePredicate = Arc<dyn Fn(&(dyn Error + 'static)) -> bool + Send + Sync>;

// == Circuit Breaker Config ==
/// Thresholds and timeouts for one circuit breaker. Immutable once the
/// breaker is built.
#[derive(Clone)]
pub struct CircuitBreakerConfig {
    /// Failures within the window that trip the breaker
    pub failure_threshold: u32,
    /// Time spent OPEN before a probe is allowed
    pub recovery_timeout: Duration,
    /// HALF_OPEN successes needed to close again
    pub success_threshold: u32,
    /// Upper bound on a single protected call
    pub call_timeout: Duration,
    /// Number of recent outcomes kept for statistics
    pub window_size: usize,
    failure_predicate: FailurePredicate,
}

impl CircuitBreakerConfig {
    pub fn new(
        failure_threshold: u32,
        recovery_timeout: Duration,
        success_threshold: u32,
        call_timeout: Duration,
    ) -> Self {
        Self {
            failure_threshold,
            recovery_timeout,
            success_threshold,
            call_timeout,
            ..Self::default()
        }
    }

    /// Only errors matching `predicate` are recorded as failures. Other
    /// errors still propagate to the caller but leave the statistics alone.
    pub fn with_failure_predicate<P>(mut self, predicate: P) -> Self
    where
        P: Fn(&(dyn Error + 'static)) -> bool + Send + Sync + 'static,
    {
        self.failure_predicate = Arc::new(predicate);
        self
    }

    pub fn is_failure(&self, err: &(dyn Error + 'static)) -> bool {
        (self.failure_predicate)(err)
    }
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            recovery_timeout: Duration::from_secs(60),
            success_threshold: 3,
            call_timeout: Duration::from_secs(30),
            window_size: DEFAULT_WINDOW_SIZE,
            failure_predicate: Arc::new(|_| true),
        }
    }
}

impl fmt::Debug for CircuitBreakerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreakerConfig")
            .field("failure_threshold", &self.failure_threshold)
            .field("recovery_timeout", &self.recovery_timeout)
            .field("success_threshold", &self.success_threshold)
            .field("call_timeout", &self.call_timeout)
            .field("window_size", &self.window_size)
            .finish_non_exhaustive()
    }
}
