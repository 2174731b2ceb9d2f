//! Circuit Breaker Module
//!
//! Guards calls to an unreliable dependency. The breaker starts CLOSED,
//! trips to OPEN once enough failures accumulate in its window, and after a
//! cooldown lets probe calls through in HALF_OPEN to decide whether to close
//! again.
//!
//! # State Transitions
//! ```text
//! CLOSED    -> OPEN:      failures in window >= failure_threshold
//!                         (and window holds >= failure_threshold calls)
//! OPEN      -> HALF_OPEN: recovery_timeout elapsed since last change
//! HALF_OPEN -> CLOSED:    success_threshold successes
//! HALF_OPEN -> OPEN:      any failure
//! ```
//!
//! State bookkeeping runs under a short lock; the protected operation itself
//! runs outside it. In HALF_OPEN only one probe runs at a time; other callers
//! are rejected as if the breaker were open until the probe finishes.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::resilience::{CircuitBreakerConfig, FailureWindow};

// == Circuit State ==
/// Operational mode of a breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation - calls pass through
    Closed,
    /// Failing fast - calls are rejected without executing
    Open,
    /// Probing recovery
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        };
        f.write_str(s)
    }
}

// == Circuit Breaker Error ==
/// Errors returned by a protected call.
#[derive(Debug, thiserror::Error)]
pub enum CircuitBreakerError<E> {
    /// Breaker is open and no fallback was supplied
    #[error("Circuit breaker '{name}' is open")]
    Open { name: String },

    /// Operation exceeded the call timeout (recorded as a failure)
    #[error("Circuit breaker '{name}': operation timed out after {timeout:?}")]
    Timeout { name: String, timeout: Duration },

    /// The operation's own error, passed through unchanged
    #[error("{0}")]
    Upstream(E),

    /// The fallback failed while the breaker was open (never recorded)
    #[error("Fallback for circuit breaker '{name}' failed: {error}")]
    Fallback { name: String, error: E },
}

impl<E> CircuitBreakerError<E> {
    /// True for errors meaning "dependency unavailable, try later".
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            CircuitBreakerError::Open { .. } | CircuitBreakerError::Timeout { .. }
        )
    }
}

// == Circuit Breaker Stats ==
/// Snapshot returned by `get_stats`, serialized verbatim by health endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitBreakerStats {
    pub name: String,
    pub state: CircuitState,
    pub failure_rate: f64,
    pub failure_count: usize,
    pub success_count: usize,
    pub total_requests: usize,
    pub last_state_change: DateTime<Utc>,
    pub last_failure_time: Option<DateTime<Utc>>,
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    last_state_change: Instant,
    last_state_change_at: DateTime<Utc>,
    half_open_success_count: u32,
    window: FailureWindow,
}

impl BreakerState {
    fn transition(&mut self, name: &str, to: CircuitState) {
        let from = self.state;
        self.state = to;
        self.last_state_change = Instant::now();
        self.last_state_change_at = Utc::now();
        self.half_open_success_count = 0;

        match to {
            CircuitState::Open => warn!(
                breaker = %name,
                failure_rate = self.window.failure_rate(),
                "Circuit breaker {} -> {}", from, to
            ),
            _ => info!(breaker = %name, "Circuit breaker {} -> {}", from, to),
        }
    }

    fn should_trip(&self, threshold: u32) -> bool {
        let threshold = threshold as usize;
        self.window.failure_count() >= threshold && self.window.total_requests() >= threshold
    }
}

// == Circuit Breaker ==
/// Circuit breaker dedicated to one upstream dependency.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
    probe_in_flight: AtomicBool,
}

/// Holds the single HALF_OPEN probe slot. Released on drop, so a cancelled
/// probe frees the slot too.
struct ProbeSlot<'a>(&'a AtomicBool);

impl Drop for ProbeSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

enum Admission<'a> {
    Rejected,
    Allowed(Option<ProbeSlot<'a>>),
}

impl CircuitBreaker {
    /// Creates a CLOSED breaker.
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        let name = name.into();
        info!(
            breaker = %name,
            failure_threshold = config.failure_threshold,
            recovery_timeout_secs = config.recovery_timeout.as_secs_f64(),
            success_threshold = config.success_threshold,
            call_timeout_secs = config.call_timeout.as_secs_f64(),
            "Circuit breaker initialized"
        );

        let window = FailureWindow::new(config.window_size);
        Self {
            name,
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                last_state_change: Instant::now(),
                last_state_change_at: Utc::now(),
                half_open_success_count: 0,
                window,
            }),
            probe_in_flight: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Current state as last recorded. Pending time-based transitions are
    /// applied on the next call.
    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    // == Call ==
    /// Executes `operation` under breaker protection.
    ///
    /// Fails with `Open` without invoking the operation while the breaker is
    /// open.
    pub async fn call<T, E, F, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + 'static,
    {
        let _slot = match self.admit().await {
            Admission::Rejected => {
                return Err(CircuitBreakerError::Open {
                    name: self.name.clone(),
                })
            }
            Admission::Allowed(slot) => slot,
        };

        self.run_protected(operation).await
    }

    // == Call With Fallback ==
    /// Like `call`, but answers with `fallback` instead of failing while the
    /// breaker is open.
    pub async fn call_with_fallback<T, E, F, Fut, G, GFut>(
        &self,
        operation: F,
        fallback: G,
    ) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        G: FnOnce() -> GFut,
        GFut: Future<Output = Result<T, E>>,
        E: std::error::Error + 'static,
    {
        let _slot = match self.admit().await {
            Admission::Rejected => {
                debug!(breaker = %self.name, "Serving fallback");
                return fallback().await.map_err(|err| {
                    error!(breaker = %self.name, error = %err, "Fallback failed");
                    CircuitBreakerError::Fallback {
                        name: self.name.clone(),
                        error: err,
                    }
                });
            }
            Admission::Allowed(slot) => slot,
        };

        self.run_protected(operation).await
    }

    // == Stats ==
    pub async fn get_stats(&self) -> CircuitBreakerStats {
        let inner = self.inner.lock().await;
        CircuitBreakerStats {
            name: self.name.clone(),
            state: inner.state,
            failure_rate: inner.window.failure_rate(),
            failure_count: inner.window.failure_count(),
            success_count: inner.window.success_count(),
            total_requests: inner.window.total_requests(),
            last_state_change: inner.last_state_change_at,
            last_failure_time: inner.window.last_failure_time(),
        }
    }

    /// Applies pending transitions and decides whether the call may run.
    async fn admit(&self) -> Admission<'_> {
        let mut inner = self.inner.lock().await;

        match inner.state {
            CircuitState::Open => {
                if inner.last_state_change.elapsed() >= self.config.recovery_timeout {
                    inner.transition(&self.name, CircuitState::HalfOpen);
                }
            }
            CircuitState::Closed => {
                if inner.should_trip(self.config.failure_threshold) {
                    inner.transition(&self.name, CircuitState::Open);
                }
            }
            CircuitState::HalfOpen => {}
        }

        match inner.state {
            CircuitState::Closed => Admission::Allowed(None),
            CircuitState::Open => {
                warn!(breaker = %self.name, "Circuit breaker is OPEN - request rejected");
                Admission::Rejected
            }
            CircuitState::HalfOpen => {
                if self.probe_in_flight.swap(true, Ordering::AcqRel) {
                    debug!(breaker = %self.name, "Probe already in flight - request rejected");
                    Admission::Rejected
                } else {
                    Admission::Allowed(Some(ProbeSlot(&self.probe_in_flight)))
                }
            }
        }
    }

    async fn run_protected<T, E, F, Fut>(&self, operation: F) -> Result<T, CircuitBreakerError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::error::Error + 'static,
    {
        match tokio::time::timeout(self.config.call_timeout, operation()).await {
            Ok(Ok(value)) => {
                self.on_success().await;
                Ok(value)
            }
            Ok(Err(err)) => {
                if self.config.is_failure(&err) {
                    self.on_failure().await;
                } else {
                    debug!(breaker = %self.name, error = %err, "Unclassified error, not recorded");
                }
                Err(CircuitBreakerError::Upstream(err))
            }
            Err(_) => {
                self.on_failure().await;
                Err(CircuitBreakerError::Timeout {
                    name: self.name.clone(),
                    timeout: self.config.call_timeout,
                })
            }
        }
    }

    async fn on_success(&self) {
        let mut inner = self.inner.lock().await;
        inner.window.record_success();

        if inner.state == CircuitState::HalfOpen {
            inner.half_open_success_count += 1;
            if inner.half_open_success_count >= self.config.success_threshold {
                inner.transition(&self.name, CircuitState::Closed);
                // Failures from before the outage must not re-trip a recovered breaker
                inner.window = FailureWindow::new(self.config.window_size);
            }
        }
    }

    async fn on_failure(&self) {
        let mut inner = self.inner.lock().await;
        inner.window.record_failure();

        match inner.state {
            CircuitState::HalfOpen => inner.transition(&self.name, CircuitState::Open),
            CircuitState::Closed => {
                if inner.should_trip(self.config.failure_threshold) {
                    inner.transition(&self.name, CircuitState::Open);
                }
            }
            CircuitState::Open => {}
        }
    }
}
