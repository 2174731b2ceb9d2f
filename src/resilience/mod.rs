//! Resilience Module
//!
//! Circuit breakers with sliding-window failure statistics for calls to
//! unreliable external dependencies.

mod breaker;
mod config;
mod window;

pub use breaker::{CircuitBreaker, CircuitBreakerError, CircuitBreakerStats, CircuitState};
pub use config::{CircuitBreakerConfig, FailurePredicate};
pub use window::{FailureWindow, DEFAULT_WINDOW_SIZE};
